//! Evaluation grids over the uncertain parameters.

use rand::rngs::StdRng;
use rand::SeedableRng;

use nq_core::{ensure_finite, Real};
use nq_params::{Distribution, ParameterSet};

use crate::{RunnerError, RunnerResult};

/// Ordered set of evaluation nodes, one column per uncertain parameter.
///
/// Column order is the uncertain-parameter order of the parameter set; node
/// order is preserved end to end, since alignment is positional.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    names: Vec<String>,
    nodes: Vec<Vec<Real>>,
}

impl Grid {
    /// Accept an externally generated grid verbatim.
    pub fn new(names: Vec<String>, nodes: Vec<Vec<Real>>) -> RunnerResult<Self> {
        if names.is_empty() {
            return Err(RunnerError::Config {
                what: "grid needs at least one uncertain parameter".to_string(),
            });
        }
        for (index, node) in nodes.iter().enumerate() {
            if node.len() != names.len() {
                return Err(RunnerError::Config {
                    what: format!(
                        "node {} has {} values but the grid has {} parameters",
                        index,
                        node.len(),
                        names.len()
                    ),
                });
            }
            for &value in node {
                ensure_finite(value, "grid node value")?;
            }
        }
        Ok(Self { names, nodes })
    }

    /// Seeded Monte Carlo grid drawn from the parameter distributions.
    pub fn sample(parameters: &ParameterSet, n: usize, seed: u64) -> RunnerResult<Self> {
        let distributions = active_distributions(parameters)?;
        if n == 0 {
            return Err(RunnerError::Config {
                what: "sample grid needs at least one node".to_string(),
            });
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let nodes = (0..n)
            .map(|_| distributions.iter().map(|d| d.sample(&mut rng)).collect())
            .collect();
        Self::new(parameters.uncertain_names(), nodes)
    }

    /// Full-factorial grid of midpoint quantile levels, `points_per_dim`
    /// levels per uncertain parameter.
    pub fn tensor(parameters: &ParameterSet, points_per_dim: usize) -> RunnerResult<Self> {
        let distributions = active_distributions(parameters)?;
        if points_per_dim == 0 {
            return Err(RunnerError::Config {
                what: "tensor grid needs at least one point per dimension".to_string(),
            });
        }

        let levels: Vec<Vec<Real>> = distributions
            .iter()
            .map(|d| {
                (0..points_per_dim)
                    .map(|i| d.quantile((i as Real + 0.5) / points_per_dim as Real))
                    .collect()
            })
            .collect();

        // Count through the index space like an odometer, first dimension
        // fastest.
        let mut nodes = Vec::new();
        let mut indices = vec![0usize; levels.len()];
        loop {
            nodes.push(
                indices
                    .iter()
                    .enumerate()
                    .map(|(dim, &i)| levels[dim][i])
                    .collect(),
            );

            let mut carry = true;
            for index in indices.iter_mut() {
                if carry {
                    *index += 1;
                    if *index >= points_per_dim {
                        *index = 0;
                    } else {
                        carry = false;
                    }
                }
            }
            if carry {
                break;
            }
        }

        Self::new(parameters.uncertain_names(), nodes)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn nodes(&self) -> &[Vec<Real>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// The joint distribution overrides the individual ones when installed.
fn active_distributions(parameters: &ParameterSet) -> RunnerResult<Vec<&Distribution>> {
    let distributions = match parameters.joint() {
        Some(joint) => joint.marginals().iter().collect(),
        None => parameters.uncertain_distributions(),
    };
    if distributions.is_empty() {
        return Err(RunnerError::Config {
            what: "parameter set has no uncertain parameters".to_string(),
        });
    }
    Ok(distributions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nq_params::Distribution;

    fn params() -> ParameterSet {
        ParameterSet::from_rows(&[
            ("a", 1.0, Some(Distribution::uniform(0.0, 1.0).unwrap())),
            ("b", 2.0, None),
            ("c", 3.0, Some(Distribution::uniform(10.0, 20.0).unwrap())),
        ])
        .unwrap()
    }

    #[test]
    fn external_grid_validates_node_width() {
        let err = Grid::new(
            vec!["a".to_string(), "c".to_string()],
            vec![vec![0.5, 15.0], vec![0.5]],
        )
        .unwrap_err();
        assert!(matches!(err, RunnerError::Config { .. }));
    }

    #[test]
    fn sampling_is_deterministic_per_seed() {
        let p = params();
        let g1 = Grid::sample(&p, 10, 42).unwrap();
        let g2 = Grid::sample(&p, 10, 42).unwrap();
        let g3 = Grid::sample(&p, 10, 43).unwrap();
        assert_eq!(g1, g2);
        assert_ne!(g1, g3);
        assert_eq!(g1.len(), 10);
        assert_eq!(g1.names(), &["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn samples_respect_uniform_support() {
        let g = Grid::sample(&params(), 50, 7).unwrap();
        for node in g.nodes() {
            assert!((0.0..=1.0).contains(&node[0]));
            assert!((10.0..=20.0).contains(&node[1]));
        }
    }

    #[test]
    fn tensor_grid_is_full_factorial() {
        let g = Grid::tensor(&params(), 3).unwrap();
        assert_eq!(g.len(), 9);
        // First dimension varies fastest.
        assert_eq!(g.nodes()[0][1], g.nodes()[1][1]);
        assert_ne!(g.nodes()[0][0], g.nodes()[1][0]);
    }

    #[test]
    fn no_uncertain_parameters_is_config_error() {
        let p = ParameterSet::from_rows(&[("a", 1.0, None)]).unwrap();
        assert!(matches!(
            Grid::sample(&p, 5, 0),
            Err(RunnerError::Config { .. })
        ));
    }
}
