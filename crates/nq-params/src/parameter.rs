//! Parameter and parameter-set definitions.

use serde::{Deserialize, Serialize};
use std::path::Path;

use nq_core::Real;

use crate::distribution::{Distribution, JointDistribution};
use crate::{substitute, ParamError, ParamResult};

/// A named model parameter, optionally carrying a fixed value and a
/// probability distribution. A parameter is uncertain iff it has a
/// distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Distribution>,
}

impl Parameter {
    pub fn fixed(name: impl Into<String>, value: Real) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            distribution: None,
        }
    }

    pub fn uncertain(name: impl Into<String>, value: Real, distribution: Distribution) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            distribution: Some(distribution),
        }
    }

    pub fn is_uncertain(&self) -> bool {
        self.distribution.is_some()
    }
}

/// Ordered collection of parameters with named accessors.
///
/// Order is the order of construction; uncertain-parameter order (and hence
/// grid-column order) is that same order restricted to parameters with a
/// distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ParameterSet {
    parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    joint: Option<JointDistribution>,
}

impl ParameterSet {
    /// Build from parameter objects. Names must be unique.
    pub fn new(parameters: Vec<Parameter>) -> ParamResult<Self> {
        for (i, p) in parameters.iter().enumerate() {
            if parameters[..i].iter().any(|q| q.name == p.name) {
                return Err(ParamError::DuplicateName {
                    name: p.name.clone(),
                });
            }
        }
        Ok(Self {
            parameters,
            joint: None,
        })
    }

    /// Build from `(name, value, distribution)` rows. Equivalent to
    /// constructing the `Parameter` objects directly.
    pub fn from_rows(rows: &[(&str, Real, Option<Distribution>)]) -> ParamResult<Self> {
        Self::new(
            rows.iter()
                .map(|(name, value, distribution)| Parameter {
                    name: (*name).to_string(),
                    value: Some(*value),
                    distribution: distribution.clone(),
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.parameters.iter().map(|p| p.name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> ParamResult<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ParamError::UnknownParameter {
                name: name.to_string(),
            })
    }

    pub fn get_mut(&mut self, name: &str) -> ParamResult<&mut Parameter> {
        self.parameters
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| ParamError::UnknownParameter {
                name: name.to_string(),
            })
    }

    /// Set the distribution of one parameter, making it uncertain.
    pub fn set_distribution(&mut self, name: &str, distribution: Distribution) -> ParamResult<()> {
        self.get_mut(name)?.distribution = Some(distribution);
        Ok(())
    }

    /// Set the same distribution on every parameter.
    pub fn set_all_distributions(&mut self, distribution: Distribution) {
        for p in &mut self.parameters {
            p.distribution = Some(distribution.clone());
        }
    }

    /// Uncertain parameters in set order.
    pub fn uncertain(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.is_uncertain())
    }

    /// Names of the uncertain parameters, in set order. This order fixes
    /// grid-column and joint-marginal order.
    pub fn uncertain_names(&self) -> Vec<String> {
        self.uncertain().map(|p| p.name.clone()).collect()
    }

    /// Distributions of the uncertain parameters, in set order.
    pub fn uncertain_distributions(&self) -> Vec<&Distribution> {
        self.uncertain()
            .filter_map(|p| p.distribution.as_ref())
            .collect()
    }

    /// Install a joint distribution overriding the individual ones. The
    /// marginal count must equal the number of uncertain parameters.
    pub fn set_joint(&mut self, joint: JointDistribution) -> ParamResult<()> {
        let expected = self.uncertain().count();
        if joint.dim() != expected {
            return Err(ParamError::JointDimensionMismatch {
                expected,
                actual: joint.dim(),
            });
        }
        self.joint = Some(joint);
        Ok(())
    }

    pub fn joint(&self) -> Option<&JointDistribution> {
        self.joint.as_ref()
    }

    /// `(name, value)` pairs for every parameter holding a fixed value.
    pub fn fixed_values(&self) -> Vec<(String, Real)> {
        self.parameters
            .iter()
            .filter_map(|p| p.value.map(|v| (p.name.clone(), v)))
            .collect()
    }

    /// Rewrite every parameter occurrence in a text file back to its stored
    /// fixed value. Parameters without a value are an error.
    pub fn reset_parameter_file(&self, path: &Path) -> ParamResult<()> {
        for p in &self.parameters {
            let value = p.value.ok_or_else(|| ParamError::MissingValue {
                name: p.name.clone(),
            })?;
            substitute::set_parameter_file(path, &p.name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform01() -> Distribution {
        Distribution::uniform(0.0, 1.0).unwrap()
    }

    #[test]
    fn uncertain_names_skip_fixed_parameters() {
        let set = ParameterSet::from_rows(&[
            ("a", 1.0, Some(uniform01())),
            ("b", 2.0, None),
        ])
        .unwrap();
        assert_eq!(set.uncertain_names(), vec!["a".to_string()]);
    }

    #[test]
    fn row_and_object_construction_agree() {
        let from_rows = ParameterSet::from_rows(&[
            ("a", 1.0, Some(uniform01())),
            ("b", 2.0, None),
            ("c", 3.0, Some(uniform01())),
        ])
        .unwrap();
        let from_objects = ParameterSet::new(vec![
            Parameter::uncertain("a", 1.0, uniform01()),
            Parameter::fixed("b", 2.0),
            Parameter::uncertain("c", 3.0, uniform01()),
        ])
        .unwrap();
        assert_eq!(from_rows.uncertain_names(), from_objects.uncertain_names());
        assert_eq!(from_rows, from_objects);
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = ParameterSet::from_rows(&[("a", 1.0, None), ("a", 2.0, None)]).unwrap_err();
        assert!(matches!(err, ParamError::DuplicateName { .. }));
    }

    #[test]
    fn unknown_parameter_rejected() {
        let set = ParameterSet::from_rows(&[("a", 1.0, None)]).unwrap();
        assert!(matches!(
            set.get("missing"),
            Err(ParamError::UnknownParameter { .. })
        ));
    }

    #[test]
    fn set_distribution_makes_uncertain() {
        let mut set = ParameterSet::from_rows(&[("a", 1.0, None), ("b", 2.0, None)]).unwrap();
        set.set_distribution("b", uniform01()).unwrap();
        assert_eq!(set.uncertain_names(), vec!["b".to_string()]);
    }

    #[test]
    fn joint_dimension_enforced() {
        let mut set = ParameterSet::from_rows(&[
            ("a", 1.0, Some(uniform01())),
            ("b", 2.0, Some(uniform01())),
        ])
        .unwrap();
        let wrong = JointDistribution::new(vec![uniform01()]).unwrap();
        assert!(matches!(
            set.set_joint(wrong),
            Err(ParamError::JointDimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
        let right = JointDistribution::new(vec![uniform01(), uniform01()]).unwrap();
        set.set_joint(right).unwrap();
        assert_eq!(set.joint().map(|j| j.dim()), Some(2));
    }

    #[test]
    fn order_is_construction_order() {
        let set = ParameterSet::from_rows(&[
            ("z", 1.0, Some(uniform01())),
            ("a", 2.0, Some(uniform01())),
        ])
        .unwrap();
        assert_eq!(
            set.uncertain_names(),
            vec!["z".to_string(), "a".to_string()]
        );
    }
}
