//! Probability distributions carried by uncertain parameters.
//!
//! Only the construction, mean, and quantile interface live here; this is
//! the contract the external quadrature/sampling stage consumes. Moment and
//! sensitivity estimators are downstream concerns.

use rand::Rng;
use serde::{Deserialize, Serialize};

use nq_core::Real;

use crate::{ParamError, ParamResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Distribution {
    Uniform { lower: Real, upper: Real },
    Normal { mean: Real, std_dev: Real },
    LogNormal { mu: Real, sigma: Real },
}

impl Distribution {
    pub fn uniform(lower: Real, upper: Real) -> ParamResult<Self> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(ParamError::InvalidDistribution {
                reason: "uniform bounds must be finite",
            });
        }
        if lower >= upper {
            return Err(ParamError::InvalidDistribution {
                reason: "uniform lower bound must be below upper bound",
            });
        }
        Ok(Self::Uniform { lower, upper })
    }

    pub fn normal(mean: Real, std_dev: Real) -> ParamResult<Self> {
        if !mean.is_finite() || !std_dev.is_finite() {
            return Err(ParamError::InvalidDistribution {
                reason: "normal parameters must be finite",
            });
        }
        if std_dev <= 0.0 {
            return Err(ParamError::InvalidDistribution {
                reason: "normal standard deviation must be positive",
            });
        }
        Ok(Self::Normal { mean, std_dev })
    }

    pub fn log_normal(mu: Real, sigma: Real) -> ParamResult<Self> {
        if !mu.is_finite() || !sigma.is_finite() {
            return Err(ParamError::InvalidDistribution {
                reason: "log-normal parameters must be finite",
            });
        }
        if sigma <= 0.0 {
            return Err(ParamError::InvalidDistribution {
                reason: "log-normal sigma must be positive",
            });
        }
        Ok(Self::LogNormal { mu, sigma })
    }

    pub fn mean(&self) -> Real {
        match *self {
            Self::Uniform { lower, upper } => 0.5 * (lower + upper),
            Self::Normal { mean, .. } => mean,
            Self::LogNormal { mu, sigma } => (mu + 0.5 * sigma * sigma).exp(),
        }
    }

    /// Inverse CDF. `p` is clamped into the open unit interval so the tails
    /// stay finite.
    pub fn quantile(&self, p: Real) -> Real {
        let p = p.clamp(1e-12, 1.0 - 1e-12);
        match *self {
            Self::Uniform { lower, upper } => lower + (upper - lower) * p,
            Self::Normal { mean, std_dev } => mean + std_dev * standard_normal_quantile(p),
            Self::LogNormal { mu, sigma } => (mu + sigma * standard_normal_quantile(p)).exp(),
        }
    }

    /// Draw one value by pushing a uniform variate through the quantile.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Real {
        self.quantile(rng.gen::<Real>())
    }
}

/// Multivariate distribution overriding the individual distributions of the
/// uncertain parameters. Marginals are ordered to match the uncertain
/// parameters by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointDistribution {
    marginals: Vec<Distribution>,
}

impl JointDistribution {
    pub fn new(marginals: Vec<Distribution>) -> ParamResult<Self> {
        if marginals.is_empty() {
            return Err(ParamError::InvalidDistribution {
                reason: "joint distribution needs at least one marginal",
            });
        }
        Ok(Self { marginals })
    }

    pub fn dim(&self) -> usize {
        self.marginals.len()
    }

    pub fn marginals(&self) -> &[Distribution] {
        &self.marginals
    }
}

/// Standard normal inverse CDF, Acklam's rational approximation.
///
/// Relative error below 1.15e-9 over the open unit interval, which is ample
/// for grid generation.
fn standard_normal_quantile(p: Real) -> Real {
    const A: [Real; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [Real; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [Real; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [Real; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: Real = 0.02425;

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn uniform_validation() {
        assert!(Distribution::uniform(0.0, 1.0).is_ok());
        assert!(Distribution::uniform(1.0, 1.0).is_err());
        assert!(Distribution::uniform(2.0, 1.0).is_err());
        assert!(Distribution::uniform(Real::NAN, 1.0).is_err());
    }

    #[test]
    fn normal_validation() {
        assert!(Distribution::normal(0.0, 1.0).is_ok());
        assert!(Distribution::normal(0.0, 0.0).is_err());
        assert!(Distribution::normal(0.0, -1.0).is_err());
    }

    #[test]
    fn uniform_quantile_is_affine() {
        let d = Distribution::uniform(2.0, 4.0).unwrap();
        assert!((d.quantile(0.5) - 3.0).abs() < 1e-9);
        assert!((d.quantile(0.25) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn normal_quantile_symmetry() {
        let d = Distribution::normal(0.0, 1.0).unwrap();
        assert!(d.quantile(0.5).abs() < 1e-8);
        assert!((d.quantile(0.975) - 1.959964).abs() < 1e-4);
        assert!((d.quantile(0.025) + 1.959964).abs() < 1e-4);
    }

    #[test]
    fn samples_stay_in_uniform_support() {
        let d = Distribution::uniform(-1.0, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let x = d.sample(&mut rng);
            assert!((-1.0..=1.0).contains(&x));
        }
    }

    #[test]
    fn joint_dimension() {
        let joint = JointDistribution::new(vec![
            Distribution::uniform(0.0, 1.0).unwrap(),
            Distribution::normal(0.0, 1.0).unwrap(),
        ])
        .unwrap();
        assert_eq!(joint.dim(), 2);
        assert!(JointDistribution::new(vec![]).is_err());
    }
}
