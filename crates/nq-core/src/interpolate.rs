//! Piecewise-linear interpolation for reconciling time series.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::numeric::{ensure_finite, Real};

/// Piecewise-linear interpolant over a strictly increasing time basis.
///
/// Outside the native domain the nearest boundary segment is extended
/// linearly. Evaluating an interpolant on a canonical basis longer than its
/// own therefore extrapolates; the result is an approximation with no
/// accuracy bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpolant {
    time: Vec<Real>,
    values: Vec<Real>,
}

impl Interpolant {
    pub fn new(time: Vec<Real>, values: Vec<Real>) -> CoreResult<Self> {
        if time.len() != values.len() {
            return Err(CoreError::InvalidArg {
                what: "time and values must have equal length",
            });
        }
        if time.len() < 2 {
            return Err(CoreError::InvalidArg {
                what: "interpolant needs at least two samples",
            });
        }
        for &t in &time {
            ensure_finite(t, "interpolant time")?;
        }
        for &v in &values {
            ensure_finite(v, "interpolant value")?;
        }
        if time.windows(2).any(|w| w[1] <= w[0]) {
            return Err(CoreError::InvalidArg {
                what: "time basis must be strictly increasing",
            });
        }
        Ok(Self { time, values })
    }

    /// Number of native samples (always at least 2).
    pub fn sample_count(&self) -> usize {
        self.time.len()
    }

    /// Native time domain (first, last).
    pub fn domain(&self) -> (Real, Real) {
        (self.time[0], self.time[self.time.len() - 1])
    }

    pub fn time(&self) -> &[Real] {
        &self.time
    }

    /// Evaluate at `t`, extending boundary segments outside the domain.
    pub fn eval(&self, t: Real) -> Real {
        let n = self.time.len();
        let seg = self
            .time
            .partition_point(|&x| x <= t)
            .saturating_sub(1)
            .min(n - 2);
        let (t0, t1) = (self.time[seg], self.time[seg + 1]);
        let (v0, v1) = (self.values[seg], self.values[seg + 1]);
        v0 + (v1 - v0) * (t - t0) / (t1 - t0)
    }

    /// Evaluate at every point of `ts`.
    pub fn eval_many(&self, ts: &[Real]) -> Vec<Real> {
        ts.iter().map(|&t| self.eval(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Interpolant {
        Interpolant::new(vec![0.0, 1.0, 2.0, 4.0], vec![0.0, 2.0, 4.0, 8.0]).unwrap()
    }

    #[test]
    fn reproduces_sample_points() {
        let interp = ramp();
        assert_eq!(interp.eval(0.0), 0.0);
        assert_eq!(interp.eval(1.0), 2.0);
        assert_eq!(interp.eval(4.0), 8.0);
    }

    #[test]
    fn interpolates_between_samples() {
        let interp = ramp();
        assert_eq!(interp.eval(0.5), 1.0);
        assert_eq!(interp.eval(3.0), 6.0);
    }

    #[test]
    fn extrapolates_boundary_segments() {
        let interp = ramp();
        assert_eq!(interp.eval(-1.0), -2.0);
        assert_eq!(interp.eval(5.0), 10.0);
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = Interpolant::new(vec![0.0, 1.0], vec![0.0]).unwrap_err();
        assert!(format!("{err}").contains("equal length"));
    }

    #[test]
    fn rejects_single_sample() {
        assert!(Interpolant::new(vec![0.0], vec![1.0]).is_err());
    }

    #[test]
    fn rejects_unsorted_time() {
        assert!(Interpolant::new(vec![0.0, 2.0, 1.0], vec![0.0, 1.0, 2.0]).is_err());
        assert!(Interpolant::new(vec![0.0, 0.0, 1.0], vec![0.0, 1.0, 2.0]).is_err());
    }

    #[test]
    fn rejects_non_finite() {
        assert!(Interpolant::new(vec![0.0, Real::NAN], vec![0.0, 1.0]).is_err());
        assert!(Interpolant::new(vec![0.0, 1.0], vec![0.0, Real::INFINITY]).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn native_points_are_reproduced(values in prop::collection::vec(-1e6_f64..1e6, 2..20)) {
            let time: Vec<Real> = (0..values.len()).map(|i| i as Real).collect();
            let interp = Interpolant::new(time.clone(), values.clone()).unwrap();
            for (t, v) in time.iter().zip(&values) {
                prop_assert!((interp.eval(*t) - v).abs() <= 1e-9 * v.abs().max(1.0));
            }
        }

        #[test]
        fn eval_is_bounded_between_neighbors(a in -1e3_f64..1e3, b in -1e3_f64..1e3, frac in 0.0_f64..1.0) {
            let interp = Interpolant::new(vec![0.0, 1.0], vec![a, b]).unwrap();
            let v = interp.eval(frac);
            let (lo, hi) = (a.min(b), a.max(b));
            prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
        }
    }
}
