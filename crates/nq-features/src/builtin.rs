//! Built-in scalar summary features over 1-D responses.

use nq_core::Real;
use nq_model::Values;

use crate::set::{FeatureOutput, FeatureSet};
use crate::{FeatureError, FeatureResult};

fn series_of<'a>(name: &str, values: &'a Values) -> FeatureResult<&'a [Real]> {
    values
        .as_series()
        .ok_or_else(|| FeatureError::Evaluation {
            name: name.to_string(),
            message: "requires a 1-D response".to_string(),
        })
}

/// Mean of the response series.
pub fn mean(_time: Option<&[Real]>, values: &Values) -> FeatureResult<FeatureOutput> {
    let u = series_of("mean", values)?;
    Ok(FeatureOutput::scalar(
        u.iter().sum::<Real>() / u.len() as Real,
    ))
}

/// Largest response value.
pub fn max(_time: Option<&[Real]>, values: &Values) -> FeatureResult<FeatureOutput> {
    let u = series_of("max", values)?;
    Ok(FeatureOutput::scalar(
        u.iter().copied().fold(Real::NEG_INFINITY, Real::max),
    ))
}

/// Smallest response value.
pub fn min(_time: Option<&[Real]>, values: &Values) -> FeatureResult<FeatureOutput> {
    let u = series_of("min", values)?;
    Ok(FeatureOutput::scalar(
        u.iter().copied().fold(Real::INFINITY, Real::min),
    ))
}

/// Registry holding the built-in summary features.
pub fn standard() -> FeatureSet {
    let mut set = FeatureSet::new();
    // Registration cannot collide in a fresh set.
    let _ = set.register("mean", mean);
    let _ = set.register("max", max);
    let _ = set.register("min", min);
    set
}
