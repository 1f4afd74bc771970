//! Feature registry and selection.

use nq_core::Real;
use nq_model::Values;

use crate::{FeatureError, FeatureResult};

/// One feature evaluation: an optional time axis plus derived values.
///
/// `time: None` declares the feature dimensionless along time; together with
/// the rank of `values` this drives the 0-D/1-D/2-D classification performed
/// at result-collection time.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureOutput {
    pub time: Option<Vec<Real>>,
    pub values: Values,
}

impl FeatureOutput {
    pub fn scalar(value: Real) -> Self {
        Self {
            time: None,
            values: Values::Scalar(value),
        }
    }

    pub fn series(time: Option<Vec<Real>>, values: Vec<Real>) -> Self {
        Self {
            time,
            values: Values::Series(values),
        }
    }
}

type FeatureFn =
    dyn Fn(Option<&[Real]>, &Values) -> FeatureResult<FeatureOutput> + Send + Sync;

/// A named post-processing function over the model's `(time, values)`.
pub struct Feature {
    name: String,
    func: Box<FeatureFn>,
}

impl Feature {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn evaluate(
        &self,
        time: Option<&[Real]>,
        values: &Values,
    ) -> FeatureResult<FeatureOutput> {
        (self.func)(time, values).map_err(|e| match e {
            FeatureError::Evaluation { message, .. } => FeatureError::Evaluation {
                name: self.name.clone(),
                message,
            },
            other => other,
        })
    }
}

impl std::fmt::Debug for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feature").field("name", &self.name).finish()
    }
}

/// Which registered features to run.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection {
    #[default]
    All,
    Named(Vec<String>),
}

impl Selection {
    pub fn named(names: &[&str]) -> Self {
        Self::Named(names.iter().map(|s| s.to_string()).collect())
    }
}

/// Ordered registry of named features.
#[derive(Debug, Default)]
pub struct FeatureSet {
    features: Vec<Feature>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a feature function. Names must be unique.
    pub fn register<F>(&mut self, name: impl Into<String>, func: F) -> FeatureResult<()>
    where
        F: Fn(Option<&[Real]>, &Values) -> FeatureResult<FeatureOutput> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.features.iter().any(|f| f.name == name) {
            return Err(FeatureError::DuplicateName { name });
        }
        self.features.push(Feature {
            name,
            func: Box::new(func),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }

    /// Resolve a selection into features, preserving registration order.
    /// Unknown names are a configuration error.
    pub fn select(&self, selection: &Selection) -> FeatureResult<Vec<&Feature>> {
        match selection {
            Selection::All => Ok(self.features.iter().collect()),
            Selection::Named(names) => {
                for name in names {
                    if !self.features.iter().any(|f| &f.name == name) {
                        return Err(FeatureError::UnknownFeature {
                            name: name.clone(),
                        });
                    }
                }
                Ok(self
                    .features
                    .iter()
                    .filter(|f| names.contains(&f.name))
                    .collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passthrough(set: &mut FeatureSet, name: &str) {
        set.register(name, |time, values| {
            Ok(FeatureOutput {
                time: time.map(<[Real]>::to_vec),
                values: values.clone(),
            })
        })
        .unwrap();
    }

    #[test]
    fn selection_all_preserves_order() {
        let mut set = FeatureSet::new();
        passthrough(&mut set, "b");
        passthrough(&mut set, "a");
        let selected = set.select(&Selection::All).unwrap();
        let names: Vec<&str> = selected.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn unknown_selection_rejected() {
        let mut set = FeatureSet::new();
        passthrough(&mut set, "a");
        let err = set.select(&Selection::named(&["a", "missing"])).unwrap_err();
        assert!(matches!(err, FeatureError::UnknownFeature { .. }));
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut set = FeatureSet::new();
        passthrough(&mut set, "a");
        let err = set
            .register("a", |_, _| Ok(FeatureOutput::scalar(0.0)))
            .unwrap_err();
        assert!(matches!(err, FeatureError::DuplicateName { .. }));
    }

    #[test]
    fn evaluation_error_carries_feature_name() {
        let mut set = FeatureSet::new();
        set.register("broken", |_, _| {
            Err(FeatureError::Evaluation {
                name: String::new(),
                message: "boom".to_string(),
            })
        })
        .unwrap();
        let selected = set.select(&Selection::All).unwrap();
        let err = selected[0]
            .evaluate(None, &Values::Scalar(1.0))
            .unwrap_err();
        assert!(format!("{err}").contains("broken"));
    }
}
