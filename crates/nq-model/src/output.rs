//! Raw model output and its well-formedness checks.

use serde::{Deserialize, Serialize};

use nq_core::Real;

use crate::{ModelError, ModelResult};

/// Raw response values of one model or feature evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rank", content = "data")]
pub enum Values {
    Scalar(Real),
    Series(Vec<Real>),
    Matrix(Vec<Vec<Real>>),
}

impl Values {
    /// Dimensionality: 0 for scalars, 1 for series, 2 for matrices.
    pub fn rank(&self) -> usize {
        match self {
            Self::Scalar(_) => 0,
            Self::Series(_) => 1,
            Self::Matrix(_) => 2,
        }
    }

    /// Number of labeled value channels (matrix rows count individually).
    pub fn channel_count(&self) -> usize {
        match self {
            Self::Scalar(_) | Self::Series(_) => 1,
            Self::Matrix(rows) => rows.len(),
        }
    }

    pub fn as_scalar(&self) -> Option<Real> {
        match self {
            Self::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_series(&self) -> Option<&[Real]> {
        match self {
            Self::Series(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&[Vec<Real>]> {
        match self {
            Self::Matrix(rows) => Some(rows),
            _ => None,
        }
    }

    /// Shape as (rows, cols) with scalars reported as (1, 1) and series as
    /// (1, len).
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Self::Scalar(_) => (1, 1),
            Self::Series(u) => (1, u.len()),
            Self::Matrix(rows) => (rows.len(), rows.first().map_or(0, Vec::len)),
        }
    }
}

/// One model evaluation: an optional time axis plus response values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    pub time: Option<Vec<Real>>,
    pub values: Values,
}

impl ModelOutput {
    pub fn scalar(value: Real) -> Self {
        Self {
            time: None,
            values: Values::Scalar(value),
        }
    }

    pub fn series(time: Vec<Real>, values: Vec<Real>) -> Self {
        Self {
            time: Some(time),
            values: Values::Series(values),
        }
    }

    pub fn matrix(time: Vec<Real>, rows: Vec<Vec<Real>>) -> Self {
        Self {
            time: Some(time),
            values: Values::Matrix(rows),
        }
    }

    /// Enforce the adapter contract: non-empty, non-ragged values, a time
    /// axis consistent with the value lengths, and enough declared labels to
    /// name every output channel.
    pub fn validate(&self, labels: &[String]) -> ModelResult<()> {
        match &self.values {
            Values::Scalar(_) => {}
            Values::Series(u) => {
                if u.is_empty() {
                    return Err(malformed("model returned an empty series"));
                }
            }
            Values::Matrix(rows) => {
                if rows.is_empty() || rows.iter().any(Vec::is_empty) {
                    return Err(malformed("model returned an empty matrix"));
                }
                let width = rows[0].len();
                if rows.iter().any(|r| r.len() != width) {
                    return Err(malformed("model returned a ragged matrix"));
                }
            }
        }

        if let Some(time) = &self.time {
            if time.iter().any(|t| !t.is_finite()) {
                return Err(malformed("time axis contains non-finite entries"));
            }
            match &self.values {
                Values::Series(u) if u.len() != time.len() => {
                    return Err(ModelError::MalformedOutput {
                        reason: format!(
                            "series length {} does not match time length {}",
                            u.len(),
                            time.len()
                        ),
                    });
                }
                Values::Matrix(rows) if rows[0].len() != time.len() => {
                    return Err(ModelError::MalformedOutput {
                        reason: format!(
                            "matrix row length {} does not match time length {}",
                            rows[0].len(),
                            time.len()
                        ),
                    });
                }
                _ => {}
            }
        }

        if !labels.is_empty() {
            let needed = self.values.channel_count() + usize::from(self.time.is_some());
            if labels.len() < needed {
                return Err(ModelError::MalformedOutput {
                    reason: format!(
                        "output needs {} labels but only {} are declared",
                        needed,
                        labels.len()
                    ),
                });
            }
        }

        Ok(())
    }
}

fn malformed(reason: &str) -> ModelError {
    ModelError::MalformedOutput {
        reason: reason.to_string(),
    }
}
