//! Aligned result data types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use nq_core::Real;

use crate::{ResultsError, ResultsResult};

pub type RunId = String;

/// Dimensionality class assigned to a feature at collection time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureDim {
    Zero,
    One,
    Two,
}

impl FeatureDim {
    pub fn from_rank(rank: usize) -> Option<Self> {
        match rank {
            0 => Some(Self::Zero),
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }
}

/// Per-node responses of one feature, one entry per surviving node in grid
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Responses {
    Scalars { values: Vec<Real> },
    Series { values: Vec<Vec<Real>> },
    Fields { values: Vec<Vec<Vec<Real>>> },
}

impl Responses {
    /// Number of node entries.
    pub fn len(&self) -> usize {
        match self {
            Self::Scalars { values } => values.len(),
            Self::Series { values } => values.len(),
            Self::Fields { values } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One feature's aligned time basis and responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureData {
    pub dim: FeatureDim,
    /// Shared (or canonical, for adaptive 1-D) time basis; `None` for 0-D
    /// features and for outputs that never carried a time axis.
    pub time: Option<Vec<Real>>,
    pub responses: Responses,
}

/// Aligned results of one full run, keyed by feature name.
///
/// Owned exclusively by the scheduler while a run executes; handed to the
/// surrogate-fitting stage afterwards as `(t, U)` pairs per feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Data {
    pub uncertain_parameters: Vec<String>,
    pub node_count: usize,
    /// Grid indices of nodes that failed and were excluded under the
    /// incomplete-run tolerance.
    pub skipped_nodes: Vec<usize>,
    features: BTreeMap<String, FeatureData>,
}

impl Data {
    pub fn new(uncertain_parameters: Vec<String>, node_count: usize) -> Self {
        Self {
            uncertain_parameters,
            node_count,
            skipped_nodes: Vec::new(),
            features: BTreeMap::new(),
        }
    }

    /// Clear collected results, keeping the parameter layout.
    pub fn reset(&mut self) {
        self.features.clear();
        self.skipped_nodes.clear();
    }

    pub fn insert_feature(&mut self, name: impl Into<String>, data: FeatureData) {
        self.features.insert(name.into(), data);
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.features.keys().map(String::as_str).collect()
    }

    pub fn feature(&self, name: &str) -> ResultsResult<&FeatureData> {
        self.features
            .get(name)
            .ok_or_else(|| ResultsError::FeatureNotFound {
                name: name.to_string(),
            })
    }

    /// Aligned time basis of a feature (`None` for 0-D features).
    pub fn t(&self, name: &str) -> ResultsResult<Option<&[Real]>> {
        Ok(self.feature(name)?.time.as_deref())
    }

    /// Aligned responses of a feature.
    pub fn responses(&self, name: &str) -> ResultsResult<&Responses> {
        Ok(&self.feature(name)?.responses)
    }

    /// Nodes that produced results.
    pub fn surviving_count(&self) -> usize {
        self.node_count - self.skipped_nodes.len()
    }

    /// True when no node was skipped.
    pub fn is_complete(&self) -> bool {
        self.skipped_nodes.is_empty()
    }
}

/// Metadata describing one stored run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub model_name: String,
    pub timestamp: String,
    pub node_count: usize,
    pub skipped: usize,
}

impl RunManifest {
    pub fn new(run_id: RunId, model_name: impl Into<String>, data: &Data) -> Self {
        Self {
            run_id,
            model_name: model_name.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            node_count: data.node_count,
            skipped: data.skipped_nodes.len(),
        }
    }
}
