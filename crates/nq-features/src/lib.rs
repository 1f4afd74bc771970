//! nq-features: named post-processing of raw model output.

pub mod builtin;
pub mod set;

pub use set::{Feature, FeatureOutput, FeatureSet, Selection};

pub type FeatureResult<T> = Result<T, FeatureError>;

#[derive(thiserror::Error, Debug)]
pub enum FeatureError {
    #[error("Unknown feature: {name}")]
    UnknownFeature { name: String },

    #[error("Duplicate feature name: {name}")]
    DuplicateName { name: String },

    #[error("Feature {name} failed: {message}")]
    Evaluation { name: String, message: String },
}
