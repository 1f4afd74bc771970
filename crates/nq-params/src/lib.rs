//! nq-params: uncertain-parameter schema and parameter-file utilities.

pub mod distribution;
pub mod parameter;
pub mod substitute;

pub use distribution::{Distribution, JointDistribution};
pub use parameter::{Parameter, ParameterSet};

pub type ParamResult<T> = Result<T, ParamError>;

#[derive(thiserror::Error, Debug)]
pub enum ParamError {
    #[error("Duplicate parameter name: {name}")]
    DuplicateName { name: String },

    #[error("Unknown parameter: {name}")]
    UnknownParameter { name: String },

    #[error("Invalid distribution: {reason}")]
    InvalidDistribution { reason: &'static str },

    #[error("Joint distribution covers {actual} dimensions but {expected} parameters are uncertain")]
    JointDimensionMismatch { expected: usize, actual: usize },

    #[error("Parameter {name} has no fixed value")]
    MissingValue { name: String },

    #[error("Invalid substitution pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
