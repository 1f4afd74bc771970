//! nq-runner: parallel model evaluation and result alignment.
//!
//! The scheduler takes an ordered grid over the uncertain parameters, fans
//! one evaluation task per node out to a fixed worker pool, gathers results
//! in submission order, and aligns the per-feature time series into an
//! [`nq_results::Data`] store for the surrogate-fitting stage.

pub mod evaluate;
pub mod grid;
pub mod options;
pub mod pool;
pub mod progress;
pub mod scheduler;

pub use evaluate::{EvalTask, FeatureSample, NodeSolve, RESPONSE_FEATURE};
pub use grid::Grid;
pub use options::RunOptions;
pub use progress::{RunProgressEvent, RunStage};
pub use scheduler::Runner;

pub type RunnerResult<T> = Result<T, RunnerError>;

#[derive(thiserror::Error, Debug)]
pub enum RunnerError {
    #[error("Configuration error: {what}")]
    Config { what: String },

    #[error("Node {index} evaluation failed: {message}")]
    NodeEvaluation { index: usize, message: String },

    #[error("Feature {feature} changed shape at node {index}: {detail}")]
    ShapeMismatch {
        feature: String,
        index: usize,
        detail: String,
    },

    #[error("Interpolation of 2-D adaptive output is not supported (feature {feature})")]
    Unsupported2dInterpolation { feature: String },

    #[error("Run incomplete: {succeeded} nodes succeeded, {failed} failed, {required} required")]
    Incomplete {
        succeeded: usize,
        failed: usize,
        required: usize,
    },

    #[error("Parameter error: {0}")]
    Param(#[from] nq_params::ParamError),

    #[error("Model error: {0}")]
    Model(#[from] nq_model::ModelError),

    #[error("Feature error: {0}")]
    Feature(#[from] nq_features::FeatureError),

    #[error("Numeric error: {0}")]
    Core(#[from] nq_core::CoreError),
}
