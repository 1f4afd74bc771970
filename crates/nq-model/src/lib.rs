//! nq-model: the adapter contract between user simulations and the run
//! pipeline.

pub mod binding;
pub mod model;
pub mod output;
pub mod suppress;

pub use binding::ParameterBinding;
pub use model::{FnModel, Model};
pub use output::{ModelOutput, Values};
pub use suppress::{HeadlessDisplay, SilencedIo};

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("Malformed model output: {reason}")]
    MalformedOutput { reason: String },

    #[error("Model parameter not bound: {name}")]
    MissingParameter { name: String },

    #[error("Virtual display already engaged")]
    DisplayBusy,

    #[error("Model evaluation failed: {message}")]
    Evaluation { message: String },
}
