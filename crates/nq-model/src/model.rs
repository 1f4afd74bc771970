//! Model adapter trait and the plain-function adapter.

use crate::binding::ParameterBinding;
use crate::output::ModelOutput;
use crate::ModelResult;

/// Adapter contract for a user-supplied simulation.
///
/// Implementations are deterministic functions of the bound parameters,
/// suitable for parallel evaluation; the scheduler calls `run` once per grid
/// node from worker threads.
pub trait Model: Send + Sync {
    /// Model name used in manifests and diagnostics.
    fn name(&self) -> &str {
        "model"
    }

    /// Ordered output channel labels, the time axis first when one exists.
    /// An empty slice skips label checking.
    fn labels(&self) -> &[String];

    /// Whether the output shape may vary from node to node. When false the
    /// scheduler enforces identical shapes across the grid.
    fn adaptive(&self) -> bool {
        false
    }

    /// Execute the simulation for one bound parameter assignment.
    fn run(&self, binding: &ParameterBinding) -> ModelResult<ModelOutput>;
}

/// Wraps a plain function or closure as a [`Model`].
pub struct FnModel<F> {
    name: String,
    labels: Vec<String>,
    adaptive: bool,
    func: F,
}

impl<F> FnModel<F>
where
    F: Fn(&ParameterBinding) -> ModelResult<ModelOutput> + Send + Sync,
{
    pub fn new(name: impl Into<String>, labels: &[&str], func: F) -> Self {
        Self {
            name: name.into(),
            labels: labels.iter().map(|s| s.to_string()).collect(),
            adaptive: false,
            func,
        }
    }

    /// Mark the wrapped model as shape-varying.
    pub fn adaptive(mut self, adaptive: bool) -> Self {
        self.adaptive = adaptive;
        self
    }
}

impl<F> Model for FnModel<F>
where
    F: Fn(&ParameterBinding) -> ModelResult<ModelOutput> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn adaptive(&self) -> bool {
        self.adaptive
    }

    fn run(&self, binding: &ParameterBinding) -> ModelResult<ModelOutput> {
        (self.func)(binding)
    }
}
