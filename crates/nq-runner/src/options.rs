//! Run configuration.

use crate::{RunnerError, RunnerResult};

/// Options for one scheduling run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Worker pool size. Defaults to the available processing units.
    pub workers: usize,
    /// Silence model console output during each node evaluation.
    pub suppress_output: bool,
    /// Engage the process-wide headless display for the whole batch.
    pub suppress_graphics: bool,
    /// Skip failed nodes instead of aborting the run.
    pub allow_incomplete: bool,
    /// Minimum surviving nodes for an incomplete run to still count as a
    /// result. Only consulted when `allow_incomplete` is set.
    pub min_success: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            suppress_output: true,
            suppress_graphics: true,
            allow_incomplete: false,
            min_success: 1,
        }
    }
}

impl RunOptions {
    pub fn validate(&self) -> RunnerResult<()> {
        if self.workers == 0 {
            return Err(RunnerError::Config {
                what: "worker count must be at least 1".to_string(),
            });
        }
        if self.min_success == 0 {
            return Err(RunnerError::Config {
                what: "min_success must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
