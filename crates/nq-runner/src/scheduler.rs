//! Run scheduling, ordered collection, and result alignment.
//!
//! The run moves through dispatching, collecting, aligning. Dispatch builds
//! one task per grid node in node order; collection gathers worker results
//! in that same order regardless of completion order; alignment classifies
//! every feature by dimensionality and reconciles adaptive 1-D series onto
//! a canonical time basis.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use nq_core::{Interpolant, Real};
use nq_features::{FeatureSet, Selection};
use nq_model::{HeadlessDisplay, Model};
use nq_params::ParameterSet;
use nq_results::{Data, FeatureData, FeatureDim, Responses};

use crate::evaluate::{bind_node, evaluate_node, EvalTask, FeatureSample, NodeSolve, RESPONSE_FEATURE};
use crate::grid::Grid;
use crate::options::RunOptions;
use crate::pool;
use crate::progress::{RunProgressEvent, RunStage};
use crate::{RunnerError, RunnerResult};

type ProgressCallback<'a> = Option<&'a mut dyn FnMut(RunProgressEvent)>;

/// Schedules model evaluations over a grid and owns the result store for
/// the duration of one run.
pub struct Runner {
    model: Arc<dyn Model>,
    features: FeatureSet,
    selection: Selection,
    options: RunOptions,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("model", &self.model.name())
            .field("features", &self.features)
            .field("selection", &self.selection)
            .field("options", &self.options)
            .finish()
    }
}

impl Runner {
    pub fn new(
        model: Arc<dyn Model>,
        features: FeatureSet,
        options: RunOptions,
    ) -> RunnerResult<Self> {
        Self::with_selection(model, features, Selection::All, options)
    }

    pub fn with_selection(
        model: Arc<dyn Model>,
        features: FeatureSet,
        selection: Selection,
        options: RunOptions,
    ) -> RunnerResult<Self> {
        options.validate()?;
        if features.names().contains(&RESPONSE_FEATURE) {
            return Err(RunnerError::Config {
                what: format!("feature name {RESPONSE_FEATURE:?} is reserved for the raw model output"),
            });
        }
        Ok(Self {
            model,
            features,
            selection,
            options,
        })
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Evaluate the model over `grid` and return the aligned results.
    pub fn run(&self, parameters: &ParameterSet, grid: &Grid) -> RunnerResult<Data> {
        self.run_with_progress(parameters, grid, None)
    }

    /// Same as [`Runner::run`], streaming progress events to `progress` on
    /// the scheduler thread.
    pub fn run_with_progress(
        &self,
        parameters: &ParameterSet,
        grid: &Grid,
        mut progress: ProgressCallback<'_>,
    ) -> RunnerResult<Data> {
        let started = Instant::now();
        match self.run_inner(parameters, grid, &mut progress, started) {
            Ok(data) => {
                emit(
                    &mut progress,
                    RunStage::Completed,
                    data.surviving_count(),
                    grid.len(),
                    started,
                    Some("Run completed".to_string()),
                );
                Ok(data)
            }
            Err(err) => {
                emit(
                    &mut progress,
                    RunStage::Failed,
                    0,
                    grid.len(),
                    started,
                    Some(err.to_string()),
                );
                Err(err)
            }
        }
    }

    fn run_inner(
        &self,
        parameters: &ParameterSet,
        grid: &Grid,
        progress: &mut ProgressCallback<'_>,
        started: Instant,
    ) -> RunnerResult<Data> {
        if grid.is_empty() {
            return Err(RunnerError::Config {
                what: "grid has no nodes".to_string(),
            });
        }
        let uncertain = parameters.uncertain_names();
        if grid.names() != uncertain.as_slice() {
            return Err(RunnerError::Config {
                what: format!(
                    "grid columns {:?} do not match the uncertain parameters {:?}",
                    grid.names(),
                    uncertain
                ),
            });
        }

        let selected = self.features.select(&self.selection)?;

        let tasks = grid
            .nodes()
            .iter()
            .enumerate()
            .map(|(index, node)| {
                Ok(EvalTask {
                    index,
                    binding: bind_node(parameters, grid.names(), node)?,
                })
            })
            .collect::<RunnerResult<Vec<_>>>()?;

        let total = tasks.len();
        emit(
            progress,
            RunStage::Dispatching,
            0,
            total,
            started,
            Some(format!(
                "Dispatching {} nodes to {} workers",
                total, self.options.workers
            )),
        );
        info!(
            nodes = total,
            workers = self.options.workers,
            model = self.model.name(),
            "starting run"
        );

        // The headless display is a process-wide resource held across the
        // whole dispatch+collect phase and released before alignment.
        let display = if self.options.suppress_graphics {
            Some(HeadlessDisplay::acquire()?)
        } else {
            None
        };

        let model = self.model.as_ref();
        let quiet = self.options.suppress_output;
        let allow_incomplete = self.options.allow_incomplete;
        let selected = &selected;

        let results = pool::run_ordered(
            &tasks,
            self.options.workers,
            |_, task| evaluate_node(model, selected, task, quiet),
            |done, result: &RunnerResult<NodeSolve>| {
                emit(
                    progress,
                    RunStage::Collecting,
                    done.completed,
                    done.total,
                    started,
                    None,
                );
                allow_incomplete || result.is_ok()
            },
        );

        drop(display);

        let mut solves: Vec<(usize, NodeSolve)> = Vec::with_capacity(results.len());
        let mut failures: Vec<(usize, RunnerError)> = Vec::new();
        for (index, result) in results {
            match result {
                Ok(solve) => solves.push((index, solve)),
                Err(err) => failures.push((index, err)),
            }
        }

        if !allow_incomplete && !failures.is_empty() {
            let (index, err) = failures.swap_remove(0);
            return Err(RunnerError::NodeEvaluation {
                index,
                message: err.to_string(),
            });
        }
        for (index, err) in &failures {
            warn!(node = *index, error = %err, "node evaluation failed; skipping");
        }

        let required = self.options.min_success;
        if allow_incomplete && solves.len() < required {
            return Err(RunnerError::Incomplete {
                succeeded: solves.len(),
                failed: failures.len(),
                required,
            });
        }

        emit(
            progress,
            RunStage::Aligning,
            solves.len(),
            total,
            started,
            Some("Aligning results".to_string()),
        );

        let mut data = Data::new(uncertain, total);
        data.skipped_nodes = failures.iter().map(|(index, _)| *index).collect();
        self.store_results(&solves, &mut data)?;

        info!(
            features = data.feature_names().len(),
            skipped = data.skipped_nodes.len(),
            elapsed_s = started.elapsed().as_secs_f64(),
            "run aligned"
        );
        Ok(data)
    }

    /// Classify every feature from the first surviving solve and collect the
    /// per-node responses into the store.
    fn store_results(&self, solves: &[(usize, NodeSolve)], data: &mut Data) -> RunnerResult<()> {
        let adaptive = self.model.adaptive();
        let (first_index, first) = &solves[0];

        for (name, first_sample) in &first.samples {
            let rank = first_sample.values.rank();
            debug!(feature = %name, rank, "classifying feature");

            let mut samples: Vec<(usize, &FeatureSample)> = Vec::with_capacity(solves.len());
            for (index, solve) in solves {
                let sample = solve.samples.get(name).ok_or_else(|| {
                    RunnerError::ShapeMismatch {
                        feature: name.clone(),
                        index: *index,
                        detail: "feature missing from this node's results".to_string(),
                    }
                })?;
                if sample.values.rank() != rank {
                    return Err(RunnerError::ShapeMismatch {
                        feature: name.clone(),
                        index: *index,
                        detail: format!(
                            "rank {} differs from rank {} of node {}",
                            sample.values.rank(),
                            rank,
                            first_index
                        ),
                    });
                }
                samples.push((*index, sample));
            }

            let feature_data = match rank {
                0 => align_scalars(&samples),
                1 => align_series(name, &samples, adaptive)?,
                2 => align_fields(name, &samples, adaptive)?,
                _ => {
                    return Err(RunnerError::ShapeMismatch {
                        feature: name.clone(),
                        index: *first_index,
                        detail: format!("unsupported rank {}", rank),
                    })
                }
            };
            data.insert_feature(name.clone(), feature_data);
        }
        Ok(())
    }
}

/// 0-D: one scalar per node, no time basis.
fn align_scalars(samples: &[(usize, &FeatureSample)]) -> FeatureData {
    FeatureData {
        dim: FeatureDim::Zero,
        time: None,
        responses: Responses::Scalars {
            values: samples
                .iter()
                .filter_map(|(_, s)| s.values.as_scalar())
                .collect(),
        },
    }
}

/// 1-D: interpolate onto the longest native basis when the model is
/// adaptive, otherwise require identical lengths across nodes.
fn align_series(
    name: &str,
    samples: &[(usize, &FeatureSample)],
    adaptive: bool,
) -> RunnerResult<FeatureData> {
    if adaptive {
        let interpolants: Option<Vec<&Interpolant>> =
            samples.iter().map(|(_, s)| s.interpolant.as_ref()).collect();
        if let Some(interpolants) = interpolants {
            // Canonical basis: the longest native basis, first node on ties.
            let mut canonical = interpolants[0];
            for interp in &interpolants[1..] {
                if interp.sample_count() > canonical.sample_count() {
                    canonical = interp;
                }
            }
            let time = canonical.time().to_vec();
            let values: Vec<Vec<Real>> = interpolants
                .iter()
                .map(|interp| interp.eval_many(&time))
                .collect();
            return Ok(FeatureData {
                dim: FeatureDim::One,
                time: Some(time),
                responses: Responses::Series { values },
            });
        }
        // Without per-node time bases there is nothing to interpolate
        // against; fall through to the fixed-shape path.
    }

    let mut values = Vec::with_capacity(samples.len());
    let mut expected_len: Option<usize> = None;
    for (index, sample) in samples {
        let Some(u) = sample.values.as_series() else {
            return Err(RunnerError::ShapeMismatch {
                feature: name.to_string(),
                index: *index,
                detail: "expected a 1-D response".to_string(),
            });
        };
        match expected_len {
            None => expected_len = Some(u.len()),
            Some(len) if u.len() != len => {
                return Err(RunnerError::ShapeMismatch {
                    feature: name.to_string(),
                    index: *index,
                    detail: format!(
                        "length {} differs from length {} of earlier nodes; \
                         set adaptive=true if the model output varies",
                        u.len(),
                        len
                    ),
                });
            }
            _ => {}
        }
        values.push(u.to_vec());
    }

    Ok(FeatureData {
        dim: FeatureDim::One,
        time: samples[0].1.time.clone(),
        responses: Responses::Series { values },
    })
}

/// 2-D: adaptive interpolation is unsupported; fixed shapes are collected
/// as-is.
fn align_fields(
    name: &str,
    samples: &[(usize, &FeatureSample)],
    adaptive: bool,
) -> RunnerResult<FeatureData> {
    if adaptive && samples.iter().any(|(_, s)| s.time.is_some()) {
        return Err(RunnerError::Unsupported2dInterpolation {
            feature: name.to_string(),
        });
    }

    let mut values = Vec::with_capacity(samples.len());
    let mut expected_shape: Option<(usize, usize)> = None;
    for (index, sample) in samples {
        let Some(rows) = sample.values.as_matrix() else {
            return Err(RunnerError::ShapeMismatch {
                feature: name.to_string(),
                index: *index,
                detail: "expected a 2-D response".to_string(),
            });
        };
        let shape = sample.values.shape();
        match expected_shape {
            None => expected_shape = Some(shape),
            Some(s) if s != shape => {
                return Err(RunnerError::ShapeMismatch {
                    feature: name.to_string(),
                    index: *index,
                    detail: format!(
                        "shape {:?} differs from shape {:?} of earlier nodes; \
                         set adaptive=true if the model output varies",
                        shape, s
                    ),
                });
            }
            _ => {}
        }
        values.push(rows.to_vec());
    }

    Ok(FeatureData {
        dim: FeatureDim::Two,
        time: samples[0].1.time.clone(),
        responses: Responses::Fields { values },
    })
}

fn emit(
    progress: &mut ProgressCallback<'_>,
    stage: RunStage,
    completed: usize,
    total: usize,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress.as_deref_mut() {
        cb(RunProgressEvent {
            stage,
            completed,
            total,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            message,
        });
    }
}
