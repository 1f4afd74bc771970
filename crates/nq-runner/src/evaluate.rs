//! Single-node evaluation: bind, run, post-process.

use std::collections::BTreeMap;

use nq_core::{Interpolant, Real};
use nq_features::Feature;
use nq_model::{Model, ParameterBinding, SilencedIo, Values};
use nq_params::ParameterSet;

use crate::RunnerResult;

/// Name under which the raw model output travels through alignment.
pub const RESPONSE_FEATURE: &str = "response";

/// One node's evaluation task: its grid position and bound parameters.
#[derive(Debug, Clone)]
pub struct EvalTask {
    pub index: usize,
    pub binding: ParameterBinding,
}

/// One feature's raw result for a single node. The interpolant is attached
/// for 1-D outputs of adaptive models so the alignment step can reconcile
/// differing native time bases.
#[derive(Debug, Clone)]
pub struct FeatureSample {
    pub time: Option<Vec<Real>>,
    pub values: Values,
    pub interpolant: Option<Interpolant>,
}

/// All feature samples of one node, keyed by feature name.
#[derive(Debug, Clone)]
pub struct NodeSolve {
    pub samples: BTreeMap<String, FeatureSample>,
}

/// Overlay one grid node's uncertain values onto the set's fixed values.
/// Unknown grid names are a configuration error.
pub fn bind_node(
    parameters: &ParameterSet,
    names: &[String],
    node: &[Real],
) -> RunnerResult<ParameterBinding> {
    let mut binding = ParameterBinding::new(parameters.fixed_values());
    for (name, &value) in names.iter().zip(node) {
        parameters.get(name)?;
        binding.set(name, value);
    }
    Ok(binding)
}

/// Evaluate one node: run the model, validate its output, then run every
/// selected feature against the model's `(time, values)`.
///
/// Console silencing is scoped to this call and restored on every exit path.
pub fn evaluate_node(
    model: &dyn Model,
    features: &[&Feature],
    task: &EvalTask,
    quiet: bool,
) -> RunnerResult<NodeSolve> {
    let _silence = quiet.then(SilencedIo::engage);

    let output = model.run(&task.binding)?;
    output.validate(model.labels())?;

    let mut samples = BTreeMap::new();
    samples.insert(
        RESPONSE_FEATURE.to_string(),
        build_sample(model.adaptive(), output.time.clone(), output.values.clone())?,
    );

    for feature in features {
        let derived = feature.evaluate(output.time.as_deref(), &output.values)?;
        samples.insert(
            feature.name().to_string(),
            build_sample(model.adaptive(), derived.time, derived.values)?,
        );
    }

    Ok(NodeSolve { samples })
}

fn build_sample(
    adaptive: bool,
    time: Option<Vec<Real>>,
    values: Values,
) -> RunnerResult<FeatureSample> {
    let interpolant = match (&time, &values) {
        (Some(t), Values::Series(u)) if adaptive => Some(Interpolant::new(t.clone(), u.clone())?),
        _ => None,
    };
    Ok(FeatureSample {
        time,
        values,
        interpolant,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nq_model::{FnModel, ModelOutput};
    use nq_params::{Distribution, ParameterSet};

    fn params() -> ParameterSet {
        ParameterSet::from_rows(&[
            ("a", 1.0, Some(Distribution::uniform(0.0, 2.0).unwrap())),
            ("b", 2.0, None),
        ])
        .unwrap()
    }

    #[test]
    fn binding_overlays_node_values() {
        let p = params();
        let binding = bind_node(&p, &["a".to_string()], &[1.5]).unwrap();
        assert_eq!(binding.get("a").unwrap(), 1.5);
        assert_eq!(binding.get("b").unwrap(), 2.0);
    }

    #[test]
    fn binding_rejects_unknown_names() {
        let p = params();
        assert!(bind_node(&p, &["zz".to_string()], &[1.0]).is_err());
    }

    #[test]
    fn raw_response_is_always_sampled() {
        let model = FnModel::new("m", &["t", "v"], |binding| {
            let a = binding.get("a")?;
            Ok(ModelOutput::series(vec![0.0, 1.0], vec![a, a + 1.0]))
        });
        let task = EvalTask {
            index: 0,
            binding: bind_node(&params(), &["a".to_string()], &[0.5]).unwrap(),
        };
        let solve = evaluate_node(&model, &[], &task, false).unwrap();
        let sample = &solve.samples[RESPONSE_FEATURE];
        assert_eq!(sample.values.as_series().unwrap(), &[0.5, 1.5]);
        assert!(sample.interpolant.is_none());
    }

    #[test]
    fn adaptive_series_carries_interpolant() {
        let model = FnModel::new("m", &["t", "v"], |_| {
            Ok(ModelOutput::series(vec![0.0, 1.0, 2.0], vec![0.0, 2.0, 4.0]))
        })
        .adaptive(true);
        let task = EvalTask {
            index: 0,
            binding: ParameterBinding::default(),
        };
        let solve = evaluate_node(&model, &[], &task, false).unwrap();
        let interp = solve.samples[RESPONSE_FEATURE]
            .interpolant
            .as_ref()
            .unwrap();
        assert_eq!(interp.eval(1.5), 3.0);
    }

    #[test]
    fn malformed_output_fails_the_node() {
        let model = FnModel::new("m", &["t", "v"], |_| {
            Ok(ModelOutput::series(vec![0.0, 1.0, 2.0], vec![1.0]))
        });
        let task = EvalTask {
            index: 0,
            binding: ParameterBinding::default(),
        };
        assert!(evaluate_node(&model, &[], &task, false).is_err());
    }
}
