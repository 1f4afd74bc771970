//! Serialization and construction-equivalence round trips.

use nq_params::{Distribution, Parameter, ParameterSet};

fn eta_distribution() -> Distribution {
    Distribution::uniform(1.5, 3.5).unwrap()
}

#[test]
fn parameter_set_survives_json_round_trip() {
    let mut set = ParameterSet::from_rows(&[
        ("eta", 2.0, Some(eta_distribution())),
        ("g", 5.0, Some(Distribution::normal(5.0, 1.0).unwrap())),
        ("delay", 1.5, None),
    ])
    .unwrap();
    set.set_distribution("delay", Distribution::log_normal(0.0, 0.5).unwrap())
        .unwrap();

    let json = serde_json::to_string(&set).unwrap();
    let loaded: ParameterSet = serde_json::from_str(&json).unwrap();

    assert_eq!(loaded, set);
    assert_eq!(
        loaded.uncertain_names(),
        vec!["eta".to_string(), "g".to_string(), "delay".to_string()]
    );
}

#[test]
fn rows_and_objects_expose_identical_uncertain_views() {
    let rows = ParameterSet::from_rows(&[
        ("eta", 2.0, Some(eta_distribution())),
        ("g", 5.0, None),
    ])
    .unwrap();
    let objects = ParameterSet::new(vec![
        Parameter::uncertain("eta", 2.0, eta_distribution()),
        Parameter::fixed("g", 5.0),
    ])
    .unwrap();

    assert_eq!(rows.uncertain_names(), objects.uncertain_names());
    assert_eq!(
        rows.uncertain_distributions(),
        objects.uncertain_distributions()
    );
    assert_eq!(rows.fixed_values(), objects.fixed_values());
}

#[test]
fn distribution_tags_are_stable() {
    let json = serde_json::to_string(&eta_distribution()).unwrap();
    assert!(json.contains("\"type\":\"Uniform\""));
    let back: Distribution = serde_json::from_str(&json).unwrap();
    assert_eq!(back, eta_distribution());
}
