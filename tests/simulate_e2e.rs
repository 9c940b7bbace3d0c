use std::sync::Arc;

use beamsim::simulation::{apply_action, score};
use beamsim::{
    Action, BeamConfig, BeamSimulator, Constraints, FieldValue, InMemoryRunStore, Scenario,
    SimulationResult, SimulationService, State,
};
use serde_json::json;

fn state(fields: &[(&str, FieldValue)]) -> State {
    fields
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

fn constraints(entries: &[(&str, f64)]) -> Constraints {
    entries.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
}

fn run(scenario: &Scenario, constraints: &Constraints, config: BeamConfig) -> SimulationResult {
    BeamSimulator::new(config)
        .unwrap()
        .run("test-run", scenario, constraints)
        .unwrap()
}

fn mixed_scenario() -> Scenario {
    Scenario::new(state(&[
        ("x", FieldValue::Int(3)),
        ("y", FieldValue::Float(1.25)),
        ("label", FieldValue::String("probe".into())),
        ("z", FieldValue::Int(-2)),
    ]))
}

#[test]
fn seeded_runs_are_identical_including_run_id() {
    let svc = SimulationService::new(Arc::new(InMemoryRunStore::new()));
    let args = json!({
        "scenario": {"initial_state": {"x": 3, "y": 1.25, "z": -2}},
        "constraints": {"max_x": 6, "min_z": 0},
        "beamWidth": 4,
        "maxSteps": 6,
        "seed": 1234
    });

    let first = svc.run(&args).unwrap();
    let second = svc.run(&args).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.run_id, second.run_id);
    assert_eq!(first.intermediate_states.len(), 7);
}

#[test]
fn different_seeds_explore_differently() {
    let c = constraints(&[("max_x", 6.0)]);
    let config = |seed| BeamConfig {
        beam_width: 3,
        max_steps: 4,
        seed: Some(seed),
    };
    let a = run(&mixed_scenario(), &c, config(1));
    let b = run(&mixed_scenario(), &c, config(2));
    assert_ne!(a.intermediate_states, b.intermediate_states);
}

#[test]
fn unseeded_runs_replay_same_content() {
    let c = constraints(&[("max_y", 2.0)]);
    let config = BeamConfig {
        beam_width: 3,
        max_steps: 5,
        seed: None,
    };
    assert_eq!(
        run(&mixed_scenario(), &c, config),
        run(&mixed_scenario(), &c, config)
    );
}

#[test]
fn unseeded_runs_get_distinct_ids() {
    let svc = SimulationService::new(Arc::new(InMemoryRunStore::new()));
    let args = json!({"scenario": {"initial_state": {"x": 1}}, "maxSteps": 1});
    let a = svc.run(&args).unwrap();
    let b = svc.run(&args).unwrap();
    assert_ne!(a.run_id, b.run_id);
    assert_eq!(a.intermediate_states, b.intermediate_states);
    assert_eq!(svc.list_resources().unwrap().len(), 2);
}

#[test]
fn beam_never_exceeds_width_and_stays_sorted() {
    for width in 1..=4 {
        let result = run(
            &mixed_scenario(),
            &constraints(&[("max_x", 4.0), ("min_y", 2.0)]),
            BeamConfig {
                beam_width: width,
                max_steps: 5,
                seed: Some(77),
            },
        );
        for snapshot in &result.intermediate_states {
            assert!(snapshot.len() <= width);
            assert!(snapshot.windows(2).all(|w| w[0].score >= w[1].score));
        }
        assert!(result.top_k.len() <= width);
    }
}

#[test]
fn pruning_keeps_the_best_candidates() {
    let actions = vec![
        Action::increment("x", 2),
        Action::decrement("x", 1),
        Action::set("y", 4),
        Action::increment("y", 0.5),
    ];
    let scenario = Scenario::new(state(&[("x", FieldValue::Int(0)), ("y", FieldValue::Int(1))]))
        .with_actions(actions.clone());
    let c = constraints(&[("max_x", 3.0), ("max_y", 4.5)]);
    let result = run(
        &scenario,
        &c,
        BeamConfig {
            beam_width: 3,
            max_steps: 4,
            seed: None,
        },
    );

    for pair in result.intermediate_states.windows(2) {
        let mut candidate_scores: Vec<f64> = pair[0]
            .iter()
            .flat_map(|s| actions.iter().map(|a| score(&apply_action(&s.values, a), &c).total()))
            .collect();
        candidate_scores.sort_by(|a, b| b.total_cmp(a));

        let kept: Vec<f64> = pair[1].iter().map(|s| s.score).collect();
        assert_eq!(kept, candidate_scores[..kept.len()].to_vec());

        let kept_min = kept.iter().copied().fold(f64::INFINITY, f64::min);
        assert!(candidate_scores[kept.len()..].iter().all(|s| *s <= kept_min));
    }
}

#[test]
fn best_result_is_head_of_final_beam() {
    let result = run(
        &mixed_scenario(),
        &Constraints::new(),
        BeamConfig {
            beam_width: 2,
            max_steps: 3,
            seed: Some(5),
        },
    );
    let last = result.intermediate_states.last().unwrap();
    assert_eq!(result.best_result.values, last[0].values);
    assert_eq!(result.best_result.path, last[0].history);
    assert_eq!(result.top_k.len(), last.len());
    assert_eq!(result.best_result.path.len(), 4);
}

#[test]
fn scoring_example_breakdown() {
    let b = score(
        &state(&[("x", FieldValue::Int(10))]),
        &constraints(&[("max_x", 5.0)]),
    );
    assert_eq!(b.get("value_sum"), Some(10.0));
    assert_eq!(b.get("constraint_penalty"), Some(-50.0));
    assert_eq!(b.total(), -40.0);
}

#[test]
fn explicit_empty_action_list_terminates_immediately() {
    let scenario = Scenario::new(state(&[("x", FieldValue::Int(10))])).with_actions(Vec::new());
    let c = constraints(&[("max_x", 5.0)]);
    let result = run(
        &scenario,
        &c,
        BeamConfig {
            beam_width: 5,
            max_steps: 10,
            seed: Some(1),
        },
    );

    assert_eq!(result.intermediate_states.len(), 1);
    assert_eq!(result.best_result.values, scenario.initial_state);
    assert_eq!(result.best_result.score, -40.0);
    assert_eq!(result.score_breakdown.total(), -40.0);
}

#[test]
fn run_leaves_inputs_untouched() {
    let scenario = mixed_scenario();
    let c = constraints(&[("max_x", 4.0)]);
    let scenario_before = scenario.clone();
    let result = run(
        &scenario,
        &c,
        BeamConfig {
            beam_width: 2,
            max_steps: 3,
            seed: Some(9),
        },
    );
    assert_eq!(scenario, scenario_before);
    assert_eq!(result.scenario, scenario_before);
    assert_eq!(result.constraints, c);
    assert_eq!(result.intermediate_states[0][0].values, scenario.initial_state);
}

#[test]
fn invalid_arguments_are_rejected_before_running() {
    let store = Arc::new(InMemoryRunStore::new());
    let svc = SimulationService::new(store.clone());

    for args in [
        json!({}),
        json!({"scenario": {"initial_state": {}}}),
        json!({"scenario": {"initial_state": {"x": 1}}, "beamWidth": 0}),
        json!({"scenario": {"initial_state": {"x": 1}}, "maxSteps": "ten"}),
        json!({"scenario": {"initial_state": {"x": 1}}, "seed": 1.5}),
    ] {
        let err = svc.run(&args).unwrap_err();
        assert!(err.is_invalid_input(), "{args} should be invalid input, got {err}");
    }
    assert!(svc.list_resources().unwrap().is_empty());
}

#[test]
fn huge_max_steps_with_empty_actions_finishes() {
    let svc = SimulationService::new(Arc::new(InMemoryRunStore::new()));
    let result = svc
        .run(&json!({
            "scenario": {"initial_state": {"x": 1}, "actions": []},
            "maxSteps": u64::MAX,
            "seed": 1
        }))
        .unwrap();
    assert_eq!(result.intermediate_states.len(), 1);
    assert_eq!(result.best_result.path, vec!["initial"]);
}

#[test]
fn overflowing_scores_are_rejected_and_not_stored() {
    let svc = SimulationService::new(Arc::new(InMemoryRunStore::new()));
    let err = svc
        .run(&json!({"scenario": {"initial_state": {"x": 1e308, "y": 1e308}}, "seed": 1}))
        .unwrap_err();
    assert!(err.is_invalid_input(), "got {err}");
    assert!(svc.list_resources().unwrap().is_empty());
}

#[test]
fn integer_extremes_run_without_panicking() {
    let scenario = Scenario::new(state(&[
        ("hi", FieldValue::Int(i64::MAX)),
        ("lo", FieldValue::Int(i64::MIN)),
    ]))
    .with_actions(vec![Action::increment("hi", 1), Action::decrement("lo", 1)]);
    let result = run(
        &scenario,
        &constraints(&[("max_hi", 0.0), ("min_lo", 0.0)]),
        BeamConfig {
            beam_width: 2,
            max_steps: 3,
            seed: Some(6),
        },
    );
    assert!(result.best_result.score.is_finite());
    assert!(result.non_finite_field().is_none());
    let head = &result.top_k[0].values;
    assert!(
        matches!(head["hi"], FieldValue::Float(_)) || matches!(head["lo"], FieldValue::Float(_))
    );
}
