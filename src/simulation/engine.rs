//! Beam search engine.
//!
//! `Init -> {Expand -> Score -> Prune}* -> Terminate`. The beam is a vector
//! of at most `beam_width` states sorted by descending score; every step is
//! snapshotted before it is expanded.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{SimResult, ValidationError};
use crate::scenario::{Constraints, Scenario, State};
use crate::value::FieldValue;

use super::actions::{apply_action, generate_actions};
use super::scoring::{score, ScoreBreakdown};
use super::seed::rng_for;

/// History entry of the root state.
pub const INITIAL_STEP: &str = "initial";

/// Search parameters for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeamConfig {
    /// Maximum states retained per step.
    pub beam_width: usize,
    /// Maximum expansion steps.
    pub max_steps: usize,
    /// Explicit RNG seed; `None` derives one from the scenario.
    pub seed: Option<i64>,
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            beam_width: 5,
            max_steps: 10,
            seed: None,
        }
    }
}

impl BeamConfig {
    /// Validate the parameters.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.beam_width == 0 {
            return Err(ValidationError::InvalidParameter { name: "beamWidth" });
        }
        if self.max_steps == 0 {
            return Err(ValidationError::InvalidParameter { name: "maxSteps" });
        }
        Ok(())
    }
}

/// A node of the search: values, score, and the path that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub values: State,
    pub score: f64,
    pub history: Vec<String>,
}

impl SimulationState {
    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            values: self.values.clone(),
            score: self.score,
            history: self.history.clone(),
        }
    }

    fn ranked(&self) -> RankedState {
        RankedState {
            values: self.values.clone(),
            score: self.score,
            path: self.history.clone(),
        }
    }
}

/// A beam entry as recorded in `intermediate_states`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub values: State,
    pub score: f64,
    pub history: Vec<String>,
}

/// A final-beam entry as reported in `best_result` and `top_k`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedState {
    pub values: State,
    pub score: f64,
    pub path: Vec<String>,
}

/// The terminal record of a run. Persisted verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub run_id: String,
    pub best_result: RankedState,
    pub top_k: Vec<RankedState>,
    pub score_breakdown: ScoreBreakdown,
    pub intermediate_states: Vec<Vec<StateSnapshot>>,
    pub scenario: Scenario,
    pub constraints: Constraints,
}

impl SimulationResult {
    /// First part of the record holding an infinite or NaN float, if any.
    ///
    /// JSON has no encoding for such numbers, so a record for which this
    /// returns `Some` cannot be persisted and read back.
    #[must_use]
    pub fn non_finite_field(&self) -> Option<&'static str> {
        let finite_state = |values: &State| values.values().all(FieldValue::is_finite);

        if !self.score_breakdown.iter().all(|(_, v)| v.is_finite()) {
            return Some("score breakdown");
        }
        let ranked = std::iter::once(&self.best_result).chain(&self.top_k);
        let snapshots = self.intermediate_states.iter().flatten();
        for (score, values) in ranked
            .map(|r| (r.score, &r.values))
            .chain(snapshots.map(|s| (s.score, &s.values)))
        {
            if !score.is_finite() {
                return Some("score");
            }
            if !finite_state(values) {
                return Some("state value");
            }
        }
        None
    }
}

/// Deterministic beam search simulator.
#[derive(Debug, Clone)]
pub struct BeamSimulator {
    config: BeamConfig,
}

impl BeamSimulator {
    /// Create a simulator; the config must be valid.
    pub fn new(config: BeamConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Execute the search.
    ///
    /// For fixed scenario, constraints and config (with an explicit seed or
    /// identical content), the result is identical across runs.
    pub fn run(
        &self,
        run_id: impl Into<String>,
        scenario: &Scenario,
        constraints: &Constraints,
    ) -> SimResult<SimulationResult> {
        let run_id = run_id.into();
        scenario.validate()?;
        let mut rng = rng_for(self.config.seed, scenario, constraints)?;

        let initial = &scenario.initial_state;
        let mut beam = vec![SimulationState {
            values: initial.clone(),
            score: score(initial, constraints).total(),
            history: vec![INITIAL_STEP.to_string()],
        }];
        let mut intermediate_states = Vec::new();
        let mut exhausted = false;

        for step in 0..self.config.max_steps {
            intermediate_states.push(beam.iter().map(SimulationState::snapshot).collect());

            let mut candidates = Vec::new();
            for state in &beam {
                for action in generate_actions(&state.values, scenario, &mut rng) {
                    let values = apply_action(&state.values, &action);
                    let total = score(&values, constraints).total();
                    let mut history = state.history.clone();
                    history.push(action.describe());
                    candidates.push(SimulationState {
                        values,
                        score: total,
                        history,
                    });
                }
            }

            if candidates.is_empty() {
                debug!(run_id = %run_id, step, "no actions available, stopping early");
                exhausted = true;
                break;
            }

            let expanded = candidates.len();
            candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
            candidates.truncate(self.config.beam_width);
            beam = candidates;
            debug!(
                run_id = %run_id,
                step,
                candidates = expanded,
                kept = beam.len(),
                best = beam[0].score,
                "beam step"
            );
        }

        if !exhausted {
            intermediate_states.push(beam.iter().map(SimulationState::snapshot).collect());
        }

        // Never empty: it starts as the root and is only replaced by a
        // non-empty candidate list.
        let best = &beam[0];
        let score_breakdown = score(&best.values, constraints);

        info!(
            run_id = %run_id,
            steps = intermediate_states.len(),
            best = best.score,
            "simulation complete"
        );

        let result = SimulationResult {
            best_result: best.ranked(),
            top_k: beam.iter().map(SimulationState::ranked).collect(),
            run_id,
            score_breakdown,
            intermediate_states,
            scenario: scenario.clone(),
            constraints: constraints.clone(),
        };
        if let Some(what) = result.non_finite_field() {
            warn!(run_id = %result.run_id, what, "run overflowed the f64 range");
            return Err(ValidationError::NonFinite { what }.into());
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Action;
    use crate::value::FieldValue;

    fn scenario(fields: &[(&str, i64)]) -> Scenario {
        Scenario::new(
            fields
                .iter()
                .map(|(k, v)| ((*k).to_string(), FieldValue::Int(*v)))
                .collect(),
        )
    }

    fn simulator(beam_width: usize, max_steps: usize, seed: Option<i64>) -> BeamSimulator {
        BeamSimulator::new(BeamConfig {
            beam_width,
            max_steps,
            seed,
        })
        .unwrap()
    }

    #[test]
    fn config_rejects_zero_limits() {
        let mut c = BeamConfig::default();
        c.beam_width = 0;
        assert!(BeamSimulator::new(c).is_err());

        let mut c = BeamConfig::default();
        c.max_steps = 0;
        assert!(BeamSimulator::new(c).is_err());

        BeamConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_initial_state_is_invalid_input() {
        let err = simulator(3, 2, Some(1))
            .run("r", &Scenario::new(State::new()), &Constraints::new())
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn snapshot_count_is_steps_plus_final() {
        let result = simulator(3, 4, Some(1))
            .run("r", &scenario(&[("x", 0)]), &Constraints::new())
            .unwrap();
        assert_eq!(result.intermediate_states.len(), 5);
        assert_eq!(result.intermediate_states[0].len(), 1);
        assert_eq!(result.intermediate_states[0][0].history, vec![INITIAL_STEP]);
    }

    #[test]
    fn fixed_actions_drive_the_path() {
        let s = scenario(&[("x", 0)]).with_actions(vec![
            Action::increment("x", 2),
            Action::decrement("x", 1),
        ]);
        let result = simulator(2, 3, None).run("r", &s, &Constraints::new()).unwrap();

        assert_eq!(result.best_result.values["x"], FieldValue::Int(6));
        assert_eq!(
            result.best_result.path,
            vec!["initial", "increment(x)", "increment(x)", "increment(x)"]
        );
        assert_eq!(result.best_result.score, 6.0);
        assert_eq!(result.top_k.len(), 2);
    }

    #[test]
    fn ties_keep_generation_order() {
        let s = scenario(&[("x", 0)]).with_actions(vec![
            Action::set("a", 1),
            Action::set("b", 1),
            Action::set("c", 1),
        ]);
        let result = simulator(2, 1, None).run("r", &s, &Constraints::new()).unwrap();
        let paths: Vec<&str> = result.top_k.iter().map(|r| r.path[1].as_str()).collect();
        assert_eq!(paths, vec!["set(a)", "set(b)"]);
    }

    #[test]
    fn breakdown_is_recomputed_for_best() {
        let mut constraints = Constraints::new();
        constraints.insert("max_x".to_string(), 1.0);
        let s = scenario(&[("x", 0)]).with_actions(vec![Action::increment("x", 3)]);
        let result = simulator(1, 1, None).run("r", &s, &constraints).unwrap();

        assert_eq!(result.score_breakdown.get("value_sum"), Some(3.0));
        assert_eq!(result.score_breakdown.get("constraint_penalty"), Some(-20.0));
        assert_eq!(result.score_breakdown.total(), result.best_result.score);
    }

    #[test]
    fn empty_action_list_stops_after_initial_snapshot() {
        let s = scenario(&[("x", 4)]).with_actions(Vec::new());
        let result = simulator(3, 5, Some(2)).run("r", &s, &Constraints::new()).unwrap();

        assert_eq!(result.intermediate_states.len(), 1);
        assert_eq!(result.best_result.values, s.initial_state);
        assert_eq!(result.best_result.path, vec![INITIAL_STEP]);
        assert_eq!(result.best_result.score, 4.0);
        assert_eq!(result.top_k.len(), 1);
    }

    #[test]
    fn no_numeric_fields_stops_early() {
        let mut state = State::new();
        state.insert("name".to_string(), FieldValue::String("a".into()));
        let result = simulator(3, 5, Some(2))
            .run("r", &Scenario::new(state.clone()), &Constraints::new())
            .unwrap();
        assert_eq!(result.intermediate_states.len(), 1);
        assert_eq!(result.best_result.values, state);
    }

    #[test]
    fn huge_step_limit_with_no_actions_stops_immediately() {
        let s = scenario(&[("x", 1)]).with_actions(Vec::new());
        let result = simulator(5, usize::MAX, None)
            .run("r", &s, &Constraints::new())
            .unwrap();
        assert_eq!(result.intermediate_states.len(), 1);
        assert_eq!(result.best_result.path, vec![INITIAL_STEP]);
    }

    #[test]
    fn overflowing_score_is_invalid_input() {
        let mut state = State::new();
        state.insert("x".to_string(), FieldValue::Float(1e308));
        state.insert("y".to_string(), FieldValue::Float(1e308));
        let err = simulator(2, 2, Some(1))
            .run("r", &Scenario::new(state), &Constraints::new())
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("non-finite"));
    }

    #[test]
    fn overflowing_delta_is_invalid_input() {
        let s = Scenario::new(
            [("x".to_string(), FieldValue::Float(f64::MAX))]
                .into_iter()
                .collect(),
        )
        .with_actions(vec![Action::increment("x", f64::MAX)]);
        let err = simulator(1, 1, None).run("r", &s, &Constraints::new()).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn integer_overflow_stays_finite() {
        let s = scenario(&[("x", i64::MAX)]).with_actions(vec![Action::increment("x", 1)]);
        let result = simulator(1, 2, None).run("r", &s, &Constraints::new()).unwrap();
        assert!(matches!(result.best_result.values["x"], FieldValue::Float(_)));
        assert!(result.non_finite_field().is_none());
    }
}
