//! Action generation and state transitions.

use rand::Rng;

use crate::scenario::{Action, ActionKind, Scenario, State};
use crate::value::FieldValue;

use super::seed::SimRng;

/// Range of magnitudes drawn for synthesized actions.
const SYNTH_DELTA_MIN: f64 = 0.5;
const SYNTH_DELTA_MAX: f64 = 2.0;

/// Candidate actions for a state.
///
/// A scenario with a fixed action list offers copies of exactly that list,
/// in order, at every expansion. Otherwise each numeric field (in insertion
/// order) gets one drawn magnitude in `[0.5, 2.0)` and an increment plus a
/// decrement using it.
pub fn generate_actions(state: &State, scenario: &Scenario, rng: &mut SimRng) -> Vec<Action> {
    if let Some(actions) = &scenario.actions {
        return actions.clone();
    }

    let mut actions = Vec::new();
    for (field, value) in state {
        if !value.is_numeric() {
            continue;
        }
        let delta = rng.gen_range(SYNTH_DELTA_MIN..SYNTH_DELTA_MAX);
        actions.push(Action::increment(field.clone(), delta));
        actions.push(Action::decrement(field.clone(), delta));
    }
    actions
}

/// Applies an action, returning a new state. The input is never touched.
///
/// Unknown kinds, increments of missing or non-numeric fields, and `set`
/// with an empty field name leave the state unchanged.
#[must_use]
pub fn apply_action(state: &State, action: &Action) -> State {
    let mut next = state.clone();
    let default_delta = FieldValue::Int(1);
    let delta = action.delta.as_ref().unwrap_or(&default_delta);

    match action.kind {
        ActionKind::Increment | ActionKind::Decrement => {
            if let Some(current) = next.get_mut(&action.field) {
                let updated = if action.kind == ActionKind::Increment {
                    current.checked_add(delta)
                } else {
                    current.checked_sub(delta)
                };
                if let Some(updated) = updated {
                    *current = updated;
                }
            }
        }
        ActionKind::Set => {
            if !action.field.is_empty() {
                let value = action.value.clone().unwrap_or(FieldValue::Int(0));
                next.insert(action.field.clone(), value);
            }
        }
        ActionKind::Other(_) => {}
    }
    next
}
