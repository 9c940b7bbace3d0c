//! Default linear scoring policy.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::scenario::{Bound, Constraints, State};

/// Breakdown component: sum of numeric fields.
pub const VALUE_SUM: &str = "value_sum";
/// Breakdown component: linear penalty for violated bounds.
pub const CONSTRAINT_PENALTY: &str = "constraint_penalty";

/// Penalty per unit of bound violation.
pub const PENALTY_PER_UNIT: f64 = 10.0;

/// Named decomposition of a state's score, in component order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreBreakdown(IndexMap<String, f64>);

impl ScoreBreakdown {
    /// Sum of all components, accumulated in component order.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.values().fold(0.0, |acc, v| acc + v)
    }

    #[must_use]
    pub fn get(&self, component: &str) -> Option<f64> {
        self.0.get(component).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, component: &str, value: f64) {
        self.0.insert(component.to_string(), value);
    }
}

/// Scores a state against the constraints.
///
/// Numeric fields are summed; each violated `min_`/`max_` bound on a present
/// numeric field subtracts ten times the size of the violation. Bounds on
/// absent or non-numeric fields are ignored.
#[must_use]
pub fn score(state: &State, constraints: &Constraints) -> ScoreBreakdown {
    let value_sum = state
        .values()
        .filter_map(crate::value::FieldValue::as_f64)
        .fold(0.0, |acc, v| acc + v);

    let mut penalty = 0.0;
    for (key, &limit) in constraints {
        let Some(bound) = Bound::parse(key, limit) else {
            continue;
        };
        match bound {
            Bound::Max { field, limit } => {
                if let Some(actual) = state.get(field).and_then(|v| v.as_f64()) {
                    if actual > limit {
                        penalty -= (actual - limit) * PENALTY_PER_UNIT;
                    }
                }
            }
            Bound::Min { field, limit } => {
                if let Some(actual) = state.get(field).and_then(|v| v.as_f64()) {
                    if actual < limit {
                        penalty -= (limit - actual) * PENALTY_PER_UNIT;
                    }
                }
            }
        }
    }

    let mut breakdown = ScoreBreakdown::default();
    breakdown.push(VALUE_SUM, value_sum);
    breakdown.push(CONSTRAINT_PENALTY, penalty);
    breakdown
}
