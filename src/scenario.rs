//! Scenario input types: initial state, actions, and constraints.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::value::FieldValue;

/// Insertion-ordered mapping from field name to value.
///
/// Iteration order is the order fields were first inserted, which keeps
/// scoring and default action generation reproducible.
pub type State = IndexMap<String, FieldValue>;

/// Caller-supplied scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Starting field values.
    pub initial_state: State,
    /// Fixed action set offered at every expansion.
    ///
    /// `None` means actions are synthesized from the numeric fields of each
    /// state; `Some(vec![])` means no action is ever available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<Action>>,
}

impl Scenario {
    /// Creates a scenario with synthesized actions.
    #[must_use]
    pub fn new(initial_state: State) -> Self {
        Self {
            initial_state,
            actions: None,
        }
    }

    /// Sets a fixed action list.
    #[must_use]
    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = Some(actions);
        self
    }

    /// Validates the scenario before a run.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.initial_state.is_empty() {
            return Err(ValidationError::EmptyInitialState);
        }
        if let Some(actions) = &self.actions {
            for (i, action) in actions.iter().enumerate() {
                if let Some(delta) = &action.delta {
                    if !delta.is_numeric() {
                        return Err(ValidationError::invalid_field(
                            format!("actions[{i}].delta"),
                            format!("expected a number, got {}", delta.type_name()),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Kind of state transformation an action performs.
///
/// Unknown kinds are kept verbatim; applying them is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    Increment,
    Decrement,
    Set,
    Other(String),
}

impl ActionKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Increment => "increment",
            Self::Decrement => "decrement",
            Self::Set => "set",
            Self::Other(name) => name,
        }
    }
}

impl Default for ActionKind {
    fn default() -> Self {
        Self::Other("unknown".to_string())
    }
}

impl From<String> for ActionKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "increment" => Self::Increment,
            "decrement" => Self::Decrement,
            "set" => Self::Set,
            _ => Self::Other(s),
        }
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state-transforming action descriptor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type", default)]
    pub kind: ActionKind,
    #[serde(default)]
    pub field: String,
    /// Magnitude for increment/decrement. Defaults to 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<FieldValue>,
    /// Explicit value for set. Defaults to 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
}

impl Action {
    #[must_use]
    pub fn increment(field: impl Into<String>, delta: impl Into<FieldValue>) -> Self {
        Self {
            kind: ActionKind::Increment,
            field: field.into(),
            delta: Some(delta.into()),
            value: None,
        }
    }

    #[must_use]
    pub fn decrement(field: impl Into<String>, delta: impl Into<FieldValue>) -> Self {
        Self {
            kind: ActionKind::Decrement,
            field: field.into(),
            delta: Some(delta.into()),
            value: None,
        }
    }

    #[must_use]
    pub fn set(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            kind: ActionKind::Set,
            field: field.into(),
            delta: None,
            value: Some(value.into()),
        }
    }

    /// Renders the history entry for this action, e.g. `increment(x)`.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{}({})", self.kind, self.field)
    }
}

/// Ordered `min_<field>` / `max_<field>` limits.
///
/// Keys with any other shape are retained but impose nothing.
pub type Constraints = IndexMap<String, f64>;

/// A single parsed constraint bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound<'a> {
    Min { field: &'a str, limit: f64 },
    Max { field: &'a str, limit: f64 },
}

impl<'a> Bound<'a> {
    /// Parses a constraint entry; returns `None` for keys that are not bounds.
    #[must_use]
    pub fn parse(key: &'a str, limit: f64) -> Option<Self> {
        if let Some(field) = key.strip_prefix("max_") {
            Some(Self::Max { field, limit })
        } else {
            key.strip_prefix("min_")
                .map(|field| Self::Min { field, limit })
        }
    }
}
