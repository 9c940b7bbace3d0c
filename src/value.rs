//! Field values held by simulation states.
//!
//! A state field is numeric (integer or float), boolean, string, null, or
//! arbitrary nested JSON. Scoring and transitions only ever look at the
//! numeric variants.

use serde::{Deserialize, Serialize};

/// A single state field value.
///
/// Serialized untagged, so `{"x": 10, "name": "a"}` reads as
/// `Int(10)` and `String("a")`.
///
/// # Examples
///
/// ```
/// use beamsim::FieldValue;
///
/// let int_val = FieldValue::Int(3);
/// let flag = FieldValue::Bool(true);
///
/// assert!(int_val.is_numeric());
/// assert!(!flag.is_numeric());
/// assert_eq!(int_val.as_f64(), Some(3.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Structured(serde_json::Value),
}

impl FieldValue {
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// False only for a float that is infinite or NaN.
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Float(v) => v.is_finite(),
            _ => true,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Adds two numeric values.
    ///
    /// Integer plus integer stays an integer unless it overflows; any float
    /// operand yields a float. Returns `None` when either side is not numeric.
    #[must_use]
    pub fn checked_add(&self, rhs: &Self) -> Option<Self> {
        match (self, rhs) {
            (Self::Int(a), Self::Int(b)) => Some(
                a.checked_add(*b)
                    .map_or_else(|| Self::Float(int_as_f64(*a) + int_as_f64(*b)), Self::Int),
            ),
            _ => Some(Self::Float(self.as_f64()? + rhs.as_f64()?)),
        }
    }

    /// Subtracts `rhs` from `self`, with the same typing rules as [`Self::checked_add`].
    #[must_use]
    pub fn checked_sub(&self, rhs: &Self) -> Option<Self> {
        match (self, rhs) {
            (Self::Int(a), Self::Int(b)) => Some(
                a.checked_sub(*b)
                    .map_or_else(|| Self::Float(int_as_f64(*a) - int_as_f64(*b)), Self::Int),
            ),
            _ => Some(Self::Float(self.as_f64()? - rhs.as_f64()?)),
        }
    }

    /// Returns a human-readable type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Structured(_) => "structured",
        }
    }
}

#[allow(clippy::cast_precision_loss)]
const fn int_as_f64(v: i64) -> f64 {
    v as f64
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::Null
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Structured(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}
