//! Error types for beamsim.
//!
//! All errors are strongly typed using thiserror so callers can pattern
//! match on the failure class: invalid input, unknown run, or storage I/O.

use thiserror::Error;

use crate::storage::StorageError;

/// Validation errors raised while checking caller input.
///
/// These are reported synchronously and never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField {
        field: String,
    },

    #[error("Field '{field}' is invalid: {reason}")]
    InvalidField {
        field: String,
        reason: String,
    },

    #[error("Scenario must contain a non-empty 'initial_state'")]
    EmptyInitialState,

    #[error("{name} must be a positive integer")]
    InvalidParameter {
        name: &'static str,
    },

    #[error("Simulation produced a non-finite {what} (f64 overflow)")]
    NonFinite {
        what: &'static str,
    },

    #[error("Invalid resource URI '{uri}': {reason}")]
    InvalidUri {
        uri: String,
        reason: String,
    },
}

impl ValidationError {
    pub(crate) fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Top-level error type for beamsim.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("Simulation not found: {run_id}")]
    NotFound {
        run_id: String,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {message}")]
    Config {
        message: String,
    },
}

impl SimError {
    /// Creates a not-found error for a run identifier.
    #[must_use]
    pub fn not_found(run_id: impl Into<String>) -> Self {
        Self::NotFound {
            run_id: run_id.into(),
        }
    }

    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns true if retrying the same call could succeed.
    ///
    /// Only filesystem failures qualify; bad input and unknown runs do not
    /// change on retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(StorageError::Io { .. }))
    }
}

impl From<config::ConfigError> for SimError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}

/// Result type alias for beamsim operations.
pub type SimResult<T> = Result<T, SimError>;
