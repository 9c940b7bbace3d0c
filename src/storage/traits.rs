//! Abstract run store contract.
//!
//! The simulation service only talks to this trait, so backends can be
//! swapped (in-memory for tests and embedded use, JSON file for durability).

use thiserror::Error;

use crate::simulation::SimulationResult;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or rewriting the backing file failed.
    #[error("I/O failure while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The stored data could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The record holds an infinite or NaN float, which JSON cannot carry.
    #[error("Refusing to store run {run_id}: non-finite {what}")]
    NonFinite {
        run_id: String,
        what: &'static str,
    },

    /// A thread panicked while holding the store lock.
    #[error("Poisoned lock: {0}")]
    LockPoisoned(&'static str),
}

impl StorageError {
    pub(crate) fn io(context: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| Self::Io { context, source }
    }
}

/// Durable mapping from run identifier to result record.
///
/// # Safety Considerations
/// - `save` replaces any existing record with the same id
/// - Implementations serialize concurrent callers within one process
pub trait RunStore: Send + Sync {
    /// Store a record under `run_id`.
    fn save(&self, run_id: &str, record: &SimulationResult) -> Result<(), StorageError>;

    /// Get a record by id.
    fn get(&self, run_id: &str) -> Result<Option<SimulationResult>, StorageError>;

    /// All stored run ids, in first-save order.
    fn list(&self) -> Result<Vec<String>, StorageError>;
}
