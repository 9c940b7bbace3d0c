//! In-memory run store.
//!
//! Thread-safe and non-durable. Intended for tests and embedded use.

use std::sync::RwLock;

use indexmap::IndexMap;

use crate::simulation::SimulationResult;
use crate::storage::traits::{RunStore, StorageError};

/// Run store kept entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryRunStore {
    runs: RwLock<IndexMap<String, SimulationResult>>,
}

impl InMemoryRunStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RunStore for InMemoryRunStore {
    fn save(&self, run_id: &str, record: &SimulationResult) -> Result<(), StorageError> {
        let mut runs = self
            .runs
            .write()
            .map_err(|_| StorageError::LockPoisoned("in-memory runs"))?;
        runs.insert(run_id.to_string(), record.clone());
        Ok(())
    }

    fn get(&self, run_id: &str) -> Result<Option<SimulationResult>, StorageError> {
        let runs = self
            .runs
            .read()
            .map_err(|_| StorageError::LockPoisoned("in-memory runs"))?;
        Ok(runs.get(run_id).cloned())
    }

    fn list(&self) -> Result<Vec<String>, StorageError> {
        let runs = self
            .runs
            .read()
            .map_err(|_| StorageError::LockPoisoned("in-memory runs"))?;
        Ok(runs.keys().cloned().collect())
    }
}
