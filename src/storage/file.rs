//! JSON file run store.
//!
//! The whole store lives in one pretty-printed JSON object keyed by run id.
//! Every save reads the file, inserts the record, and rewrites the file
//! through a temp file in the same directory that is fsynced and then
//! renamed over the canonical path. A failed rewrite drops the temp file and
//! leaves the previous contents in place.
//!
//! One mutex per store instance serializes readers and writers. There is no
//! cross-process locking.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use indexmap::IndexMap;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::simulation::SimulationResult;
use crate::storage::traits::{RunStore, StorageError};

type RunMap = IndexMap<String, SimulationResult>;

/// Durable run store backed by a single JSON file.
#[derive(Debug)]
pub struct JsonFileRunStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileRunStore {
    /// Open a store at `path`, creating its parent directory if needed.
    ///
    /// The file itself is created lazily on first save.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        fs::create_dir_all(store_dir(&path)).map_err(StorageError::io("creating store directory"))?;
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    fn read_runs(&self) -> Result<RunMap, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(RunMap::new()),
            Err(e) => return Err(StorageError::io("reading store file")(e)),
        };
        if content.trim().is_empty() {
            return Ok(RunMap::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            StorageError::Serialization(format!("{}: {e}", self.path.display()))
        })
    }

    fn write_runs(&self, runs: &RunMap) -> Result<(), StorageError> {
        atomic_write(&self.path, |file| {
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, runs)?;
            writer.flush()
        })
    }
}

impl RunStore for JsonFileRunStore {
    fn save(&self, run_id: &str, record: &SimulationResult) -> Result<(), StorageError> {
        // Non-finite floats serialize as null and cannot be read back.
        if let Some(what) = record.non_finite_field() {
            return Err(StorageError::NonFinite {
                run_id: run_id.to_string(),
                what,
            });
        }
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StorageError::LockPoisoned("json run store"))?;
        let mut runs = self.read_runs()?;
        runs.insert(run_id.to_string(), record.clone());
        self.write_runs(&runs)?;
        debug!(run_id, path = %self.path.display(), runs = runs.len(), "saved run");
        Ok(())
    }

    fn get(&self, run_id: &str) -> Result<Option<SimulationResult>, StorageError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StorageError::LockPoisoned("json run store"))?;
        let mut runs = self.read_runs()?;
        Ok(runs.swap_remove(run_id))
    }

    fn list(&self) -> Result<Vec<String>, StorageError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StorageError::LockPoisoned("json run store"))?;
        Ok(self.read_runs()?.into_keys().collect())
    }
}

fn store_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Replace `path` with whatever `write` produces, atomically.
///
/// The temp file is removed if `write`, the fsync, or the rename fails.
fn atomic_write<F>(path: &Path, write: F) -> Result<(), StorageError>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let mut tmp = NamedTempFile::new_in(store_dir(path))
        .map_err(StorageError::io("creating temp store file"))?;
    write(tmp.as_file_mut()).map_err(StorageError::io("writing temp store file"))?;
    tmp.as_file()
        .sync_all()
        .map_err(StorageError::io("syncing temp store file"))?;
    tmp.persist(path)
        .map_err(|e| StorageError::io("replacing store file")(e.error))?;
    Ok(())
}
