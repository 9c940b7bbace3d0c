//! Application configuration.
//!
//! Load order: `beamsim.toml` in the working directory (if present), then an
//! explicit `--config` file, then `BEAMSIM__*` environment variables (double
//! underscore separates sections, e.g. `BEAMSIM__STORAGE__PATH=/tmp/runs.json`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{SimError, SimResult, ValidationError};
use crate::storage::{InMemoryRunStore, JsonFileRunStore, RunStore, StorageError};

/// Configuration root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub simulation: SimulationSection,
    pub storage: StorageSection,
    pub logging: LoggingSection,
}

/// `[simulation]`: defaults applied when a caller omits them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    pub beam_width: usize,
    pub max_steps: usize,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            beam_width: 5,
            max_steps: 10,
        }
    }
}

/// Which run store backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
}

/// `[storage]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub backend: StorageBackend,
    /// Store file for the `file` backend.
    pub path: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            path: PathBuf::from("simulations.json"),
        }
    }
}

impl StorageSection {
    /// Open the configured store.
    pub fn open_store(&self) -> Result<Arc<dyn RunStore>, StorageError> {
        let store: Arc<dyn RunStore> = match self.backend {
            StorageBackend::File => Arc::new(JsonFileRunStore::open(&self.path)?),
            StorageBackend::Memory => Arc::new(InMemoryRunStore::new()),
        };
        Ok(store)
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Filter used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl AppConfig {
    pub fn validate(self) -> Result<Self, ValidationError> {
        if self.simulation.beam_width == 0 {
            return Err(ValidationError::InvalidParameter {
                name: "simulation.beam_width",
            });
        }
        if self.simulation.max_steps == 0 {
            return Err(ValidationError::InvalidParameter {
                name: "simulation.max_steps",
            });
        }
        Ok(self)
    }
}

/// Load configuration from files and environment.
pub fn load_config(config_path: Option<&Path>) -> SimResult<AppConfig> {
    let mut builder = config::Config::builder()
        .add_source(config::File::with_name("beamsim").required(false));

    if let Some(path) = config_path {
        if !path.exists() {
            return Err(SimError::Config {
                message: format!("config file not found: {}", path.display()),
            });
        }
        builder = builder.add_source(config::File::from(path.to_path_buf()));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("BEAMSIM")
            .separator("__")
            .try_parsing(true),
    );

    let cfg: AppConfig = builder.build()?.try_deserialize()?;
    Ok(cfg.validate()?)
}
