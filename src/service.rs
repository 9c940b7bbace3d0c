//! Run/explain operations and the `simulations://` resource façade.
//!
//! Arguments arrive as loosely-typed JSON, the way a tool dispatcher hands
//! them over, and are validated into a [`RunRequest`] before anything runs.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::info;

use crate::config::{AppConfig, SimulationSection};
use crate::error::{SimError, SimResult, ValidationError};
use crate::scenario::{Constraints, Scenario};
use crate::simulation::{
    explain, run_id_for, BeamConfig, BeamSimulator, RankedState, ScoreBreakdown, SimulationResult,
};
use crate::storage::{RunStore, StorageError};

/// URI scheme of stored runs.
pub const RESOURCE_SCHEME: &str = "simulations://";

/// A validated run request.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub scenario: Scenario,
    pub constraints: Constraints,
    pub config: BeamConfig,
}

impl RunRequest {
    /// Validate raw arguments `{scenario, constraints?, beamWidth?, maxSteps?, seed?}`.
    ///
    /// Omitted `beamWidth`/`maxSteps` fall back to `defaults`.
    pub fn from_args(args: &Json, defaults: &SimulationSection) -> Result<Self, ValidationError> {
        let scenario = match args.get("scenario") {
            None | Some(Json::Null) => {
                return Err(ValidationError::MissingField {
                    field: "scenario".to_string(),
                })
            }
            Some(Json::Object(map)) if map.is_empty() => {
                return Err(ValidationError::MissingField {
                    field: "scenario".to_string(),
                })
            }
            Some(Json::Object(map)) => {
                if !map.contains_key("initial_state") {
                    return Err(ValidationError::MissingField {
                        field: "scenario.initial_state".to_string(),
                    });
                }
                serde_json::from_value::<Scenario>(Json::Object(map.clone()))
                    .map_err(|e| ValidationError::invalid_field("scenario", e.to_string()))?
            }
            Some(_) => return Err(ValidationError::invalid_field("scenario", "must be an object")),
        };

        let constraints = match args.get("constraints") {
            None | Some(Json::Null) => Constraints::new(),
            Some(Json::Object(map)) => {
                serde_json::from_value::<Constraints>(Json::Object(map.clone()))
                    .map_err(|e| ValidationError::invalid_field("constraints", e.to_string()))?
            }
            Some(_) => {
                return Err(ValidationError::invalid_field(
                    "constraints",
                    "must be an object of numeric limits",
                ))
            }
        };

        let beam_width = positive_int(args, "beamWidth", defaults.beam_width)?;
        let max_steps = positive_int(args, "maxSteps", defaults.max_steps)?;
        let seed = match args.get("seed") {
            None | Some(Json::Null) => None,
            Some(v) => Some(
                v.as_i64()
                    .ok_or_else(|| ValidationError::invalid_field("seed", "must be an integer"))?,
            ),
        };

        let config = BeamConfig {
            beam_width,
            max_steps,
            seed,
        };
        config.validate()?;
        scenario.validate()?;

        Ok(Self {
            scenario,
            constraints,
            config,
        })
    }
}

fn positive_int(args: &Json, name: &'static str, default: usize) -> Result<usize, ValidationError> {
    match args.get(name) {
        None | Some(Json::Null) => Ok(default),
        Some(v) => v
            .as_u64()
            .filter(|n| *n >= 1)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or(ValidationError::InvalidParameter { name }),
    }
}

/// Summary returned to a caller after a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResponse {
    pub run_id: String,
    pub best_result: RankedState,
    pub top_k: Vec<RankedState>,
    pub score_breakdown: ScoreBreakdown,
}

impl From<&SimulationResult> for RunResponse {
    fn from(result: &SimulationResult) -> Self {
        Self {
            run_id: result.run_id.clone(),
            best_result: result.best_result.clone(),
            top_k: result.top_k.clone(),
            score_breakdown: result.score_breakdown.clone(),
        }
    }
}

/// One listed stored run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

impl ResourceDescriptor {
    fn for_run(run_id: &str) -> Self {
        let short: String = run_id.chars().take(8).collect();
        Self {
            uri: format!("{RESOURCE_SCHEME}{run_id}"),
            name: format!("Simulation {short}..."),
            description: "Full simulation data including input, intermediate states, and results"
                .to_string(),
            mime_type: "application/json".to_string(),
        }
    }
}

/// Simulation operations over an injected run store.
#[derive(Clone)]
pub struct SimulationService {
    store: Arc<dyn RunStore>,
    defaults: SimulationSection,
}

impl SimulationService {
    #[must_use]
    pub fn new(store: Arc<dyn RunStore>) -> Self {
        Self {
            store,
            defaults: SimulationSection::default(),
        }
    }

    /// Build a service from configuration, opening the configured store.
    pub fn from_config(config: &AppConfig) -> SimResult<Self> {
        Ok(Self {
            store: config.storage.open_store()?,
            defaults: config.simulation.clone(),
        })
    }

    /// Validate raw arguments, run, and persist the result.
    pub fn run(&self, args: &Json) -> SimResult<SimulationResult> {
        let request = RunRequest::from_args(args, &self.defaults)?;
        self.run_request(&request)
    }

    /// Run an already validated request and persist the result.
    pub fn run_request(&self, request: &RunRequest) -> SimResult<SimulationResult> {
        let run_id = run_id_for(request.config.seed);
        let simulator = BeamSimulator::new(request.config)?;
        let result = simulator.run(run_id, &request.scenario, &request.constraints)?;
        self.store.save(&result.run_id, &result)?;
        info!(
            run_id = %result.run_id,
            beam_width = request.config.beam_width,
            max_steps = request.config.max_steps,
            "run stored"
        );
        Ok(result)
    }

    /// Explanation of a stored run.
    pub fn explain(&self, run_id: &str) -> SimResult<String> {
        if run_id.is_empty() {
            return Err(ValidationError::MissingField {
                field: "runId".to_string(),
            }
            .into());
        }
        let result = self.fetch(run_id)?;
        Ok(explain(&result))
    }

    /// One resource per stored run.
    pub fn list_resources(&self) -> SimResult<Vec<ResourceDescriptor>> {
        Ok(self
            .store
            .list()?
            .iter()
            .map(|id| ResourceDescriptor::for_run(id))
            .collect())
    }

    /// Full stored record behind a `simulations://<run_id>` URI, as pretty JSON.
    pub fn read_resource(&self, uri: &str) -> SimResult<String> {
        let run_id = uri
            .strip_prefix(RESOURCE_SCHEME)
            .ok_or_else(|| ValidationError::InvalidUri {
                uri: uri.to_string(),
                reason: format!("expected scheme {RESOURCE_SCHEME}"),
            })?;
        if run_id.is_empty() {
            return Err(ValidationError::InvalidUri {
                uri: uri.to_string(),
                reason: "missing run id".to_string(),
            }
            .into());
        }
        let result = self.fetch(run_id)?;
        serde_json::to_string_pretty(&result)
            .map_err(|e| StorageError::Serialization(e.to_string()).into())
    }

    fn fetch(&self, run_id: &str) -> SimResult<SimulationResult> {
        self.store
            .get(run_id)?
            .ok_or_else(|| SimError::not_found(run_id))
    }
}
