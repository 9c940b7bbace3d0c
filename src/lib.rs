//! # beamsim - Deterministic beam search simulation
//!
//! beamsim explores a branching state space from an initial state, keeping
//! the best `beam_width` states at every step, and records the winning path,
//! the final beam, and a snapshot of every intermediate beam.
//!
//! ## Core Concepts
//!
//! - **Scenario**: initial field values plus an optional fixed action list
//! - **Constraints**: `min_<field>` / `max_<field>` limits with linear penalties
//! - **Beam**: the bounded, score-ordered set of states kept between steps
//! - **SimulationResult**: the immutable, persisted record of one run
//!
//! ## Usage
//!
//! ```rust
//! use beamsim::{BeamConfig, BeamSimulator, Constraints, FieldValue, Scenario, State};
//!
//! let mut state = State::new();
//! state.insert("x".to_string(), FieldValue::Int(10));
//!
//! let mut constraints = Constraints::new();
//! constraints.insert("max_x".to_string(), 12.0);
//!
//! let simulator = BeamSimulator::new(BeamConfig {
//!     beam_width: 3,
//!     max_steps: 4,
//!     seed: Some(7),
//! })?;
//! let result = simulator.run("demo", &Scenario::new(state), &constraints)?;
//! println!("{}", beamsim::explain(&result));
//! # Ok::<(), beamsim::SimError>(())
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod error;
pub mod logging;
pub mod scenario;
pub mod service;
pub mod simulation;
pub mod storage;
pub mod value;

// Re-export primary types at crate root for convenience
pub use config::{load_config, AppConfig};
pub use error::{SimError, SimResult, ValidationError};
pub use scenario::{Action, ActionKind, Constraints, Scenario, State};
pub use service::{ResourceDescriptor, RunRequest, RunResponse, SimulationService};
pub use simulation::{
    explain, BeamConfig, BeamSimulator, RankedState, ScoreBreakdown, SimulationResult,
    StateSnapshot,
};
pub use storage::{InMemoryRunStore, JsonFileRunStore, RunStore, StorageError};
pub use value::FieldValue;
