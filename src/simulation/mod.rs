//! Deterministic beam search simulation.
//!
//! A run starts from a scenario's initial state, expands every beam state by
//! every available action, scores the results, and keeps the best
//! `beam_width` candidates for up to `max_steps` steps.

pub mod actions;
pub mod engine;
pub mod explain;
pub mod scoring;
pub mod seed;

pub use actions::{apply_action, generate_actions};
pub use engine::{
    BeamConfig, BeamSimulator, RankedState, SimulationResult, SimulationState, StateSnapshot,
    INITIAL_STEP,
};
pub use explain::explain;
pub use scoring::{score, ScoreBreakdown, CONSTRAINT_PENALTY, VALUE_SUM};
pub use seed::{fallback_seed, rng_for, run_id_for, SimRng};
