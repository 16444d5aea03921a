//! Orchestrator - the engine facade
//!
//! Wires the lifecycle manager, scheduler and host collaborators together.
//!
//! See `engine.rs` for the command flow.

pub mod checkpoint;
pub mod engine;

pub use engine::{Collaborators, DayEndOutcome, EngineConfig, EngineError, EventEngine};

pub use checkpoint::{compute_catalog_hash, EngineCheckpoint, RestoreReport};
