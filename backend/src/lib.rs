//! Campus Narrative Core - Rust Engine
//!
//! Event lifecycle engine for a day-by-day life simulation: decides which
//! scripted event the player sees, paces them, and resolves chains of
//! follow-up events, with deterministic execution.
//!
//! # Architecture
//!
//! - **core**: Clock trait, game clock and academic calendar
//! - **models**: Domain types (EventDefinition, Choice, catalog, stats, flags)
//! - **lifecycle**: Active event plus bounded pending queue
//! - **scheduler**: Eligibility, weighted selection, cooldowns, follow-ups
//! - **orchestrator**: Engine facade and checkpoints
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. At most one event is active at a time
//! 2. All randomness is deterministic (seeded RNG)
//! 3. Rejected gameplay operations never panic
//! 4. FFI boundary is minimal and safe

pub mod core;
pub mod lifecycle;
pub mod models;
pub mod orchestrator;
pub mod rng;
pub mod scheduler;

// Re-exports for convenience
pub use crate::core::time::{Clock, GameClock};
pub use lifecycle::{ChoiceOutcome, EnqueueRejection, LifecycleManager};
pub use models::{
    catalog::{CatalogError, EventCatalog},
    definition::{Choice, EventCategory, EventDefinition},
    notification::{EventLog, LifecycleEvent},
};
pub use orchestrator::{
    Collaborators, DayEndOutcome, EngineCheckpoint, EngineConfig, EngineError, EventEngine,
    RestoreReport,
};
pub use rng::RngManager;
pub use scheduler::{EventScheduler, SchedulerConfig};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn campus_narrative_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::engine::PyEventEngine>()?;
    Ok(())
}
