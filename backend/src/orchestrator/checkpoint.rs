//! Checkpoint - Save/Load Engine State
//!
//! Serializes everything the engine owns so a playthrough can be resumed:
//! scheduler runtime state, lifecycle ids, RNG state and clock position.
//! Stats and flags belong to the host and are saved by it.
//!
//! # Critical Invariants
//!
//! - **Determinism**: restoring the RNG state reproduces every later pick
//! - **Id-only lifecycle**: events are re-resolved against the catalog
//! - **Catalog matching**: a fingerprint mismatch is reported, not fatal

use crate::lifecycle::LifecycleSnapshot;
use crate::models::catalog::EventCatalog;
use crate::orchestrator::engine::{EngineError, EventEngine};
use crate::scheduler::SchedulerSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::{info, warn};

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Complete engine state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineCheckpoint {
    /// SHA256 of the catalog the checkpoint was taken against
    pub catalog_hash: String,

    /// RNG state at time of snapshot (CRITICAL for determinism)
    pub rng_state: u64,

    pub current_day: u32,
    pub current_hour: u32,

    pub scheduler: SchedulerSnapshot,
    pub lifecycle: LifecycleSnapshot,
}

impl EngineCheckpoint {
    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string(self)
            .map_err(|e| EngineError::Serialization(format!("checkpoint encode failed: {}", e)))
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json)
            .map_err(|e| EngineError::Serialization(format!("checkpoint decode failed: {}", e)))
    }
}

/// What a restore had to drop or flag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Lifecycle ids that no longer resolve (or overflowed the queue)
    pub dropped_event_ids: Vec<String>,

    /// The catalog differs from the one the checkpoint was taken against
    pub catalog_changed: bool,
}

// ============================================================================
// Catalog Hashing
// ============================================================================

/// Compute a deterministic SHA256 fingerprint of the catalog
///
/// Definitions are hashed in authoring order over canonical JSON (sorted
/// object keys), so field order in the source file does not matter.
pub fn compute_catalog_hash(catalog: &EventCatalog) -> Result<String, EngineError> {
    let definitions: Vec<_> = catalog.events().iter().map(|e| e.as_ref()).collect();
    let value = serde_json::to_value(&definitions)
        .map_err(|e| EngineError::Serialization(format!("catalog serialization failed: {}", e)))?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value))
        .map_err(|e| EngineError::Serialization(format!("catalog serialization failed: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// Engine integration
// ============================================================================

impl EventEngine {
    /// Capture everything needed to resume this playthrough
    pub fn checkpoint(&self) -> Result<EngineCheckpoint, EngineError> {
        Ok(EngineCheckpoint {
            catalog_hash: compute_catalog_hash(&self.catalog)?,
            rng_state: self.scheduler.rng_state(),
            current_day: self.clock.current_day(),
            current_hour: self.clock.current_hour(),
            scheduler: self.scheduler.capture_runtime_snapshot(),
            lifecycle: self.lifecycle.capture_snapshot(),
        })
    }

    /// Restore a checkpoint
    ///
    /// No notifications fire and nothing is re-evaluated. The event log is
    /// left as it was.
    pub fn load_checkpoint(
        &mut self,
        checkpoint: &EngineCheckpoint,
    ) -> Result<RestoreReport, EngineError> {
        let catalog_changed = compute_catalog_hash(&self.catalog)? != checkpoint.catalog_hash;
        if catalog_changed {
            warn!("checkpoint was taken against a different catalog; ids re-resolved by lookup");
        }

        self.clock
            .set_position(checkpoint.current_day, checkpoint.current_hour);
        self.scheduler.restore_rng_state(checkpoint.rng_state);
        self.scheduler
            .restore_runtime_snapshot(Some(&checkpoint.scheduler));
        let dropped_event_ids = self
            .lifecycle
            .restore_snapshot(&checkpoint.lifecycle, &self.catalog);

        info!(
            day = checkpoint.current_day,
            hour = checkpoint.current_hour,
            dropped = dropped_event_ids.len(),
            catalog_changed,
            "checkpoint restored"
        );

        Ok(RestoreReport {
            dropped_event_ids,
            catalog_changed,
        })
    }
}
