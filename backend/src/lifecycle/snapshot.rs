//! Lifecycle snapshot: which event is in front of the player and what waits
//!
//! Only ids are stored. Restoring re-resolves them against the catalog; ids
//! that no longer exist are dropped with a warning.

use super::{LifecycleManager, MAX_PENDING_QUEUE_SIZE};
use crate::models::catalog::EventCatalog;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleSnapshot {
    #[serde(default)]
    pub current_event_id: Option<String>,
    #[serde(default)]
    pub pending_event_ids: Vec<String>,
}

impl LifecycleManager {
    /// Capture current and pending ids (keys)
    ///
    /// Events with a synthesized key are left out: they cannot be looked up
    /// again.
    pub fn capture_snapshot(&self) -> LifecycleSnapshot {
        LifecycleSnapshot {
            current_event_id: self
                .current
                .as_ref()
                .filter(|e| !e.has_fallback_key())
                .map(|e| e.key().to_string()),
            pending_event_ids: self
                .pending
                .iter()
                .filter(|e| !e.has_fallback_key())
                .map(|e| e.key().to_string())
                .collect(),
        }
    }

    /// Replace current and pending events from a snapshot
    ///
    /// No notifications fire. If the stored current event is gone, the first
    /// surviving pending event takes its place. Returns the ids that could
    /// not be resolved.
    pub fn restore_snapshot(
        &mut self,
        snapshot: &LifecycleSnapshot,
        catalog: &EventCatalog,
    ) -> Vec<String> {
        self.current = None;
        self.pending.clear();
        self.outbox.clear();

        let mut dropped = Vec::new();
        let ids = snapshot
            .current_event_id
            .iter()
            .chain(snapshot.pending_event_ids.iter());

        for id in ids {
            let Some(event) = catalog.get(id) else {
                warn!(event = %id, "restored event id not in catalog; dropped");
                dropped.push(id.clone());
                continue;
            };
            if self.holds(event.key()) {
                continue;
            }
            if self.current.is_none() {
                self.current = Some(std::sync::Arc::clone(event));
            } else if self.pending.len() < MAX_PENDING_QUEUE_SIZE {
                self.pending.push_back(std::sync::Arc::clone(event));
            } else {
                warn!(event = %id, "restored pending queue over capacity; dropped");
                dropped.push(id.clone());
            }
        }

        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::definition::{Choice, EventCategory, EventDefinition};

    fn catalog(ids: &[&str]) -> EventCatalog {
        EventCatalog::new(
            ids.iter()
                .map(|id| {
                    EventDefinition::builder(*id, EventCategory::Minor)
                        .choice(Choice::builder("ok").build())
                        .build()
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_missing_current_promotes_first_pending() {
        let catalog = catalog(&["b", "c"]);
        let snapshot = LifecycleSnapshot {
            current_event_id: Some("gone".to_string()),
            pending_event_ids: vec!["b".to_string(), "c".to_string()],
        };

        let mut manager = LifecycleManager::new();
        let dropped = manager.restore_snapshot(&snapshot, &catalog);

        assert_eq!(dropped, vec!["gone".to_string()]);
        assert_eq!(manager.current_event().map(|e| e.key()), Some("b"));
        assert_eq!(manager.pending_event_ids(), vec!["c".to_string()]);
        assert!(manager.drain_notifications().is_empty());
    }

    #[test]
    fn test_duplicate_ids_collapse() {
        let catalog = catalog(&["a"]);
        let snapshot = LifecycleSnapshot {
            current_event_id: Some("a".to_string()),
            pending_event_ids: vec!["A".to_string()],
        };

        let mut manager = LifecycleManager::new();
        manager.restore_snapshot(&snapshot, &catalog);
        assert!(!manager.has_pending_events());
    }
}
