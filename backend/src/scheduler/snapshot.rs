//! Scheduler runtime snapshot
//!
//! Cooldowns, scheduled follow-ups, owed repeats and the daily guards. The
//! RNG state is saved by the engine checkpoint, not here.

use super::{EventScheduler, ScheduledFollowUp};
use crate::models::flags::normalize_key;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownEntry {
    pub event_key: String,
    pub available_at_hour: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRepeat {
    pub follow_up_id: String,
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSnapshot {
    pub minor_queued_day: Option<u32>,
    pub major_queued_day: Option<u32>,
    pub cooldowns: Vec<CooldownEntry>,
    pub scheduled_follow_ups: Vec<ScheduledFollowUp>,
    pub pending_repeats: Vec<PendingRepeat>,
}

impl EventScheduler {
    /// Pure read of the runtime state; keys come out normalized and sorted
    pub fn capture_runtime_snapshot(&self) -> SchedulerSnapshot {
        SchedulerSnapshot {
            minor_queued_day: self.minor_queued_day,
            major_queued_day: self.major_queued_day,
            cooldowns: self
                .cooldowns
                .iter()
                .filter(|(key, until)| !key.is_empty() && **until > 0)
                .map(|(key, until)| CooldownEntry {
                    event_key: key.clone(),
                    available_at_hour: *until,
                })
                .collect(),
            scheduled_follow_ups: self
                .scheduled
                .iter()
                .filter(|entry| !entry.follow_up_id.is_empty())
                .cloned()
                .collect(),
            pending_repeats: self
                .pending_repeats
                .iter()
                .filter(|(key, count)| !key.is_empty() && **count > 0)
                .map(|(key, count)| PendingRepeat {
                    follow_up_id: key.clone(),
                    count: *count,
                })
                .collect(),
        }
    }

    /// Replace runtime state wholesale; `None` resets it
    ///
    /// Blank keys and zero counts are discarded and trigger days are clamped
    /// to day 1. Nothing is re-evaluated and no notification fires.
    pub fn restore_runtime_snapshot(&mut self, snapshot: Option<&SchedulerSnapshot>) {
        self.cooldowns.clear();
        self.scheduled.clear();
        self.pending_repeats.clear();
        self.minor_queued_day = None;
        self.major_queued_day = None;

        let Some(snapshot) = snapshot else {
            return;
        };

        self.minor_queued_day = snapshot.minor_queued_day;
        self.major_queued_day = snapshot.major_queued_day;

        for entry in &snapshot.cooldowns {
            let key = normalize_key(&entry.event_key);
            if key.is_empty() {
                continue;
            }
            self.cooldowns.insert(key, entry.available_at_hour);
        }

        for entry in &snapshot.scheduled_follow_ups {
            let key = normalize_key(&entry.follow_up_id);
            if key.is_empty() {
                continue;
            }
            self.scheduled.push(ScheduledFollowUp {
                follow_up_id: key,
                trigger_day: entry.trigger_day.max(1),
            });
        }

        for entry in &snapshot.pending_repeats {
            let key = normalize_key(&entry.follow_up_id);
            if key.is_empty() || entry.count == 0 {
                continue;
            }
            *self.pending_repeats.entry(key).or_insert(0) += entry.count;
        }
    }
}
