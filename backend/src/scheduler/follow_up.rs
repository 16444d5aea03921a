//! Follow-up chains
//!
//! A resolved choice can pull further events in behind it, either right away
//! or a number of days later. Attempts that fail because of congestion are
//! owed and retried on later day changes and completions.

use super::{EventScheduler, SchedulingContext};
use crate::lifecycle::{has_available_choice, LifecycleManager};
use crate::models::definition::EventDefinition;
use crate::models::flags::normalize_key;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Delayed chain link not yet due
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledFollowUp {
    pub follow_up_id: String,
    pub trigger_day: u32,
}

/// Result of one enqueue attempt for a follow-up id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUpAttempt {
    Enqueued,
    /// Queue full, already active/pending, or on cooldown
    Congested,
    /// Id not in the catalog
    Unknown,
    /// Target has no choice the player could pick
    NotPresentable,
}

impl EventScheduler {
    pub fn scheduled_follow_ups(&self) -> &[ScheduledFollowUp] {
        &self.scheduled
    }

    /// Owed enqueue attempts for a follow-up id
    pub fn pending_repeat_count(&self, id: &str) -> u32 {
        self.pending_repeats
            .get(&normalize_key(id))
            .copied()
            .unwrap_or(0)
    }

    /// Resolve the follow-ups of an applied choice
    ///
    /// The choice's own follow-up list replaces the event's list when it is
    /// non-empty; the two are never merged.
    pub fn on_choice_applied(
        &mut self,
        event: &EventDefinition,
        choice_index: usize,
        lifecycle: &mut LifecycleManager,
        ctx: &SchedulingContext<'_>,
    ) {
        let Some(choice) = event.choices().get(choice_index) else {
            return;
        };

        let (ids, delay) = if choice.follow_up_ids().is_empty() {
            (event.follow_up_ids(), event.follow_up_delay_days())
        } else {
            (choice.follow_up_ids(), choice.follow_up_delay_days())
        };
        if ids.is_empty() {
            return;
        }

        if delay == 0 {
            for id in ids {
                let key = normalize_key(id);
                if key.is_empty() || key == event.key() {
                    continue;
                }
                if self.attempt_follow_up(&key, lifecycle, ctx) == FollowUpAttempt::Congested {
                    self.owe(&key);
                }
            }
            return;
        }

        let trigger_day = ctx.day().saturating_add(delay);
        let mut scheduled_any = false;
        for id in ids {
            let key = normalize_key(id);
            if key.is_empty() {
                continue;
            }
            debug!(follow_up = %key, trigger_day, "follow-up scheduled");
            self.scheduled.push(ScheduledFollowUp {
                follow_up_id: key,
                trigger_day,
            });
            scheduled_any = true;
        }

        if scheduled_any {
            let plural = if delay == 1 { "day" } else { "days" };
            lifecycle.publish_system_message(
                format!(
                    "The consequences of this choice will unfold in {} {}.",
                    delay, plural
                ),
                ctx.now(),
            );
        }
    }

    /// Retry owed follow-ups after the active event cleared
    pub fn on_event_completed(
        &mut self,
        lifecycle: &mut LifecycleManager,
        ctx: &SchedulingContext<'_>,
    ) {
        self.drain_pending_repeats(lifecycle, ctx);
    }

    /// Enqueue every scheduled follow-up whose trigger day has arrived
    pub fn process_due_follow_ups(
        &mut self,
        day: u32,
        lifecycle: &mut LifecycleManager,
        ctx: &SchedulingContext<'_>,
    ) {
        if self.scheduled.is_empty() {
            return;
        }
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.scheduled)
            .into_iter()
            .partition(|entry| entry.trigger_day <= day);
        self.scheduled = waiting;

        for entry in due {
            debug!(follow_up = %entry.follow_up_id, day, "scheduled follow-up due");
            if self.attempt_follow_up(&entry.follow_up_id, lifecycle, ctx)
                == FollowUpAttempt::Congested
            {
                self.owe(&entry.follow_up_id);
            }
        }
    }

    /// Retry owed follow-ups, stopping per id at the first failure
    pub fn drain_pending_repeats(
        &mut self,
        lifecycle: &mut LifecycleManager,
        ctx: &SchedulingContext<'_>,
    ) {
        let keys: Vec<String> = self.pending_repeats.keys().cloned().collect();
        for key in keys {
            loop {
                let owed = self.pending_repeats.get(&key).copied().unwrap_or(0);
                if owed == 0 {
                    self.pending_repeats.remove(&key);
                    break;
                }
                match self.attempt_follow_up(&key, lifecycle, ctx) {
                    FollowUpAttempt::Enqueued => {
                        if owed == 1 {
                            self.pending_repeats.remove(&key);
                        } else {
                            self.pending_repeats.insert(key.clone(), owed - 1);
                        }
                    }
                    FollowUpAttempt::Congested => break,
                    FollowUpAttempt::Unknown | FollowUpAttempt::NotPresentable => {
                        self.pending_repeats.remove(&key);
                        break;
                    }
                }
            }
        }
    }

    /// Try to enqueue one follow-up by (normalized) id
    ///
    /// Follow-ups respect the target's cooldown but never stamp one.
    pub fn attempt_follow_up(
        &mut self,
        key: &str,
        lifecycle: &mut LifecycleManager,
        ctx: &SchedulingContext<'_>,
    ) -> FollowUpAttempt {
        let Some(target) = self.catalog.get(key).map(Arc::clone) else {
            if self.reported_missing.insert(key.to_string()) {
                warn!(follow_up = %key, "follow-up id not in catalog; ignored");
            }
            return FollowUpAttempt::Unknown;
        };

        if !has_available_choice(&target, ctx.stats) {
            info!(follow_up = %key, "follow-up has no available choice; dropped");
            return FollowUpAttempt::NotPresentable;
        }

        let now = ctx.now();
        if self.is_on_cooldown(target.key(), now) {
            debug!(follow_up = %key, "follow-up target on cooldown");
            return FollowUpAttempt::Congested;
        }

        match lifecycle.try_enqueue(target, now) {
            Ok(()) => FollowUpAttempt::Enqueued,
            Err(rejection) => {
                debug!(follow_up = %key, %rejection, "follow-up congested");
                FollowUpAttempt::Congested
            }
        }
    }

    fn owe(&mut self, key: &str) {
        let count = self.pending_repeats.entry(key.to_string()).or_insert(0);
        *count += 1;
        debug!(follow_up = %key, owed = *count, "follow-up owed");
    }
}
