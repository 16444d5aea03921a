//! Event Lifecycle Manager
//!
//! Owns the event in front of the player and the short FIFO queue behind it.
//!
//! # State machine
//!
//! ```text
//! Idle   --enqueue-->        Active                (EventStarted)
//! Active --enqueue-->        Active + Queued       (no notification)
//! Active --apply choice-->   Idle | Active(next)   (EventCompleted, then EventStarted)
//! ```
//!
//! # Critical Invariants
//!
//! 1. At most one active event
//! 2. The active event's key never appears in the pending queue
//! 3. Pending keys are distinct and there are at most [`MAX_PENDING_QUEUE_SIZE`]
//! 4. A choice's effects are applied exactly once, in list order
//!
//! Rejections are reported through return values, never panics.

mod snapshot;

pub use snapshot::LifecycleSnapshot;

use crate::core::time::Clock;
use crate::models::definition::{Choice, EventDefinition};
use crate::models::flags::FlagStore;
use crate::models::notification::LifecycleEvent;
use crate::models::stats::StatStore;
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Cap on events waiting behind the active one
pub const MAX_PENDING_QUEUE_SIZE: usize = 5;

/// Why an enqueue was refused
///
/// Every variant is congestion: the same event may be accepted later.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnqueueRejection {
    #[error("event '{0}' is already active")]
    AlreadyActive(String),

    #[error("event '{0}' is already pending")]
    AlreadyPending(String),

    #[error("pending queue is full ({max}); dropped event '{key}'", max = MAX_PENDING_QUEUE_SIZE)]
    QueueFull { key: String },
}

/// A choice that can be picked right now, with its index in the definition
#[derive(Debug, Clone, Copy)]
pub struct AvailableChoice<'a> {
    pub index: usize,
    pub choice: &'a Choice,
}

/// Result of [`LifecycleManager::try_apply_choice`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOutcome {
    pub applied: bool,
    pub message: String,
    /// Days entered because of the choice's time cost
    pub days_entered: Vec<u32>,
}

impl ChoiceOutcome {
    pub(crate) fn rejected(message: String) -> Self {
        Self {
            applied: false,
            message,
            days_entered: Vec::new(),
        }
    }
}

/// Collaborators a choice writes to
pub struct ApplyContext<'a> {
    pub clock: &'a mut dyn Clock,
    pub stats: Option<&'a mut dyn StatStore>,
    pub flags: Option<&'a mut dyn FlagStore>,
}

/// Choices whose condition currently holds, in definition order
///
/// The returned indices are the ones [`LifecycleManager::try_apply_choice`] takes.
pub fn available_choices<'a>(
    event: &'a EventDefinition,
    stats: Option<&dyn StatStore>,
) -> Vec<AvailableChoice<'a>> {
    event
        .choices()
        .iter()
        .enumerate()
        .filter(|(_, choice)| choice.is_available(stats))
        .map(|(index, choice)| AvailableChoice { index, choice })
        .collect()
}

/// True when at least one choice could be picked right now
pub fn has_available_choice(event: &EventDefinition, stats: Option<&dyn StatStore>) -> bool {
    event.choices().iter().any(|choice| choice.is_available(stats))
}

/// Single active event plus bounded pending queue
#[derive(Debug, Default)]
pub struct LifecycleManager {
    current: Option<Arc<EventDefinition>>,
    pending: VecDeque<Arc<EventDefinition>>,
    outbox: Vec<LifecycleEvent>,
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn current_event(&self) -> Option<&Arc<EventDefinition>> {
        self.current.as_ref()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_events(&self) -> impl Iterator<Item = &Arc<EventDefinition>> {
        self.pending.iter()
    }

    /// Keys of pending events in FIFO order
    pub fn pending_event_ids(&self) -> Vec<String> {
        self.pending.iter().map(|e| e.key().to_string()).collect()
    }

    /// No active event and nothing waiting
    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.pending.is_empty()
    }

    /// True if the key is active or pending
    pub fn holds(&self, key: &str) -> bool {
        self.current.as_ref().is_some_and(|e| e.key() == key)
            || self.pending.iter().any(|e| e.key() == key)
    }

    // ========================================================================
    // Enqueue
    // ========================================================================

    /// Enqueue an event, reporting why it was refused
    ///
    /// When nothing is active the event becomes active immediately and an
    /// `EventStarted` notification is queued.
    pub fn try_enqueue(
        &mut self,
        event: Arc<EventDefinition>,
        hour: u64,
    ) -> Result<(), EnqueueRejection> {
        let key = event.key().to_string();

        if self.current.as_ref().is_some_and(|e| e.key() == key) {
            debug!(event = %key, "enqueue skipped: already active");
            return Err(EnqueueRejection::AlreadyActive(key));
        }
        if self.pending.iter().any(|e| e.key() == key) {
            debug!(event = %key, "enqueue skipped: already pending");
            return Err(EnqueueRejection::AlreadyPending(key));
        }
        if self.pending.len() >= MAX_PENDING_QUEUE_SIZE {
            warn!(event = %key, max = MAX_PENDING_QUEUE_SIZE, "pending queue full; event dropped");
            return Err(EnqueueRejection::QueueFull { key });
        }

        if self.current.is_none() {
            debug!(event = %key, "event started");
            self.current = Some(Arc::clone(&event));
            self.outbox.push(LifecycleEvent::EventStarted { hour, event });
        } else {
            debug!(event = %key, position = self.pending.len(), "event queued");
            self.pending.push_back(event);
        }
        Ok(())
    }

    /// Boolean form of [`try_enqueue`](Self::try_enqueue)
    pub fn enqueue_event(&mut self, event: Arc<EventDefinition>, hour: u64) -> bool {
        self.try_enqueue(event, hour).is_ok()
    }

    // ========================================================================
    // Choices
    // ========================================================================

    /// Validate and apply one choice of `event`
    ///
    /// The condition is re-checked here; availability at presentation time
    /// is not trusted. On success the effects and flag mutations are applied,
    /// the clock is advanced by the choice's time cost, and if `event` is the
    /// active event it is completed and the next pending event promoted.
    pub fn try_apply_choice(
        &mut self,
        event: &Arc<EventDefinition>,
        choice_index: usize,
        ctx: ApplyContext<'_>,
    ) -> ChoiceOutcome {
        let ApplyContext {
            clock,
            mut stats,
            mut flags,
        } = ctx;

        let Some(choice) = event.choices().get(choice_index) else {
            return ChoiceOutcome::rejected(format!(
                "Choice {} does not exist on '{}'",
                choice_index,
                display_name(event)
            ));
        };

        if !choice.is_available(stats.as_deref()) {
            return ChoiceOutcome::rejected(format!(
                "'{}' is not available right now",
                choice.text()
            ));
        }

        match stats.as_deref_mut() {
            Some(stats) => {
                for effect in choice.effects() {
                    stats.apply_delta(effect.stat, effect.delta);
                }
            }
            None if !choice.effects().is_empty() => {
                debug!(event = %event.key(), "no stat store; resource effects skipped");
            }
            None => {}
        }

        if let Some(flags) = flags.as_deref_mut() {
            for mutation in choice.flag_mutations() {
                mutation.apply(flags);
            }
        }

        let days_entered = if choice.time_cost_hours() > 0 {
            clock.advance_hours(choice.time_cost_hours())
        } else {
            Vec::new()
        };
        let hour = clock.absolute_hour();

        let message = describe_outcome(choice);
        self.outbox.push(LifecycleEvent::ChoiceApplied {
            hour,
            event: Arc::clone(event),
            choice_index,
        });
        self.outbox.push(LifecycleEvent::OutcomeMessage {
            hour,
            text: message.clone(),
        });

        if self.current.as_ref().is_some_and(|e| e.key() == event.key()) {
            self.complete_current(hour);
        }

        ChoiceOutcome {
            applied: true,
            message,
            days_entered,
        }
    }

    /// Queue narrative text for the player
    pub fn publish_system_message(&mut self, text: impl Into<String>, hour: u64) {
        self.outbox.push(LifecycleEvent::OutcomeMessage {
            hour,
            text: text.into(),
        });
    }

    /// Take every queued notification, oldest first
    pub fn drain_notifications(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.outbox)
    }

    fn complete_current(&mut self, hour: u64) {
        if let Some(done) = self.current.take() {
            debug!(event = %done.key(), "event completed");
            self.outbox
                .push(LifecycleEvent::EventCompleted { hour, event: done });
        }
        if let Some(next) = self.pending.pop_front() {
            debug!(event = %next.key(), "event promoted from queue");
            self.current = Some(Arc::clone(&next));
            self.outbox
                .push(LifecycleEvent::EventStarted { hour, event: next });
        }
    }
}

fn display_name(event: &EventDefinition) -> &str {
    if event.title().is_empty() {
        event.key()
    } else {
        event.title()
    }
}

fn describe_outcome(choice: &Choice) -> String {
    if choice.effects().is_empty() {
        return choice.text().to_string();
    }
    let effects: Vec<String> = choice
        .effects()
        .iter()
        .map(|effect| format!("{} {:+}", effect.stat.name(), effect.delta))
        .collect();
    format!("{} ({})", choice.text(), effects.join(", "))
}
