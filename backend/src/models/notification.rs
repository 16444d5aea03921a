//! Lifecycle notifications and their history
//!
//! The lifecycle manager emits a [`LifecycleEvent`] for every observable
//! step. The engine routes them to the scheduler, hands them to observers,
//! and keeps them in an [`EventLog`].
//!
//! Within one lifecycle operation the order is fixed: `ChoiceApplied`, then
//! `OutcomeMessage`, then `EventCompleted`, then `EventStarted` for the
//! promoted replacement.

use crate::models::definition::EventDefinition;
use std::sync::Arc;

/// Something observable happened to the active/pending events
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// An event became the active event
    EventStarted {
        hour: u64,
        event: Arc<EventDefinition>,
    },

    /// The active event was resolved and cleared
    EventCompleted {
        hour: u64,
        event: Arc<EventDefinition>,
    },

    /// A choice's effects were applied
    ChoiceApplied {
        hour: u64,
        event: Arc<EventDefinition>,
        choice_index: usize,
    },

    /// Narrative text for the player (choice outcomes, delayed-consequence notices)
    OutcomeMessage { hour: u64, text: String },
}

impl LifecycleEvent {
    /// Absolute hour at which the notification was emitted
    pub fn hour(&self) -> u64 {
        match self {
            LifecycleEvent::EventStarted { hour, .. } => *hour,
            LifecycleEvent::EventCompleted { hour, .. } => *hour,
            LifecycleEvent::ChoiceApplied { hour, .. } => *hour,
            LifecycleEvent::OutcomeMessage { hour, .. } => *hour,
        }
    }

    /// Day the notification belongs to
    pub fn day(&self) -> u32 {
        (self.hour() / 24) as u32
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            LifecycleEvent::EventStarted { .. } => "EventStarted",
            LifecycleEvent::EventCompleted { .. } => "EventCompleted",
            LifecycleEvent::ChoiceApplied { .. } => "ChoiceApplied",
            LifecycleEvent::OutcomeMessage { .. } => "OutcomeMessage",
        }
    }

    /// The event this notification is about, if any
    pub fn event(&self) -> Option<&Arc<EventDefinition>> {
        match self {
            LifecycleEvent::EventStarted { event, .. }
            | LifecycleEvent::EventCompleted { event, .. }
            | LifecycleEvent::ChoiceApplied { event, .. } => Some(event),
            LifecycleEvent::OutcomeMessage { .. } => None,
        }
    }
}

/// History of lifecycle notifications
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Vec<LifecycleEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, event: LifecycleEvent) {
        self.entries.push(event);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LifecycleEvent] {
        &self.entries
    }

    pub fn entries_of_type(&self, event_type: &str) -> Vec<&LifecycleEvent> {
        self.entries
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Notifications about one event, matched by key
    pub fn entries_for_event(&self, key: &str) -> Vec<&LifecycleEvent> {
        let key = crate::models::flags::normalize_key(key);
        self.entries
            .iter()
            .filter(|e| e.event().is_some_and(|event| event.key() == key))
            .collect()
    }

    pub fn entries_on_day(&self, day: u32) -> Vec<&LifecycleEvent> {
        self.entries.iter().filter(|e| e.day() == day).collect()
    }

    /// How many times an event was completed
    pub fn completion_count(&self, key: &str) -> usize {
        self.entries_for_event(key)
            .into_iter()
            .filter(|e| matches!(e, LifecycleEvent::EventCompleted { .. }))
            .count()
    }

    /// All outcome/system message texts in order
    pub fn messages(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                LifecycleEvent::OutcomeMessage { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
