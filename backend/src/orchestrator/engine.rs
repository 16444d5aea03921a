//! Event Engine
//!
//! Owns every narrative component and the collaborators they read:
//! - Event catalog (shared, read-only)
//! - Lifecycle manager (active event + pending queue)
//! - Scheduler (selection, cooldowns, follow-up chains)
//! - Clock, stat store and flag store (host-provided)
//! - Event log (complete notification history)
//!
//! # Architecture
//!
//! Every command runs the same way:
//!
//! ```text
//! 1. Mutate the lifecycle manager / scheduler
//! 2. Drain the lifecycle outbox
//! 3. Route ChoiceApplied -> follow-up resolution
//!    Route EventCompleted -> owed repeat drain
//! 4. Hand each notification to observers, then to the event log
//! 5. Repeat 2-4 until the outbox is empty
//! 6. Run the day-change sequence for every day the command entered
//! ```
//!
//! # Example
//!
//! ```rust
//! use campus_narrative_core_rs::orchestrator::{Collaborators, EngineConfig, EventEngine};
//! use campus_narrative_core_rs::models::{Choice, EventCatalog, EventCategory, EventDefinition};
//!
//! let catalog = EventCatalog::new(vec![EventDefinition::builder("coffee", EventCategory::Minor)
//!     .choice(Choice::builder("Drink it").build())
//!     .build()])
//! .unwrap();
//!
//! let config = EngineConfig::default();
//! let collaborators = Collaborators::in_memory(&config);
//! let mut engine = EventEngine::new(config, catalog, collaborators).unwrap();
//!
//! engine.force_evaluate();
//! assert_eq!(engine.current_event().map(|e| e.key()), Some("coffee"));
//!
//! let outcome = engine.apply_current_choice(0);
//! assert!(outcome.applied);
//! assert!(engine.current_event().is_none());
//! ```

use crate::core::calendar::CalendarConfig;
use crate::core::time::{Clock, GameClock, HOURS_PER_DAY};
use crate::lifecycle::{available_choices, AvailableChoice, ApplyContext, ChoiceOutcome, LifecycleManager};
use crate::models::catalog::{CatalogError, EventCatalog};
use crate::models::definition::EventDefinition;
use crate::models::flags::{FlagBook, FlagStore};
use crate::models::notification::{EventLog, LifecycleEvent};
use crate::models::stats::{StatSheet, StatStore};
use crate::scheduler::{EventScheduler, SchedulerConfig, SchedulingContext};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

// ============================================================================
// Configuration
// ============================================================================

/// Complete engine configuration
///
/// Every field has a default, so `{}` is a valid config document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Selection, cooldown and tag settings
    pub scheduler: SchedulerConfig,

    /// Hour the player wakes up after a day end
    pub day_start_hour: u32,

    /// Offer a major event before letting the day end
    pub day_end_forces_major: bool,

    /// Calendar for clocks built by [`Collaborators::in_memory`]
    pub calendar: CalendarConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            day_start_hour: 8,
            day_end_forces_major: true,
            calendar: CalendarConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config document
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidConfig(format!("config parse failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.day_start_hour >= HOURS_PER_DAY {
            return Err(EngineError::InvalidConfig(format!(
                "day_start_hour must be below {}, got {}",
                HOURS_PER_DAY, self.day_start_hour
            )));
        }
        self.scheduler.validate().map_err(EngineError::InvalidConfig)?;
        self.calendar.validate().map_err(EngineError::InvalidConfig)?;
        Ok(())
    }
}

/// Engine error types
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

// ============================================================================
// Collaborators
// ============================================================================

/// Host-owned collaborators injected at construction
pub struct Collaborators {
    pub clock: Box<dyn Clock>,
    pub stats: Option<Box<dyn StatStore>>,
    pub flags: Option<Box<dyn FlagStore>>,
}

impl Collaborators {
    /// Game clock, fresh stat sheet and empty flag book
    pub fn in_memory(config: &EngineConfig) -> Self {
        Self {
            clock: Box::new(GameClock::new(config.calendar.clone())),
            stats: Some(Box::new(StatSheet::new())),
            flags: Some(Box::new(FlagBook::new())),
        }
    }

    /// Clock only; stat tags and stat conditions fail closed
    pub fn clock_only(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            stats: None,
            flags: None,
        }
    }
}

/// Result of [`EventEngine::request_day_end`]
#[derive(Debug, Clone, PartialEq)]
pub enum DayEndOutcome {
    /// An event is active or pending; resolve it first
    Blocked,

    /// A major event was queued instead of ending the day
    MajorQueued(Arc<EventDefinition>),

    /// The clock moved to `day` at the configured start hour
    Advanced { day: u32 },
}

type Observer = Box<dyn FnMut(&LifecycleEvent)>;

// ============================================================================
// Engine
// ============================================================================

/// Narrative engine for one playthrough
pub struct EventEngine {
    pub(crate) config: EngineConfig,
    pub(crate) catalog: Arc<EventCatalog>,
    pub(crate) scheduler: EventScheduler,
    pub(crate) lifecycle: LifecycleManager,
    pub(crate) clock: Box<dyn Clock>,
    stats: Option<Box<dyn StatStore>>,
    flags: Option<Box<dyn FlagStore>>,
    observers: Vec<Observer>,
    log: EventLog,
}

/// Split-borrow the read-only collaborators into a scheduling context
macro_rules! scheduling_context {
    ($engine:ident) => {
        SchedulingContext::new(
            &*$engine.clock,
            $engine.stats.as_deref(),
            $engine.flags.as_deref(),
        )
    };
}

impl EventEngine {
    /// Create an engine from configuration, catalog and collaborators
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] when validation fails.
    pub fn new(
        config: EngineConfig,
        catalog: EventCatalog,
        collaborators: Collaborators,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let catalog = Arc::new(catalog);
        let scheduler = EventScheduler::new(config.scheduler.clone(), Arc::clone(&catalog));

        debug!(
            events = catalog.len(),
            minor = catalog.minor_pool().len(),
            major = catalog.major_pool().len(),
            "event engine created"
        );

        Ok(Self {
            config,
            catalog,
            scheduler,
            lifecycle: LifecycleManager::new(),
            clock: collaborators.clock,
            stats: collaborators.stats,
            flags: collaborators.flags,
            observers: Vec::new(),
            log: EventLog::new(),
        })
    }

    /// Build an in-memory engine from JSON catalog and config documents
    pub fn from_json(catalog_json: &str, config_json: Option<&str>) -> Result<Self, EngineError> {
        let config = match config_json {
            Some(json) => EngineConfig::from_json_str(json)?,
            None => EngineConfig::default(),
        };
        let catalog = EventCatalog::from_json_str(catalog_json)?;
        let collaborators = Collaborators::in_memory(&config);
        Self::new(config, catalog, collaborators)
    }

    /// Register a callback for every lifecycle notification
    pub fn subscribe(&mut self, observer: impl FnMut(&LifecycleEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Enqueue an event directly, bypassing selection and cooldowns
    pub fn enqueue_event(&mut self, event: Arc<EventDefinition>) -> bool {
        let accepted = self
            .lifecycle
            .enqueue_event(event, self.clock.absolute_hour());
        self.pump();
        accepted
    }

    /// Enqueue a catalog event by id
    pub fn enqueue_event_by_id(&mut self, id: &str) -> bool {
        match self.catalog.get(id).cloned() {
            Some(event) => self.enqueue_event(event),
            None => {
                warn!(event = %id, "enqueue by id: not in catalog");
                false
            }
        }
    }

    /// Apply a choice of `event` (normally the active event)
    ///
    /// Follow-ups of the choice are resolved before the call returns. If
    /// the choice's time cost crosses midnight, the day-change sequence runs
    /// for each entered day afterwards.
    pub fn apply_choice(&mut self, event: &Arc<EventDefinition>, choice_index: usize) -> ChoiceOutcome {
        let ctx = ApplyContext {
            clock: &mut *self.clock,
            stats: self.stats.as_mut().map(|s| &mut **s as &mut dyn StatStore),
            flags: self.flags.as_mut().map(|f| &mut **f as &mut dyn FlagStore),
        };
        let outcome = self.lifecycle.try_apply_choice(event, choice_index, ctx);

        if outcome.applied {
            self.pump();
            for day in &outcome.days_entered {
                self.run_day_change(*day);
            }
        } else {
            debug!(event = %event.key(), choice_index, reason = %outcome.message, "choice rejected");
        }
        outcome
    }

    /// Apply a choice of the active event
    pub fn apply_current_choice(&mut self, choice_index: usize) -> ChoiceOutcome {
        match self.lifecycle.current_event().cloned() {
            Some(event) => self.apply_choice(&event, choice_index),
            None => ChoiceOutcome::rejected("No event is active".to_string()),
        }
    }

    /// Inject narrative text for the player
    pub fn publish_system_message(&mut self, text: impl Into<String>) {
        self.lifecycle
            .publish_system_message(text, self.clock.absolute_hour());
        self.pump();
    }

    /// Run the day-change sequence for the current day on demand
    pub fn force_evaluate(&mut self) {
        let ctx = scheduling_context!(self);
        self.scheduler.force_evaluate(&mut self.lifecycle, &ctx);
        self.pump();
    }

    pub fn try_queue_minor_for_current_day(&mut self) -> Option<Arc<EventDefinition>> {
        let ctx = scheduling_context!(self);
        let queued = self
            .scheduler
            .try_queue_minor_for_current_day(&mut self.lifecycle, &ctx);
        self.pump();
        queued
    }

    pub fn try_queue_major_for_current_day(&mut self) -> Option<Arc<EventDefinition>> {
        let ctx = scheduling_context!(self);
        let queued = self
            .scheduler
            .try_queue_major_for_current_day(&mut self.lifecycle, &ctx);
        self.pump();
        queued
    }

    /// Preview today's minor pick; nothing changes
    pub fn pick_minor_event_for_day(&self) -> Option<Arc<EventDefinition>> {
        self.scheduler
            .pick_minor_event_for_day(&scheduling_context!(self))
    }

    /// Preview today's major pick; nothing changes
    pub fn pick_major_event_for_day(&self) -> Option<Arc<EventDefinition>> {
        self.scheduler
            .pick_major_event_for_day(&scheduling_context!(self))
    }

    /// Let time pass (sleeping, working) and process every day entered
    pub fn advance_hours(&mut self, hours: u32) -> Vec<u32> {
        let entered = self.clock.advance_hours(hours);
        for day in &entered {
            self.run_day_change(*day);
        }
        entered
    }

    /// Ask to end the current day
    ///
    /// Refused while an event is active or pending. Otherwise a major event
    /// may be queued first (once per day); if none is, the clock moves to
    /// the next start hour.
    pub fn request_day_end(&mut self) -> DayEndOutcome {
        if !self.lifecycle.is_idle() {
            return DayEndOutcome::Blocked;
        }

        let day = self.clock.current_day();
        if self.config.day_end_forces_major && self.scheduler.major_queued_day() != Some(day) {
            if let Some(major) = self.try_queue_major_for_current_day() {
                info!(event = %major.key(), day, "major event queued at day end");
                return DayEndOutcome::MajorQueued(major);
            }
        }

        let hour = self.clock.current_hour();
        let start = self.config.day_start_hour;
        let hours = if hour < start {
            start - hour
        } else {
            HOURS_PER_DAY - hour + start
        };
        self.advance_hours(hours);

        DayEndOutcome::Advanced {
            day: self.clock.current_day(),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn current_event(&self) -> Option<&Arc<EventDefinition>> {
        self.lifecycle.current_event()
    }

    pub fn has_pending_events(&self) -> bool {
        self.lifecycle.has_pending_events()
    }

    pub fn pending_event_ids(&self) -> Vec<String> {
        self.lifecycle.pending_event_ids()
    }

    /// Choices of the active event that can be picked right now
    pub fn available_choices(&self) -> Vec<AvailableChoice<'_>> {
        match self.lifecycle.current_event() {
            Some(event) => available_choices(event, self.stats.as_deref()),
            None => Vec::new(),
        }
    }

    pub fn event_by_id(&self, id: &str) -> Option<Arc<EventDefinition>> {
        self.scheduler.event_by_id(id)
    }

    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    pub fn scheduler(&self) -> &EventScheduler {
        &self.scheduler
    }

    pub fn clock(&self) -> &dyn Clock {
        &*self.clock
    }

    pub fn stats(&self) -> Option<&dyn StatStore> {
        self.stats.as_deref()
    }

    pub fn stats_mut(&mut self) -> Option<&mut (dyn StatStore + 'static)> {
        self.stats.as_deref_mut()
    }

    pub fn flags(&self) -> Option<&dyn FlagStore> {
        self.flags.as_deref()
    }

    pub fn flags_mut(&mut self) -> Option<&mut (dyn FlagStore + 'static)> {
        self.flags.as_deref_mut()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn run_day_change(&mut self, day: u32) {
        info!(day, "day change");
        let ctx = scheduling_context!(self);
        self.scheduler
            .on_day_changed(day, &mut self.lifecycle, &ctx);
        self.pump();
    }

    /// Drain the outbox until quiet, routing and recording every notification
    fn pump(&mut self) {
        loop {
            let batch = self.lifecycle.drain_notifications();
            if batch.is_empty() {
                break;
            }
            for note in batch {
                self.route(&note);
                for observer in &mut self.observers {
                    observer(&note);
                }
                self.log.log(note);
            }
        }
    }

    fn route(&mut self, note: &LifecycleEvent) {
        let ctx = scheduling_context!(self);
        match note {
            LifecycleEvent::ChoiceApplied {
                event,
                choice_index,
                ..
            } => {
                self.scheduler
                    .on_choice_applied(event, *choice_index, &mut self.lifecycle, &ctx);
            }
            LifecycleEvent::EventCompleted { .. } => {
                self.scheduler.on_event_completed(&mut self.lifecycle, &ctx);
            }
            LifecycleEvent::EventStarted { .. } | LifecycleEvent::OutcomeMessage { .. } => {}
        }
    }
}
