//! Event Scheduler
//!
//! Decides which catalog entry goes in front of the player and when.
//!
//! # Day-change sequence
//!
//! ```text
//! 1. Due scheduled follow-ups are enqueued
//! 2. Buffered follow-up repeats are drained
//! 3. The daily minor-event attempt runs
//! ```
//!
//! # Critical Invariants
//!
//! - Cooldowns are stamped only when the lifecycle manager accepted the event
//! - At most one minor and one major are picked per day
//! - A candidate with no available choice is never picked
//! - Exam and inflation majors win their anchor days regardless of weight
//!
//! All randomness comes from the scheduler's own [`RngManager`]. Previews
//! draw from a clone, so they never disturb the stream.

pub mod config;
pub mod eligibility;
mod follow_up;
pub mod selection;
mod snapshot;

pub use config::{FlagThreshold, SchedulerConfig, StatBand, TagThresholds};
pub use follow_up::{FollowUpAttempt, ScheduledFollowUp};
pub use selection::select_weighted;
pub use snapshot::{CooldownEntry, PendingRepeat, SchedulerSnapshot};

use crate::core::time::Clock;
use crate::lifecycle::{has_available_choice, LifecycleManager};
use crate::models::catalog::EventCatalog;
use crate::models::definition::EventDefinition;
use crate::models::flags::{normalize_key, FlagStore};
use crate::models::stats::StatStore;
use crate::rng::RngManager;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Read-only view of the collaborators selection depends on
#[derive(Clone, Copy)]
pub struct SchedulingContext<'a> {
    pub clock: &'a dyn Clock,
    pub stats: Option<&'a dyn StatStore>,
    pub flags: Option<&'a dyn FlagStore>,
}

impl<'a> SchedulingContext<'a> {
    pub fn new(
        clock: &'a dyn Clock,
        stats: Option<&'a dyn StatStore>,
        flags: Option<&'a dyn FlagStore>,
    ) -> Self {
        Self {
            clock,
            stats,
            flags,
        }
    }

    pub fn day(&self) -> u32 {
        self.clock.current_day()
    }

    /// Absolute hour, the unit cooldowns are stored in
    pub fn now(&self) -> u64 {
        self.clock.absolute_hour()
    }
}

/// Candidate pools, cooldown table and follow-up chain state
#[derive(Debug, Clone)]
pub struct EventScheduler {
    config: SchedulerConfig,
    catalog: Arc<EventCatalog>,
    rng: RngManager,

    /// Event key -> absolute hour at which it may be picked again
    cooldowns: BTreeMap<String, u64>,

    /// Delayed chain links not yet due
    scheduled: Vec<ScheduledFollowUp>,

    /// Follow-up key -> owed enqueue attempts
    pending_repeats: BTreeMap<String, u32>,

    /// Unknown follow-up ids already warned about
    reported_missing: HashSet<String>,

    minor_queued_day: Option<u32>,
    major_queued_day: Option<u32>,
}

impl EventScheduler {
    pub fn new(config: SchedulerConfig, catalog: Arc<EventCatalog>) -> Self {
        let rng = RngManager::new(config.rng_seed);
        Self {
            config,
            catalog,
            rng,
            cooldowns: BTreeMap::new(),
            scheduled: Vec::new(),
            pending_repeats: BTreeMap::new(),
            reported_missing: HashSet::new(),
            minor_queued_day: None,
            major_queued_day: None,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<EventCatalog> {
        &self.catalog
    }

    /// Resolve a catalog entry by id (for hosts re-resolving saved ids)
    pub fn event_by_id(&self, id: &str) -> Option<Arc<EventDefinition>> {
        self.catalog.get(id).cloned()
    }

    pub fn rng_state(&self) -> u64 {
        self.rng.state()
    }

    pub fn restore_rng_state(&mut self, state: u64) {
        self.rng = RngManager::from_state(state);
    }

    pub fn minor_queued_day(&self) -> Option<u32> {
        self.minor_queued_day
    }

    pub fn major_queued_day(&self) -> Option<u32> {
        self.major_queued_day
    }

    // ========================================================================
    // Cooldowns
    // ========================================================================

    pub fn cooldown_hours_for(&self, event: &EventDefinition) -> u32 {
        self.config.cooldown_hours_for(event)
    }

    /// Absolute hour at which the event may be picked again
    pub fn cooldown_until(&self, id: &str) -> Option<u64> {
        self.cooldowns.get(&normalize_key(id)).copied()
    }

    pub fn is_on_cooldown(&self, key: &str, now: u64) -> bool {
        self.cooldowns.get(key).is_some_and(|until| *until > now)
    }

    fn stamp_cooldown(&mut self, event: &EventDefinition, now: u64) {
        let until = now + u64::from(self.cooldown_hours_for(event));
        debug!(event = %event.key(), until, "cooldown stamped");
        self.cooldowns.insert(event.key().to_string(), until);
    }

    // ========================================================================
    // Eligibility
    // ========================================================================

    /// Can `event` be picked at `now` on `day`?
    ///
    /// Rejects events on cooldown, events with no available choice, and
    /// events whose required tags do not all match.
    pub fn is_eligible(
        &self,
        event: &EventDefinition,
        now: u64,
        day: u32,
        ctx: &SchedulingContext<'_>,
    ) -> bool {
        if self.is_on_cooldown(event.key(), now) {
            return false;
        }
        if !has_available_choice(event, ctx.stats) {
            return false;
        }
        eligibility::all_tags_match(event.required_tags(), day, ctx, &self.config.thresholds)
    }

    fn eligible_from(
        &self,
        pool: &[Arc<EventDefinition>],
        ctx: &SchedulingContext<'_>,
    ) -> Vec<Arc<EventDefinition>> {
        let now = ctx.now();
        let day = ctx.day();
        pool.iter()
            .filter(|event| self.is_eligible(event, now, day, ctx))
            .cloned()
            .collect()
    }

    pub fn eligible_minor_events(&self, ctx: &SchedulingContext<'_>) -> Vec<Arc<EventDefinition>> {
        self.eligible_from(self.catalog.minor_pool(), ctx)
    }

    pub fn eligible_major_events(&self, ctx: &SchedulingContext<'_>) -> Vec<Arc<EventDefinition>> {
        self.eligible_from(self.catalog.major_pool(), ctx)
    }

    // ========================================================================
    // Selection
    // ========================================================================

    fn choose_minor(
        &self,
        ctx: &SchedulingContext<'_>,
        rng: &mut RngManager,
    ) -> Option<Arc<EventDefinition>> {
        let candidates = self.eligible_minor_events(ctx);
        select_weighted(&candidates, |e| e.weight(), rng).cloned()
    }

    fn choose_major(
        &self,
        ctx: &SchedulingContext<'_>,
        rng: &mut RngManager,
    ) -> Option<Arc<EventDefinition>> {
        let candidates = self.eligible_major_events(ctx);
        let day = ctx.day();

        let anchor_tokens = if ctx.clock.is_in_exam_window(day) {
            Some(&self.config.exam_tokens)
        } else if ctx.clock.is_inflation_shock_day(day) {
            Some(&self.config.inflation_tokens)
        } else {
            None
        };

        if let Some(tokens) = anchor_tokens {
            let anchored: Vec<Arc<EventDefinition>> = candidates
                .iter()
                .filter(|e| e.mentions_any(tokens))
                .cloned()
                .collect();
            if let Some(picked) = select_weighted(&anchored, |e| e.weight(), rng) {
                debug!(event = %picked.key(), day, "calendar priority major selected");
                return Some(Arc::clone(picked));
            }
        }

        select_weighted(&candidates, |e| e.weight(), rng).cloned()
    }

    /// Preview today's minor pick without changing any state
    pub fn pick_minor_event_for_day(
        &self,
        ctx: &SchedulingContext<'_>,
    ) -> Option<Arc<EventDefinition>> {
        let mut rng = self.rng.clone();
        self.choose_minor(ctx, &mut rng)
    }

    /// Preview today's major pick without changing any state
    pub fn pick_major_event_for_day(
        &self,
        ctx: &SchedulingContext<'_>,
    ) -> Option<Arc<EventDefinition>> {
        let mut rng = self.rng.clone();
        self.choose_major(ctx, &mut rng)
    }

    /// Queue at most one minor per day, only when nothing is active or pending
    pub fn try_queue_minor_for_current_day(
        &mut self,
        lifecycle: &mut LifecycleManager,
        ctx: &SchedulingContext<'_>,
    ) -> Option<Arc<EventDefinition>> {
        let day = ctx.day();
        if self.minor_queued_day == Some(day) || !lifecycle.is_idle() {
            return None;
        }

        let mut rng = self.rng.clone();
        let picked = self.choose_minor(ctx, &mut rng);
        self.rng = rng;

        let picked = picked?;
        self.enqueue_selected(&picked, lifecycle, ctx)?;
        self.minor_queued_day = Some(day);
        Some(picked)
    }

    /// Queue at most one major per day, honoring calendar priority
    pub fn try_queue_major_for_current_day(
        &mut self,
        lifecycle: &mut LifecycleManager,
        ctx: &SchedulingContext<'_>,
    ) -> Option<Arc<EventDefinition>> {
        let day = ctx.day();
        if self.major_queued_day == Some(day) || !lifecycle.is_idle() {
            return None;
        }

        let mut rng = self.rng.clone();
        let picked = self.choose_major(ctx, &mut rng);
        self.rng = rng;

        let picked = picked?;
        self.enqueue_selected(&picked, lifecycle, ctx)?;
        self.major_queued_day = Some(day);
        Some(picked)
    }

    fn enqueue_selected(
        &mut self,
        event: &Arc<EventDefinition>,
        lifecycle: &mut LifecycleManager,
        ctx: &SchedulingContext<'_>,
    ) -> Option<()> {
        let now = ctx.now();
        match lifecycle.try_enqueue(Arc::clone(event), now) {
            Ok(()) => {
                self.stamp_cooldown(event, now);
                Some(())
            }
            Err(rejection) => {
                debug!(event = %event.key(), %rejection, "selected event not enqueued");
                None
            }
        }
    }

    // ========================================================================
    // Day change
    // ========================================================================

    /// Run the day-change sequence for `day`
    pub fn on_day_changed(
        &mut self,
        day: u32,
        lifecycle: &mut LifecycleManager,
        ctx: &SchedulingContext<'_>,
    ) {
        self.process_due_follow_ups(day, lifecycle, ctx);
        self.drain_pending_repeats(lifecycle, ctx);
        self.try_queue_minor_for_current_day(lifecycle, ctx);
    }

    /// Run the day-change sequence for the current day on demand
    pub fn force_evaluate(&mut self, lifecycle: &mut LifecycleManager, ctx: &SchedulingContext<'_>) {
        self.on_day_changed(ctx.day(), lifecycle, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calendar::CalendarConfig;
    use crate::core::time::GameClock;
    use crate::models::definition::{Choice, EventCategory};

    fn minor(id: &str, weight: f64) -> EventDefinition {
        EventDefinition::builder(id, EventCategory::Minor)
            .weight(weight)
            .choice(Choice::builder("ok").build())
            .build()
    }

    #[test]
    fn test_minor_guard_once_per_day() {
        let catalog = Arc::new(EventCatalog::new(vec![minor("a", 1.0), minor("b", 1.0)]).unwrap());
        let config = SchedulerConfig {
            default_cooldown_hours: 0,
            ..Default::default()
        };
        let mut scheduler = EventScheduler::new(config, catalog);
        let mut lifecycle = LifecycleManager::new();
        let clock = GameClock::new(CalendarConfig::default());
        let ctx = SchedulingContext::new(&clock, None, None);

        let first = scheduler.try_queue_minor_for_current_day(&mut lifecycle, &ctx);
        assert!(first.is_some());
        assert_eq!(scheduler.minor_queued_day(), Some(1));

        // Clear the lifecycle so only the daily guard can block
        let mut fresh = LifecycleManager::new();
        assert!(scheduler
            .try_queue_minor_for_current_day(&mut fresh, &ctx)
            .is_none());
    }

    #[test]
    fn test_event_without_available_choice_is_ineligible() {
        let empty = EventDefinition::builder("empty", EventCategory::Minor).build();
        let catalog = Arc::new(EventCatalog::new(vec![empty]).unwrap());
        let scheduler = EventScheduler::new(SchedulerConfig::default(), catalog);
        let clock = GameClock::new(CalendarConfig::default());
        let ctx = SchedulingContext::new(&clock, None, None);

        assert!(scheduler.pick_minor_event_for_day(&ctx).is_none());
    }

    #[test]
    fn test_preview_does_not_advance_rng() {
        let catalog = Arc::new(
            EventCatalog::new(vec![minor("a", 1.0), minor("b", 1.0), minor("c", 1.0)]).unwrap(),
        );
        let scheduler = EventScheduler::new(SchedulerConfig::default(), catalog);
        let clock = GameClock::new(CalendarConfig::default());
        let ctx = SchedulingContext::new(&clock, None, None);

        let state = scheduler.rng_state();
        let first = scheduler.pick_minor_event_for_day(&ctx);
        let second = scheduler.pick_minor_event_for_day(&ctx);
        assert_eq!(first, second);
        assert_eq!(scheduler.rng_state(), state);
    }
}
