//! Time management for the narrative layer
//!
//! The game advances in discrete hours. Twenty-four hours form a day and
//! days are numbered from 1. Advancing the clock reports every day boundary
//! it crossed, which is how the engine learns about day changes.

use crate::core::calendar::CalendarConfig;
use serde::{Deserialize, Serialize};

/// Hours in one in-game day
pub const HOURS_PER_DAY: u32 = 24;

/// Absolute hour used by cooldowns: `day * 24 + hour`
pub fn absolute_hour(day: u32, hour: u32) -> u64 {
    u64::from(day) * u64::from(HOURS_PER_DAY) + u64::from(hour)
}

/// Source of "now" and of the calendar predicates the scheduler filters on
///
/// The engine is handed one implementation at construction and never looks
/// anywhere else for the current day.
pub trait Clock {
    /// Current day (1-based)
    fn current_day(&self) -> u32;

    /// Hour within the current day, `0..24`
    fn current_hour(&self) -> u32;

    /// Advance time and return every day entered, in order
    ///
    /// An empty vector means no midnight was crossed. The day counter stops
    /// at `u32::MAX`.
    fn advance_hours(&mut self, hours: u32) -> Vec<u32>;

    /// Move the clock without reporting day changes (checkpoint restore)
    fn set_position(&mut self, day: u32, hour: u32);

    fn is_in_exam_window(&self, day: u32) -> bool;
    fn is_kyk_payday(&self, day: u32) -> bool;
    fn is_inflation_shock_day(&self, day: u32) -> bool;
    fn is_second_semester(&self, day: u32) -> bool;

    fn absolute_hour(&self) -> u64 {
        absolute_hour(self.current_day(), self.current_hour())
    }
}

/// Hour/day clock backed by a [`CalendarConfig`]
///
/// # Example
/// ```
/// use campus_narrative_core_rs::core::{CalendarConfig, Clock, GameClock};
///
/// let mut clock = GameClock::starting_at(1, 20, CalendarConfig::default());
/// let entered = clock.advance_hours(6);
/// assert_eq!(entered, vec![2]);
/// assert_eq!(clock.current_day(), 2);
/// assert_eq!(clock.current_hour(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameClock {
    day: u32,
    hour: u32,
    calendar: CalendarConfig,
}

impl GameClock {
    /// Create a clock at day 1, 08:00
    pub fn new(calendar: CalendarConfig) -> Self {
        Self::starting_at(1, 8, calendar)
    }

    /// Create a clock at an arbitrary position
    ///
    /// Day 0 is lifted to day 1.
    ///
    /// # Panics
    /// Panics if `hour` is not within a day.
    pub fn starting_at(day: u32, hour: u32, calendar: CalendarConfig) -> Self {
        assert!(hour < HOURS_PER_DAY, "hour must be within a day");
        Self {
            day: day.max(1),
            hour,
            calendar,
        }
    }

    pub fn calendar(&self) -> &CalendarConfig {
        &self.calendar
    }
}

impl Clock for GameClock {
    fn current_day(&self) -> u32 {
        self.day
    }

    fn current_hour(&self) -> u32 {
        self.hour
    }

    fn advance_hours(&mut self, hours: u32) -> Vec<u32> {
        let total = u64::from(self.hour) + u64::from(hours);
        let days_crossed = total / u64::from(HOURS_PER_DAY);

        let mut entered = Vec::new();
        for _ in 0..days_crossed {
            let next = self.day.saturating_add(1);
            if next == self.day {
                break;
            }
            self.day = next;
            entered.push(next);
        }
        self.hour = (total % u64::from(HOURS_PER_DAY)) as u32;

        entered
    }

    fn set_position(&mut self, day: u32, hour: u32) {
        self.day = day.max(1);
        self.hour = hour % HOURS_PER_DAY;
    }

    fn is_in_exam_window(&self, day: u32) -> bool {
        self.calendar.is_in_exam_window(day)
    }

    fn is_kyk_payday(&self, day: u32) -> bool {
        self.calendar.is_kyk_payday(day)
    }

    fn is_inflation_shock_day(&self, day: u32) -> bool {
        self.calendar.is_inflation_shock_day(day)
    }

    fn is_second_semester(&self, day: u32) -> bool {
        self.calendar.is_second_semester(day)
    }
}
