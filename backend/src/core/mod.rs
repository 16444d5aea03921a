//! Core time and calendar primitives
//!
//! The narrative engine never reads wall-clock time. Everything it knows
//! about "now" comes through the [`time::Clock`] trait.

pub mod calendar;
pub mod time;

pub use calendar::{CalendarConfig, DayWindow};
pub use time::{absolute_hour, Clock, GameClock, HOURS_PER_DAY};
