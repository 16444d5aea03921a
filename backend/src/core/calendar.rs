//! Academic calendar rules
//!
//! The engine only consumes these through the [`Clock`](super::time::Clock)
//! predicates. `CalendarConfig` is the rule set behind [`GameClock`](super::time::GameClock).
//!
//! All days are 1-based. Day-of-month arithmetic uses fixed-length months.

use serde::{Deserialize, Serialize};

/// Inclusive range of days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub start: u32,
    pub end: u32,
}

impl DayWindow {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, day: u32) -> bool {
        day >= self.start && day <= self.end
    }
}

/// Calendar rule set for one academic year
///
/// # Example
/// ```
/// use campus_narrative_core_rs::core::CalendarConfig;
///
/// let calendar = CalendarConfig::default();
/// assert!(calendar.is_kyk_payday(15));
/// assert!(calendar.is_kyk_payday(45));
/// assert!(!calendar.is_kyk_payday(16));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Length of a month in days
    pub days_per_month: u32,

    /// Day of month on which the KYK stipend is paid (1-based)
    pub kyk_payday_of_month: u32,

    /// Days in the first semester; every later day belongs to the second
    pub semester_length_days: u32,

    /// Midterm and final exam periods
    pub exam_windows: Vec<DayWindow>,

    /// Days on which the inflation shock lands
    pub inflation_shock_days: Vec<u32>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            days_per_month: 30,
            kyk_payday_of_month: 15,
            semester_length_days: 105,
            exam_windows: vec![
                DayWindow::new(35, 42),
                DayWindow::new(91, 100),
                DayWindow::new(140, 147),
                DayWindow::new(196, 205),
            ],
            inflation_shock_days: vec![60, 165],
        }
    }
}

impl CalendarConfig {
    pub fn is_in_exam_window(&self, day: u32) -> bool {
        self.exam_windows.iter().any(|window| window.contains(day))
    }

    pub fn is_kyk_payday(&self, day: u32) -> bool {
        if self.days_per_month == 0 || day == 0 {
            return false;
        }
        (day - 1) % self.days_per_month + 1 == self.kyk_payday_of_month
    }

    pub fn is_inflation_shock_day(&self, day: u32) -> bool {
        self.inflation_shock_days.contains(&day)
    }

    pub fn is_second_semester(&self, day: u32) -> bool {
        day > self.semester_length_days
    }

    /// Check the rule set for impossible values
    pub fn validate(&self) -> Result<(), String> {
        if self.days_per_month == 0 {
            return Err("days_per_month must be positive".to_string());
        }
        if self.kyk_payday_of_month == 0 || self.kyk_payday_of_month > self.days_per_month {
            return Err(format!(
                "kyk_payday_of_month must be within 1..={} (got {})",
                self.days_per_month, self.kyk_payday_of_month
            ));
        }
        if self.semester_length_days == 0 {
            return Err("semester_length_days must be positive".to_string());
        }
        for window in &self.exam_windows {
            if window.start == 0 || window.start > window.end {
                return Err(format!(
                    "exam window {}..={} is not a valid day range",
                    window.start, window.end
                ));
            }
        }
        Ok(())
    }
}
