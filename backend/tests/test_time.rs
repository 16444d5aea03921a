//! Tests for GameClock and CalendarConfig

use campus_narrative_core_rs::core::{CalendarConfig, Clock, DayWindow, GameClock};

#[test]
fn test_clock_new() {
    let clock = GameClock::new(CalendarConfig::default());
    assert_eq!(clock.current_day(), 1);
    assert_eq!(clock.current_hour(), 8);
    assert_eq!(clock.absolute_hour(), 24 + 8);
}

#[test]
fn test_advance_within_day_reports_nothing() {
    let mut clock = GameClock::new(CalendarConfig::default());

    let entered = clock.advance_hours(10);
    assert!(entered.is_empty());
    assert_eq!(clock.current_day(), 1);
    assert_eq!(clock.current_hour(), 18);
}

#[test]
fn test_day_boundary() {
    let mut clock = GameClock::starting_at(1, 23, CalendarConfig::default());

    // Cross into day 2
    let entered = clock.advance_hours(1);
    assert_eq!(entered, vec![2]);
    assert_eq!(clock.current_day(), 2);
    assert_eq!(clock.current_hour(), 0);
}

#[test]
fn test_multi_day_advance_reports_every_day_in_order() {
    let mut clock = GameClock::starting_at(3, 12, CalendarConfig::default());

    let entered = clock.advance_hours(24 * 3);
    assert_eq!(entered, vec![4, 5, 6]);
    assert_eq!(clock.current_hour(), 12);
}

#[test]
fn test_set_position_reports_nothing() {
    let mut clock = GameClock::new(CalendarConfig::default());
    clock.set_position(40, 21);
    assert_eq!(clock.current_day(), 40);
    assert_eq!(clock.current_hour(), 21);
}

#[test]
fn test_day_counter_stops_at_max() {
    let mut clock = GameClock::new(CalendarConfig::default());
    clock.set_position(u32::MAX - 1, 6);

    let entered = clock.advance_hours(72);
    assert_eq!(entered, vec![u32::MAX]);
    assert_eq!(clock.current_day(), u32::MAX);
    assert_eq!(clock.current_hour(), 6);
}

#[test]
fn test_default_calendar_predicates() {
    let clock = GameClock::new(CalendarConfig::default());

    assert!(!clock.is_in_exam_window(34));
    assert!(clock.is_in_exam_window(35));
    assert!(clock.is_in_exam_window(42));
    assert!(!clock.is_in_exam_window(43));

    assert!(clock.is_kyk_payday(15));
    assert!(clock.is_kyk_payday(45));
    assert!(!clock.is_kyk_payday(16));

    assert!(clock.is_inflation_shock_day(60));
    assert!(!clock.is_inflation_shock_day(61));

    assert!(!clock.is_second_semester(105));
    assert!(clock.is_second_semester(106));
}

#[test]
fn test_custom_calendar() {
    let calendar = CalendarConfig {
        exam_windows: vec![DayWindow::new(2, 3)],
        inflation_shock_days: vec![5],
        ..CalendarConfig::default()
    };
    assert!(calendar.validate().is_ok());

    let clock = GameClock::new(calendar);
    assert!(clock.is_in_exam_window(2));
    assert!(clock.is_in_exam_window(3));
    assert!(!clock.is_in_exam_window(35));
    assert!(clock.is_inflation_shock_day(5));
}

#[test]
fn test_inverted_window_fails_validation() {
    let calendar = CalendarConfig {
        exam_windows: vec![DayWindow::new(10, 2)],
        ..CalendarConfig::default()
    };
    assert!(calendar.validate().is_err());
}
