//! Scheduler Selection Tests
//!
//! Eligibility, weighted selection, cooldowns, daily guards and calendar
//! priority for majors.

use campus_narrative_core_rs::core::{CalendarConfig, Clock, DayWindow, GameClock};
use campus_narrative_core_rs::models::{
    Choice, Comparator, ContextTag, EventCatalog, EventCategory, EventDefinition, FlagBook,
    FlagStore, StatKind, StatSheet, StatStore,
};
use campus_narrative_core_rs::orchestrator::{Collaborators, EngineConfig, EventEngine};

// ============================================================================
// Test Helpers
// ============================================================================

fn def(id: &str, category: EventCategory, weight: f64) -> EventDefinition {
    EventDefinition::builder(id, category)
        .weight(weight)
        .choice(Choice::builder("ok").build())
        .build()
}

fn tagged(id: &str, weight: f64, tag: ContextTag) -> EventDefinition {
    EventDefinition::builder(id, EventCategory::Minor)
        .weight(weight)
        .tag(tag)
        .choice(Choice::builder("ok").build())
        .build()
}

fn engine_at(
    events: Vec<EventDefinition>,
    seed: u64,
    clock: GameClock,
    stats: Option<StatSheet>,
) -> EventEngine {
    let mut config = EngineConfig::default();
    config.scheduler.rng_seed = seed;
    let collaborators = Collaborators {
        clock: Box::new(clock),
        stats: stats.map(|s| Box::new(s) as Box<dyn StatStore>),
        flags: Some(Box::new(FlagBook::new())),
    };
    EventEngine::new(config, EventCatalog::new(events).unwrap(), collaborators).unwrap()
}

fn engine_on_day(events: Vec<EventDefinition>, seed: u64, day: u32) -> EventEngine {
    engine_at(
        events,
        seed,
        GameClock::starting_at(day, 8, CalendarConfig::default()),
        Some(StatSheet::new()),
    )
}

// ============================================================================
// Eligibility
// ============================================================================

#[test]
fn test_money_band_filters_before_weighting() {
    // Money 50 is not low, so B never reaches weighted selection
    for seed in 1..50 {
        let engine = engine_at(
            vec![
                def("a", EventCategory::Minor, 1.0),
                tagged("b", 1.0, ContextTag::MoneyLow),
            ],
            seed,
            GameClock::new(CalendarConfig::default()),
            Some(StatSheet::new().with(StatKind::Money, 50.0)),
        );
        let picked = engine.pick_minor_event_for_day();
        assert_eq!(picked.map(|e| e.key().to_string()), Some("a".to_string()));
    }
}

#[test]
fn test_money_low_band_matches() {
    let engine = engine_at(
        vec![tagged("b", 1.0, ContextTag::MoneyLow)],
        7,
        GameClock::new(CalendarConfig::default()),
        Some(StatSheet::new().with(StatKind::Money, 5.0)),
    );
    assert_eq!(
        engine.pick_minor_event_for_day().map(|e| e.key().to_string()),
        Some("b".to_string())
    );
}

#[test]
fn test_stat_tag_fails_closed_without_stat_store() {
    for seed in 1..20 {
        let engine = engine_at(
            vec![
                tagged("needs_stats", 1000.0, ContextTag::MentalLow),
                def("plain", EventCategory::Minor, 0.001),
            ],
            seed,
            GameClock::new(CalendarConfig::default()),
            None,
        );
        assert_eq!(
            engine.pick_minor_event_for_day().map(|e| e.key().to_string()),
            Some("plain".to_string())
        );
    }
}

#[test]
fn test_flag_tags_read_flag_store() {
    let mut engine = engine_on_day(
        vec![
            tagged("strain", 1.0, ContextTag::WorkStrain),
            tagged("cut", 1.0, ContextTag::KykStatus("cut".to_string())),
        ],
        3,
        1,
    );
    assert!(engine.pick_minor_event_for_day().is_none());

    engine.flags_mut().unwrap().set_numeric("work_strain", 2.0);
    assert_eq!(
        engine.pick_minor_event_for_day().map(|e| e.key().to_string()),
        Some("strain".to_string())
    );

    engine.flags_mut().unwrap().remove("work_strain");
    engine.flags_mut().unwrap().set_text("kyk_status", " CUT ");
    assert_eq!(
        engine.pick_minor_event_for_day().map(|e| e.key().to_string()),
        Some("cut".to_string())
    );
}

#[test]
fn test_calendar_tag_requires_exam_window() {
    let events = || vec![tagged("study", 1.0, ContextTag::ExamWindow)];

    assert!(engine_on_day(events(), 1, 10)
        .pick_minor_event_for_day()
        .is_none());
    assert!(engine_on_day(events(), 1, 36)
        .pick_minor_event_for_day()
        .is_some());
}

#[test]
fn test_event_without_available_choice_never_picked() {
    let locked = EventDefinition::builder("locked", EventCategory::Minor)
        .weight(100.0)
        .choice(
            Choice::builder("Only for the rich")
                .condition(StatKind::Money, Comparator::GreaterThan, 10_000.0)
                .build(),
        )
        .build();

    let engine = engine_on_day(vec![locked], 5, 1);
    assert!(engine.pick_minor_event_for_day().is_none());
}

// ============================================================================
// Cooldowns and daily guards
// ============================================================================

#[test]
fn test_cooldown_respected_then_expires() {
    let only = EventDefinition::builder("only", EventCategory::Minor)
        .cooldown_hours(48)
        .choice(Choice::builder("ok").build())
        .build();
    let mut engine = engine_on_day(vec![only], 11, 1);

    // Day 1, 08:00 (hour 32): queued, cooldown until hour 80
    assert!(engine.try_queue_minor_for_current_day().is_some());
    assert_eq!(engine.scheduler().cooldown_until("only"), Some(32 + 48));
    engine.apply_current_choice(0);

    // Day 2, 08:00 (hour 56): still cooling down
    engine.request_day_end();
    assert_eq!(engine.clock().current_day(), 2);
    assert!(engine.current_event().is_none());
    assert!(engine.pick_minor_event_for_day().is_none());

    // Day 3, 08:00 (hour 80): selectable again, queued by the day change
    engine.request_day_end();
    assert_eq!(engine.clock().current_day(), 3);
    assert_eq!(engine.current_event().map(|e| e.key()), Some("only"));
}

#[test]
fn test_cooldown_resolution_category_then_default() {
    let mut config = EngineConfig::default();
    config.scheduler.default_cooldown_hours = 10;
    config
        .scheduler
        .category_cooldown_hours
        .insert(EventCategory::Major, 100);
    let collaborators = Collaborators::in_memory(&config);
    let catalog = EventCatalog::new(vec![
        def("minor", EventCategory::Minor, 1.0),
        def("major", EventCategory::Major, 1.0),
    ])
    .unwrap();
    let mut engine = EventEngine::new(config, catalog, collaborators).unwrap();

    let now = engine.clock().absolute_hour();
    engine.try_queue_minor_for_current_day();
    engine.apply_current_choice(0);
    engine.try_queue_major_for_current_day();

    assert_eq!(engine.scheduler().cooldown_until("minor"), Some(now + 10));
    assert_eq!(engine.scheduler().cooldown_until("major"), Some(now + 100));
}

#[test]
fn test_minor_only_once_per_day() {
    let mut engine = engine_on_day(
        vec![
            def("a", EventCategory::Minor, 1.0),
            def("b", EventCategory::Minor, 1.0),
        ],
        2,
        1,
    );

    assert!(engine.try_queue_minor_for_current_day().is_some());
    engine.apply_current_choice(0);
    assert!(engine.try_queue_minor_for_current_day().is_none());
}

#[test]
fn test_minor_not_queued_while_event_active() {
    let mut engine = engine_on_day(
        vec![
            def("a", EventCategory::Minor, 1.0),
            def("manual", EventCategory::Minor, 1.0),
        ],
        2,
        1,
    );
    engine.enqueue_event_by_id("manual");

    assert!(engine.try_queue_minor_for_current_day().is_none());
    assert_eq!(engine.scheduler().minor_queued_day(), None);
}

#[test]
fn test_direct_enqueue_does_not_stamp_cooldown() {
    let mut engine = engine_on_day(vec![def("a", EventCategory::Minor, 1.0)], 2, 1);
    engine.enqueue_event_by_id("a");
    engine.apply_current_choice(0);

    // Direct enqueue bypasses selection: no cooldown recorded
    assert_eq!(engine.scheduler().cooldown_until("a"), None);
}

#[test]
fn test_preview_predicts_next_queue() {
    let events: Vec<EventDefinition> = (0..6)
        .map(|i| def(&format!("m{i}"), EventCategory::Minor, 1.0 + i as f64))
        .collect();
    let mut engine = engine_on_day(events, 99, 1);

    let preview = engine.pick_minor_event_for_day();
    let queued = engine.try_queue_minor_for_current_day();
    assert_eq!(preview, queued);
}

// ============================================================================
// Calendar priority
// ============================================================================

#[test]
fn test_exam_major_beats_heavier_generic_major() {
    for seed in 1..30 {
        let engine = engine_on_day(
            vec![
                def("street_festival", EventCategory::Major, 100.0),
                def("midterm_exam", EventCategory::Major, 1.0),
            ],
            seed,
            36,
        );
        assert_eq!(
            engine.pick_major_event_for_day().map(|e| e.key().to_string()),
            Some("midterm_exam".to_string())
        );
    }
}

#[test]
fn test_exam_token_matches_title() {
    let vize = EventDefinition::builder("morning_hall", EventCategory::Major)
        .title("Vize Morning")
        .choice(Choice::builder("Go").build())
        .build();
    let engine = engine_on_day(vec![def("party", EventCategory::Major, 50.0), vize], 4, 40);

    assert_eq!(
        engine.pick_major_event_for_day().map(|e| e.key().to_string()),
        Some("morning_hall".to_string())
    );
}

#[test]
fn test_inflation_major_beats_heavier_generic_major() {
    for seed in 1..30 {
        let engine = engine_on_day(
            vec![
                def("concert", EventCategory::Major, 100.0),
                def("inflation_rent_hike", EventCategory::Major, 1.0),
            ],
            seed,
            60,
        );
        assert_eq!(
            engine.pick_major_event_for_day().map(|e| e.key().to_string()),
            Some("inflation_rent_hike".to_string())
        );
    }
}

#[test]
fn test_exam_window_takes_precedence_over_inflation_day() {
    let calendar = CalendarConfig {
        exam_windows: vec![DayWindow::new(60, 60)],
        inflation_shock_days: vec![60],
        ..CalendarConfig::default()
    };
    let engine = engine_at(
        vec![
            def("inflation_bill", EventCategory::Major, 100.0),
            def("final_exam", EventCategory::Major, 1.0),
        ],
        8,
        GameClock::starting_at(60, 8, calendar),
        Some(StatSheet::new()),
    );

    assert_eq!(
        engine.pick_major_event_for_day().map(|e| e.key().to_string()),
        Some("final_exam".to_string())
    );
}

#[test]
fn test_generic_selection_when_no_anchor_candidate() {
    let engine = engine_on_day(vec![def("concert", EventCategory::Major, 1.0)], 3, 36);
    assert_eq!(
        engine.pick_major_event_for_day().map(|e| e.key().to_string()),
        Some("concert".to_string())
    );
}

#[test]
fn test_major_only_once_per_day() {
    let mut engine = engine_on_day(
        vec![
            def("a", EventCategory::Major, 1.0),
            def("b", EventCategory::Major, 1.0),
        ],
        5,
        1,
    );

    assert!(engine.try_queue_major_for_current_day().is_some());
    engine.apply_current_choice(0);
    assert!(engine.try_queue_major_for_current_day().is_none());
    assert_eq!(engine.scheduler().major_queued_day(), Some(1));
}
