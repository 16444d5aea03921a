//! Engine Integration Tests
//!
//! Full day cycles through the public facade: minor at day start, major at
//! day end, stat and flag effects, observers and the event log.

use campus_narrative_core_rs::core::{CalendarConfig, GameClock};
use campus_narrative_core_rs::models::{
    Choice, EventCatalog, EventCategory, EventDefinition, FlagMutation, LifecycleEvent, StatKind,
};
use campus_narrative_core_rs::orchestrator::{
    Collaborators, DayEndOutcome, EngineConfig, EngineError, EventEngine,
};
use std::cell::RefCell;
use std::rc::Rc;

fn minor(id: &str) -> EventDefinition {
    EventDefinition::builder(id, EventCategory::Minor)
        .cooldown_hours(0)
        .choice(
            Choice::builder("Take the shift")
                .effect(StatKind::Money, 40.0)
                .effect(StatKind::Energy, -15.0)
                .flag(FlagMutation::AddNumeric {
                    key: "work_strain".to_string(),
                    delta: 1.0,
                })
                .build(),
        )
        .build()
}

fn major(id: &str) -> EventDefinition {
    EventDefinition::builder(id, EventCategory::Major)
        .choice(Choice::builder("Face it").time_cost_hours(2).build())
        .build()
}

fn create_engine(config: EngineConfig, events: Vec<EventDefinition>) -> EventEngine {
    let collaborators = Collaborators::in_memory(&config);
    EventEngine::new(config, EventCatalog::new(events).unwrap(), collaborators).unwrap()
}

#[test]
fn test_full_day_cycle() {
    let mut engine = create_engine(EngineConfig::default(), vec![minor("cafe_shift"), major("rent_due")]);

    engine.force_evaluate();
    assert_eq!(engine.current_event().map(|e| e.key()), Some("cafe_shift"));
    assert_eq!(engine.request_day_end(), DayEndOutcome::Blocked);

    assert!(engine.apply_current_choice(0).applied);
    let stats = engine.stats().unwrap();
    assert_eq!(stats.stat(StatKind::Money), 140.0);
    assert_eq!(stats.stat(StatKind::Energy), 35.0);
    assert_eq!(engine.flags().unwrap().numeric("work_strain"), Some(1.0));

    match engine.request_day_end() {
        DayEndOutcome::MajorQueued(event) => assert_eq!(event.key(), "rent_due"),
        other => panic!("expected a major, got {:?}", other),
    }
    assert_eq!(engine.request_day_end(), DayEndOutcome::Blocked);

    engine.apply_current_choice(0);
    assert_eq!(engine.clock().current_hour(), 10);

    assert_eq!(engine.request_day_end(), DayEndOutcome::Advanced { day: 2 });
    assert_eq!(engine.clock().current_hour(), 8);

    // Day 2 opens with a fresh minor
    assert_eq!(engine.current_event().map(|e| e.key()), Some("cafe_shift"));
    assert_eq!(engine.scheduler().minor_queued_day(), Some(2));
}

#[test]
fn test_day_end_without_forced_major() {
    let config = EngineConfig {
        day_end_forces_major: false,
        ..EngineConfig::default()
    };
    let mut engine = create_engine(config, vec![major("rent_due")]);

    assert_eq!(engine.request_day_end(), DayEndOutcome::Advanced { day: 2 });
    assert!(engine.current_event().is_none());
}

#[test]
fn test_day_end_after_midnight_sleeps_until_start_hour() {
    let config = EngineConfig {
        day_end_forces_major: false,
        ..EngineConfig::default()
    };
    let collaborators = Collaborators::clock_only(GameClock::starting_at(4, 3, CalendarConfig::default()));
    let mut engine = EventEngine::new(config, EventCatalog::default(), collaborators).unwrap();

    assert_eq!(engine.request_day_end(), DayEndOutcome::Advanced { day: 4 });
    assert_eq!(engine.clock().current_hour(), 8);
}

#[test]
fn test_advance_hours_runs_day_change_per_day() {
    let mut engine = create_engine(EngineConfig::default(), vec![minor("cafe_shift")]);

    let entered = engine.advance_hours(24);
    assert_eq!(entered, vec![2]);
    assert_eq!(engine.current_event().map(|e| e.key()), Some("cafe_shift"));
}

#[test]
fn test_observers_and_log_track_the_day() {
    let mut engine = create_engine(EngineConfig::default(), vec![minor("cafe_shift"), major("rent_due")]);
    let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    engine.subscribe(move |note| {
        if let LifecycleEvent::EventStarted { event, .. } = note {
            sink.borrow_mut().push(event.key().to_string());
        }
    });

    engine.force_evaluate();
    engine.apply_current_choice(0);
    engine.request_day_end();
    engine.apply_current_choice(0);
    engine.publish_system_message("The dorm lights flicker.");

    assert_eq!(*seen.borrow(), vec!["cafe_shift", "rent_due"]);
    let log = engine.event_log();
    assert_eq!(log.entries_of_type("EventCompleted").len(), 2);
    assert_eq!(log.entries_on_day(1).len(), log.len());
    assert_eq!(log.messages().last(), Some(&"The dorm lights flicker."));
}

#[test]
fn test_enqueue_by_unknown_id_is_rejected() {
    let mut engine = create_engine(EngineConfig::default(), vec![minor("cafe_shift")]);
    assert!(!engine.enqueue_event_by_id("nope"));
    assert!(engine.event_log().is_empty());
}

#[test]
fn test_available_choices_for_active_event() {
    let mut engine = create_engine(EngineConfig::default(), vec![minor("cafe_shift")]);
    assert!(engine.available_choices().is_empty());

    engine.enqueue_event_by_id("CAFE_SHIFT");
    let choices = engine.available_choices();
    assert_eq!(choices.len(), 1);
    assert_eq!(choices[0].choice.text(), "Take the shift");
}

#[test]
fn test_engine_from_json() {
    let catalog = r#"{"events": [
        {"id": "Rent", "category": "Major", "required_tags": ["money_low"],
         "choices": [{"text": "Pay", "effects": [{"stat": "money", "delta": -50}]}]}
    ]}"#;
    let engine = EventEngine::from_json(catalog, Some(r#"{"scheduler": {"rng_seed": 5}}"#)).unwrap();

    assert_eq!(engine.config().scheduler.rng_seed, 5);
    assert!(engine.event_by_id("rent").is_some());
    // Money 100 is not low
    assert!(engine.pick_major_event_for_day().is_none());
}

#[test]
fn test_invalid_tag_in_catalog_is_an_error() {
    let catalog = r#"[{"id": "x", "category": "Minor", "required_tags": ["full_moon"]}]"#;
    let result = EventEngine::from_json(catalog, None);
    assert!(matches!(result, Err(EngineError::Catalog(_))));
}

#[test]
fn test_duplicate_ids_rejected() {
    let catalog = r#"[{"id": "x", "category": "Minor"}, {"id": " X ", "category": "Major"}]"#;
    assert!(matches!(
        EventEngine::from_json(catalog, None),
        Err(EngineError::Catalog(_))
    ));
}
