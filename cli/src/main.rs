use std::collections::BTreeMap;
use std::env;
use std::fs;

use anyhow::{bail, Context, Result};
use campus_narrative_core_rs::orchestrator::{compute_catalog_hash, Collaborators, DayEndOutcome};
use campus_narrative_core_rs::{EngineConfig, EventCatalog, EventEngine, LifecycleEvent};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Upper bound on auto-player actions per simulated day
const MAX_ACTIONS_PER_DAY: u32 = 64;

fn print_usage() {
    println!("campus-narrative <command>");
    println!("commands:");
    println!("  simulate <catalog.json> <seed> [days]");
    println!("    auto-plays the first available choice until the target day (default 30)");
    println!("  preview <catalog.json> <seed>");
    println!("    prints the day-1 minor and major picks without changing anything");
    println!("  inspect <catalog.json>");
    println!("    prints catalog statistics and fingerprint");
}

fn parse_seed(value: Option<&String>) -> Result<u64> {
    let raw = value.context("missing seed")?;
    raw.parse::<u64>()
        .with_context(|| format!("invalid seed: {raw}"))
}

fn load_catalog(value: Option<&String>) -> Result<EventCatalog> {
    let path = value.context("missing catalog path")?;
    let json = fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    EventCatalog::from_json_str(&json).with_context(|| format!("failed to load catalog {path}"))
}

fn build_engine(catalog: EventCatalog, seed: u64) -> Result<EventEngine> {
    let mut config = EngineConfig::default();
    config.scheduler.rng_seed = seed;
    let collaborators = Collaborators::in_memory(&config);
    Ok(EventEngine::new(config, catalog, collaborators)?)
}

fn run_simulation(args: &[String]) -> Result<()> {
    let catalog = load_catalog(args.get(2))?;
    let seed = parse_seed(args.get(3))?;
    let days = args
        .get(4)
        .map(|value| {
            value
                .parse::<u32>()
                .with_context(|| format!("invalid days: {value}"))
        })
        .transpose()?
        .unwrap_or(30);

    let mut engine = build_engine(catalog, seed)?;
    engine.force_evaluate();

    let budget = MAX_ACTIONS_PER_DAY.saturating_mul(days.max(1));
    let mut actions = 0;
    while engine.clock().current_day() <= days {
        actions += 1;
        if actions > budget {
            bail!("auto-player exceeded {budget} actions; aborting");
        }

        if let Some(event) = engine.current_event().cloned() {
            let Some(index) = engine.available_choices().first().map(|c| c.index) else {
                warn!(event = %event.key(), "active event has no available choice; stopping");
                break;
            };
            engine.apply_choice(&event, index);
            continue;
        }

        if engine.request_day_end() == DayEndOutcome::Blocked {
            bail!("day end blocked with no active event");
        }
    }

    print_summary(&engine, seed);
    Ok(())
}

fn print_summary(engine: &EventEngine, seed: u64) {
    let mut started: BTreeMap<String, usize> = BTreeMap::new();
    let mut completed: BTreeMap<String, usize> = BTreeMap::new();
    for entry in engine.event_log().entries() {
        match entry {
            LifecycleEvent::EventStarted { event, .. } => {
                *started.entry(event.category().to_string()).or_default() += 1;
            }
            LifecycleEvent::EventCompleted { event, .. } => {
                *completed.entry(event.category().to_string()).or_default() += 1;
            }
            _ => {}
        }
    }

    println!(
        "simulated seed={} day={} hour={:02}:00 notifications={}",
        seed,
        engine.clock().current_day(),
        engine.clock().current_hour(),
        engine.event_log().len()
    );
    for (category, count) in &started {
        println!(
            "  {category}: started={count} completed={}",
            completed.get(category).copied().unwrap_or(0)
        );
    }

    let messages = engine.event_log().messages();
    println!("messages ({}):", messages.len());
    for message in messages.iter().rev().take(10).rev() {
        println!("  {message}");
    }
}

fn run_preview(args: &[String]) -> Result<()> {
    let catalog = load_catalog(args.get(2))?;
    let seed = parse_seed(args.get(3))?;
    let engine = build_engine(catalog, seed)?;

    let minor = engine.pick_minor_event_for_day();
    let major = engine.pick_major_event_for_day();
    println!(
        "day {} minor={} major={}",
        engine.clock().current_day(),
        minor.as_ref().map(|e| e.key()).unwrap_or("-"),
        major.as_ref().map(|e| e.key()).unwrap_or("-")
    );
    Ok(())
}

fn run_inspect(args: &[String]) -> Result<()> {
    let catalog = load_catalog(args.get(2))?;
    let fingerprint = compute_catalog_hash(&catalog)?;

    println!(
        "events={} minor={} major={}",
        catalog.len(),
        catalog.minor_pool().len(),
        catalog.major_pool().len()
    );
    let unreachable: Vec<&str> = catalog
        .events()
        .iter()
        .filter(|e| e.choices().is_empty())
        .map(|e| e.key())
        .collect();
    if !unreachable.is_empty() {
        println!("events without choices: {}", unreachable.join(", "));
    }
    println!("fingerprint={fingerprint}");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("simulate") => run_simulation(&args),
        Some("preview") => run_preview(&args),
        Some("inspect") => run_inspect(&args),
        _ => {
            print_usage();
            Ok(())
        }
    }
}
