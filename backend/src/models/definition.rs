//! Event and choice definitions
//!
//! Definitions are immutable values. They are built once (from catalog JSON
//! or with the builders below) and shared behind `Arc` for the rest of the
//! run. Nothing in the engine mutates a definition.
//!
//! # Keys
//!
//! Every definition has a key: its trimmed, case-folded id. A definition
//! with a blank id gets a synthesized key (`anon:<uuid>`) that is stable for
//! that instance and never matches any follow-up id or catalog lookup.

use crate::models::flags::{normalize_key, FlagStore};
use crate::models::stats::{StatKind, StatStore};
use crate::models::tags::ContextTag;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;
use uuid::Uuid;

/// Minor events fill ordinary days; majors are story beats forced at day end
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    Minor,
    Major,
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventCategory::Minor => f.write_str("Minor"),
            EventCategory::Major => f.write_str("Major"),
        }
    }
}

/// Float comparison used by choice conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = "<", alias = "less_than")]
    LessThan,
    #[serde(rename = "<=", alias = "less_or_equal")]
    LessOrEqual,
    #[serde(rename = ">", alias = "greater_than")]
    GreaterThan,
    #[serde(rename = ">=", alias = "greater_or_equal")]
    GreaterOrEqual,
    #[serde(rename = "==", alias = "equal")]
    Equal,
    #[serde(rename = "!=", alias = "not_equal")]
    NotEqual,
}

const FLOAT_EPSILON: f64 = 1e-9;

impl Comparator {
    pub fn compare(&self, left: f64, right: f64) -> bool {
        match self {
            Comparator::LessThan => left < right,
            Comparator::LessOrEqual => left <= right,
            Comparator::GreaterThan => left > right,
            Comparator::GreaterOrEqual => left >= right,
            Comparator::Equal => (left - right).abs() < FLOAT_EPSILON,
            Comparator::NotEqual => (left - right).abs() >= FLOAT_EPSILON,
        }
    }
}

/// Gate on a choice: `stat <comparator> threshold`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceCondition {
    pub stat: StatKind,
    pub comparator: Comparator,
    pub threshold: f64,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl ChoiceCondition {
    pub fn new(stat: StatKind, comparator: Comparator, threshold: f64) -> Self {
        Self {
            stat,
            comparator,
            threshold,
            enabled: true,
        }
    }

    /// Evaluate against the current stats
    ///
    /// A disabled condition always holds. An enabled one cannot be answered
    /// without a stat store and fails closed.
    pub fn is_met(&self, stats: Option<&dyn StatStore>) -> bool {
        if !self.enabled {
            return true;
        }
        match stats {
            Some(stats) => self.comparator.compare(stats.stat(self.stat), self.threshold),
            None => false,
        }
    }
}

/// Signed change to one stat
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceEffect {
    pub stat: StatKind,
    pub delta: f64,
}

/// Change to the flag store carried by a choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FlagMutation {
    SetNumeric { key: String, value: f64 },
    AddNumeric { key: String, delta: f64 },
    SetText { key: String, value: String },
    Clear { key: String },
}

impl FlagMutation {
    pub fn apply(&self, flags: &mut dyn FlagStore) {
        match self {
            FlagMutation::SetNumeric { key, value } => flags.set_numeric(key, *value),
            FlagMutation::AddNumeric { key, delta } => flags.add_numeric(key, *delta),
            FlagMutation::SetText { key, value } => flags.set_text(key, value),
            FlagMutation::Clear { key } => flags.remove(key),
        }
    }
}

// ============================================================================
// Choice
// ============================================================================

/// One option the player can pick on an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    text: String,
    #[serde(default)]
    effects: Vec<ResourceEffect>,
    #[serde(default)]
    condition: Option<ChoiceCondition>,
    #[serde(default)]
    time_cost_hours: u32,
    #[serde(default)]
    follow_up_ids: Vec<String>,
    #[serde(default)]
    follow_up_delay_days: u32,
    #[serde(default)]
    flag_mutations: Vec<FlagMutation>,
}

impl Choice {
    pub fn builder(text: impl Into<String>) -> ChoiceBuilder {
        ChoiceBuilder {
            choice: Choice {
                text: text.into(),
                effects: Vec::new(),
                condition: None,
                time_cost_hours: 0,
                follow_up_ids: Vec::new(),
                follow_up_delay_days: 0,
                flag_mutations: Vec::new(),
            },
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn effects(&self) -> &[ResourceEffect] {
        &self.effects
    }

    pub fn condition(&self) -> Option<&ChoiceCondition> {
        self.condition.as_ref()
    }

    pub fn time_cost_hours(&self) -> u32 {
        self.time_cost_hours
    }

    pub fn follow_up_ids(&self) -> &[String] {
        &self.follow_up_ids
    }

    pub fn follow_up_delay_days(&self) -> u32 {
        self.follow_up_delay_days
    }

    pub fn flag_mutations(&self) -> &[FlagMutation] {
        &self.flag_mutations
    }

    /// True when the condition is absent, disabled, or currently holds
    pub fn is_available(&self, stats: Option<&dyn StatStore>) -> bool {
        self.condition
            .as_ref()
            .map_or(true, |condition| condition.is_met(stats))
    }
}

/// Builder for [`Choice`]
#[derive(Debug, Clone)]
pub struct ChoiceBuilder {
    choice: Choice,
}

impl ChoiceBuilder {
    pub fn effect(mut self, stat: StatKind, delta: f64) -> Self {
        self.choice.effects.push(ResourceEffect { stat, delta });
        self
    }

    pub fn condition(mut self, stat: StatKind, comparator: Comparator, threshold: f64) -> Self {
        self.choice.condition = Some(ChoiceCondition::new(stat, comparator, threshold));
        self
    }

    pub fn time_cost_hours(mut self, hours: u32) -> Self {
        self.choice.time_cost_hours = hours;
        self
    }

    pub fn follow_up(mut self, id: impl Into<String>) -> Self {
        self.choice.follow_up_ids.push(id.into());
        self
    }

    pub fn follow_up_delay_days(mut self, days: u32) -> Self {
        self.choice.follow_up_delay_days = days;
        self
    }

    pub fn flag(mut self, mutation: FlagMutation) -> Self {
        self.choice.flag_mutations.push(mutation);
        self
    }

    pub fn build(self) -> Choice {
        self.choice
    }
}

// ============================================================================
// EventDefinition
// ============================================================================

/// Immutable catalog entry
///
/// # Example
/// ```
/// use campus_narrative_core_rs::models::{Choice, EventCategory, EventDefinition};
///
/// let event = EventDefinition::builder("  Midterm_Panic ", EventCategory::Major)
///     .title("Midterm panic")
///     .weight(2.0)
///     .choice(Choice::builder("Study all night").build())
///     .build();
///
/// assert_eq!(event.key(), "midterm_panic");
/// assert_eq!(event.choices().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EventDefinitionRecord")]
pub struct EventDefinition {
    id: String,
    title: String,
    description: String,
    category: EventCategory,
    weight: f64,
    required_tags: Vec<ContextTag>,
    choices: Vec<Choice>,
    follow_up_ids: Vec<String>,
    follow_up_delay_days: u32,
    cooldown_hours: Option<u32>,
    #[serde(skip)]
    key: String,
}

impl EventDefinition {
    pub fn builder(id: impl Into<String>, category: EventCategory) -> EventDefinitionBuilder {
        EventDefinitionBuilder {
            record: EventDefinitionRecord {
                id: id.into(),
                title: String::new(),
                description: String::new(),
                category,
                weight: 1.0,
                required_tags: Vec::new(),
                choices: Vec::new(),
                follow_up_ids: Vec::new(),
                follow_up_delay_days: 0,
                cooldown_hours: None,
            },
        }
    }

    /// Raw id as authored
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Dedup/lookup key (trimmed, case-folded id or synthesized fallback)
    pub fn key(&self) -> &str {
        &self.key
    }

    /// True when the key was synthesized because the id was blank
    pub fn has_fallback_key(&self) -> bool {
        self.id.trim().is_empty()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> EventCategory {
        self.category
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn required_tags(&self) -> &[ContextTag] {
        &self.required_tags
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn follow_up_ids(&self) -> &[String] {
        &self.follow_up_ids
    }

    pub fn follow_up_delay_days(&self) -> u32 {
        self.follow_up_delay_days
    }

    /// Per-event cooldown override
    pub fn cooldown_hours(&self) -> Option<u32> {
        self.cooldown_hours
    }

    /// Case-insensitive token search over id, title and category
    pub fn mentions_any(&self, tokens: &[String]) -> bool {
        let haystack = format!("{} {} {}", self.id, self.title, self.category).to_lowercase();
        tokens
            .iter()
            .map(|token| token.trim().to_lowercase())
            .any(|token| !token.is_empty() && haystack.contains(&token))
    }
}

/// Builder for [`EventDefinition`]
#[derive(Debug, Clone)]
pub struct EventDefinitionBuilder {
    record: EventDefinitionRecord,
}

impl EventDefinitionBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.record.title = title.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.record.description = description.into();
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.record.weight = weight;
        self
    }

    pub fn tag(mut self, tag: ContextTag) -> Self {
        self.record.required_tags.push(tag);
        self
    }

    pub fn choice(mut self, choice: Choice) -> Self {
        self.record.choices.push(choice);
        self
    }

    pub fn follow_up(mut self, id: impl Into<String>) -> Self {
        self.record.follow_up_ids.push(id.into());
        self
    }

    pub fn follow_up_delay_days(mut self, days: u32) -> Self {
        self.record.follow_up_delay_days = days;
        self
    }

    pub fn cooldown_hours(mut self, hours: u32) -> Self {
        self.record.cooldown_hours = Some(hours);
        self
    }

    pub fn build(self) -> EventDefinition {
        EventDefinition::from(self.record)
    }
}

/// Wire shape of a definition; the key is derived, never stored
#[derive(Debug, Clone, Deserialize)]
struct EventDefinitionRecord {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    category: EventCategory,
    #[serde(default = "default_weight")]
    weight: f64,
    #[serde(default)]
    required_tags: Vec<ContextTag>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    follow_up_ids: Vec<String>,
    #[serde(default)]
    follow_up_delay_days: u32,
    #[serde(default)]
    cooldown_hours: Option<u32>,
}

fn default_weight() -> f64 {
    1.0
}

impl From<EventDefinitionRecord> for EventDefinition {
    fn from(record: EventDefinitionRecord) -> Self {
        let mut key = normalize_key(&record.id);
        if key.is_empty() {
            key = format!("anon:{}", Uuid::new_v4());
            warn!(
                title = %record.title,
                fallback_key = %key,
                "event definition has a blank id; using a synthesized key"
            );
        }

        EventDefinition {
            id: record.id,
            title: record.title,
            description: record.description,
            category: record.category,
            weight: record.weight,
            required_tags: record.required_tags,
            choices: record.choices,
            follow_up_ids: record.follow_up_ids,
            follow_up_delay_days: record.follow_up_delay_days,
            cooldown_hours: record.cooldown_hours,
            key,
        }
    }
}
