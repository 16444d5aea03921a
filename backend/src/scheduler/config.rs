//! Scheduler configuration
//!
//! All fields have defaults, so a config file only needs to name what it
//! changes:
//!
//! ```json
//! { "rng_seed": 7, "default_cooldown_hours": 48, "category_cooldown_hours": { "Major": 168 } }
//! ```

use crate::models::definition::{EventCategory, EventDefinition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tunables for candidate selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seed for weighted selection
    pub rng_seed: u64,

    /// Cooldown when neither the event nor its category sets one
    pub default_cooldown_hours: u32,

    /// Per-category cooldown overrides
    pub category_cooldown_hours: BTreeMap<EventCategory, u32>,

    /// Flag keys and stat bands behind the context tags
    pub thresholds: TagThresholds,

    /// Tokens that mark a major as an exam beat
    pub exam_tokens: Vec<String>,

    /// Tokens that mark a major as an inflation beat
    pub inflation_tokens: Vec<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            rng_seed: 42,
            default_cooldown_hours: 72,
            category_cooldown_hours: BTreeMap::new(),
            thresholds: TagThresholds::default(),
            exam_tokens: vec!["exam".to_string(), "vize".to_string(), "final".to_string()],
            inflation_tokens: vec!["inflation".to_string(), "enflasyon".to_string()],
        }
    }
}

impl SchedulerConfig {
    /// Most specific cooldown wins: event, then category, then default
    pub fn cooldown_hours_for(&self, event: &EventDefinition) -> u32 {
        event
            .cooldown_hours()
            .or_else(|| self.category_cooldown_hours.get(&event.category()).copied())
            .unwrap_or(self.default_cooldown_hours)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.exam_tokens.iter().any(|t| !t.trim().is_empty()) {
            return Err("exam_tokens must contain at least one non-blank token".to_string());
        }
        if !self.inflation_tokens.iter().any(|t| !t.trim().is_empty()) {
            return Err("inflation_tokens must contain at least one non-blank token".to_string());
        }
        self.thresholds.validate()
    }
}

/// Numeric flag gate: `flags[key] >= min`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagThreshold {
    pub key: String,
    pub min: f64,
}

impl FlagThreshold {
    fn new(key: &str, min: f64) -> Self {
        Self {
            key: key.to_string(),
            min,
        }
    }
}

/// Low/high band on one stat: low is `< low_below`, high is `>= high_at_least`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatBand {
    pub low_below: f64,
    pub high_at_least: f64,
}

impl StatBand {
    fn new(low_below: f64, high_at_least: f64) -> Self {
        Self {
            low_below,
            high_at_least,
        }
    }

    pub fn is_low(&self, value: f64) -> bool {
        value < self.low_below
    }

    pub fn is_high(&self, value: f64) -> bool {
        value >= self.high_at_least
    }
}

/// Everything the context tags compare against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagThresholds {
    pub debt_pressure: FlagThreshold,
    pub work_strain: FlagThreshold,
    pub burnout: FlagThreshold,
    pub kyk_risk_days: FlagThreshold,
    pub illegal_fine_pending: FlagThreshold,
    pub kyk_status_key: String,
    pub money: StatBand,
    pub mental: StatBand,
    pub energy: StatBand,
    pub academic: StatBand,
}

impl Default for TagThresholds {
    fn default() -> Self {
        Self {
            debt_pressure: FlagThreshold::new("debt_pressure", 1.0),
            work_strain: FlagThreshold::new("work_strain", 1.0),
            burnout: FlagThreshold::new("burnout", 1.0),
            kyk_risk_days: FlagThreshold::new("kyk_risk_days", 1.0),
            illegal_fine_pending: FlagThreshold::new("illegal_fine_pending", 1.0),
            kyk_status_key: "kyk_status".to_string(),
            money: StatBand::new(20.0, 250.0),
            mental: StatBand::new(30.0, 70.0),
            energy: StatBand::new(30.0, 70.0),
            academic: StatBand::new(40.0, 75.0),
        }
    }
}

impl TagThresholds {
    pub fn validate(&self) -> Result<(), String> {
        let flags = [
            &self.debt_pressure,
            &self.work_strain,
            &self.burnout,
            &self.kyk_risk_days,
            &self.illegal_fine_pending,
        ];
        for flag in flags {
            if flag.key.trim().is_empty() {
                return Err("flag threshold keys must not be blank".to_string());
            }
            if !flag.min.is_finite() {
                return Err(format!("threshold for '{}' must be finite", flag.key));
            }
        }
        if self.kyk_status_key.trim().is_empty() {
            return Err("kyk_status_key must not be blank".to_string());
        }

        let bands = [
            ("money", self.money),
            ("mental", self.mental),
            ("energy", self.energy),
            ("academic", self.academic),
        ];
        for (name, band) in bands {
            if !band.low_below.is_finite() || !band.high_at_least.is_finite() {
                return Err(format!("{} band must be finite", name));
            }
            if band.low_below > band.high_at_least {
                return Err(format!(
                    "{} band overlaps: low below {} but high from {}",
                    name, band.low_below, band.high_at_least
                ));
            }
        }
        Ok(())
    }
}
