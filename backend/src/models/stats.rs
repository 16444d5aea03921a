//! Player resources as seen by the narrative engine
//!
//! The engine reads stats to evaluate choice conditions and stat-band tags,
//! and writes them only by applying a choice's resource effects. The real
//! stat model (modifiers, decay, economy) lives with the host; `StatSheet` is
//! the minimal clamped store used by tests and headless harnesses.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resources an event can read or change
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Money,
    Energy,
    Mental,
    Academic,
}

impl StatKind {
    pub const ALL: [StatKind; 4] = [
        StatKind::Money,
        StatKind::Energy,
        StatKind::Mental,
        StatKind::Academic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StatKind::Money => "money",
            StatKind::Energy => "energy",
            StatKind::Mental => "mental",
            StatKind::Academic => "academic",
        }
    }

    /// Inclusive clamp range, `None` for unbounded stats
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self {
            StatKind::Money => None,
            StatKind::Energy | StatKind::Mental | StatKind::Academic => Some((0.0, 100.0)),
        }
    }
}

/// Numeric stat store consumed by the engine
pub trait StatStore {
    fn stat(&self, kind: StatKind) -> f64;

    /// Apply a signed change; the store owns clamping
    fn apply_delta(&mut self, kind: StatKind, delta: f64);
}

/// In-memory stat store with per-stat clamping
///
/// # Example
/// ```
/// use campus_narrative_core_rs::models::{StatKind, StatSheet, StatStore};
///
/// let mut stats = StatSheet::new();
/// stats.set(StatKind::Energy, 95.0);
/// stats.apply_delta(StatKind::Energy, 20.0);
/// assert_eq!(stats.stat(StatKind::Energy), 100.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSheet {
    values: BTreeMap<StatKind, f64>,
}

impl StatSheet {
    /// Fresh sheet: 100 money, 50 in every bounded stat
    pub fn new() -> Self {
        let values = StatKind::ALL
            .iter()
            .map(|kind| {
                let start = match kind {
                    StatKind::Money => 100.0,
                    _ => 50.0,
                };
                (*kind, start)
            })
            .collect();
        Self { values }
    }

    pub fn with(mut self, kind: StatKind, value: f64) -> Self {
        self.set(kind, value);
        self
    }

    /// Overwrite a stat, clamped to its bounds
    pub fn set(&mut self, kind: StatKind, value: f64) {
        self.values.insert(kind, clamp_stat(kind, value));
    }
}

impl Default for StatSheet {
    fn default() -> Self {
        Self::new()
    }
}

impl StatStore for StatSheet {
    fn stat(&self, kind: StatKind) -> f64 {
        self.values.get(&kind).copied().unwrap_or(0.0)
    }

    fn apply_delta(&mut self, kind: StatKind, delta: f64) {
        let next = self.stat(kind) + delta;
        self.set(kind, next);
    }
}

fn clamp_stat(kind: StatKind, value: f64) -> f64 {
    match kind.bounds() {
        Some((min, max)) => value.clamp(min, max),
        None => value,
    }
}
