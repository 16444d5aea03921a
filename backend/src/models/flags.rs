//! Flag store: numeric counters and text tags set by choices and by the
//! host's subsystems (economy, KYK, work), read by tag eligibility.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key/value store of numeric and text flags
///
/// Keys are compared trimmed and case-folded by every implementation.
pub trait FlagStore {
    fn numeric(&self, key: &str) -> Option<f64>;
    fn text(&self, key: &str) -> Option<String>;
    fn set_numeric(&mut self, key: &str, value: f64);
    fn set_text(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);

    /// Add to a numeric flag, treating a missing flag as 0
    fn add_numeric(&mut self, key: &str, delta: f64) {
        let current = self.numeric(key).unwrap_or(0.0);
        self.set_numeric(key, current + delta);
    }
}

/// Stored flag value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Numeric(f64),
    Text(String),
}

/// In-memory [`FlagStore`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagBook {
    flags: BTreeMap<String, FlagValue>,
}

impl FlagBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlagValue)> {
        self.flags.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FlagStore for FlagBook {
    fn numeric(&self, key: &str) -> Option<f64> {
        match self.flags.get(&normalize_key(key))? {
            FlagValue::Numeric(value) => Some(*value),
            FlagValue::Text(_) => None,
        }
    }

    fn text(&self, key: &str) -> Option<String> {
        match self.flags.get(&normalize_key(key))? {
            FlagValue::Text(value) => Some(value.clone()),
            FlagValue::Numeric(_) => None,
        }
    }

    fn set_numeric(&mut self, key: &str, value: f64) {
        let key = normalize_key(key);
        if !key.is_empty() {
            self.flags.insert(key, FlagValue::Numeric(value));
        }
    }

    fn set_text(&mut self, key: &str, value: &str) {
        let key = normalize_key(key);
        if !key.is_empty() {
            self.flags.insert(key, FlagValue::Text(value.to_string()));
        }
    }

    fn remove(&mut self, key: &str) {
        self.flags.remove(&normalize_key(key));
    }
}

/// Trim and case-fold a lookup key
///
/// Shared by flags, event ids, and follow-up ids.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}
