//! Event catalog: the immutable set of definitions for one run
//!
//! # Critical Invariants
//!
//! - Ids are unique after trimming and case-folding
//! - The minor and major pools preserve authoring order (weighted selection
//!   scans left to right, so order is part of the selection contract)
//! - Nothing is added or removed after construction

use crate::models::definition::{EventCategory, EventDefinition};
use crate::models::flags::normalize_key;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while building a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Duplicate event id: {0}")]
    DuplicateId(String),

    #[error("Catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read-only collection of event definitions with an id index
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    events: Vec<Arc<EventDefinition>>,
    by_key: HashMap<String, Arc<EventDefinition>>,
    minor_pool: Vec<Arc<EventDefinition>>,
    major_pool: Vec<Arc<EventDefinition>>,
}

/// Accepted JSON layouts: a bare array or `{ "events": [...] }`
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Events(Vec<EventDefinition>),
    Wrapped { events: Vec<EventDefinition> },
}

impl EventCatalog {
    /// Build a catalog, rejecting duplicate ids
    ///
    /// Definitions with a blank id are kept in their pool but are not
    /// reachable by id.
    pub fn new(definitions: Vec<EventDefinition>) -> Result<Self, CatalogError> {
        let mut catalog = EventCatalog::default();

        for definition in definitions {
            let definition = Arc::new(definition);

            if !definition.has_fallback_key() {
                let key = definition.key().to_string();
                if catalog.by_key.contains_key(&key) {
                    return Err(CatalogError::DuplicateId(definition.id().to_string()));
                }
                catalog.by_key.insert(key, Arc::clone(&definition));
            }

            match definition.category() {
                EventCategory::Minor => catalog.minor_pool.push(Arc::clone(&definition)),
                EventCategory::Major => catalog.major_pool.push(Arc::clone(&definition)),
            }
            catalog.events.push(definition);
        }

        Ok(catalog)
    }

    /// Parse a catalog from JSON
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let definitions = match serde_json::from_str::<CatalogDocument>(json)? {
            CatalogDocument::Events(events) => events,
            CatalogDocument::Wrapped { events } => events,
        };
        Self::new(definitions)
    }

    /// Look up a definition by id (case-insensitive, trimmed)
    pub fn get(&self, id: &str) -> Option<&Arc<EventDefinition>> {
        self.by_key.get(&normalize_key(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All definitions in authoring order
    pub fn events(&self) -> &[Arc<EventDefinition>] {
        &self.events
    }

    pub fn minor_pool(&self) -> &[Arc<EventDefinition>] {
        &self.minor_pool
    }

    pub fn major_pool(&self) -> &[Arc<EventDefinition>] {
        &self.major_pool
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
