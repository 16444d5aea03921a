//! Domain models for the narrative engine

pub mod catalog;
pub mod definition;
pub mod flags;
pub mod notification;
pub mod stats;
pub mod tags;

// Re-exports
pub use catalog::{CatalogError, EventCatalog};
pub use definition::{
    Choice, ChoiceBuilder, ChoiceCondition, Comparator, EventCategory, EventDefinition,
    EventDefinitionBuilder, FlagMutation, ResourceEffect,
};
pub use flags::{normalize_key, FlagBook, FlagStore, FlagValue};
pub use notification::{EventLog, LifecycleEvent};
pub use stats::{StatKind, StatSheet, StatStore};
pub use tags::{ContextTag, UnknownTag};
