//! Python bindings (feature `pyo3`)
//!
//! Thin wrapper so simulation harnesses can drive the engine headlessly.

pub mod engine;
mod types;
