//! PyO3 wrapper for EventEngine
//!
//! # Example (from Python)
//!
//! ```python
//! from campus_narrative_core_rs import EventEngine
//!
//! engine = EventEngine(open("catalog.json").read(), '{"scheduler": {"rng_seed": 7}}')
//! engine.force_evaluate()
//! while engine.current_event_id() is not None:
//!     choices = engine.available_choices()
//!     engine.apply_choice(choices[0]["index"])
//! print(engine.request_day_end())
//! ```

use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use super::types::{
    choices_to_py, day_end_to_py, engine_err, outcome_to_py, parse_stat, restore_report_to_py,
};
use crate::orchestrator::{EngineCheckpoint, EventEngine as RustEventEngine};

/// Python wrapper for the Rust event engine
///
/// Built over the in-memory clock, stat sheet and flag book.
#[pyclass(unsendable, name = "EventEngine")]
pub struct PyEventEngine {
    inner: RustEventEngine,
}

#[pymethods]
impl PyEventEngine {
    /// Create an engine from a JSON catalog and optional JSON config
    ///
    /// Raises ValueError for an invalid catalog or config.
    #[new]
    #[pyo3(signature = (catalog_json, config_json=None))]
    fn new(catalog_json: &str, config_json: Option<&str>) -> PyResult<Self> {
        let inner = RustEventEngine::from_json(catalog_json, config_json).map_err(engine_err)?;
        Ok(Self { inner })
    }

    fn current_day(&self) -> u32 {
        self.inner.clock().current_day()
    }

    fn current_hour(&self) -> u32 {
        self.inner.clock().current_hour()
    }

    fn current_event_id(&self) -> Option<String> {
        self.inner.current_event().map(|e| e.key().to_string())
    }

    fn pending_event_ids(&self) -> Vec<String> {
        self.inner.pending_event_ids()
    }

    /// List of `{"index", "text", "time_cost_hours"}` for the active event
    fn available_choices<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyList>> {
        choices_to_py(py, &self.inner.available_choices())
    }

    fn apply_choice<'py>(&mut self, py: Python<'py>, index: usize) -> PyResult<Bound<'py, PyDict>> {
        let outcome = self.inner.apply_current_choice(index);
        outcome_to_py(py, &outcome)
    }

    /// `{"status": "blocked" | "major_queued" | "advanced", ...}`
    fn request_day_end<'py>(&mut self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let outcome = self.inner.request_day_end();
        day_end_to_py(py, &outcome)
    }

    fn force_evaluate(&mut self) {
        self.inner.force_evaluate();
    }

    fn advance_hours(&mut self, hours: u32) -> Vec<u32> {
        self.inner.advance_hours(hours)
    }

    fn get_stat(&self, name: &str) -> PyResult<Option<f64>> {
        let kind = parse_stat(name)?;
        Ok(self.inner.stats().map(|stats| stats.stat(kind)))
    }

    /// Set a stat to an absolute value (applied as a delta, so bounds hold)
    fn set_stat(&mut self, name: &str, value: f64) -> PyResult<()> {
        let kind = parse_stat(name)?;
        if let Some(stats) = self.inner.stats_mut() {
            let current = stats.stat(kind);
            stats.apply_delta(kind, value - current);
        }
        Ok(())
    }

    fn set_flag(&mut self, key: &str, value: f64) {
        if let Some(flags) = self.inner.flags_mut() {
            flags.set_numeric(key, value);
        }
    }

    fn set_text_flag(&mut self, key: &str, value: &str) {
        if let Some(flags) = self.inner.flags_mut() {
            flags.set_text(key, value);
        }
    }

    fn messages(&self) -> Vec<String> {
        self.inner
            .event_log()
            .messages()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn save_checkpoint(&self) -> PyResult<String> {
        let checkpoint = self.inner.checkpoint().map_err(engine_err)?;
        checkpoint.to_json().map_err(engine_err)
    }

    /// Returns `{"dropped_event_ids": [...], "catalog_changed": bool}`
    fn load_checkpoint<'py>(&mut self, py: Python<'py>, json: &str) -> PyResult<Bound<'py, PyDict>> {
        let checkpoint = EngineCheckpoint::from_json(json).map_err(engine_err)?;
        let report = self
            .inner
            .load_checkpoint(&checkpoint)
            .map_err(|e| PyRuntimeError::new_err(format!("checkpoint restore failed: {}", e)))?;
        restore_report_to_py(py, &report)
    }
}
