//! Type conversion utilities for the FFI boundary

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::lifecycle::{AvailableChoice, ChoiceOutcome};
use crate::models::stats::StatKind;
use crate::orchestrator::{DayEndOutcome, EngineError, RestoreReport};

/// Map engine errors onto Python exceptions
pub fn engine_err(err: EngineError) -> PyErr {
    match err {
        EngineError::InvalidConfig(_) | EngineError::Catalog(_) => {
            PyValueError::new_err(err.to_string())
        }
        EngineError::Serialization(_) => PyRuntimeError::new_err(err.to_string()),
    }
}

/// Parse a stat name such as `"money"` (case-insensitive)
pub fn parse_stat(name: &str) -> PyResult<StatKind> {
    let wanted = name.trim().to_lowercase();
    StatKind::ALL
        .iter()
        .copied()
        .find(|kind| kind.name() == wanted)
        .ok_or_else(|| PyValueError::new_err(format!("unknown stat '{}'", name)))
}

pub fn choices_to_py<'py>(
    py: Python<'py>,
    choices: &[AvailableChoice<'_>],
) -> PyResult<Bound<'py, PyList>> {
    let list = PyList::empty_bound(py);
    for available in choices {
        let dict = PyDict::new_bound(py);
        dict.set_item("index", available.index)?;
        dict.set_item("text", available.choice.text())?;
        dict.set_item("time_cost_hours", available.choice.time_cost_hours())?;
        list.append(dict)?;
    }
    Ok(list)
}

pub fn outcome_to_py<'py>(py: Python<'py>, outcome: &ChoiceOutcome) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("applied", outcome.applied)?;
    dict.set_item("message", &outcome.message)?;
    dict.set_item("days_entered", outcome.days_entered.clone())?;
    Ok(dict)
}

pub fn day_end_to_py<'py>(py: Python<'py>, outcome: &DayEndOutcome) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    match outcome {
        DayEndOutcome::Blocked => {
            dict.set_item("status", "blocked")?;
        }
        DayEndOutcome::MajorQueued(event) => {
            dict.set_item("status", "major_queued")?;
            dict.set_item("event_id", event.key())?;
        }
        DayEndOutcome::Advanced { day } => {
            dict.set_item("status", "advanced")?;
            dict.set_item("day", *day)?;
        }
    }
    Ok(dict)
}

pub fn restore_report_to_py<'py>(
    py: Python<'py>,
    report: &RestoreReport,
) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("dropped_event_ids", report.dropped_event_ids.clone())?;
    dict.set_item("catalog_changed", report.catalog_changed)?;
    Ok(dict)
}
