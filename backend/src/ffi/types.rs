//! Type conversion utilities for FFI boundary
//!
//! Converts between Rust commission types and Python dicts.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::models::{CommissionResult, CommissionRule, CommissionRuleInput};
use crate::resolver::CommissionError;

// ========================================================================
// PyDict Extraction Helpers
// ========================================================================

/// Extract a required field from a Python dict with clear error messages.
///
/// # Errors
/// Returns PyValueError if the field is missing; propagates the conversion
/// error if the value has the wrong type.
fn extract_required<'py, T>(dict: &Bound<'py, PyDict>, key: &str) -> PyResult<T>
where
    T: FromPyObject<'py>,
{
    dict.get_item(key)?
        .ok_or_else(|| PyValueError::new_err(format!("Missing required field '{}'", key)))?
        .extract()
}

/// Extract an optional field from a Python dict.
///
/// A missing key and an explicit `None` both yield `None`.
fn extract_optional<'py, T>(dict: &Bound<'py, PyDict>, key: &str) -> PyResult<Option<T>>
where
    T: FromPyObject<'py>,
{
    match dict.get_item(key)? {
        Some(value) if !value.is_none() => Ok(Some(value.extract()?)),
        _ => Ok(None),
    }
}

/// Extract a field with a default value if missing.
fn extract_with_default<'py, T>(dict: &Bound<'py, PyDict>, key: &str, default: T) -> PyResult<T>
where
    T: FromPyObject<'py>,
{
    match dict.get_item(key)? {
        Some(value) => value.extract(),
        None => Ok(default),
    }
}

// ========================================================================
// Parsers
// ========================================================================

/// Convert a Python dict into a validated CommissionRule
///
/// # Errors
/// Raises ValueError if required fields are missing or the rule violates
/// its invariants.
pub fn parse_rule(py_rule: &Bound<'_, PyDict>) -> PyResult<CommissionRule> {
    let record = CommissionRuleInput {
        id: extract_optional(py_rule, "id")?,
        min_distance: extract_required(py_rule, "min_distance")?,
        max_distance: extract_optional(py_rule, "max_distance")?,
        commission_per_km: extract_required(py_rule, "commission_per_km")?,
        base_payout: extract_with_default(py_rule, "base_payout", 0.0)?,
        active: extract_with_default(py_rule, "active", true)?,
    };

    CommissionRule::try_from(record).map_err(|e| PyValueError::new_err(e.to_string()))
}

pub fn parse_rules(py_rules: &[Bound<'_, PyDict>]) -> PyResult<Vec<CommissionRule>> {
    py_rules.iter().map(parse_rule).collect()
}

// ========================================================================
// Converters
// ========================================================================

pub fn rule_to_py<'py>(py: Python<'py>, rule: &CommissionRule) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("id", rule.id())?;
    dict.set_item("min_distance", rule.min_distance())?;
    dict.set_item("max_distance", rule.max_distance())?;
    dict.set_item("commission_per_km", rule.commission_per_km())?;
    dict.set_item("base_payout", rule.base_payout())?;
    dict.set_item("active", rule.is_active())?;
    Ok(dict)
}

pub fn result_to_py<'py>(
    py: Python<'py>,
    result: &CommissionResult,
) -> PyResult<Bound<'py, PyDict>> {
    let breakdown = PyDict::new_bound(py);
    breakdown.set_item("base_payout", result.breakdown.base_payout)?;
    breakdown.set_item("distance", result.breakdown.distance)?;
    breakdown.set_item("commission_per_km", result.breakdown.commission_per_km)?;
    breakdown.set_item("distance_component", result.breakdown.distance_component)?;

    let dict = PyDict::new_bound(py);
    dict.set_item("rule", rule_to_py(py, &result.rule)?)?;
    dict.set_item("total_payout", result.total_payout)?;
    dict.set_item("total_payout_cents", result.total_payout_cents())?;
    dict.set_item("resolution", result.resolution.as_str())?;
    dict.set_item("breakdown", breakdown)?;
    Ok(dict)
}

/// Map resolver errors onto Python exceptions
///
/// Bad input is the caller's fault (ValueError); a missing rule set is a
/// deployment problem (RuntimeError).
pub fn commission_error_to_py(err: CommissionError) -> PyErr {
    match err {
        CommissionError::InvalidInput { .. } | CommissionError::PayoutOutOfRange { .. } => {
            PyValueError::new_err(err.to_string())
        }
        CommissionError::NoRulesConfigured => PyRuntimeError::new_err(err.to_string()),
    }
}
