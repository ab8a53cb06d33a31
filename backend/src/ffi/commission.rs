//! PyO3 functions for commission resolution
//!
//! # Example (from Python)
//!
//! ```python
//! from delivery_commission_core_rs import calculate_commission
//!
//! rules = [
//!     {"min_distance": 0, "max_distance": 5, "commission_per_km": 2.0, "base_payout": 10},
//!     {"min_distance": 5, "max_distance": None, "commission_per_km": 3.0, "base_payout": 10},
//! ]
//! result = calculate_commission(7.5, rules)
//! print(result["total_payout"], result["rule"]["id"])
//! ```

use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::types::{commission_error_to_py, parse_rules, result_to_py, rule_to_py};
use crate::resolver;

/// Price a trip against a list of rule dicts
///
/// Raises ValueError for a bad distance or malformed rule, RuntimeError when
/// no active rule is configured.
#[pyfunction]
pub fn calculate_commission<'py>(
    py: Python<'py>,
    distance: f64,
    rules: Vec<Bound<'py, PyDict>>,
) -> PyResult<Bound<'py, PyDict>> {
    let rules = parse_rules(&rules)?;
    let result = resolver::calculate_commission(distance, &rules).map_err(commission_error_to_py)?;
    result_to_py(py, &result)
}

/// Return the rule dict that applies to `distance`
#[pyfunction]
pub fn find_applicable_rule<'py>(
    py: Python<'py>,
    distance: f64,
    rules: Vec<Bound<'py, PyDict>>,
) -> PyResult<Bound<'py, PyDict>> {
    let rules = parse_rules(&rules)?;
    let rule = resolver::find_applicable_rule(distance, &rules).map_err(commission_error_to_py)?;
    rule_to_py(py, &rule)
}
