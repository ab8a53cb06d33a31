//! Delivery Commission Core - Rust Engine
//!
//! Computes what a delivery partner earns for a trip from distance-banded
//! commission rules.
//!
//! # Architecture
//!
//! - **models**: Domain types (CommissionRule, CommissionResult)
//! - **resolver**: Rule selection and payout arithmetic (pure functions)
//! - **rules**: Rule store (validated, fingerprinted rule collections)
//! - **settings**: Business settings, loaded once and passed by reference
//! - **config**: Environment configuration
//! - **api**: Typed request boundary for payout quotes
//!
//! # Critical Invariants
//!
//! 1. Resolution is total: any finite non-negative distance maps to exactly
//!    one active rule, or fails with a typed error
//! 2. An empty active rule set is an error, never a zero payout
//! 3. Payouts are rounded half-up to 2 decimal places
//! 4. FFI boundary is minimal and safe

// Module declarations
pub mod api;
pub mod config;
pub mod models;
pub mod resolver;
pub mod rules;
pub mod settings;

// Re-exports for convenience
pub use api::{quote, ApiError, QuoteRequest, QuoteResponse};
pub use config::{AppConfig, ConfigError};
pub use models::{
    result::{CommissionBreakdown, CommissionResult, MatchPath},
    rule::{CommissionRule, CommissionRuleInput, RuleError},
};
pub use resolver::{
    calculate_commission, find_applicable_rule, round2, CommissionError, MAX_PAYOUT,
};
pub use rules::{RuleSet, RuleSetError};
pub use settings::{BusinessSettings, SettingsError, SettingsLoader};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn delivery_commission_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(ffi::commission::calculate_commission, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::commission::find_applicable_rule, m)?)?;
    Ok(())
}
