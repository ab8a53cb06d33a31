//! Domain models for commission resolution

pub mod result;
pub mod rule;

// Re-exports
pub use result::{CommissionBreakdown, CommissionResult, MatchPath};
pub use rule::{CommissionRule, CommissionRuleInput, RuleError};
