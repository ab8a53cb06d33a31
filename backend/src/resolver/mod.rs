//! Commission Resolver
//!
//! Pure, synchronous resolution of delivery-partner commission:
//! - Select the distance band that applies to a trip (`find_applicable_rule`)
//! - Price the trip against that band (`calculate_commission`)
//!
//! # Critical Invariants
//!
//! 1. **Totality**: every finite non-negative distance resolves to exactly one
//!    rule when at least one active rule exists
//! 2. **No silent zero payouts**: an empty active rule set is an error, never 0
//! 3. **Purity**: no shared state, no I/O; identical inputs give identical results
//!
//! # Example
//!
//! ```rust
//! use delivery_commission_core_rs::{calculate_commission, CommissionError, CommissionRule};
//!
//! let rules = vec![
//!     CommissionRule::new(0.0, Some(5.0), 2.0, 10.0).unwrap(),
//!     CommissionRule::new(5.0, None, 3.0, 12.0).unwrap(),
//! ];
//!
//! let result = calculate_commission(8.0, &rules).unwrap();
//! assert_eq!(result.total_payout, 36.0);
//!
//! assert_eq!(
//!     calculate_commission(5.0, &[]).unwrap_err(),
//!     CommissionError::NoRulesConfigured
//! );
//! ```

pub mod payout;
pub mod selection;

// Re-export public API
pub use payout::{calculate_commission, round2, MAX_PAYOUT};
pub use selection::{find_applicable_rule, CommissionError};
