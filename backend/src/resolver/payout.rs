//! Payout arithmetic
//!
//! `total_payout = round2(base_payout + distance * commission_per_km)`

use tracing::warn;

use crate::models::{CommissionBreakdown, CommissionResult, CommissionRule};

use super::selection::{resolve, CommissionError};

/// Largest payout whose cent amount still fits in an `i64`
pub const MAX_PAYOUT: f64 = i64::MAX as f64 / 100.0;

/// Round half-up to 2 decimal places
///
/// Uses `floor(x * 100 + 0.5) / 100`, not banker's rounding.
///
/// # Example
/// ```
/// use delivery_commission_core_rs::resolver::round2;
///
/// assert_eq!(round2(13.333), 13.33);
/// assert_eq!(round2(2.125), 2.13);
/// ```
pub fn round2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Compute the delivery-partner payout for a trip
///
/// # Arguments
/// * `distance` - Trip distance in kilometers
/// * `rules` - Commission rules; inactive ones are ignored
///
/// # Errors
/// - `CommissionError::InvalidInput` if `distance` is negative or non-finite
/// - `CommissionError::NoRulesConfigured` if no active rule exists
/// - `CommissionError::PayoutOutOfRange` if the payout overflows or exceeds
///   [`MAX_PAYOUT`]
///
/// # Example
/// ```
/// use delivery_commission_core_rs::{calculate_commission, CommissionRule};
///
/// let rules = vec![CommissionRule::new(0.0, None, 5.0, 20.0).unwrap()];
/// let result = calculate_commission(7.5, &rules).unwrap();
///
/// assert_eq!(result.total_payout, 57.5);
/// assert_eq!(result.breakdown.distance_component, 37.5);
/// ```
pub fn calculate_commission(
    distance: f64,
    rules: &[CommissionRule],
) -> Result<CommissionResult, CommissionError> {
    let (rule, resolution) = resolve(distance, rules)?;

    let distance_component = distance * rule.commission_per_km();
    let total_payout = round2(rule.base_payout() + distance_component);
    if !total_payout.is_finite() || total_payout >= MAX_PAYOUT {
        warn!(distance, rule_id = %rule.id(), "Payout out of range");
        return Err(CommissionError::PayoutOutOfRange { distance });
    }

    Ok(CommissionResult {
        rule: rule.clone(),
        total_payout,
        breakdown: CommissionBreakdown {
            base_payout: rule.base_payout(),
            distance,
            commission_per_km: rule.commission_per_km(),
            distance_component,
        },
        resolution,
    })
}
