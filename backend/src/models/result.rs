//! Commission result model
//!
//! Output of a single commission resolution: the rule that applied, how it
//! was selected, and the payout arithmetic.

use serde::{Deserialize, Serialize};

use super::rule::CommissionRule;

/// How the applicable rule was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPath {
    /// Distance lies inside the rule's band
    Exact,

    /// Distance is below every configured band; lowest band applied
    FloorClamp,

    /// Distance is past every bounded band; latest-started unbounded band applied
    UnboundedFallback,

    /// Distance is not covered and no unbounded band applies; highest band applied
    CeilingClamp,
}

impl MatchPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchPath::Exact => "exact",
            MatchPath::FloorClamp => "floor_clamp",
            MatchPath::UnboundedFallback => "unbounded_fallback",
            MatchPath::CeilingClamp => "ceiling_clamp",
        }
    }

    /// Whether the distance fell outside the configured coverage
    pub fn is_fallback(&self) -> bool {
        !matches!(self, MatchPath::Exact)
    }
}

/// Itemized payout arithmetic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionBreakdown {
    pub base_payout: f64,
    pub distance: f64,
    pub commission_per_km: f64,

    /// `distance * commission_per_km`, unrounded
    pub distance_component: f64,
}

/// Result of resolving and pricing one trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionResult {
    /// The rule that matched
    pub rule: CommissionRule,

    /// `base_payout + distance * commission_per_km`, rounded half-up to 2 decimals
    pub total_payout: f64,

    pub breakdown: CommissionBreakdown,

    /// Selection path that produced `rule`
    pub resolution: MatchPath,
}

impl CommissionResult {
    /// Total payout in minor currency units (cents), as credited to the
    /// delivery partner's wallet
    ///
    /// `calculate_commission` rejects payouts at or above `MAX_PAYOUT`, so
    /// the cast never saturates for results it produced.
    pub fn total_payout_cents(&self) -> i64 {
        (self.total_payout * 100.0).round() as i64
    }
}
