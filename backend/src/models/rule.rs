//! Commission rule model
//!
//! A commission rule is one payout tier: a distance band plus the base payout
//! and per-kilometer rate paid to a delivery partner for trips in that band.
//!
//! Each rule has:
//! - Unique rule identifier (UUID unless supplied by the rule store)
//! - Distance band `[min_distance, max_distance]` in kilometers
//!   (`max_distance = None` means unbounded above)
//! - Per-kilometer rate applied to the full trip distance
//! - Fixed base payout
//! - Active flag (inactive rules never take part in resolution)
//!
//! CRITICAL: A `CommissionRule` value always satisfies its invariants.
//! Construction goes through [`CommissionRule::new`] or through
//! [`CommissionRuleInput`] (the untrusted record shape), both of which validate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a rule record violates the rule invariants
#[derive(Debug, Error, PartialEq)]
pub enum RuleError {
    #[error("{field} must be finite and non-negative, got {value}")]
    InvalidValue { field: &'static str, value: f64 },

    #[error("max_distance {max} must be greater than min_distance {min}")]
    InvalidBand { min: f64, max: f64 },

    #[error("Rule id must not be empty")]
    EmptyId,
}

/// Untrusted commission rule record
///
/// This is the shape rules arrive in from the admin screens and the rule
/// store: every field is plain data and nothing has been checked yet.
/// Converting it into a [`CommissionRule`] validates the band and amounts.
///
/// Both snake_case and the camelCase keys used by the admin frontend are
/// accepted on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionRuleInput {
    /// Rule identifier; a UUID is generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Inclusive lower bound of the band (km)
    #[serde(alias = "minDistance")]
    pub min_distance: f64,

    /// Upper bound of the band (km); `None` = unbounded
    #[serde(default, alias = "maxDistance")]
    pub max_distance: Option<f64>,

    /// Rate applied to the full trip distance
    #[serde(alias = "commissionPerKm")]
    pub commission_per_km: f64,

    /// Fixed component added regardless of distance
    #[serde(alias = "basePayout")]
    pub base_payout: f64,

    /// Inactive rules are excluded from resolution
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// A validated distance-banded commission rule
///
/// # Example
/// ```
/// use delivery_commission_core_rs::CommissionRule;
///
/// let rule = CommissionRule::new(0.0, Some(5.0), 2.5, 10.0).unwrap();
/// assert!(rule.covers(5.0));
/// assert!(!rule.covers(5.1));
/// assert!(rule.is_active());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CommissionRuleInput", into = "CommissionRuleInput")]
pub struct CommissionRule {
    /// Unique rule identifier
    id: String,

    /// Inclusive lower bound of the band (km)
    min_distance: f64,

    /// Upper bound of the band (km), `None` = unbounded above
    max_distance: Option<f64>,

    /// Rate applied to the full trip distance
    commission_per_km: f64,

    /// Fixed payout component
    base_payout: f64,

    /// Whether the rule takes part in resolution
    active: bool,
}

impl CommissionRule {
    /// Create a new active rule with a generated id
    ///
    /// # Arguments
    /// * `min_distance` - Inclusive lower bound of the band (km, >= 0)
    /// * `max_distance` - Upper bound (km), `None` for an unbounded band
    /// * `commission_per_km` - Per-kilometer rate (>= 0)
    /// * `base_payout` - Fixed payout (>= 0)
    ///
    /// # Errors
    /// Returns `RuleError` if any amount is negative or non-finite, or if
    /// `max_distance <= min_distance`.
    pub fn new(
        min_distance: f64,
        max_distance: Option<f64>,
        commission_per_km: f64,
        base_payout: f64,
    ) -> Result<Self, RuleError> {
        ensure_non_negative("min_distance", min_distance)?;
        if let Some(max) = max_distance {
            ensure_non_negative("max_distance", max)?;
            if max <= min_distance {
                return Err(RuleError::InvalidBand {
                    min: min_distance,
                    max,
                });
            }
        }
        ensure_non_negative("commission_per_km", commission_per_km)?;
        ensure_non_negative("base_payout", base_payout)?;

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            min_distance,
            max_distance,
            commission_per_km,
            base_payout,
            active: true,
        })
    }

    /// Build a rule from values known to be valid at compile time
    pub(crate) fn new_unchecked(
        id: &str,
        min_distance: f64,
        max_distance: Option<f64>,
        commission_per_km: f64,
        base_payout: f64,
    ) -> Self {
        debug_assert!(Self::new(min_distance, max_distance, commission_per_km, base_payout).is_ok());
        Self {
            id: id.to_string(),
            min_distance,
            max_distance,
            commission_per_km,
            base_payout,
            active: true,
        }
    }

    /// Replace the generated id (rule store records carry their own)
    ///
    /// # Errors
    /// Returns `RuleError::EmptyId` if `id` is blank.
    pub fn with_id(mut self, id: impl Into<String>) -> Result<Self, RuleError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(RuleError::EmptyId);
        }
        self.id = id;
        Ok(self)
    }

    /// Set the active flag
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn min_distance(&self) -> f64 {
        self.min_distance
    }

    pub fn max_distance(&self) -> Option<f64> {
        self.max_distance
    }

    pub fn commission_per_km(&self) -> f64 {
        self.commission_per_km
    }

    pub fn base_payout(&self) -> f64 {
        self.base_payout
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Whether the band has no upper bound
    pub fn is_unbounded(&self) -> bool {
        self.max_distance.is_none()
    }

    /// Whether `distance` lies inside the band (both bounds inclusive)
    pub fn covers(&self, distance: f64) -> bool {
        self.min_distance <= distance && self.max_distance.map_or(true, |max| distance <= max)
    }
}

impl TryFrom<CommissionRuleInput> for CommissionRule {
    type Error = RuleError;

    fn try_from(input: CommissionRuleInput) -> Result<Self, Self::Error> {
        let rule = Self::new(
            input.min_distance,
            input.max_distance,
            input.commission_per_km,
            input.base_payout,
        )?
        .with_active(input.active);

        match input.id {
            Some(id) => rule.with_id(id),
            None => Ok(rule),
        }
    }
}

impl From<CommissionRule> for CommissionRuleInput {
    fn from(rule: CommissionRule) -> Self {
        Self {
            id: Some(rule.id),
            min_distance: rule.min_distance,
            max_distance: rule.max_distance,
            commission_per_km: rule.commission_per_km,
            base_payout: rule.base_payout,
            active: rule.active,
        }
    }
}

fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), RuleError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RuleError::InvalidValue { field, value })
    }
}
