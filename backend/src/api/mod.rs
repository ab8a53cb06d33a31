//! Quote API boundary
//!
//! Request bodies are parsed into fixed, typed records and validated here,
//! before any commission logic runs. Unknown fields are rejected.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CommissionBreakdown, MatchPath};
use crate::resolver::CommissionError;
use crate::rules::{RuleSet, RuleSetError};

#[derive(Debug, Error, PartialEq)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Commission(#[from] CommissionError),

    #[error(transparent)]
    RuleSet(#[from] RuleSetError),
}

impl ApiError {
    /// HTTP status the calling handler should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_) => 400,
            ApiError::Commission(CommissionError::InvalidInput { .. }) => 400,
            ApiError::Commission(CommissionError::PayoutOutOfRange { .. }) => 422,
            // configuration gap, not a client error
            ApiError::Commission(CommissionError::NoRulesConfigured) => 503,
            ApiError::RuleSet(_) => 500,
        }
    }
}

/// Payout quote request for one trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuoteRequest {
    /// Trip distance in kilometers
    pub distance_km: f64,

    #[serde(default)]
    pub order_id: Option<String>,
}

impl QuoteRequest {
    /// Parse and validate a JSON request body
    ///
    /// # Example
    /// ```
    /// use delivery_commission_core_rs::api::QuoteRequest;
    ///
    /// let req = QuoteRequest::from_json(r#"{"distance_km": 4.2}"#).unwrap();
    /// assert_eq!(req.distance_km, 4.2);
    ///
    /// assert!(QuoteRequest::from_json(r#"{"distance": 4.2}"#).is_err());
    /// assert!(QuoteRequest::from_json(r#"{"distance_km": -1}"#).is_err());
    /// ```
    pub fn from_json(body: &str) -> Result<Self, ApiError> {
        let request: Self =
            serde_json::from_str(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if !self.distance_km.is_finite() || self.distance_km < 0.0 {
            return Err(ApiError::InvalidRequest(format!(
                "distance_km must be a finite non-negative number, got {}",
                self.distance_km
            )));
        }
        if let Some(order_id) = &self.order_id {
            if order_id.trim().is_empty() {
                return Err(ApiError::InvalidRequest(
                    "order_id must not be blank".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Priced quote, ready to be recorded by the payout ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub order_id: Option<String>,
    pub rule_id: String,
    pub resolution: MatchPath,
    pub total_payout: f64,

    /// `total_payout` in minor currency units
    pub total_payout_cents: i64,

    pub breakdown: CommissionBreakdown,

    /// Fingerprint of the rule set the quote was priced against
    pub rule_set_fingerprint: String,
}

/// Price a validated quote request against `rules`
pub fn quote(request: &QuoteRequest, rules: &RuleSet) -> Result<QuoteResponse, ApiError> {
    request.validate()?;

    let result = rules.calculate(request.distance_km)?;
    let total_payout_cents = result.total_payout_cents();

    Ok(QuoteResponse {
        order_id: request.order_id.clone(),
        rule_id: result.rule.id().to_string(),
        resolution: result.resolution,
        total_payout: result.total_payout,
        total_payout_cents,
        breakdown: result.breakdown,
        rule_set_fingerprint: rules.fingerprint()?,
    })
}
