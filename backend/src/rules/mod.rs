//! Rule Store
//!
//! In-process collection of commission rules as maintained by the admin
//! screens: ordered, unique ids, persisted as a JSON array.
//!
//! # Critical Invariants
//!
//! - **Unique ids**: no two rules in a set share an id
//! - **Valid rules**: every member satisfies the `CommissionRule` invariants
//! - **Stable fingerprint**: same rules in the same order hash identically,
//!   regardless of JSON key order on disk
//!
//! More than one active unbounded rule is allowed but logged, since the
//! resolver must then break the tie.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::warn;

use crate::models::{CommissionResult, CommissionRule, CommissionRuleInput, RuleError};
use crate::resolver::{calculate_commission, find_applicable_rule, CommissionError};

/// Errors raised by rule store operations
#[derive(Debug, Error, PartialEq)]
pub enum RuleSetError {
    #[error("Duplicate rule id: {0}")]
    DuplicateId(String),

    #[error("Rule not found: {0}")]
    UnknownRule(String),

    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] RuleError),

    #[error("Failed to parse rule set: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },
}

/// Ordered collection of commission rules with unique ids
///
/// # Example
/// ```
/// use delivery_commission_core_rs::rules::RuleSet;
///
/// let json = r#"[
///     {"id": "short", "min_distance": 0, "max_distance": 5,
///      "commission_per_km": 2.0, "base_payout": 10.0},
///     {"id": "long", "min_distance": 5, "max_distance": null,
///      "commission_per_km": 3.0, "base_payout": 10.0}
/// ]"#;
///
/// let rules = RuleSet::from_json_str(json).unwrap();
/// let result = rules.calculate(4.0).unwrap();
/// assert_eq!(result.rule.id(), "short");
/// assert_eq!(result.total_payout, 18.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CommissionRuleInput>", into = "Vec<CommissionRule>")]
pub struct RuleSet {
    rules: Vec<CommissionRule>,
}

impl RuleSet {
    /// Build a rule set, rejecting duplicate ids
    pub fn new(rules: Vec<CommissionRule>) -> Result<Self, RuleSetError> {
        {
            let mut seen = HashSet::new();
            for rule in &rules {
                if !seen.insert(rule.id()) {
                    return Err(RuleSetError::DuplicateId(rule.id().to_string()));
                }
            }
        }

        let set = Self { rules };
        set.warn_on_unbounded_conflicts();
        Ok(set)
    }

    /// Build from rules whose ids are known to be unique
    pub(crate) fn from_trusted(rules: Vec<CommissionRule>) -> Self {
        Self { rules }
    }

    /// Parse a JSON array of rule records
    pub fn from_json_str(json: &str) -> Result<Self, RuleSetError> {
        serde_json::from_str(json).map_err(|e| RuleSetError::Parse(e.to_string()))
    }

    /// Load a JSON array of rule records from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RuleSetError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, RuleSetError> {
        serde_json::to_string_pretty(self).map_err(|e| RuleSetError::Serialization(e.to_string()))
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), RuleSetError> {
        let path = path.as_ref();
        fs::write(path, self.to_json_pretty()?).map_err(|e| io_error(path, e))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules in store order, active or not
    pub fn rules(&self) -> &[CommissionRule] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&CommissionRule> {
        self.rules.iter().find(|r| r.id() == id)
    }

    /// Rules that take part in resolution
    pub fn active_rules(&self) -> impl Iterator<Item = &CommissionRule> {
        self.rules.iter().filter(|r| r.is_active())
    }

    /// Append a rule
    pub fn insert(&mut self, rule: CommissionRule) -> Result<(), RuleSetError> {
        if self.get(rule.id()).is_some() {
            return Err(RuleSetError::DuplicateId(rule.id().to_string()));
        }
        self.rules.push(rule);
        self.warn_on_unbounded_conflicts();
        Ok(())
    }

    /// Validate an untrusted record and append it, returning the rule id
    pub fn insert_record(&mut self, record: CommissionRuleInput) -> Result<String, RuleSetError> {
        let rule = CommissionRule::try_from(record)?;
        let id = rule.id().to_string();
        self.insert(rule)?;
        Ok(id)
    }

    /// Replace the rule with the same id, keeping its position
    pub fn update(&mut self, rule: CommissionRule) -> Result<(), RuleSetError> {
        let slot = self
            .rules
            .iter_mut()
            .find(|r| r.id() == rule.id())
            .ok_or_else(|| RuleSetError::UnknownRule(rule.id().to_string()))?;
        *slot = rule;
        self.warn_on_unbounded_conflicts();
        Ok(())
    }

    /// Remove and return the rule with `id`
    pub fn remove(&mut self, id: &str) -> Result<CommissionRule, RuleSetError> {
        let index = self
            .rules
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| RuleSetError::UnknownRule(id.to_string()))?;
        Ok(self.rules.remove(index))
    }

    pub fn set_active(&mut self, id: &str, active: bool) -> Result<(), RuleSetError> {
        let rule = self
            .rules
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| RuleSetError::UnknownRule(id.to_string()))?;
        rule.set_active(active);
        self.warn_on_unbounded_conflicts();
        Ok(())
    }

    /// Ids of active unbounded rules, when there is more than one
    pub fn unbounded_conflicts(&self) -> Vec<&str> {
        let open: Vec<&str> = self
            .active_rules()
            .filter(|r| r.is_unbounded())
            .map(|r| r.id())
            .collect();
        if open.len() > 1 {
            open
        } else {
            Vec::new()
        }
    }

    /// Resolve the applicable rule for `distance`
    pub fn find(&self, distance: f64) -> Result<CommissionRule, CommissionError> {
        find_applicable_rule(distance, &self.rules)
    }

    /// Price a trip of `distance` km against this rule set
    pub fn calculate(&self, distance: f64) -> Result<CommissionResult, CommissionError> {
        calculate_commission(distance, &self.rules)
    }

    /// SHA-256 over the canonical JSON form of the rule set
    ///
    /// Stored next to computed payouts so a payout can be traced back to the
    /// exact rule configuration that produced it.
    pub fn fingerprint(&self) -> Result<String, RuleSetError> {
        let value =
            serde_json::to_value(self).map_err(|e| RuleSetError::Serialization(e.to_string()))?;
        let json = serde_json::to_string(&canonicalize(value))
            .map_err(|e| RuleSetError::Serialization(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }

    fn warn_on_unbounded_conflicts(&self) {
        let conflicts = self.unbounded_conflicts();
        if !conflicts.is_empty() {
            warn!(
                rule_ids = ?conflicts,
                "Multiple active unbounded commission rules; latest-starting band takes precedence"
            );
        }
    }
}

/// Records without an id are named after their 1-based position
/// (`rule-1`, `rule-2`, ...), so loading the same file twice yields the same ids.
impl TryFrom<Vec<CommissionRuleInput>> for RuleSet {
    type Error = RuleSetError;

    fn try_from(records: Vec<CommissionRuleInput>) -> Result<Self, Self::Error> {
        let rules = records
            .into_iter()
            .enumerate()
            .map(|(index, mut record)| {
                if record.id.is_none() {
                    record.id = Some(positional_id(index));
                }
                CommissionRule::try_from(record).map_err(RuleSetError::from)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rules)
    }
}

fn positional_id(index: usize) -> String {
    format!("rule-{}", index + 1)
}

impl From<RuleSet> for Vec<CommissionRule> {
    fn from(set: RuleSet) -> Self {
        set.rules
    }
}

// Recursively sort all object keys
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

fn io_error(path: &Path, err: std::io::Error) -> RuleSetError {
    RuleSetError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str, min: f64, max: Option<f64>) -> CommissionRule {
        CommissionRule::new(min, max, 1.0, 5.0)
            .unwrap()
            .with_id(id)
            .unwrap()
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = RuleSet::new(vec![rule("a", 0.0, None), rule("a", 1.0, None)]).unwrap_err();
        assert_eq!(err, RuleSetError::DuplicateId("a".to_string()));
    }

    #[test]
    fn test_unbounded_conflicts_only_counts_active() {
        let mut set = RuleSet::new(vec![rule("a", 0.0, None), rule("b", 10.0, None)]).unwrap();
        assert_eq!(set.unbounded_conflicts(), vec!["a", "b"]);

        set.set_active("a", false).unwrap();
        assert!(set.unbounded_conflicts().is_empty());
        assert_eq!(set.active_rules().count(), 1);
    }

    #[test]
    fn test_insert_record_validates() {
        let mut set = RuleSet::default();
        let bad = CommissionRuleInput {
            id: None,
            min_distance: 4.0,
            max_distance: Some(1.0),
            commission_per_km: 1.0,
            base_payout: 1.0,
            active: true,
        };
        assert_eq!(
            set.insert_record(bad).unwrap_err(),
            RuleSetError::InvalidRule(RuleError::InvalidBand { min: 4.0, max: 1.0 })
        );
        assert!(set.is_empty());
    }

    #[test]
    fn test_records_without_id_get_positional_ids() {
        let json = r#"[
            {"min_distance": 0, "max_distance": 5, "commission_per_km": 1, "base_payout": 1},
            {"id": "named", "min_distance": 5, "commission_per_km": 2, "base_payout": 1},
            {"min_distance": 9, "max_distance": 12, "commission_per_km": 3, "base_payout": 1}
        ]"#;
        let set = RuleSet::from_json_str(json).unwrap();
        let ids: Vec<&str> = set.rules().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["rule-1", "named", "rule-3"]);
    }

    #[test]
    fn test_canonicalize_sorts_nested_keys() {
        let value = serde_json::json!({"b": 1, "a": {"d": 2, "c": 3}});
        let json = serde_json::to_string(&canonicalize(value)).unwrap();
        assert_eq!(json, r#"{"a":{"c":3,"d":2},"b":1}"#);
    }

    #[test]
    fn test_deserialize_rejects_duplicate_ids() {
        let json = r#"[
            {"id": "x", "min_distance": 0, "commission_per_km": 1, "base_payout": 1},
            {"id": "x", "min_distance": 2, "commission_per_km": 1, "base_payout": 1}
        ]"#;
        let err = RuleSet::from_json_str(json).unwrap_err();
        assert!(matches!(err, RuleSetError::Parse(msg) if msg.contains("Duplicate rule id")));
    }
}
