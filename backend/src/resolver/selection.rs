//! Rule selection
//!
//! Maps a trip distance onto exactly one commission rule.
//!
//! # Algorithm
//!
//! 1. Drop inactive rules, then stable-sort the rest ascending by `min_distance`
//!    (equal bounds keep collection order)
//! 2. **Exact match**: first rule whose band covers the distance
//!    (`min <= d <= max`, or `min <= d` for unbounded bands). When that rule is
//!    unbounded, the started unbounded band with the greatest `min_distance` wins.
//! 3. **Fallback** when nothing covers the distance:
//!    - below the lowest band: lowest band (floor clamp)
//!    - an unbounded band has started (`min < d`): the latest one
//!    - otherwise: the band with the greatest `min_distance` (ceiling clamp)
//!
//! Resolution is total: any finite non-negative distance and any collection
//! with at least one active rule yields exactly one rule.

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{CommissionRule, MatchPath};

/// Errors that can occur during commission resolution
#[derive(Debug, Error, PartialEq)]
pub enum CommissionError {
    #[error("Invalid distance {distance}: must be finite and non-negative")]
    InvalidInput { distance: f64 },

    #[error("No active commission rules configured")]
    NoRulesConfigured,

    #[error("Payout for distance {distance} exceeds the representable amount")]
    PayoutOutOfRange { distance: f64 },
}

/// Find the commission rule that applies to a trip
///
/// Inactive rules in `rules` are ignored, so callers may pass either the raw
/// store contents or an already-filtered active set.
///
/// # Errors
/// - `CommissionError::InvalidInput` if `distance` is negative, NaN or infinite
/// - `CommissionError::NoRulesConfigured` if `rules` holds no active rule
///
/// # Example
/// ```
/// use delivery_commission_core_rs::{find_applicable_rule, CommissionRule};
///
/// let rules = vec![
///     CommissionRule::new(0.0, Some(5.0), 2.0, 10.0).unwrap(),
///     CommissionRule::new(5.0, Some(10.0), 3.0, 10.0).unwrap(),
///     CommissionRule::new(10.0, None, 4.0, 10.0).unwrap(),
/// ];
///
/// let rule = find_applicable_rule(7.0, &rules).unwrap();
/// assert_eq!(rule.min_distance(), 5.0);
/// assert_eq!(rule.max_distance(), Some(10.0));
/// ```
pub fn find_applicable_rule(
    distance: f64,
    rules: &[CommissionRule],
) -> Result<CommissionRule, CommissionError> {
    let (rule, _) = resolve(distance, rules)?;
    Ok(rule.clone())
}

/// Resolve a rule and report which selection path produced it
pub(crate) fn resolve(
    distance: f64,
    rules: &[CommissionRule],
) -> Result<(&CommissionRule, MatchPath), CommissionError> {
    if !distance.is_finite() || distance < 0.0 {
        return Err(CommissionError::InvalidInput { distance });
    }

    let mut candidates: Vec<&CommissionRule> = rules.iter().filter(|r| r.is_active()).collect();
    if candidates.is_empty() {
        return Err(CommissionError::NoRulesConfigured);
    }
    // Vec::sort_by is stable
    candidates.sort_by(|a, b| a.min_distance().total_cmp(&b.min_distance()));

    let (rule, path) = select(distance, &candidates);

    debug!(
        distance,
        rule_id = rule.id(),
        path = path.as_str(),
        candidates = candidates.len(),
        "Resolved commission rule"
    );
    if path.is_fallback() {
        warn!(
            distance,
            rule_id = rule.id(),
            path = path.as_str(),
            "Distance outside configured commission bands"
        );
    }

    Ok((rule, path))
}

/// Select from a non-empty candidate list sorted ascending by `min_distance`
fn select<'a>(distance: f64, sorted: &[&'a CommissionRule]) -> (&'a CommissionRule, MatchPath) {
    let lowest = sorted[0];

    if let Some(first) = sorted.iter().copied().find(|r| r.covers(distance)) {
        if first.is_unbounded() {
            let latest = greatest_min(
                sorted
                    .iter()
                    .copied()
                    .filter(|r| r.is_unbounded() && r.min_distance() <= distance),
            );
            return (latest.unwrap_or(first), MatchPath::Exact);
        }
        return (first, MatchPath::Exact);
    }

    if distance < lowest.min_distance() {
        return (lowest, MatchPath::FloorClamp);
    }

    let started_unbounded = greatest_min(
        sorted
            .iter()
            .copied()
            .filter(|r| r.is_unbounded() && r.min_distance() < distance),
    );
    if let Some(rule) = started_unbounded {
        return (rule, MatchPath::UnboundedFallback);
    }

    let highest = greatest_min(sorted.iter().copied()).unwrap_or(lowest);
    (highest, MatchPath::CeilingClamp)
}

/// Rule with the greatest `min_distance`; the first one wins on ties
fn greatest_min<'a>(
    rules: impl Iterator<Item = &'a CommissionRule>,
) -> Option<&'a CommissionRule> {
    rules.fold(None, |best, rule| match best {
        Some(b) if b.min_distance() >= rule.min_distance() => Some(b),
        _ => Some(rule),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str, min: f64, max: Option<f64>) -> CommissionRule {
        CommissionRule::new(min, max, 1.0, 0.0)
            .unwrap()
            .with_id(id)
            .unwrap()
    }

    #[test]
    fn test_negative_distance_rejected() {
        let rules = vec![rule("a", 0.0, None)];
        assert_eq!(
            resolve(-0.1, &rules).unwrap_err(),
            CommissionError::InvalidInput { distance: -0.1 }
        );
    }

    #[test]
    fn test_non_finite_distance_rejected() {
        let rules = vec![rule("a", 0.0, None)];
        assert!(matches!(
            resolve(f64::NAN, &rules),
            Err(CommissionError::InvalidInput { .. })
        ));
        assert!(matches!(
            resolve(f64::INFINITY, &rules),
            Err(CommissionError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_invalid_distance_checked_before_empty_rules() {
        assert!(matches!(
            resolve(-1.0, &[]),
            Err(CommissionError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_only_inactive_rules_is_no_rules() {
        let rules = vec![rule("a", 0.0, None).with_active(false)];
        assert_eq!(
            resolve(1.0, &rules).unwrap_err(),
            CommissionError::NoRulesConfigured
        );
    }

    #[test]
    fn test_inactive_rules_skipped() {
        let rules = vec![
            rule("off", 0.0, Some(10.0)).with_active(false),
            rule("on", 0.0, Some(20.0)),
        ];
        let (picked, path) = resolve(5.0, &rules).unwrap();
        assert_eq!(picked.id(), "on");
        assert_eq!(path, MatchPath::Exact);
    }

    #[test]
    fn test_shared_boundary_goes_to_lower_band() {
        let rules = vec![rule("low", 0.0, Some(5.0)), rule("high", 5.0, Some(10.0))];
        assert_eq!(resolve(5.0, &rules).unwrap().0.id(), "low");
    }

    #[test]
    fn test_equal_min_keeps_collection_order() {
        let rules = vec![rule("first", 0.0, Some(5.0)), rule("second", 0.0, Some(8.0))];
        assert_eq!(resolve(3.0, &rules).unwrap().0.id(), "first");
    }

    #[test]
    fn test_latest_started_unbounded_preferred() {
        let rules = vec![rule("open-0", 0.0, None), rule("open-10", 10.0, None)];
        assert_eq!(resolve(50.0, &rules).unwrap().0.id(), "open-10");
        assert_eq!(resolve(5.0, &rules).unwrap().0.id(), "open-0");
    }

    #[test]
    fn test_gap_resolves_by_ceiling_clamp() {
        let rules = vec![rule("near", 0.0, Some(5.0)), rule("far", 10.0, Some(20.0))];
        let (picked, path) = resolve(7.0, &rules).unwrap();
        assert_eq!(picked.id(), "far");
        assert_eq!(path, MatchPath::CeilingClamp);
    }

    #[test]
    fn test_beyond_all_bounded_bands_uses_highest() {
        let rules = vec![rule("near", 0.0, Some(5.0)), rule("far", 5.0, Some(10.0))];
        let (picked, path) = resolve(42.0, &rules).unwrap();
        assert_eq!(picked.id(), "far");
        assert_eq!(path, MatchPath::CeilingClamp);
    }

    #[test]
    fn test_ceiling_clamp_tie_keeps_collection_order() {
        let rules = vec![rule("a", 3.0, Some(4.0)), rule("b", 3.0, Some(5.0))];
        assert_eq!(resolve(9.0, &rules).unwrap().0.id(), "a");
    }

    #[test]
    fn test_floor_clamp() {
        let rules = vec![rule("from-2", 2.0, Some(6.0)), rule("from-6", 6.0, None)];
        let (picked, path) = resolve(0.0, &rules).unwrap();
        assert_eq!(picked.id(), "from-2");
        assert_eq!(path, MatchPath::FloorClamp);
    }

    #[test]
    fn test_greatest_min_first_wins_on_tie() {
        let a = rule("a", 1.0, None);
        let b = rule("b", 1.0, None);
        let c = rule("c", 0.5, None);
        let picked = greatest_min([&c, &a, &b].into_iter()).unwrap();
        assert_eq!(picked.id(), "a");
        assert!(greatest_min(std::iter::empty()).is_none());
    }
}
