// src/matching/engine.rs

use std::cmp::Ordering;

use serde::Serialize;

use super::quality::QualityTier;
use crate::config::{CandidatePool, MatchPolicy};
use crate::model::{Catalog, Element, TransitionKey};

/// Outcome of scoring one candidate against one target.
///
/// All deltas are absolute differences; `None` means one side of the
/// comparison was unknown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub target: String,
    pub candidate: String,
    pub tier: QualityTier,
    /// Smallest potential difference (V) over shared transition keys
    pub potential_delta: Option<f64>,
    pub electronegativity_delta: Option<f64>,
    /// Kelvin
    pub melting_point_delta: Option<f64>,
    pub electron_affinity_delta: Option<f64>,
    pub shared_keys: Vec<TransitionKey>,
    pub reason: String,
}

/// Ranked candidates for one target element, best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetMapping {
    pub target: String,
    /// Source-table row of the target element
    pub row: usize,
    pub reference: bool,
    pub candidates: Vec<MatchResult>,
}

impl TargetMapping {
    pub fn best(&self) -> Option<&MatchResult> {
        self.candidates.first()
    }

    /// Tier written back to the table for this target.
    pub fn assigned_tier(&self) -> QualityTier {
        if self.reference {
            QualityTier::SelfRef
        } else {
            self.best().map(|m| m.tier).unwrap_or(QualityTier::Unmatched)
        }
    }
}

/// Mappings for every target, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MappingReport {
    pub targets: Vec<TargetMapping>,
}

impl MappingReport {
    pub fn get(&self, symbol: &str) -> Option<&TargetMapping> {
        self.targets.iter().find(|t| t.target == symbol)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Number of targets per assigned tier, best tier first.
    pub fn tier_counts(&self) -> Vec<(QualityTier, usize)> {
        let tiers = [
            QualityTier::SelfRef,
            QualityTier::Good,
            QualityTier::Decent,
            QualityTier::Poor,
            QualityTier::Unmatched,
        ];
        tiers
            .iter()
            .map(|&tier| {
                let n = self.targets.iter().filter(|t| t.assigned_tier() == tier).count();
                (tier, n)
            })
            .collect()
    }
}

fn abs_delta(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some((x - y).abs()),
        _ => None,
    }
}

/// Smallest potential difference over `shared` keys where both potentials
/// are known and physically plausible.
fn closest_potential(
    target: &Element,
    candidate: &Element,
    shared: &[TransitionKey],
    policy: &MatchPolicy,
) -> Option<f64> {
    let scorable = |e: &Element, key: &TransitionKey| {
        e.redox
            .get(key)
            .and_then(|entry| entry.potential)
            .filter(|&p| !policy.is_suspect_potential(p))
    };

    shared
        .iter()
        .filter_map(|key| abs_delta(scorable(target, key), scorable(candidate, key)))
        .min_by(|a, b| a.total_cmp(b))
}

/// Scores `candidate` as a surrogate for `target`. The returned tier may be
/// `Unmatched`; callers decide whether to keep it.
///
/// Tiers, first satisfied wins:
/// 1. Good: a shared key with potential delta <= `good_potential_max`
/// 2. Decent: a shared key with delta <= `decent_potential_max`, or shared
///    keys without comparable potentials
/// 3. Poor: no shared key, electronegativity delta < `poor_electronegativity_max`
///    or melting point delta < `poor_melting_point_max`
pub fn score_candidate(target: &Element, candidate: &Element, policy: &MatchPolicy) -> MatchResult {
    let shared = target.redox.shared_keys(&candidate.redox);
    let potential_delta = closest_potential(target, candidate, &shared, policy);
    let electronegativity_delta = abs_delta(target.electronegativity, candidate.electronegativity);
    let melting_point_delta = abs_delta(target.melting_point, candidate.melting_point);
    let electron_affinity_delta = abs_delta(target.electron_affinity, candidate.electron_affinity);

    let (tier, reason) = if !shared.is_empty() {
        match potential_delta {
            Some(d) if MatchPolicy::within_inclusive(d, policy.good_potential_max) => {
                (QualityTier::Good, "Good match in valence states")
            }
            Some(d) if MatchPolicy::within_inclusive(d, policy.decent_potential_max) => {
                (QualityTier::Decent, "Decent match based on closest potential")
            }
            Some(_) => (QualityTier::Unmatched, "Shared valence states but potentials too far apart"),
            None => (QualityTier::Decent, "Decent match in valence states"),
        }
    } else if electronegativity_delta
        .map(|d| MatchPolicy::within_strict(d, policy.poor_electronegativity_max))
        .unwrap_or(false)
    {
        (QualityTier::Poor, "Poor match based on similar electronegativity")
    } else if melting_point_delta
        .map(|d| MatchPolicy::within_strict(d, policy.poor_melting_point_max))
        .unwrap_or(false)
    {
        (QualityTier::Poor, "Poor match based on similar melting point")
    } else {
        (QualityTier::Unmatched, "No shared valence states or similar properties")
    };

    MatchResult {
        target: target.symbol.clone(),
        candidate: candidate.symbol.clone(),
        tier,
        potential_delta,
        electronegativity_delta,
        melting_point_delta,
        electron_affinity_delta,
        shared_keys: shared,
        reason: reason.to_string(),
    }
}

/// Missing values sort after known ones.
fn cmp_optional(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Ranking: tier, then potential delta, then electronegativity delta,
/// then candidate symbol.
pub fn compare_results(a: &MatchResult, b: &MatchResult) -> Ordering {
    a.tier
        .rank()
        .cmp(&b.tier.rank())
        .then_with(|| cmp_optional(a.potential_delta, b.potential_delta))
        .then_with(|| cmp_optional(a.electronegativity_delta, b.electronegativity_delta))
        .then_with(|| a.candidate.cmp(&b.candidate))
}

/// Ranked surrogate candidates for `target`. Unmatched candidates are
/// dropped; an empty result is a valid outcome.
pub fn match_element(target: &Element, catalog: &Catalog, policy: &MatchPolicy) -> Vec<MatchResult> {
    let mut results: Vec<MatchResult> = catalog
        .all()
        .iter()
        .filter(|c| c.symbol != target.symbol)
        .filter(|c| match policy.candidate_pool {
            CandidatePool::All => true,
            CandidatePool::References => c.reference,
        })
        .map(|c| score_candidate(target, c, policy))
        .filter(|m| m.tier != QualityTier::Unmatched)
        .collect();

    results.sort_by(compare_results);
    results
}

fn map_target(target: &Element, catalog: &Catalog, policy: &MatchPolicy) -> TargetMapping {
    let candidates = match_element(target, catalog, policy);
    match candidates.first() {
        Some(best) => log::debug!(
            "{} -> {} ({}, {} candidates)",
            target.symbol,
            best.candidate,
            best.tier,
            candidates.len()
        ),
        None => log::debug!("{} -> no surrogate candidates", target.symbol),
    }
    TargetMapping {
        target: target.symbol.clone(),
        row: target.row,
        reference: target.reference,
        candidates,
    }
}

/// Maps every element of the catalog, in catalog order.
pub fn map_catalog(catalog: &Catalog, policy: &MatchPolicy) -> MappingReport {
    let targets = catalog
        .all()
        .iter()
        .map(|t| map_target(t, catalog, policy))
        .collect();
    MappingReport { targets }
}

/// Parallel mapping for large catalogs; output identical to `map_catalog`.
#[cfg(feature = "parallel")]
pub fn map_catalog_parallel(catalog: &Catalog, policy: &MatchPolicy) -> MappingReport {
    use rayon::prelude::*;

    let targets = catalog
        .all()
        .par_iter()
        .map(|t| map_target(t, catalog, policy))
        .collect();
    MappingReport { targets }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchemaConfig;
    use crate::model::catalog::tests::sample_table;
    use crate::model::RedoxTable;

    fn catalog() -> Catalog {
        Catalog::from_table(&sample_table(), &SchemaConfig::default()).unwrap()
    }

    fn element(symbol: &str, en: Option<f64>, mp: Option<f64>, keys: &str, potentials: &str) -> Element {
        let keys = if keys.is_empty() { None } else { Some(keys) };
        let potentials = if potentials.is_empty() { None } else { Some(potentials) };
        Element {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            atomic_number: 1,
            atomic_mass: 1.0,
            electronegativity: en,
            electron_affinity: None,
            melting_point: mp,
            boiling_point: None,
            density: None,
            standard_state: None,
            group_block: None,
            oxidation_states: Vec::new(),
            redox: RedoxTable::from_columns(symbol, keys, potentials, None),
            reference: false,
            version_compatibility: None,
            row: 0,
        }
    }

    #[test]
    fn test_ba_ra_good() {
        let cat = catalog();
        let m = score_candidate(cat.get("Ba").unwrap(), cat.get("Ra").unwrap(), &MatchPolicy::default());
        assert_eq!(m.tier, QualityTier::Good);
        assert!((m.potential_delta.unwrap() - 0.112).abs() < 1e-9);
        assert_eq!(m.shared_keys, vec![TransitionKey::new("2+")]);
    }

    #[test]
    fn test_cr_co_decent_on_partial_key_set() {
        let cat = catalog();
        let m = score_candidate(cat.get("Cr").unwrap(), cat.get("Co").unwrap(), &MatchPolicy::default());
        assert_eq!(m.tier, QualityTier::Decent);
        assert_eq!(m.reason, "Decent match based on closest potential");
        assert!((m.potential_delta.unwrap() - 0.633).abs() < 1e-9);
        assert!((m.electronegativity_delta.unwrap() - 0.22).abs() < 1e-9);
        assert!((m.melting_point_delta.unwrap() - 412.0).abs() < 1e-9);
    }

    #[test]
    fn test_xe_c_poor_by_electronegativity() {
        let cat = catalog();
        let m = score_candidate(cat.get("Xe").unwrap(), cat.get("C").unwrap(), &MatchPolicy::default());
        assert_eq!(m.tier, QualityTier::Poor);
        assert!(m.reason.contains("electronegativity"));
        assert!((m.electronegativity_delta.unwrap() - 0.05).abs() < 1e-9);
        assert_eq!(m.potential_delta, None);
        // Melting point delta is still reported for audit
        assert!(m.melting_point_delta.unwrap() > 3000.0);
    }

    #[test]
    fn test_poor_by_melting_point() {
        let t = element("A", Some(1.0), Some(1000.0), "", "");
        let c = element("B", Some(2.0), Some(1150.0), "", "");
        let m = score_candidate(&t, &c, &MatchPolicy::default());
        assert_eq!(m.tier, QualityTier::Poor);
        assert_eq!(m.reason, "Poor match based on similar melting point");
    }

    #[test]
    fn test_electronegativity_boundary_is_strict() {
        let t = element("A", Some(1.0), Some(100.0), "", "");
        let c = element("B", Some(1.5), Some(900.0), "", "");
        let m = score_candidate(&t, &c, &MatchPolicy::default());
        assert_eq!(m.electronegativity_delta, Some(0.5));
        assert_eq!(m.tier, QualityTier::Unmatched);
    }

    #[test]
    fn test_melting_point_boundary_is_strict() {
        let t = element("A", None, Some(1000.0), "", "");
        let c = element("B", None, Some(1200.0), "", "");
        assert_eq!(score_candidate(&t, &c, &MatchPolicy::default()).tier, QualityTier::Unmatched);
    }

    #[test]
    fn test_potential_boundary_is_inclusive() {
        let t = element("A", None, None, "2+", "0.0");
        let c = element("B", None, None, "2+", "0.4");
        let m = score_candidate(&t, &c, &MatchPolicy::default());
        assert_eq!(m.potential_delta, Some(0.4));
        assert_eq!(m.tier, QualityTier::Good);

        let c = element("C", None, None, "2+", "1.5");
        assert_eq!(score_candidate(&t, &c, &MatchPolicy::default()).tier, QualityTier::Decent);
    }

    #[test]
    fn test_min_delta_over_shared_keys() {
        let t = element("A", None, None, "2+, 3+", "-1.0, -0.5");
        let c = element("B", None, None, "2+, 3+", "0.5, -0.3");
        let m = score_candidate(&t, &c, &MatchPolicy::default());
        assert_eq!(m.tier, QualityTier::Good);
        assert!((m.potential_delta.unwrap() - 0.2).abs() < 1e-9);
        assert_eq!(m.shared_keys.len(), 2);
    }

    #[test]
    fn test_shared_key_without_potentials() {
        let t = element("A", None, None, "3+", "");
        let c = element("B", None, None, "3+", "-1.2");
        let m = score_candidate(&t, &c, &MatchPolicy::default());
        assert_eq!(m.tier, QualityTier::Decent);
        assert_eq!(m.reason, "Decent match in valence states");
        assert_eq!(m.potential_delta, None);
    }

    #[test]
    fn test_shared_key_far_potential_is_unmatched() {
        // Overlap excludes the Poor tier even with near-identical electronegativity
        let t = element("A", Some(1.0), None, "2+", "-3.0");
        let c = element("B", Some(1.1), None, "2+", "0.0");
        assert_eq!(score_candidate(&t, &c, &MatchPolicy::default()).tier, QualityTier::Unmatched);
    }

    #[test]
    fn test_suspect_potential_not_scored() {
        let t = element("A", None, None, "2+", "-2.3");
        let c = element("B", None, None, "2+", "-2319.0");
        let m = score_candidate(&t, &c, &MatchPolicy::default());
        assert_eq!(m.potential_delta, None);
        assert_eq!(m.tier, QualityTier::Decent);
        assert_eq!(m.reason, "Decent match in valence states");
    }

    #[test]
    fn test_ranking_and_tie_break() {
        let cat = catalog();
        let ranked = match_element(cat.get("Ba").unwrap(), &cat, &MatchPolicy::default());
        let order: Vec<(&str, QualityTier)> = ranked.iter().map(|m| (m.candidate.as_str(), m.tier)).collect();
        assert_eq!(
            order,
            vec![
                ("Ca", QualityTier::Good),
                ("Ra", QualityTier::Good),
                ("Be", QualityTier::Decent),
            ]
        );

        // Identical deltas fall back to alphabetical symbol order
        let a = element("Zz", Some(1.0), None, "", "");
        let b = element("Aa", Some(1.0), None, "", "");
        let t = element("T", Some(1.2), None, "", "");
        let policy = MatchPolicy::default();
        let mut v = vec![score_candidate(&t, &a, &policy), score_candidate(&t, &b, &policy)];
        v.sort_by(compare_results);
        assert_eq!(v[0].candidate, "Aa");
    }

    #[test]
    fn test_never_self_candidate() {
        let cat = catalog();
        let report = map_catalog(&cat, &MatchPolicy::default());
        assert_eq!(report.len(), cat.len());
        for mapping in &report.targets {
            assert!(mapping.candidates.iter().all(|m| m.candidate != mapping.target));
        }
    }

    #[test]
    fn test_good_tier_property_both_ways() {
        let cat = catalog();
        let policy = MatchPolicy::default();
        for t in cat.all() {
            for c in cat.all().iter().filter(|c| c.symbol != t.symbol) {
                let forward = score_candidate(t, c, &policy);
                let backward = score_candidate(c, t, &policy);
                assert_eq!(forward.tier, backward.tier, "{} vs {}", t.symbol, c.symbol);
                if forward.tier == QualityTier::Good {
                    assert!(!forward.shared_keys.is_empty());
                    assert!(forward.potential_delta.unwrap() <= 0.4 + 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_unmatched_is_empty_not_error() {
        let cat = catalog();
        let ranked = match_element(cat.get("He").unwrap(), &cat, &MatchPolicy::default());
        assert!(ranked.is_empty());

        let report = map_catalog(&cat, &MatchPolicy::default());
        assert_eq!(report.get("He").unwrap().assigned_tier(), QualityTier::Unmatched);
        assert_eq!(report.get("Co").unwrap().assigned_tier(), QualityTier::SelfRef);
    }

    #[test]
    fn test_reference_pool() {
        let cat = catalog();
        let policy = MatchPolicy {
            candidate_pool: CandidatePool::References,
            ..MatchPolicy::default()
        };
        let ranked = match_element(cat.get("Ba").unwrap(), &cat, &policy);
        let names: Vec<&str> = ranked.iter().map(|m| m.candidate.as_str()).collect();
        assert_eq!(names, vec!["Ra", "Be"]);
    }

    #[test]
    fn test_deterministic_rerun() {
        let cat = catalog();
        let a = map_catalog(&cat, &MatchPolicy::default());
        let b = map_catalog(&cat, &MatchPolicy::default());
        assert_eq!(a, b);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_serial() {
        let cat = catalog();
        let policy = MatchPolicy::default();
        assert_eq!(map_catalog(&cat, &policy), map_catalog_parallel(&cat, &policy));
    }
}
