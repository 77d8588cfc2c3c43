//! Coverage analytics over factors and test cases.
//!
//! This module measures how thoroughly a set of test cases exercises the
//! combination space of its factors:
//!
//! - [`pairwise_coverage`]: which 2-way factor/level pairs are realized
//! - [`threeway_coverage`]: which 3-way triples are realized
//! - [`report`]: the combined [`CoverageReport`] for a generated suite
//! - [`evaluate_quality`]: bucket a coverage rate into a quality grade
//!
//! All calculations are pure: identical inputs always yield identical
//! results, and key construction is order-independent so results do not
//! depend on factor traversal order.

mod keys;

pub use keys::{PairKey, TripleKey};

use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::factor::{Factor, TestCase};
use crate::generate::Algorithm;
use crate::utils::{combinations, total_combinations};

/// 2-way coverage figures for a set of test cases.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PairwiseCoverage {
    /// Number of distinct factor/level pairs the factors define.
    pub total_pairs: usize,
    /// Number of those pairs realized by at least one test case.
    pub covered_pairs: usize,
    /// Number of pairs no test case realizes.
    pub uncovered_pairs: usize,
    /// Covered share as a percentage, rounded to two decimals.
    pub coverage_rate: f64,
}

/// 3-way coverage figures for a set of test cases.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThreeWayCoverage {
    /// Number of distinct factor/level triples the factors define.
    pub total_triples: usize,
    /// Number of those triples realized by at least one test case.
    pub covered_triples: usize,
    /// Number of triples no test case realizes.
    pub uncovered_triples: usize,
    /// Covered share as a percentage, rounded to two decimals.
    pub coverage_rate: f64,
}

/// Combined coverage report for a generated suite.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoverageReport {
    /// The algorithm that produced the suite.
    pub algorithm: Algorithm,
    /// Number of test cases in the suite.
    pub case_count: usize,
    /// Number of factors under test.
    pub factor_count: usize,
    /// Size of the full cartesian product (saturating).
    pub total_combinations: u64,
    /// 2-way coverage, present when there are at least two factors.
    pub pairwise: Option<PairwiseCoverage>,
    /// 3-way coverage, present when there are at least three factors.
    pub threeway: Option<ThreeWayCoverage>,
    /// Share of the cartesian product avoided, as a percentage.
    pub reduction_rate: f64,
    /// How many cartesian rows each generated case stands in for.
    pub efficiency: f64,
}

impl CoverageReport {
    /// Whether the suite fully achieved its algorithm's target strength.
    ///
    /// The greedy generators may exhaust their budgets short of full
    /// coverage without reporting an error; this flag is how that shortfall
    /// becomes visible.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        match self.algorithm {
            Algorithm::Pairwise => self
                .pairwise
                .as_ref()
                .is_some_and(|p| p.coverage_rate >= 100.0),
            Algorithm::ThreeWay => self
                .threeway
                .as_ref()
                .is_some_and(|t| t.coverage_rate >= 100.0),
            Algorithm::AllCombinations => self.case_count as u64 == self.total_combinations,
        }
    }
}

/// Compute the combined coverage report for a suite.
///
/// Pairwise figures are included when there are at least two factors and
/// 3-way figures when there are at least three, regardless of which
/// algorithm produced the cases.
#[must_use]
pub fn report(cases: &[TestCase], factors: &[Factor], algorithm: Algorithm) -> CoverageReport {
    let total = total_combinations(factors);

    let (reduction_rate, efficiency) = if total > 0 {
        (
            reduction_rate(total, cases.len()),
            total as f64 / cases.len().max(1) as f64,
        )
    } else {
        (0.0, 0.0)
    };

    CoverageReport {
        algorithm,
        case_count: cases.len(),
        factor_count: factors.len(),
        total_combinations: total,
        pairwise: (factors.len() >= 2).then(|| pairwise_coverage(cases, factors)),
        threeway: (factors.len() >= 3).then(|| threeway_coverage(cases, factors)),
        reduction_rate,
        efficiency,
    }
}

/// Compute 2-way coverage of `cases` over `factors`.
#[must_use]
pub fn pairwise_coverage(cases: &[TestCase], factors: &[Factor]) -> PairwiseCoverage {
    let all = all_pairs(factors);
    let covered = covered_pairs(cases, factors);

    let rate = if all.is_empty() {
        0.0
    } else {
        covered.len() as f64 / all.len() as f64 * 100.0
    };

    PairwiseCoverage {
        total_pairs: all.len(),
        covered_pairs: covered.len(),
        uncovered_pairs: all.len().saturating_sub(covered.len()),
        coverage_rate: round2(rate),
    }
}

/// Compute 3-way coverage of `cases` over `factors`.
#[must_use]
pub fn threeway_coverage(cases: &[TestCase], factors: &[Factor]) -> ThreeWayCoverage {
    let all = all_triples(factors);
    let covered = covered_triples(cases, factors);

    let rate = if all.is_empty() {
        0.0
    } else {
        covered.len() as f64 / all.len() as f64 * 100.0
    };

    ThreeWayCoverage {
        total_triples: all.len(),
        covered_triples: covered.len(),
        uncovered_triples: all.len().saturating_sub(covered.len()),
        coverage_rate: round2(rate),
    }
}

/// Enumerate every factor/level pair the factors define.
fn all_pairs(factors: &[Factor]) -> HashSet<PairKey> {
    let mut pairs = HashSet::new();

    for combo in combinations(factors.len(), 2) {
        let (f1, f2) = (&factors[combo[0]], &factors[combo[1]]);
        for l1 in f1.levels() {
            for l2 in f2.levels() {
                pairs.insert(PairKey::new(f1.id(), l1.clone(), f2.id(), l2.clone()));
            }
        }
    }

    pairs
}

/// Enumerate every pair realized by at least one test case.
fn covered_pairs(cases: &[TestCase], factors: &[Factor]) -> HashSet<PairKey> {
    let combos: Vec<Vec<usize>> = combinations(factors.len(), 2).collect();
    let mut covered = HashSet::new();

    for case in cases {
        for combo in &combos {
            let (f1, f2) = (&factors[combo[0]], &factors[combo[1]]);
            if let (Some(l1), Some(l2)) = (case.level(f1.id()), case.level(f2.id())) {
                covered.insert(PairKey::new(f1.id(), l1, f2.id(), l2));
            }
        }
    }

    covered
}

/// Enumerate every factor/level triple the factors define.
fn all_triples(factors: &[Factor]) -> HashSet<TripleKey> {
    let mut triples = HashSet::new();

    for combo in combinations(factors.len(), 3) {
        let (f1, f2, f3) = (&factors[combo[0]], &factors[combo[1]], &factors[combo[2]]);
        for l1 in f1.levels() {
            for l2 in f2.levels() {
                for l3 in f3.levels() {
                    triples.insert(TripleKey::new(
                        f1.id(),
                        l1.clone(),
                        f2.id(),
                        l2.clone(),
                        f3.id(),
                        l3.clone(),
                    ));
                }
            }
        }
    }

    triples
}

/// Enumerate every triple realized by at least one test case.
fn covered_triples(cases: &[TestCase], factors: &[Factor]) -> HashSet<TripleKey> {
    let combos: Vec<Vec<usize>> = combinations(factors.len(), 3).collect();
    let mut covered = HashSet::new();

    for case in cases {
        for combo in &combos {
            let (f1, f2, f3) = (&factors[combo[0]], &factors[combo[1]], &factors[combo[2]]);
            if let (Some(l1), Some(l2), Some(l3)) = (
                case.level(f1.id()),
                case.level(f2.id()),
                case.level(f3.id()),
            ) {
                covered.insert(TripleKey::new(f1.id(), l1, f2.id(), l2, f3.id(), l3));
            }
        }
    }

    covered
}

/// Compute the reduction rate relative to the full cartesian product.
#[must_use]
pub fn reduction_rate(total_combinations: u64, case_count: usize) -> f64 {
    if total_combinations == 0 {
        return 0.0;
    }
    let avoided = total_combinations.saturating_sub(case_count as u64);
    round2(avoided as f64 / total_combinations as f64 * 100.0)
}

/// Round a rate to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Quality grade for a coverage rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Quality {
    /// Coverage rate of 95% or better.
    Excellent,
    /// Coverage rate of 85% or better.
    Good,
    /// Coverage rate of 70% or better.
    Fair,
    /// Coverage rate of 50% or better.
    Poor,
    /// Coverage rate below 50%.
    Bad,
}

impl Quality {
    /// A short human-readable description of the grade.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Excellent => "excellent coverage",
            Self::Good => "good coverage",
            Self::Fair => "fair coverage",
            Self::Poor => "poor coverage",
            Self::Bad => "bad coverage",
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
            Self::Bad => "bad",
        };
        write!(f, "{name}")
    }
}

/// Bucket a coverage rate (percentage) into a quality grade.
///
/// The thresholds are a fixed contract: excellent ≥ 95, good ≥ 85,
/// fair ≥ 70, poor ≥ 50, bad below that.
#[must_use]
pub fn evaluate_quality(coverage_rate: f64) -> Quality {
    if coverage_rate >= 95.0 {
        Quality::Excellent
    } else if coverage_rate >= 85.0 {
        Quality::Good
    } else if coverage_rate >= 70.0 {
        Quality::Fair
    } else if coverage_rate >= 50.0 {
        Quality::Poor
    } else {
        Quality::Bad
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor::{CaseId, FactorId};
    use std::collections::BTreeMap;

    fn factors2x2() -> Vec<Factor> {
        vec![
            Factor::new(FactorId::new(0), "A", ["a1", "a2"]),
            Factor::new(FactorId::new(1), "B", ["b1", "b2"]),
        ]
    }

    fn case(id: u64, assignments: &[(FactorId, &str)]) -> TestCase {
        let mut combos = BTreeMap::new();
        for (factor, level) in assignments {
            combos.insert(*factor, (*level).to_string());
        }
        TestCase::new(CaseId::new(id), combos)
    }

    #[test]
    fn test_pairwise_coverage_full() {
        let factors = factors2x2();
        let (a, b) = (factors[0].id(), factors[1].id());
        let cases = vec![
            case(0, &[(a, "a1"), (b, "b1")]),
            case(1, &[(a, "a1"), (b, "b2")]),
            case(2, &[(a, "a2"), (b, "b1")]),
            case(3, &[(a, "a2"), (b, "b2")]),
        ];

        let cov = pairwise_coverage(&cases, &factors);
        assert_eq!(cov.total_pairs, 4);
        assert_eq!(cov.covered_pairs, 4);
        assert_eq!(cov.uncovered_pairs, 0);
        assert!((cov.coverage_rate - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pairwise_coverage_partial() {
        let factors = factors2x2();
        let (a, b) = (factors[0].id(), factors[1].id());
        let cases = vec![case(0, &[(a, "a1"), (b, "b1")])];

        let cov = pairwise_coverage(&cases, &factors);
        assert_eq!(cov.covered_pairs, 1);
        assert_eq!(cov.uncovered_pairs, 3);
        assert!((cov.coverage_rate - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_threeway_coverage() {
        let factors = vec![
            Factor::new(FactorId::new(0), "A", ["a1", "a2"]),
            Factor::new(FactorId::new(1), "B", ["b1", "b2"]),
            Factor::new(FactorId::new(2), "C", ["c1", "c2"]),
        ];
        let (a, b, c) = (factors[0].id(), factors[1].id(), factors[2].id());
        let cases = vec![case(0, &[(a, "a1"), (b, "b1"), (c, "c1")])];

        let cov = threeway_coverage(&cases, &factors);
        assert_eq!(cov.total_triples, 8);
        assert_eq!(cov.covered_triples, 1);
        assert!((cov.coverage_rate - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_report_is_pure() {
        let factors = factors2x2();
        let (a, b) = (factors[0].id(), factors[1].id());
        let cases = vec![
            case(0, &[(a, "a1"), (b, "b1")]),
            case(1, &[(a, "a2"), (b, "b2")]),
        ];

        let first = report(&cases, &factors, Algorithm::Pairwise);
        let second = report(&cases, &factors, Algorithm::Pairwise);
        assert_eq!(first, second);
    }

    #[test]
    fn test_report_fields() {
        let factors = factors2x2();
        let (a, b) = (factors[0].id(), factors[1].id());
        let cases = vec![
            case(0, &[(a, "a1"), (b, "b1")]),
            case(1, &[(a, "a2"), (b, "b2")]),
        ];

        let rep = report(&cases, &factors, Algorithm::Pairwise);
        assert_eq!(rep.case_count, 2);
        assert_eq!(rep.factor_count, 2);
        assert_eq!(rep.total_combinations, 4);
        assert!((rep.reduction_rate - 50.0).abs() < f64::EPSILON);
        assert!((rep.efficiency - 2.0).abs() < f64::EPSILON);
        assert!(rep.pairwise.is_some());
        assert!(rep.threeway.is_none());
        assert!(!rep.is_complete()); // 2 of 4 pairs covered
    }

    #[test]
    fn test_coverage_insensitive_to_factor_order() {
        let factors = factors2x2();
        let (a, b) = (factors[0].id(), factors[1].id());
        let cases = vec![
            case(0, &[(a, "a1"), (b, "b1")]),
            case(1, &[(a, "a2"), (b, "b2")]),
        ];

        let mut reversed = factors.clone();
        reversed.reverse();

        let forward = pairwise_coverage(&cases, &factors);
        let backward = pairwise_coverage(&cases, &reversed);
        assert_eq!(forward.covered_pairs, backward.covered_pairs);
        assert_eq!(forward.total_pairs, backward.total_pairs);
    }

    #[test]
    fn test_quality_buckets() {
        assert_eq!(evaluate_quality(100.0), Quality::Excellent);
        assert_eq!(evaluate_quality(95.0), Quality::Excellent);
        assert_eq!(evaluate_quality(94.99), Quality::Good);
        assert_eq!(evaluate_quality(85.0), Quality::Good);
        assert_eq!(evaluate_quality(84.99), Quality::Fair);
        assert_eq!(evaluate_quality(70.0), Quality::Fair);
        assert_eq!(evaluate_quality(69.99), Quality::Poor);
        assert_eq!(evaluate_quality(50.0), Quality::Poor);
        assert_eq!(evaluate_quality(49.99), Quality::Bad);
        assert_eq!(evaluate_quality(0.0), Quality::Bad);
    }

    #[test]
    fn test_reduction_rate() {
        assert!((reduction_rate(100, 10) - 90.0).abs() < f64::EPSILON);
        assert!((reduction_rate(0, 10)).abs() < f64::EPSILON);
        // More cases than combinations never goes negative.
        assert!((reduction_rate(5, 10)).abs() < f64::EPSILON);
    }
}
