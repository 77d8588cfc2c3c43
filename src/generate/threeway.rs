//! 3-way covering-array generation.
//!
//! The generator seeds its suite with a pairwise covering array (2-way
//! coverage comes for free), then greedily appends rows that cover as many
//! still-unrealized factor/level triples as possible. Candidate rows come
//! from bounded random search; when a whole sampling round realizes nothing
//! new, a deterministic constructor pins one uncovered triple directly so
//! the round still makes progress.
//!
//! Both the per-row sample budget and the overall iteration budget are
//! fixed, so generation terminates even when full 3-way coverage is out of
//! reach; any shortfall is visible in the coverage report.

use std::collections::HashSet;

use log::{debug, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::coverage::{self, ThreeWayCoverage};
use crate::error::{Error, Result};
use crate::factor::{validate_all, Factor, TestCase};
use crate::generate::pairwise::{self, random_row, Row};
use crate::generate::{Algorithm, Generator, DEFAULT_SEED};
use crate::utils::total_combinations;

/// Fixed memory budget for 3-way generation. No override exists.
const MEMORY_LIMIT_BYTES: u64 = 1024 * 1024 * 1024;

/// Upper bound on greedy iterations appending rows.
pub(crate) const MAX_ITERATIONS: usize = 1000;

/// Upper bound on random candidates tried per iteration.
pub(crate) const SAMPLE_BUDGET: usize = 2000;

/// A candidate covering this many new triples is good enough to stop the
/// current sampling round early.
const EARLY_EXIT_SCORE: usize = 10;

/// Estimated bytes per materialized test case, object overhead included.
const BYTES_PER_CASE: u64 = 200;

/// Estimated bytes per tracked triple.
const BYTES_PER_TRIPLE: u64 = 150;

/// An unrealized triple:
/// `(factor i, factor j, factor k, level of i, level of j, level of k)`
/// with `i < j < k` factor positions.
pub(crate) type IndexTriple = (usize, usize, usize, usize, usize, usize);

/// Greedy 3-way covering-array generator.
///
/// # Example
///
/// ```
/// use covgen::generate::ThreeWayGenerator;
/// use covgen::FactorSet;
///
/// let mut factors = FactorSet::new();
/// factors.add("A", ["a1", "a2"]);
/// factors.add("B", ["b1", "b2"]);
/// factors.add("C", ["c1", "c2"]);
///
/// let generator = ThreeWayGenerator::new();
/// let cases = generator.generate(factors.as_slice()).unwrap();
///
/// let report = generator.calculate_coverage(&cases, factors.as_slice());
/// assert_eq!(report.triples.coverage_rate, 100.0);
/// ```
#[derive(Debug, Clone)]
pub struct ThreeWayGenerator {
    seed: u64,
}

impl Default for ThreeWayGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreeWayGenerator {
    /// Create a generator with the default seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Create a generator with an explicit seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    /// Get the seed this generator samples with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a 3-way covering suite for the given factors.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - fewer than 3 factors are supplied
    /// - any factor fails validation (every offending factor is listed)
    /// - the pre-flight memory estimate exceeds the 1 GB budget
    /// - the embedded pairwise seeding stage is refused by its own gate
    pub fn generate(&self, factors: &[Factor]) -> Result<Vec<TestCase>> {
        preflight(factors)?;

        debug!(
            "threeway generation started: {} factors, seed {}",
            factors.len(),
            self.seed
        );

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut rows = pairwise::ipog(factors, &mut rng);

        let mut remaining = all_triples(factors);
        let total_triples = remaining.len();
        for row in &rows {
            remove_covered(&mut remaining, row);
        }

        debug!(
            "seeded with {} pairwise rows; {} of {} triples remaining",
            rows.len(),
            remaining.len(),
            total_triples
        );

        let max_iterations = MAX_ITERATIONS.min(remaining.len());
        for iteration in 0..max_iterations {
            if remaining.is_empty() {
                break;
            }

            let row = match best_candidate(factors, &remaining, &mut rng) {
                Some(row) => row,
                // Random search found nothing; pin an uncovered triple.
                None => pinned_row(factors, &remaining, &mut rng),
            };

            let removed = remove_covered(&mut remaining, &row);
            rows.push(row);

            debug!(
                "iteration {}: covered {} triples, {} remaining",
                iteration + 1,
                removed,
                remaining.len()
            );

            if removed == 0 {
                break;
            }
        }

        if !remaining.is_empty() {
            warn!(
                "threeway budget exhausted: {} of {} triples uncovered",
                remaining.len(),
                total_triples
            );
        }

        debug!("threeway generation finished: {} cases", rows.len());

        Ok(pairwise::rows_to_cases(factors, rows))
    }

    /// Estimate the working-set size of a 3-way generation in bytes.
    ///
    /// Counts every triple the factors define plus the expected test cases,
    /// then doubles the sum: the triple bookkeeping carries roughly 100%
    /// structural overhead.
    #[must_use]
    pub fn estimate_memory_usage(&self, factors: &[Factor]) -> u64 {
        estimate_memory(factors)
    }

    /// Summarize 3-way coverage of an existing suite over the factors.
    #[must_use]
    pub fn calculate_coverage(&self, cases: &[TestCase], factors: &[Factor]) -> ThreeWayReport {
        let total = total_combinations(factors);
        ThreeWayReport {
            triples: coverage::threeway_coverage(cases, factors),
            case_count: cases.len(),
            total_combinations: total,
            reduction_rate: coverage::reduction_rate(total, cases.len()),
        }
    }
}

impl Generator for ThreeWayGenerator {
    fn name(&self) -> &'static str {
        "ThreeWayGenerator"
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::ThreeWay
    }

    fn generate(&self, factors: &[Factor]) -> Result<Vec<TestCase>> {
        ThreeWayGenerator::generate(self, factors)
    }
}

/// Coverage summary returned by [`ThreeWayGenerator::calculate_coverage`].
#[derive(Debug, Clone, PartialEq)]
pub struct ThreeWayReport {
    /// The 3-way coverage figures.
    pub triples: ThreeWayCoverage,
    /// Number of test cases measured.
    pub case_count: usize,
    /// Size of the full cartesian product.
    pub total_combinations: u64,
    /// Share of the cartesian product avoided, as a percentage.
    pub reduction_rate: f64,
}

/// Run the 3-way preconditions: factor count, validation, the 1 GB gate,
/// and the embedded pairwise stage's own gate.
pub(crate) fn preflight(factors: &[Factor]) -> Result<()> {
    if factors.len() < 3 {
        return Err(Error::InsufficientFactors {
            required: 3,
            actual: factors.len(),
            algorithm: "threeway",
        });
    }

    validate_all(factors)?;

    let estimated_bytes = estimate_memory(factors);
    if estimated_bytes > MEMORY_LIMIT_BYTES {
        return Err(Error::MemoryBudgetExceeded {
            estimated_bytes,
            limit_bytes: MEMORY_LIMIT_BYTES,
            algorithm: "threeway",
        });
    }

    // The seeding stage is a full pairwise run, gates included.
    pairwise::preflight(factors)
}

fn estimate_memory(factors: &[Factor]) -> u64 {
    if factors.is_empty() {
        return 0;
    }

    let mut total_triples: u64 = 0;
    for i in 0..factors.len() {
        for j in (i + 1)..factors.len() {
            for k in (j + 1)..factors.len() {
                let product = factors[i].level_count() as u64
                    * factors[j].level_count() as u64
                    * factors[k].level_count() as u64;
                total_triples = total_triples.saturating_add(product);
            }
        }
    }

    let max_levels = factors
        .iter()
        .map(|f| f.level_count() as u64)
        .max()
        .unwrap_or(0);
    let estimated_cases = total_triples.min(
        max_levels
            .saturating_mul(max_levels)
            .saturating_mul(max_levels),
    );

    let base = estimated_cases
        .saturating_mul(BYTES_PER_CASE)
        .saturating_add(total_triples.saturating_mul(BYTES_PER_TRIPLE));
    base.saturating_mul(2)
}

/// Enumerate every factor/level triple as position-indexed tuples.
pub(crate) fn all_triples(factors: &[Factor]) -> HashSet<IndexTriple> {
    let mut triples = HashSet::new();

    for i in 0..factors.len() {
        for j in (i + 1)..factors.len() {
            for k in (j + 1)..factors.len() {
                for li in 0..factors[i].level_count() {
                    for lj in 0..factors[j].level_count() {
                        for lk in 0..factors[k].level_count() {
                            triples.insert((i, j, k, li, lj, lk));
                        }
                    }
                }
            }
        }
    }

    triples
}

/// Count how many of the remaining triples a row realizes.
pub(crate) fn score_row(row: &Row, remaining: &HashSet<IndexTriple>) -> usize {
    let n = row.len();
    let mut count = 0;

    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                if remaining.contains(&(i, j, k, row[i], row[j], row[k])) {
                    count += 1;
                }
            }
        }
    }

    count
}

/// Remove the triples a row realizes, returning how many were removed.
pub(crate) fn remove_covered(remaining: &mut HashSet<IndexTriple>, row: &Row) -> usize {
    let n = row.len();
    let mut removed = 0;

    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                if remaining.remove(&(i, j, k, row[i], row[j], row[k])) {
                    removed += 1;
                }
            }
        }
    }

    removed
}

/// Bounded random search for the row covering the most remaining triples.
///
/// Returns `None` when no sampled candidate covers anything new. Ties keep
/// the first-found candidate; the sampling order is fixed by the seeded RNG
/// stream, so the pick is reproducible.
fn best_candidate(
    factors: &[Factor],
    remaining: &HashSet<IndexTriple>,
    rng: &mut ChaCha8Rng,
) -> Option<Row> {
    let max_attempts = SAMPLE_BUDGET.min(remaining.len().saturating_mul(10));
    let good_enough = EARLY_EXIT_SCORE.min(remaining.len());

    let mut best: Option<Row> = None;
    let mut best_score = 0usize;

    for _ in 0..max_attempts {
        let candidate = random_row(factors, rng);
        let score = score_row(&candidate, remaining);

        if score > best_score {
            best_score = score;
            best = Some(candidate);
        }

        if score >= good_enough {
            break;
        }
    }

    best
}

/// Deterministic fallback: fix the smallest uncovered triple's assignments
/// and fill every other factor at random.
pub(crate) fn pinned_row(
    factors: &[Factor],
    remaining: &HashSet<IndexTriple>,
    rng: &mut ChaCha8Rng,
) -> Row {
    let &(i, j, k, li, lj, lk) = remaining
        .iter()
        .min()
        .expect("fallback requires at least one uncovered triple");

    factors
        .iter()
        .enumerate()
        .map(|(position, factor)| {
            if position == i {
                li
            } else if position == j {
                lj
            } else if position == k {
                lk
            } else {
                rng.gen_range(0..factor.level_count())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor::FactorSet;

    fn binary_factors(count: usize) -> FactorSet {
        let mut factors = FactorSet::new();
        for i in 0..count {
            factors.add(format!("f{i}"), ["0", "1"]);
        }
        factors
    }

    #[test]
    fn test_two_factors_is_rejected() {
        let factors = binary_factors(2);
        let err = ThreeWayGenerator::new()
            .generate(factors.as_slice())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientFactors {
                required: 3,
                actual: 2,
                algorithm: "threeway",
            }
        ));
    }

    #[test]
    fn test_invalid_factor_is_rejected() {
        let mut factors = FactorSet::new();
        factors.add("A", ["a1", "a2"]);
        factors.add("B", ["b1", "b1"]);
        factors.add("C", ["c1", "c2"]);

        let err = ThreeWayGenerator::new()
            .generate(factors.as_slice())
            .unwrap_err();
        assert!(err.to_string().contains("duplicate levels"));
    }

    #[test]
    fn test_four_binary_factors_reach_full_coverage() {
        let factors = binary_factors(4);
        let generator = ThreeWayGenerator::new();
        let cases = generator.generate(factors.as_slice()).unwrap();

        // Strictly fewer rows than the 16-row cartesian product.
        assert!(cases.len() < 16);
        for case in &cases {
            assert!(case.is_complete_for(factors.as_slice()));
        }

        let report = generator.calculate_coverage(&cases, factors.as_slice());
        assert_eq!(report.triples.total_triples, 32);
        assert!((report.triples.coverage_rate - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_three_factors_cover_every_triple() {
        // With exactly three factors the triples are the whole space, so the
        // iteration budget equal to the remaining count guarantees 100%.
        let mut factors = FactorSet::new();
        factors.add("A", ["a1", "a2"]);
        factors.add("B", ["b1", "b2", "b3"]);
        factors.add("C", ["c1", "c2"]);

        let generator = ThreeWayGenerator::new();
        let cases = generator.generate(factors.as_slice()).unwrap();

        let report = generator.calculate_coverage(&cases, factors.as_slice());
        assert_eq!(report.triples.total_triples, 12);
        assert!((report.triples.coverage_rate - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_same_seed_reproduces_suite() {
        let factors = binary_factors(5);

        let first = ThreeWayGenerator::with_seed(7)
            .generate(factors.as_slice())
            .unwrap();
        let second = ThreeWayGenerator::with_seed(7)
            .generate(factors.as_slice())
            .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_memory_gate() {
        // Three 150-level factors define 3.4 million triples, past 1 GB.
        let mut factors = FactorSet::new();
        let levels: Vec<String> = (0..150).map(|i| format!("l{i}")).collect();
        factors.add("A", levels.clone());
        factors.add("B", levels.clone());
        factors.add("C", levels);

        let err = ThreeWayGenerator::new()
            .generate(factors.as_slice())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MemoryBudgetExceeded {
                algorithm: "threeway",
                ..
            }
        ));
    }

    #[test]
    fn test_pinned_row_fixes_the_triple() {
        let factors = binary_factors(5);
        let mut remaining = HashSet::new();
        remaining.insert((0, 2, 4, 1, 0, 1));

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let row = pinned_row(factors.as_slice(), &remaining, &mut rng);

        assert_eq!(row.len(), 5);
        assert_eq!(row[0], 1);
        assert_eq!(row[2], 0);
        assert_eq!(row[4], 1);
    }

    #[test]
    fn test_suite_keeps_pairwise_coverage() {
        let factors = binary_factors(4);
        let cases = ThreeWayGenerator::new()
            .generate(factors.as_slice())
            .unwrap();

        let pairs = coverage::pairwise_coverage(&cases, factors.as_slice());
        assert!((pairs.coverage_rate - 100.0).abs() < f64::EPSILON);
    }
}
