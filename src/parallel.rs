//! Parallel candidate scoring for the covering-array generators.
//!
//! This module provides parallel versions of the greedy generators using
//! Rayon. Enable with the `parallel` feature flag.
//!
//! Candidate sampling is embarrassingly parallel: every trial in a round is
//! scored independently, and only the arg-max reduction and the shrinking
//! uncovered set are shared. Each trial derives its own `ChaCha8Rng` from
//! the master seed, the round counter, and its trial index, so there are no
//! RNG races and results are a deterministic function of the seed. The
//! reduction keeps the highest score with the lowest trial index, which
//! preserves first-found tie-breaking.
//!
//! Two behavioral differences from the sequential generators:
//!
//! - a sampling round always evaluates its full budget instead of exiting
//!   early once a good-enough candidate appears, so parallel suites can
//!   differ (and occasionally improve) row by row
//! - the odometer enumeration of the exhaustive generator is untouched; its
//!   strict ordering guarantee leaves nothing useful to parallelize
//!
//! # Usage
//!
//! ```
//! use covgen::parallel::ParPairwiseGenerator;
//! use covgen::FactorSet;
//!
//! let mut factors = FactorSet::new();
//! factors.add("Browser", ["Chrome", "Firefox", "Safari"]);
//! factors.add("OS", ["Windows", "Mac"]);
//!
//! let cases = ParPairwiseGenerator::new().generate(factors.as_slice()).unwrap();
//! assert_eq!(cases.len(), 6);
//! ```

use std::cmp::Reverse;
use std::collections::HashSet;

use log::{debug, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::error::Result;
use crate::factor::{Factor, TestCase};
use crate::generate::pairwise::{
    self, cover_row, random_row, rows_to_cases, sample_budget, seed_rows, uncovered_stage_pairs,
    Row, StagePair,
};
use crate::generate::threeway;
use crate::generate::{Algorithm, Generator, DEFAULT_SEED};

/// Derive the RNG seed for one trial of one sampling round.
fn child_seed(master: u64, round: u64, index: u64) -> u64 {
    master
        .wrapping_add(round.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(index.wrapping_mul(0xC2B2_AE3D_27D4_EB4F))
}

/// Parallel pairwise covering-array generator.
///
/// Same contract and gates as
/// [`PairwiseGenerator`](crate::generate::PairwiseGenerator); the vertical
/// growth step scores its candidate budget with Rayon.
#[derive(Debug, Clone)]
pub struct ParPairwiseGenerator {
    seed: u64,
}

impl Default for ParPairwiseGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ParPairwiseGenerator {
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

    /// Generate a pairwise covering suite for the given factors.
    ///
    /// # Errors
    ///
    /// Returns the same errors as the sequential generator: insufficient
    /// factors, validation failures, or the 500 MB memory gate.
    pub fn generate(&self, factors: &[Factor]) -> Result<Vec<TestCase>> {
        pairwise::preflight(factors)?;

        debug!(
            "parallel pairwise generation started: {} factors, seed {}",
            factors.len(),
            self.seed
        );

        let rows = par_ipog(factors, self.seed);

        debug!("parallel pairwise generation finished: {} cases", rows.len());

        Ok(rows_to_cases(factors, rows))
    }
}

impl Generator for ParPairwiseGenerator {
    fn name(&self) -> &'static str {
        "ParPairwiseGenerator"
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::Pairwise
    }

    fn generate(&self, factors: &[Factor]) -> Result<Vec<TestCase>> {
        ParPairwiseGenerator::generate(self, factors)
    }
}

/// Parallel 3-way covering-array generator.
///
/// Same contract and gates as
/// [`ThreeWayGenerator`](crate::generate::ThreeWayGenerator); both the
/// pairwise seeding stage and the triple-covering rounds score their
/// candidates with Rayon.
#[derive(Debug, Clone)]
pub struct ParThreeWayGenerator {
    seed: u64,
}

impl Default for ParThreeWayGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ParThreeWayGenerator {
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

    /// Generate a 3-way covering suite for the given factors.
    ///
    /// # Errors
    ///
    /// Returns the same errors as the sequential generator: insufficient
    /// factors, validation failures, or the memory gates.
    pub fn generate(&self, factors: &[Factor]) -> Result<Vec<TestCase>> {
        threeway::preflight(factors)?;

        debug!(
            "parallel threeway generation started: {} factors, seed {}",
            factors.len(),
            self.seed
        );

        let mut rows = par_ipog(factors, self.seed);

        let mut remaining = threeway::all_triples(factors);
        let total_triples = remaining.len();
        for row in &rows {
            threeway::remove_covered(&mut remaining, row);
        }

        debug!(
            "seeded with {} pairwise rows; {} of {} triples remaining",
            rows.len(),
            remaining.len(),
            total_triples
        );

        // Triple rounds draw child seeds from the upper half of the round
        // space so they never collide with the seeding stage's rounds.
        let mut round = u64::MAX / 2;
        let max_iterations = threeway::MAX_ITERATIONS.min(remaining.len());
        for _ in 0..max_iterations {
            if remaining.is_empty() {
                break;
            }
            round += 1;

            let row = match par_best_triple_row(factors, &remaining, self.seed, round) {
                Some(row) => row,
                None => {
                    let mut rng =
                        ChaCha8Rng::seed_from_u64(child_seed(self.seed, round, u64::MAX));
                    threeway::pinned_row(factors, &remaining, &mut rng)
                }
            };

            let removed = threeway::remove_covered(&mut remaining, &row);
            rows.push(row);

            if removed == 0 {
                break;
            }
        }

        if !remaining.is_empty() {
            warn!(
                "parallel threeway budget exhausted: {} of {} triples uncovered",
                remaining.len(),
                total_triples
            );
        }

        debug!("parallel threeway generation finished: {} cases", rows.len());

        Ok(rows_to_cases(factors, rows))
    }
}

impl Generator for ParThreeWayGenerator {
    fn name(&self) -> &'static str {
        "ParThreeWayGenerator"
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::ThreeWay
    }

    fn generate(&self, factors: &[Factor]) -> Result<Vec<TestCase>> {
        ParThreeWayGenerator::generate(self, factors)
    }
}

/// IPOG construction with parallel vertical-candidate scoring.
fn par_ipog(factors: &[Factor], master_seed: u64) -> Vec<Row> {
    let mut rows = seed_rows(&factors[0], &factors[1]);
    let mut round: u64 = 0;

    for new_ix in 2..factors.len() {
        rows = rows
            .iter()
            .map(|row| {
                let mut extended = row.clone();
                extended.push(0);
                extended
            })
            .collect();

        let mut uncovered = uncovered_stage_pairs(&rows, factors, new_ix);
        let in_play = &factors[..=new_ix];
        let budget = sample_budget(in_play);

        while !uncovered.is_empty() {
            round += 1;
            match par_best_pair_row(in_play, new_ix, &uncovered, budget, master_seed, round) {
                Some(row) => {
                    cover_row(&mut uncovered, &row, new_ix);
                    rows.push(row);
                }
                None => {
                    warn!(
                        "parallel pairwise growth stalled adding factor {:?}: {} pairs uncovered",
                        factors[new_ix].name(),
                        uncovered.len()
                    );
                    break;
                }
            }
        }
    }

    rows
}

/// Score one round's budget of pairwise candidates in parallel.
fn par_best_pair_row(
    factors: &[Factor],
    new_ix: usize,
    uncovered: &HashSet<StagePair>,
    budget: u64,
    master_seed: u64,
    round: u64,
) -> Option<Row> {
    (0..budget)
        .into_par_iter()
        .map(|index| {
            let mut rng = ChaCha8Rng::seed_from_u64(child_seed(master_seed, round, index));
            let row = random_row(factors, &mut rng);
            let score = pairwise::score_row(&row, uncovered, new_ix);
            (score, index, row)
        })
        .filter(|(score, _, _)| *score > 0)
        .min_by_key(|(score, index, _)| (Reverse(*score), *index))
        .map(|(_, _, row)| row)
}

/// Score one round's budget of 3-way candidates in parallel.
fn par_best_triple_row(
    factors: &[Factor],
    remaining: &HashSet<threeway::IndexTriple>,
    master_seed: u64,
    round: u64,
) -> Option<Row> {
    let budget = threeway::SAMPLE_BUDGET.min(remaining.len().saturating_mul(10)) as u64;

    (0..budget)
        .into_par_iter()
        .map(|index| {
            let mut rng = ChaCha8Rng::seed_from_u64(child_seed(master_seed, round, index));
            let row = random_row(factors, &mut rng);
            let score = threeway::score_row(&row, remaining);
            (score, index, row)
        })
        .filter(|(score, _, _)| *score > 0)
        .min_by_key(|(score, index, _)| (Reverse(*score), *index))
        .map(|(_, _, row)| row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage;
    use crate::error::Error;
    use crate::factor::FactorSet;

    fn binary_factors(count: usize) -> FactorSet {
        let mut factors = FactorSet::new();
        for i in 0..count {
            factors.add(format!("f{i}"), ["0", "1"]);
        }
        factors
    }

    #[test]
    fn test_par_pairwise_two_factors() {
        let mut factors = FactorSet::new();
        factors.add("Browser", ["Chrome", "Firefox", "Safari"]);
        factors.add("OS", ["Windows", "Mac"]);

        let cases = ParPairwiseGenerator::new()
            .generate(factors.as_slice())
            .unwrap();
        assert_eq!(cases.len(), 6);

        let pairs = coverage::pairwise_coverage(&cases, factors.as_slice());
        assert!((pairs.coverage_rate - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_par_pairwise_is_reproducible() {
        let factors = binary_factors(5);

        let first = ParPairwiseGenerator::with_seed(11)
            .generate(factors.as_slice())
            .unwrap();
        let second = ParPairwiseGenerator::with_seed(11)
            .generate(factors.as_slice())
            .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_par_pairwise_keeps_gates() {
        let mut factors = FactorSet::new();
        factors.add("A", ["a1", "a2"]);

        let err = ParPairwiseGenerator::new()
            .generate(factors.as_slice())
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientFactors { .. }));
    }

    #[test]
    fn test_par_threeway_four_binary_factors() {
        let factors = binary_factors(4);
        let cases = ParThreeWayGenerator::new()
            .generate(factors.as_slice())
            .unwrap();

        assert!(cases.len() < 16);
        let triples = coverage::threeway_coverage(&cases, factors.as_slice());
        assert!((triples.coverage_rate - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_par_threeway_keeps_gates() {
        let factors = binary_factors(2);
        let err = ParThreeWayGenerator::new()
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
    fn test_par_threeway_is_reproducible() {
        let factors = binary_factors(5);

        let first = ParThreeWayGenerator::with_seed(23)
            .generate(factors.as_slice())
            .unwrap();
        let second = ParThreeWayGenerator::with_seed(23)
            .generate(factors.as_slice())
            .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_sequential_and_parallel_both_cover() {
        use crate::generate::PairwiseGenerator;

        let mut factors = FactorSet::new();
        factors.add("A", ["a1", "a2", "a3"]);
        factors.add("B", ["b1", "b2"]);
        factors.add("C", ["c1", "c2", "c3"]);

        let seq = PairwiseGenerator::with_seed(5)
            .generate(factors.as_slice())
            .unwrap();
        let par = ParPairwiseGenerator::with_seed(5)
            .generate(factors.as_slice())
            .unwrap();

        let seq_cov = coverage::pairwise_coverage(&seq, factors.as_slice());
        let par_cov = coverage::pairwise_coverage(&par, factors.as_slice());
        assert!((seq_cov.coverage_rate - 100.0).abs() < f64::EPSILON);
        assert!((par_cov.coverage_rate - 100.0).abs() < f64::EPSILON);
    }
}
