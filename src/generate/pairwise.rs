//! Pairwise (2-way) covering-array generation.
//!
//! The generator grows the suite one factor at a time, in the style of the
//! IPOG family of algorithms:
//!
//! 1. Seed with the full cross product of the first two factors, which is
//!    both a valid suite and trivially pair-complete for those factors.
//! 2. For each remaining factor: a *horizontal* step extends every existing
//!    row with the factor's first level, then a *vertical* step appends
//!    rows chosen by greedy random search until the new factor's pairs are
//!    covered or the sample budget yields no further progress.
//!
//! The vertical search is bounded, so generation always terminates; a
//! budget exhausted short of full coverage is reported through the coverage
//! rate, not as an error.

use std::collections::{BTreeMap, HashSet};

use log::{debug, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::coverage::{self, PairwiseCoverage};
use crate::error::{Error, Result};
use crate::factor::{validate_all, CaseId, Factor, FactorId, TestCase};
use crate::generate::{Algorithm, Generator, DEFAULT_SEED};
use crate::utils::total_combinations;

/// Fixed memory budget for pairwise generation. No override exists.
const MEMORY_LIMIT_BYTES: u64 = 500 * 1024 * 1024;

/// Upper bound on random candidates tried per appended row.
const SAMPLE_BUDGET: u64 = 1000;

/// Estimated bytes per materialized test case, object overhead included.
const BYTES_PER_CASE: u64 = 200;

/// Estimated bytes per tracked pair.
const BYTES_PER_PAIR: u64 = 100;

/// A row under construction: one level index per factor in play.
pub(crate) type Row = Vec<usize>;

/// An uncovered pair during one growth stage:
/// `(earlier factor index, its level index, new factor's level index)`.
pub(crate) type StagePair = (usize, usize, usize);

/// Greedy pairwise covering-array generator.
///
/// # Example
///
/// ```
/// use covgen::generate::PairwiseGenerator;
/// use covgen::FactorSet;
///
/// let mut factors = FactorSet::new();
/// factors.add("Browser", ["Chrome", "Firefox", "Safari"]);
/// factors.add("OS", ["Windows", "Mac"]);
///
/// let generator = PairwiseGenerator::new();
/// let cases = generator.generate(factors.as_slice()).unwrap();
///
/// // Two factors: the seed cross product is the whole suite.
/// assert_eq!(cases.len(), 6);
///
/// let report = generator.calculate_coverage(&cases, factors.as_slice());
/// assert_eq!(report.pairs.coverage_rate, 100.0);
/// ```
#[derive(Debug, Clone)]
pub struct PairwiseGenerator {
    seed: u64,
}

impl Default for PairwiseGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PairwiseGenerator {
    /// Create a generator with the default seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Create a generator with an explicit seed.
    ///
    /// Suites are a deterministic function of the seed and the input
    /// factors; re-running with the same seed reproduces the same suite.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    /// Get the seed this generator samples with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a pairwise covering suite for the given factors.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - fewer than 2 factors are supplied
    /// - any factor fails validation (every offending factor is listed)
    /// - the pre-flight memory estimate exceeds the 500 MB budget
    pub fn generate(&self, factors: &[Factor]) -> Result<Vec<TestCase>> {
        preflight(factors)?;

        debug!(
            "pairwise generation started: {} factors, seed {}",
            factors.len(),
            self.seed
        );

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let rows = ipog(factors, &mut rng);

        debug!("pairwise generation finished: {} cases", rows.len());

        Ok(rows_to_cases(factors, rows))
    }

    /// Estimate the working-set size of a pairwise generation in bytes.
    ///
    /// The model counts every pair the factors define plus the test cases a
    /// run of this size typically produces, then adds 50% structural
    /// overhead for the surrounding bookkeeping.
    #[must_use]
    pub fn estimate_memory_usage(&self, factors: &[Factor]) -> u64 {
        estimate_memory(factors)
    }

    /// Summarize 2-way coverage of an existing suite over the factors.
    #[must_use]
    pub fn calculate_coverage(&self, cases: &[TestCase], factors: &[Factor]) -> PairwiseReport {
        let total = total_combinations(factors);
        PairwiseReport {
            pairs: coverage::pairwise_coverage(cases, factors),
            case_count: cases.len(),
            total_combinations: total,
            reduction_rate: coverage::reduction_rate(total, cases.len()),
        }
    }
}

impl Generator for PairwiseGenerator {
    fn name(&self) -> &'static str {
        "PairwiseGenerator"
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::Pairwise
    }

    fn generate(&self, factors: &[Factor]) -> Result<Vec<TestCase>> {
        PairwiseGenerator::generate(self, factors)
    }
}

/// Coverage summary returned by [`PairwiseGenerator::calculate_coverage`].
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseReport {
    /// The 2-way coverage figures.
    pub pairs: PairwiseCoverage,
    /// Number of test cases measured.
    pub case_count: usize,
    /// Size of the full cartesian product.
    pub total_combinations: u64,
    /// Share of the cartesian product avoided, as a percentage.
    pub reduction_rate: f64,
}

/// Run the pairwise preconditions: factor count, validation, memory gate.
pub(crate) fn preflight(factors: &[Factor]) -> Result<()> {
    if factors.len() < 2 {
        return Err(Error::InsufficientFactors {
            required: 2,
            actual: factors.len(),
            algorithm: "pairwise",
        });
    }

    validate_all(factors)?;

    let estimated_bytes = estimate_memory(factors);
    if estimated_bytes > MEMORY_LIMIT_BYTES {
        return Err(Error::MemoryBudgetExceeded {
            estimated_bytes,
            limit_bytes: MEMORY_LIMIT_BYTES,
            algorithm: "pairwise",
        });
    }

    Ok(())
}

pub(crate) fn estimate_memory(factors: &[Factor]) -> u64 {
    if factors.is_empty() {
        return 0;
    }

    let mut total_pairs: u64 = 0;
    for i in 0..factors.len() {
        for j in (i + 1)..factors.len() {
            total_pairs = total_pairs.saturating_add(
                factors[i].level_count() as u64 * factors[j].level_count() as u64,
            );
        }
    }

    let max_levels = factors
        .iter()
        .map(|f| f.level_count() as u64)
        .max()
        .unwrap_or(0);
    let estimated_cases = total_pairs.min(max_levels.saturating_mul(max_levels));

    let base = estimated_cases
        .saturating_mul(BYTES_PER_CASE)
        .saturating_add(total_pairs.saturating_mul(BYTES_PER_PAIR));
    base.saturating_add(base / 2)
}

/// Build the covering array as rows of level indices.
///
/// Callers are responsible for the preconditions checked by [`preflight`].
pub(crate) fn ipog(factors: &[Factor], rng: &mut ChaCha8Rng) -> Vec<Row> {
    let mut rows = seed_rows(&factors[0], &factors[1]);
    debug!(
        "initial test set: {} rows ({} x {})",
        rows.len(),
        factors[0].name(),
        factors[1].name()
    );

    for new_ix in 2..factors.len() {
        // Horizontal step: clone-and-extend every row with the first level.
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

        // Vertical step: append greedy best-of-budget rows.
        let before = rows.len();
        while !uncovered.is_empty() {
            let mut best: Option<Row> = None;
            let mut best_score = 0usize;

            for _ in 0..budget {
                let candidate = random_row(in_play, rng);
                let score = score_row(&candidate, &uncovered, new_ix);
                if score > best_score {
                    best_score = score;
                    best = Some(candidate);
                }
                if best_score == uncovered.len() {
                    break;
                }
            }

            match best {
                Some(row) => {
                    cover_row(&mut uncovered, &row, new_ix);
                    rows.push(row);
                }
                None => {
                    warn!(
                        "pairwise growth stalled adding factor {:?}: {} pairs uncovered",
                        factors[new_ix].name(),
                        uncovered.len()
                    );
                    break;
                }
            }
        }

        debug!(
            "factor {:?} added: {} rows ({} appended)",
            factors[new_ix].name(),
            rows.len(),
            rows.len() - before
        );
    }

    rows
}

/// Cross product of the first two factors.
pub(crate) fn seed_rows(first: &Factor, second: &Factor) -> Vec<Row> {
    let mut rows = Vec::with_capacity(first.level_count() * second.level_count());
    for a in 0..first.level_count() {
        for b in 0..second.level_count() {
            rows.push(vec![a, b]);
        }
    }
    rows
}

/// Pairs between the new factor and every earlier factor that the current
/// rows do not yet realize.
pub(crate) fn uncovered_stage_pairs(
    rows: &[Row],
    factors: &[Factor],
    new_ix: usize,
) -> HashSet<StagePair> {
    let mut uncovered = HashSet::new();

    for earlier in 0..new_ix {
        for earlier_level in 0..factors[earlier].level_count() {
            for new_level in 0..factors[new_ix].level_count() {
                uncovered.insert((earlier, earlier_level, new_level));
            }
        }
    }

    for row in rows {
        for earlier in 0..new_ix {
            uncovered.remove(&(earlier, row[earlier], row[new_ix]));
        }
    }

    uncovered
}

/// One complete random assignment over the factors in play.
pub(crate) fn random_row(factors: &[Factor], rng: &mut impl Rng) -> Row {
    factors
        .iter()
        .map(|factor| rng.gen_range(0..factor.level_count()))
        .collect()
}

/// Count how many currently-uncovered pairs a candidate row would realize.
pub(crate) fn score_row(row: &Row, uncovered: &HashSet<StagePair>, new_ix: usize) -> usize {
    (0..new_ix)
        .filter(|&earlier| uncovered.contains(&(earlier, row[earlier], row[new_ix])))
        .count()
}

/// Remove the pairs a row realizes, returning how many were removed.
pub(crate) fn cover_row(uncovered: &mut HashSet<StagePair>, row: &Row, new_ix: usize) -> usize {
    (0..new_ix)
        .filter(|&earlier| uncovered.remove(&(earlier, row[earlier], row[new_ix])))
        .count()
}

/// The per-row sample budget: capped by the size of the assignment space.
pub(crate) fn sample_budget(factors_in_play: &[Factor]) -> u64 {
    SAMPLE_BUDGET.min(total_combinations(factors_in_play))
}

/// Materialize index rows as test cases, in construction order.
pub(crate) fn rows_to_cases(factors: &[Factor], rows: Vec<Row>) -> Vec<TestCase> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            let combinations: BTreeMap<FactorId, String> = factors
                .iter()
                .zip(row)
                .map(|(factor, level_ix)| (factor.id(), factor.level(level_ix).to_string()))
                .collect();
            TestCase::new(CaseId::new(i as u64), combinations)
        })
        .collect()
}
