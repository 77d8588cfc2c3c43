//! Exhaustive cartesian-product generation.
//!
//! Unlike the covering-array generators, enumeration here is exact and
//! fully deterministic: factors advance in caller-supplied order with the
//! *last* factor varying fastest, like a mechanical odometer. The same
//! ordering is available in two forms:
//!
//! - eager: [`AllCombinationsGenerator::generate`] materializes the whole
//!   suite, guarded by a size-warning gate
//! - lazy: [`AllCombinationsGenerator::iter`] streams test cases one at a
//!   time from a [`CartesianIter`], suitable for arbitrarily large spaces
//!
//! The eager path drains the lazy iterator, so both forms emit rows in
//! identical order by construction.

use std::collections::BTreeMap;

use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::factor::{validate_all, CaseId, Factor, FactorId, TestCase};
use crate::generate::{Algorithm, Generator};
use crate::utils::{format_bytes, total_combinations};

/// Estimated fixed overhead per materialized test case in bytes.
const BYTES_PER_CASE_OVERHEAD: u64 = 200;

/// Memory estimate above which a warning fires even for modest row counts.
const MEMORY_WARNING_BYTES: u64 = 100 * 1024 * 1024;

/// Exhaustive cartesian-product generator.
///
/// # Example
///
/// ```
/// use covgen::generate::AllCombinationsGenerator;
/// use covgen::FactorSet;
///
/// let mut factors = FactorSet::new();
/// factors.add("F1", ["A", "B"]);
/// factors.add("F2", ["X", "Y"]);
///
/// let generator = AllCombinationsGenerator::new();
/// let cases = generator.generate(factors.as_slice(), false).unwrap();
///
/// // Last factor varies fastest: AX, AY, BX, BY.
/// assert_eq!(cases.len(), 4);
/// let f2 = factors.as_slice()[1].id();
/// assert_eq!(cases[0].level(f2), Some("X"));
/// assert_eq!(cases[1].level(f2), Some("Y"));
/// ```
#[derive(Debug, Clone)]
pub struct AllCombinationsGenerator {
    /// Row count above which generation is worth a warning.
    max_safe_combinations: u64,
    /// Row count above which generation is refused outright (sans force).
    max_warning_combinations: u64,
}

impl Default for AllCombinationsGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl AllCombinationsGenerator {
    /// Create a generator with the standard size thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_safe_combinations: 100_000,
            max_warning_combinations: 1_000_000,
        }
    }

    /// Compute the total size of the cartesian product, saturating at
    /// `u64::MAX` instead of overflowing.
    #[must_use]
    pub fn calculate_total_combinations(&self, factors: &[Factor]) -> u64 {
        total_combinations(factors)
    }

    /// Estimate the memory a materialized suite of `total` rows would need.
    #[must_use]
    pub fn estimate_memory_usage(&self, total: u64, factors: &[Factor]) -> MemoryEstimate {
        if factors.is_empty() {
            return MemoryEstimate {
                bytes: 0,
                bytes_per_case: 0,
            };
        }

        let avg_level_len: f64 = factors
            .iter()
            .map(|factor| {
                let total_len: usize = factor.levels().iter().map(String::len).sum();
                total_len as f64 / factor.level_count() as f64
            })
            .sum::<f64>()
            / factors.len() as f64;

        // Level strings plus per-case structure overhead.
        let bytes_per_case =
            (avg_level_len * factors.len() as f64 * 2.0) as u64 + BYTES_PER_CASE_OVERHEAD;

        MemoryEstimate {
            bytes: total.saturating_mul(bytes_per_case),
            bytes_per_case,
        }
    }

    /// Classify a prospective generation into a warning tier.
    ///
    /// Returns `None` when the job is comfortably sized, a
    /// [`WarningLevel::Warning`] for large-but-feasible jobs, and a
    /// [`WarningLevel::Critical`] refusal for row counts past a million.
    #[must_use]
    pub fn check_large_dataset_warning(
        &self,
        total: u64,
        estimate: &MemoryEstimate,
    ) -> Option<DatasetWarning> {
        if total > self.max_warning_combinations {
            Some(DatasetWarning {
                level: WarningLevel::Critical,
                message: format!(
                    "combination count {total} is far past the safe limit; \
                     estimated memory usage {}",
                    format_bytes(estimate.bytes)
                ),
            })
        } else if total > self.max_safe_combinations {
            Some(DatasetWarning {
                level: WarningLevel::Warning,
                message: format!(
                    "combination count {total} is large; generation may take a while; \
                     estimated memory usage {}",
                    format_bytes(estimate.bytes)
                ),
            })
        } else if estimate.bytes > MEMORY_WARNING_BYTES {
            Some(DatasetWarning {
                level: WarningLevel::Warning,
                message: format!(
                    "estimated memory usage {} is large; generation may take a while",
                    format_bytes(estimate.bytes)
                ),
            })
        } else {
            None
        }
    }

    /// Materialize the full cartesian product as a suite.
    ///
    /// Rows are emitted in odometer order: factors in caller-supplied
    /// order, the last factor varying fastest.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - no factors are supplied
    /// - any factor fails validation (every offending factor is listed)
    /// - the size gate fires and `force_generate` is false
    pub fn generate(&self, factors: &[Factor], force_generate: bool) -> Result<Vec<TestCase>> {
        if factors.is_empty() {
            return Err(Error::InsufficientFactors {
                required: 1,
                actual: 0,
                algorithm: "allcombinations",
            });
        }

        validate_all(factors)?;

        let total = self.calculate_total_combinations(factors);
        let estimate = self.estimate_memory_usage(total, factors);

        debug!(
            "allcombinations generation started: {} factors, {} rows, ~{}",
            factors.len(),
            total,
            format_bytes(estimate.bytes)
        );

        if !force_generate {
            if let Some(warning) = self.check_large_dataset_warning(total, &estimate) {
                return Err(Error::DatasetTooLarge {
                    total_combinations: total,
                    estimated_bytes: estimate.bytes,
                    message: warning.message,
                });
            }
        }

        let cases: Vec<TestCase> = self.iter(factors).collect();

        debug!("allcombinations generation finished: {} cases", cases.len());

        Ok(cases)
    }

    /// Stream the cartesian product lazily, in the same order as
    /// [`AllCombinationsGenerator::generate`].
    ///
    /// The iterator's only state is its current index vector, so callers
    /// can consume arbitrarily large spaces in fixed-size chunks without
    /// materializing the whole result.
    #[must_use]
    pub fn iter<'a>(&self, factors: &'a [Factor]) -> CartesianIter<'a> {
        CartesianIter::new(factors)
    }

    /// Size up a prospective generation without running it.
    #[must_use]
    pub fn pre_check(&self, factors: &[Factor]) -> PreCheck {
        let total = self.calculate_total_combinations(factors);
        let memory = self.estimate_memory_usage(total, factors);
        let warning = self.check_large_dataset_warning(total, &memory);
        let can_generate = warning
            .as_ref()
            .is_none_or(|w| w.level != WarningLevel::Critical);
        let recommendation = recommendation(total, factors.len());

        PreCheck {
            total_combinations: total,
            memory,
            warning,
            can_generate,
            recommendation,
        }
    }

    /// Summarize coverage of an exhaustively generated suite.
    ///
    /// Exhaustive output always has a 100% coverage rate and no reduction;
    /// the interesting field is `is_complete`, which confirms the case
    /// count matches the full product.
    #[must_use]
    pub fn calculate_coverage(&self, cases: &[TestCase], factors: &[Factor]) -> ExhaustiveReport {
        let total = self.calculate_total_combinations(factors);
        ExhaustiveReport {
            total_combinations: total,
            case_count: cases.len(),
            coverage_rate: 100.0,
            reduction_rate: 0.0,
            is_complete: cases.len() as u64 == total,
        }
    }
}

impl Generator for AllCombinationsGenerator {
    fn name(&self) -> &'static str {
        "AllCombinationsGenerator"
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::AllCombinations
    }

    fn generate(&self, factors: &[Factor]) -> Result<Vec<TestCase>> {
        AllCombinationsGenerator::generate(self, factors, false)
    }
}

/// Memory estimate for a materialized exhaustive suite.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MemoryEstimate {
    /// Estimated total bytes.
    pub bytes: u64,
    /// Estimated bytes per test case.
    pub bytes_per_case: u64,
}

impl MemoryEstimate {
    /// Human-readable form of the total estimate.
    #[must_use]
    pub fn formatted(&self) -> String {
        format_bytes(self.bytes)
    }
}

/// Severity of a large-dataset warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WarningLevel {
    /// Large but feasible; expect elevated time and memory.
    Warning,
    /// Past the refusal threshold.
    Critical,
}

/// A large-dataset warning with a presentable message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DatasetWarning {
    /// Severity tier.
    pub level: WarningLevel,
    /// Message describing the size and its consequences.
    pub message: String,
}

/// Result of sizing up a generation before running it.
#[derive(Debug, Clone, PartialEq)]
pub struct PreCheck {
    /// Total rows the cartesian product would contain.
    pub total_combinations: u64,
    /// Estimated memory for the materialized result.
    pub memory: MemoryEstimate,
    /// The warning tier, if any.
    pub warning: Option<DatasetWarning>,
    /// Whether `generate` would proceed without `force_generate`.
    pub can_generate: bool,
    /// A suggestion for which algorithm suits this input.
    pub recommendation: String,
}

/// Coverage summary returned by
/// [`AllCombinationsGenerator::calculate_coverage`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExhaustiveReport {
    /// Size of the full cartesian product.
    pub total_combinations: u64,
    /// Number of test cases measured.
    pub case_count: usize,
    /// Always 100 for exhaustive output.
    pub coverage_rate: f64,
    /// Always 0 for exhaustive output.
    pub reduction_rate: f64,
    /// Whether the case count equals the full product size.
    pub is_complete: bool,
}

fn recommendation(total: u64, factor_count: usize) -> String {
    if total <= 1_000 {
        "the combination count is small; exhaustive generation is a good fit".to_string()
    } else if total <= 10_000 {
        "moderate combination count; consider exhaustive or pairwise generation".to_string()
    } else if total <= 100_000 {
        "large combination count; pairwise generation is recommended".to_string()
    } else if factor_count >= 3 {
        "very large combination count; pairwise or three-way generation is strongly recommended"
            .to_string()
    } else {
        "very large combination count; pairwise generation is strongly recommended".to_string()
    }
}

/// Lazy odometer over the cartesian product of a factor slice.
///
/// Holds one level index per factor; each step emits the current assignment
/// and then increments the indices like an odometer, advancing the last
/// factor first and carrying leftward.
#[derive(Debug, Clone)]
pub struct CartesianIter<'a> {
    factors: &'a [Factor],
    indices: Vec<usize>,
    done: bool,
    next_id: u64,
}

impl<'a> CartesianIter<'a> {
    /// Create an iterator positioned at the first combination.
    #[must_use]
    pub fn new(factors: &'a [Factor]) -> Self {
        Self {
            factors,
            indices: vec![0; factors.len()],
            done: factors.is_empty(),
            next_id: 0,
        }
    }

    /// Advance the index vector; returns false when the space is exhausted.
    fn increment(&mut self) -> bool {
        for i in (0..self.indices.len()).rev() {
            if self.indices[i] + 1 < self.factors[i].level_count() {
                self.indices[i] += 1;
                return true;
            }
            self.indices[i] = 0;
        }
        false
    }
}

impl Iterator for CartesianIter<'_> {
    type Item = TestCase;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let combinations: BTreeMap<FactorId, String> = self
            .factors
            .iter()
            .zip(&self.indices)
            .map(|(factor, &level_ix)| (factor.id(), factor.level(level_ix).to_string()))
            .collect();

        let case = TestCase::new(CaseId::new(self.next_id), combinations);
        self.next_id += 1;

        if !self.increment() {
            self.done = true;
        }

        Some(case)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            let total = total_combinations(self.factors);
            let remaining = total.saturating_sub(self.next_id);
            (0, usize::try_from(remaining).ok())
        }
    }
}
