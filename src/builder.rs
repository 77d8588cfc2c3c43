//! Builder for generating a suite together with its coverage report.
//!
//! The builder is the one-call boundary for callers that just want test
//! cases: pick an algorithm, optionally pin a seed or bypass the exhaustive
//! size gate, and receive the generated cases plus a [`CoverageReport`].
//!
//! # Example
//!
//! ```
//! use covgen::{Algorithm, FactorSet, SuiteBuilder};
//!
//! let mut factors = FactorSet::new();
//! factors.add("Browser", ["Chrome", "Firefox", "Safari"]);
//! factors.add("OS", ["Windows", "Mac"]);
//!
//! let suite = SuiteBuilder::new()
//!     .algorithm(Algorithm::Pairwise)
//!     .generate(factors.as_slice())
//!     .unwrap();
//!
//! assert_eq!(suite.cases.len(), 6);
//! assert!(suite.coverage.is_complete());
//! ```

use crate::coverage::{self, CoverageReport};
use crate::error::{Error, Result};
use crate::factor::{Factor, TestCase};
use crate::generate::{
    Algorithm, AllCombinationsGenerator, PairwiseGenerator, ThreeWayGenerator, DEFAULT_SEED,
};

/// A generated suite together with its coverage report.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSuite {
    /// The generated test cases, in construction order.
    pub cases: Vec<TestCase>,
    /// Coverage analytics over the cases and their factors.
    pub coverage: CoverageReport,
}

/// Builder selecting and configuring a generation algorithm.
///
/// # Example
///
/// ```
/// use covgen::{Algorithm, FactorSet, SuiteBuilder};
///
/// let mut factors = FactorSet::new();
/// factors.add("A", ["a1", "a2"]);
/// factors.add("B", ["b1", "b2"]);
/// factors.add("C", ["c1", "c2"]);
///
/// // Seeded three-way generation.
/// let suite = SuiteBuilder::new()
///     .algorithm(Algorithm::ThreeWay)
///     .seed(42)
///     .generate(factors.as_slice())
///     .unwrap();
///
/// assert!(suite.coverage.threeway.is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SuiteBuilder {
    algorithm: Option<Algorithm>,
    seed: Option<u64>,
    force_generate: bool,
}

impl SuiteBuilder {
    /// Create a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the generation algorithm.
    #[must_use]
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Set the seed for the covering-array generators.
    ///
    /// Ignored by [`Algorithm::AllCombinations`], which is deterministic.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Bypass the exhaustive generator's size-warning gate.
    ///
    /// Only meaningful for [`Algorithm::AllCombinations`]; the covering-array
    /// memory budgets cannot be overridden.
    #[must_use]
    pub fn force_generate(mut self, force: bool) -> Self {
        self.force_generate = force;
        self
    }

    /// Generate the suite and compute its coverage report.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - no algorithm was specified
    /// - the selected generator rejects the factors (count, validation, or
    ///   size/memory gates)
    pub fn generate(&self, factors: &[Factor]) -> Result<GeneratedSuite> {
        let algorithm = self
            .algorithm
            .ok_or_else(|| Error::invalid_request("algorithm must be specified"))?;
        let seed = self.seed.unwrap_or(DEFAULT_SEED);

        let cases = match algorithm {
            Algorithm::Pairwise => PairwiseGenerator::with_seed(seed).generate(factors)?,
            Algorithm::ThreeWay => ThreeWayGenerator::with_seed(seed).generate(factors)?,
            Algorithm::AllCombinations => {
                AllCombinationsGenerator::new().generate(factors, self.force_generate)?
            }
        };

        let coverage = coverage::report(&cases, factors, algorithm);

        Ok(GeneratedSuite { cases, coverage })
    }
}

/// Convenience function to generate a suite with default settings.
///
/// This is a shorthand for using the builder.
///
/// # Example
///
/// ```
/// use covgen::{generate_suite, Algorithm, FactorSet};
///
/// let mut factors = FactorSet::new();
/// factors.add("F1", ["A", "B"]);
/// factors.add("F2", ["X", "Y"]);
///
/// let suite = generate_suite(factors.as_slice(), Algorithm::AllCombinations).unwrap();
/// assert_eq!(suite.cases.len(), 4);
/// ```
///
/// # Errors
///
/// Returns an error if the selected generator rejects the factors.
pub fn generate_suite(factors: &[Factor], algorithm: Algorithm) -> Result<GeneratedSuite> {
    SuiteBuilder::new().algorithm(algorithm).generate(factors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor::FactorSet;

    fn three_factors() -> FactorSet {
        let mut factors = FactorSet::new();
        factors.add("A", ["a1", "a2"]);
        factors.add("B", ["b1", "b2"]);
        factors.add("C", ["c1", "c2"]);
        factors
    }

    #[test]
    fn test_missing_algorithm_is_rejected() {
        let factors = three_factors();
        let err = SuiteBuilder::new().generate(factors.as_slice()).unwrap_err();
        assert!(err.to_string().contains("algorithm"));
    }

    #[test]
    fn test_pairwise_suite() {
        let factors = three_factors();
        let suite = SuiteBuilder::new()
            .algorithm(Algorithm::Pairwise)
            .generate(factors.as_slice())
            .unwrap();

        assert_eq!(suite.coverage.algorithm, Algorithm::Pairwise);
        assert_eq!(suite.coverage.case_count, suite.cases.len());
        assert!(suite.coverage.pairwise.is_some());
    }

    #[test]
    fn test_all_combinations_suite() {
        let factors = three_factors();
        let suite = generate_suite(factors.as_slice(), Algorithm::AllCombinations).unwrap();

        assert_eq!(suite.cases.len(), 8);
        assert!(suite.coverage.is_complete());
        assert!((suite.coverage.reduction_rate - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_threeway_suite() {
        let mut factors = three_factors();
        factors.add("D", ["d1", "d2"]);

        let suite = SuiteBuilder::new()
            .algorithm(Algorithm::ThreeWay)
            .seed(3)
            .generate(factors.as_slice())
            .unwrap();

        let threeway = suite.coverage.threeway.as_ref().unwrap();
        assert!((threeway.coverage_rate - 100.0).abs() < f64::EPSILON);
        assert!(suite.coverage.is_complete());
    }

    #[test]
    fn test_force_generate_is_passed_through() {
        // 117,649 combinations: refused without force.
        let mut factors = FactorSet::new();
        for i in 0..6 {
            factors.add(format!("f{i}"), (0..7).map(|j| format!("l{j}")));
        }

        let gated = SuiteBuilder::new()
            .algorithm(Algorithm::AllCombinations)
            .generate(factors.as_slice());
        assert!(matches!(gated, Err(Error::DatasetTooLarge { .. })));

        let forced = SuiteBuilder::new()
            .algorithm(Algorithm::AllCombinations)
            .force_generate(true)
            .generate(factors.as_slice())
            .unwrap();
        assert_eq!(forced.cases.len(), 117_649);
    }

    #[test]
    fn test_same_seed_same_suite() {
        let factors = three_factors();

        let first = SuiteBuilder::new()
            .algorithm(Algorithm::Pairwise)
            .seed(99)
            .generate(factors.as_slice())
            .unwrap();
        let second = SuiteBuilder::new()
            .algorithm(Algorithm::Pairwise)
            .seed(99)
            .generate(factors.as_slice())
            .unwrap();

        assert_eq!(first.cases, second.cases);
        assert_eq!(first.coverage, second.coverage);
    }
}
