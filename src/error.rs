//! Error types for the covgen library.
//!
//! This module provides comprehensive error handling using the `thiserror` crate,
//! with specific error variants for factor validation, generation preconditions,
//! and resource budget gates.

use thiserror::Error;

use crate::factor::FactorDefect;

/// The main error type for the covgen library.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ============ Validation Errors ============
    /// One or more factors failed validation.
    ///
    /// Every offending factor is enumerated so a caller can present the
    /// full list of problems at once.
    #[error("factor validation failed: {}", format_defects(.defects))]
    Validation {
        /// The per-factor validation reports, one per offending factor.
        defects: Vec<FactorDefect>,
    },

    /// Too few factors were supplied for the requested algorithm.
    #[error("{algorithm} generation requires at least {required} factors, got {actual}")]
    InsufficientFactors {
        /// Minimum number of factors the algorithm needs.
        required: usize,
        /// Number of factors actually supplied.
        actual: usize,
        /// Name of the generation algorithm.
        algorithm: &'static str,
    },

    /// A request was malformed in a way not tied to a single factor.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Description of what is invalid.
        message: String,
    },

    /// An algorithm name could not be parsed.
    #[error("unknown algorithm {name:?} (expected pairwise, threeway, or allcombinations)")]
    UnknownAlgorithm {
        /// The unrecognized name.
        name: String,
    },

    // ============ Resource Budget Errors ============
    /// The pre-flight memory estimate exceeded the algorithm's fixed budget.
    ///
    /// This gate has no override for the covering-array generators.
    #[error(
        "{algorithm} generation would need an estimated {estimated_bytes} bytes, \
         exceeding the {limit_bytes} byte budget"
    )]
    MemoryBudgetExceeded {
        /// Estimated bytes the generation would require.
        estimated_bytes: u64,
        /// The fixed budget for this algorithm.
        limit_bytes: u64,
        /// Name of the generation algorithm.
        algorithm: &'static str,
    },

    /// Exhaustive generation refused an oversized cartesian product.
    ///
    /// Unlike [`Error::MemoryBudgetExceeded`], this gate can be bypassed by
    /// passing `force_generate = true`.
    #[error("{message}")]
    DatasetTooLarge {
        /// Total number of combinations that would be produced.
        total_combinations: u64,
        /// Estimated bytes the materialized result would require.
        estimated_bytes: u64,
        /// The warning message describing the refusal.
        message: String,
    },
}

/// A specialized `Result` type for covgen operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Create a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }
}

fn format_defects(defects: &[FactorDefect]) -> String {
    let parts: Vec<String> = defects.iter().map(ToString::to_string).collect();
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor::FactorIssue;

    #[test]
    fn test_error_display() {
        let err = Error::InsufficientFactors {
            required: 2,
            actual: 1,
            algorithm: "pairwise",
        };
        assert!(err.to_string().contains("pairwise"));
        assert!(err.to_string().contains("at least 2"));
        assert!(err.to_string().contains("got 1"));

        let err = Error::MemoryBudgetExceeded {
            estimated_bytes: 600,
            limit_bytes: 500,
            algorithm: "threeway",
        };
        assert!(err.to_string().contains("600"));
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("threeway"));
    }

    #[test]
    fn test_validation_enumerates_all_factors() {
        let err = Error::Validation {
            defects: vec![
                FactorDefect {
                    name: "Browser".to_string(),
                    issues: vec![FactorIssue::TooFewLevels { count: 1 }],
                },
                FactorDefect {
                    name: "OS".to_string(),
                    issues: vec![FactorIssue::EmptyName],
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("Browser"));
        assert!(msg.contains("OS"));
    }

    #[test]
    fn test_error_equality() {
        let err1 = Error::invalid_request("no algorithm");
        let err2 = Error::invalid_request("no algorithm");
        let err3 = Error::invalid_request("other");

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
