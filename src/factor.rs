//! Factors, levels, and test cases — the data model for suite generation.
//!
//! ## Overview
//!
//! - [`Factor`]: a named variable under test with an ordered set of levels
//! - [`FactorSet`]: a caller-owned collection that allocates factor ids
//! - [`TestCase`]: one assignment of a level to every factor
//!
//! A generation call consumes a slice of validated factors and produces a
//! batch of test cases. Factors are never mutated by generators; partially
//! built test cases are cloned and extended rather than modified in place.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opaque identifier for a [`Factor`].
///
/// The ordering of ids defines the canonical factor-identity order used by
/// pair and triple keys, so coverage results are insensitive to the order in
/// which factors happen to be traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FactorId(u32);

impl FactorId {
    /// Create a factor id from a raw value.
    #[must_use]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw id value.
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FactorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

/// Opaque identifier for a [`TestCase`].
///
/// Ids are allocated sequentially by the generation call that creates the
/// batch; there is no process-wide counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CaseId(u64);

impl CaseId {
    /// Create a case id from a raw value.
    #[must_use]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id value.
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "case{}", self.0)
    }
}

/// A named variable under test together with its ordered levels.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Factor {
    id: FactorId,
    name: String,
    levels: Vec<String>,
}

impl Factor {
    /// Create a new factor.
    ///
    /// The factor is not validated on construction; call [`Factor::validate`]
    /// or [`validate_all`] before handing it to a generator.
    #[must_use]
    pub fn new<N, L, S>(id: FactorId, name: N, levels: L) -> Self
    where
        N: Into<String>,
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            name: name.into(),
            levels: levels.into_iter().map(Into::into).collect(),
        }
    }

    /// Get the factor id.
    #[must_use]
    pub fn id(&self) -> FactorId {
        self.id
    }

    /// Get the factor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the ordered levels.
    #[must_use]
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// Get the number of levels.
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Get the level at an index.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    #[must_use]
    pub fn level(&self, index: usize) -> &str {
        &self.levels[index]
    }

    /// Find the index of a level value, if it belongs to this factor.
    #[must_use]
    pub fn level_index(&self, level: &str) -> Option<usize> {
        self.levels.iter().position(|l| l == level)
    }

    /// Check this factor against the data-model invariants.
    ///
    /// Returns every problem found: an empty name, fewer than two levels,
    /// duplicated levels (compared exactly as given), and blank levels.
    #[must_use]
    pub fn validate(&self) -> Vec<FactorIssue> {
        let mut issues = Vec::new();

        if self.name.trim().is_empty() {
            issues.push(FactorIssue::EmptyName);
        }

        if self.levels.len() < 2 {
            issues.push(FactorIssue::TooFewLevels {
                count: self.levels.len(),
            });
        }

        let mut seen = HashSet::new();
        for level in &self.levels {
            if !seen.insert(level.as_str()) {
                issues.push(FactorIssue::DuplicateLevel {
                    level: level.clone(),
                });
            }
        }

        for (index, level) in self.levels.iter().enumerate() {
            if level.trim().is_empty() {
                issues.push(FactorIssue::EmptyLevel { index });
            }
        }

        issues
    }

    /// Check whether the factor passes validation.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [{}]", self.name, self.levels.join(", "))
    }
}

/// A single problem found while validating one factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactorIssue {
    /// The factor name is empty or blank.
    EmptyName,
    /// The factor has fewer than two levels.
    TooFewLevels {
        /// Number of levels the factor actually has.
        count: usize,
    },
    /// A level value appears more than once.
    DuplicateLevel {
        /// The repeated level value.
        level: String,
    },
    /// A level value is empty or blank.
    EmptyLevel {
        /// Position of the blank level.
        index: usize,
    },
}

impl fmt::Display for FactorIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "factor name must not be empty"),
            Self::TooFewLevels { count } => {
                write!(f, "minimum 2 levels required, got {count}")
            }
            Self::DuplicateLevel { level } => {
                write!(f, "duplicate levels: {level:?} appears more than once")
            }
            Self::EmptyLevel { index } => {
                write!(f, "level at index {index} is empty")
            }
        }
    }
}

/// All validation problems found for a single factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorDefect {
    /// Name of the offending factor.
    pub name: String,
    /// Every issue found on that factor.
    pub issues: Vec<FactorIssue>,
}

impl fmt::Display for FactorDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let issues: Vec<String> = self.issues.iter().map(ToString::to_string).collect();
        write!(f, "factor {:?}: {}", self.name, issues.join(", "))
    }
}

/// Validate every factor in a slice, collecting all defects.
///
/// # Errors
///
/// Returns [`Error::Validation`] enumerating every offending factor if any
/// factor fails its invariants.
pub fn validate_all(factors: &[Factor]) -> Result<()> {
    let defects: Vec<FactorDefect> = factors
        .iter()
        .filter_map(|factor| {
            let issues = factor.validate();
            if issues.is_empty() {
                None
            } else {
                Some(FactorDefect {
                    name: factor.name().to_string(),
                    issues,
                })
            }
        })
        .collect();

    if defects.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation { defects })
    }
}

/// An ordered, caller-owned collection of factors.
///
/// `FactorSet` owns the id counter, so factor-id allocation is explicit
/// per-collection state rather than a process-wide global.
///
/// # Example
///
/// ```
/// use covgen::FactorSet;
///
/// let mut factors = FactorSet::new();
/// factors.add("Browser", ["Chrome", "Firefox", "Safari"]);
/// factors.add("OS", ["Windows", "Mac"]);
///
/// assert_eq!(factors.len(), 2);
/// assert!(covgen::validate_all(factors.as_slice()).is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FactorSet {
    factors: Vec<Factor>,
    next_id: u32,
}

impl FactorSet {
    /// Create an empty factor set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a factor, allocating the next id in sequence.
    pub fn add<N, L, S>(&mut self, name: N, levels: L) -> FactorId
    where
        N: Into<String>,
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = FactorId::new(self.next_id);
        self.next_id += 1;
        self.factors.push(Factor::new(id, name, levels));
        id
    }

    /// Get the factors as a slice, in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[Factor] {
        &self.factors
    }

    /// Get the number of factors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Check whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Look up a factor by id.
    #[must_use]
    pub fn get(&self, id: FactorId) -> Option<&Factor> {
        self.factors.iter().find(|f| f.id() == id)
    }

    /// Validate every factor in the set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if any factor fails its invariants.
    pub fn validate_all(&self) -> Result<()> {
        validate_all(&self.factors)
    }
}

impl<'a> IntoIterator for &'a FactorSet {
    type Item = &'a Factor;
    type IntoIter = std::slice::Iter<'a, Factor>;

    fn into_iter(self) -> Self::IntoIter {
        self.factors.iter()
    }
}

/// One complete assignment of a level to every factor under test.
///
/// Test cases are created by generators; intermediate cases are cloned and
/// extended (copy-on-extend), so earlier snapshots stay valid while later
/// stages grow the suite.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TestCase {
    id: CaseId,
    combinations: BTreeMap<FactorId, String>,
}

impl TestCase {
    /// Create a test case from an id and a factor-to-level mapping.
    #[must_use]
    pub fn new(id: CaseId, combinations: BTreeMap<FactorId, String>) -> Self {
        Self { id, combinations }
    }

    /// Get the case id.
    #[must_use]
    pub fn id(&self) -> CaseId {
        self.id
    }

    /// Get the level assigned to a factor, if any.
    #[must_use]
    pub fn level(&self, factor: FactorId) -> Option<&str> {
        self.combinations.get(&factor).map(String::as_str)
    }

    /// Assign a level to a factor, replacing any previous assignment.
    pub fn set_level(&mut self, factor: FactorId, level: impl Into<String>) {
        self.combinations.insert(factor, level.into());
    }

    /// Get the full factor-to-level mapping.
    #[must_use]
    pub fn combinations(&self) -> &BTreeMap<FactorId, String> {
        &self.combinations
    }

    /// Check that every given factor has exactly one assignment and that the
    /// assigned value belongs to that factor's level set.
    #[must_use]
    pub fn is_complete_for(&self, factors: &[Factor]) -> bool {
        factors.iter().all(|factor| {
            self.level(factor.id())
                .is_some_and(|level| factor.level_index(level).is_some())
        })
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .combinations
            .iter()
            .map(|(factor, level)| format!("{factor}={level}"))
            .collect();
        write!(f, "TestCase[{}]", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factor(id: u32, name: &str, levels: &[&str]) -> Factor {
        Factor::new(FactorId::new(id), name, levels.iter().copied())
    }

    #[test]
    fn test_factor_accessors() {
        let f = factor(0, "Browser", &["Chrome", "Firefox"]);
        assert_eq!(f.name(), "Browser");
        assert_eq!(f.level_count(), 2);
        assert_eq!(f.level(1), "Firefox");
        assert_eq!(f.level_index("Chrome"), Some(0));
        assert_eq!(f.level_index("Edge"), None);
        assert!(f.is_valid());
    }

    #[test]
    fn test_single_level_is_invalid() {
        let f = factor(0, "Browser", &["Chrome"]);
        let issues = f.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].to_string().contains("minimum 2 levels"));
    }

    #[test]
    fn test_duplicate_levels_are_invalid() {
        let f = factor(0, "Browser", &["Chrome", "Firefox", "Chrome"]);
        let issues = f.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].to_string().contains("duplicate levels"));
    }

    #[test]
    fn test_blank_name_and_level() {
        let f = factor(0, "  ", &["Chrome", " "]);
        let issues = f.validate();
        assert!(issues.contains(&FactorIssue::EmptyName));
        assert!(issues.contains(&FactorIssue::EmptyLevel { index: 1 }));
    }

    #[test]
    fn test_levels_are_compared_as_given() {
        // Case and whitespace distinguish levels.
        let f = factor(0, "Browser", &["chrome", "Chrome", "chrome "]);
        assert!(f.is_valid());
    }

    #[test]
    fn test_validate_all_collects_every_factor() {
        let factors = vec![
            factor(0, "A", &["1", "2"]),
            factor(1, "B", &["1"]),
            factor(2, "", &["x", "x"]),
        ];

        let err = validate_all(&factors).unwrap_err();
        match err {
            Error::Validation { defects } => {
                assert_eq!(defects.len(), 2);
                assert_eq!(defects[0].name, "B");
                assert_eq!(defects[1].issues.len(), 2);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_factor_set_allocates_sequential_ids() {
        let mut set = FactorSet::new();
        let a = set.add("A", ["1", "2"]);
        let b = set.add("B", ["x", "y"]);

        assert_ne!(a, b);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(a).unwrap().name(), "A");
        assert_eq!(set.as_slice()[1].id(), b);
    }

    #[test]
    fn test_test_case_roundtrip() {
        let f1 = FactorId::new(0);
        let f2 = FactorId::new(1);
        let mut combos = BTreeMap::new();
        combos.insert(f1, "Chrome".to_string());

        let mut case = TestCase::new(CaseId::new(0), combos);
        assert_eq!(case.level(f1), Some("Chrome"));
        assert_eq!(case.level(f2), None);

        case.set_level(f2, "Windows");
        assert_eq!(case.level(f2), Some("Windows"));
    }

    #[test]
    fn test_is_complete_for() {
        let factors = vec![
            factor(0, "A", &["1", "2"]),
            factor(1, "B", &["x", "y"]),
        ];

        let mut case = TestCase::new(CaseId::new(0), BTreeMap::new());
        assert!(!case.is_complete_for(&factors));

        case.set_level(factors[0].id(), "1");
        case.set_level(factors[1].id(), "y");
        assert!(case.is_complete_for(&factors));

        // A value outside the factor's level set is not a valid assignment.
        case.set_level(factors[1].id(), "z");
        assert!(!case.is_complete_for(&factors));
    }

    #[test]
    fn test_display() {
        let f = factor(0, "Browser", &["Chrome", "Firefox"]);
        assert_eq!(format!("{f}"), "Browser: [Chrome, Firefox]");
    }
}
