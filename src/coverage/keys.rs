//! Canonical pair and triple keys.
//!
//! A key is an order-independent fingerprint of two or three
//! `(factor, level)` assignments: the components are stored sorted by factor
//! identity, so the same combination always produces the same key no matter
//! which order the factors were visited in. Keys are derived values — they
//! are recomputed on demand and never persisted.

use std::fmt;

use crate::factor::FactorId;

/// Order-independent fingerprint of a pair of factor/level assignments.
///
/// # Example
///
/// ```
/// use covgen::coverage::PairKey;
/// use covgen::FactorId;
///
/// let a = FactorId::new(0);
/// let b = FactorId::new(1);
///
/// // Component order does not matter.
/// assert_eq!(
///     PairKey::new(a, "Chrome", b, "Windows"),
///     PairKey::new(b, "Windows", a, "Chrome"),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey {
    lo: (FactorId, String),
    hi: (FactorId, String),
}

impl PairKey {
    /// Build the canonical key for two factor/level assignments.
    #[must_use]
    pub fn new(
        factor1: FactorId,
        level1: impl Into<String>,
        factor2: FactorId,
        level2: impl Into<String>,
    ) -> Self {
        let a = (factor1, level1.into());
        let b = (factor2, level2.into());
        if a.0 > b.0 {
            Self { lo: b, hi: a }
        } else {
            Self { lo: a, hi: b }
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}|{}:{}",
            self.lo.0, self.lo.1, self.hi.0, self.hi.1
        )
    }
}

/// Order-independent fingerprint of a triple of factor/level assignments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TripleKey {
    components: [(FactorId, String); 3],
}

impl TripleKey {
    /// Build the canonical key for three factor/level assignments.
    #[must_use]
    pub fn new(
        factor1: FactorId,
        level1: impl Into<String>,
        factor2: FactorId,
        level2: impl Into<String>,
        factor3: FactorId,
        level3: impl Into<String>,
    ) -> Self {
        let mut components = [
            (factor1, level1.into()),
            (factor2, level2.into()),
            (factor3, level3.into()),
        ];
        components.sort_by_key(|(id, _)| *id);
        Self { components }
    }
}

impl fmt::Display for TripleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .components
            .iter()
            .map(|(id, level)| format!("{id}:{level}"))
            .collect();
        write!(f, "{}", parts.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_symmetry() {
        let f1 = FactorId::new(3);
        let f2 = FactorId::new(7);

        let forward = PairKey::new(f1, "Chrome", f2, "Windows");
        let backward = PairKey::new(f2, "Windows", f1, "Chrome");
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_pair_key_distinguishes_levels() {
        let f1 = FactorId::new(0);
        let f2 = FactorId::new(1);

        let a = PairKey::new(f1, "Chrome", f2, "Windows");
        let b = PairKey::new(f1, "Chrome", f2, "Mac");
        assert_ne!(a, b);
    }

    #[test]
    fn test_pair_key_distinguishes_owning_factor() {
        // The same two level strings on swapped factors are different pairs.
        let f1 = FactorId::new(0);
        let f2 = FactorId::new(1);

        let a = PairKey::new(f1, "on", f2, "off");
        let b = PairKey::new(f1, "off", f2, "on");
        assert_ne!(a, b);
    }

    #[test]
    fn test_triple_key_order_independent() {
        let f1 = FactorId::new(0);
        let f2 = FactorId::new(1);
        let f3 = FactorId::new(2);

        let a = TripleKey::new(f1, "x", f2, "y", f3, "z");
        let b = TripleKey::new(f3, "z", f1, "x", f2, "y");
        let c = TripleKey::new(f2, "y", f3, "z", f1, "x");
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_display_is_sorted_by_factor() {
        let key = PairKey::new(FactorId::new(5), "b", FactorId::new(2), "a");
        assert_eq!(key.to_string(), "F2:a|F5:b");

        let key = TripleKey::new(
            FactorId::new(9),
            "c",
            FactorId::new(1),
            "a",
            FactorId::new(4),
            "b",
        );
        assert_eq!(key.to_string(), "F1:a|F4:b|F9:c");
    }
}
