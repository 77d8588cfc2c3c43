//! Utility functions for combinatorics and size accounting.
//!
//! This module provides the fundamental helpers used throughout the library:
//! index-combination enumeration for pair/triple bookkeeping and the
//! saturating combination count that backs every size gate.

use crate::factor::Factor;

/// Compute binomial coefficient C(n, k) = n! / (k! * (n-k)!)
///
/// Returns `None` if the result would overflow `u64`.
///
/// # Examples
///
/// ```
/// use covgen::utils::binomial;
///
/// assert_eq!(binomial(5, 2), Some(10));
/// assert_eq!(binomial(10, 5), Some(252));
/// assert_eq!(binomial(5, 0), Some(1));
/// assert_eq!(binomial(5, 5), Some(1));
/// assert_eq!(binomial(3, 5), Some(0)); // k > n
/// ```
#[must_use]
pub fn binomial(n: u64, k: u64) -> Option<u64> {
    if k > n {
        return Some(0);
    }

    // Use symmetry: C(n, k) = C(n, n-k)
    let k = k.min(n - k);

    if k == 0 {
        return Some(1);
    }

    let mut result: u64 = 1;
    for i in 0..k {
        // result = result * (n - i) / (i + 1)
        // To avoid overflow, we divide as we go
        result = result.checked_mul(n - i)?;
        result /= i + 1;
    }

    Some(result)
}

/// Compute the total size of the cartesian product of the given factors.
///
/// The product of per-factor level counts saturates at `u64::MAX` instead of
/// wrapping. An empty slice has zero combinations.
///
/// # Examples
///
/// ```
/// use covgen::utils::total_combinations;
/// use covgen::FactorSet;
///
/// let mut factors = FactorSet::new();
/// factors.add("A", ["1", "2", "3"]);
/// factors.add("B", ["x", "y"]);
///
/// assert_eq!(total_combinations(factors.as_slice()), 6);
/// ```
#[must_use]
pub fn total_combinations(factors: &[Factor]) -> u64 {
    if factors.is_empty() {
        return 0;
    }

    let mut total: u64 = 1;
    for factor in factors {
        total = total.saturating_mul(factor.level_count() as u64);
    }
    total
}

/// Format a byte count in human-readable 1024-based units.
///
/// # Examples
///
/// ```
/// use covgen::utils::format_bytes;
///
/// assert_eq!(format_bytes(0), "0 B");
/// assert_eq!(format_bytes(2048), "2 KB");
/// assert_eq!(format_bytes(1_572_864), "1.5 MB");
/// ```
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let exponent = (63 - bytes.leading_zeros() as usize) / 10;
    let exponent = exponent.min(UNITS.len() - 1);

    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');

    format!("{} {}", trimmed, UNITS[exponent])
}

/// Generate all k-combinations of indices 0..n.
///
/// Returns an iterator over all ways to choose k items from n items.
///
/// # Examples
///
/// ```
/// use covgen::utils::combinations;
///
/// let combos: Vec<Vec<usize>> = combinations(4, 2).collect();
/// assert_eq!(combos.len(), 6); // C(4,2) = 6
/// assert_eq!(combos[0], vec![0, 1]);
/// assert_eq!(combos[5], vec![2, 3]);
/// ```
pub fn combinations(n: usize, k: usize) -> impl Iterator<Item = Vec<usize>> {
    CombinationIterator::new(n, k)
}

/// Iterator over k-combinations of 0..n.
struct CombinationIterator {
    n: usize,
    k: usize,
    indices: Vec<usize>,
    finished: bool,
}

impl CombinationIterator {
    fn new(n: usize, k: usize) -> Self {
        if k > n || k == 0 {
            return Self {
                n,
                k,
                indices: Vec::new(),
                finished: k > n,
            };
        }

        Self {
            n,
            k,
            indices: (0..k).collect(),
            finished: false,
        }
    }
}

impl Iterator for CombinationIterator {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if self.k == 0 {
            self.finished = true;
            return Some(Vec::new());
        }

        let result = self.indices.clone();

        // Find rightmost index that can be incremented
        let mut i = self.k;
        while i > 0 {
            i -= 1;
            if self.indices[i] < self.n - self.k + i {
                // Increment this index and reset all following indices
                self.indices[i] += 1;
                for j in (i + 1)..self.k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                return Some(result);
            }
        }

        // No more combinations
        self.finished = true;
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            (0, Some(0))
        } else {
            // This is an approximation; exact count would require more computation
            let count =
                binomial(self.n as u64, self.k as u64).unwrap_or(usize::MAX as u64) as usize;
            (0, Some(count))
        }
    }
}
