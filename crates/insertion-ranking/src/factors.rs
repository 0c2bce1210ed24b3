//! Sort-key vectors and the comparator that orders them.

use std::cmp::Ordering;

use crate::constants::MAX_FACTOR;

/// Fixed-capacity vector of sort factors. Unused trailing slots are `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SortKey {
    factors: [f64; MAX_FACTOR],
}

impl SortKey {
    /// Builds a key from up to [`MAX_FACTOR`] leading factors.
    ///
    /// # Panics
    ///
    /// Panics if more than [`MAX_FACTOR`] factors are given.
    pub fn new(factors: &[f64]) -> Self {
        assert!(
            factors.len() <= MAX_FACTOR,
            "at most {MAX_FACTOR} factors, got {}",
            factors.len()
        );
        let mut key = Self::default();
        key.factors[..factors.len()].copy_from_slice(factors);
        key
    }

    /// Returns a copy with the 0-based `slot` replaced.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= MAX_FACTOR`.
    pub fn with(mut self, slot: usize, factor: f64) -> Self {
        self.factors[slot] = factor;
        self
    }

    /// The factor at a 0-based `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= MAX_FACTOR`.
    #[inline]
    pub fn get(&self, slot: usize) -> f64 {
        self.factors[slot]
    }

    /// The first `arity` factors.
    #[inline]
    pub fn leading(&self, arity: usize) -> &[f64] {
        &self.factors[..arity]
    }

    pub fn as_slice(&self) -> &[f64; MAX_FACTOR] {
        &self.factors
    }
}

/// Compares the first `arity` factors of two keys, first slot most
/// significant.
///
/// Factors compare the way `<` and `>` do, so `-0.0` equals `0.0`. NaN is
/// not ordered; collections refuse NaN factors before they reach here.
///
/// # Panics
///
/// Panics if `arity` is zero: no factor has been set yet, so there is
/// nothing to order by.
pub fn compare(a: &SortKey, b: &SortKey, arity: usize) -> Ordering {
    assert!(arity > 0, "compare before any factor was set");
    for (x, y) in a.leading(arity).iter().zip(b.leading(arity)) {
        if x > y {
            return Ordering::Greater;
        }
        if x < y {
            return Ordering::Less;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_with_zero() {
        let key = SortKey::new(&[3.0, 1.0]);
        assert_eq!(key.as_slice(), &[3.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn lexicographic() {
        let a = SortKey::new(&[1.0, 5.0]);
        let b = SortKey::new(&[1.0, 7.0]);
        let c = SortKey::new(&[2.0, 0.0]);
        assert_eq!(compare(&a, &b, 2), Ordering::Less);
        assert_eq!(compare(&c, &b, 2), Ordering::Greater);
        assert_eq!(compare(&a, &b, 1), Ordering::Equal);
    }

    #[test]
    fn only_leading_slots_count() {
        let a = SortKey::new(&[1.0, 0.0, 9.0]);
        let b = SortKey::new(&[1.0]);
        assert_eq!(compare(&a, &b, 2), Ordering::Equal);
        assert_eq!(compare(&a, &b, 3), Ordering::Greater);
    }

    #[test]
    fn negative_zero_equals_zero() {
        let a = SortKey::new(&[-0.0]);
        let b = SortKey::new(&[0.0]);
        assert_eq!(compare(&a, &b, 1), Ordering::Equal);
    }

    #[test]
    fn with_replaces_one_slot() {
        let key = SortKey::new(&[1.0, 2.0]).with(1, 8.0);
        assert_eq!(key.leading(2), &[1.0, 8.0]);
    }

    #[test]
    #[should_panic(expected = "compare before any factor was set")]
    fn zero_arity_panics() {
        compare(&SortKey::default(), &SortKey::default(), 0);
    }

    #[test]
    #[should_panic]
    fn slot_past_max_factor_panics() {
        SortKey::default().get(MAX_FACTOR);
    }

    #[test]
    #[should_panic]
    fn too_many_factors_panics() {
        SortKey::new(&[0.0; MAX_FACTOR + 1]);
    }
}
