//! Pre-computed tables of `f(i + delta)` over small counts.
//!
//! Every score in the sampler is a log of a count plus a constant
//! (`ln(beta + n)`, `ln(beta * V + n)`, ...). Counts are mostly small, so
//! the first `len` values are evaluated once and looked up afterwards;
//! anything beyond falls back to direct evaluation.

use special::Gamma as SpecialGamma;

/// Memoized `f(i + delta)` for non-negative integer `i`.
#[derive(Debug, Clone)]
pub struct PrecomputedTable {
    func: fn(f64) -> f64,
    delta: f64,
    values: Vec<f64>,
}

fn ln(x: f64) -> f64 {
    x.ln()
}

fn ln_gamma(x: f64) -> f64 {
    SpecialGamma::ln_gamma(x).0
}

impl PrecomputedTable {
    /// Tabulate `func(i + delta)` for `i` in `0..len`.
    pub fn new(len: usize, func: fn(f64) -> f64, delta: f64) -> Self {
        let values = (0..len).map(|i| func(i as f64 + delta)).collect();
        PrecomputedTable {
            func,
            delta,
            values,
        }
    }

    /// `ln(i + delta)`. With `delta == 0`, `value(0)` is `-inf`.
    pub fn ln(len: usize, delta: f64) -> Self {
        Self::new(len, ln, delta)
    }

    /// `ln Γ(i + delta)`; requires `delta > 0`.
    pub fn ln_gamma(len: usize, delta: f64) -> Self {
        Self::new(len, ln_gamma, delta)
    }

    /// `func(i + delta)`, from the table when `i < len`
    #[inline]
    pub fn value(&self, i: usize) -> f64 {
        match self.values.get(i) {
            Some(&v) => v,
            None => (self.func)(i as f64 + self.delta),
        }
    }

    /// Shift added to every integer argument
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Number of memoized entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if nothing is memoized
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_ln_inside_and_outside_memo() {
        let table = PrecomputedTable::ln(8, 0.5);
        assert_eq!(table.len(), 8);
        for i in 0..20 {
            assert_abs_diff_eq!(table.value(i), (i as f64 + 0.5).ln(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_ln_zero_count() {
        let table = PrecomputedTable::ln(4, 0.0);
        assert_eq!(table.value(0), f64::NEG_INFINITY);
        assert_abs_diff_eq!(table.value(1), 0.0);
    }

    #[test]
    fn test_ln_gamma_matches_factorials() {
        // ln Γ(i + 1) = ln(i!)
        let table = PrecomputedTable::ln_gamma(3, 1.0);
        let mut fact = 1.0_f64;
        for i in 0..10 {
            if i > 0 {
                fact *= i as f64;
            }
            assert_abs_diff_eq!(table.value(i), fact.ln(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_empty_table_falls_back() {
        let table = PrecomputedTable::ln(0, 2.0);
        assert!(table.is_empty());
        assert_abs_diff_eq!(table.value(3), 5.0_f64.ln());
    }
}
