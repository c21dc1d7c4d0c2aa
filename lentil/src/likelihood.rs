//! Collapsed word log-likelihood, a convergence diagnostic.
//!
//! With the dish-word distributions integrated out under a symmetric
//! Dirichlet(β) prior,
//!
//! ```text
//! ln p(w | z) = Σ_k [ lnΓ(βV) - lnΓ(βV + n_k) + Σ_w ( lnΓ(β + n_kw) - lnΓ(β) ) ]
//! ```

use crate::franchise::FranchiseState;
use crate::precomputed::PrecomputedTable;

/// Evaluates `ln p(w | z)` with memoized ln Γ values.
pub struct WordLikelihood {
    /// `lnΓ(β + n)`
    lgamma_beta: PrecomputedTable,
    /// `lnΓ(βV + n)`
    lgamma_beta_v: PrecomputedTable,
}

impl WordLikelihood {
    /// * `beta` - Dirichlet smoothing per vocabulary entry
    /// * `n_word` - vocabulary size
    /// * `table_size` - memoized entries per ln Γ table
    pub fn new(beta: f64, n_word: usize, table_size: usize) -> Self {
        WordLikelihood {
            lgamma_beta: PrecomputedTable::ln_gamma(table_size, beta),
            lgamma_beta_v: PrecomputedTable::ln_gamma(table_size, beta * n_word as f64),
        }
    }

    /// Sum over dishes of the collapsed word log-likelihood
    pub fn evaluate(&self, state: &FranchiseState) -> f64 {
        let lg_beta0 = self.lgamma_beta.value(0);
        let lg_beta_v0 = self.lgamma_beta_v.value(0);

        state
            .dishes
            .iter()
            .map(|dish| {
                let words: f64 = dish
                    .word_count
                    .iter()
                    .filter(|&&n| n > 0)
                    .map(|&n| self.lgamma_beta.value(n) - lg_beta0)
                    .sum();
                lg_beta_v0 - self.lgamma_beta_v.value(dish.total) + words
            })
            .sum()
    }
}
