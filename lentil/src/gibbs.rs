//! Collapsed Gibbs sampler for the Chinese restaurant franchise.
//!
//! Two kinds of moves, each conditioned on every other assignment:
//!
//! 1. **Token moves** ([`GibbsSampler::reassign_token`]): reseat one token
//!    at an existing table of its document, at a new table serving an
//!    existing dish, or at a new table serving a new dish.
//! 2. **Table moves** ([`GibbsSampler::reassign_table`]): move a whole
//!    table, with all its tokens, to another (possibly new) dish.
//!
//! Both build unnormalized log scores, shift them by the mean of the finite
//! entries, exponentiate, and draw once from the resulting categorical.
//!
//! ```text
//! existing table t        : ln n_t + ln(β + n_kw) - ln(βV + n_k)
//! new table, dish k       : ln α + ln m_k - ln(γ + m) + ln(β + n_kw) - ln(βV + n_k)
//! new table, new dish     : ln α + ln γ   - ln(γ + m) - ln V
//! ```

use crate::corpus::Corpus;
use crate::franchise::FranchiseState;
use crate::inference::HdpOptions;
use crate::precomputed::PrecomputedTable;
use crate::random::RandomSource;

/// Largest exponent that still leaves headroom below `f64::MAX`
const MAX_SAFE_EXPONENT: f64 = 700.0;

/// Counters for one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Tokens (table sweep) or tables (dish sweep) that changed place
    pub moves: usize,
    /// Tables opened during the sweep
    pub new_tables: usize,
    /// Dishes opened during the sweep
    pub new_dishes: usize,
}

/// Collapsed Gibbs sampler over a [`FranchiseState`].
///
/// Owns its random source and all scratch space; nothing is shared between
/// calls except the generator state.
pub struct GibbsSampler<R: RandomSource> {
    rng: R,
    ln_alpha: f64,
    ln_n_word: f64,
    /// `ln(n)`
    ln_count: PrecomputedTable,
    /// `ln(β + n)`
    ln_beta: PrecomputedTable,
    /// `ln(βV + n)`
    ln_beta_v: PrecomputedTable,
    /// `ln(γ + n)`
    ln_gamma: PrecomputedTable,
    /// Unnormalized scores of the current draw
    scores: Vec<f64>,
    /// Cumulative scores of the current draw
    cumulative: Vec<f64>,
    /// Words of the table being moved, in document order
    table_words: Vec<usize>,
    /// Per-word counts within the table being moved
    local_count: Vec<usize>,
    /// Document visit order
    order: Vec<usize>,
}

impl<R: RandomSource> GibbsSampler<R> {
    /// Create a sampler; the memo tables are filled here.
    ///
    /// * `options` - concentration parameters and memo table size
    /// * `n_word` - vocabulary size
    /// * `rng` - explicitly seeded random source
    pub fn new(options: &HdpOptions, n_word: usize, rng: R) -> Self {
        let len = options.table_size;
        let beta_v = options.beta * n_word as f64;
        GibbsSampler {
            rng,
            ln_alpha: options.alpha.ln(),
            ln_n_word: (n_word as f64).ln(),
            ln_count: PrecomputedTable::ln(len, 0.0),
            ln_beta: PrecomputedTable::ln(len, options.beta),
            ln_beta_v: PrecomputedTable::ln(len, beta_v),
            ln_gamma: PrecomputedTable::ln(len, options.gamma),
            scores: vec![],
            cumulative: vec![],
            table_words: vec![],
            local_count: vec![0; n_word],
            order: vec![],
        }
    }

    /// Seat every token of an empty franchise, one at a time, by the token
    /// move with no prior assignment to remove. Documents are visited in
    /// shuffled order; tokens within a document in order.
    pub fn bootstrap(&mut self, state: &mut FranchiseState, corpus: &Corpus) -> SweepStats {
        debug_assert_eq!(state.n_seated(), 0);
        let mut stats = SweepStats::default();
        self.shuffle_documents(corpus.n_doc());
        for di in 0..self.order.len() {
            let d = self.order[di];
            for i in 0..corpus.doc(d).len() {
                let n_table = state.n_table(d);
                let n_dish = state.n_dish();
                self.bootstrap_token(state, corpus, d, i);
                stats.new_tables += state.n_table(d) - n_table;
                stats.new_dishes += state.n_dish() - n_dish;
            }
        }
        stats.moves = corpus.n_token();
        stats
    }

    /// One table sweep: every token of every document is reseated once.
    pub fn sweep_tokens(&mut self, state: &mut FranchiseState, corpus: &Corpus) -> SweepStats {
        let mut stats = SweepStats::default();
        self.shuffle_documents(corpus.n_doc());
        for di in 0..self.order.len() {
            let d = self.order[di];
            for i in 0..corpus.doc(d).len() {
                let old = state.restaurants[d].seating[i];
                let n_table = state.n_table(d);
                let n_dish = state.n_dish();
                let new = self.reassign_token(state, corpus, d, i);
                if new != old {
                    stats.moves += 1;
                }
                stats.new_tables += state.n_table(d) - n_table;
                stats.new_dishes += state.n_dish() - n_dish;
            }
        }
        stats
    }

    /// One dish sweep: every table of every document picks its dish once.
    pub fn sweep_tables(&mut self, state: &mut FranchiseState, corpus: &Corpus) -> SweepStats {
        let mut stats = SweepStats::default();
        self.shuffle_documents(corpus.n_doc());
        for di in 0..self.order.len() {
            let d = self.order[di];
            for t in 0..state.n_table(d) {
                let old = state.restaurants[d].tables[t].dish;
                let n_dish = state.n_dish();
                let new = self.reassign_table(state, corpus, d, t);
                if new != old {
                    stats.moves += 1;
                }
                stats.new_dishes += state.n_dish() - n_dish;
            }
        }
        stats
    }

    fn shuffle_documents(&mut self, n_doc: usize) {
        self.order.clear();
        self.order.extend(0..n_doc);
        self.rng.shuffle(&mut self.order);
    }

    /// Resample the table of token `i` in document `d`. Returns the table
    /// it now sits at, which may have just been opened.
    pub fn reassign_token(
        &mut self,
        state: &mut FranchiseState,
        corpus: &Corpus,
        d: usize,
        i: usize,
    ) -> usize {
        let w = corpus.doc(d)[i];
        state.unseat(d, i, w);
        let t = self.draw_table(state, d, w);
        state.seat(d, i, t, w);
        t
    }

    /// Seat token `i` of document `d` for the first time. Tokens of a
    /// document must be bootstrapped in order.
    pub fn bootstrap_token(
        &mut self,
        state: &mut FranchiseState,
        corpus: &Corpus,
        d: usize,
        i: usize,
    ) -> usize {
        debug_assert_eq!(state.restaurants[d].seating.len(), i);
        let w = corpus.doc(d)[i];
        let t = self.draw_table(state, d, w);
        state.place_token(d, t, w);
        t
    }

    /// Score every seating option for a (removed) token with word `w` in
    /// document `d`, draw one, and open a table (and dish) if needed.
    fn draw_table(&mut self, state: &mut FranchiseState, d: usize, w: usize) -> usize {
        self.scores.clear();

        // 1. existing tables
        for table in &state.restaurants[d].tables {
            let dish = &state.dishes[table.dish];
            self.scores.push(
                self.ln_count.value(table.occupancy) + self.ln_beta.value(dish.word_count[w])
                    - self.ln_beta_v.value(dish.total),
            );
        }

        // 2. new table, existing dish
        let ln_norm = self.ln_gamma.value(state.popularity_total);
        for dish in &state.dishes {
            self.scores.push(
                self.ln_alpha + self.ln_count.value(dish.popularity) - ln_norm
                    + self.ln_beta.value(dish.word_count[w])
                    - self.ln_beta_v.value(dish.total),
            );
        }

        // 3. new table, new dish; the new dish emits uniformly
        self.scores
            .push(self.ln_alpha + self.ln_gamma.value(0) - ln_norm - self.ln_n_word);

        stabilize_exp(&mut self.scores);
        let res = self
            .rng
            .sample_categorical(&self.scores, &mut self.cumulative);

        let n_table = state.n_table(d);
        if res < n_table {
            return res;
        }

        let k = match res - n_table {
            k if k == state.n_dish() => state.open_dish(),
            k => k,
        };
        state.open_table(d, k)
    }

    /// Resample the dish of table `t` in document `d`, moving all of its
    /// tokens together. Returns the dish it now serves.
    pub fn reassign_table(
        &mut self,
        state: &mut FranchiseState,
        corpus: &Corpus,
        d: usize,
        t: usize,
    ) -> usize {
        // zero the local counts left over from the previous table
        for &w in &self.table_words {
            self.local_count[w] = 0;
        }
        self.table_words.clear();

        let seating = &state.restaurants[d].seating;
        self.table_words.extend(
            corpus
                .doc(d)
                .iter()
                .zip(seating)
                .filter(|&(_, &s)| s == t)
                .map(|(&w, _)| w),
        );

        state.detach_table(d, t, &self.table_words);

        // prior: popularity of each dish, or γ for a new one
        let n_dish = state.n_dish();
        self.scores.clear();
        self.scores.extend(
            state
                .dishes
                .iter()
                .map(|dish| self.ln_count.value(dish.popularity)),
        );
        self.scores.push(self.ln_gamma.value(0));

        // likelihood of the table's words, accumulated token by token so
        // repeated words see each other exactly once
        for (j, &w) in self.table_words.iter().enumerate() {
            let local = self.local_count[w];
            for (k, dish) in state.dishes.iter().enumerate() {
                self.scores[k] += self.ln_beta.value(dish.word_count[w] + local)
                    - self.ln_beta_v.value(dish.total + j);
            }
            self.scores[n_dish] += self.ln_beta.value(local) - self.ln_beta_v.value(j);
            self.local_count[w] += 1;
        }

        stabilize_exp(&mut self.scores);
        let k = self
            .rng
            .sample_categorical(&self.scores, &mut self.cumulative);
        let k = if k == n_dish { state.open_dish() } else { k };

        state.attach_table(d, t, k, &self.table_words);
        k
    }
}

/// Turn log scores into unnormalized weights.
///
/// Subtracts the mean of the finite entries (non-finite ones, i.e. `-inf`
/// for empty tables or unserved dishes, are left out of the mean and map
/// to weight 0), then exponentiates. If the spread above the mean is too
/// large to exponentiate, the maximum is subtracted instead.
pub fn stabilize_exp(scores: &mut [f64]) {
    let (sum, n, max) = scores
        .iter()
        .filter(|x| x.is_finite())
        .fold((0.0, 0usize, f64::NEG_INFINITY), |(s, n, m), &x| {
            (s + x, n + 1, m.max(x))
        });

    let mut shift = if n > 0 { sum / n as f64 } else { 0.0 };
    if max - shift > MAX_SAFE_EXPONENT {
        shift = max;
    }

    for x in scores.iter_mut() {
        *x = (*x - shift).exp();
    }
}
