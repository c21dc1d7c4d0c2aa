//! Consistency checker.
//!
//! Recomputes every count from the raw token assignments and compares it
//! with the incrementally maintained statistics. Slow (it rescans the whole
//! corpus); meant for tests and for `--check` runs, not for every step.

use crate::corpus::Corpus;
use crate::error::{HdpError, Result};
use crate::franchise::FranchiseState;
use log::debug;

macro_rules! ensure {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err(HdpError::InvariantViolation(format!($($arg)+)));
        }
    };
}

/// Verify shapes and all count invariants. Empty tables and unserved
/// dishes are tolerated, as between a sweep and the next compaction.
pub fn check_counts(state: &FranchiseState, corpus: &Corpus) -> Result<()> {
    let n_dish = state.dishes.len();

    ensure!(
        state.restaurants.len() == corpus.n_doc(),
        "{} restaurants for {} documents",
        state.restaurants.len(),
        corpus.n_doc()
    );
    ensure!(
        state.n_word == corpus.n_word(),
        "vocabulary size {} != corpus {}",
        state.n_word,
        corpus.n_word()
    );

    for (d, r) in state.restaurants.iter().enumerate() {
        ensure!(
            r.seating.len() == corpus.doc(d).len(),
            "doc {}: {} seated of {} tokens",
            d,
            r.seating.len(),
            corpus.doc(d).len()
        );
        for (i, &t) in r.seating.iter().enumerate() {
            ensure!(
                t < r.tables.len(),
                "doc {} token {}: table {} out of {}",
                d,
                i,
                t,
                r.tables.len()
            );
        }
        for (t, table) in r.tables.iter().enumerate() {
            ensure!(
                table.dish < n_dish,
                "doc {} table {}: dish {} out of {}",
                d,
                t,
                table.dish,
                n_dish
            );
        }
    }
    for (k, dish) in state.dishes.iter().enumerate() {
        ensure!(
            dish.word_count.len() == state.n_word,
            "dish {}: word count vector of length {}",
            k,
            dish.word_count.len()
        );
    }
    debug!("[PASS] shapes");

    // table occupancy
    for (d, r) in state.restaurants.iter().enumerate() {
        let mut occupancy = vec![0usize; r.tables.len()];
        for &t in &r.seating {
            occupancy[t] += 1;
        }
        for (t, table) in r.tables.iter().enumerate() {
            ensure!(
                occupancy[t] == table.occupancy,
                "doc {} table {}: occupancy {} but {} tokens seated",
                d,
                t,
                table.occupancy,
                occupancy[t]
            );
        }
    }
    debug!("[PASS] table occupancy");

    // dish totals, both ways
    let mut total_by_tables = vec![0usize; n_dish];
    let mut popularity = vec![0usize; n_dish];
    for r in &state.restaurants {
        for table in &r.tables {
            total_by_tables[table.dish] += table.occupancy;
            popularity[table.dish] += 1;
        }
    }
    for (k, dish) in state.dishes.iter().enumerate() {
        let s: usize = dish.word_count.iter().sum();
        ensure!(
            s == dish.total,
            "dish {}: total {} != sum of word counts {}",
            k,
            dish.total,
            s
        );
        ensure!(
            total_by_tables[k] == dish.total,
            "dish {}: total {} != occupancy of its tables {}",
            k,
            dish.total,
            total_by_tables[k]
        );
    }
    debug!("[PASS] dish totals");

    // popularity
    for (k, dish) in state.dishes.iter().enumerate() {
        ensure!(
            popularity[k] == dish.popularity,
            "dish {}: popularity {} but served by {} tables",
            k,
            dish.popularity,
            popularity[k]
        );
    }
    let s: usize = state.dishes.iter().map(|x| x.popularity).sum();
    ensure!(
        s == state.popularity_total,
        "popularity total {} != sum over dishes {}",
        state.popularity_total,
        s
    );
    ensure!(
        s == state.n_table_total(),
        "popularity total {} != number of tables {}",
        s,
        state.n_table_total()
    );
    debug!("[PASS] popularity");

    // word counts from the tokens themselves
    let n_word = state.n_word;
    let mut word_count = vec![0usize; n_dish * n_word];
    for (d, doc) in corpus.docs().iter().enumerate() {
        for (i, &w) in doc.iter().enumerate() {
            word_count[state.topic_of(d, i) * n_word + w] += 1;
        }
    }
    for (k, dish) in state.dishes.iter().enumerate() {
        for w in 0..n_word {
            ensure!(
                word_count[k * n_word + w] == dish.word_count[w],
                "dish {} word {}: count {} but {} tokens",
                k,
                w,
                dish.word_count[w],
                word_count[k * n_word + w]
            );
        }
    }
    debug!("[PASS] word counts");

    Ok(())
}

/// [`check_counts`] plus density: no empty table, no unserved dish.
pub fn check_compacted(state: &FranchiseState, corpus: &Corpus) -> Result<()> {
    check_counts(state, corpus)?;

    for (d, r) in state.restaurants.iter().enumerate() {
        if let Some(t) = r.tables.iter().position(|x| x.occupancy == 0) {
            return Err(HdpError::InvariantViolation(format!(
                "doc {} table {}: empty after compaction",
                d, t
            )));
        }
    }
    if let Some(k) = state.dishes.iter().position(|x| x.popularity == 0) {
        return Err(HdpError::InvariantViolation(format!(
            "dish {}: unserved after compaction",
            k
        )));
    }
    debug!("[PASS] dense");
    Ok(())
}
