//! Read-only views of the franchise for reporting.

use crate::franchise::FranchiseState;
use log::{debug, info};
use serde::Serialize;
use std::io::Write;

/// Tab-separated word counts, one line per dish in dish order.
pub fn write_topics<W: Write + ?Sized>(state: &FranchiseState, out: &mut W) -> std::io::Result<()> {
    for dish in &state.dishes {
        write_tsv_line(out, &dish.word_count)?;
    }
    Ok(())
}

/// Tab-separated token counts per dish, one line per document.
pub fn write_assignments<W: Write + ?Sized>(
    state: &FranchiseState,
    out: &mut W,
) -> std::io::Result<()> {
    for d in 0..state.n_doc() {
        write_tsv_line(out, &state.doc_dish_counts(d))?;
    }
    Ok(())
}

fn write_tsv_line<W: Write + ?Sized>(out: &mut W, xs: &[usize]) -> std::io::Result<()> {
    let line = xs
        .iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join("\t");
    writeln!(out, "{}", line)
}

/// Size of one dish
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DishSummary {
    /// tables serving it
    pub popularity: usize,
    /// tokens eating it
    pub total: usize,
}

/// Size of the menu and seating after an iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// completed iterations, 0 right after initialization
    pub iteration: usize,
    /// number of dishes
    pub n_dish: usize,
    /// number of tables across the franchise
    pub n_table: usize,
    /// collapsed word log-likelihood
    pub log_likelihood: f64,
    /// per dish, in dish order
    pub dishes: Vec<DishSummary>,
}

impl Summary {
    /// Take the counts off `state`
    pub fn new(iteration: usize, state: &FranchiseState, log_likelihood: f64) -> Self {
        Summary {
            iteration,
            n_dish: state.n_dish(),
            n_table: state.popularity_total,
            log_likelihood,
            dishes: state
                .dishes
                .iter()
                .map(|x| DishSummary {
                    popularity: x.popularity,
                    total: x.total,
                })
                .collect(),
        }
    }

    /// One line at info, one line per dish at debug
    pub fn log(&self) {
        info!(
            "iter: {:4}  #dish: {:5}  #table: {:8}  llik: {:.4}",
            self.iteration, self.n_dish, self.n_table, self.log_likelihood
        );
        for (k, x) in self.dishes.iter().enumerate() {
            debug!(
                "dish {:3}: #table: {:5}  #word: {:7}",
                k, x.popularity, x.total
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;

    fn two_dish_state() -> FranchiseState {
        let corpus = Corpus::from_documents(vec![vec![0, 2, 2], vec![1]], 3).unwrap();
        let mut state = FranchiseState::new(&corpus);
        let k0 = state.open_dish();
        let k1 = state.open_dish();
        let t0 = state.open_table(0, k0);
        let t1 = state.open_table(0, k1);
        state.place_token(0, t0, 0);
        state.place_token(0, t1, 2);
        state.place_token(0, t1, 2);
        let t = state.open_table(1, k0);
        state.place_token(1, t, 1);
        state
    }

    #[test]
    fn test_write_topics() -> anyhow::Result<()> {
        let state = two_dish_state();
        let mut buf = vec![];
        write_topics(&state, &mut buf)?;
        assert_eq!(String::from_utf8(buf)?, "1\t1\t0\n0\t0\t2\n");
        Ok(())
    }

    #[test]
    fn test_write_assignments() -> anyhow::Result<()> {
        let state = two_dish_state();
        let mut buf = vec![];
        write_assignments(&state, &mut buf)?;
        assert_eq!(String::from_utf8(buf)?, "1\t2\n1\t0\n");
        Ok(())
    }

    #[test]
    fn test_summary() {
        let state = two_dish_state();
        let summary = Summary::new(7, &state, -3.5);
        assert_eq!(summary.n_dish, 2);
        assert_eq!(summary.n_table, 3);
        assert_eq!(
            summary.dishes,
            vec![
                DishSummary {
                    popularity: 2,
                    total: 2
                },
                DishSummary {
                    popularity: 1,
                    total: 2
                }
            ]
        );
    }
}
