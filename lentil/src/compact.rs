//! Reclaim empty tables and dishes.
//!
//! Sweeps leave behind tables whose last token moved away and dishes no
//! table serves any more. Both are removed by moving the last entry into
//! the vacated slot, so every back-reference to the moved entry (token ->
//! table, table -> dish) has to be rewritten.

use crate::franchise::FranchiseState;

/// What a call to [`FranchiseState::remove_empty`] reclaimed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Compaction {
    /// Tables with no tokens left
    pub tables_removed: usize,
    /// Dishes no table served
    pub dishes_removed: usize,
}

impl FranchiseState {
    /// Remove every zero-occupancy table and then every zero-popularity
    /// dish, keeping table and dish indices dense.
    ///
    /// Running it twice in a row is a no-op the second time.
    pub fn remove_empty(&mut self) -> Compaction {
        let mut out = Compaction::default();

        for restaurant in self.restaurants.iter_mut() {
            for t in (0..restaurant.tables.len()).rev() {
                if restaurant.tables[t].occupancy > 0 {
                    continue;
                }

                self.dishes[restaurant.tables[t].dish].popularity -= 1;
                self.popularity_total -= 1;

                let last = restaurant.tables.len() - 1;
                for s in restaurant.seating.iter_mut().filter(|s| **s == last) {
                    *s = t;
                }
                restaurant.tables.swap_remove(t);
                out.tables_removed += 1;
            }
        }

        for k in (0..self.dishes.len()).rev() {
            if self.dishes[k].popularity > 0 {
                continue;
            }

            let last = self.dishes.len() - 1;
            for restaurant in self.restaurants.iter_mut() {
                for table in restaurant.tables.iter_mut().filter(|x| x.dish == last) {
                    table.dish = k;
                }
            }
            self.dishes.swap_remove(k);
            out.dishes_removed += 1;
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use crate::check::{check_compacted, check_counts};
    use crate::corpus::Corpus;
    use crate::franchise::{FranchiseState, Table};

    /// One document, three tables with occupancy [2, 0, 3] on two dishes.
    fn with_empty_middle_table() -> (Corpus, FranchiseState) {
        let corpus = Corpus::from_documents(vec![vec![0, 1, 2, 2, 3]], 4).unwrap();
        let mut state = FranchiseState::new(&corpus);
        let k0 = state.open_dish();
        let k1 = state.open_dish();
        let t0 = state.open_table(0, k0);
        let _t1 = state.open_table(0, k1);
        let t2 = state.open_table(0, k1);
        for (i, &w) in corpus.doc(0).iter().enumerate() {
            state.place_token(0, if i < 2 { t0 } else { t2 }, w);
        }
        (corpus, state)
    }

    #[test]
    fn test_remove_middle_table() {
        let (corpus, mut state) = with_empty_middle_table();
        check_counts(&state, &corpus).unwrap();
        assert!(check_compacted(&state, &corpus).is_err());

        let out = state.remove_empty();
        assert_eq!(out.tables_removed, 1);
        assert_eq!(out.dishes_removed, 0);

        let r = &state.restaurants[0];
        assert_eq!(r.tables.len(), 2);
        assert_eq!(r.tables.iter().map(|x| x.occupancy).sum::<usize>(), 5);
        // tokens of the former last table now sit at the freed slot
        assert_eq!(r.seating, vec![0, 0, 1, 1, 1]);
        assert_eq!(r.tables[1], Table { occupancy: 3, dish: 1 });
        assert_eq!(state.dishes[1].popularity, 1);
        assert_eq!(state.popularity_total, 2);

        check_compacted(&state, &corpus).unwrap();
    }

    #[test]
    fn test_remove_dish_rewrites_tables() {
        let (corpus, mut state) = with_empty_middle_table();

        // empty out dish 0 by moving its table onto dish 1
        let words = corpus.doc(0)[..2].to_vec();
        state.detach_table(0, 0, &words);
        state.attach_table(0, 0, 1, &words);
        // a third dish that stays occupied and must be renumbered
        let k2 = state.open_dish();
        state.unseat(0, 4, 3);
        let t = state.open_table(0, k2);
        state.seat(0, 4, t, 3);
        check_counts(&state, &corpus).unwrap();

        let out = state.remove_empty();
        assert_eq!(out, super::Compaction { tables_removed: 1, dishes_removed: 1 });
        assert_eq!(state.n_dish(), 2);
        // dish 2 moved into slot 0
        assert_eq!(state.dishes[0].word_count, vec![0, 0, 0, 1]);
        let on_moved: Vec<_> = state.restaurants[0]
            .tables
            .iter()
            .filter(|x| x.dish == 0)
            .collect();
        assert_eq!(on_moved.len(), 1);
        assert_eq!(on_moved[0].occupancy, 1);

        check_compacted(&state, &corpus).unwrap();
    }

    #[test]
    fn test_remove_empty_is_idempotent() {
        let (corpus, mut state) = with_empty_middle_table();
        state.remove_empty();
        let once = state.clone();
        let out = state.remove_empty();
        assert_eq!(out, super::Compaction::default());
        assert_eq!(state, once);
        check_compacted(&state, &corpus).unwrap();
    }

    #[test]
    fn test_remove_all_tables_of_a_dish() {
        let corpus = Corpus::from_documents(vec![vec![0], vec![1]], 2).unwrap();
        let mut state = FranchiseState::seed_single_partition(&corpus);
        let k = state.open_dish();
        let t = state.open_table(1, k);
        state.unseat(1, 0, 1);
        state.seat(1, 0, t, 1);
        // doc 1's original table is now empty; dish 0 keeps doc 0's table

        let out = state.remove_empty();
        assert_eq!(out.tables_removed, 1);
        assert_eq!(out.dishes_removed, 0);
        assert_eq!(state.restaurants[1].seating, vec![0]);
        assert_eq!(state.restaurants[1].tables[0].dish, 1);
        check_compacted(&state, &corpus).unwrap();
    }
}
