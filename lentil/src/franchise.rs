//! Chinese restaurant franchise state.
//!
//! Each document is a restaurant whose tokens sit at tables; each table
//! serves one dish shared across the franchise. The state keeps exactly the
//! sufficient statistics the collapsed sampler conditions on:
//!
//! * per table: occupancy and the dish it serves
//! * per dish: word counts over the vocabulary, their total, and the
//!   number of tables serving it (popularity)
//! * franchise-wide: total popularity, i.e. the number of tables
//!
//! Tables and dishes live in dense vectors. New ones are appended;
//! [`FranchiseState::remove_empty`] reclaims the empty ones by
//! swap-with-last and rewrites every index that pointed at the moved entry.

use crate::corpus::Corpus;

/// A table in one restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    /// Number of tokens seated here
    pub occupancy: usize,
    /// Index of the dish this table serves
    pub dish: usize,
}

/// A dish (topic) on the franchise-wide menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dish {
    /// Token counts per vocabulary entry, across all tables serving this dish
    pub word_count: Vec<usize>,
    /// Sum of `word_count`
    pub total: usize,
    /// Number of tables serving this dish
    pub popularity: usize,
}

impl Dish {
    fn empty(n_word: usize) -> Self {
        Dish {
            word_count: vec![0; n_word],
            total: 0,
            popularity: 0,
        }
    }
}

/// Seating of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Restaurant {
    /// `seating[i]` is the table of token `i`
    pub seating: Vec<usize>,
    /// Tables opened in this document, dense after compaction
    pub tables: Vec<Table>,
}

/// Mutable sampler state for a whole corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FranchiseState {
    /// Vocabulary size
    pub n_word: usize,
    /// One restaurant per document
    pub restaurants: Vec<Restaurant>,
    /// The menu
    pub dishes: Vec<Dish>,
    /// Sum of dish popularity (= number of tables in the franchise)
    pub popularity_total: usize,
}

impl FranchiseState {
    /// An empty franchise: no tables, no dishes, no token seated.
    ///
    /// Tokens are seated later by the sampler's bootstrap pass.
    pub fn new(corpus: &Corpus) -> Self {
        let restaurants = corpus
            .docs()
            .iter()
            .map(|doc| Restaurant {
                seating: Vec::with_capacity(doc.len()),
                tables: vec![],
            })
            .collect();

        FranchiseState {
            n_word: corpus.n_word(),
            restaurants,
            dishes: vec![],
            popularity_total: 0,
        }
    }

    /// Trivial starting partition: every non-empty document gets a single
    /// table, and all tables share one dish.
    pub fn seed_single_partition(corpus: &Corpus) -> Self {
        let mut state = Self::new(corpus);
        if corpus.n_token() == 0 {
            return state;
        }

        let k = state.open_dish();
        for (d, doc) in corpus.docs().iter().enumerate() {
            if doc.is_empty() {
                continue;
            }
            let t = state.open_table(d, k);
            for &w in doc {
                state.place_token(d, t, w);
            }
        }
        state
    }

    /// Number of restaurants (documents)
    pub fn n_doc(&self) -> usize {
        self.restaurants.len()
    }

    /// Number of dishes on the menu
    pub fn n_dish(&self) -> usize {
        self.dishes.len()
    }

    /// Number of tables in document `d`
    pub fn n_table(&self, d: usize) -> usize {
        self.restaurants[d].tables.len()
    }

    /// Number of tables across the franchise
    pub fn n_table_total(&self) -> usize {
        self.restaurants.iter().map(|r| r.tables.len()).sum()
    }

    /// Number of seated tokens
    pub fn n_seated(&self) -> usize {
        self.restaurants.iter().map(|r| r.seating.len()).sum()
    }

    /// Dish (topic) of token `i` in document `d`
    #[inline]
    pub fn topic_of(&self, d: usize, i: usize) -> usize {
        let r = &self.restaurants[d];
        r.tables[r.seating[i]].dish
    }

    /// Append an empty dish to the menu and return its index.
    pub fn open_dish(&mut self) -> usize {
        self.dishes.push(Dish::empty(self.n_word));
        self.dishes.len() - 1
    }

    /// Append an empty table serving dish `k` to document `d` and return
    /// its index. The dish gains one unit of popularity.
    pub fn open_table(&mut self, d: usize, k: usize) -> usize {
        let tables = &mut self.restaurants[d].tables;
        tables.push(Table {
            occupancy: 0,
            dish: k,
        });
        self.dishes[k].popularity += 1;
        self.popularity_total += 1;
        tables.len() - 1
    }

    /// Seat the next not-yet-seated token of document `d` (word `w`) at
    /// table `t`.
    pub fn place_token(&mut self, d: usize, t: usize, w: usize) {
        self.restaurants[d].seating.push(t);
        self.add_token(d, t, w);
    }

    /// Move token `i` of document `d` (word `w`) to table `t`. The token
    /// must have been removed with [`FranchiseState::unseat`] first.
    pub fn seat(&mut self, d: usize, i: usize, t: usize, w: usize) {
        self.restaurants[d].seating[i] = t;
        self.add_token(d, t, w);
    }

    /// Remove the contribution of token `i` (word `w`) in document `d`.
    /// The token keeps pointing at its old table; returns that table.
    pub fn unseat(&mut self, d: usize, i: usize, w: usize) -> usize {
        let restaurant = &mut self.restaurants[d];
        let t = restaurant.seating[i];
        let table = &mut restaurant.tables[t];
        table.occupancy -= 1;
        let dish = &mut self.dishes[table.dish];
        dish.word_count[w] -= 1;
        dish.total -= 1;
        t
    }

    fn add_token(&mut self, d: usize, t: usize, w: usize) {
        let table = &mut self.restaurants[d].tables[t];
        table.occupancy += 1;
        let dish = &mut self.dishes[table.dish];
        dish.word_count[w] += 1;
        dish.total += 1;
    }

    /// Take table `t` of document `d` off its dish: its tokens' words leave
    /// the dish counts and the dish loses one unit of popularity. The table
    /// keeps its occupancy and its (now stale) dish index.
    ///
    /// * `words` - the words of every token seated at `t`
    pub fn detach_table(&mut self, d: usize, t: usize, words: &[usize]) {
        let table = self.restaurants[d].tables[t];
        debug_assert_eq!(table.occupancy, words.len());
        let dish = &mut self.dishes[table.dish];
        for &w in words {
            dish.word_count[w] -= 1;
        }
        dish.total -= table.occupancy;
        dish.popularity -= 1;
        self.popularity_total -= 1;
    }

    /// Put a detached table `t` of document `d` on dish `k`.
    ///
    /// * `words` - the words of every token seated at `t`
    pub fn attach_table(&mut self, d: usize, t: usize, k: usize, words: &[usize]) {
        let table = &mut self.restaurants[d].tables[t];
        debug_assert_eq!(table.occupancy, words.len());
        table.dish = k;
        let occupancy = table.occupancy;
        let dish = &mut self.dishes[k];
        for &w in words {
            dish.word_count[w] += 1;
        }
        dish.total += occupancy;
        dish.popularity += 1;
        self.popularity_total += 1;
    }

    /// Number of tokens of document `d` assigned to each dish
    pub fn doc_dish_counts(&self, d: usize) -> Vec<usize> {
        let mut counts = vec![0; self.dishes.len()];
        for table in &self.restaurants[d].tables {
            counts[table.dish] += table.occupancy;
        }
        counts
    }
}
