//! HDP inference driver.
//!
//! Each iteration is a table sweep and a dish sweep, each followed by
//! compaction so that every sweep starts from dense indices:
//!
//! ```text
//! bootstrap -> [ tokens -> compact -> tables -> compact ] x max_iter
//! ```

use crate::check::check_compacted;
use crate::compact::Compaction;
use crate::corpus::Corpus;
use crate::error::{HdpError, Result};
use crate::franchise::FranchiseState;
use crate::gibbs::{GibbsSampler, SweepStats};
use crate::likelihood::WordLikelihood;
use crate::random::Lcg64;
use crate::snapshot::Summary;
use log::{debug, info};
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Options for HDP inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HdpOptions {
    /// Propensity to open a new table within a document. Default: 1.0
    pub alpha: f64,
    /// Dirichlet smoothing per vocabulary entry. Default: 0.5
    pub beta: f64,
    /// Propensity to open a new dish across the franchise. Default: 1.0
    pub gamma: f64,
    /// Number of memoized entries per log table. Default: 65536
    pub table_size: usize,
    /// Random seed. Default: 0
    pub seed: u64,
}

impl Default for HdpOptions {
    fn default() -> Self {
        HdpOptions {
            alpha: 1.0,
            beta: 0.5,
            gamma: 1.0,
            table_size: 1 << 16,
            seed: 0,
        }
    }
}

impl HdpOptions {
    /// Reject parameters the sampler cannot work with.
    pub fn validate(&self, n_doc: usize, n_word: usize) -> Result<()> {
        for (name, x) in [
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("gamma", self.gamma),
        ] {
            if !(x.is_finite() && x > 0.0) {
                return Err(HdpError::Configuration(format!(
                    "{} must be a positive number, got {}",
                    name, x
                )));
            }
        }
        if n_doc == 0 {
            return Err(HdpError::Configuration("no documents".into()));
        }
        if n_word == 0 {
            return Err(HdpError::Configuration("empty vocabulary".into()));
        }
        Ok(())
    }
}

/// What happened in one iteration
#[derive(Debug, Clone)]
pub struct Iteration {
    /// Token (table assignment) sweep
    pub tokens: SweepStats,
    /// Table (dish assignment) sweep
    pub tables: SweepStats,
    /// Both compactions together
    pub compaction: Compaction,
    /// State after the iteration
    pub summary: Summary,
}

/// HDP topic model fitted by Chinese restaurant franchise Gibbs sampling.
///
/// # Usage
///
/// ```ignore
/// let corpus = Corpus::read_lda_c("docs.txt", None, None)?;
/// let mut hdp = Hdp::new(corpus, HdpOptions::default())?;
/// hdp.initialize();
/// for _ in 0..100 {
///     hdp.iterate().summary.log();
/// }
/// ```
pub struct Hdp {
    options: HdpOptions,
    corpus: Corpus,
    state: FranchiseState,
    gibbs: GibbsSampler<Lcg64>,
    likelihood: WordLikelihood,
    initialized: bool,
    iteration: usize,
}

impl Hdp {
    /// Validate the options and set up an empty franchise. The generator
    /// is seeded here, before any draw.
    pub fn new(corpus: Corpus, options: HdpOptions) -> Result<Self> {
        options.validate(corpus.n_doc(), corpus.n_word())?;

        let n_word = corpus.n_word();
        let state = FranchiseState::new(&corpus);
        let gibbs = GibbsSampler::new(&options, n_word, Lcg64::seed_from_u64(options.seed));
        let likelihood = WordLikelihood::new(options.beta, n_word, options.table_size);

        info!(
            "HDP: docs={}, words={}, tokens={}, alpha={}, beta={}, gamma={}, seed={}",
            corpus.n_doc(),
            n_word,
            corpus.n_token(),
            options.alpha,
            options.beta,
            options.gamma,
            options.seed
        );

        Ok(Hdp {
            options,
            corpus,
            state,
            gibbs,
            likelihood,
            initialized: false,
            iteration: 0,
        })
    }

    /// Seat every token by sequential sampling from an empty franchise.
    /// Only the first call seats; later calls just report the state.
    pub fn initialize(&mut self) -> Summary {
        if !self.initialized {
            let stats = self.gibbs.bootstrap(&mut self.state, &self.corpus);
            self.state.remove_empty();
            self.initialized = true;
            debug!("bootstrap: {:?}", stats);
        }
        self.summary()
    }

    /// Has every token been seated?
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// One table sweep and one dish sweep, each followed by compaction.
    /// Seats the tokens first if [`Hdp::initialize`] has not been called.
    pub fn iterate(&mut self) -> Iteration {
        if !self.initialized {
            self.initialize();
        }
        let tokens = self.gibbs.sweep_tokens(&mut self.state, &self.corpus);
        let c1 = self.state.remove_empty();
        let tables = self.gibbs.sweep_tables(&mut self.state, &self.corpus);
        let c2 = self.state.remove_empty();
        self.iteration += 1;

        debug!(
            "iter {}: token moves {}, table moves {}, removed {} tables, {} dishes",
            self.iteration,
            tokens.moves,
            tables.moves,
            c1.tables_removed + c2.tables_removed,
            c1.dishes_removed + c2.dishes_removed
        );

        Iteration {
            tokens,
            tables,
            compaction: Compaction {
                tables_removed: c1.tables_removed + c2.tables_removed,
                dishes_removed: c1.dishes_removed + c2.dishes_removed,
            },
            summary: self.summary(),
        }
    }

    /// Recompute every invariant from scratch.
    pub fn check(&self) -> Result<()> {
        check_compacted(&self.state, &self.corpus)
    }

    /// Menu size, table count and word log-likelihood of the current state
    pub fn summary(&self) -> Summary {
        Summary::new(
            self.iteration,
            &self.state,
            self.likelihood.evaluate(&self.state),
        )
    }

    /// Number of completed iterations
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Current seating
    pub fn state(&self) -> &FranchiseState {
        &self.state
    }

    /// The data being fitted
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Options after validation
    pub fn options(&self) -> &HdpOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let ok = HdpOptions::default();
        assert!(ok.validate(3, 10).is_ok());

        for bad in [
            HdpOptions {
                alpha: 0.0,
                ..HdpOptions::default()
            },
            HdpOptions {
                beta: -1.0,
                ..HdpOptions::default()
            },
            HdpOptions {
                gamma: f64::NAN,
                ..HdpOptions::default()
            },
        ] {
            assert!(matches!(
                bad.validate(3, 10),
                Err(HdpError::Configuration(_))
            ));
        }

        assert!(matches!(ok.validate(0, 10), Err(HdpError::Configuration(_))));
        assert!(matches!(ok.validate(3, 0), Err(HdpError::Configuration(_))));
    }

    #[test]
    fn test_new_rejects_empty_vocabulary() {
        let corpus = Corpus::from_documents(vec![vec![]], 0).unwrap();
        assert!(Hdp::new(corpus, HdpOptions::default()).is_err());
    }

    #[test]
    fn test_options_json_round_trip() -> anyhow::Result<()> {
        let opts = HdpOptions {
            alpha: 0.25,
            seed: 9,
            ..HdpOptions::default()
        };
        let text = serde_json::to_string(&opts)?;
        let back: HdpOptions = serde_json::from_str(&text)?;
        assert_eq!(opts, back);
        Ok(())
    }

    fn toy_hdp(seed: u64) -> anyhow::Result<Hdp> {
        let corpus = Corpus::from_documents(
            vec![vec![0, 1, 0, 2, 1], vec![3, 3, 2], vec![], vec![1, 0]],
            4,
        )?;
        let options = HdpOptions {
            seed,
            ..HdpOptions::default()
        };
        Ok(Hdp::new(corpus, options)?)
    }

    #[test]
    fn test_initialize_twice_seats_once() -> anyhow::Result<()> {
        let mut hdp = toy_hdp(5)?;
        assert!(!hdp.is_initialized());

        let first = hdp.initialize();
        let seated = hdp.state().clone();
        assert!(hdp.is_initialized());
        assert_eq!(seated.n_seated(), hdp.corpus().n_token());

        let second = hdp.initialize();
        assert_eq!(hdp.state(), &seated);
        assert_eq!(first, second);
        hdp.check()?;
        Ok(())
    }

    #[test]
    fn test_iterate_without_initialize() -> anyhow::Result<()> {
        let mut lazy = toy_hdp(8)?;
        let out = lazy.iterate();
        lazy.check()?;
        assert!(lazy.is_initialized());
        assert_eq!(out.summary.iteration, 1);
        assert_eq!(lazy.state().n_seated(), lazy.corpus().n_token());

        // same chain as the explicit call order
        let mut eager = toy_hdp(8)?;
        eager.initialize();
        eager.iterate();
        assert_eq!(lazy.state(), eager.state());
        Ok(())
    }

    #[test]
    fn test_iterate_keeps_state_dense() -> anyhow::Result<()> {
        let corpus = Corpus::from_documents(
            vec![vec![0, 1, 0, 1], vec![2, 3, 2, 3], vec![0, 1, 2, 3], vec![1, 1, 0]],
            4,
        )?;
        let n_token = corpus.n_token();
        let mut hdp = Hdp::new(corpus, HdpOptions::default())?;
        let init = hdp.initialize();
        assert_eq!(init.iteration, 0);
        hdp.check()?;

        for it in 1..=10 {
            let out = hdp.iterate();
            hdp.check()?;
            assert_eq!(out.summary.iteration, it);
            assert_eq!(
                out.summary.dishes.iter().map(|x| x.total).sum::<usize>(),
                n_token
            );
            assert!(out.summary.log_likelihood.is_finite());
        }
        Ok(())
    }
}
