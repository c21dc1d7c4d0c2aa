//! Hierarchical Dirichlet process (HDP) topic model.
//!
//! Fits an HDP mixture of multinomials to a bag-of-words corpus by
//! collapsed Gibbs sampling in the Chinese restaurant franchise (CRF)
//! representation: documents are restaurants, tokens are customers seated
//! at tables, and every table serves one dish (topic) from a menu shared
//! by the whole franchise. The number of topics is not fixed in advance.
//!
//! # Sampling
//!
//! One iteration resamples the table of every token, removes empty tables
//! and dishes, resamples the dish of every table, and compacts again. Dish
//! word distributions are integrated out under a symmetric Dirichlet prior.
//!
//! # References
//!
//! Teh, Jordan, Beal & Blei (2006). "Hierarchical Dirichlet processes."
//! Journal of the American Statistical Association 101(476).

#![deny(missing_docs)]

/// Errors raised by the sampler and the loaders
pub mod error;

/// Buffered (optionally gzipped) file readers and writers
pub mod common_io;

/// lda-c corpus loading and writing
pub mod corpus;

/// Memoized `f(n + delta)` tables for integer `n`
pub mod precomputed;

/// Uniform draws, shuffles and categorical sampling
pub mod random;

/// Restaurants, tables and dishes with their sufficient statistics
pub mod franchise;

/// Removal of empty tables and dishes
pub mod compact;

/// Recompute-from-scratch invariant checks
pub mod check;

/// Token-level and table-level Gibbs moves
pub mod gibbs;

/// Collapsed word log-likelihood
pub mod likelihood;

/// Topic and assignment snapshots, per-iteration summaries
pub mod snapshot;

/// Options and the iteration driver
pub mod inference;

/// Synthetic corpora from a finite topic model
pub mod simulate;


pub use corpus::Corpus;
pub use error::HdpError;
pub use franchise::FranchiseState;
pub use inference::{Hdp, HdpOptions};
