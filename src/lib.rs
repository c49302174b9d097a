//! Efficient frontier search over a discrete lattice of long-only portfolio weights.
//!
//! The stages run in order:
//! [`estimator::estimate`] turns a [`PriceTable`] into [`AssetStats`],
//! [`weights::enumerate_weights`] builds every weight vector on the lattice,
//! [`scorer::score_all`] rates each one and [`frontier::efficient_frontier`]
//! keeps the non-dominated rows. [`FrontierPipeline`] wires them to one
//! [`FrontierConfig`].

pub mod config;
pub mod data_io;
pub mod error;
pub mod estimator;
pub mod frontier;
pub mod pipeline;
pub mod plotting;
pub mod scorer;
pub mod weights;

pub use config::{Annualization, FrontierConfig};
pub use data_io::PriceTable;
pub use error::{FrontierError, Result};
pub use estimator::AssetStats;
pub use pipeline::{FrontierPipeline, FrontierRun};
pub use scorer::ScoredPortfolio;
pub use weights::WeightVector;
