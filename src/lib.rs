//! Distribution of the loudest candidate of a wide search.
//!
//! Two independent paths produce the same [`Gumbel`] law:
//!
//! - empirically, by fitting the maxima of sample batches
//!   ([`BatchMaxGumbel`], optionally after notching contaminated
//!   coordinates with [`NotchedBatchMaxGumbel`]);
//! - analytically, from the asymptotic law of the maximum of `n` Gamma
//!   variables ([`AnalyticalGammaToGumbel`]).
//!
//! The crate logs through `tracing` and never installs a subscriber.

pub mod config;
pub mod distributions;
pub mod error;
pub mod estimators;
pub mod notching;
pub mod sampling;
pub mod utils;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use distributions::{Gumbel, GumbelParameters};
pub use error::{DistromaxError, Result};
pub use estimators::{
    AnalyticalGammaToGumbel, AsymptoticExpansion, BatchMaxGumbel, GammaLaw, GumbelEstimator,
    NotchedBatchMaxGumbel,
};
pub use sampling::Batching;
