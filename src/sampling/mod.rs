mod batching;
mod permutation;

pub use batching::{BatchLayout, BatchMaxima, Batching, BatchingKind};
pub use permutation::permuted;
