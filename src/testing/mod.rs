pub mod fixtures;

pub use fixtures::{BandedSearch, gamma_samples, gumbel_samples};
