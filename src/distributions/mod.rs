mod gumbel;
mod gumbel_fit;

pub use gumbel::{Gumbel, GumbelParameters};
pub use gumbel_fit::{FitMethod, FitOptions, fit_gumbel, fit_gumbel_with};
