mod coordinate_bins;
pub mod notcher;
pub mod outlier_mask;
pub mod threshold;

pub use notcher::{NotchingConfig, NotchingIteration, NotchingOutcome, compute_outlier_mask};
pub use outlier_mask::OutlierMask;
pub use threshold::{
    StoppingRule, ThresholdKind, ThresholdRule, histogram_minimum_threshold,
};
