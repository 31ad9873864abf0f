use tracing::info;

use super::GumbelEstimator;
use crate::distributions::{FitOptions, Gumbel, fit_gumbel_with};
use crate::error::Result;
use crate::sampling::{BatchLayout, BatchMaxima, Batching};

/// Block-maxima estimator: fits a Gumbel law to the maxima of contiguous,
/// equal-size batches of the samples.
///
/// Samples are used in the order given. Shuffle them beforehand with
/// [`permuted`](crate::sampling::permuted) if their order carries structure.
#[derive(Debug, Clone)]
pub struct BatchMaxGumbel {
    maxima: BatchMaxima,
    options: FitOptions,
}

impl BatchMaxGumbel {
    pub fn new(samples: &[f64], batching: Batching) -> Result<Self> {
        Self::with_options(samples, batching, FitOptions::default())
    }

    pub fn with_options(samples: &[f64], batching: Batching, options: FitOptions) -> Result<Self> {
        let maxima = BatchMaxima::compute(samples, batching)?;
        let layout = maxima.layout();
        info!(
            samples = samples.len(),
            batch_count = layout.batch_count,
            batch_size = layout.batch_size,
            method = %options.method,
            "built batch-max Gumbel estimator"
        );
        Ok(Self { maxima, options })
    }

    pub fn compute_batch_maxima(&self) -> &BatchMaxima {
        &self.maxima
    }

    pub fn batch_layout(&self) -> BatchLayout {
        self.maxima.layout()
    }

    pub fn batch_count(&self) -> usize {
        self.maxima.layout().batch_count
    }

    pub fn batch_size(&self) -> usize {
        self.maxima.layout().batch_size
    }

    pub fn discarded_samples(&self) -> usize {
        self.maxima.layout().discarded
    }

    pub fn fit_options(&self) -> &FitOptions {
        &self.options
    }

    /// Gumbel law of the maximum of one batch.
    pub fn fit(&self) -> Result<Gumbel> {
        let gumbel = fit_gumbel_with(self.maxima.values(), &self.options)?;
        info!(
            location = gumbel.location(),
            scale = gumbel.scale(),
            batches = self.maxima.len(),
            "fitted Gumbel to batch maxima"
        );
        Ok(gumbel)
    }

    /// Law of the loudest candidate over `n` batches' worth of trials.
    pub fn propagate_max(&self, n: u64) -> Result<Gumbel> {
        self.fit()?.max_of(n)
    }
}

impl GumbelEstimator for BatchMaxGumbel {
    fn fit(&self) -> Result<Gumbel> {
        BatchMaxGumbel::fit(self)
    }
}
