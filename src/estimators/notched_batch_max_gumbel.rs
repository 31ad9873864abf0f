use tracing::{info, warn};

use super::{BatchMaxGumbel, GumbelEstimator};
use crate::distributions::{FitOptions, Gumbel};
use crate::error::{DistromaxError, Result};
use crate::notching::{NotchingConfig, NotchingIteration, OutlierMask, compute_outlier_mask};
use crate::sampling::{BatchLayout, BatchMaxima, Batching};

/// Batch-max estimator run on the samples left after notching out
/// contaminated coordinates.
///
/// The batch size is resolved against the full sample set and kept, so
/// notching shows up as fewer batches rather than smaller ones.
#[derive(Debug, Clone)]
pub struct NotchedBatchMaxGumbel {
    inner: BatchMaxGumbel,
    mask: OutlierMask,
    iterations: Vec<NotchingIteration>,
    requested: BatchLayout,
}

impl NotchedBatchMaxGumbel {
    pub fn new(
        samples: &[f64],
        coordinates: &[f64],
        batching: Batching,
        notching: &NotchingConfig,
    ) -> Result<Self> {
        Self::with_options(samples, coordinates, batching, notching, FitOptions::default())
    }

    pub fn with_options(
        samples: &[f64],
        coordinates: &[f64],
        batching: Batching,
        notching: &NotchingConfig,
        options: FitOptions,
    ) -> Result<Self> {
        let requested = batching.resolve(samples.len())?;
        let outcome = compute_outlier_mask(samples, coordinates, notching)?;
        let kept = outcome.mask.apply(samples);

        if kept.is_empty() {
            return Err(DistromaxError::configuration(
                "notching excluded every sample",
            ));
        }
        if kept.len() < requested.batch_size {
            return Err(DistromaxError::configuration(format!(
                "{} samples survive notching, fewer than one batch of {}",
                kept.len(),
                requested.batch_size
            )));
        }

        let inner = BatchMaxGumbel::with_options(
            &kept,
            Batching::BySize(requested.batch_size),
            options,
        )?;
        let lost = requested.batch_count.saturating_sub(inner.batch_count());
        if lost > 0 {
            warn!(
                requested = requested.batch_count,
                achieved = inner.batch_count(),
                excluded = outcome.mask.excluded_count(),
                "notching cost whole batches"
            );
        }
        info!(
            excluded = outcome.mask.excluded_count(),
            notched_coordinates = outcome.mask.notched_coordinates().len(),
            iterations = outcome.iterations.len(),
            "built notched batch-max Gumbel estimator"
        );

        Ok(Self {
            inner,
            mask: outcome.mask,
            iterations: outcome.iterations,
            requested,
        })
    }

    pub fn requested_batches(&self) -> usize {
        self.requested.batch_count
    }

    pub fn achieved_batches(&self) -> usize {
        self.inner.batch_count()
    }

    pub fn lost_batches(&self) -> usize {
        self.requested_batches().saturating_sub(self.achieved_batches())
    }

    pub fn outlier_mask(&self) -> &OutlierMask {
        &self.mask
    }

    pub fn notching_iterations(&self) -> &[NotchingIteration] {
        &self.iterations
    }

    /// The estimator fitted on the surviving samples.
    pub fn inner(&self) -> &BatchMaxGumbel {
        &self.inner
    }

    pub fn compute_batch_maxima(&self) -> &BatchMaxima {
        self.inner.compute_batch_maxima()
    }

    pub fn batch_layout(&self) -> BatchLayout {
        self.inner.batch_layout()
    }

    pub fn fit(&self) -> Result<Gumbel> {
        self.inner.fit()
    }

    pub fn propagate_max(&self, n: u64) -> Result<Gumbel> {
        self.inner.propagate_max(n)
    }
}

impl GumbelEstimator for NotchedBatchMaxGumbel {
    fn fit(&self) -> Result<Gumbel> {
        self.inner.fit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notching::{StoppingRule, ThresholdRule};
    use crate::testing::{BandedSearch, gamma_samples};

    fn local_robust() -> NotchingConfig {
        NotchingConfig {
            threshold: ThresholdRule::LocalRobust {
                neighborhood: 50.0,
                k: 15.0,
            },
            ..NotchingConfig::default()
        }
    }

    #[test]
    fn matches_manual_removal_of_a_spike() {
        let clean = gamma_samples(2.0, 1.0, 10_000, 99);
        let mut samples = clean.clone();
        samples[5000] = 1000.0;
        let coords: Vec<f64> = (0..samples.len()).map(|i| i as f64).collect();

        let notched =
            NotchedBatchMaxGumbel::new(&samples, &coords, Batching::BySize(100), &local_robust())
                .unwrap();
        assert_eq!(notched.outlier_mask().excluded_count(), 1);
        assert_eq!(notched.requested_batches(), 100);
        assert_eq!(notched.achieved_batches(), 99);
        assert_eq!(notched.lost_batches(), 1);

        let mut manual = clean;
        manual.remove(5000);
        let reference = BatchMaxGumbel::new(&manual, Batching::BySize(100))
            .unwrap()
            .fit()
            .unwrap();
        let fit = notched.fit().unwrap();
        assert!((fit.location() - reference.location()).abs() < 1e-9);
        assert!((fit.scale() - reference.scale()).abs() < 1e-9);
    }

    #[test]
    fn by_count_keeps_the_unnotched_batch_size() {
        let search = BandedSearch::new(1000, 100, 11).with_loud_band(400, 10, 60.0);
        let notched = NotchedBatchMaxGumbel::new(
            &search.samples,
            &search.coordinates,
            Batching::ByCount(100),
            &local_robust(),
        )
        .unwrap();
        assert_eq!(notched.batch_layout().batch_size, 1000);
        assert_eq!(notched.requested_batches(), 100);
        assert_eq!(notched.achieved_batches(), 99);

        // the loud band no longer drags the fit upwards
        let fit = notched.fit().unwrap();
        assert!(fit.location() < 20.0, "{fit:?}");
    }

    #[test]
    fn notching_everything_is_a_configuration_error() {
        let samples = [5.0, 6.0, 7.0, 8.0];
        let coords = [0.0, 1.0, 2.0, 3.0];
        let config = NotchingConfig {
            threshold: ThresholdRule::Fixed { value: 1.0 },
            stopping: StoppingRule::None,
            ..NotchingConfig::default()
        };
        let err =
            NotchedBatchMaxGumbel::new(&samples, &coords, Batching::BySize(2), &config).unwrap_err();
        assert!(matches!(err, DistromaxError::Configuration(_)), "{err}");
    }

    #[test]
    fn too_few_survivors_for_one_batch() {
        let search = BandedSearch::new(10, 10, 2).with_loud_band(0, 9, 50.0);
        let config = NotchingConfig {
            threshold: ThresholdRule::Fixed { value: 30.0 },
            stopping: StoppingRule::None,
            ..NotchingConfig::default()
        };
        let err = NotchedBatchMaxGumbel::new(
            &search.samples,
            &search.coordinates,
            Batching::BySize(50),
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, DistromaxError::Configuration(_)), "{err}");
    }

    #[test]
    fn delegates_propagation() {
        let search = BandedSearch::new(200, 50, 4);
        let notched = NotchedBatchMaxGumbel::new(
            &search.samples,
            &search.coordinates,
            Batching::ByCount(50),
            &local_robust(),
        )
        .unwrap();
        let one = notched.fit().unwrap();
        let many = GumbelEstimator::propagate_max(&notched, 10).unwrap();
        assert_eq!(many, one.max_of(10).unwrap());
        assert_eq!(notched.compute_batch_maxima().len(), notched.achieved_batches());
    }
}
