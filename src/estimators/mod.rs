pub mod analytical_gamma_to_gumbel;
pub mod batch_max_gumbel;
pub mod estimator;
pub mod notched_batch_max_gumbel;

pub use analytical_gamma_to_gumbel::{
    AnalyticalGammaToGumbel, AsymptoticExpansion, GammaLaw, GammaLawKind,
};
pub use batch_max_gumbel::BatchMaxGumbel;
pub use estimator::GumbelEstimator;
pub use notched_batch_max_gumbel::NotchedBatchMaxGumbel;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::Batching;
    use crate::testing::gamma_samples;

    #[test]
    fn empirical_fit_agrees_with_the_analytical_law() {
        let samples = gamma_samples(2.0, 1.0, 10_000, 42);
        let estimators: Vec<Box<dyn GumbelEstimator>> = vec![
            Box::new(BatchMaxGumbel::new(&samples, Batching::ByCount(100)).unwrap())
                as Box<dyn GumbelEstimator>,
            Box::new(
                AnalyticalGammaToGumbel::new(
                    GammaLaw::ShapeScale {
                        shape: 2.0,
                        scale: 1.0,
                    },
                    100,
                )
                .unwrap(),
            ),
        ];
        let fits: Vec<_> = estimators.iter().map(|e| e.fit().unwrap()).collect();
        let (empirical, analytical) = (fits[0], fits[1]);

        assert!(
            (empirical.location() - analytical.location()).abs() < 0.5,
            "{empirical:?} vs {analytical:?}"
        );
        assert!(
            (empirical.scale() - analytical.scale()).abs() < 0.4,
            "{empirical:?} vs {analytical:?}"
        );

        // the 1000-fold maximum stays comparable after propagation
        let empirical = estimators[0].propagate_max(1000).unwrap();
        let analytical = estimators[1].propagate_max(1000).unwrap();
        assert!((empirical.median() - analytical.median()).abs() < 4.0);
    }
}
