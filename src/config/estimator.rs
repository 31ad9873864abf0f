use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::ConfigDocument;
use crate::distributions::FitOptions;
use crate::error::{DistromaxError, Result};
use crate::estimators::{BatchMaxGumbel, GumbelEstimator, NotchedBatchMaxGumbel};
use crate::notching::NotchingConfig;
use crate::sampling::Batching;

/// Settings of the empirical block-maxima estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EstimatorConfig {
    #[schemars(
        title = "Batching",
        description = "Either {\"by_count\": B} or {\"by_size\": s}"
    )]
    pub batching: Batching,

    #[serde(default)]
    pub fit: FitOptions,

    /// Notch contaminated coordinates before batching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notching: Option<NotchingConfig>,
}

impl EstimatorConfig {
    pub fn new(batching: Batching) -> Self {
        Self {
            batching,
            fit: FitOptions::default(),
            notching: None,
        }
    }

    pub fn with_notching(mut self, notching: NotchingConfig) -> Self {
        self.notching = Some(notching);
        self
    }

    /// Builds the configured estimator over `samples`.
    ///
    /// `coordinates` are required when notching is configured and ignored
    /// otherwise.
    pub fn build(
        &self,
        samples: &[f64],
        coordinates: Option<&[f64]>,
    ) -> Result<Box<dyn GumbelEstimator>> {
        match (&self.notching, coordinates) {
            (Some(notching), Some(coordinates)) => Ok(Box::new(
                NotchedBatchMaxGumbel::with_options(
                    samples,
                    coordinates,
                    self.batching,
                    notching,
                    self.fit,
                )?,
            )),
            (Some(_), None) => Err(DistromaxError::configuration(
                "notching requires one coordinate per sample",
            )),
            (None, coordinates) => {
                if coordinates.is_some() {
                    debug!("coordinates given without notching, ignoring them");
                }
                Ok(Box::new(BatchMaxGumbel::with_options(
                    samples,
                    self.batching,
                    self.fit,
                )?))
            }
        }
    }
}

impl ConfigDocument for EstimatorConfig {
    fn check_raw(value: &Value) -> Result<()> {
        let Some(batching) = value.get("batching").and_then(Value::as_object) else {
            return Ok(());
        };
        if batching.len() != 1 {
            return Err(DistromaxError::configuration(
                "batching takes exactly one of by_count or by_size",
            ));
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.fit.max_iterations == 0 {
            return Err(DistromaxError::configuration(
                "fit needs at least one iteration",
            ));
        }
        if !(self.fit.tolerance.is_finite() && self.fit.tolerance > 0.0) {
            return Err(DistromaxError::configuration(
                "fit tolerance must be finite and positive",
            ));
        }
        match self.notching {
            Some(notching) => notching.validate(),
            None => Ok(()),
        }
    }
}
