use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumDiscriminants, EnumString};

use crate::error::{DistromaxError, Result, ensure_finite};

/// How a sample set is partitioned into batches.
///
/// The two granularities are mutually exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, EnumDiscriminants)]
#[serde(rename_all = "snake_case")]
#[strum_discriminants(name(BatchingKind), derive(Display, EnumString))]
pub enum Batching {
    /// Split into exactly this many batches.
    ByCount(usize),
    /// Split into batches holding this many samples each.
    BySize(usize),
}

impl Batching {
    /// Resolves the partition for `n_samples` values.
    ///
    /// Fails when the request is zero or when not even one full batch (for
    /// `BySize`) or one sample per batch (for `ByCount`) is available.
    pub fn resolve(&self, n_samples: usize) -> Result<BatchLayout> {
        let (batch_size, batch_count) = match *self {
            Batching::ByCount(0) => {
                return Err(DistromaxError::configuration(
                    "batch count must be at least 1",
                ));
            }
            Batching::BySize(0) => {
                return Err(DistromaxError::configuration(
                    "batch size must be at least 1",
                ));
            }
            Batching::ByCount(count) => (n_samples / count, count),
            Batching::BySize(size) => (size, n_samples / size),
        };

        if batch_size < 1 || batch_count < 1 {
            return Err(DistromaxError::configuration(format!(
                "{n_samples} samples cannot fill one full batch with {self:?}"
            )));
        }

        Ok(BatchLayout {
            batch_size,
            batch_count,
            discarded: n_samples - batch_size * batch_count,
        })
    }

    pub fn kind(&self) -> BatchingKind {
        BatchingKind::from(self)
    }
}

/// A resolved partition: `batch_count` contiguous batches of `batch_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchLayout {
    pub batch_size: usize,
    pub batch_count: usize,
    /// Trailing samples that did not fill a batch and were dropped.
    pub discarded: usize,
}

impl BatchLayout {
    pub fn used_samples(&self) -> usize {
        self.batch_size * self.batch_count
    }
}

/// Per-batch maxima of a sample set, in batch order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchMaxima {
    layout: BatchLayout,
    maxima: Vec<f64>,
}

impl BatchMaxima {
    /// Partitions `samples` contiguously according to `batching` and keeps
    /// the maximum of every batch. No reordering is performed.
    pub fn compute(samples: &[f64], batching: Batching) -> Result<Self> {
        ensure_finite("samples", samples)?;
        let layout = batching.resolve(samples.len())?;
        if layout.discarded > 0 {
            tracing::debug!(
                discarded = layout.discarded,
                batch_size = layout.batch_size,
                "dropping trailing samples that do not fill a batch"
            );
        }

        let maxima = samples[..layout.used_samples()]
            .chunks_exact(layout.batch_size)
            .map(|batch| batch.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            .collect();

        Ok(Self { layout, maxima })
    }

    pub fn layout(&self) -> BatchLayout {
        self.layout
    }

    pub fn values(&self) -> &[f64] {
        &self.maxima
    }

    pub fn len(&self) -> usize {
        self.maxima.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maxima.is_empty()
    }
}
