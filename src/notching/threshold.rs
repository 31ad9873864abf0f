use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumDiscriminants, EnumString};

use crate::error::{DistromaxError, Result};
use crate::utils::math::quantile;

const HISTOGRAM_BINS: usize = 256;
const MAX_SMOOTHING_PASSES: usize = 10_000;

/// Decides which samples count as contaminated.
#[derive(
    Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema, EnumDiscriminants,
)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum_discriminants(name(ThresholdKind), derive(Display, EnumString))]
pub enum ThresholdRule {
    /// Coordinates whose loudest sample exceeds `value`.
    Fixed { value: f64 },

    /// Samples exceeding the median of their neighbourhood by more than `k`
    /// scaled median absolute deviations. The neighbourhood holds every
    /// sample whose coordinate is within `neighborhood` of the sample's own.
    LocalRobust { neighborhood: f64, k: f64 },

    /// Global threshold at the valley of the bimodal histogram of
    /// per-coordinate maxima.
    #[default]
    HistogramMinimum,
}

impl ThresholdRule {
    pub fn kind(&self) -> ThresholdKind {
        ThresholdKind::from(self)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match *self {
            ThresholdRule::Fixed { value } => {
                if !value.is_finite() {
                    return Err(DistromaxError::configuration(
                        "fixed threshold must be finite",
                    ));
                }
            }
            ThresholdRule::LocalRobust { neighborhood, k } => {
                if !(neighborhood.is_finite() && neighborhood >= 0.0) {
                    return Err(DistromaxError::configuration(
                        "local neighborhood must be finite and non-negative",
                    ));
                }
                if !(k.is_finite() && k > 0.0) {
                    return Err(DistromaxError::configuration(
                        "robust multiplier k must be finite and positive",
                    ));
                }
            }
            ThresholdRule::HistogramMinimum => {}
        }
        Ok(())
    }
}

/// A floor on the detection statistic below which nothing is notched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoppingRule {
    None,
    Value { value: f64 },
    /// Quantile `q` of the per-coordinate maxima.
    Quantile { q: f64 },
}

impl Default for StoppingRule {
    fn default() -> Self {
        StoppingRule::Quantile { q: 0.8 }
    }
}

impl StoppingRule {
    pub(crate) fn validate(&self) -> Result<()> {
        match *self {
            StoppingRule::Value { value } if !value.is_finite() => Err(
                DistromaxError::configuration("stopping value must be finite"),
            ),
            StoppingRule::Quantile { q } if !(0.0..=1.0).contains(&q) => Err(
                DistromaxError::configuration("stopping quantile must lie in [0, 1]"),
            ),
            _ => Ok(()),
        }
    }

    pub(crate) fn floor(&self, maxima: &[f64]) -> Option<f64> {
        match *self {
            StoppingRule::None => None,
            StoppingRule::Value { value } => Some(value),
            StoppingRule::Quantile { q } => Some(quantile(maxima, q)),
        }
    }
}

/// Threshold at the minimum between the two modes of a 256-bin histogram.
///
/// The histogram is smoothed with a 3-point running mean (reflecting at the
/// edges) until fewer than three local maxima remain. Returns `None` when
/// the histogram never becomes bimodal or `values` spans a single point.
pub fn histogram_minimum_threshold(values: &[f64]) -> Option<f64> {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(hi > lo) {
        return None;
    }

    let width = (hi - lo) / HISTOGRAM_BINS as f64;
    let mut hist = vec![0.0_f64; HISTOGRAM_BINS];
    for &v in values {
        let bin = (((v - lo) / width) as usize).min(HISTOGRAM_BINS - 1);
        hist[bin] += 1.0;
    }

    let mut peaks = Vec::new();
    let mut bimodal = false;
    for _ in 0..MAX_SMOOTHING_PASSES {
        hist = smooth3(&hist);
        peaks = local_maxima(&hist);
        if peaks.len() < 3 {
            bimodal = peaks.len() == 2;
            break;
        }
    }
    if !bimodal {
        return None;
    }

    let (left, right) = (peaks[0], peaks[1]);
    let valley = (left..=right)
        .min_by(|&a, &b| hist[a].total_cmp(&hist[b]).then(a.cmp(&b)))
        .unwrap_or(left);
    Some(lo + (valley as f64 + 0.5) * width)
}

/// 3-point running mean. Subnormal results are flushed to zero so that
/// rounding in the far tails cannot create spurious peaks.
fn smooth3(hist: &[f64]) -> Vec<f64> {
    let n = hist.len();
    (0..n)
        .map(|i| {
            let prev = hist[i.saturating_sub(1)];
            let next = hist[(i + 1).min(n - 1)];
            let v = (prev + hist[i] + next) / 3.0;
            if v < f64::MIN_POSITIVE { 0.0 } else { v }
        })
        .collect()
}

/// Indices where the histogram turns from rising (or flat after rising) to
/// falling. A plateau reports its last index; a histogram still rising at
/// its right edge peaks there.
fn local_maxima(hist: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    let mut rising = true;
    for i in 0..hist.len().saturating_sub(1) {
        if rising {
            if hist[i + 1] < hist[i] {
                rising = false;
                peaks.push(i);
            }
        } else if hist[i + 1] > hist[i] {
            rising = true;
        }
    }
    if rising && hist.len() > 1 {
        peaks.push(hist.len() - 1);
    }
    peaks
}
