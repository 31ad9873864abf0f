use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::coordinate_bins::CoordinateBins;
use super::outlier_mask::OutlierMask;
use super::threshold::{StoppingRule, ThresholdRule, histogram_minimum_threshold};
use crate::error::{DistromaxError, Result, ensure_finite};
use crate::utils::math::{MAD_TO_SIGMA, median_and_mad_in_place};

fn default_iterations() -> usize {
    5
}

fn default_window_width() -> f64 {
    0.0
}

/// How contaminated coordinates are found and removed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NotchingConfig {
    /// Samples whose coordinate lies within this distance of a flagged
    /// coordinate are excluded as well.
    #[serde(default = "default_window_width")]
    #[schemars(range(min = 0.0))]
    pub window_width: f64,

    #[serde(default)]
    pub threshold: ThresholdRule,

    #[serde(default)]
    pub stopping: StoppingRule,

    #[serde(default = "default_iterations")]
    #[schemars(range(min = 1))]
    pub iterations: usize,
}

impl Default for NotchingConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            threshold: ThresholdRule::default(),
            stopping: StoppingRule::default(),
            iterations: default_iterations(),
        }
    }
}

impl NotchingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.window_width.is_finite() && self.window_width >= 0.0) {
            return Err(DistromaxError::configuration(
                "notch window width must be finite and non-negative",
            ));
        }
        if self.iterations == 0 {
            return Err(DistromaxError::configuration(
                "notching needs at least one iteration",
            ));
        }
        self.threshold.validate()?;
        self.stopping.validate()
    }

    /// Iterations actually run. A fixed threshold flags the same
    /// coordinates every time, so it runs once.
    pub fn effective_iterations(&self) -> usize {
        match self.threshold {
            ThresholdRule::Fixed { .. } => 1,
            _ => self.iterations,
        }
    }
}

/// Summary of one notching pass.
#[derive(Debug, Clone, PartialEq)]
pub struct NotchingIteration {
    pub iteration: usize,
    /// Global threshold, when the rule produces one.
    pub threshold: Option<f64>,
    pub floor: Option<f64>,
    pub notched_samples: usize,
    pub notched_coordinates: usize,
    pub remaining_samples: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotchingOutcome {
    pub mask: OutlierMask,
    pub iterations: Vec<NotchingIteration>,
}

/// Flags contaminated samples by `coordinates`, repeating on the survivors
/// until an iteration notches nothing or the iteration budget runs out.
pub fn compute_outlier_mask(
    samples: &[f64],
    coordinates: &[f64],
    config: &NotchingConfig,
) -> Result<NotchingOutcome> {
    config.validate()?;
    if samples.len() != coordinates.len() {
        return Err(DistromaxError::configuration(format!(
            "{} samples but {} coordinates",
            samples.len(),
            coordinates.len()
        )));
    }
    ensure_finite("samples", samples)?;
    ensure_finite("coordinates", coordinates)?;

    let budget = config.effective_iterations();
    if budget < config.iterations {
        info!(
            requested = config.iterations,
            "fixed threshold is deterministic, running a single notching iteration"
        );
    }

    let mut excluded = vec![false; samples.len()];
    let mut flagged_all = Vec::new();
    let mut report = Vec::new();

    for iteration in 1..=budget {
        let kept: Vec<usize> = (0..samples.len()).filter(|&i| !excluded[i]).collect();
        if kept.is_empty() {
            break;
        }
        let kept_samples: Vec<f64> = kept.iter().map(|&i| samples[i]).collect();
        let kept_coords: Vec<f64> = kept.iter().map(|&i| coordinates[i]).collect();
        let bins = CoordinateBins::build(&kept_samples, &kept_coords);
        let floor = config.stopping.floor(bins.maxima());

        let (threshold, flagged) = flag_coordinates(&bins, &kept_samples, config, floor);
        let notched = exclude_near(&flagged, config.window_width, coordinates, &mut excluded);
        let remaining = excluded.iter().filter(|&&e| !e).count();

        info!(
            iteration,
            threshold = ?threshold,
            floor = ?floor,
            notched_coordinates = flagged.len(),
            notched_samples = notched,
            remaining_samples = remaining,
            "notching iteration"
        );
        report.push(NotchingIteration {
            iteration,
            threshold,
            floor,
            notched_samples: notched,
            notched_coordinates: flagged.len(),
            remaining_samples: remaining,
        });
        flagged_all.extend(flagged);

        if notched == 0 {
            break;
        }
    }

    Ok(NotchingOutcome {
        mask: OutlierMask::new(excluded, flagged_all),
        iterations: report,
    })
}

/// Coordinates flagged in one pass over `bins`, plus the global threshold
/// when the rule has one.
fn flag_coordinates(
    bins: &CoordinateBins,
    samples: &[f64],
    config: &NotchingConfig,
    floor: Option<f64>,
) -> (Option<f64>, Vec<f64>) {
    let threshold = match config.threshold {
        ThresholdRule::Fixed { value } => value,
        ThresholdRule::HistogramMinimum => match histogram_minimum_threshold(bins.maxima()) {
            Some(t) => t,
            None => {
                warn!("per-coordinate maxima are not bimodal, no histogram threshold found");
                return (None, Vec::new());
            }
        },
        ThresholdRule::LocalRobust { neighborhood, k } => {
            return (None, flag_locally(bins, samples, neighborhood, k, floor));
        }
    };

    if floor.is_some_and(|f| threshold < f) {
        return (Some(threshold), Vec::new());
    }
    let flagged = bins
        .coordinates()
        .iter()
        .zip(bins.maxima())
        .filter(|&(_, &m)| m > threshold)
        .map(|(&c, _)| c)
        .collect();
    (Some(threshold), flagged)
}

fn flag_locally(
    bins: &CoordinateBins,
    samples: &[f64],
    neighborhood: f64,
    k: f64,
    floor: Option<f64>,
) -> Vec<f64> {
    let floor = floor.unwrap_or(f64::NEG_INFINITY);
    let mut scratch = Vec::new();
    let mut flagged = Vec::new();
    for b in 0..bins.len() {
        if bins.maxima()[b] <= floor {
            continue;
        }
        let (first, last) = bins.neighborhood(b, neighborhood);
        scratch.clear();
        scratch.extend(bins.members(first, last).iter().map(|&i| samples[i]));
        let (median, mad) = median_and_mad_in_place(&mut scratch);
        // a flat neighbourhood has zero MAD; fall back to one ulp of the median
        let spread = if mad > 0.0 {
            MAD_TO_SIGMA * mad
        } else {
            f64::EPSILON * median.abs().max(1.0)
        };
        let limit = (median + k * spread).max(floor);
        if bins.members(b, b).iter().any(|&i| samples[i] > limit) {
            flagged.push(bins.coordinates()[b]);
        }
    }
    flagged
}

/// Marks every not-yet-excluded sample within `width` of a flagged
/// coordinate. Returns how many samples were newly excluded.
fn exclude_near(flagged: &[f64], width: f64, coordinates: &[f64], excluded: &mut [bool]) -> usize {
    if flagged.is_empty() {
        return 0;
    }
    let mut sorted = flagged.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut count = 0;
    for (flag, &c) in excluded.iter_mut().zip(coordinates) {
        if *flag {
            continue;
        }
        let at = sorted.partition_point(|&x| x < c - width);
        if sorted.get(at).is_some_and(|&x| x <= c + width) {
            *flag = true;
            count += 1;
        }
    }
    count
}
