use std::f64::consts::PI;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::distributions::Gumbel;
use crate::error::{DistromaxError, Result, ensure_finite};
use crate::utils::math::{EULER_GAMMA, mean, sample_variance};

fn default_max_iterations() -> usize {
    200
}

fn default_tolerance() -> f64 {
    1e-12
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FitMethod {
    /// Maximum likelihood, solved iteratively.
    #[default]
    MaximumLikelihood,
    /// Closed-form method of moments.
    Moments,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FitOptions {
    #[serde(default)]
    #[schemars(title = "Method", description = "Gumbel parameter estimator")]
    pub method: FitMethod,

    #[serde(default = "default_max_iterations")]
    #[schemars(
        title = "Max iterations",
        description = "Iteration budget of the maximum-likelihood solver",
        range(min = 1)
    )]
    pub max_iterations: usize,

    #[serde(default = "default_tolerance")]
    #[schemars(
        title = "Tolerance",
        description = "Relative convergence tolerance on the scale parameter"
    )]
    pub tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            method: FitMethod::default(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
        }
    }
}

impl FitOptions {
    pub fn moments() -> Self {
        Self {
            method: FitMethod::Moments,
            ..Default::default()
        }
    }
}

/// Fits a Gumbel law to `data` with the default maximum-likelihood options.
pub fn fit_gumbel(data: &[f64]) -> Result<Gumbel> {
    fit_gumbel_with(data, &FitOptions::default())
}

pub fn fit_gumbel_with(data: &[f64], options: &FitOptions) -> Result<Gumbel> {
    ensure_finite("data", data)?;
    if data.len() < 2 {
        return Err(DistromaxError::DegenerateInput(format!(
            "need at least 2 values to fit a Gumbel law, got {}",
            data.len()
        )));
    }
    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let variance = sample_variance(data);
    // the mean of identical values need not round back to the value
    if min == max || !(variance > 0.0) {
        return Err(identical_values());
    }

    match options.method {
        FitMethod::Moments => moments(data, variance),
        FitMethod::MaximumLikelihood => maximum_likelihood(data, variance, options),
    }
}

fn identical_values() -> DistromaxError {
    DistromaxError::DegenerateInput(
        "all values are identical, the Gumbel scale is undefined".into(),
    )
}

fn moments(data: &[f64], variance: f64) -> Result<Gumbel> {
    let scale = variance.sqrt() * 6f64.sqrt() / PI;
    Gumbel::new(mean(data) - EULER_GAMMA * scale, scale)
}

/// Log-sum-exp friendly weighted sums over centered data `y`:
/// returns `(Σ w, Σ w y, Σ w y²)` with `w = exp(-(y - y_min)/β)`.
fn weighted_sums(y: &[f64], y_min: f64, scale: f64) -> (f64, f64, f64) {
    y.iter().fold((0.0, 0.0, 0.0), |(s0, s1, s2), &v| {
        let w = (-(v - y_min) / scale).exp();
        (s0 + w, s1 + w * v, s2 + w * v * v)
    })
}

/// Solves the profile likelihood equation for β,
///
/// ```text
/// g(β) = x̄ - Σ x e^{-x/β} / Σ e^{-x/β} - β = 0,
/// ```
///
/// which has a single root in `(0, x̄ - x_min]` because `g` is strictly
/// decreasing there. Newton steps are kept inside the bracket, falling back
/// to bisection, and the location follows in closed form.
fn maximum_likelihood(data: &[f64], variance: f64, options: &FitOptions) -> Result<Gumbel> {
    let x_bar = mean(data);
    let y: Vec<f64> = data.iter().map(|x| x - x_bar).collect();
    let y_min = y.iter().copied().fold(f64::INFINITY, f64::min);

    let mut lo = 0.0_f64;
    let mut hi = -y_min;
    if !(hi > 0.0) {
        return Err(identical_values());
    }
    let mut scale = (variance.sqrt() * 6f64.sqrt() / PI).clamp(hi * 1e-3, hi);

    for _ in 0..options.max_iterations {
        let (s0, s1, s2) = weighted_sums(&y, y_min, scale);
        let weighted_mean = s1 / s0;
        let weighted_var = (s2 / s0 - weighted_mean * weighted_mean).max(0.0);

        let g = -weighted_mean - scale;
        if g > 0.0 {
            lo = scale;
        } else {
            hi = scale;
        }

        let dg = -weighted_var / (scale * scale) - 1.0;
        let newton = scale - g / dg;
        let next = if newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };

        if (next - scale).abs() <= options.tolerance * scale {
            return finish(data, &y, y_min, x_bar, next);
        }
        scale = next;
    }

    Err(DistromaxError::NotConverged {
        iterations: options.max_iterations,
        context: "Gumbel maximum-likelihood fit",
    })
}

fn finish(data: &[f64], y: &[f64], y_min: f64, x_bar: f64, scale: f64) -> Result<Gumbel> {
    let (s0, _, _) = weighted_sums(y, y_min, scale);
    let location = x_bar + y_min - scale * (s0 / data.len() as f64).ln();
    Gumbel::new(location, scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::gumbel_samples;

    #[test]
    fn rejects_too_few_and_constant_values() {
        assert!(matches!(
            fit_gumbel(&[1.0]),
            Err(DistromaxError::DegenerateInput(_))
        ));
        assert!(matches!(
            fit_gumbel(&[]),
            Err(DistromaxError::DegenerateInput(_))
        ));
        for options in [FitOptions::default(), FitOptions::moments()] {
            let err = fit_gumbel_with(&[4.2; 50], &options).unwrap_err();
            assert!(matches!(err, DistromaxError::DegenerateInput(_)));
        }
    }

    #[test]
    fn values_one_ulp_apart_never_panic() {
        let mut data = vec![4.2_f64; 99];
        data.push(f64::from_bits(4.2_f64.to_bits() + 1));
        for options in [FitOptions::default(), FitOptions::moments()] {
            match fit_gumbel_with(&data, &options) {
                Ok(fit) => assert!(fit.scale() > 0.0 && fit.location().is_finite()),
                Err(err) => assert!(
                    matches!(
                        err,
                        DistromaxError::DegenerateInput(_) | DistromaxError::NotConverged { .. }
                    ),
                    "{err}"
                ),
            }
        }
    }

    #[test]
    fn rejects_non_finite_values() {
        let err = fit_gumbel(&[1.0, f64::NAN, 2.0]).unwrap_err();
        assert!(matches!(err, DistromaxError::Domain { name: "data", .. }));
    }

    #[test]
    fn mle_recovers_known_parameters() {
        for &(loc, scale, seed) in &[(0.0, 1.0, 7), (10.0, 5.0, 11), (50.0, 0.2, 13)] {
            let data = gumbel_samples(loc, scale, 20_000, seed);
            let fit = fit_gumbel(&data).unwrap();
            assert!(
                (fit.location() - loc).abs() < 0.05 * scale,
                "loc {} vs {loc}",
                fit.location()
            );
            assert!(
                (fit.scale() / scale - 1.0).abs() < 0.03,
                "scale {} vs {scale}",
                fit.scale()
            );
        }
    }

    #[test]
    fn mle_is_a_stationary_point_of_the_likelihood() {
        let data = gumbel_samples(3.0, 2.0, 2_000, 5);
        let fit = fit_gumbel(&data).unwrap();
        let ll = |loc: f64, scale: f64| -> f64 {
            let g = Gumbel::new(loc, scale).unwrap();
            data.iter().map(|&x| g.log_pdf(x)).sum()
        };
        let best = ll(fit.location(), fit.scale());
        for &(dl, ds) in &[(1e-3, 0.0), (-1e-3, 0.0), (0.0, 1e-3), (0.0, -1e-3)] {
            assert!(ll(fit.location() + dl, fit.scale() + ds) <= best);
        }
    }

    #[test]
    fn moments_and_mle_agree_on_gumbel_data() {
        let data = gumbel_samples(-2.0, 0.7, 50_000, 99);
        let mle = fit_gumbel(&data).unwrap();
        let mom = fit_gumbel_with(&data, &FitOptions::moments()).unwrap();
        assert!((mle.location() - mom.location()).abs() < 0.03);
        assert!((mle.scale() - mom.scale()).abs() < 0.03);
    }

    #[test]
    fn handles_large_offsets_without_overflow() {
        let data: Vec<f64> = gumbel_samples(0.0, 1.0, 5_000, 3)
            .into_iter()
            .map(|x| x + 1.0e6)
            .collect();
        let fit = fit_gumbel(&data).unwrap();
        assert!((fit.location() - 1.0e6).abs() < 0.1);
        assert!((fit.scale() - 1.0).abs() < 0.05);
    }

    #[test]
    fn exhausted_budget_is_reported() {
        let data = gumbel_samples(0.0, 1.0, 500, 1);
        let options = FitOptions {
            max_iterations: 1,
            tolerance: 0.0,
            ..Default::default()
        };
        let err = fit_gumbel_with(&data, &options).unwrap_err();
        assert!(matches!(
            err,
            DistromaxError::NotConverged { iterations: 1, .. }
        ));
    }

    #[test]
    fn method_names_parse() {
        use std::str::FromStr;
        assert_eq!(FitMethod::MaximumLikelihood.to_string(), "maximum_likelihood");
        assert_eq!(FitMethod::from_str("moments").unwrap(), FitMethod::Moments);
    }
}
