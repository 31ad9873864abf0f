use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{DistromaxError, Result};
use crate::utils::math::EULER_GAMMA;

/// Location/scale pair of a right-skewed Gumbel law.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GumbelParameters {
    pub location: f64,
    pub scale: f64,
}

/// Gumbel (extreme value type I, maximum) distribution.
///
/// ```text
/// F(x; μ, β) = exp(-exp(-(x - μ)/β))
/// ```
///
/// This is the object returned by every estimator in the crate, so the
/// empirical batch-maximum fit and the analytical Gamma asymptotic can be
/// compared through the same queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gumbel {
    location: f64,
    scale: f64,
}

impl Gumbel {
    /// Fails with [`DistromaxError::Domain`] unless `location` is finite and
    /// `scale` is finite and strictly positive.
    pub fn new(location: f64, scale: f64) -> Result<Self> {
        if !location.is_finite() {
            return Err(DistromaxError::domain(
                "location",
                location,
                "location must be finite",
            ));
        }
        if !(scale > 0.0 && scale.is_finite()) {
            return Err(DistromaxError::domain(
                "scale",
                scale,
                "scale must be finite and positive",
            ));
        }
        Ok(Self { location, scale })
    }

    pub fn from_parameters(parameters: GumbelParameters) -> Result<Self> {
        Self::new(parameters.location, parameters.scale)
    }

    pub fn location(&self) -> f64 {
        self.location
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn parameters(&self) -> GumbelParameters {
        GumbelParameters {
            location: self.location,
            scale: self.scale,
        }
    }

    #[inline]
    fn standardize(&self, x: f64) -> f64 {
        (x - self.location) / self.scale
    }

    pub fn cdf(&self, x: f64) -> f64 {
        (-(-self.standardize(x)).exp()).exp()
    }

    /// Survival function `1 - cdf(x)`, accurate deep in the upper tail.
    pub fn sf(&self, x: f64) -> f64 {
        -(-(-self.standardize(x)).exp()).exp_m1()
    }

    /// Density, evaluated in log space so the far lower tail goes to 0
    /// instead of overflowing.
    pub fn pdf(&self, x: f64) -> f64 {
        self.log_pdf(x).exp()
    }

    pub fn log_pdf(&self, x: f64) -> f64 {
        let z = self.standardize(x);
        -self.scale.ln() - z - (-z).exp()
    }

    /// Inverse CDF, defined on the open interval `(0, 1)`.
    pub fn quantile(&self, p: f64) -> Result<f64> {
        if !(p > 0.0 && p < 1.0) {
            return Err(DistromaxError::domain(
                "p",
                p,
                "probability must lie in (0, 1)",
            ));
        }
        Ok(self.location - self.scale * (-p.ln()).ln())
    }

    pub fn mean(&self) -> f64 {
        self.location + EULER_GAMMA * self.scale
    }

    pub fn variance(&self) -> f64 {
        PI * PI / 6.0 * self.scale * self.scale
    }

    pub fn std_dev(&self) -> f64 {
        PI / 6f64.sqrt() * self.scale
    }

    pub fn median(&self) -> f64 {
        self.location - self.scale * 2f64.ln().ln()
    }

    /// Equal-tailed interval holding `confidence` of the probability mass.
    pub fn interval(&self, confidence: f64) -> Result<(f64, f64)> {
        if !(confidence > 0.0 && confidence < 1.0) {
            return Err(DistromaxError::domain(
                "confidence",
                confidence,
                "confidence must lie in (0, 1)",
            ));
        }
        let tail = 0.5 * (1.0 - confidence);
        Ok((self.quantile(tail)?, self.quantile(1.0 - tail)?))
    }

    /// Distribution of the maximum of `n` independent copies.
    ///
    /// Max-stability gives `Gumbel(μ + β ln n, β)` exactly.
    pub fn max_of(&self, n: u64) -> Result<Self> {
        if n < 1 {
            return Err(DistromaxError::domain(
                "n",
                n as f64,
                "number of realizations must be at least 1",
            ));
        }
        Self::new(self.location + self.scale * (n as f64).ln(), self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(Gumbel::new(0.0, 1.0).is_ok());
        assert!(Gumbel::new(0.0, 0.0).is_err());
        assert!(Gumbel::new(0.0, -1.0).is_err());
        assert!(Gumbel::new(f64::NAN, 1.0).is_err());
        assert!(Gumbel::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn standard_values() {
        let g = Gumbel::new(0.0, 1.0).unwrap();
        let e_inv = (-1.0_f64).exp();
        assert!(approx_eq(g.cdf(0.0), e_inv, 1e-12));
        assert!(approx_eq(g.pdf(0.0), e_inv, 1e-12));
        assert!(approx_eq(g.log_pdf(0.0), -1.0, 1e-12));
        assert!(approx_eq(g.mean(), EULER_GAMMA, 1e-12));
        assert!(approx_eq(g.variance(), PI * PI / 6.0, 1e-12));
        assert!(approx_eq(g.std_dev() * g.std_dev(), g.variance(), 1e-12));
    }

    #[test]
    fn cdf_limits_and_monotonicity() {
        let g = Gumbel::new(3.0, 2.0).unwrap();
        assert!(g.cdf(-100.0) < 1e-100);
        assert!(approx_eq(g.cdf(1.0e4), 1.0, 1e-15));
        let xs: Vec<f64> = (-40..=80).map(|i| i as f64 * 0.25).collect();
        for w in xs.windows(2) {
            assert!(g.cdf(w[0]) <= g.cdf(w[1]));
        }
    }

    #[test]
    fn pdf_vanishes_in_both_far_tails() {
        let g = Gumbel::new(0.0, 1.0).unwrap();
        for &x in &[-700.0, -710.0, -1000.0, -1.0e300, 800.0, 1.0e300] {
            let p = g.pdf(x);
            assert!(!p.is_nan(), "pdf({x}) is NaN");
            assert!(p >= 0.0 && p < 1e-300, "pdf({x}) = {p}");
        }
        let g = Gumbel::new(5.0, 0.01).unwrap();
        assert_eq!(g.pdf(-10.0), 0.0);
    }

    #[test]
    fn quantile_inverts_cdf() {
        for &(loc, scale) in &[(0.0, 1.0), (10.0, 5.0), (-3.0, 0.1)] {
            let g = Gumbel::new(loc, scale).unwrap();
            for &p in &[1e-6, 0.01, 0.25, 0.5, 0.9, 0.999_999] {
                let x = g.quantile(p).unwrap();
                assert!(approx_eq(g.cdf(x), p, 1e-10), "loc={loc} p={p}");
            }
        }
    }

    #[test]
    fn quantile_outside_unit_interval_is_domain_error() {
        let g = Gumbel::new(0.0, 1.0).unwrap();
        for &p in &[1.5, 0.0, 1.0, -0.1, f64::NAN] {
            let err = g.quantile(p).unwrap_err();
            assert!(matches!(err, DistromaxError::Domain { name: "p", .. }));
        }
    }

    #[test]
    fn sf_complements_cdf_and_keeps_tail_precision() {
        let g = Gumbel::new(1.0, 2.0).unwrap();
        for &x in &[-2.0, 0.0, 1.0, 5.0] {
            assert!(approx_eq(g.sf(x) + g.cdf(x), 1.0, 1e-12));
        }
        // 1 - cdf would round to zero here.
        let far = g.sf(80.0);
        assert!(far > 0.0);
        assert!(approx_eq(far.ln(), -(80.0_f64 - 1.0) / 2.0, 1e-6));
    }

    #[test]
    fn median_and_interval() {
        let g = Gumbel::new(2.0, 0.5).unwrap();
        assert!(approx_eq(g.cdf(g.median()), 0.5, 1e-12));
        let (lo, hi) = g.interval(0.95).unwrap();
        assert!(approx_eq(g.cdf(lo), 0.025, 1e-12));
        assert!(approx_eq(g.cdf(hi), 0.975, 1e-12));
        assert!(g.interval(1.0).is_err());
    }

    #[test]
    fn max_of_follows_max_stability() {
        let g = Gumbel::new(4.0, 1.5).unwrap();
        assert_eq!(g.max_of(1).unwrap(), g);

        let n = 1000;
        let m = g.max_of(n).unwrap();
        assert!(approx_eq(m.location(), 4.0 + 1.5 * (n as f64).ln(), 1e-12));
        assert_eq!(m.scale(), 1.5);
        // P(max <= x) = F(x)^n
        for &x in &[10.0, 12.0, 15.0] {
            assert!(approx_eq(m.cdf(x), g.cdf(x).powf(n as f64), 1e-10));
        }
        assert!(g.max_of(0).is_err());
    }

    #[test]
    fn parameters_round_trip_through_json() {
        let g = Gumbel::new(1.25, 0.5).unwrap();
        let json = serde_json::to_string(&g.parameters()).unwrap();
        let back: GumbelParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(Gumbel::from_parameters(back).unwrap(), g);
    }
}
