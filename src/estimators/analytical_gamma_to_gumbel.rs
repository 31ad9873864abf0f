use std::f64::consts::LN_2;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumDiscriminants, EnumString};
use tracing::{debug, info};

use super::GumbelEstimator;
use crate::distributions::Gumbel;
use crate::error::{DistromaxError, Result};
use crate::utils::math::ln_gamma;

/// The per-trial statistic distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema, EnumDiscriminants)]
#[serde(tag = "law", rename_all = "snake_case")]
#[strum_discriminants(name(GammaLawKind), derive(Display, EnumString))]
pub enum GammaLaw {
    ShapeScale { shape: f64, scale: f64 },
    /// `scale = 1 / rate`.
    ShapeRate { shape: f64, rate: f64 },
    /// Chi-squared with `dofs` degrees of freedom: shape `dofs / 2`, scale 2.
    ChiSquared { dofs: f64 },
}

impl GammaLaw {
    pub fn kind(&self) -> GammaLawKind {
        GammaLawKind::from(self)
    }

    /// `(shape, scale)` after validating every parameter.
    pub fn shape_scale(&self) -> Result<(f64, f64)> {
        let (shape, scale) = match *self {
            GammaLaw::ShapeScale { shape, scale } => {
                positive("scale", scale)?;
                (shape, scale)
            }
            GammaLaw::ShapeRate { shape, rate } => {
                positive("rate", rate)?;
                (shape, 1.0 / rate)
            }
            GammaLaw::ChiSquared { dofs } => {
                positive("dofs", dofs)?;
                (dofs / 2.0, 2.0)
            }
        };
        positive("shape", shape)?;
        positive("scale", scale)?;
        Ok((shape, scale))
    }
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DistromaxError::domain(
            name,
            value,
            "Gamma parameters must be finite and positive",
        ))
    }
}

/// Closed-form approximation of the Gumbel law of the maximum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AsymptoticExpansion {
    /// Gasull, López-Salcedo & Utzet (2015), eqs. 32-33. More accurate for
    /// moderate `n`, defined for shape >= 1.
    #[default]
    Improved,
    /// Embrechts, Klüppelberg & Mikosch (1997), table 3.4.4.
    Classical,
}

/// Asymptotic Gumbel law of the maximum of `n` i.i.d. Gamma variables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyticalGammaToGumbel {
    shape: f64,
    scale: f64,
    ln_trials: f64,
    expansion: AsymptoticExpansion,
}

impl AnalyticalGammaToGumbel {
    /// Maximum over `trials >= 2` variables.
    pub fn new(law: GammaLaw, trials: u64) -> Result<Self> {
        if trials < 2 {
            return Err(DistromaxError::domain(
                "n",
                trials as f64,
                "the asymptotic needs at least 2 trials",
            ));
        }
        Self::with_ln_trials(law, (trials as f64).ln())
    }

    /// Maximum over `exp(ln_trials)` variables, for counts beyond `u64`.
    pub fn with_ln_trials(law: GammaLaw, ln_trials: f64) -> Result<Self> {
        let (shape, scale) = law.shape_scale()?;
        if !(ln_trials.is_finite() && ln_trials >= LN_2) {
            return Err(DistromaxError::domain(
                "ln n",
                ln_trials,
                "the asymptotic needs at least 2 trials",
            ));
        }
        Ok(Self {
            shape,
            scale,
            ln_trials,
            expansion: AsymptoticExpansion::default(),
        })
    }

    pub fn with_expansion(mut self, expansion: AsymptoticExpansion) -> Self {
        self.expansion = expansion;
        self
    }

    pub fn shape(&self) -> f64 {
        self.shape
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn ln_trials(&self) -> f64 {
        self.ln_trials
    }

    pub fn expansion(&self) -> AsymptoticExpansion {
        self.expansion
    }

    /// The expansion [`fit`](Self::fit) evaluates. The improved expansion
    /// falls back to the classical one outside its domain.
    pub fn expansion_used(&self) -> AsymptoticExpansion {
        match self.expansion {
            AsymptoticExpansion::Improved if self.improved().is_some() => {
                AsymptoticExpansion::Improved
            }
            _ => AsymptoticExpansion::Classical,
        }
    }

    pub fn fit(&self) -> Result<Gumbel> {
        let (location, scale) = match self.expansion {
            AsymptoticExpansion::Classical => self.classical(),
            AsymptoticExpansion::Improved => self.improved().unwrap_or_else(|| {
                debug!(
                    shape = self.shape,
                    ln_trials = self.ln_trials,
                    "improved expansion undefined, using the classical one"
                );
                self.classical()
            }),
        };
        let gumbel = Gumbel::new(location, scale)?;
        info!(
            shape = self.shape,
            scale = self.scale,
            ln_trials = self.ln_trials,
            location,
            gumbel_scale = scale,
            "analytical Gamma to Gumbel parameters"
        );
        Ok(gumbel)
    }

    /// Mean and standard deviation of the fitted Gumbel law.
    pub fn mean_std(&self) -> Result<(f64, f64)> {
        let gumbel = self.fit()?;
        Ok((gumbel.mean(), gumbel.std_dev()))
    }

    fn classical(&self) -> (f64, f64) {
        let a = self.shape - 1.0;
        let location =
            self.scale * (self.ln_trials + a * self.ln_trials.ln() - ln_gamma(self.shape));
        (location, self.scale)
    }

    /// `None` where the expansion is undefined: shape below 1, a
    /// non-positive `B_n` or a non-positive scale denominator.
    fn improved(&self) -> Option<(f64, f64)> {
        let (k, theta) = (self.shape, self.scale);
        let a = k - 1.0;
        if a < 0.0 {
            return None;
        }
        // a ln a -> 0 as a -> 0
        let a_ln_a = if a == 0.0 { 0.0 } else { a * a.ln() };

        let l = self.ln_trials - ln_gamma(k);
        let b = l + a_ln_a;
        if !(b > 0.0) {
            return None;
        }
        let ln_b = b.ln();
        let location = theta * (l + a * ln_b + (a * a * ln_b - a * a_ln_a + a) / b);

        let denominator = location * location - theta * theta * a * (k - 2.0);
        if !(denominator > 0.0) {
            return None;
        }
        let scale = theta * location * (theta * a + location) / denominator;
        (location.is_finite() && scale.is_finite() && scale > 0.0).then_some((location, scale))
    }
}

impl GumbelEstimator for AnalyticalGammaToGumbel {
    fn fit(&self) -> Result<Gumbel> {
        AnalyticalGammaToGumbel::fit(self)
    }
}
