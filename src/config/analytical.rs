use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ConfigDocument;
use crate::error::Result;
use crate::estimators::{AnalyticalGammaToGumbel, AsymptoticExpansion, GammaLaw};

/// Settings of the analytical Gamma to Gumbel estimator.
///
/// ```json
/// {"law": "chi_squared", "dofs": 4.0, "expansion": "classical"}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalyticalConfig {
    #[serde(flatten)]
    pub law: GammaLaw,

    #[serde(default)]
    pub expansion: AsymptoticExpansion,
}

impl AnalyticalConfig {
    pub fn build(&self, trials: u64) -> Result<AnalyticalGammaToGumbel> {
        Ok(AnalyticalGammaToGumbel::new(self.law, trials)?.with_expansion(self.expansion))
    }
}

impl ConfigDocument for AnalyticalConfig {
    fn validate(&self) -> Result<()> {
        self.law.shape_scale().map(|_| ())
    }
}
