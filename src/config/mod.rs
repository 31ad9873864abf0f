mod analytical;
mod document;
mod estimator;

pub use analytical::AnalyticalConfig;
pub use document::{ConfigDocument, json_schema};
pub use estimator::EstimatorConfig;
