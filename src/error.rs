use thiserror::Error;

pub type Result<T> = std::result::Result<T, DistromaxError>;

#[derive(Debug, Error)]
pub enum DistromaxError {
    /// Contradictory or insufficient construction parameters.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// An argument lies outside the domain of the operation.
    #[error("invalid {name} = {value}: {reason}")]
    Domain {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// The requested fit is undefined for the given sample.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    #[error("{context} did not converge after {iterations} iterations")]
    NotConverged {
        iterations: usize,
        context: &'static str,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DistromaxError {
    pub(crate) fn domain(name: &'static str, value: f64, reason: &'static str) -> Self {
        DistromaxError::Domain {
            name,
            value,
            reason,
        }
    }

    pub(crate) fn configuration<S: Into<String>>(msg: S) -> Self {
        DistromaxError::Configuration(msg.into())
    }
}

/// Rejects any NaN or infinite value in `values`.
pub(crate) fn ensure_finite(name: &'static str, values: &[f64]) -> Result<()> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(&bad) => Err(DistromaxError::domain(name, bad, "values must be finite")),
        None => Ok(()),
    }
}
