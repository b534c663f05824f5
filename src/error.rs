//! Error types shared by the solver, the model driver and the parameter layer

use thiserror::Error;

/// Failures that abort the solve of one model instance
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Malformed or inconsistent economic parameters
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A configuration this model variant cannot honour (e.g. cubic interpolation)
    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// Infinite-horizon iteration did not reach the tolerance
    #[error("no convergence after {iterations} iterations (last distance {distance:e})")]
    Convergence { iterations: usize, distance: f64 },
}

impl ModelError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ModelError::InvalidParameter(msg.into())
    }
}
