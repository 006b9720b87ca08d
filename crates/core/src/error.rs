//! Error and warning types for the WTP estimation workspace.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the WTP estimation workspace.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data error (malformed, missing or inconsistent survey data).
    #[error("Data error: {0}")]
    Data(String),

    /// Estimation error (the solver could not produce a fit).
    #[error("Estimation error: {0}")]
    Estimation(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create an estimation error.
    pub fn estimation(msg: impl Into<String>) -> Self {
        Error::Estimation(msg.into())
    }
}

/// Non-fatal conditions attached to an otherwise usable estimate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Warning {
    /// The NPMLE EM loop stopped at its iteration cap.
    #[error(
        "NPMLE did not converge after {iterations} iterations \
         (last log-likelihood improvement {last_improvement:e})"
    )]
    NotConverged {
        iterations: u32,
        last_improvement: f64,
    },
}
