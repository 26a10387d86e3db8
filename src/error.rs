//! Error types for the caller chain
//!
//! Provides unified error handling using thiserror.

use http::StatusCode;
use thiserror::Error;

// == Caller Error Enum ==
/// Unified error type for callers, the rule table and the metrics server.
#[derive(Error, Debug)]
pub enum CallerError {
    /// The underlying HTTP transport failed
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// An upstream status that the integrator treats as a failure
    #[error("Call failed: {0}")]
    Status(StatusCode),

    /// A regular expression rule in the cache table does not compile
    #[error("Invalid cache pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The request could not be converted or sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A response could not be assembled from its parts
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Metric registration or encoding failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Socket or listener failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CallerError {
    /// Returns true if the error came from the network layer or the upstream status.
    pub fn is_transport(&self) -> bool {
        matches!(self, CallerError::Transport(_) | CallerError::Status(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caller chain.
pub type Result<T> = std::result::Result<T, CallerError>;
