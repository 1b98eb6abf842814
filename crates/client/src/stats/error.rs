//! Per-item stats fetch errors.
//!
//! None of these ever leave the stats cache; they decide which example
//! falls back to its static snapshot and show up in the logs.

use std::sync::Arc;

/// Errors from fetching one video's stats.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StatsError {
    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Non-success HTTP status from the proxy.
    #[error("HTTP error: {status}")]
    HttpStatus { status: u16 },

    /// The proxy answered but did not report `success: true` with data.
    #[error("proxy reported no data")]
    NoData,

    /// Response body did not match the expected schema.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for StatsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { StatsError::Timeout } else { StatsError::Network(Arc::new(err)) }
    }
}
