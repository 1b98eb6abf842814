//! Stats provider client error types.

use std::sync::Arc;

/// Errors from the upstream stats provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// No access key configured.
    #[error("missing access key: SOCIAL_KIT_ACCESS_KEY not set")]
    MissingAccessKey,

    /// The provider rejected the access key.
    #[error("authentication failed: invalid access key")]
    AuthError,

    /// Rate limited by the provider.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response body was not JSON.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { ProviderError::Timeout } else { ProviderError::Network(Arc::new(err)) }
    }
}

impl From<ProviderError> for showcase_core::Error {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::MissingAccessKey => showcase_core::Error::ConfigMissing("stats_access_key".to_string()),
            other => showcase_core::Error::UpstreamFailed(other.to_string()),
        }
    }
}
