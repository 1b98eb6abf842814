//! Structured errors for the showcase server.
//!
//! Every failure a handler can return renders as `{ "error": message }` with
//! the mapped status. Provider details are logged, never sent to clients.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use showcase_client::ProviderError;

/// Errors returned by route handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The `url` query parameter is absent or blank.
    #[error("URL parameter is required")]
    MissingUrl,

    /// The `url` query parameter is not an absolute http(s) URL.
    #[error("Invalid URL parameter: {0}")]
    InvalidUrl(String),

    /// No provider access key is configured.
    #[error("API key not configured")]
    ApiKeyMissing,

    /// The provider could not be reached or answered badly.
    #[error("Failed to fetch stats")]
    Upstream(#[source] ProviderError),

    /// Anything raised by the core or client crates.
    #[error(transparent)]
    Core(#[from] showcase_core::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUrl | ApiError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            ApiError::ApiKeyMissing => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Core(err) => {
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::MissingAccessKey => ApiError::ApiKeyMissing,
            other => ApiError::Upstream(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = ?self, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
