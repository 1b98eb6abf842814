//! Unified error types for showcase.
//!
//! Every variant renders with a stable upper-case code prefix and maps to
//! the HTTP status the server answers with.

use tokio_rusqlite::rusqlite;

/// Unified error types shared by the client and server crates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., missing query string).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Stored cache data could not be decoded or failed its integrity check.
    #[error("CACHE_CORRUPT: {0}")]
    CacheCorrupt(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Network or HTTP level failure.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// A server-held setting (e.g. the provider credential) is absent.
    #[error("CONFIG_MISSING: {0}")]
    ConfigMissing(String),

    /// The upstream stats provider failed.
    #[error("UPSTREAM_FAILED: {0}")]
    UpstreamFailed(String),
}

impl Error {
    /// HTTP status code this error is reported with.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidInput(_) | Error::InvalidUrl(_) => 400,
            Error::FetchTimeout(_) => 504,
            Error::FetchTooLarge(_) => 413,
            Error::HttpError(_) | Error::UpstreamFailed(_) => 502,
            Error::ConfigMissing(_)
            | Error::Database(_)
            | Error::MigrationFailed(_)
            | Error::CacheCorrupt(_) => 500,
        }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::CacheCorrupt(err.to_string())
    }
}
