//! Upstream stats provider client.
//!
//! ### Protocol
//!
//! - **Endpoint**: `https://api.socialkit.dev/tiktok/stats`
//! - **Authentication**: `access_key` query parameter. The key never appears
//!   in logs or error messages.
//! - **Response**: `{ success, data: { likes, comments, shares, views, title } }`,
//!   passed on as raw JSON. Interpreting it is the stats cache's job.

pub mod error;

pub use error::ProviderError;

use reqwest::header;
use showcase_core::AppConfig;
use std::time::{Duration, Instant};

/// Default provider endpoint.
const DEFAULT_BASE_URL: &str = "https://api.socialkit.dev/tiktok/stats";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "showcase/0.1";

/// Provider client configuration.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Access key from SOCIAL_KIT_ACCESS_KEY.
    pub access_key: String,
    /// Stats endpoint (default: https://api.socialkit.dev/tiktok/stats).
    pub base_url: String,
    /// Request timeout (default: 15s).
    pub timeout: Duration,
    /// User-agent string (default: showcase/0.1).
    pub user_agent: String,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("access_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            access_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ProviderConfig {
    /// Build from the application config.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::MissingAccessKey` if no usable key is configured.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let access_key = config
            .require_stats_access_key()
            .map_err(|_| ProviderError::MissingAccessKey)?;

        Ok(Self {
            access_key: access_key.to_string(),
            base_url: config.stats_provider_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        })
    }
}

/// Stats provider client.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl ProviderClient {
    /// Create a new provider client with the given configuration.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        if config.access_key.trim().is_empty() {
            return Err(ProviderError::MissingAccessKey);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Fetch the provider's stats document for one video.
    pub async fn video_stats(&self, video_url: &str) -> Result<serde_json::Value, ProviderError> {
        let start = Instant::now();
        tracing::debug!("querying stats provider: url={}", video_url);

        let http_response = self
            .http
            .get(&self.config.base_url)
            .query(&[("access_key", self.config.access_key.as_str()), ("url", video_url)])
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, &self.config.user_agent)
            .send()
            .await
            .map_err(|e| ProviderError::from(e.without_url()))?;

        let status = http_response.status();
        tracing::debug!("stats provider response status: {}", status);

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthError);
        }

        if status == 429 {
            return Err(ProviderError::RateLimited);
        }

        if !status.is_success() {
            return Err(ProviderError::HttpError { status: status.as_u16() });
        }

        let bytes = http_response
            .bytes()
            .await
            .map_err(|e| ProviderError::from(e.without_url()))?;
        let document = serde_json::from_slice(&bytes).map_err(|e| ProviderError::Parse(e.to_string()))?;

        tracing::debug!("stats provider answered in {:?}", start.elapsed());
        Ok(document)
    }
}
