//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SHOWCASE_*, plus SOCIAL_KIT_ACCESS_KEY)
//! 2. TOML config file (if SHOWCASE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::catalog::{VideoExample, default_examples};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SHOWCASE_*)
/// 2. TOML config file (if SHOWCASE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Access key for the third-party stats provider.
    ///
    /// Set via SHOWCASE_STATS_ACCESS_KEY or SOCIAL_KIT_ACCESS_KEY.
    /// Only the stats proxy needs it.
    #[serde(default)]
    pub stats_access_key: Option<String>,

    /// Upstream stats provider endpoint.
    #[serde(default = "default_stats_provider_url")]
    pub stats_provider_url: String,

    /// Socket address the server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Stats proxy endpoint queried by the stats cache.
    ///
    /// Defaults to this server's own `/api/stats` route.
    #[serde(default)]
    pub stats_endpoint: Option<String>,

    /// Path to SQLite cache database.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for outbound HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Freshness window of the persisted stats entry, in seconds.
    #[serde(default = "default_stats_ttl_secs")]
    pub stats_ttl_secs: u64,

    /// Host whose media assets are cached.
    #[serde(default = "default_media_host")]
    pub media_host: String,

    /// File extension of cacheable media paths.
    #[serde(default = "default_media_extension")]
    pub media_extension: String,

    /// Freshness window of cached media, in seconds.
    #[serde(default = "default_media_ttl_secs")]
    pub media_ttl_secs: u64,

    /// Version suffix of the media cache namespaces.
    ///
    /// Changing it drops every namespace written by other versions.
    #[serde(default = "default_media_cache_version")]
    pub media_cache_version: String,

    /// Largest media body accepted from the network.
    #[serde(default = "default_max_media_bytes")]
    pub max_media_bytes: usize,

    /// Showcased videos.
    #[serde(default = "default_examples")]
    pub examples: Vec<VideoExample>,
}

fn default_stats_provider_url() -> String {
    "https://api.socialkit.dev/tiktok/stats".into()
}

fn default_listen_addr() -> String {
    "127.0.0.1:3000".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./showcase-cache.sqlite")
}

fn default_user_agent() -> String {
    "showcase/0.1".into()
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_stats_ttl_secs() -> u64 {
    60 * 60
}

fn default_media_host() -> String {
    "br-max.s3.ap-south-1.amazonaws.com".into()
}

fn default_media_extension() -> String {
    ".mp4".into()
}

fn default_media_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_media_cache_version() -> String {
    "v1".into()
}

fn default_max_media_bytes() -> usize {
    200 * 1024 * 1024
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stats_access_key: None,
            stats_provider_url: default_stats_provider_url(),
            listen_addr: default_listen_addr(),
            stats_endpoint: None,
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            stats_ttl_secs: default_stats_ttl_secs(),
            media_host: default_media_host(),
            media_extension: default_media_extension(),
            media_ttl_secs: default_media_ttl_secs(),
            media_cache_version: default_media_cache_version(),
            max_media_bytes: default_max_media_bytes(),
            examples: default_examples(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn stats_ttl(&self) -> Duration {
        Duration::from_secs(self.stats_ttl_secs)
    }

    pub fn media_ttl(&self) -> Duration {
        Duration::from_secs(self.media_ttl_secs)
    }

    /// Stats proxy URL, falling back to the local `/api/stats` route.
    pub fn stats_endpoint_url(&self) -> String {
        self.stats_endpoint
            .clone()
            .unwrap_or_else(|| format!("http://{}/api/stats", self.listen_addr))
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SHOWCASE_`
    /// 2. `SOCIAL_KIT_ACCESS_KEY` for the provider credential
    /// 3. TOML file from `SHOWCASE_CONFIG_FILE` (if set)
    /// 4. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment()
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SHOWCASE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment
            .merge(
                Env::raw()
                    .only(&["SOCIAL_KIT_ACCESS_KEY"])
                    .map(|_| "stats_access_key".into()),
            )
            .merge(
                Env::prefixed("SHOWCASE_")
                    .ignore(&["CONFIG_FILE"])
                    .map(|key| key.as_str().to_lowercase().into())
                    .split("__"),
            )
    }

    /// Provider credential, required only by the stats proxy.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the access key is unset or blank.
    pub fn require_stats_access_key(&self) -> Result<&str, ConfigError> {
        self.stats_access_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "stats_access_key".into(),
                hint: "Set SOCIAL_KIT_ACCESS_KEY or SHOWCASE_STATS_ACCESS_KEY".into(),
            })
    }
}
