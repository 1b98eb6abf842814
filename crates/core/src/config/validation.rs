//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - either freshness window is zero
    /// - `media_host` is empty or carries a scheme or path
    /// - `media_extension` does not start with a dot
    /// - `media_cache_version` is empty, has characters outside `[A-Za-z0-9._-]`,
    ///   or ends with `-metadata`
    /// - `max_media_bytes` is 0 or exceeds 1GiB
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.stats_ttl_secs == 0 {
            return Err(invalid("stats_ttl_secs", "must be greater than 0"));
        }
        if self.media_ttl_secs == 0 {
            return Err(invalid("media_ttl_secs", "must be greater than 0"));
        }

        if self.media_host.is_empty() || self.media_host.contains('/') || self.media_host.contains(':') {
            return Err(invalid("media_host", "must be a bare host name"));
        }

        if self.media_extension.len() < 2 || !self.media_extension.starts_with('.') {
            return Err(invalid("media_extension", "must start with '.'"));
        }

        let version_ok = !self.media_cache_version.is_empty()
            && self
                .media_cache_version
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !version_ok {
            return Err(invalid("media_cache_version", "must match [A-Za-z0-9._-]+"));
        }
        if self.media_cache_version.ends_with("-metadata") {
            return Err(invalid("media_cache_version", "must not end with '-metadata'"));
        }

        if self.max_media_bytes == 0 {
            return Err(invalid("max_media_bytes", "must be greater than 0"));
        }
        if self.max_media_bytes > 1024 * 1024 * 1024 {
            return Err(invalid("max_media_bytes", "must not exceed 1GiB"));
        }

        if self.examples.iter().all(|e| e.source_url.is_none()) {
            tracing::warn!(
                example_count = self.examples.len(),
                "No example has a source URL; stats will always use fallback values"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: Result<(), ConfigError>) -> Option<String> {
        match result {
            Err(ConfigError::Invalid { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("timeout_ms"));

        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("timeout_ms"));

        let config = AppConfig { timeout_ms: 100, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("user_agent"));
    }

    #[test]
    fn test_validate_zero_ttls() {
        let config = AppConfig { stats_ttl_secs: 0, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("stats_ttl_secs"));

        let config = AppConfig { media_ttl_secs: 0, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("media_ttl_secs"));
    }

    #[test]
    fn test_validate_media_host_must_be_bare() {
        let config = AppConfig { media_host: "https://cdn.test".into(), ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("media_host"));

        let config = AppConfig { media_host: String::new(), ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("media_host"));
    }

    #[test]
    fn test_validate_media_extension() {
        let config = AppConfig { media_extension: "mp4".into(), ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("media_extension"));

        let config = AppConfig { media_extension: ".".into(), ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("media_extension"));

        let config = AppConfig { media_extension: ".webm".into(), ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_cache_version_charset() {
        let config = AppConfig { media_cache_version: "v 2".into(), ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("media_cache_version"));

        let config = AppConfig { media_cache_version: "2024.06-rc_1".into(), ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_cache_version_metadata_suffix() {
        let config = AppConfig { media_cache_version: "v1-metadata".into(), ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("media_cache_version"));

        let config = AppConfig { media_cache_version: "metadata".into(), ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_max_media_bytes() {
        let config = AppConfig { max_media_bytes: 0, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("max_media_bytes"));

        let config = AppConfig { max_media_bytes: 1024 * 1024 * 1024 + 1, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("max_media_bytes"));

        let config = AppConfig { max_media_bytes: 1024 * 1024 * 1024, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
