//! Shared application state.

use showcase_client::{
    FetchClient, FetchConfig, HttpFetch, InterceptingClient, MediaCache, MediaFilter, ProviderClient, ProviderConfig,
    ProxyStatsClient, StatsCache,
};
use showcase_core::{AppConfig, CacheDb};
use std::sync::Arc;

/// Handles shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// `None` when no access key is configured; `/api/stats` then answers 500.
    pub provider: Option<ProviderClient>,
    pub stats: Arc<StatsCache<ProxyStatsClient, CacheDb>>,
    pub media_client: InterceptingClient,
}

impl AppState {
    /// Wire up clients and caches, and activate the media cache.
    ///
    /// A failed media cache activation is logged; media requests then bypass
    /// the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub async fn new(config: AppConfig, db: CacheDb) -> anyhow::Result<Self> {
        let provider = match ProviderConfig::from_app_config(&config) {
            Ok(provider_config) => Some(ProviderClient::new(provider_config)?),
            Err(e) => {
                tracing::warn!(error = %e, "stats provider disabled");
                None
            }
        };

        let source = ProxyStatsClient::new(config.stats_endpoint_url(), config.timeout(), &config.user_agent)?;
        let stats = StatsCache::new(source, db.clone())
            .with_ttl(config.stats_ttl())
            .with_request_timeout(config.timeout());

        let network: Arc<dyn HttpFetch> = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
        let media = Arc::new(
            MediaCache::new(
                &config.media_cache_version,
                MediaFilter::new(config.media_host.as_str(), config.media_extension.as_str()),
                Arc::new(db),
                Arc::clone(&network),
            )
            .with_ttl(config.media_ttl())
            .with_request_timeout(config.timeout()),
        );

        match media.install().await {
            Ok(deleted) => tracing::info!(deleted = deleted.len(), "media cache active"),
            Err(e) => tracing::warn!(error = %e, "media cache activation failed, media requests bypass the cache"),
        }

        let media_client = InterceptingClient::new(network).with(media);

        Ok(Self { config: Arc::new(config), provider, stats: Arc::new(stats), media_client })
    }
}
