//! Cached, fault-isolated stats for the showcased videos.
//!
//! ### Freshness
//! - One JSON entry `{ data, timestamp }` under a fixed key in a `CacheStore`.
//! - An entry younger than the TTL (1h by default) is served as-is, no network.
//! - Unreadable or malformed entries count as absent.
//!
//! ### Refresh
//! - One task per queryable example on a `JoinSet`, each bounded by a timeout.
//! - A failed item contributes nothing; the batch never fails.
//! - The whole map is replaced and re-stamped; partial refresh does not exist.
//!
//! ### Display
//! - See [`display`]: fetched value, else the example's fallback, else nothing.

pub mod display;
pub mod error;
pub mod source;
pub mod store;

pub use display::{DisplayStats, FormattedStats, StatOrigin, display_all};
pub use error::StatsError;
pub use source::{ProxyEnvelope, ProxyStatsClient, StatsSource, parse_envelope};
pub use store::{CacheStore, MemoryStore};

use crate::fetch::canonicalize;
use serde::{Deserialize, Serialize};
use showcase_core::clock::is_fresh;
use showcase_core::{Clock, StatSnapshot, SystemClock, VideoExample};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Storage key of the persisted entry.
pub const STATS_CACHE_KEY: &str = "tiktok_stats_cache";

/// Default freshness window of the persisted entry.
pub const DEFAULT_STATS_TTL: Duration = Duration::from_secs(60 * 60);

/// Default bound on each per-video request.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// The persisted form of a stats refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsCacheEntry {
    pub data: BTreeMap<String, StatSnapshot>,
    pub timestamp: i64,
}

/// Whether a result came from the persisted entry or a fresh fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsOrigin {
    Cached,
    Refreshed,
}

/// Result of [`StatsCache::get_stats`].
#[derive(Debug, Clone, Serialize)]
pub struct StatsOutcome {
    pub stats: BTreeMap<String, StatSnapshot>,
    pub origin: StatsOrigin,
    pub fetched_at: i64,
}

/// Fetch-with-cache of per-video stats.
pub struct StatsCache<S, C> {
    source: Arc<S>,
    store: C,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    request_timeout: Duration,
    key: String,
}

impl<S: StatsSource, C: CacheStore> StatsCache<S, C> {
    pub fn new(source: S, store: C) -> Self {
        Self {
            source: Arc::new(source),
            store,
            clock: Arc::new(SystemClock),
            ttl: DEFAULT_STATS_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            key: STATS_CACHE_KEY.to_string(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn store(&self) -> &C {
        &self.store
    }

    /// Stats for `examples`, from the persisted entry when fresh.
    ///
    /// Never fails: an empty map is the worst case, and callers fall back to
    /// the examples' static snapshots.
    pub async fn get_stats(&self, examples: &[VideoExample]) -> StatsOutcome {
        if let Some(entry) = self.read_entry().await
            && is_fresh(entry.timestamp, self.clock.now_ms(), self.ttl)
        {
            tracing::debug!(entries = entry.data.len(), "stats cache hit");
            return StatsOutcome { stats: entry.data, origin: StatsOrigin::Cached, fetched_at: entry.timestamp };
        }

        let data = self.refresh(examples).await;
        let entry = StatsCacheEntry { data, timestamp: self.clock.now_ms() };
        self.write_entry(&entry).await;

        StatsOutcome { stats: entry.data, origin: StatsOrigin::Refreshed, fetched_at: entry.timestamp }
    }

    async fn read_entry(&self) -> Option<StatsCacheEntry> {
        let raw = match self.store.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read persisted stats, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "discarding malformed persisted stats");
                None
            }
        }
    }

    async fn write_entry(&self, entry: &StatsCacheEntry) {
        let json = match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode stats entry");
                return;
            }
        };

        if let Err(e) = self.store.put(&self.key, &json).await {
            tracing::warn!(error = %e, "failed to persist stats entry");
        }
    }

    async fn refresh(&self, examples: &[VideoExample]) -> BTreeMap<String, StatSnapshot> {
        let mut join_set = JoinSet::new();

        for example in examples {
            let Some(key) = queryable_key(example) else {
                tracing::debug!(title = %example.title, "example has no queryable source URL, skipping");
                continue;
            };

            let source = Arc::clone(&self.source);
            let timeout = self.request_timeout;
            join_set.spawn(async move {
                let result = match tokio::time::timeout(timeout, source.fetch_stats(&key)).await {
                    Ok(result) => result,
                    Err(_) => Err(StatsError::Timeout),
                };
                (key, result)
            });
        }

        let mut stats = BTreeMap::new();
        let mut failed = 0usize;

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((key, Ok(snapshot))) => {
                    stats.insert(key, snapshot);
                }
                Ok((key, Err(e))) => {
                    failed += 1;
                    tracing::warn!(source_url = %key, error = %e, "failed to fetch stats");
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!(error = %e, "stats task failed");
                }
            }
        }

        tracing::debug!(fetched = stats.len(), failed, "stats refresh complete");
        stats
    }
}

/// The map key for an example, if it can be queried at all.
fn queryable_key(example: &VideoExample) -> Option<String> {
    let key = example.stats_key()?;
    canonicalize(key).ok()?;
    Some(key.to_string())
}
