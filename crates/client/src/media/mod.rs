//! Time-boxed caching of remote video assets.
//!
//! ### Namespaces
//! - Bytes live in `video-cache-{version}`, fetch times in
//!   `video-cache-{version}-metadata` as `{"timestamp": <ms>}` under the same URL.
//! - Activation deletes every other namespace, so bumping the version drops
//!   all older content at once.
//! - A version ending in `-metadata` would name another version's timestamp
//!   namespace as its bytes namespace and is refused at activation.
//!
//! ### Interception
//! - Only `GET` requests matching the `MediaFilter` are taken, and only once
//!   the cache is active; everything else goes straight to the network.
//! - A stored copy younger than the TTL (24h by default) is served without
//!   touching the network.
//! - Otherwise the network is asked. A `200 OK` is stored together with a new
//!   timestamp in one write; other statuses are passed on and not stored.
//! - When the network fails or times out the stale copy is served, and with
//!   no copy at all a `404 Video not available` is synthesized.
//! - An asset over the relay size limit is never stored. The stale copy is
//!   served if there is one, otherwise a `413 Video too large to relay`.

pub mod filter;
pub mod storage;

pub use filter::MediaFilter;
pub use storage::{CacheStorage, MemoryCacheStorage};

use crate::fetch::{HttpFetch, HttpRequest, HttpResponse, Interceptor};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode, Url};
use serde::{Deserialize, Serialize};
use showcase_core::clock::is_fresh;
use showcase_core::{CacheWrite, CachedResponse, Clock, Error, SystemClock};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Prefix shared by every media cache namespace.
pub const CACHE_PREFIX: &str = "video-cache";

const METADATA_SUFFIX: &str = "-metadata";

/// Default freshness window of a stored asset.
pub const DEFAULT_MEDIA_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// The pair of namespaces owned by one cache version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNames {
    pub media: String,
    pub metadata: String,
}

impl CacheNames {
    pub fn for_version(version: &str) -> Self {
        let media = format!("{CACHE_PREFIX}-{version}");
        let metadata = format!("{media}{METADATA_SUFFIX}");
        Self { media, metadata }
    }

    /// Whether the bytes namespace could be mistaken for another version's timestamps.
    pub fn is_ambiguous(&self) -> bool {
        self.media.ends_with(METADATA_SUFFIX)
    }

    pub fn is_current(&self, namespace: &str) -> bool {
        namespace == self.media || namespace == self.metadata
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TimestampDoc {
    timestamp: i64,
}

/// Caching interceptor for media assets.
pub struct MediaCache {
    names: CacheNames,
    filter: MediaFilter,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn HttpFetch>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    request_timeout: Duration,
    active: AtomicBool,
}

impl MediaCache {
    pub fn new(
        version: &str, filter: MediaFilter, storage: Arc<dyn CacheStorage>, network: Arc<dyn HttpFetch>,
    ) -> Self {
        Self {
            names: CacheNames::for_version(version),
            filter,
            storage,
            network,
            clock: Arc::new(SystemClock),
            ttl: DEFAULT_MEDIA_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            active: AtomicBool::new(false),
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

    pub fn names(&self) -> &CacheNames {
        &self.names
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Take control immediately instead of waiting for older versions to retire.
    ///
    /// # Errors
    ///
    /// Returns the storage error that stopped activation; the cache then
    /// stays inactive and every request passes through.
    pub async fn install(&self) -> Result<Vec<String>, Error> {
        tracing::info!(namespace = %self.names.media, "installing media cache");
        self.activate().await
    }

    /// Delete every namespace this version does not own, then start intercepting.
    ///
    /// Returns the deleted namespace names.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for a version whose bytes namespace ends in
    /// `-metadata`, or the first storage error. Nothing is marked active in
    /// either case.
    pub async fn activate(&self) -> Result<Vec<String>, Error> {
        if self.names.is_ambiguous() {
            return Err(Error::InvalidInput(format!(
                "media cache namespace {} collides with a metadata namespace",
                self.names.media
            )));
        }

        let mut deleted = Vec::new();
        for namespace in self.storage.namespaces().await? {
            if self.names.is_current(&namespace) {
                continue;
            }
            if self.storage.delete(&namespace).await? {
                tracing::info!(namespace = %namespace, "deleted outdated media cache");
                deleted.push(namespace);
            }
        }

        self.active.store(true, Ordering::Release);
        Ok(deleted)
    }

    async fn lookup(&self, key: &str) -> Option<CachedResponse> {
        match self.storage.lookup(&self.names.media, key).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(url = %key, error = %e, "media cache lookup failed, treating as miss");
                None
            }
        }
    }

    async fn stored_at(&self, key: &str) -> Option<i64> {
        let doc = match self.storage.lookup(&self.names.metadata, key).await {
            Ok(doc) => doc?,
            Err(e) => {
                tracing::warn!(url = %key, error = %e, "media metadata lookup failed");
                return None;
            }
        };

        match serde_json::from_slice::<TimestampDoc>(&doc.body) {
            Ok(doc) => Some(doc.timestamp),
            Err(e) => {
                tracing::debug!(url = %key, error = %e, "unreadable media timestamp, treating as stale");
                None
            }
        }
    }

    async fn store(&self, key: &str, response: &HttpResponse) {
        let body = match serde_json::to_vec(&TimestampDoc { timestamp: self.clock.now_ms() }) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(url = %key, error = %e, "failed to encode media timestamp");
                return;
            }
        };

        let writes = vec![
            CacheWrite { namespace: self.names.media.clone(), url: key.to_string(), response: response.to_cached() },
            CacheWrite {
                namespace: self.names.metadata.clone(),
                url: key.to_string(),
                response: CachedResponse {
                    status: StatusCode::OK.as_u16(),
                    headers: vec![(CONTENT_TYPE.as_str().to_string(), "application/json".to_string())],
                    body,
                },
            },
        ];

        if let Err(e) = self.storage.put_all(writes).await {
            tracing::warn!(url = %key, error = %e, "failed to store media response");
        }
    }

    fn fallback(&self, key: &str, stale: Option<CachedResponse>, error: &Error) -> HttpResponse {
        match stale {
            Some(cached) => {
                tracing::warn!(url = %key, error = %error, "media fetch failed, serving stale copy");
                HttpResponse::from_cached(cached)
            }
            None if matches!(error, Error::FetchTooLarge(_)) => {
                tracing::warn!(url = %key, error = %error, "media asset exceeds relay limit");
                HttpResponse::too_large()
            }
            None => {
                tracing::warn!(url = %key, error = %error, "media fetch failed with nothing cached");
                HttpResponse::not_available()
            }
        }
    }
}

#[async_trait]
impl Interceptor for MediaCache {
    fn accepts(&self, request: &HttpRequest) -> bool {
        self.is_active() && request.method == Method::GET && self.filter.matches(&request.url)
    }

    async fn intercept(&self, request: &HttpRequest) -> HttpResponse {
        let key = cache_key(&request.url);
        let cached = self.lookup(&key).await;

        if let Some(hit) = &cached
            && let Some(stamped) = self.stored_at(&key).await
            && is_fresh(stamped, self.clock.now_ms(), self.ttl)
        {
            tracing::debug!(url = %key, "media cache hit");
            return HttpResponse::from_cached(hit.clone());
        }

        let result = match tokio::time::timeout(self.request_timeout, self.network.fetch(request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::FetchTimeout(key.clone())),
        };

        match result {
            Ok(response) => {
                if response.status == StatusCode::OK {
                    self.store(&key, &response).await;
                } else {
                    tracing::debug!(url = %key, status = response.status.as_u16(), "not caching media response");
                }
                response
            }
            Err(e) => self.fallback(&key, cached, &e),
        }
    }
}

/// Storage key of a request URL; fragments never reach the server.
fn cache_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::InterceptingClient;
    use crate::testing::{Reply, StubNetwork};
    use showcase_core::{CacheDb, ManualClock};

    const T0: i64 = 1_700_000_000_000;
    const HOUR_MS: i64 = 60 * 60 * 1000;
    const VIDEO: &str = "https://br-max.s3.ap-south-1.amazonaws.com/ExampleVideo1_v2.mp4";

    fn filter() -> MediaFilter {
        MediaFilter::new("br-max.s3.ap-south-1.amazonaws.com", ".mp4")
    }

    struct Harness {
        network: Arc<StubNetwork>,
        storage: Arc<MemoryCacheStorage>,
        clock: Arc<ManualClock>,
        cache: Arc<MediaCache>,
        client: InterceptingClient,
    }

    async fn harness(reply: Reply) -> Harness {
        harness_with(reply, Arc::new(MemoryCacheStorage::new()), "v1").await
    }

    async fn harness_with(reply: Reply, storage: Arc<MemoryCacheStorage>, version: &str) -> Harness {
        let network = StubNetwork::new(reply);
        let clock = Arc::new(ManualClock::new(T0));
        let cache = Arc::new(
            MediaCache::new(version, filter(), storage.clone(), network.clone()).with_clock(clock.clone()),
        );
        cache.install().await.unwrap();
        let client = InterceptingClient::new(network.clone()).with(cache.clone());
        Harness { network, storage, clock, cache, client }
    }

    async fn get(client: &InterceptingClient, url: &str) -> HttpResponse {
        client.fetch(&HttpRequest::parse(url).unwrap()).await.unwrap()
    }

    #[test]
    fn test_cache_names() {
        let names = CacheNames::for_version("v1");
        assert_eq!(names.media, "video-cache-v1");
        assert_eq!(names.metadata, "video-cache-v1-metadata");
        assert!(names.is_current("video-cache-v1-metadata"));
        assert!(!names.is_current("video-cache-v0"));
        assert!(!names.is_ambiguous());
        assert!(CacheNames::for_version("v1-metadata").is_ambiguous());
    }

    #[tokio::test]
    async fn test_second_request_within_ttl_is_served_from_cache() {
        let h = harness(Reply::Status(200, b"mp4-bytes")).await;

        let first = get(&h.client, VIDEO).await;
        h.clock.advance(Duration::from_secs(23 * 60 * 60));
        let second = get(&h.client, VIDEO).await;

        assert_eq!(h.network.calls(), 1);
        assert_eq!(first.body, second.body);
        assert_eq!(second.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_request_after_ttl_fetches_again() {
        let h = harness(Reply::Status(200, b"v1")).await;

        get(&h.client, VIDEO).await;
        get(&h.client, VIDEO).await;
        h.clock.advance(Duration::from_secs(24 * 60 * 60));
        h.network.set(Reply::Status(200, b"v2"));
        let third = get(&h.client, VIDEO).await;

        assert_eq!(h.network.calls(), 2);
        assert_eq!(&third.body[..], b"v2");

        let timestamp = h.storage.lookup("video-cache-v1-metadata", VIDEO).await.unwrap().unwrap();
        let doc: TimestampDoc = serde_json::from_slice(&timestamp.body).unwrap();
        assert_eq!(doc.timestamp, T0 + 24 * HOUR_MS);
    }

    #[tokio::test]
    async fn test_stale_copy_served_when_network_fails() {
        let h = harness(Reply::Status(200, b"original")).await;

        get(&h.client, VIDEO).await;
        h.clock.advance(Duration::from_secs(25 * 60 * 60));
        h.network.set(Reply::Fail);
        let response = get(&h.client, VIDEO).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(&response.body[..], b"original");
        assert_eq!(h.network.calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_copy_and_failed_network_is_not_available() {
        let h = harness(Reply::Fail).await;

        let response = get(&h.client, VIDEO).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(&response.body[..], b"Video not available");
        assert!(h.storage.namespaces().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_network_times_out_to_not_available() {
        let h = harness(Reply::Hang).await;

        let response = get(&h.client, VIDEO).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_matching_requests_pass_through() {
        let h = harness(Reply::Status(200, b"page")).await;

        for url in ["https://cdn.example.com/clip.mp4", "https://br-max.s3.ap-south-1.amazonaws.com/poster.jpg"] {
            assert!(!h.cache.accepts(&HttpRequest::parse(url).unwrap()));
            get(&h.client, url).await;
            get(&h.client, url).await;
        }

        assert_eq!(h.network.calls(), 4);
        assert!(h.storage.namespaces().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_get_requests_pass_through() {
        let h = harness(Reply::Status(200, b"")).await;
        let mut request = HttpRequest::parse(VIDEO).unwrap();
        request.method = Method::HEAD;
        assert!(!h.cache.accepts(&request));
    }

    #[tokio::test]
    async fn test_non_ok_status_is_returned_but_not_stored() {
        let h = harness(Reply::Status(403, b"denied")).await;

        let response = get(&h.client, VIDEO).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert!(h.storage.lookup("video-cache-v1", VIDEO).await.unwrap().is_none());

        get(&h.client, VIDEO).await;
        assert_eq!(h.network.calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_timestamp_counts_as_stale() {
        let h = harness(Reply::Status(200, b"fresh")).await;
        h.storage
            .put_all(vec![CacheWrite {
                namespace: "video-cache-v1".into(),
                url: VIDEO.into(),
                response: CachedResponse { status: 200, headers: vec![], body: b"orphan".to_vec() },
            }])
            .await
            .unwrap();

        let response = get(&h.client, VIDEO).await;
        assert_eq!(&response.body[..], b"fresh");
        assert_eq!(h.network.calls(), 1);
    }

    #[tokio::test]
    async fn test_fragment_is_not_part_of_the_key() {
        let h = harness(Reply::Status(200, b"bytes")).await;

        get(&h.client, VIDEO).await;
        let request = HttpRequest::get(Url::parse(&format!("{VIDEO}#t=10")).unwrap());
        h.client.fetch(&request).await.unwrap();

        assert_eq!(h.network.calls(), 1);
    }

    #[tokio::test]
    async fn test_activation_deletes_other_versions() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let old = harness_with(Reply::Status(200, b"old"), storage.clone(), "v1").await;
        get(&old.client, VIDEO).await;
        storage
            .put_all(vec![CacheWrite {
                namespace: "unrelated".into(),
                url: VIDEO.into(),
                response: CachedResponse { status: 200, headers: vec![], body: vec![] },
            }])
            .await
            .unwrap();

        let network = StubNetwork::new(Reply::Status(200, b"new"));
        let cache = MediaCache::new("v2", filter(), storage.clone(), network.clone());
        assert!(!cache.is_active());

        let deleted = cache.install().await.unwrap();
        assert!(cache.is_active());
        assert_eq!(deleted, vec!["unrelated", "video-cache-v1", "video-cache-v1-metadata"]);
        assert!(storage.namespaces().await.unwrap().is_empty());

        let response = cache.intercept(&HttpRequest::parse(VIDEO).unwrap()).await;
        assert_eq!(&response.body[..], b"new");
        assert_eq!(network.calls(), 1);
    }

    #[tokio::test]
    async fn test_metadata_suffixed_version_never_activates() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let old = harness_with(Reply::Status(200, b"old"), storage.clone(), "v1").await;
        get(&old.client, VIDEO).await;

        let network = StubNetwork::new(Reply::Fail);
        let cache = Arc::new(MediaCache::new("v1-metadata", filter(), storage.clone(), network.clone()));
        assert!(matches!(cache.install().await, Err(Error::InvalidInput(_))));
        assert!(!cache.is_active());
        assert!(!cache.accepts(&HttpRequest::parse(VIDEO).unwrap()));

        let client = InterceptingClient::new(network.clone()).with(cache.clone());
        assert!(client.fetch(&HttpRequest::parse(VIDEO).unwrap()).await.is_err());
        assert_eq!(network.calls(), 1);
        assert_eq!(storage.namespaces().await.unwrap(), vec!["video-cache-v1", "video-cache-v1-metadata"]);
    }

    #[tokio::test]
    async fn test_oversized_asset_is_too_large_not_missing() {
        let h = harness(Reply::TooLarge).await;

        let response = get(&h.client, VIDEO).await;
        assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(&response.body[..], b"Video too large to relay");
        assert!(h.storage.namespaces().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_asset_falls_back_to_stale_copy() {
        let h = harness(Reply::Status(200, b"small")).await;

        get(&h.client, VIDEO).await;
        h.clock.advance(Duration::from_secs(25 * 60 * 60));
        h.network.set(Reply::TooLarge);
        let response = get(&h.client, VIDEO).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(&response.body[..], b"small");
    }

    /// Storage whose every operation fails.
    struct BrokenStorage;

    #[async_trait]
    impl CacheStorage for BrokenStorage {
        async fn lookup(&self, _namespace: &str, _url: &str) -> Result<Option<CachedResponse>, Error> {
            Err(Error::CacheCorrupt("body digest mismatch".into()))
        }

        async fn put_all(&self, _writes: Vec<CacheWrite>) -> Result<(), Error> {
            Err(Error::Database(tokio_rusqlite::Error::ConnectionClosed))
        }

        async fn namespaces(&self) -> Result<Vec<String>, Error> {
            Ok(vec![])
        }

        async fn delete(&self, _namespace: &str) -> Result<bool, Error> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_broken_storage_never_fails_the_fetch() {
        let network = StubNetwork::new(Reply::Status(200, b"from-network"));
        let cache = Arc::new(MediaCache::new("v1", filter(), Arc::new(BrokenStorage), network.clone()));
        cache.install().await.unwrap();
        let client = InterceptingClient::new(network.clone()).with(cache);

        let first = get(&client, VIDEO).await;
        let second = get(&client, VIDEO).await;

        assert_eq!(first.status, StatusCode::OK);
        assert_eq!(&second.body[..], b"from-network");
        assert_eq!(network.calls(), 2);
    }

    #[tokio::test]
    async fn test_broken_storage_and_failed_network_is_not_available() {
        let network = StubNetwork::new(Reply::Fail);
        let cache = MediaCache::new("v1", filter(), Arc::new(BrokenStorage), network);
        cache.install().await.unwrap();

        let response = cache.intercept(&HttpRequest::parse(VIDEO).unwrap()).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unreadable_timestamp_counts_as_stale() {
        let h = harness(Reply::Status(200, b"fresh")).await;
        h.storage
            .put_all(vec![
                CacheWrite {
                    namespace: "video-cache-v1".into(),
                    url: VIDEO.into(),
                    response: CachedResponse { status: 200, headers: vec![], body: b"cached".to_vec() },
                },
                CacheWrite {
                    namespace: "video-cache-v1-metadata".into(),
                    url: VIDEO.into(),
                    response: CachedResponse { status: 200, headers: vec![], body: b"not json".to_vec() },
                },
            ])
            .await
            .unwrap();

        let response = get(&h.client, VIDEO).await;
        assert_eq!(&response.body[..], b"fresh");
        assert_eq!(h.network.calls(), 1);

        let timestamp = h.storage.lookup("video-cache-v1-metadata", VIDEO).await.unwrap().unwrap();
        let doc: TimestampDoc = serde_json::from_slice(&timestamp.body).unwrap();
        assert_eq!(doc.timestamp, T0);
    }

    #[tokio::test]
    async fn test_tampered_sqlite_row_is_fetched_again() {
        use tokio_rusqlite::rusqlite;

        let dir = std::env::temp_dir().join(format!("showcase-media-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("cache.sqlite");
        let _ = std::fs::remove_file(&path);

        let db = Arc::new(CacheDb::open(&path).await.unwrap());
        let network = StubNetwork::new(Reply::Status(200, b"genuine"));
        let cache = MediaCache::new("v1", filter(), db.clone(), network.clone())
            .with_clock(Arc::new(ManualClock::new(T0)));
        cache.install().await.unwrap();
        cache.intercept(&HttpRequest::parse(VIDEO).unwrap()).await;

        let raw = tokio_rusqlite::Connection::open(&path).await.unwrap();
        raw.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute("UPDATE media_cache SET body = X'00' WHERE namespace = 'video-cache-v1'", [])?;
            Ok(())
        })
        .await
        .unwrap();

        network.set(Reply::Status(200, b"refetched"));
        let response = cache.intercept(&HttpRequest::parse(VIDEO).unwrap()).await;

        assert_eq!(&response.body[..], b"refetched");
        assert_eq!(network.calls(), 2);
        assert_eq!(&db.match_response("video-cache-v1", VIDEO).await.unwrap().unwrap().body[..], b"refetched");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_inactive_cache_intercepts_nothing() {
        let network = StubNetwork::new(Reply::Status(200, b"x"));
        let cache = MediaCache::new("v1", filter(), Arc::new(MemoryCacheStorage::new()), network);
        assert!(!cache.accepts(&HttpRequest::parse(VIDEO).unwrap()));
    }

    #[tokio::test]
    async fn test_sqlite_storage_survives_new_cache_instance() {
        let db = Arc::new(CacheDb::open_in_memory().await.unwrap());
        let clock = Arc::new(ManualClock::new(T0));

        let network = StubNetwork::new(Reply::Status(200, b"persisted"));
        let first = MediaCache::new("v1", filter(), db.clone(), network.clone()).with_clock(clock.clone());
        first.install().await.unwrap();
        first.intercept(&HttpRequest::parse(VIDEO).unwrap()).await;

        network.set(Reply::Fail);
        let second = MediaCache::new("v1", filter(), db.clone(), network.clone()).with_clock(clock.clone());
        assert!(second.install().await.unwrap().is_empty());
        let response = second.intercept(&HttpRequest::parse(VIDEO).unwrap()).await;

        assert_eq!(&response.body[..], b"persisted");
        assert_eq!(network.calls(), 1);
    }
}
