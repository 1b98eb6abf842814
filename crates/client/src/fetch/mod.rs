//! HTTP client abstraction with an interceptor chain.
//!
//! ### Request/Response
//! - `HttpRequest` / `HttpResponse` are plain owned values; bodies are
//!   `Bytes`, so duplicating a response never copies or re-fetches it.
//!
//! ### Transport
//! - `HttpFetch` is the seam every caller goes through.
//! - `FetchClient` implements it over reqwest with a per-request timeout,
//!   redirect limit and body size cap. Non-success statuses are returned,
//!   not raised; only transport failures are errors.
//!
//! ### Interception
//! - `InterceptingClient` offers each request to its registered
//!   `Interceptor`s before falling through to the network.

pub mod intercept;
pub mod url;

pub use intercept::{InterceptingClient, Interceptor};
pub use url::{UrlError, canonicalize};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use showcase_core::{AppConfig, CachedResponse, Error};
use std::time::{Duration, Instant};

/// Headers that describe the connection rather than the resource.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "showcase/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 200MB)
    pub max_bytes: usize,

    /// Request timeout (default: 15s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "showcase/0.1".to_string(),
            max_bytes: 200 * 1024 * 1024,
            timeout: Duration::from_millis(15_000),
            max_redirects: 5,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_media_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// An outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl HttpRequest {
    pub fn get(url: Url) -> Self {
        Self { method: Method::GET, url, headers: HeaderMap::new() }
    }

    /// Build a GET request from a string, canonicalizing the URL first.
    pub fn parse(url: &str) -> Result<Self, Error> {
        let url = canonicalize(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self::get(url))
    }
}

/// A complete response, body included.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self { status, headers: HeaderMap::new(), body: body.into() }
    }

    /// Synthesized answer for media that is neither cached nor reachable.
    pub fn not_available() -> Self {
        let mut response = Self::new(StatusCode::NOT_FOUND, Bytes::from_static(b"Video not available"));
        response
            .headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
        response
    }

    /// Synthesized answer for an asset over the relay size limit.
    pub fn too_large() -> Self {
        let mut response = Self::new(StatusCode::PAYLOAD_TOO_LARGE, Bytes::from_static(b"Video too large to relay"));
        response
            .headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
        response
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Snapshot for storage, dropping hop-by-hop and non-UTF-8 headers.
    pub fn to_cached(&self) -> CachedResponse {
        let headers = self
            .headers
            .iter()
            .filter(|(name, _)| !HOP_BY_HOP.contains(&name.as_str()))
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();

        CachedResponse { status: self.status.as_u16(), headers, body: self.body.to_vec() }
    }

    /// Rebuild a response from storage, skipping headers that no longer parse.
    pub fn from_cached(cached: CachedResponse) -> Self {
        let status = StatusCode::from_u16(cached.status).unwrap_or(StatusCode::OK);
        let mut headers = HeaderMap::new();
        for (name, value) in &cached.headers {
            if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
                headers.append(name, value);
            }
        }
        Self { status, headers, body: Bytes::from(cached.body) }
    }
}

/// Anything that can answer an `HttpRequest`.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, Error>;
}

/// reqwest-backed network transport.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl HttpFetch for FetchClient {
    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        let start = Instant::now();

        let response = self
            .http
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::FetchTimeout(request.url.to_string())
                } else {
                    Error::HttpError(format!("network error: {e}"))
                }
            })?;

        let status = response.status();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::HttpError(format!("failed to read response: {e}")))?;

        if body.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", body.len(), self.config.max_bytes)));
        }

        tracing::debug!(
            "fetched {} -> {} in {}ms ({} bytes)",
            request.url,
            status.as_u16(),
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(HttpResponse { status, headers, body })
    }
}
