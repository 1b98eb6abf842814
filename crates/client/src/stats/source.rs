//! Where per-video stats come from.
//!
//! The stats proxy answers `GET {endpoint}?url=<source url>` with
//! `{ "success": true, "data": { likes, comments, shares, views, title } }`.
//! Anything else, including a well-formed body without `success: true`,
//! is a failure for that one video.

use super::error::StatsError;
use async_trait::async_trait;
use serde::Deserialize;
use showcase_core::StatSnapshot;
use std::time::Duration;

/// A source of stats for a single video.
#[async_trait]
pub trait StatsSource: Send + Sync + 'static {
    async fn fetch_stats(&self, source_url: &str) -> Result<StatSnapshot, StatsError>;
}

#[async_trait]
impl<T: StatsSource> StatsSource for std::sync::Arc<T> {
    async fn fetch_stats(&self, source_url: &str) -> Result<StatSnapshot, StatsError> {
        (**self).fetch_stats(source_url).await
    }
}

/// Envelope returned by the stats proxy.
#[derive(Debug, Deserialize)]
pub struct ProxyEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<ProxyStats>,
}

/// Stats payload inside a successful envelope.
#[derive(Debug, Deserialize)]
pub struct ProxyStats {
    pub likes: u64,
    pub comments: u64,
    #[serde(default)]
    pub shares: u64,
    pub views: u64,
    #[serde(default)]
    pub title: String,
}

impl ProxyEnvelope {
    /// Validate the envelope into a snapshot.
    pub fn into_snapshot(self) -> Result<StatSnapshot, StatsError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(StatSnapshot {
                views: data.views,
                likes: data.likes,
                comments: data.comments,
                shares: data.shares,
                title: data.title,
            }),
            _ => Err(StatsError::NoData),
        }
    }
}

/// Parse and validate a proxy response body.
pub fn parse_envelope(body: &[u8]) -> Result<StatSnapshot, StatsError> {
    let envelope: ProxyEnvelope = serde_json::from_slice(body).map_err(|e| StatsError::Parse(e.to_string()))?;
    envelope.into_snapshot()
}

/// HTTP client for the stats proxy endpoint.
#[derive(Debug, Clone)]
pub struct ProxyStatsClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ProxyStatsClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration, user_agent: &str) -> Result<Self, StatsError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { http, endpoint: endpoint.into() })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl StatsSource for ProxyStatsClient {
    async fn fetch_stats(&self, source_url: &str) -> Result<StatSnapshot, StatsError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("url", source_url)])
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatsError::HttpStatus { status: status.as_u16() });
        }

        let body = response.bytes().await?;
        parse_envelope(&body)
    }
}
