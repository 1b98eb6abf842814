//! Client code for showcase.
//!
//! This crate provides the HTTP fetch abstraction with its interceptor
//! chain, the stats cache, the media cache and the upstream provider client
//! used by the server.

pub mod fetch;
pub mod media;
pub mod provider;
pub mod stats;

#[cfg(test)]
mod testing;

pub use fetch::{FetchClient, FetchConfig, HttpFetch, HttpRequest, HttpResponse, InterceptingClient, Interceptor};
pub use media::{CacheStorage, MediaCache, MediaFilter, MemoryCacheStorage};
pub use provider::{ProviderClient, ProviderConfig, ProviderError};
pub use stats::{DisplayStats, ProxyStatsClient, StatsCache, StatsError, StatsOrigin, StatsOutcome, display_all};
