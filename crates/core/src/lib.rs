//! Core types and shared functionality for showcase.
//!
//! This crate provides:
//! - SQLite persistence for the stats entry and media cache namespaces
//! - Unified error types
//! - Layered configuration
//! - The showcase catalog, counter formatting and clocks

pub mod cache;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod format;

pub use cache::{CacheDb, CacheWrite, CachedResponse};
pub use catalog::{StatSnapshot, VideoExample};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use format::format_count;
