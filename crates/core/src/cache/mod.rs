//! SQLite-backed persistence for the stats entry and the media cache.
//!
//! This module provides a persistent cache using SQLite with async access
//! via tokio-rusqlite. It supports:
//!
//! - A string key-value table for the persisted stats entry
//! - Namespaced response storage with transactional multi-row writes
//! - Body digests checked on every read
//! - Automatic schema migrations and WAL mode for concurrent access

pub mod connection;
pub mod hash;
pub mod kv;
pub mod media;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use media::{CacheWrite, CachedResponse};
