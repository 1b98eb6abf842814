//! Persisted storage for the stats entry.

use async_trait::async_trait;
use showcase_core::{CacheDb, Error};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// String key-value storage the stats cache persists its entry in.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, Error>;

    async fn put(&self, key: &str, value: &str) -> Result<(), Error>;
}

#[async_trait]
impl CacheStore for CacheDb {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        self.get_value(key).await
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), Error> {
        self.put_value(key, value).await
    }
}

/// Process-local store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), Error> {
        self.entries.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
