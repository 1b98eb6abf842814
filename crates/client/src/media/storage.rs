//! Namespaced response storage behind the media cache.

use async_trait::async_trait;
use showcase_core::{CacheDb, CacheWrite, CachedResponse, Error};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Named collections of stored responses, keyed by URL.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    async fn lookup(&self, namespace: &str, url: &str) -> Result<Option<CachedResponse>, Error>;

    /// Apply every write or none of them.
    async fn put_all(&self, writes: Vec<CacheWrite>) -> Result<(), Error>;

    async fn namespaces(&self) -> Result<Vec<String>, Error>;

    /// Drop a namespace; `false` if it did not exist.
    async fn delete(&self, namespace: &str) -> Result<bool, Error>;
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn lookup(&self, namespace: &str, url: &str) -> Result<Option<CachedResponse>, Error> {
        self.match_response(namespace, url).await
    }

    async fn put_all(&self, writes: Vec<CacheWrite>) -> Result<(), Error> {
        self.put_responses(writes).await
    }

    async fn namespaces(&self) -> Result<Vec<String>, Error> {
        CacheDb::namespaces(self).await
    }

    async fn delete(&self, namespace: &str) -> Result<bool, Error> {
        Ok(self.delete_namespace(namespace).await? > 0)
    }
}

/// Process-local storage.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    namespaces: RwLock<BTreeMap<String, BTreeMap<String, CachedResponse>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn lookup(&self, namespace: &str, url: &str) -> Result<Option<CachedResponse>, Error> {
        Ok(self.namespaces.read().await.get(namespace).and_then(|ns| ns.get(url)).cloned())
    }

    async fn put_all(&self, writes: Vec<CacheWrite>) -> Result<(), Error> {
        let mut namespaces = self.namespaces.write().await;
        for write in writes {
            namespaces.entry(write.namespace).or_default().insert(write.url, write.response);
        }
        Ok(())
    }

    async fn namespaces(&self) -> Result<Vec<String>, Error> {
        Ok(self.namespaces.read().await.keys().cloned().collect())
    }

    async fn delete(&self, namespace: &str) -> Result<bool, Error> {
        Ok(self.namespaces.write().await.remove(namespace).is_some())
    }
}
