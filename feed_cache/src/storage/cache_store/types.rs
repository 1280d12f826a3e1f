use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use std::sync::Arc;

use crate::clock::Clock;
use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

/// Process-local store on a bounded `moka` cache
///
/// Moka reclaims entries once their TTL has elapsed in wall-clock time; reads
/// additionally hide entries that are expired under the injected clock.
pub struct InMemoryCacheStore {
    pub(super) cache: Cache<String, MemoryEntry>,
    pub(super) clock: Arc<dyn Clock>,
}

#[derive(Clone)]
pub(super) struct MemoryEntry {
    pub(super) data: CacheData,
    /// Seconds the store keeps the entry; zero keeps it until evicted
    pub(super) ttl: u64,
    pub(super) expires_at: Option<DateTime<Utc>>,
}

/// Store backed by a Redis server, shared by every process pointed at it
pub struct RedisCacheStore {
    pub(super) client: redis::Client,
}

// Trait
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Initialize the store. This is called when the store is created.
    async fn init(&self) -> Result<(), StorageError>;

    /// Put an entry into the store, replacing any previous one.
    ///
    /// `ttl` is in seconds. Backends that can expire keys on their own use it
    /// to reclaim stale entries; zero means no backend-side expiry.
    async fn put_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: u64,
    ) -> Result<(), StorageError>;

    /// Get an entry from the store.
    ///
    /// Takes `&mut self` so that backends can drop expired
    /// entries on read.
    async fn get(&mut self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError>;

    /// Remove an entry from the store.
    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError>;
}
