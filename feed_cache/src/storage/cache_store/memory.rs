use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use moka::Expiry;
use moka::future::Cache;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};
use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

use super::types::{CacheStore, InMemoryCacheStore, MemoryEntry};

const KEY_NAMESPACE: &str = "cache";

/// Per-entry lifetime taken from the TTL given to `put_with_ttl`
struct EntryTtl;

impl EntryTtl {
    fn lifetime(entry: &MemoryEntry) -> Option<Duration> {
        (entry.ttl > 0).then(|| Duration::from_secs(entry.ttl))
    }
}

impl Expiry<String, MemoryEntry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &MemoryEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Self::lifetime(value)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &MemoryEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Self::lifetime(value)
    }
}

impl InMemoryCacheStore {
    /// Create a store holding at most `capacity` entries (0 means unbounded)
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, Arc::new(SystemClock))
    }

    pub fn with_clock(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        tracing::info!(
            "Creating new in-memory cache store with capacity {}",
            capacity
        );
        let mut builder = Cache::<String, MemoryEntry>::builder().expire_after(EntryTtl);
        if capacity > 0 {
            builder = builder.max_capacity(capacity as u64);
        }

        Self {
            cache: builder.build(),
            clock,
        }
    }

    /// Number of live entries, after moka has applied pending evictions
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    fn storage_key(prefix: &str, key: &str) -> String {
        format!("{KEY_NAMESPACE}:{prefix}:{key}")
    }

    fn is_expired(entry: &MemoryEntry, now: DateTime<Utc>) -> bool {
        entry.expires_at.is_some_and(|at| now >= at)
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn put_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: u64,
    ) -> Result<(), StorageError> {
        let expires_at = if ttl == 0 {
            None
        } else {
            let lifetime = i64::try_from(ttl)
                .ok()
                .and_then(TimeDelta::try_seconds)
                .ok_or_else(|| {
                    StorageError::InvalidInput("TTL value too large for storage backend".into())
                })?;
            self.clock.now().checked_add_signed(lifetime)
        };

        let entry = MemoryEntry {
            data: value,
            ttl,
            expires_at,
        };
        self.cache.insert(Self::storage_key(prefix, key), entry).await;
        Ok(())
    }

    async fn get(&mut self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError> {
        let key = Self::storage_key(prefix, key);
        let Some(entry) = self.cache.get(&key).await else {
            return Ok(None);
        };

        if Self::is_expired(&entry, self.clock.now()) {
            tracing::debug!("Dropping expired cache entry: {}", key);
            self.cache.invalidate(&key).await;
            return Ok(None);
        }

        Ok(Some(entry.data))
    }

    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError> {
        self.cache.invalidate(&Self::storage_key(prefix, key)).await;
        Ok(())
    }
}
