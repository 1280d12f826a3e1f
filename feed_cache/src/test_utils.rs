//! Shared helpers for unit tests across the crate

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;

use crate::storage::{CacheData, CacheStore, StorageError};

/// Stand-in for an upstream fetch failure
#[derive(Debug, Error, Clone, PartialEq)]
#[error("network error: {0}")]
pub struct NetworkError(pub String);

/// Counts how many times a producer was invoked
#[derive(Clone, Default)]
pub struct CallCounter {
    calls: Arc<AtomicUsize>,
}

impl CallCounter {
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// A producer future that succeeds with `value`; the call is counted immediately
    pub fn produce<T>(&self, value: T) -> impl Future<Output = Result<T, NetworkError>> + use<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        async move { Ok(value) }
    }

    /// Like `produce`, but takes long enough for concurrent callers to pile up
    pub fn produce_slowly<T>(
        &self,
        value: T,
    ) -> impl Future<Output = Result<T, NetworkError>> + use<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(value)
        }
    }
}

/// A store whose backend is permanently down
pub struct FailingCacheStore;

#[async_trait]
impl CacheStore for FailingCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        Err(StorageError::Storage("connection refused".to_string()))
    }

    async fn put_with_ttl(
        &mut self,
        _prefix: &str,
        _key: &str,
        _value: CacheData,
        _ttl: u64,
    ) -> Result<(), StorageError> {
        Err(StorageError::Storage("connection refused".to_string()))
    }

    async fn get(
        &mut self,
        _prefix: &str,
        _key: &str,
    ) -> Result<Option<CacheData>, StorageError> {
        Err(StorageError::Storage("connection refused".to_string()))
    }

    async fn remove(&mut self, _prefix: &str, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Storage("connection refused".to_string()))
    }
}

/// Wraps a store so that its first `get` misses, like a lookup that races a
/// concurrent writer
pub struct MissOnceCacheStore<S> {
    inner: S,
    missed: bool,
}

impl<S> MissOnceCacheStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            missed: false,
        }
    }
}

#[async_trait]
impl<S: CacheStore> CacheStore for MissOnceCacheStore<S> {
    async fn init(&self) -> Result<(), StorageError> {
        self.inner.init().await
    }

    async fn put_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: u64,
    ) -> Result<(), StorageError> {
        self.inner.put_with_ttl(prefix, key, value, ttl).await
    }

    async fn get(&mut self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError> {
        if !self.missed {
            self.missed = true;
            return Ok(None);
        }
        self.inner.get(prefix, key).await
    }

    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError> {
        self.inner.remove(prefix, key).await
    }
}
