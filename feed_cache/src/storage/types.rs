use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::StorageError;

/// Data stored in the cache
///
/// `value` is the producer's result serialized to JSON. An entry is fresh while
/// `ttl > 0` and fewer than `ttl` seconds have passed since `stored_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheData {
    pub value: String,
    pub stored_at: DateTime<Utc>,
    /// Time to live in seconds; zero means the entry is never fresh
    pub ttl: u64,
}

impl CacheData {
    pub fn new(value: String, stored_at: DateTime<Utc>, ttl: u64) -> Self {
        Self {
            value,
            stored_at,
            ttl,
        }
    }

    /// Instant at which the entry stops being fresh
    pub fn expires_at(&self) -> DateTime<Utc> {
        i64::try_from(self.ttl)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|ttl| self.stored_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        self.ttl > 0 && now < self.expires_at()
    }
}

/// A validated cache key
///
/// Keys are opaque to the cache; uniqueness is the caller's responsibility.
/// Validation happens here, at the call boundary, so the memoizer never sees
/// an empty key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Result<Self, StorageError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(StorageError::InvalidInput(
                "Cache key must not be empty".to_string(),
            ));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for CacheKey {
    type Error = StorageError;

    fn try_from(key: &str) -> Result<Self, Self::Error> {
        Self::new(key)
    }
}

impl TryFrom<String> for CacheKey {
    type Error = StorageError;

    fn try_from(key: String) -> Result<Self, Self::Error> {
        Self::new(key)
    }
}
