use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::clock::{Clock, SystemClock};
use crate::config::{CACHE_MEMORY_MAX, FEED_CACHE_TYPE, FEED_CACHE_URL};
use crate::storage::{CacheData, CacheKey, CacheStore, StorageError, build_cache_store};

use super::config::MemoizerConfig;
use super::single_flight::InFlight;

/// Fetch-with-cache memoizer
///
/// Wraps an expensive producer (an upstream fetch plus parse) so that, for a
/// given key, it runs at most once per TTL window. Store failures never reach
/// the caller: a store that cannot be read is a miss and a store that cannot be
/// written is skipped. Cloning is cheap and every clone shares the same store.
#[derive(Clone)]
pub struct Memoizer {
    store: Arc<Mutex<Box<dyn CacheStore>>>,
    clock: Arc<dyn Clock>,
    in_flight: InFlight,
    config: MemoizerConfig,
}

impl Memoizer {
    /// Memoizer over `store` with default settings and the system clock
    pub fn new(store: Box<dyn CacheStore>) -> Self {
        Self::with_config(store, MemoizerConfig::default(), Arc::new(SystemClock))
    }

    pub fn with_config(
        store: Box<dyn CacheStore>,
        config: MemoizerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            clock,
            in_flight: InFlight::default(),
            config,
        }
    }

    /// Build the store named by `FEED_CACHE_TYPE` and wrap it
    ///
    /// An unreachable store is logged and tolerated; only an invalid
    /// configuration is an error.
    pub async fn from_env() -> Result<Self, StorageError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let store = build_cache_store(
            FEED_CACHE_TYPE.as_str(),
            FEED_CACHE_URL.as_str(),
            *CACHE_MEMORY_MAX,
            clock.clone(),
        )?;

        if let Err(e) = store.init().await {
            tracing::warn!(
                "Cache store unavailable at start-up, every request will reach upstream: {}",
                e
            );
        }

        Ok(Self::with_config(store, MemoizerConfig::from_env(), clock))
    }

    pub fn config(&self) -> &MemoizerConfig {
        &self.config
    }

    /// Return the cached value for `key`, or run `producer` and cache its result
    ///
    /// - With `use_cache` and a fresh entry, `producer` is not called.
    /// - Otherwise `producer` runs to completion; a successful result is stored
    ///   for `ttl` before it is returned, so a forced refresh
    ///   (`use_cache = false`) still warms the cache for other callers.
    /// - A producer error is returned as-is and nothing is written; an earlier
    ///   entry for the key is left in place.
    /// - A zero `ttl` means "do not cache": the producer always runs and the
    ///   store is not touched.
    ///
    /// With single-flight enabled, concurrent cached calls for the same key
    /// wait for the first one and reuse its result.
    #[tracing::instrument(skip_all, fields(key = %key, ttl = ttl.as_secs(), use_cache = use_cache))]
    pub async fn try_get<T, E, F, Fut>(
        &self,
        key: &CacheKey,
        producer: F,
        ttl: Duration,
        use_cache: bool,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let ttl = ttl_seconds(ttl);
        if ttl == 0 {
            tracing::debug!("Zero TTL, bypassing cache");
            return producer().await;
        }

        if use_cache {
            if let Some(value) = self.read_fresh(key).await {
                tracing::debug!("Cache hit");
                return Ok(value);
            }
        }

        let _slot = if use_cache && self.config.single_flight {
            let slot = self.in_flight.acquire(key.as_str()).await;
            // A concurrent caller may have filled the entry since the first read
            if let Some(value) = self.read_fresh(key).await {
                tracing::debug!("Cache filled by concurrent caller");
                return Ok(value);
            }
            Some(slot)
        } else {
            None
        };

        tracing::debug!("Cache miss, invoking producer");
        let value = producer().await?;
        self.write(key, &value, ttl).await;

        Ok(value)
    }

    /// [`try_get`](Self::try_get) with the configured content TTL and the cache enabled
    pub async fn try_get_default<T, E, F, Fut>(&self, key: &CacheKey, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.try_get(key, producer, self.config.default_ttl, true).await
    }

    /// Read a fresh entry without producing one
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        self.read_fresh(key).await
    }

    /// Store `value` under `key` directly. Returns whether the write landed.
    pub async fn set<T: Serialize>(&self, key: &CacheKey, value: &T, ttl: Duration) -> bool {
        self.write(key, value, ttl_seconds(ttl)).await
    }

    /// Drop the entry for `key`. Returns whether the store accepted the removal.
    pub async fn invalidate(&self, key: &CacheKey) -> bool {
        let result = self
            .store
            .lock()
            .await
            .remove(&self.config.prefix, key.as_str())
            .await;

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Cache remove failed for {}: {}", key, e);
                false
            }
        }
    }

    async fn read_fresh<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let cached = self
            .store
            .lock()
            .await
            .get(&self.config.prefix, key.as_str())
            .await;

        let cached = match cached {
            Ok(cached) => cached?,
            Err(e) => {
                tracing::warn!("Cache read failed for {}, treating as miss: {}", key, e);
                return None;
            }
        };

        if !cached.is_fresh_at(self.clock.now()) {
            tracing::debug!("Cached entry for {} is stale", key);
            return None;
        }

        match serde_json::from_str(&cached.value) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Discarding undecodable cache entry for {}: {}", key, e);
                None
            }
        }
    }

    async fn write<T: Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) -> bool {
        if ttl == 0 {
            return false;
        }

        let value = match serde_json::to_string(value) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Cannot serialize value for {}, not caching: {}", key, e);
                return false;
            }
        };
        let data = CacheData::new(value, self.clock.now(), ttl);

        let result = self
            .store
            .lock()
            .await
            .put_with_ttl(&self.config.prefix, key.as_str(), data, ttl)
            .await;

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Cache write failed for {}: {}", key, e);
                false
            }
        }
    }
}

/// Whole seconds, rounding a fractional remainder up so sub-second TTLs still cache
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0)
}
