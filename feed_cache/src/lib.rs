//! feed_cache - Fetch-with-cache memoization for feed scrapers
//!
//! Route handlers fetch an upstream page, parse it into feed items and memoize
//! the result through [`Memoizer::try_get`] so repeated requests within the TTL
//! never touch the upstream site. The backing store is either in-process memory
//! or Redis, selected at start-up.

mod clock;
mod config;
mod extract;
mod fetch;
mod memoize;
mod storage;
mod types;

#[cfg(test)]
mod test_utils;

pub use clock::{Clock, ManualClock, SystemClock};

pub use config::{
    CACHE_CONTENT_EXPIRE, CACHE_MEMORY_MAX, CACHE_ROUTE_EXPIRE, FEED_CACHE_PREFIX,
    FEED_CACHE_SINGLE_FLIGHT, FEED_CACHE_TYPE, FEED_CACHE_URL, FEED_REQUEST_TIMEOUT,
    FEED_USER_AGENT,
};

pub use extract::{ExtractError, extract_next_data, extract_next_flight_objects};

pub use fetch::{FetchError, fetch_json, fetch_text};

pub use memoize::{Memoizer, MemoizerConfig};

pub use storage::{
    CacheData, CacheKey, CacheStore, InMemoryCacheStore, RedisCacheStore, StorageError,
    build_cache_store,
};

pub use types::{DataItem, Feed};

/// Build a memoizer from the environment and verify its store is reachable
pub async fn init() -> Result<Memoizer, StorageError> {
    Memoizer::from_env().await
}
