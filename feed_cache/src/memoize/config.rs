use std::time::Duration;

use crate::config::{CACHE_CONTENT_EXPIRE, FEED_CACHE_PREFIX, FEED_CACHE_SINGLE_FLIGHT};

/// Settings for a [`Memoizer`](super::Memoizer)
#[derive(Debug, Clone, PartialEq)]
pub struct MemoizerConfig {
    /// Namespace for every key this memoizer writes
    pub prefix: String,
    /// TTL used by `try_get_default`
    pub default_ttl: Duration,
    /// Collapse concurrent misses on the same key into one producer call
    pub single_flight: bool,
}

impl Default for MemoizerConfig {
    fn default() -> Self {
        Self {
            prefix: "feed".to_string(),
            default_ttl: Duration::from_secs(3600),
            single_flight: true,
        }
    }
}

impl MemoizerConfig {
    pub fn from_env() -> Self {
        Self {
            prefix: FEED_CACHE_PREFIX.clone(),
            default_ttl: Duration::from_secs(*CACHE_CONTENT_EXPIRE),
            single_flight: *FEED_CACHE_SINGLE_FLIGHT,
        }
    }
}
