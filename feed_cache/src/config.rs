//! Central configuration for the feed_cache crate

use std::env;
use std::sync::LazyLock;

/// Cache backend kind: "memory" or "redis"
///
/// Default: "memory"
pub static FEED_CACHE_TYPE: LazyLock<String> =
    LazyLock::new(|| env::var("FEED_CACHE_TYPE").unwrap_or_else(|_| "memory".to_string()));

/// Connection URL for the Redis backend (ignored by the memory backend)
pub static FEED_CACHE_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("FEED_CACHE_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
});

/// Namespace inserted between the store prefix and the caller's key
///
/// Default: "feed"
pub static FEED_CACHE_PREFIX: LazyLock<String> =
    LazyLock::new(|| env::var("FEED_CACHE_PREFIX").unwrap_or_else(|_| "feed".to_string()));

/// Default TTL in seconds for upstream content (fetched pages, parsed items)
pub static CACHE_CONTENT_EXPIRE: LazyLock<u64> =
    LazyLock::new(|| u64_from_env("CACHE_CONTENT_EXPIRE", 3600));

/// TTL in seconds for a route's rendered output
pub static CACHE_ROUTE_EXPIRE: LazyLock<u64> =
    LazyLock::new(|| u64_from_env("CACHE_ROUTE_EXPIRE", 300));

/// Maximum number of entries held by the in-memory backend
pub static CACHE_MEMORY_MAX: LazyLock<usize> =
    LazyLock::new(|| u64_from_env("CACHE_MEMORY_MAX", 256) as usize);

/// Collapse concurrent misses on the same key into one producer call
pub static FEED_CACHE_SINGLE_FLIGHT: LazyLock<bool> =
    LazyLock::new(|| bool_from_env("FEED_CACHE_SINGLE_FLIGHT", true));

/// Upstream request timeout in seconds
pub static FEED_REQUEST_TIMEOUT: LazyLock<u64> =
    LazyLock::new(|| u64_from_env("FEED_REQUEST_TIMEOUT", 30));

/// User-Agent header sent with every upstream request
pub static FEED_USER_AGENT: LazyLock<String> = LazyLock::new(|| {
    env::var("FEED_USER_AGENT").unwrap_or_else(|_| {
        format!(
            "Mozilla/5.0 (compatible; feed-cache/{})",
            env!("CARGO_PKG_VERSION")
        )
    })
});

fn u64_from_env(name: &str, default: u64) -> u64 {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!("Ignoring invalid {}={:?}, using {}", name, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}

fn bool_from_env(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                tracing::warn!("Ignoring invalid {}={:?}, using {}", name, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // The statics are initialized once per process, so these tests exercise
    // the parsing helpers the statics are built from.

    #[test]
    #[serial]
    fn test_u64_from_env_default_when_unset() {
        unsafe {
            env::remove_var("FEED_CACHE_TEST_U64");
        }

        assert_eq!(u64_from_env("FEED_CACHE_TEST_U64", 3600), 3600);
    }

    #[test]
    #[serial]
    fn test_u64_from_env_custom_value() {
        unsafe {
            env::set_var("FEED_CACHE_TEST_U64", " 120 ");
        }

        assert_eq!(u64_from_env("FEED_CACHE_TEST_U64", 3600), 120);

        unsafe {
            env::remove_var("FEED_CACHE_TEST_U64");
        }
    }

    #[test]
    #[serial]
    fn test_u64_from_env_invalid_falls_back() {
        unsafe {
            env::set_var("FEED_CACHE_TEST_U64", "-5");
        }

        assert_eq!(u64_from_env("FEED_CACHE_TEST_U64", 300), 300);

        unsafe {
            env::remove_var("FEED_CACHE_TEST_U64");
        }
    }

    #[test]
    #[serial]
    fn test_bool_from_env_variants() {
        for (raw, expected) in [
            ("true", true),
            ("TRUE", true),
            ("1", true),
            ("on", true),
            ("false", false),
            ("0", false),
            ("Off", false),
            ("maybe", true),
        ] {
            unsafe {
                env::set_var("FEED_CACHE_TEST_BOOL", raw);
            }
            assert_eq!(
                bool_from_env("FEED_CACHE_TEST_BOOL", true),
                expected,
                "raw value {raw:?}"
            );
        }

        unsafe {
            env::remove_var("FEED_CACHE_TEST_BOOL");
        }
        assert!(!bool_from_env("FEED_CACHE_TEST_BOOL", false));
    }
}
