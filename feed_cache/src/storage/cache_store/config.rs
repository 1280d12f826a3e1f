use std::sync::Arc;

use crate::clock::Clock;
use crate::storage::errors::StorageError;

use super::types::{CacheStore, InMemoryCacheStore, RedisCacheStore};

/// Construct the store backend named by `store_type`
///
/// Supported types are "memory" (bounded to `capacity` entries) and "redis"
/// (connecting to `store_url` lazily). The caller owns the returned store;
/// there is no process-wide instance.
pub fn build_cache_store(
    store_type: &str,
    store_url: &str,
    capacity: usize,
    clock: Arc<dyn Clock>,
) -> Result<Box<dyn CacheStore>, StorageError> {
    tracing::info!("Initializing cache store with type: {}", store_type);

    let store: Box<dyn CacheStore> = match store_type {
        "memory" => Box::new(InMemoryCacheStore::with_clock(capacity, clock)),
        "redis" => {
            tracing::info!("Using Redis cache store at {}", store_url);
            Box::new(RedisCacheStore::open(store_url)?)
        }
        t => {
            return Err(StorageError::Config(format!(
                "Unsupported cache store type: {t}. Supported types are 'memory' and 'redis'"
            )));
        }
    };

    Ok(store)
}
