mod cache_store;
mod errors;
mod types;

pub use cache_store::{CacheStore, InMemoryCacheStore, RedisCacheStore, build_cache_store};
pub use errors::StorageError;
pub use types::{CacheData, CacheKey};
