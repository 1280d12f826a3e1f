use thiserror::Error;

/// Failures of a cache store or of the values passing through it
///
/// The memoizer swallows these (logging them) so that a broken store only
/// costs extra upstream requests. They surface to callers from `init` and
/// from building a [`CacheKey`](super::CacheKey).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StorageError {
    /// Unknown backend type or malformed backend URL
    #[error("Cache configuration error: {0}")]
    Config(String),

    /// The backend could not be reached or rejected a command
    #[error("Cache backend error: {0}")]
    Storage(String),

    #[error("Cache value (de)serialization error: {0}")]
    Serde(String),

    #[error("Invalid cache input: {0}")]
    InvalidInput(String),
}

impl From<redis::RedisError> for StorageError {
    fn from(err: redis::RedisError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_cache() {
        let backend = StorageError::Storage("connection reset".to_string());
        let input = StorageError::InvalidInput("cache key is empty".to_string());

        assert_eq!(backend.to_string(), "Cache backend error: connection reset");
        assert_eq!(input.to_string(), "Invalid cache input: cache key is empty");
    }

    #[test]
    fn test_redis_failure_becomes_backend_error() {
        // Given a refused Redis connection
        let refused = redis::RedisError::from((redis::ErrorKind::IoError, "Connection refused"));

        // When it crosses into the cache layer
        let error = StorageError::from(refused);

        // Then the cause is kept in a Storage variant
        match error {
            StorageError::Storage(msg) => assert!(msg.contains("Connection refused")),
            other => panic!("Expected Storage variant, got {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_entry_becomes_serde_error() {
        let corrupt = serde_json::from_str::<serde_json::Value>("{\"value\":").unwrap_err();

        assert!(matches!(StorageError::from(corrupt), StorageError::Serde(_)));
    }
}
