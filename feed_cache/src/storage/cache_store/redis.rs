use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use sha2::{Digest, Sha256};
use std::fmt::Write;

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

use super::types::{CacheStore, RedisCacheStore};

const KEY_NAMESPACE: &str = "cache";

/// Keys longer than this are stored under their SHA-256 digest
const MAX_PLAIN_KEY_LEN: usize = 512;

impl RedisCacheStore {
    /// Validate `url` and keep a client for it; connecting is deferred to first use
    pub fn open(url: &str) -> Result<Self, StorageError> {
        let client = redis::Client::open(url)
            .map_err(|e| StorageError::Config(format!("Invalid Redis URL {url}: {e}")))?;
        Ok(Self { client })
    }

    fn redis_key(prefix: &str, key: &str) -> String {
        if key.len() <= MAX_PLAIN_KEY_LEN {
            return format!("{KEY_NAMESPACE}:{prefix}:{key}");
        }

        let digest = Sha256::digest(key.as_bytes());
        let hex = digest.iter().fold(String::with_capacity(64), |mut hex, b| {
            let _ = write!(hex, "{b:02x}");
            hex
        });
        format!("{KEY_NAMESPACE}:{prefix}:sha256:{hex}")
    }

    async fn connection(&self) -> Result<MultiplexedConnection, StorageError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        let mut conn = self.connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        tracing::info!("Redis cache store reachable ({})", pong);
        Ok(())
    }

    async fn put_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: u64,
    ) -> Result<(), StorageError> {
        let redis_key = Self::redis_key(prefix, key);
        let payload = serde_json::to_string(&value)?;

        let mut conn = self.connection().await?;
        // Redis reclaims the key itself once the entry can no longer be fresh
        match ttl {
            0 => conn.set::<_, _, ()>(&redis_key, payload).await?,
            secs => conn.set_ex::<_, _, ()>(&redis_key, payload, secs).await?,
        }
        Ok(())
    }

    async fn get(&mut self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError> {
        let mut conn = self.connection().await?;
        let payload: Option<String> = conn.get(Self::redis_key(prefix, key)).await?;

        payload
            .map(|p| serde_json::from_str(&p).map_err(StorageError::from))
            .transpose()
    }

    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(Self::redis_key(prefix, key)).await?;
        Ok(())
    }
}
