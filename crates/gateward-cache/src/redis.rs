//! Redis cache backend.
//!
//! Values are plain strings/bytes with `SET EX` expiration; the jittered TTL
//! is decided by the caller. Pattern removal uses cursor-based `SCAN` with
//! `MATCH` instead of `KEYS` so a large keyspace never blocks the server.
//!
//! An optional key prefix namespaces the instance when it is shared: each
//! entity kind gets its own prefix (e.g. `"gateward:scope:"`), which keeps
//! the coarse `list:*` invalidation scoped to one kind.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use ::redis::aio::ConnectionManager;
use ::redis::{AsyncCommands, Client};

use gateward_core::RedisConfig;

use crate::error::{CacheError, CacheResult};
use crate::Cache;

/// Keys fetched per SCAN round.
const SCAN_BATCH: usize = 100;

/// Redis-backed cache adapter.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    prefix: String,
}

impl RedisCache {
    /// Connect without a key prefix.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the connection cannot be established.
    pub async fn connect(url: &str) -> CacheResult<Self> {
        Self::connect_with_prefix(url, None).await
    }

    /// Connect with an optional key prefix.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the connection cannot be established.
    pub async fn connect_with_prefix(url: &str, prefix: Option<&str>) -> CacheResult<Self> {
        let client = Client::open(url).map_err(CacheError::from)?;
        let connection = ConnectionManager::new(client).await?;
        debug!(prefix = prefix.unwrap_or(""), "Connected to redis cache");
        Ok(Self {
            connection,
            prefix: prefix.unwrap_or("").to_string(),
        })
    }

    /// Connect using a [`RedisConfig`].
    ///
    /// # Errors
    ///
    /// Returns a backend error if the connection cannot be established.
    pub async fn from_config(config: &RedisConfig) -> CacheResult<Self> {
        Self::connect_with_prefix(&config.url, config.key_prefix.as_deref()).await
    }

    /// The configured key prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[inline]
    fn prefixed(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}{}", self.prefix, key)
        }
    }

    async fn scan_keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let mut conn = self.connection.clone();
        let mut keys: Vec<String> = Vec::new();
        let mut cursor = 0u64;

        loop {
            let (next, batch): (u64, Vec<String>) = ::redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            keys.extend(batch);
            cursor = next;
            if cursor == 0 {
                break;
            }
        }
        Ok(keys)
    }
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Vec<u8>> {
        let mut conn = self.connection.clone();
        let value: Option<Vec<u8>> = conn.get(self.prefixed(key)).await?;
        value.ok_or(CacheError::Miss)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()> {
        let mut conn = self.connection.clone();
        // EX takes whole seconds; round sub-second TTLs up so an entry never
        // lands without an expiry.
        let secs = ttl.as_secs().max(1);
        let _: () = conn.set_ex(self.prefixed(key), value, secs).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(self.prefixed(key)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_match(&self, pattern: &str) -> CacheResult<()> {
        let keys = self.scan_keys(&self.prefixed(pattern)).await?;
        if keys.is_empty() {
            return Ok(());
        }
        debug!(count = keys.len(), pattern, "Removing matching cache keys");
        let mut conn = self.connection.clone();
        for chunk in keys.chunks(SCAN_BATCH) {
            let _: () = conn.del(chunk).await?;
        }
        Ok(())
    }
}
