//! Key-value cache adapters for the Gateward data layer
//!
//! The repositories treat the cache as an opaque byte-oriented key-value
//! service with per-entry expiration. This crate provides:
//!
//! - The [`Cache`] trait with a distinguished miss signal
//! - [`TtlWindow`] and jittered TTLs (anti-stampede)
//! - [`MemoryCache`], a process-local backend for tests and development
//! - [`RedisCache`], the production backend
//!
//! # Example
//!
//! ```ignore
//! use gateward_cache::{Cache, MemoryCache, TtlWindow};
//!
//! let cache = MemoryCache::new();
//! cache.set("code:read", b"...", TtlWindow::default().jittered()).await?;
//! let snapshot = cache.get("code:read").await?;
//! ```

pub mod error;
pub mod memory;
pub mod redis;
pub mod ttl;

pub use error::{CacheError, CacheResult};
pub use memory::MemoryCache;
pub use self::redis::RedisCache;
pub use ttl::TtlWindow;

use std::time::Duration;

use async_trait::async_trait;

/// Byte-oriented key-value cache with per-entry expiration.
///
/// Implementations must return [`CacheError::Miss`] for an absent (or
/// expired) key and reserve every other error for genuine backend failures;
/// the repositories recover from a miss locally and propagate everything
/// else.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Look up a key.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Miss`] when the key is absent, or a backend
    /// error when the lookup itself failed.
    async fn get(&self, key: &str) -> CacheResult<Vec<u8>>;

    /// Store a value under a key with an expiration.
    ///
    /// # Errors
    ///
    /// Returns a backend error when the write failed.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()>;

    /// Remove a single key. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a backend error when the removal failed.
    async fn remove(&self, key: &str) -> CacheResult<()>;

    /// Remove every key matching a glob pattern (`*` and `?` wildcards).
    ///
    /// # Errors
    ///
    /// Returns a backend error when the removal failed.
    async fn remove_match(&self, pattern: &str) -> CacheResult<()>;
}
