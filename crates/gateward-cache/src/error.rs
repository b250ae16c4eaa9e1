//! Cache adapter errors.

use gateward_core::Error;

/// Errors returned by cache adapters.
///
/// `Miss` is an internal signal: the repositories always translate it into a
/// store fallback and it never reaches their callers.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The key is absent or expired.
    #[error("cache miss")]
    Miss,

    /// The cache backend failed.
    #[error("cache backend error: {0}")]
    Backend(String),
}

impl CacheError {
    /// Create a `Backend` error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Returns `true` if this is a miss rather than a failure.
    #[must_use]
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::Miss)
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<CacheError> for Error {
    fn from(err: CacheError) -> Self {
        // A miss must be handled by the caller before converting; if one
        // leaks through it is a bug in the repository, not in the cache.
        Error::cache_backend(err.to_string())
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;
