//! Request-scoped context.
//!
//! Cross-cutting flags travel on an explicit per-call value passed by
//! reference through the call chain, never on ambient global state, so bypass
//! behavior stays testable per call.

/// Per-request context for repository operations.
///
/// Carries the cache-bypass flag: a caller that just wrote data (or shares a
/// request with a concurrent writer) sets it to force every repository read
/// in the call graph straight to the store, closing the read-after-write
/// staleness window of a just-invalidated cache entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext {
    cache_bypass: bool,
}

impl RequestContext {
    /// Context with default behavior (cache enabled).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context that routes every read directly to the store.
    #[must_use]
    pub fn bypass_cache() -> Self {
        Self { cache_bypass: true }
    }

    /// Set or clear the cache-bypass flag.
    #[must_use]
    pub fn with_cache_bypass(mut self, bypass: bool) -> Self {
        self.cache_bypass = bypass;
        self
    }

    /// Returns `true` if reads must skip the cache.
    #[must_use]
    pub fn bypasses_cache(&self) -> bool {
        self.cache_bypass
    }
}
