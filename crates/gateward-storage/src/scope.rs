//! OAuth2 scope repository.
//!
//! Scopes are the most read-heavy kind: every token issuance resolves them.
//! Besides cached single-entity reads they carry the two fixed-shape list
//! caches — all scopes and basic scopes — stored as code sequences under
//! well-known keys.

use std::sync::Arc;

use gateward_cache::{Cache, TtlWindow};
use gateward_core::{Code, OAuth2Scope, RequestContext, Result, ScopeKind};

use crate::repository::CachedRepository;
use crate::store::ScopeStore;

/// List index key for the all-scopes shape.
pub const ALL_SCOPES_KEY: &str = "list:all";
/// List index key for the basic-scopes shape.
pub const BASIC_SCOPES_KEY: &str = "list:basic";

/// Repository for [`OAuth2Scope`] records.
#[derive(Debug)]
pub struct ScopeRepository<S: ScopeStore> {
    repo: CachedRepository<OAuth2Scope, S>,
}

impl<S: ScopeStore> ScopeRepository<S> {
    /// Create a repository from injected handles.
    pub fn new(store: Arc<S>, cache: Arc<dyn Cache>, ttl: TtlWindow) -> Self {
        Self {
            repo: CachedRepository::new(store, cache, ttl),
        }
    }

    /// Fetch one scope by code (read-through unless bypassed).
    pub async fn select(&self, ctx: &RequestContext, code: &Code) -> Result<OAuth2Scope> {
        self.repo.select(ctx, code).await
    }

    /// Insert a new scope and drop the list-shape caches.
    pub async fn insert(&self, scope: &OAuth2Scope) -> Result<()> {
        self.repo.insert(scope).await
    }

    /// Update a scope and drop its single-entity cache key.
    pub async fn update(&self, scope: &OAuth2Scope) -> Result<()> {
        self.repo.update(scope).await
    }

    /// Delete a scope, dropping its cache key and the list-shape caches.
    pub async fn delete(&self, code: &Code) -> Result<()> {
        self.repo.delete(code).await
    }

    /// Count-based existence probe; never consults the cache.
    pub async fn exist_by_code(&self, code: &Code) -> Result<bool> {
        self.repo.exist_by_key(code).await
    }

    /// All scopes straight from the store.
    pub async fn select_all(&self) -> Result<Vec<OAuth2Scope>> {
        self.repo.store().scan_all().await
    }

    /// All scopes through the list index cache.
    pub async fn select_all_cached(&self, ctx: &RequestContext) -> Result<Vec<OAuth2Scope>> {
        let store = Arc::clone(self.repo.store());
        self.repo
            .select_list(ctx, ALL_SCOPES_KEY, || async move { store.scan_codes().await })
            .await
    }

    /// Basic scopes straight from the store.
    pub async fn select_basic(&self) -> Result<Vec<OAuth2Scope>> {
        self.repo.store().scan_of_kind(ScopeKind::Basic).await
    }

    /// Basic scopes through the list index cache.
    pub async fn select_basic_cached(&self, ctx: &RequestContext) -> Result<Vec<OAuth2Scope>> {
        let store = Arc::clone(self.repo.store());
        self.repo
            .select_list(ctx, BASIC_SCOPES_KEY, || async move {
                store.scan_codes_of_kind(ScopeKind::Basic).await
            })
            .await
    }
}
