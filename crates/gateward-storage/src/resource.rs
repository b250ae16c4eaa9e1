//! Resource repository.
//!
//! Resources are cached by numeric id and are the anchor for policy rules:
//! `load_policy` resolves the rules tied to a resource through the
//! structural naming convention, always store-fresh.

use std::sync::Arc;

use gateward_cache::{Cache, TtlWindow};
use gateward_core::{Id, PolicyRule, RequestContext, Resource, Result};

use crate::policy::PolicyResolver;
use crate::repository::CachedRepository;
use crate::store::{PolicyStore, ResourceStore};

/// Repository for [`Resource`] records.
#[derive(Debug)]
pub struct ResourceRepository<S: ResourceStore, P: PolicyStore> {
    repo: CachedRepository<Resource, S>,
    resolver: PolicyResolver<P>,
}

impl<S: ResourceStore, P: PolicyStore> ResourceRepository<S, P> {
    /// Create a repository from injected handles.
    pub fn new(
        store: Arc<S>,
        cache: Arc<dyn Cache>,
        ttl: TtlWindow,
        policy_store: Arc<P>,
    ) -> Self {
        Self {
            repo: CachedRepository::new(store, cache, ttl),
            resolver: PolicyResolver::new(policy_store),
        }
    }

    /// Fetch one resource by id (read-through unless bypassed).
    pub async fn select(&self, ctx: &RequestContext, id: Id) -> Result<Resource> {
        self.repo.select(ctx, &id).await
    }

    /// Insert a new resource.
    pub async fn insert(&self, resource: &Resource) -> Result<()> {
        self.repo.insert(resource).await
    }

    /// Update a resource and drop its single-entity cache key.
    pub async fn update(&self, resource: &Resource) -> Result<()> {
        self.repo.update(resource).await
    }

    /// Delete a resource by id.
    pub async fn delete(&self, id: Id) -> Result<()> {
        self.repo.delete(&id).await
    }

    /// Delete a batch of resources, then invalidate each member key and the
    /// list shapes once.
    pub async fn delete_many(&self, ids: &[Id]) -> Result<()> {
        self.repo.store().delete_many(ids).await?;
        for id in ids {
            self.repo.invalidate(id).await?;
        }
        self.repo.invalidate_lists().await
    }

    /// Count-based existence probe; never consults the cache, so it reflects
    /// store truth even right after a delete.
    pub async fn exist_by_id(&self, id: Id) -> Result<bool> {
        self.repo.exist_by_key(&id).await
    }

    /// Name search, store-backed.
    pub async fn list_by_name(&self, name: &str, limit: u64) -> Result<Vec<Resource>> {
        self.repo.store().scan_by_name(name, limit).await
    }

    /// Page of resources plus total count, store-backed.
    pub async fn list_paged(&self, start: u64, limit: u64) -> Result<(Vec<Resource>, u64)> {
        self.repo.list_paged(start, limit).await
    }

    /// Rules attached to a resource via the object-prefix convention.
    /// Uncached by design: authorization data must be immediately fresh.
    pub async fn load_policy(&self, resource_id: Id) -> Result<Vec<PolicyRule>> {
        self.resolver.load_policy(resource_id).await
    }
}
