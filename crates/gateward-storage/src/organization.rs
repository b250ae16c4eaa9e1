//! Organization repository.

use std::sync::Arc;

use gateward_cache::{Cache, TtlWindow};
use gateward_core::{Id, Organization, RequestContext, Result};

use crate::repository::CachedRepository;
use crate::store::OrganizationStore;

/// Repository for [`Organization`] records, cached by id.
#[derive(Debug)]
pub struct OrganizationRepository<S: OrganizationStore> {
    repo: CachedRepository<Organization, S>,
}

impl<S: OrganizationStore> OrganizationRepository<S> {
    /// Create a repository from injected handles.
    pub fn new(store: Arc<S>, cache: Arc<dyn Cache>, ttl: TtlWindow) -> Self {
        Self {
            repo: CachedRepository::new(store, cache, ttl),
        }
    }

    /// Fetch one organization by id (read-through unless bypassed).
    pub async fn select(&self, ctx: &RequestContext, id: Id) -> Result<Organization> {
        self.repo.select(ctx, &id).await
    }

    /// Insert a new organization.
    pub async fn insert(&self, organization: &Organization) -> Result<()> {
        self.repo.insert(organization).await
    }

    /// Update an organization and drop its single-entity cache key.
    pub async fn update(&self, organization: &Organization) -> Result<()> {
        self.repo.update(organization).await
    }

    /// Delete an organization by id.
    pub async fn delete(&self, id: Id) -> Result<()> {
        self.repo.delete(&id).await
    }

    /// Count-based existence probe; never consults the cache.
    pub async fn exist_by_id(&self, id: Id) -> Result<bool> {
        self.repo.exist_by_key(&id).await
    }

    /// Name search, store-backed.
    pub async fn list_by_name(&self, name: &str, limit: u64) -> Result<Vec<Organization>> {
        self.repo.store().scan_by_name(name, limit).await
    }

    /// Page of organizations plus total count, store-backed.
    pub async fn list_paged(&self, start: u64, limit: u64) -> Result<(Vec<Organization>, u64)> {
        self.repo.list_paged(start, limit).await
    }
}
