//! Role repository.

use std::sync::Arc;

use gateward_cache::{Cache, TtlWindow};
use gateward_core::{Code, Id, RequestContext, Result, Role};

use crate::repository::CachedRepository;
use crate::store::RoleStore;

/// Repository for [`Role`] records, cached by code.
#[derive(Debug)]
pub struct RoleRepository<S: RoleStore> {
    repo: CachedRepository<Role, S>,
}

impl<S: RoleStore> RoleRepository<S> {
    /// Create a repository from injected handles.
    pub fn new(store: Arc<S>, cache: Arc<dyn Cache>, ttl: TtlWindow) -> Self {
        Self {
            repo: CachedRepository::new(store, cache, ttl),
        }
    }

    /// Fetch one role by code (read-through unless bypassed).
    pub async fn select(&self, ctx: &RequestContext, code: &Code) -> Result<Role> {
        self.repo.select(ctx, code).await
    }

    /// Insert a new role.
    pub async fn insert(&self, role: &Role) -> Result<()> {
        self.repo.insert(role).await
    }

    /// Update a role and drop its single-entity cache key.
    pub async fn update(&self, role: &Role) -> Result<()> {
        self.repo.update(role).await
    }

    /// Delete a role by code.
    pub async fn delete(&self, code: &Code) -> Result<()> {
        self.repo.delete(code).await
    }

    /// Name search, store-backed.
    pub async fn list_by_name(&self, name: &str, limit: u64) -> Result<Vec<Role>> {
        self.repo.store().scan_by_name(name, limit).await
    }

    /// Name search restricted to one organization's roles, store-backed.
    pub async fn list_by_name_for_organization(
        &self,
        organization_id: Id,
        name: &str,
        limit: u64,
    ) -> Result<Vec<Role>> {
        self.repo
            .store()
            .scan_by_name_for_organization(organization_id, name, limit)
            .await
    }
}
