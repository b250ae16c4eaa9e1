//! Organization-role repository.
//!
//! Deliberately uncached: assignments are written and read on admin paths
//! only, so the rows go straight to the store and there are no cache keys to
//! keep coherent.

use std::sync::Arc;

use gateward_core::{Id, OrganizationRole, Result};

use crate::store::OrganizationRoleStore;

/// Plain store-backed repository for [`OrganizationRole`] records.
#[derive(Debug)]
pub struct OrganizationRoleRepository<S: OrganizationRoleStore> {
    store: Arc<S>,
}

impl<S: OrganizationRoleStore> OrganizationRoleRepository<S> {
    /// Create a repository from an injected store handle.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Fetch one assignment by id.
    pub async fn select(&self, id: Id) -> Result<OrganizationRole> {
        self.store.take(&id).await
    }

    /// Insert a new assignment.
    pub async fn insert(&self, assignment: &OrganizationRole) -> Result<()> {
        self.store.create(assignment).await
    }

    /// Update an assignment.
    pub async fn update(&self, assignment: &OrganizationRole) -> Result<()> {
        self.store.save(assignment).await
    }

    /// Delete an assignment by id.
    pub async fn delete(&self, id: Id) -> Result<()> {
        self.store.delete(&id).await
    }
}
