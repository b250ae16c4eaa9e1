//! Relational store contracts.
//!
//! These traits are the repository layer's only view of durable storage.
//! Implementations are provided by backends (`gateward-postgres` for
//! production, [`crate::memory`] for tests and development) and must keep the
//! "no rows" outcome distinguishable from every other failure: `take`, `save`
//! and `delete` return [`gateward_core::Error::NotFound`] for an absent key,
//! never a generic error.

use async_trait::async_trait;

use gateward_core::{
    Code, Id, OAuth2Scope, Organization, OrganizationRole, PolicyRule, Resource, Result, Role,
    ScopeKind,
};

use crate::entity::Entity;

/// CRUD and paging operations every entity store provides.
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Insert a new record.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` when a record with the same key exists, or a
    /// database error when the write fails.
    async fn create(&self, entity: &E) -> Result<()>;

    /// Fetch one record by primary key.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no row matches.
    async fn take(&self, key: &E::Key) -> Result<E>;

    /// Replace an existing record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no row matches.
    async fn save(&self, entity: &E) -> Result<()>;

    /// Delete one record by primary key.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no row matches.
    async fn delete(&self, key: &E::Key) -> Result<()>;

    /// Count rows with the given primary key (0 or 1).
    async fn count_by_key(&self, key: &E::Key) -> Result<u64>;

    /// Count all rows.
    async fn count_all(&self) -> Result<u64>;

    /// Fetch a page of rows, newest first.
    async fn scan_page(&self, offset: u64, limit: u64) -> Result<Vec<E>>;
}

/// Organization-specific queries.
#[async_trait]
pub trait OrganizationStore: EntityStore<Organization> {
    /// Rows whose name contains the fragment, capped at `limit`.
    async fn scan_by_name(&self, name: &str, limit: u64) -> Result<Vec<Organization>>;
}

/// Role-specific queries.
#[async_trait]
pub trait RoleStore: EntityStore<Role> {
    /// Rows whose name contains the fragment, capped at `limit`.
    async fn scan_by_name(&self, name: &str, limit: u64) -> Result<Vec<Role>>;

    /// Name search restricted to one organization's roles.
    async fn scan_by_name_for_organization(
        &self,
        organization_id: Id,
        name: &str,
        limit: u64,
    ) -> Result<Vec<Role>>;
}

/// Resource-specific queries.
#[async_trait]
pub trait ResourceStore: EntityStore<Resource> {
    /// Rows whose name contains the fragment, capped at `limit`.
    async fn scan_by_name(&self, name: &str, limit: u64) -> Result<Vec<Resource>>;

    /// Delete every row whose id is in `ids`. Missing ids are skipped, not
    /// errors.
    async fn delete_many(&self, ids: &[Id]) -> Result<()>;
}

/// OAuth2-scope-specific queries.
#[async_trait]
pub trait ScopeStore: EntityStore<OAuth2Scope> {
    /// All scope rows.
    async fn scan_all(&self) -> Result<Vec<OAuth2Scope>>;

    /// All scope rows of one kind.
    async fn scan_of_kind(&self, kind: ScopeKind) -> Result<Vec<OAuth2Scope>>;

    /// Primary keys of all scopes, in code order.
    async fn scan_codes(&self) -> Result<Vec<Code>>;

    /// Primary keys of all scopes of one kind, in code order.
    async fn scan_codes_of_kind(&self, kind: ScopeKind) -> Result<Vec<Code>>;
}

/// Organization-role stores have no queries beyond plain CRUD.
pub trait OrganizationRoleStore: EntityStore<OrganizationRole> {}

impl<S> OrganizationRoleStore for S where S: EntityStore<OrganizationRole> {}

/// Flat policy rule store.
///
/// Rules are not entities: they have no cache keys and no repository. The
/// resolver reads them through this single structural query.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Rules whose object field (`v1`) starts with the given literal prefix.
    ///
    /// Backends may match coarsely (SQL `LIKE prefix%`); the resolver applies
    /// the exact boundary check.
    async fn rules_with_object_prefix(&self, prefix: &str) -> Result<Vec<PolicyRule>>;

    /// Insert a rule, assigning it an id.
    async fn add_rule(&self, rule: PolicyRule) -> Result<PolicyRule>;
}
