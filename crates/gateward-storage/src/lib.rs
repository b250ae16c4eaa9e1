//! Cache-consistent entity repositories for Gateward
//!
//! This crate is the data access layer proper. It defines:
//!
//! - The store contracts backends implement ([`store`])
//! - The generic read-through / write-invalidate repository ([`repository`])
//!   and the list index cache built on it
//! - Per-entity repositories ([`organization`], [`organization_role`],
//!   [`role`], [`resource`], [`scope`])
//! - The policy rule resolver ([`policy`])
//! - An in-memory backend for tests and development ([`memory`])
//!
//! # Consistency protocol
//!
//! Reads are cache-first with store fallback; mutations are store-first with
//! cache removal afterwards. The cache never holds the authoritative copy of
//! anything, so every entry is disposable and no in-process locking is
//! needed: two racing writers both remove the same key, which is idempotent.
//! A caller that cannot tolerate the read-after-write window passes a
//! bypassing [`gateward_core::RequestContext`] and reads store-fresh.

pub mod entity;
pub mod memory;
pub mod organization;
pub mod organization_role;
pub mod policy;
pub mod repository;
pub mod resource;
pub mod role;
pub mod scope;
pub mod store;

pub use entity::Entity;
pub use organization::OrganizationRepository;
pub use organization_role::OrganizationRoleRepository;
pub use policy::PolicyResolver;
pub use repository::{CachedRepository, LIST_KEY_PATTERN};
pub use resource::ResourceRepository;
pub use role::RoleRepository;
pub use scope::{ScopeRepository, ALL_SCOPES_KEY, BASIC_SCOPES_KEY};
pub use store::{
    EntityStore, OrganizationRoleStore, OrganizationStore, PolicyStore, ResourceStore, RoleStore,
    ScopeStore,
};
