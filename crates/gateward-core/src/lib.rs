//! Core types for the Gateward identity/authorization data layer
//!
//! This crate defines the vocabulary shared by every other Gateward crate:
//!
//! - Identifiers (`Id`, `Code`)
//! - Entity models (organizations, roles, resources, OAuth2 scopes, policy rules)
//! - The error taxonomy (`Error`, `Result`)
//! - The request-scoped context carrying the cache-bypass flag
//! - Configuration types for the cache and storage backends

pub mod config;
pub mod context;
pub mod error;
pub mod id;
pub mod model;

pub use config::{CacheConfig, DatabaseConfig, RedisConfig};
pub use context::RequestContext;
pub use error::{Error, Result};
pub use id::{Code, Id};
pub use model::{
    OAuth2Scope, Organization, OrganizationRole, PolicyRule, Resource, Role, ScopeKind,
};
