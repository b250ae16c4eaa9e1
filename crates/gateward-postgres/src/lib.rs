//! PostgreSQL store backend for Gateward
//!
//! Implements the store contracts of `gateward-storage` over typed tables:
//!
//! - `organization`, `organization_role`, `role`, `resource`, `oauth2_scope`
//! - `policy_rule` (flat `ptype, v0..v5` tuples)
//!
//! Each store struct owns an `Arc` of the connection pool so it can be
//! handed to a repository as a plain injected handle.
//!
//! # Example
//!
//! ```ignore
//! use gateward_postgres::PostgresStorage;
//!
//! let storage = PostgresStorage::connect(&config).await?;
//! gateward_postgres::ensure_schema(storage.pool()).await?;
//! let scopes = storage.scopes();
//! ```

pub mod organization;
pub mod organization_role;
pub mod policy_rule;
pub mod resource;
pub mod role;
pub mod schema;
pub mod scope;

use std::sync::Arc;

use sqlx_core::pool::{Pool, PoolOptions};
use sqlx_postgres::Postgres;

use gateward_core::{DatabaseConfig, Error, Result};

pub use organization::PostgresOrganizationStore;
pub use organization_role::PostgresOrganizationRoleStore;
pub use policy_rule::PostgresPolicyStore;
pub use resource::PostgresResourceStore;
pub use role::PostgresRoleStore;
pub use schema::ensure_schema;
pub use scope::PostgresScopeStore;

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

/// Map a sqlx error to the core taxonomy.
pub(crate) fn db_error(err: sqlx_core::Error) -> Error {
    Error::database(err.to_string())
}

// =============================================================================
// PostgreSQL Storage
// =============================================================================

/// PostgreSQL storage backend.
///
/// Holds the connection pool and hands out per-entity store values; the
/// composing application injects those into the repositories. There are no
/// package-level singletons anywhere in the layer.
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: Arc<PgPool>,
}

impl PostgresStorage {
    /// Create storage over an existing connection pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Create storage by connecting with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a database error if the connection fails.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PoolOptions::<Postgres>::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect(&config.url)
            .await
            .map_err(db_error)?;
        Ok(Self::new(Arc::new(pool)))
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get a reference to the Arc-wrapped pool.
    #[must_use]
    pub fn pool_arc(&self) -> Arc<PgPool> {
        Arc::clone(&self.pool)
    }

    // -------------------------------------------------------------------------
    // Store Accessors
    // -------------------------------------------------------------------------

    /// Organization store operations.
    #[must_use]
    pub fn organizations(&self) -> PostgresOrganizationStore {
        PostgresOrganizationStore::new(Arc::clone(&self.pool))
    }

    /// Organization-role store operations.
    #[must_use]
    pub fn organization_roles(&self) -> PostgresOrganizationRoleStore {
        PostgresOrganizationRoleStore::new(Arc::clone(&self.pool))
    }

    /// Role store operations.
    #[must_use]
    pub fn roles(&self) -> PostgresRoleStore {
        PostgresRoleStore::new(Arc::clone(&self.pool))
    }

    /// Resource store operations.
    #[must_use]
    pub fn resources(&self) -> PostgresResourceStore {
        PostgresResourceStore::new(Arc::clone(&self.pool))
    }

    /// OAuth2 scope store operations.
    #[must_use]
    pub fn scopes(&self) -> PostgresScopeStore {
        PostgresScopeStore::new(Arc::clone(&self.pool))
    }

    /// Policy rule store operations.
    #[must_use]
    pub fn policy_rules(&self) -> PostgresPolicyStore {
        PostgresPolicyStore::new(Arc::clone(&self.pool))
    }
}
