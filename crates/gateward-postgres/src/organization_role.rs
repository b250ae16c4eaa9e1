//! Organization-role storage.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;

use gateward_core::{Code, Error, Id, OrganizationRole, Result};
use gateward_storage::store::EntityStore;

use crate::{db_error, PgPool};

type OrganizationRoleRow = (i64, i64, String, OffsetDateTime, OffsetDateTime);

fn from_row(row: OrganizationRoleRow) -> OrganizationRole {
    OrganizationRole {
        id: Id(row.0 as u64),
        organization_id: Id(row.1 as u64),
        role_code: Code::new(row.2),
        created_at: row.3,
        updated_at: row.4,
    }
}

/// Organization-role store over PostgreSQL.
#[derive(Debug, Clone)]
pub struct PostgresOrganizationRoleStore {
    pool: Arc<PgPool>,
}

impl PostgresOrganizationRoleStore {
    /// Create a store owning a pool handle.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStore<OrganizationRole> for PostgresOrganizationRoleStore {
    async fn create(&self, entity: &OrganizationRole) -> Result<()> {
        query(
            r#"
            INSERT INTO organization_role (id, organization_id, role_code, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entity.id.value() as i64)
        .bind(entity.organization_id.value() as i64)
        .bind(entity.role_code.as_str())
        .bind(entity.created_at)
        .bind(entity.updated_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| {
            if let sqlx_core::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return Error::conflict(format!(
                    "organization_role with id '{}' already exists",
                    entity.id
                ));
            }
            db_error(e)
        })?;

        Ok(())
    }

    async fn take(&self, key: &Id) -> Result<OrganizationRole> {
        let row: Option<OrganizationRoleRow> = query_as(
            r#"
            SELECT id, organization_id, role_code, created_at, updated_at
            FROM organization_role
            WHERE id = $1
            "#,
        )
        .bind(key.value() as i64)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(db_error)?;

        row.map(from_row)
            .ok_or_else(|| Error::not_found(format!("organization_role {key}")))
    }

    async fn save(&self, entity: &OrganizationRole) -> Result<()> {
        let result = query(
            r#"
            UPDATE organization_role
            SET organization_id = $2,
                role_code = $3,
                updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(entity.id.value() as i64)
        .bind(entity.organization_id.value() as i64)
        .bind(entity.role_code.as_str())
        .bind(entity.updated_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("organization_role {}", entity.id)));
        }
        Ok(())
    }

    async fn delete(&self, key: &Id) -> Result<()> {
        let result = query("DELETE FROM organization_role WHERE id = $1")
            .bind(key.value() as i64)
            .execute(self.pool.as_ref())
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("organization_role {key}")));
        }
        Ok(())
    }

    async fn count_by_key(&self, key: &Id) -> Result<u64> {
        let count: (i64,) = query_as("SELECT COUNT(*) FROM organization_role WHERE id = $1")
            .bind(key.value() as i64)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(db_error)?;

        Ok(count.0 as u64)
    }

    async fn count_all(&self) -> Result<u64> {
        let count: (i64,) = query_as("SELECT COUNT(*) FROM organization_role")
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(db_error)?;

        Ok(count.0 as u64)
    }

    async fn scan_page(&self, offset: u64, limit: u64) -> Result<Vec<OrganizationRole>> {
        let rows: Vec<OrganizationRoleRow> = query_as(
            r#"
            SELECT id, organization_id, role_code, created_at, updated_at
            FROM organization_role
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(from_row).collect())
    }
}
