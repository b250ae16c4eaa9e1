//! Role storage.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;

use gateward_core::{Code, Error, Id, Result, Role};
use gateward_storage::store::{EntityStore, RoleStore};

use crate::{db_error, PgPool};

type RoleRow = (
    String,
    String,
    String,
    Option<String>,
    Option<i64>,
    OffsetDateTime,
    OffsetDateTime,
);

fn from_row(row: RoleRow) -> Role {
    Role {
        code: Code::new(row.0),
        name: row.1,
        description: row.2,
        parent_code: row.3.map(Code::new),
        organization_id: row.4.map(|id| Id(id as u64)),
        created_at: row.5,
        updated_at: row.6,
    }
}

/// Role store over PostgreSQL.
#[derive(Debug, Clone)]
pub struct PostgresRoleStore {
    pool: Arc<PgPool>,
}

impl PostgresRoleStore {
    /// Create a store owning a pool handle.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStore<Role> for PostgresRoleStore {
    async fn create(&self, entity: &Role) -> Result<()> {
        query(
            r#"
            INSERT INTO role (code, name, description, parent_code, organization_id,
                              created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entity.code.as_str())
        .bind(&entity.name)
        .bind(&entity.description)
        .bind(entity.parent_code.as_ref().map(Code::as_str))
        .bind(entity.organization_id.map(|id| id.value() as i64))
        .bind(entity.created_at)
        .bind(entity.updated_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| {
            if let sqlx_core::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return Error::conflict(format!(
                    "role with code '{}' already exists",
                    entity.code
                ));
            }
            db_error(e)
        })?;

        Ok(())
    }

    async fn take(&self, key: &Code) -> Result<Role> {
        let row: Option<RoleRow> = query_as(
            r#"
            SELECT code, name, description, parent_code, organization_id, created_at, updated_at
            FROM role
            WHERE code = $1
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(db_error)?;

        row.map(from_row)
            .ok_or_else(|| Error::not_found(format!("role {key}")))
    }

    async fn save(&self, entity: &Role) -> Result<()> {
        let result = query(
            r#"
            UPDATE role
            SET name = $2,
                description = $3,
                parent_code = $4,
                organization_id = $5,
                updated_at = $6
            WHERE code = $1
            "#,
        )
        .bind(entity.code.as_str())
        .bind(&entity.name)
        .bind(&entity.description)
        .bind(entity.parent_code.as_ref().map(Code::as_str))
        .bind(entity.organization_id.map(|id| id.value() as i64))
        .bind(entity.updated_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("role {}", entity.code)));
        }
        Ok(())
    }

    async fn delete(&self, key: &Code) -> Result<()> {
        let result = query("DELETE FROM role WHERE code = $1")
            .bind(key.as_str())
            .execute(self.pool.as_ref())
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("role {key}")));
        }
        Ok(())
    }

    async fn count_by_key(&self, key: &Code) -> Result<u64> {
        let count: (i64,) = query_as("SELECT COUNT(*) FROM role WHERE code = $1")
            .bind(key.as_str())
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(db_error)?;

        Ok(count.0 as u64)
    }

    async fn count_all(&self) -> Result<u64> {
        let count: (i64,) = query_as("SELECT COUNT(*) FROM role")
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(db_error)?;

        Ok(count.0 as u64)
    }

    async fn scan_page(&self, offset: u64, limit: u64) -> Result<Vec<Role>> {
        let rows: Vec<RoleRow> = query_as(
            r#"
            SELECT code, name, description, parent_code, organization_id, created_at, updated_at
            FROM role
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

#[async_trait]
impl RoleStore for PostgresRoleStore {
    async fn scan_by_name(&self, name: &str, limit: u64) -> Result<Vec<Role>> {
        let rows: Vec<RoleRow> = query_as(
            r#"
            SELECT code, name, description, parent_code, organization_id, created_at, updated_at
            FROM role
            WHERE name ILIKE '%' || $1 || '%'
            ORDER BY code
            LIMIT $2
            "#,
        )
        .bind(name)
        .bind(limit as i64)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(from_row).collect())
    }

    async fn scan_by_name_for_organization(
        &self,
        organization_id: Id,
        name: &str,
        limit: u64,
    ) -> Result<Vec<Role>> {
        let rows: Vec<RoleRow> = query_as(
            r#"
            SELECT code, name, description, parent_code, organization_id, created_at, updated_at
            FROM role
            WHERE organization_id = $1
              AND name ILIKE '%' || $2 || '%'
            ORDER BY code
            LIMIT $3
            "#,
        )
        .bind(organization_id.value() as i64)
        .bind(name)
        .bind(limit as i64)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(from_row).collect())
    }
}
