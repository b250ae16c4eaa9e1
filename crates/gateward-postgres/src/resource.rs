//! Resource storage.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;

use gateward_core::{Error, Id, Resource, Result};
use gateward_storage::store::{EntityStore, ResourceStore};

use crate::{db_error, PgPool};

type ResourceRow = (
    i64,
    String,
    String,
    String,
    Option<i64>,
    OffsetDateTime,
    OffsetDateTime,
);

fn from_row(row: ResourceRow) -> Resource {
    Resource {
        id: Id(row.0 as u64),
        name: row.1,
        secret: row.2,
        description: row.3,
        organization_id: row.4.map(|id| Id(id as u64)),
        created_at: row.5,
        updated_at: row.6,
    }
}

/// Resource store over PostgreSQL.
#[derive(Debug, Clone)]
pub struct PostgresResourceStore {
    pool: Arc<PgPool>,
}

impl PostgresResourceStore {
    /// Create a store owning a pool handle.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStore<Resource> for PostgresResourceStore {
    async fn create(&self, entity: &Resource) -> Result<()> {
        query(
            r#"
            INSERT INTO resource (id, name, secret, description, organization_id,
                                  created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entity.id.value() as i64)
        .bind(&entity.name)
        .bind(&entity.secret)
        .bind(&entity.description)
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
                    "resource with id '{}' already exists",
                    entity.id
                ));
            }
            db_error(e)
        })?;

        Ok(())
    }

    async fn take(&self, key: &Id) -> Result<Resource> {
        let row: Option<ResourceRow> = query_as(
            r#"
            SELECT id, name, secret, description, organization_id, created_at, updated_at
            FROM resource
            WHERE id = $1
            "#,
        )
        .bind(key.value() as i64)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(db_error)?;

        row.map(from_row)
            .ok_or_else(|| Error::not_found(format!("resource {key}")))
    }

    async fn save(&self, entity: &Resource) -> Result<()> {
        let result = query(
            r#"
            UPDATE resource
            SET name = $2,
                secret = $3,
                description = $4,
                organization_id = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(entity.id.value() as i64)
        .bind(&entity.name)
        .bind(&entity.secret)
        .bind(&entity.description)
        .bind(entity.organization_id.map(|id| id.value() as i64))
        .bind(entity.updated_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("resource {}", entity.id)));
        }
        Ok(())
    }

    async fn delete(&self, key: &Id) -> Result<()> {
        let result = query("DELETE FROM resource WHERE id = $1")
            .bind(key.value() as i64)
            .execute(self.pool.as_ref())
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("resource {key}")));
        }
        Ok(())
    }

    async fn count_by_key(&self, key: &Id) -> Result<u64> {
        let count: (i64,) = query_as("SELECT COUNT(*) FROM resource WHERE id = $1")
            .bind(key.value() as i64)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(db_error)?;

        Ok(count.0 as u64)
    }

    async fn count_all(&self) -> Result<u64> {
        let count: (i64,) = query_as("SELECT COUNT(*) FROM resource")
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(db_error)?;

        Ok(count.0 as u64)
    }

    async fn scan_page(&self, offset: u64, limit: u64) -> Result<Vec<Resource>> {
        let rows: Vec<ResourceRow> = query_as(
            r#"
            SELECT id, name, secret, description, organization_id, created_at, updated_at
            FROM resource
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
impl ResourceStore for PostgresResourceStore {
    async fn scan_by_name(&self, name: &str, limit: u64) -> Result<Vec<Resource>> {
        let rows: Vec<ResourceRow> = query_as(
            r#"
            SELECT id, name, secret, description, organization_id, created_at, updated_at
            FROM resource
            WHERE name ILIKE '%' || $1 || '%'
            ORDER BY id
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

    async fn delete_many(&self, ids: &[Id]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let ids: Vec<i64> = ids.iter().map(|id| id.value() as i64).collect();
        query("DELETE FROM resource WHERE id = ANY($1)")
            .bind(&ids)
            .execute(self.pool.as_ref())
            .await
            .map_err(db_error)?;

        Ok(())
    }
}
