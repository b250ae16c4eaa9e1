//! Organization storage.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;

use gateward_core::{Error, Id, Organization, Result};
use gateward_storage::store::{EntityStore, OrganizationStore};

use crate::{db_error, PgPool};

type OrganizationRow = (
    i64,
    String,
    String,
    Option<i64>,
    OffsetDateTime,
    OffsetDateTime,
);

fn from_row(row: OrganizationRow) -> Organization {
    Organization {
        id: Id(row.0 as u64),
        name: row.1,
        description: row.2,
        parent_id: row.3.map(|id| Id(id as u64)),
        created_at: row.4,
        updated_at: row.5,
    }
}

/// Organization store over PostgreSQL.
#[derive(Debug, Clone)]
pub struct PostgresOrganizationStore {
    pool: Arc<PgPool>,
}

impl PostgresOrganizationStore {
    /// Create a store owning a pool handle.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStore<Organization> for PostgresOrganizationStore {
    async fn create(&self, entity: &Organization) -> Result<()> {
        query(
            r#"
            INSERT INTO organization (id, name, description, parent_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entity.id.value() as i64)
        .bind(&entity.name)
        .bind(&entity.description)
        .bind(entity.parent_id.map(|id| id.value() as i64))
        .bind(entity.created_at)
        .bind(entity.updated_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| {
            if let sqlx_core::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return Error::conflict(format!(
                    "organization with id '{}' already exists",
                    entity.id
                ));
            }
            db_error(e)
        })?;

        Ok(())
    }

    async fn take(&self, key: &Id) -> Result<Organization> {
        let row: Option<OrganizationRow> = query_as(
            r#"
            SELECT id, name, description, parent_id, created_at, updated_at
            FROM organization
            WHERE id = $1
            "#,
        )
        .bind(key.value() as i64)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(db_error)?;

        row.map(from_row)
            .ok_or_else(|| Error::not_found(format!("organization {key}")))
    }

    async fn save(&self, entity: &Organization) -> Result<()> {
        let result = query(
            r#"
            UPDATE organization
            SET name = $2,
                description = $3,
                parent_id = $4,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(entity.id.value() as i64)
        .bind(&entity.name)
        .bind(&entity.description)
        .bind(entity.parent_id.map(|id| id.value() as i64))
        .bind(entity.updated_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("organization {}", entity.id)));
        }
        Ok(())
    }

    async fn delete(&self, key: &Id) -> Result<()> {
        let result = query("DELETE FROM organization WHERE id = $1")
            .bind(key.value() as i64)
            .execute(self.pool.as_ref())
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("organization {key}")));
        }
        Ok(())
    }

    async fn count_by_key(&self, key: &Id) -> Result<u64> {
        let count: (i64,) = query_as("SELECT COUNT(*) FROM organization WHERE id = $1")
            .bind(key.value() as i64)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(db_error)?;

        Ok(count.0 as u64)
    }

    async fn count_all(&self) -> Result<u64> {
        let count: (i64,) = query_as("SELECT COUNT(*) FROM organization")
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(db_error)?;

        Ok(count.0 as u64)
    }

    async fn scan_page(&self, offset: u64, limit: u64) -> Result<Vec<Organization>> {
        let rows: Vec<OrganizationRow> = query_as(
            r#"
            SELECT id, name, description, parent_id, created_at, updated_at
            FROM organization
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
impl OrganizationStore for PostgresOrganizationStore {
    async fn scan_by_name(&self, name: &str, limit: u64) -> Result<Vec<Organization>> {
        let rows: Vec<OrganizationRow> = query_as(
            r#"
            SELECT id, name, description, parent_id, created_at, updated_at
            FROM organization
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_row_maps_optional_parent() {
        let now = OffsetDateTime::now_utc();
        let org = from_row((7, "acme".into(), "desc".into(), Some(3), now, now));
        assert_eq!(org.id, Id(7));
        assert_eq!(org.parent_id, Some(Id(3)));

        let root = from_row((1, "root".into(), String::new(), None, now, now));
        assert_eq!(root.parent_id, None);
    }
}
