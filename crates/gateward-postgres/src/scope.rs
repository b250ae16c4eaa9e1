//! OAuth2 scope storage.
//!
//! The `kind` column stores the stable string form of [`ScopeKind`]; a value
//! outside that set means the table was written by something else and is
//! surfaced as a database error, not silently defaulted.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;

use gateward_core::{Code, Error, OAuth2Scope, Result, ScopeKind};
use gateward_storage::store::{EntityStore, ScopeStore};

use crate::{db_error, PgPool};

type ScopeRow = (
    String,
    String,
    String,
    String,
    OffsetDateTime,
    OffsetDateTime,
);

fn from_row(row: ScopeRow) -> Result<OAuth2Scope> {
    let kind = ScopeKind::parse(&row.3)
        .ok_or_else(|| Error::database(format!("invalid scope kind '{}'", row.3)))?;
    Ok(OAuth2Scope {
        code: Code::new(row.0),
        name: row.1,
        description: row.2,
        kind,
        created_at: row.4,
        updated_at: row.5,
    })
}

fn from_rows(rows: Vec<ScopeRow>) -> Result<Vec<OAuth2Scope>> {
    rows.into_iter().map(from_row).collect()
}

/// OAuth2 scope store over PostgreSQL.
#[derive(Debug, Clone)]
pub struct PostgresScopeStore {
    pool: Arc<PgPool>,
}

impl PostgresScopeStore {
    /// Create a store owning a pool handle.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStore<OAuth2Scope> for PostgresScopeStore {
    async fn create(&self, entity: &OAuth2Scope) -> Result<()> {
        query(
            r#"
            INSERT INTO oauth2_scope (code, name, description, kind, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entity.code.as_str())
        .bind(&entity.name)
        .bind(&entity.description)
        .bind(entity.kind.as_str())
        .bind(entity.created_at)
        .bind(entity.updated_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| {
            if let sqlx_core::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return Error::conflict(format!(
                    "oauth2_scope with code '{}' already exists",
                    entity.code
                ));
            }
            db_error(e)
        })?;

        Ok(())
    }

    async fn take(&self, key: &Code) -> Result<OAuth2Scope> {
        let row: Option<ScopeRow> = query_as(
            r#"
            SELECT code, name, description, kind, created_at, updated_at
            FROM oauth2_scope
            WHERE code = $1
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(db_error)?;

        match row {
            Some(row) => from_row(row),
            None => Err(Error::not_found(format!("oauth2_scope {key}"))),
        }
    }

    async fn save(&self, entity: &OAuth2Scope) -> Result<()> {
        let result = query(
            r#"
            UPDATE oauth2_scope
            SET name = $2,
                description = $3,
                kind = $4,
                updated_at = $5
            WHERE code = $1
            "#,
        )
        .bind(entity.code.as_str())
        .bind(&entity.name)
        .bind(&entity.description)
        .bind(entity.kind.as_str())
        .bind(entity.updated_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("oauth2_scope {}", entity.code)));
        }
        Ok(())
    }

    async fn delete(&self, key: &Code) -> Result<()> {
        let result = query("DELETE FROM oauth2_scope WHERE code = $1")
            .bind(key.as_str())
            .execute(self.pool.as_ref())
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("oauth2_scope {key}")));
        }
        Ok(())
    }

    async fn count_by_key(&self, key: &Code) -> Result<u64> {
        let count: (i64,) = query_as("SELECT COUNT(*) FROM oauth2_scope WHERE code = $1")
            .bind(key.as_str())
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(db_error)?;

        Ok(count.0 as u64)
    }

    async fn count_all(&self) -> Result<u64> {
        let count: (i64,) = query_as("SELECT COUNT(*) FROM oauth2_scope")
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(db_error)?;

        Ok(count.0 as u64)
    }

    async fn scan_page(&self, offset: u64, limit: u64) -> Result<Vec<OAuth2Scope>> {
        let rows: Vec<ScopeRow> = query_as(
            r#"
            SELECT code, name, description, kind, created_at, updated_at
            FROM oauth2_scope
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(db_error)?;

        from_rows(rows)
    }
}

#[async_trait]
impl ScopeStore for PostgresScopeStore {
    async fn scan_all(&self) -> Result<Vec<OAuth2Scope>> {
        let rows: Vec<ScopeRow> = query_as(
            r#"
            SELECT code, name, description, kind, created_at, updated_at
            FROM oauth2_scope
            ORDER BY code
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(db_error)?;

        from_rows(rows)
    }

    async fn scan_of_kind(&self, kind: ScopeKind) -> Result<Vec<OAuth2Scope>> {
        let rows: Vec<ScopeRow> = query_as(
            r#"
            SELECT code, name, description, kind, created_at, updated_at
            FROM oauth2_scope
            WHERE kind = $1
            ORDER BY code
            "#,
        )
        .bind(kind.as_str())
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(db_error)?;

        from_rows(rows)
    }

    async fn scan_codes(&self) -> Result<Vec<Code>> {
        let rows: Vec<(String,)> = query_as("SELECT code FROM oauth2_scope ORDER BY code")
            .fetch_all(self.pool.as_ref())
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().map(|(code,)| Code::new(code)).collect())
    }

    async fn scan_codes_of_kind(&self, kind: ScopeKind) -> Result<Vec<Code>> {
        let rows: Vec<(String,)> =
            query_as("SELECT code FROM oauth2_scope WHERE kind = $1 ORDER BY code")
                .bind(kind.as_str())
                .fetch_all(self.pool.as_ref())
                .await
                .map_err(db_error)?;

        Ok(rows.into_iter().map(|(code,)| Code::new(code)).collect())
    }
}
