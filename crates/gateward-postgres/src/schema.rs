//! Schema bootstrap.
//!
//! Creates the layer's tables if they do not exist yet. Meant for startup
//! and test containers; production deployments may manage the same DDL
//! through their own migration tooling.

use sqlx_core::query::query;
use tracing::info;

use gateward_core::Result;

use crate::{db_error, PgPool};

const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS organization (
        id          BIGINT PRIMARY KEY,
        name        TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        parent_id   BIGINT,
        created_at  TIMESTAMPTZ NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS organization_role (
        id              BIGINT PRIMARY KEY,
        organization_id BIGINT NOT NULL,
        role_code       TEXT NOT NULL,
        created_at      TIMESTAMPTZ NOT NULL,
        updated_at      TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS role (
        code            TEXT PRIMARY KEY,
        name            TEXT NOT NULL,
        description     TEXT NOT NULL DEFAULT '',
        parent_code     TEXT,
        organization_id BIGINT,
        created_at      TIMESTAMPTZ NOT NULL,
        updated_at      TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS resource (
        id              BIGINT PRIMARY KEY,
        name            TEXT NOT NULL,
        secret          TEXT NOT NULL DEFAULT '',
        description     TEXT NOT NULL DEFAULT '',
        organization_id BIGINT,
        created_at      TIMESTAMPTZ NOT NULL,
        updated_at      TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS oauth2_scope (
        code        TEXT PRIMARY KEY,
        name        TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        kind        TEXT NOT NULL DEFAULT 'basic',
        created_at  TIMESTAMPTZ NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS policy_rule (
        id    BIGSERIAL PRIMARY KEY,
        ptype TEXT NOT NULL DEFAULT '',
        v0    TEXT NOT NULL DEFAULT '',
        v1    TEXT NOT NULL DEFAULT '',
        v2    TEXT NOT NULL DEFAULT '',
        v3    TEXT NOT NULL DEFAULT '',
        v4    TEXT NOT NULL DEFAULT '',
        v5    TEXT NOT NULL DEFAULT ''
    )
    "#,
    // The resolver's structural queries filter on the object field.
    r#"
    CREATE INDEX IF NOT EXISTS policy_rule_v1_idx ON policy_rule (v1 text_pattern_ops)
    "#,
];

/// Create all tables used by the layer.
///
/// # Errors
///
/// Returns a database error if any statement fails.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for ddl in TABLES {
        query(ddl).execute(pool).await.map_err(db_error)?;
    }
    info!("Gateward schema ensured");
    Ok(())
}
