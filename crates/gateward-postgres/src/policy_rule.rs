//! Policy rule storage.
//!
//! Rules live in a flat `ptype, v0..v5` table. The structural query matches
//! coarsely with `LIKE prefix%`; the resolver in `gateward-storage` applies
//! the exact numeric-boundary check on top.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx_core::query_as::query_as;

use gateward_core::{Id, PolicyRule, Result};
use gateward_storage::store::PolicyStore;

use crate::{db_error, PgPool};

type PolicyRuleRow = (i64, String, String, String, String, String, String, String);

fn from_row(row: PolicyRuleRow) -> PolicyRule {
    PolicyRule {
        id: Id(row.0 as u64),
        ptype: row.1,
        v0: row.2,
        v1: row.3,
        v2: row.4,
        v3: row.5,
        v4: row.6,
        v5: row.7,
    }
}

/// Policy rule store over PostgreSQL.
#[derive(Debug, Clone)]
pub struct PostgresPolicyStore {
    pool: Arc<PgPool>,
}

impl PostgresPolicyStore {
    /// Create a store owning a pool handle.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PolicyStore for PostgresPolicyStore {
    async fn rules_with_object_prefix(&self, prefix: &str) -> Result<Vec<PolicyRule>> {
        let rows: Vec<PolicyRuleRow> = query_as(
            r#"
            SELECT id, ptype, v0, v1, v2, v3, v4, v5
            FROM policy_rule
            WHERE v1 LIKE $1 || '%'
            ORDER BY id
            "#,
        )
        .bind(prefix)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(from_row).collect())
    }

    async fn add_rule(&self, rule: PolicyRule) -> Result<PolicyRule> {
        let row: PolicyRuleRow = query_as(
            r#"
            INSERT INTO policy_rule (ptype, v0, v1, v2, v3, v4, v5)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, ptype, v0, v1, v2, v3, v4, v5
            "#,
        )
        .bind(&rule.ptype)
        .bind(&rule.v0)
        .bind(&rule.v1)
        .bind(&rule.v2)
        .bind(&rule.v3)
        .bind(&rule.v4)
        .bind(&rule.v5)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(db_error)?;

        Ok(from_row(row))
    }
}
