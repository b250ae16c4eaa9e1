//! Entity models.
//!
//! These records are owned by the relational store; the cache only ever holds
//! serialized snapshots of them. Timestamps are set by the layer that creates
//! the record, not by the database, so the in-memory backend behaves the same
//! as PostgreSQL.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::id::{Code, Id};

fn now_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// An organization (tenant) in the identity backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: Id,
    pub name: String,
    pub description: String,
    /// Parent organization for hierarchical tenants.
    pub parent_id: Option<Id>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Organization {
    /// Create a new organization with timestamps set to now.
    #[must_use]
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        let now = now_utc();
        Self {
            id,
            name: name.into(),
            description: String::new(),
            parent_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent_id: Id) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Assignment of a role to an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationRole {
    pub id: Id,
    pub organization_id: Id,
    pub role_code: Code,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl OrganizationRole {
    #[must_use]
    pub fn new(id: Id, organization_id: Id, role_code: Code) -> Self {
        let now = now_utc();
        Self {
            id,
            organization_id,
            role_code,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A role, keyed by its string code.
///
/// Roles may be global or scoped to one organization, and may inherit from a
/// parent role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub code: Code,
    pub name: String,
    pub description: String,
    pub parent_code: Option<Code>,
    pub organization_id: Option<Id>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Role {
    #[must_use]
    pub fn new(code: impl Into<Code>, name: impl Into<String>) -> Self {
        let now = now_utc();
        Self {
            code: code.into(),
            name: name.into(),
            description: String::new(),
            parent_code: None,
            organization_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent_code: impl Into<Code>) -> Self {
        self.parent_code = Some(parent_code.into());
        self
    }

    #[must_use]
    pub fn for_organization(mut self, organization_id: Id) -> Self {
        self.organization_id = Some(organization_id);
        self
    }
}

/// A protected resource server registered with the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: Id,
    pub name: String,
    /// Shared secret the resource server authenticates with.
    pub secret: String,
    pub description: String,
    pub organization_id: Option<Id>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Resource {
    #[must_use]
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        let now = now_utc();
        Self {
            id,
            name: name.into(),
            secret: String::new(),
            description: String::new(),
            organization_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = secret.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn for_organization(mut self, organization_id: Id) -> Self {
        self.organization_id = Some(organization_id);
        self
    }
}

/// Classification of an OAuth2 scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    /// Granted to every client by default.
    #[default]
    Basic,
    /// Must be requested and consented to explicitly.
    Advanced,
}

impl ScopeKind {
    /// Stable string form used in the database.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Advanced => "advanced",
        }
    }

    /// Parse the stable string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "basic" => Some(Self::Basic),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

impl std::fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An OAuth2 scope, keyed by its string code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuth2Scope {
    pub code: Code,
    pub name: String,
    pub description: String,
    pub kind: ScopeKind,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl OAuth2Scope {
    #[must_use]
    pub fn new(code: impl Into<Code>, name: impl Into<String>) -> Self {
        let now = now_utc();
        Self {
            code: code.into(),
            name: name.into(),
            description: String::new(),
            kind: ScopeKind::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ScopeKind) -> Self {
        self.kind = kind;
        self
    }
}

/// A flat authorization rule tuple.
///
/// Resources relate to rules through a naming convention embedded in `v1`
/// (an object field beginning with `resource:<id>`), not through a foreign
/// key. Rules that do not follow the convention are invisible to
/// resource-scoped queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub id: Id,
    /// Rule type discriminator (`p` for policies, `g` for groupings).
    pub ptype: String,
    pub v0: String,
    pub v1: String,
    pub v2: String,
    pub v3: String,
    pub v4: String,
    pub v5: String,
}

impl PolicyRule {
    /// Create a policy rule (`ptype = "p"`) with subject, object and action.
    #[must_use]
    pub fn policy(
        id: Id,
        subject: impl Into<String>,
        object: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            id,
            ptype: "p".to_string(),
            v0: subject.into(),
            v1: object.into(),
            v2: action.into(),
            ..Self::default()
        }
    }
}
