//! The `Entity` abstraction.
//!
//! An entity is a relationally stored record with a primary key that can be
//! rendered into a deterministic cache key. The repositories are generic over
//! this trait; each kind only declares its key shape and key formatting.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use gateward_core::{Code, Id, OAuth2Scope, Organization, OrganizationRole, Resource, Role};

/// A relationally stored record addressable by a single primary key.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Primary key type. Serializes transparently so a cached key list stays
    /// a flat JSON array.
    type Key: Clone + fmt::Display + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Entity kind name, used in log fields and error messages.
    const KIND: &'static str;

    /// The record's primary key.
    fn key(&self) -> Self::Key;

    /// Deterministic single-entity cache key for a primary key.
    fn cache_key(key: &Self::Key) -> String;
}

impl Entity for Organization {
    type Key = Id;
    const KIND: &'static str = "organization";

    fn key(&self) -> Id {
        self.id
    }

    fn cache_key(key: &Id) -> String {
        format!("id:{key}")
    }
}

impl Entity for OrganizationRole {
    type Key = Id;
    const KIND: &'static str = "organization_role";

    fn key(&self) -> Id {
        self.id
    }

    fn cache_key(key: &Id) -> String {
        format!("id:{key}")
    }
}

impl Entity for Role {
    type Key = Code;
    const KIND: &'static str = "role";

    fn key(&self) -> Code {
        self.code.clone()
    }

    fn cache_key(key: &Code) -> String {
        format!("code:{key}")
    }
}

impl Entity for Resource {
    type Key = Id;
    const KIND: &'static str = "resource";

    fn key(&self) -> Id {
        self.id
    }

    fn cache_key(key: &Id) -> String {
        format!("id:{key}")
    }
}

impl Entity for OAuth2Scope {
    type Key = Code;
    const KIND: &'static str = "oauth2_scope";

    fn key(&self) -> Code {
        self.code.clone()
    }

    fn cache_key(key: &Code) -> String {
        format!("code:{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_formats() {
        assert_eq!(Resource::cache_key(&Id(42)), "id:42");
        assert_eq!(OAuth2Scope::cache_key(&Code::new("read")), "code:read");
        assert_eq!(Role::cache_key(&Code::new("admin")), "code:admin");
    }

    #[test]
    fn test_entity_key_accessors() {
        let scope = OAuth2Scope::new("read", "Read");
        assert_eq!(scope.key(), Code::new("read"));

        let resource = Resource::new(Id(7), "api");
        assert_eq!(resource.key(), Id(7));
    }
}
