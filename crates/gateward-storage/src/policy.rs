//! Policy rule resolution.
//!
//! Rules relate to resources by a naming convention on the rule's object
//! field (`v1` starting with `resource:<id>`), not by a foreign key. The
//! convention is fragile, so it lives entirely behind this resolver; callers
//! never see the prefix format and the link can later become a real
//! relational one without touching them.
//!
//! This path is never cached. Policy rules are read rarely compared to
//! entities and must reflect the latest authorization state immediately;
//! stale authorization data is a security risk, not a UX one.

use std::sync::Arc;

use gateward_core::{Id, PolicyRule, Result};

use crate::store::PolicyStore;

/// Resolves the rules attached to a resource.
pub struct PolicyResolver<P: PolicyStore> {
    store: Arc<P>,
}

impl<P: PolicyStore> PolicyResolver<P> {
    /// Create a resolver from an injected rule store.
    pub fn new(store: Arc<P>) -> Self {
        Self { store }
    }

    /// The object-field prefix for a resource.
    #[must_use]
    pub fn object_prefix(resource_id: Id) -> String {
        format!("resource:{resource_id}")
    }

    /// Load every rule whose object field belongs to the resource.
    ///
    /// The store matches coarsely (`LIKE 'resource:<id>%'`); the exact
    /// boundary check here rejects rules of a resource whose id merely
    /// extends this one (`resource:12...` is not a match for resource 1).
    ///
    /// # Errors
    ///
    /// Propagates store failures unchanged.
    pub async fn load_policy(&self, resource_id: Id) -> Result<Vec<PolicyRule>> {
        let prefix = Self::object_prefix(resource_id);
        let rules = self.store.rules_with_object_prefix(&prefix).await?;
        Ok(rules
            .into_iter()
            .filter(|rule| object_belongs_to(&rule.v1, &prefix))
            .collect())
    }
}

impl<P: PolicyStore> std::fmt::Debug for PolicyResolver<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyResolver").finish_non_exhaustive()
    }
}

/// Exact prefix check: the object must start with `prefix` and the next
/// character must not extend the numeric id.
fn object_belongs_to(object: &str, prefix: &str) -> bool {
    match object.strip_prefix(prefix) {
        Some(rest) => !rest.chars().next().is_some_and(|c| c.is_ascii_digit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_prefix_format() {
        assert_eq!(PolicyResolver::<DummyStore>::object_prefix(Id(12)), "resource:12");
    }

    #[test]
    fn test_boundary_check() {
        assert!(object_belongs_to("resource:1", "resource:1"));
        assert!(object_belongs_to("resource:1:/users", "resource:1"));
        assert!(object_belongs_to("resource:1:route:get", "resource:1"));

        // A different numeric id is not a match, even though it shares the
        // literal prefix.
        assert!(!object_belongs_to("resource:12", "resource:1"));
        assert!(!object_belongs_to("resource:12:/users", "resource:1"));

        // Unrelated objects never match.
        assert!(!object_belongs_to("role:admin", "resource:1"));
        assert!(!object_belongs_to("resource:", "resource:1"));
    }

    // Only here so the associated-function test above can name a store type.
    struct DummyStore;

    #[async_trait::async_trait]
    impl PolicyStore for DummyStore {
        async fn rules_with_object_prefix(&self, _prefix: &str) -> Result<Vec<PolicyRule>> {
            Ok(Vec::new())
        }

        async fn add_rule(&self, rule: PolicyRule) -> Result<PolicyRule> {
            Ok(rule)
        }
    }
}
