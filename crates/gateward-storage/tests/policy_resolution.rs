//! Policy resolution: structural prefix matching with exact id boundaries,
//! and freshness (no caching on the authorization path).

use std::sync::Arc;

use gateward_cache::{MemoryCache, TtlWindow};
use gateward_core::{Id, PolicyRule, RequestContext, Resource};
use gateward_storage::memory::{MemoryPolicyStore, MemoryResourceStore};
use gateward_storage::store::PolicyStore;
use gateward_storage::{PolicyResolver, ResourceRepository};

async fn seeded_rules() -> Arc<MemoryPolicyStore> {
    let store = Arc::new(MemoryPolicyStore::new());
    for (subject, object, action) in [
        ("role:admin", "resource:1:/users", "GET"),
        ("role:admin", "resource:1:/users", "POST"),
        ("role:viewer", "resource:1", "GET"),
        ("role:admin", "resource:12:/users", "GET"),
        ("role:admin", "resource:2:/billing", "GET"),
        ("role:admin", "unrelated:object", "GET"),
    ] {
        store
            .add_rule(PolicyRule::policy(Id(0), subject, object, action))
            .await
            .unwrap();
    }
    store
}

#[tokio::test]
async fn load_policy_matches_exactly_the_resource_prefix() {
    let resolver = PolicyResolver::new(seeded_rules().await);

    let rules = resolver.load_policy(Id(1)).await.unwrap();
    assert_eq!(rules.len(), 3);
    assert!(rules.iter().all(|r| r.v1 == "resource:1" || r.v1.starts_with("resource:1:")));
}

#[tokio::test]
async fn load_policy_excludes_longer_numeric_ids() {
    let resolver = PolicyResolver::new(seeded_rules().await);

    // resource 12 shares the literal prefix "resource:1" but is a different
    // resource; it must not leak into resource 1's rules.
    let rules = resolver.load_policy(Id(1)).await.unwrap();
    assert!(rules.iter().all(|r| !r.v1.starts_with("resource:12")));

    let rules_12 = resolver.load_policy(Id(12)).await.unwrap();
    assert_eq!(rules_12.len(), 1);
    assert_eq!(rules_12[0].v1, "resource:12:/users");
}

#[tokio::test]
async fn load_policy_for_unknown_resource_is_empty_not_an_error() {
    let resolver = PolicyResolver::new(seeded_rules().await);
    let rules = resolver.load_policy(Id(404)).await.unwrap();
    assert!(rules.is_empty());
}

#[tokio::test]
async fn load_policy_reflects_new_rules_immediately() {
    let rules_store = seeded_rules().await;
    let resolver = PolicyResolver::new(Arc::clone(&rules_store));

    assert_eq!(resolver.load_policy(Id(2)).await.unwrap().len(), 1);

    // No cache sits on this path, so a rule added after the first read is
    // visible on the very next one.
    rules_store
        .add_rule(PolicyRule::policy(Id(0), "role:admin", "resource:2:/invoices", "GET"))
        .await
        .unwrap();
    assert_eq!(resolver.load_policy(Id(2)).await.unwrap().len(), 2);
}

#[tokio::test]
async fn resource_repository_exposes_policy_loading() {
    let rules_store = seeded_rules().await;
    let repo = ResourceRepository::new(
        Arc::new(MemoryResourceStore::new()),
        Arc::new(MemoryCache::new()),
        TtlWindow::default(),
        rules_store,
    );

    repo.insert(&Resource::new(Id(1), "user-api")).await.unwrap();
    let ctx = RequestContext::new();
    assert_eq!(repo.select(&ctx, Id(1)).await.unwrap().name, "user-api");

    let rules = repo.load_policy(Id(1)).await.unwrap();
    assert_eq!(rules.len(), 3);
}
