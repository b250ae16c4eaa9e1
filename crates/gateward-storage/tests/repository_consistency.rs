//! Read-through / write-invalidate protocol tests over the in-memory
//! backends, observing store reads and cache hits through the backends'
//! counters.

use std::sync::Arc;

use gateward_cache::{MemoryCache, TtlWindow};
use gateward_core::{Code, Id, OAuth2Scope, OrganizationRole, RequestContext};
use gateward_storage::memory::{MemoryOrganizationRoleStore, MemoryScopeStore};
use gateward_storage::store::EntityStore;
use gateward_storage::{OrganizationRoleRepository, ScopeRepository};

fn scope_repo() -> (
    ScopeRepository<MemoryScopeStore>,
    Arc<MemoryScopeStore>,
    MemoryCache,
) {
    let store = Arc::new(MemoryScopeStore::new());
    let cache = MemoryCache::new();
    let repo = ScopeRepository::new(
        Arc::clone(&store),
        Arc::new(cache.clone()),
        TtlWindow::default(),
    );
    (repo, store, cache)
}

#[tokio::test]
async fn insert_then_select_returns_the_inserted_value() {
    let (repo, _store, cache) = scope_repo();
    let ctx = RequestContext::new();

    let scope = OAuth2Scope::new("read", "Read").with_description("Read access");
    repo.insert(&scope).await.unwrap();

    // The cache was empty before this call: miss, store fallback, fill.
    let selected = repo.select(&ctx, &Code::new("read")).await.unwrap();
    assert_eq!(selected, scope);
    assert_eq!(cache.stats().misses(), 1);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn second_select_is_served_from_cache() {
    let (repo, store, cache) = scope_repo();
    let ctx = RequestContext::new();

    repo.insert(&OAuth2Scope::new("read", "Read")).await.unwrap();
    repo.select(&ctx, &Code::new("read")).await.unwrap();
    repo.select(&ctx, &Code::new("read")).await.unwrap();

    assert_eq!(store.stats().takes(), 1, "second read must not reach the store");
    assert_eq!(cache.stats().hits(), 1);
}

#[tokio::test]
async fn select_missing_returns_not_found_and_caches_nothing() {
    let (repo, _store, cache) = scope_repo();
    let ctx = RequestContext::new();

    let err = repo.select(&ctx, &Code::new("absent")).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(cache.is_empty(), "a not-found read must not write a cache entry");
}

#[tokio::test]
async fn update_is_visible_on_the_next_select() {
    let (repo, store, _cache) = scope_repo();
    let ctx = RequestContext::new();

    let scope = OAuth2Scope::new("read", "Read");
    repo.insert(&scope).await.unwrap();
    repo.select(&ctx, &Code::new("read")).await.unwrap(); // cached

    let mut updated = scope.clone();
    updated.name = "Read v2".to_string();
    repo.update(&updated).await.unwrap();

    // The update removed the cache key, so this select refills from the
    // store and can never observe the pre-update value.
    let selected = repo.select(&ctx, &Code::new("read")).await.unwrap();
    assert_eq!(selected.name, "Read v2");
    assert_eq!(store.stats().takes(), 2);
}

#[tokio::test]
async fn delete_discards_the_cached_copy() {
    let (repo, _store, cache) = scope_repo();
    let ctx = RequestContext::new();

    repo.insert(&OAuth2Scope::new("read", "Read")).await.unwrap();
    repo.select(&ctx, &Code::new("read")).await.unwrap();
    assert_eq!(cache.len(), 1);

    repo.delete(&Code::new("read")).await.unwrap();

    // The TTL has not elapsed, but the cached copy must be gone.
    let err = repo.select(&ctx, &Code::new("read")).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn delete_missing_scope_is_not_found() {
    let (repo, _store, _cache) = scope_repo();
    let err = repo.delete(&Code::new("absent")).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn bypass_flag_routes_reads_straight_to_the_store() {
    let (repo, store, cache) = scope_repo();
    let ctx = RequestContext::new();

    let scope = OAuth2Scope::new("read", "Read");
    repo.insert(&scope).await.unwrap();
    repo.select(&ctx, &Code::new("read")).await.unwrap(); // cached

    // Mutate the row behind the repository's back; the cache is now stale.
    let mut renamed = scope.clone();
    renamed.name = "Renamed".to_string();
    store.save(&renamed).await.unwrap();

    let stale = repo.select(&ctx, &Code::new("read")).await.unwrap();
    assert_eq!(stale.name, "Read", "normal read still sees the cached snapshot");

    let cache_reads_before = cache.stats().hits() + cache.stats().misses();
    let fresh = repo
        .select(&RequestContext::bypass_cache(), &Code::new("read"))
        .await
        .unwrap();
    assert_eq!(fresh.name, "Renamed");
    assert_eq!(
        cache.stats().hits() + cache.stats().misses(),
        cache_reads_before,
        "a bypassed read must not touch the cache at all"
    );
}

#[tokio::test]
async fn existence_probe_reflects_store_truth_not_cache() {
    let (repo, _store, cache) = scope_repo();
    let ctx = RequestContext::new();

    repo.insert(&OAuth2Scope::new("read", "Read")).await.unwrap();
    repo.select(&ctx, &Code::new("read")).await.unwrap(); // cached
    assert!(repo.exist_by_code(&Code::new("read")).await.unwrap());

    repo.delete(&Code::new("read")).await.unwrap();
    assert!(!repo.exist_by_code(&Code::new("read")).await.unwrap());
    assert_eq!(cache.len(), 0, "the probe never repopulates the cache");
}

#[tokio::test]
async fn failed_insert_leaves_cache_untouched() {
    let (repo, _store, cache) = scope_repo();
    let ctx = RequestContext::new();

    repo.insert(&OAuth2Scope::new("read", "Read")).await.unwrap();
    repo.select_all_cached(&ctx).await.unwrap();
    let before = cache.len();

    let err = repo.insert(&OAuth2Scope::new("read", "Again")).await.unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(cache.len(), before, "no invalidation when the store write failed");
}

#[tokio::test]
async fn organization_role_repository_is_store_backed_only() {
    let store = Arc::new(MemoryOrganizationRoleStore::new());
    let repo = OrganizationRoleRepository::new(Arc::clone(&store));

    let assignment = OrganizationRole::new(Id(1), Id(10), Code::new("admin"));
    repo.insert(&assignment).await.unwrap();
    assert_eq!(repo.select(Id(1)).await.unwrap(), assignment);

    let mut moved = assignment.clone();
    moved.role_code = Code::new("auditor");
    repo.update(&moved).await.unwrap();
    assert_eq!(repo.select(Id(1)).await.unwrap().role_code, Code::new("auditor"));

    repo.delete(Id(1)).await.unwrap();
    assert!(repo.select(Id(1)).await.unwrap_err().is_not_found());
}
