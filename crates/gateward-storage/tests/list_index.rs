//! List index cache behavior: key-reference sequences, member resolution
//! through the single-entity path, and coarse invalidation.

use std::sync::Arc;

use gateward_cache::{MemoryCache, TtlWindow};
use gateward_core::{Code, OAuth2Scope, RequestContext, ScopeKind};
use gateward_storage::memory::MemoryScopeStore;
use gateward_storage::store::EntityStore;
use gateward_storage::ScopeRepository;

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

async fn seed(repo: &ScopeRepository<MemoryScopeStore>) {
    repo.insert(&OAuth2Scope::new("openid", "OpenID")).await.unwrap();
    repo.insert(&OAuth2Scope::new("read", "Read")).await.unwrap();
    repo.insert(&OAuth2Scope::new("write", "Write").with_kind(ScopeKind::Advanced))
        .await
        .unwrap();
}

#[tokio::test]
async fn first_list_read_scans_once_then_resolves_each_member() {
    let (repo, store, cache) = scope_repo();
    let ctx = RequestContext::new();
    seed(&repo).await;

    let all = repo.select_all_cached(&ctx).await.unwrap();
    assert_eq!(all.len(), 3);

    // Exactly one store scan for the key sequence, then one store fallback
    // per member (each fills its own entity key).
    assert_eq!(store.stats().scans(), 1);
    assert_eq!(store.stats().takes(), 3);
    assert_eq!(cache.len(), 4); // list key + 3 entity keys

    // The second identical call hits the list index and every entity key:
    // no further store reads of any shape.
    let again = repo.select_all_cached(&ctx).await.unwrap();
    assert_eq!(again, all);
    assert_eq!(store.stats().scans(), 1);
    assert_eq!(store.stats().takes(), 3);
}

#[tokio::test]
async fn list_entries_hold_keys_not_field_values() {
    let (repo, store, _cache) = scope_repo();
    let ctx = RequestContext::new();
    seed(&repo).await;

    repo.select_all_cached(&ctx).await.unwrap();

    // Rename a member behind the repository, then drop only its entity key.
    // The still-cached list must pick up the fresh member value, proving the
    // list entry duplicates no field data.
    let mut renamed = store.take(&Code::new("read")).await.unwrap();
    renamed.name = "Read v2".to_string();
    store.save(&renamed).await.unwrap();

    let repo_view = repo.select_all_cached(&ctx).await.unwrap();
    assert_eq!(
        repo_view.iter().find(|s| s.code == Code::new("read")).unwrap().name,
        "Read",
        "entity key still cached, so the stale snapshot is expected here"
    );

    // Update through the repository: removes the entity key, leaves lists.
    repo.update(&renamed).await.unwrap();
    let scans_before = store.stats().scans();

    let fresh_view = repo.select_all_cached(&ctx).await.unwrap();
    assert_eq!(
        fresh_view.iter().find(|s| s.code == Code::new("read")).unwrap().name,
        "Read v2"
    );
    assert_eq!(
        store.stats().scans(),
        scans_before,
        "update must not have invalidated the list index"
    );
}

#[tokio::test]
async fn insert_invalidates_list_shapes() {
    let (repo, store, _cache) = scope_repo();
    let ctx = RequestContext::new();
    seed(&repo).await;

    repo.select_all_cached(&ctx).await.unwrap();
    assert_eq!(store.stats().scans(), 1);

    repo.insert(&OAuth2Scope::new("profile", "Profile")).await.unwrap();

    let all = repo.select_all_cached(&ctx).await.unwrap();
    assert_eq!(all.len(), 4, "new member visible after list refill");
    assert_eq!(store.stats().scans(), 2, "list cache was dropped by the insert");
}

#[tokio::test]
async fn basic_and_all_shapes_have_distinct_keys() {
    let (repo, store, _cache) = scope_repo();
    let ctx = RequestContext::new();
    seed(&repo).await;

    let all = repo.select_all_cached(&ctx).await.unwrap();
    let basic = repo.select_basic_cached(&ctx).await.unwrap();

    assert_eq!(all.len(), 3);
    assert_eq!(basic.len(), 2);
    assert!(basic.iter().all(|s| s.kind == ScopeKind::Basic));
    assert_eq!(store.stats().scans(), 2, "each shape fills independently");
}

#[tokio::test]
async fn bypassed_list_read_excludes_a_member_deleted_behind_the_cache() {
    let (repo, store, _cache) = scope_repo();
    let ctx = RequestContext::new();
    seed(&repo).await;

    repo.select_all_cached(&ctx).await.unwrap();

    // Delete at the store level so the list index stays stale.
    store.delete(&Code::new("read")).await.unwrap();

    let fresh = repo
        .select_all_cached(&RequestContext::bypass_cache())
        .await
        .unwrap();
    assert_eq!(fresh.len(), 2);
    assert!(fresh.iter().all(|s| s.code != Code::new("read")));
}

#[tokio::test]
async fn stale_list_reference_to_a_vanished_member_propagates_not_found() {
    let (repo, store, cache) = scope_repo();
    let ctx = RequestContext::new();
    seed(&repo).await;

    repo.select_all_cached(&ctx).await.unwrap();

    // Remove the row and its entity cache key, leaving the stale list
    // reference in place; resolution must surface the inconsistency rather
    // than silently skip the member.
    store.delete(&Code::new("read")).await.unwrap();
    use gateward_cache::Cache;
    cache.remove("code:read").await.unwrap();

    let err = repo.select_all_cached(&ctx).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn uncached_list_variants_always_scan_the_store() {
    let (repo, store, _cache) = scope_repo();
    seed(&repo).await;

    repo.select_all().await.unwrap();
    repo.select_all().await.unwrap();
    repo.select_basic().await.unwrap();

    assert_eq!(store.stats().scans(), 3);
}
