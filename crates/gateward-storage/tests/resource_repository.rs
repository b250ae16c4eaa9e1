//! Resource-specific repository behavior: batch deletes, paging, and the
//! store-truth existence probe.

use std::sync::Arc;

use gateward_cache::{MemoryCache, TtlWindow};
use gateward_core::{Id, RequestContext, Resource};
use gateward_storage::memory::{MemoryPolicyStore, MemoryResourceStore};
use gateward_storage::ResourceRepository;

fn resource_repo() -> (
    ResourceRepository<MemoryResourceStore, MemoryPolicyStore>,
    Arc<MemoryResourceStore>,
    MemoryCache,
) {
    let store = Arc::new(MemoryResourceStore::new());
    let cache = MemoryCache::new();
    let repo = ResourceRepository::new(
        Arc::clone(&store),
        Arc::new(cache.clone()),
        TtlWindow::default(),
        Arc::new(MemoryPolicyStore::new()),
    );
    (repo, store, cache)
}

#[tokio::test]
async fn delete_many_drops_each_member_cache_key() {
    let (repo, _store, cache) = resource_repo();
    let ctx = RequestContext::new();

    for n in 1..=3 {
        repo.insert(&Resource::new(Id(n), format!("api-{n}"))).await.unwrap();
        repo.select(&ctx, Id(n)).await.unwrap(); // cache each
    }
    assert_eq!(cache.len(), 3);

    repo.delete_many(&[Id(1), Id(2)]).await.unwrap();

    assert!(repo.select(&ctx, Id(1)).await.unwrap_err().is_not_found());
    assert!(repo.select(&ctx, Id(2)).await.unwrap_err().is_not_found());
    assert_eq!(repo.select(&ctx, Id(3)).await.unwrap().name, "api-3");
}

#[tokio::test]
async fn list_paged_returns_rows_and_total() {
    let (repo, _store, _cache) = resource_repo();

    for n in 1..=5 {
        repo.insert(&Resource::new(Id(n), format!("api-{n}"))).await.unwrap();
    }

    let (page, total) = repo.list_paged(0, 2).await.unwrap();
    assert_eq!(total, 5);
    assert_eq!(page.len(), 2);

    let (rest, total) = repo.list_paged(4, 10).await.unwrap();
    assert_eq!(total, 5);
    assert_eq!(rest.len(), 1);
}

#[tokio::test]
async fn list_by_name_is_store_backed_and_capped() {
    let (repo, store, _cache) = resource_repo();

    repo.insert(&Resource::new(Id(1), "user-api")).await.unwrap();
    repo.insert(&Resource::new(Id(2), "billing-api")).await.unwrap();
    repo.insert(&Resource::new(Id(3), "user-admin")).await.unwrap();

    let hits = repo.list_by_name("user", 10).await.unwrap();
    assert_eq!(hits.len(), 2);

    let capped = repo.list_by_name("api", 1).await.unwrap();
    assert_eq!(capped.len(), 1);

    assert_eq!(store.stats().scans(), 2);
}

#[tokio::test]
async fn exist_by_id_tracks_the_store() {
    let (repo, _store, _cache) = resource_repo();
    let ctx = RequestContext::new();

    assert!(!repo.exist_by_id(Id(9)).await.unwrap());
    repo.insert(&Resource::new(Id(9), "api")).await.unwrap();
    assert!(repo.exist_by_id(Id(9)).await.unwrap());

    repo.select(&ctx, Id(9)).await.unwrap(); // cached copy exists
    repo.delete(Id(9)).await.unwrap();
    assert!(!repo.exist_by_id(Id(9)).await.unwrap());
}
