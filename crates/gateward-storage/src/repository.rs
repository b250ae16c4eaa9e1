//! The read-through / write-invalidate repository.
//!
//! One generic implementation carries the whole cache-consistency protocol;
//! the per-entity repositories are thin wrappers that add their kind's
//! queries and list shapes.
//!
//! Protocol summary:
//!
//! - Reads go cache-first; a miss falls through to the store and fills the
//!   cache with a jittered TTL. The cache-bypass flag on the request context
//!   routes reads straight to the store.
//! - Mutations write to the store first and only then touch the cache, and
//!   they remove entries rather than overwriting them. Removal is idempotent
//!   and safe under racing writers; a direct overwrite could publish a value
//!   older than the one another writer just committed.
//! - Insert and delete additionally drop every list-shape key, since
//!   membership may have changed. Update leaves list keys alone: list entries
//!   hold primary keys only, and a field change does not alter membership.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use gateward_cache::{Cache, TtlWindow};
use gateward_core::{RequestContext, Result};

use crate::entity::Entity;
use crate::store::EntityStore;

/// Glob covering every list-shape key of an entity kind's cache namespace.
pub const LIST_KEY_PATTERN: &str = "list:*";

/// Generic cache-consistent repository over one entity kind.
///
/// Holds the injected store and cache handles; no other mutable state. Each
/// repository expects its own cache namespace (the redis backend's key prefix
/// or a dedicated [`gateward_cache::MemoryCache`]), which keeps single-entity
/// keys and the coarse `list:*` invalidation scoped to one kind.
pub struct CachedRepository<E, S>
where
    E: Entity,
    S: EntityStore<E>,
{
    store: Arc<S>,
    cache: Arc<dyn Cache>,
    ttl: TtlWindow,
    _entity: PhantomData<fn() -> E>,
}

impl<E, S> CachedRepository<E, S>
where
    E: Entity,
    S: EntityStore<E>,
{
    /// Create a repository from injected handles.
    pub fn new(store: Arc<S>, cache: Arc<dyn Cache>, ttl: TtlWindow) -> Self {
        Self {
            store,
            cache,
            ttl,
            _entity: PhantomData,
        }
    }

    /// The underlying store handle, for kind-specific queries.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Fetch one entity by primary key.
    ///
    /// With the bypass flag set this reads the store directly and never
    /// touches the cache. Otherwise it is a read-through: a cache hit returns
    /// the deserialized snapshot; a miss reads the store and fills the cache
    /// with a jittered TTL. A `NotFound` from the store propagates and writes
    /// nothing to the cache.
    ///
    /// # Errors
    ///
    /// `NotFound` when no row matches; dependency failures from either the
    /// store or the cache. A cache error other than a miss is a genuine
    /// dependency failure and is never swallowed.
    pub async fn select(&self, ctx: &RequestContext, key: &E::Key) -> Result<E> {
        if ctx.bypasses_cache() {
            return self.store.take(key).await;
        }

        let cache_key = E::cache_key(key);
        match self.cache.get(&cache_key).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.is_miss() => {
                let entity = self.store.take(key).await?;
                let bytes = serde_json::to_vec(&entity)?;
                self.cache.set(&cache_key, &bytes, self.ttl.jittered()).await?;
                debug!(kind = E::KIND, key = %key, "Filled entity cache on miss");
                Ok(entity)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Insert a new entity.
    ///
    /// The store write comes first; the cache is only touched after the write
    /// is durable, so a failed insert leaves the cache exactly as it was.
    /// Membership of list shapes may have changed, so all list keys are
    /// dropped. The single-entity key is not pre-populated; the next read
    /// fills it.
    ///
    /// # Errors
    ///
    /// `Conflict` when the key exists; dependency failures otherwise.
    pub async fn insert(&self, entity: &E) -> Result<()> {
        self.store.create(entity).await?;
        self.invalidate_lists().await
    }

    /// Update an existing entity.
    ///
    /// Store write first, then removal (never refresh) of the single-entity
    /// key, forcing the next read to repopulate from the authoritative row.
    ///
    /// # Errors
    ///
    /// `NotFound` when no row matches; dependency failures otherwise.
    pub async fn update(&self, entity: &E) -> Result<()> {
        self.store.save(entity).await?;
        self.invalidate(&entity.key()).await
    }

    /// Delete an entity by primary key.
    ///
    /// Store write first, then removal of the single-entity key and all list
    /// keys (membership changed).
    ///
    /// # Errors
    ///
    /// `NotFound` when no row matches; dependency failures otherwise.
    pub async fn delete(&self, key: &E::Key) -> Result<()> {
        self.store.delete(key).await?;
        self.invalidate(key).await?;
        self.invalidate_lists().await
    }

    /// Count-based existence probe against the store.
    ///
    /// Never consults the cache: existence checks must reflect current store
    /// truth, not a snapshot that might predate a delete.
    pub async fn exist_by_key(&self, key: &E::Key) -> Result<bool> {
        Ok(self.store.count_by_key(key).await? > 0)
    }

    /// A page of entities plus the total row count. Always store-backed:
    /// caching parameterized shapes would need a key per (offset, limit)
    /// tuple, which this design deliberately avoids to bound cache
    /// cardinality.
    pub async fn list_paged(&self, start: u64, limit: u64) -> Result<(Vec<E>, u64)> {
        let total = self.store.count_all().await?;
        let rows = self.store.scan_page(start, limit).await?;
        Ok((rows, total))
    }

    /// Read a fixed-shape list through the list index cache.
    ///
    /// The cached value is an ordered sequence of primary keys, never full
    /// entities; every member is resolved through [`Self::select`], so each
    /// is independently cacheable and independently invalidatable, and the
    /// list always reflects the freshest cached value of each member. The
    /// cost is one cache round-trip per member; the alternative (caching full
    /// rows in the list entry) would create a second stale copy of every
    /// member.
    ///
    /// On a miss, `load_keys` runs against the store (projecting primary keys
    /// only) and the sequence is cached with a jittered TTL. With the bypass
    /// flag set both the list read and every member read skip the cache.
    ///
    /// # Errors
    ///
    /// Propagates store, cache, and serialization failures; also `NotFound`
    /// if a referenced member vanished from the store before its TTL-bounded
    /// reference was invalidated.
    pub async fn select_list<F, Fut>(
        &self,
        ctx: &RequestContext,
        shape_key: &str,
        load_keys: F,
    ) -> Result<Vec<E>>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<Vec<E::Key>>> + Send,
    {
        if ctx.bypasses_cache() {
            let keys = load_keys().await?;
            return self.resolve_keys(ctx, &keys).await;
        }

        let keys: Vec<E::Key> = match self.cache.get(shape_key).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.is_miss() => {
                let keys = load_keys().await?;
                let bytes = serde_json::to_vec(&keys)?;
                self.cache.set(shape_key, &bytes, self.ttl.jittered()).await?;
                debug!(
                    kind = E::KIND,
                    shape = shape_key,
                    members = keys.len(),
                    "Filled list index cache on miss"
                );
                keys
            }
            Err(err) => return Err(err.into()),
        };

        self.resolve_keys(ctx, &keys).await
    }

    /// Drop the single-entity cache key for one primary key.
    pub async fn invalidate(&self, key: &E::Key) -> Result<()> {
        self.cache.remove(&E::cache_key(key)).await?;
        Ok(())
    }

    /// Drop every list-shape key of this kind's namespace.
    ///
    /// Coarse on purpose: it also removes list shapes whose membership did
    /// not change, trading extra misses for a single well-known pattern.
    pub async fn invalidate_lists(&self) -> Result<()> {
        self.cache.remove_match(LIST_KEY_PATTERN).await?;
        Ok(())
    }

    async fn resolve_keys(&self, ctx: &RequestContext, keys: &[E::Key]) -> Result<Vec<E>> {
        let mut entities = Vec::with_capacity(keys.len());
        for key in keys {
            entities.push(self.select(ctx, key).await?);
        }
        Ok(entities)
    }
}

impl<E, S> std::fmt::Debug for CachedRepository<E, S>
where
    E: Entity,
    S: EntityStore<E>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedRepository")
            .field("kind", &E::KIND)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
