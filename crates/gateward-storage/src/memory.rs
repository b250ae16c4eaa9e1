//! In-memory store backend.
//!
//! Backs tests and single-node development setups. Rows live in a `DashMap`
//! keyed by the rendered primary key; an insertion sequence number gives
//! `scan_page` a stable newest-first order without depending on map
//! iteration order.
//!
//! The read counters exist so tests can assert the cache-consistency
//! protocol by observing exactly how many reads reached the store.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use gateward_core::{
    Code, Error, Id, OAuth2Scope, Organization, OrganizationRole, PolicyRule, Resource, Result,
    Role, ScopeKind,
};

use crate::entity::Entity;
use crate::store::{
    EntityStore, OrganizationStore, PolicyStore, ResourceStore, RoleStore, ScopeStore,
};

/// Read counters for one store.
#[derive(Debug, Default)]
pub struct StoreStats {
    takes: AtomicU64,
    scans: AtomicU64,
}

impl StoreStats {
    /// Number of single-row lookups (`take`) served.
    pub fn takes(&self) -> u64 {
        self.takes.load(Ordering::Relaxed)
    }

    /// Number of multi-row scans served.
    pub fn scans(&self) -> u64 {
        self.scans.load(Ordering::Relaxed)
    }

    /// Total reads of any shape.
    pub fn reads(&self) -> u64 {
        self.takes() + self.scans()
    }
}

struct Row<E> {
    seq: u64,
    entity: E,
}

/// In-memory entity store.
pub struct MemoryStore<E: Entity> {
    rows: DashMap<String, Row<E>>,
    seq: AtomicU64,
    stats: Arc<StoreStats>,
}

/// Organization rows in memory.
pub type MemoryOrganizationStore = MemoryStore<Organization>;
/// Organization-role rows in memory.
pub type MemoryOrganizationRoleStore = MemoryStore<OrganizationRole>;
/// Role rows in memory.
pub type MemoryRoleStore = MemoryStore<Role>;
/// Resource rows in memory.
pub type MemoryResourceStore = MemoryStore<Resource>;
/// OAuth2 scope rows in memory.
pub type MemoryScopeStore = MemoryStore<OAuth2Scope>;

impl<E: Entity> MemoryStore<E> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            seq: AtomicU64::new(0),
            stats: Arc::new(StoreStats::default()),
        }
    }

    /// Read counters.
    #[must_use]
    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when the store holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn row_key(key: &E::Key) -> String {
        key.to_string()
    }

    fn not_found(key: &E::Key) -> Error {
        Error::not_found(format!("{} {}", E::KIND, key))
    }

    /// All rows, newest insertion first.
    fn snapshot_newest_first(&self) -> Vec<E> {
        let mut rows: Vec<(u64, E)> = self
            .rows
            .iter()
            .map(|row| (row.seq, row.entity.clone()))
            .collect();
        rows.sort_by(|a, b| b.0.cmp(&a.0));
        rows.into_iter().map(|(_, entity)| entity).collect()
    }
}

impl<E: Entity> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> std::fmt::Debug for MemoryStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("kind", &E::KIND)
            .field("len", &self.rows.len())
            .finish()
    }
}

#[async_trait]
impl<E: Entity> EntityStore<E> for MemoryStore<E> {
    async fn create(&self, entity: &E) -> Result<()> {
        let key = Self::row_key(&entity.key());
        if self.rows.contains_key(&key) {
            return Err(Error::conflict(format!(
                "{} with key '{}' already exists",
                E::KIND,
                entity.key()
            )));
        }
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.rows.insert(
            key,
            Row {
                seq,
                entity: entity.clone(),
            },
        );
        Ok(())
    }

    async fn take(&self, key: &E::Key) -> Result<E> {
        self.stats.takes.fetch_add(1, Ordering::Relaxed);
        self.rows
            .get(&Self::row_key(key))
            .map(|row| row.entity.clone())
            .ok_or_else(|| Self::not_found(key))
    }

    async fn save(&self, entity: &E) -> Result<()> {
        let key = Self::row_key(&entity.key());
        match self.rows.get_mut(&key) {
            Some(mut row) => {
                row.entity = entity.clone();
                Ok(())
            }
            None => Err(Self::not_found(&entity.key())),
        }
    }

    async fn delete(&self, key: &E::Key) -> Result<()> {
        self.rows
            .remove(&Self::row_key(key))
            .map(|_| ())
            .ok_or_else(|| Self::not_found(key))
    }

    async fn count_by_key(&self, key: &E::Key) -> Result<u64> {
        Ok(u64::from(self.rows.contains_key(&Self::row_key(key))))
    }

    async fn count_all(&self) -> Result<u64> {
        Ok(self.rows.len() as u64)
    }

    async fn scan_page(&self, offset: u64, limit: u64) -> Result<Vec<E>> {
        self.stats.scans.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .snapshot_newest_first()
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

fn name_matches(name: &str, fragment: &str) -> bool {
    name.to_lowercase().contains(&fragment.to_lowercase())
}

#[async_trait]
impl OrganizationStore for MemoryStore<Organization> {
    async fn scan_by_name(&self, name: &str, limit: u64) -> Result<Vec<Organization>> {
        self.stats.scans.fetch_add(1, Ordering::Relaxed);
        let mut rows: Vec<Organization> = self
            .rows
            .iter()
            .filter(|row| name_matches(&row.entity.name, name))
            .map(|row| row.entity.clone())
            .collect();
        rows.sort_by_key(|org| org.id);
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

#[async_trait]
impl RoleStore for MemoryStore<Role> {
    async fn scan_by_name(&self, name: &str, limit: u64) -> Result<Vec<Role>> {
        self.stats.scans.fetch_add(1, Ordering::Relaxed);
        let mut rows: Vec<Role> = self
            .rows
            .iter()
            .filter(|row| name_matches(&row.entity.name, name))
            .map(|row| row.entity.clone())
            .collect();
        rows.sort_by(|a, b| a.code.cmp(&b.code));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn scan_by_name_for_organization(
        &self,
        organization_id: Id,
        name: &str,
        limit: u64,
    ) -> Result<Vec<Role>> {
        self.stats.scans.fetch_add(1, Ordering::Relaxed);
        let mut rows: Vec<Role> = self
            .rows
            .iter()
            .filter(|row| {
                row.entity.organization_id == Some(organization_id)
                    && name_matches(&row.entity.name, name)
            })
            .map(|row| row.entity.clone())
            .collect();
        rows.sort_by(|a, b| a.code.cmp(&b.code));
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

#[async_trait]
impl ResourceStore for MemoryStore<Resource> {
    async fn scan_by_name(&self, name: &str, limit: u64) -> Result<Vec<Resource>> {
        self.stats.scans.fetch_add(1, Ordering::Relaxed);
        let mut rows: Vec<Resource> = self
            .rows
            .iter()
            .filter(|row| name_matches(&row.entity.name, name))
            .map(|row| row.entity.clone())
            .collect();
        rows.sort_by_key(|resource| resource.id);
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn delete_many(&self, ids: &[Id]) -> Result<()> {
        for id in ids {
            self.rows.remove(&id.to_string());
        }
        Ok(())
    }
}

#[async_trait]
impl ScopeStore for MemoryStore<OAuth2Scope> {
    async fn scan_all(&self) -> Result<Vec<OAuth2Scope>> {
        self.stats.scans.fetch_add(1, Ordering::Relaxed);
        let mut rows: Vec<OAuth2Scope> =
            self.rows.iter().map(|row| row.entity.clone()).collect();
        rows.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(rows)
    }

    async fn scan_of_kind(&self, kind: ScopeKind) -> Result<Vec<OAuth2Scope>> {
        self.stats.scans.fetch_add(1, Ordering::Relaxed);
        let mut rows: Vec<OAuth2Scope> = self
            .rows
            .iter()
            .filter(|row| row.entity.kind == kind)
            .map(|row| row.entity.clone())
            .collect();
        rows.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(rows)
    }

    async fn scan_codes(&self) -> Result<Vec<Code>> {
        self.stats.scans.fetch_add(1, Ordering::Relaxed);
        let mut codes: Vec<Code> = self.rows.iter().map(|row| row.entity.code.clone()).collect();
        codes.sort();
        Ok(codes)
    }

    async fn scan_codes_of_kind(&self, kind: ScopeKind) -> Result<Vec<Code>> {
        self.stats.scans.fetch_add(1, Ordering::Relaxed);
        let mut codes: Vec<Code> = self
            .rows
            .iter()
            .filter(|row| row.entity.kind == kind)
            .map(|row| row.entity.code.clone())
            .collect();
        codes.sort();
        Ok(codes)
    }
}

/// In-memory policy rule store.
#[derive(Debug, Default)]
pub struct MemoryPolicyStore {
    rules: DashMap<u64, PolicyRule>,
    next_id: AtomicU64,
}

impl MemoryPolicyStore {
    /// Create an empty rule store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` when no rules are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[async_trait]
impl PolicyStore for MemoryPolicyStore {
    async fn rules_with_object_prefix(&self, prefix: &str) -> Result<Vec<PolicyRule>> {
        let mut rules: Vec<PolicyRule> = self
            .rules
            .iter()
            .filter(|rule| rule.v1.starts_with(prefix))
            .map(|rule| rule.value().clone())
            .collect();
        rules.sort_by_key(|rule| rule.id);
        Ok(rules)
    }

    async fn add_rule(&self, mut rule: PolicyRule) -> Result<PolicyRule> {
        if rule.id.value() == 0 {
            rule.id = Id(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        }
        self.rules.insert(rule.id.value(), rule.clone());
        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_take_round_trip() {
        let store = MemoryScopeStore::new();
        let scope = OAuth2Scope::new("read", "Read");
        store.create(&scope).await.unwrap();

        let back = store.take(&Code::new("read")).await.unwrap();
        assert_eq!(back, scope);
        assert_eq!(store.stats().takes(), 1);
    }

    #[tokio::test]
    async fn test_create_duplicate_is_conflict() {
        let store = MemoryScopeStore::new();
        store.create(&OAuth2Scope::new("read", "Read")).await.unwrap();
        let err = store.create(&OAuth2Scope::new("read", "Read again")).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_take_missing_is_not_found() {
        let store = MemoryScopeStore::new();
        let err = store.take(&Code::new("absent")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_save_and_delete_require_existing_row() {
        let store = MemoryResourceStore::new();
        assert!(store.save(&Resource::new(Id(1), "api")).await.unwrap_err().is_not_found());
        assert!(store.delete(&Id(1)).await.unwrap_err().is_not_found());

        store.create(&Resource::new(Id(1), "api")).await.unwrap();
        store.save(&Resource::new(Id(1), "renamed")).await.unwrap();
        assert_eq!(store.take(&Id(1)).await.unwrap().name, "renamed");

        store.delete(&Id(1)).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_scan_page_is_newest_first() {
        let store = MemoryOrganizationStore::new();
        for n in 1..=5 {
            store.create(&Organization::new(Id(n), format!("org-{n}"))).await.unwrap();
        }

        let page = store.scan_page(0, 2).await.unwrap();
        assert_eq!(page.iter().map(|o| o.id).collect::<Vec<_>>(), vec![Id(5), Id(4)]);

        let next = store.scan_page(2, 2).await.unwrap();
        assert_eq!(next.iter().map(|o| o.id).collect::<Vec<_>>(), vec![Id(3), Id(2)]);
    }

    #[tokio::test]
    async fn test_scope_code_scans() {
        let store = MemoryScopeStore::new();
        store.create(&OAuth2Scope::new("write", "Write").with_kind(ScopeKind::Advanced))
            .await
            .unwrap();
        store.create(&OAuth2Scope::new("read", "Read")).await.unwrap();
        store.create(&OAuth2Scope::new("openid", "OpenID")).await.unwrap();

        let codes = store.scan_codes().await.unwrap();
        assert_eq!(codes, vec![Code::new("openid"), Code::new("read"), Code::new("write")]);

        let basic = store.scan_codes_of_kind(ScopeKind::Basic).await.unwrap();
        assert_eq!(basic, vec![Code::new("openid"), Code::new("read")]);
    }

    #[tokio::test]
    async fn test_delete_many_skips_missing_ids() {
        let store = MemoryResourceStore::new();
        store.create(&Resource::new(Id(1), "a")).await.unwrap();
        store.create(&Resource::new(Id(2), "b")).await.unwrap();

        store.delete_many(&[Id(1), Id(99)]).await.unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.take(&Id(2)).await.is_ok());
    }

    #[tokio::test]
    async fn test_policy_store_prefix_query() {
        let store = MemoryPolicyStore::new();
        store
            .add_rule(PolicyRule::policy(Id(0), "role:admin", "resource:1:/users", "GET"))
            .await
            .unwrap();
        store
            .add_rule(PolicyRule::policy(Id(0), "role:admin", "resource:12:/users", "GET"))
            .await
            .unwrap();

        // Coarse prefix match: both rows share the literal prefix. The
        // resolver narrows this down.
        let rules = store.rules_with_object_prefix("resource:1").await.unwrap();
        assert_eq!(rules.len(), 2);
    }
}
