use std::sync::RwLock;

use chrono::{DateTime, Utc};
use fv_types::{Feature, FeatureChanges, FeatureDraft, FeatureId, VoteDirection};

use crate::error::StoreResult;
use crate::table::{FeatureTable, Mutation};
use crate::traits::{FeatureQuery, FeatureStore, QueryResult};

/// In-memory feature store.
///
/// Intended for tests and embedding. The table sits behind a `RwLock`:
/// queries share the read lock, every mutation takes the write lock for
/// its whole check-then-apply sequence.
pub struct InMemoryFeatureStore {
    table: RwLock<FeatureTable>,
}

impl InMemoryFeatureStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(FeatureTable::new()),
        }
    }

    /// Number of features currently stored.
    pub fn len(&self) -> usize {
        self.table.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.table.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryFeatureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureStore for InMemoryFeatureStore {
    fn insert(&self, draft: &FeatureDraft, now: DateTime<Utc>) -> StoreResult<Feature> {
        let mut table = self.table.write().expect("lock poisoned");
        let feature = table.prepare_insert(draft, now)?;
        table.apply(Mutation::Inserted(feature.clone()));
        Ok(feature)
    }

    fn get(&self, id: FeatureId) -> StoreResult<Option<Feature>> {
        let table = self.table.read().expect("lock poisoned");
        Ok(table.get(id).cloned())
    }

    fn title_owner(&self, title: &str) -> StoreResult<Option<FeatureId>> {
        let table = self.table.read().expect("lock poisoned");
        Ok(table.title_owner(title))
    }

    fn update(&self, id: FeatureId, changes: &FeatureChanges, now: DateTime<Utc>) -> StoreResult<Feature> {
        let mut table = self.table.write().expect("lock poisoned");
        let feature = table.prepare_update(id, changes, now)?;
        table.apply(Mutation::Replaced(feature.clone()));
        Ok(feature)
    }

    fn apply_vote(&self, id: FeatureId, direction: VoteDirection, now: DateTime<Utc>) -> StoreResult<Feature> {
        let mut table = self.table.write().expect("lock poisoned");
        let feature = table.prepare_vote(id, direction, now)?;
        table.apply(Mutation::Replaced(feature.clone()));
        Ok(feature)
    }

    fn delete(&self, id: FeatureId) -> StoreResult<bool> {
        let mut table = self.table.write().expect("lock poisoned");
        if table.get(id).is_none() {
            return Ok(false);
        }
        table.apply(Mutation::Removed(id));
        Ok(true)
    }

    fn query(&self, query: &FeatureQuery) -> StoreResult<QueryResult> {
        let table = self.table.read().expect("lock poisoned");
        Ok(table.query(query))
    }

    fn count(&self) -> StoreResult<usize> {
        Ok(self.len())
    }
}

impl std::fmt::Debug for InMemoryFeatureStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryFeatureStore")
            .field("feature_count", &count)
            .finish()
    }
}
