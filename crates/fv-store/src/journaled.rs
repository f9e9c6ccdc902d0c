use std::path::Path;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use fv_types::{Feature, FeatureChanges, FeatureDraft, FeatureId, VoteDirection};
use tracing::info;

use crate::error::StoreResult;
use crate::journal::{Journal, JournalConfig};
use crate::table::{FeatureTable, Mutation};
use crate::traits::{FeatureQuery, FeatureStore, QueryResult};

/// Feature store that survives restarts.
///
/// The table lives in memory; every mutation is appended to a [`Journal`]
/// while the table's write lock is held, then applied. Opening the store
/// replays the journal.
pub struct JournaledFeatureStore {
    table: RwLock<FeatureTable>,
    journal: Journal,
}

impl JournaledFeatureStore {
    /// Open the journal at `path`, creating it if needed, and replay it.
    pub fn open(path: &Path, config: JournalConfig) -> StoreResult<Self> {
        let journal = Journal::open(path, config)?;
        let mutations = journal.recover()?;
        let replayed = mutations.len();

        let mut table = FeatureTable::new();
        for mutation in mutations {
            table.apply(mutation);
        }
        info!(
            path = %path.display(),
            records = replayed,
            features = table.len(),
            "feature journal replayed"
        );

        Ok(Self {
            table: RwLock::new(table),
            journal,
        })
    }

    /// Rewrite the journal to one record per live feature.
    pub fn compact(&self) -> StoreResult<()> {
        let table = self.table.write().expect("lock poisoned");
        let before = self.journal.offset();
        self.journal.rewrite(&table.snapshot())?;
        info!(
            features = table.len(),
            bytes_before = before,
            bytes_after = self.journal.offset(),
            "feature journal compacted"
        );
        Ok(())
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    fn commit(&self, table: &mut FeatureTable, mutation: Mutation) -> StoreResult<()> {
        self.journal.append(&mutation)?;
        table.apply(mutation);
        Ok(())
    }
}

impl FeatureStore for JournaledFeatureStore {
    fn insert(&self, draft: &FeatureDraft, now: DateTime<Utc>) -> StoreResult<Feature> {
        let mut table = self.table.write().expect("lock poisoned");
        let feature = table.prepare_insert(draft, now)?;
        self.commit(&mut table, Mutation::Inserted(feature.clone()))?;
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
        self.commit(&mut table, Mutation::Replaced(feature.clone()))?;
        Ok(feature)
    }

    fn apply_vote(&self, id: FeatureId, direction: VoteDirection, now: DateTime<Utc>) -> StoreResult<Feature> {
        let mut table = self.table.write().expect("lock poisoned");
        let feature = table.prepare_vote(id, direction, now)?;
        self.commit(&mut table, Mutation::Replaced(feature.clone()))?;
        Ok(feature)
    }

    fn delete(&self, id: FeatureId) -> StoreResult<bool> {
        let mut table = self.table.write().expect("lock poisoned");
        if table.get(id).is_none() {
            return Ok(false);
        }
        self.commit(&mut table, Mutation::Removed(id))?;
        Ok(true)
    }

    fn query(&self, query: &FeatureQuery) -> StoreResult<QueryResult> {
        let table = self.table.read().expect("lock poisoned");
        Ok(table.query(query))
    }

    fn count(&self) -> StoreResult<usize> {
        Ok(self.table.read().expect("lock poisoned").len())
    }
}

impl std::fmt::Debug for JournaledFeatureStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.table.read().expect("lock poisoned").len();
        f.debug_struct("JournaledFeatureStore")
            .field("journal", &self.journal)
            .field("feature_count", &count)
            .finish()
    }
}
