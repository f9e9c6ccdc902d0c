use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use fv_types::{fold_title, Feature, FeatureChanges, FeatureDraft, FeatureId, VoteDirection};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::traits::{FeatureQuery, QueryResult};

/// A state change to the feature table.
///
/// Mutations are what the journal records. Replaying them in order
/// rebuilds the table exactly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    Inserted(Feature),
    Replaced(Feature),
    Removed(FeatureId),
    /// Raise the id sequence floor. Written by compaction so that ids of
    /// deleted features are not handed out again after a restart.
    Sequence(FeatureId),
}

/// Unlocked feature table with a case-folded title index.
///
/// `prepare_*` methods check a change against the current state without
/// applying it; [`FeatureTable::apply`] commits it. Callers hold a lock
/// across both steps.
#[derive(Clone, Debug)]
pub struct FeatureTable {
    features: BTreeMap<FeatureId, Feature>,
    titles: HashMap<String, FeatureId>,
    next_id: FeatureId,
}

impl FeatureTable {
    pub fn new() -> Self {
        Self {
            features: BTreeMap::new(),
            titles: HashMap::new(),
            next_id: FeatureId::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(&id)
    }

    /// The id the next insert will receive.
    pub fn next_id(&self) -> FeatureId {
        self.next_id
    }

    /// Owner of `title` under case-insensitive comparison, if any.
    pub fn title_owner(&self, title: &str) -> Option<FeatureId> {
        self.titles.get(&fold_title(title)).copied()
    }

    pub fn prepare_insert(&self, draft: &FeatureDraft, now: DateTime<Utc>) -> StoreResult<Feature> {
        if self.title_owner(&draft.title).is_some() {
            return Err(StoreError::DuplicateTitle(draft.title.clone()));
        }
        Ok(Feature::new(self.next_id, &draft.title, &draft.description, now))
    }

    pub fn prepare_update(
        &self,
        id: FeatureId,
        changes: &FeatureChanges,
        now: DateTime<Utc>,
    ) -> StoreResult<Feature> {
        let mut feature = self.features.get(&id).cloned().ok_or(StoreError::NotFound(id))?;
        if let Some(title) = &changes.title {
            match self.title_owner(title) {
                Some(owner) if owner != id => return Err(StoreError::DuplicateTitle(title.clone())),
                _ => feature.title = title.clone(),
            }
        }
        if let Some(description) = &changes.description {
            feature.description = description.clone();
        }
        feature.updated_at = now;
        Ok(feature)
    }

    pub fn prepare_vote(
        &self,
        id: FeatureId,
        direction: VoteDirection,
        now: DateTime<Utc>,
    ) -> StoreResult<Feature> {
        let mut feature = self.features.get(&id).cloned().ok_or(StoreError::NotFound(id))?;
        feature.apply_vote(direction, now);
        Ok(feature)
    }

    /// Commit a mutation. Mutations are trusted: they were either prepared
    /// against this table or recovered from its journal.
    pub fn apply(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::Inserted(feature) | Mutation::Replaced(feature) => {
                if let Some(previous) = self.features.get(&feature.id) {
                    self.titles.remove(&previous.folded_title());
                }
                if feature.id >= self.next_id {
                    self.next_id = feature.id.next();
                }
                self.titles.insert(feature.folded_title(), feature.id);
                self.features.insert(feature.id, feature);
            }
            Mutation::Removed(id) => {
                if let Some(previous) = self.features.remove(&id) {
                    self.titles.remove(&previous.folded_title());
                }
            }
            Mutation::Sequence(floor) => {
                if floor > self.next_id {
                    self.next_id = floor;
                }
            }
        }
    }

    /// Mutations that rebuild this table from empty.
    pub fn snapshot(&self) -> Vec<Mutation> {
        std::iter::once(Mutation::Sequence(self.next_id))
            .chain(self.features.values().cloned().map(Mutation::Inserted))
            .collect()
    }

    pub fn query(&self, query: &FeatureQuery) -> QueryResult {
        let needle = query
            .search
            .as_deref()
            .map(str::to_lowercase)
            .filter(|needle| !needle.is_empty());

        let mut matched: Vec<Feature> = self
            .features
            .values()
            .filter(|f| needle.as_deref().map_or(true, |n| f.matches(n)))
            .cloned()
            .collect();
        query.order.sort(&mut matched);

        let total = matched.len();
        let features = matched
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();
        QueryResult { total, features }
    }
}

impl Default for FeatureTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fv_types::FeatureOrder;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn draft(title: &str) -> FeatureDraft {
        FeatureDraft {
            title: title.into(),
            description: format!("About {title}"),
        }
    }

    fn insert(table: &mut FeatureTable, title: &str, secs: i64) -> Feature {
        let feature = table.prepare_insert(&draft(title), at(secs)).unwrap();
        table.apply(Mutation::Inserted(feature.clone()));
        feature
    }

    #[test]
    fn ids_are_sequential() {
        let mut table = FeatureTable::new();
        assert_eq!(insert(&mut table, "First one", 1).id, FeatureId::new(1));
        assert_eq!(insert(&mut table, "Second one", 2).id, FeatureId::new(2));
        assert_eq!(table.next_id(), FeatureId::new(3));
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut table = FeatureTable::new();
        let f = insert(&mut table, "First one", 1);
        table.apply(Mutation::Removed(f.id));
        assert_eq!(insert(&mut table, "Second one", 2).id, FeatureId::new(2));
    }

    #[test]
    fn title_index_is_case_insensitive() {
        let mut table = FeatureTable::new();
        insert(&mut table, "Dark Mode", 1);
        assert!(matches!(
            table.prepare_insert(&draft("dark mode"), at(2)),
            Err(StoreError::DuplicateTitle(_))
        ));
        assert!(matches!(
            table.prepare_insert(&draft("DARK MODE"), at(2)),
            Err(StoreError::DuplicateTitle(_))
        ));
    }

    #[test]
    fn title_index_follows_renames_and_removals() {
        let mut table = FeatureTable::new();
        let f = insert(&mut table, "Dark Mode", 1);
        let changes = FeatureChanges {
            title: Some("Night Mode".into()),
            description: None,
        };
        let renamed = table.prepare_update(f.id, &changes, at(2)).unwrap();
        table.apply(Mutation::Replaced(renamed));

        assert_eq!(table.title_owner("night mode"), Some(f.id));
        assert_eq!(table.title_owner("dark mode"), None);

        table.apply(Mutation::Removed(f.id));
        assert_eq!(table.title_owner("night mode"), None);
    }

    #[test]
    fn update_allows_case_only_change_of_own_title() {
        let mut table = FeatureTable::new();
        let f = insert(&mut table, "Dark Mode", 1);
        let changes = FeatureChanges {
            title: Some("DARK MODE".into()),
            description: None,
        };
        let updated = table.prepare_update(f.id, &changes, at(5)).unwrap();
        assert_eq!(updated.title, "DARK MODE");
        assert_eq!(updated.updated_at, at(5));
        assert_eq!(updated.created_at, at(1));
    }

    #[test]
    fn update_rejects_other_records_title() {
        let mut table = FeatureTable::new();
        insert(&mut table, "Dark Mode", 1);
        let other = insert(&mut table, "Light Mode", 2);
        let changes = FeatureChanges {
            title: Some("dark MODE".into()),
            description: None,
        };
        assert!(matches!(
            table.prepare_update(other.id, &changes, at(3)),
            Err(StoreError::DuplicateTitle(_))
        ));
    }

    #[test]
    fn prepare_does_not_mutate() {
        let mut table = FeatureTable::new();
        let f = insert(&mut table, "Dark Mode", 1);
        table.prepare_vote(f.id, VoteDirection::Up, at(2)).unwrap();
        assert_eq!(table.get(f.id).unwrap().votes, 0);
    }

    #[test]
    fn missing_ids_are_not_found() {
        let table = FeatureTable::new();
        let id = FeatureId::new(9);
        assert!(matches!(
            table.prepare_vote(id, VoteDirection::Up, at(1)),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            table.prepare_update(id, &FeatureChanges::default(), at(1)),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn snapshot_rebuilds_table() {
        let mut table = FeatureTable::new();
        insert(&mut table, "First one", 1);
        let gone = insert(&mut table, "Second one", 2);
        table.apply(Mutation::Removed(gone.id));

        let mut rebuilt = FeatureTable::new();
        for m in table.snapshot() {
            rebuilt.apply(m);
        }
        assert_eq!(rebuilt.snapshot(), table.snapshot());
        assert_eq!(rebuilt.len(), 1);
        assert_eq!(rebuilt.next_id(), FeatureId::new(3));
    }

    #[test]
    fn query_search_order_and_window() {
        let mut table = FeatureTable::new();
        insert(&mut table, "Python bindings", 1);
        insert(&mut table, "Rust bindings", 2);
        insert(&mut table, "PYTHON notebooks", 3);

        let result = table.query(&FeatureQuery::all().search("python"));
        assert_eq!(result.total, 2);
        let titles: Vec<_> = result.features.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["PYTHON notebooks", "Python bindings"]);

        let window = table.query(&FeatureQuery::all().order(FeatureOrder::Recent).offset(1).limit(1));
        assert_eq!(window.total, 3);
        assert_eq!(window.features.len(), 1);
        assert_eq!(window.features[0].title, "Rust bindings");
    }

    #[test]
    fn empty_search_matches_everything() {
        let mut table = FeatureTable::new();
        insert(&mut table, "First one", 1);
        insert(&mut table, "Second one", 2);
        assert_eq!(table.query(&FeatureQuery::all().search("")).total, 2);
    }

    #[test]
    fn zero_limit_returns_nothing() {
        let mut table = FeatureTable::new();
        insert(&mut table, "First one", 1);
        let result = table.query(&FeatureQuery::all().limit(0));
        assert_eq!(result.total, 1);
        assert!(result.features.is_empty());
    }
}
