use chrono::{DateTime, Utc};
use fv_types::{Feature, FeatureChanges, FeatureDraft, FeatureId, FeatureOrder, VoteDirection};

use crate::error::StoreResult;

/// Filter, order and window applied to the feature collection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeatureQuery {
    /// Case-insensitive substring matched against title or description.
    pub search: Option<String>,
    pub order: FeatureOrder,
    pub offset: usize,
    /// `None` returns everything after `offset`.
    pub limit: Option<usize>,
}

impl FeatureQuery {
    /// Every feature in default order.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn order(mut self, order: FeatureOrder) -> Self {
        self.order = order;
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A window of matching features plus the total match count.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryResult {
    /// Matches before `offset`/`limit` were applied.
    pub total: usize,
    pub features: Vec<Feature>,
}

/// Durable collection of features.
///
/// All implementations must satisfy these invariants:
/// - Ids are assigned by the store, strictly increasing, never reused.
/// - No two features share a title under case-insensitive comparison.
/// - `apply_vote` is an atomic read-modify-write: concurrent votes on one
///   feature are never lost.
/// - A failed operation leaves the collection unchanged.
pub trait FeatureStore: Send + Sync {
    /// Insert a new feature with zero votes, stamped with `now`.
    ///
    /// Returns `Err(DuplicateTitle)` if the title is taken.
    fn insert(&self, draft: &FeatureDraft, now: DateTime<Utc>) -> StoreResult<Feature>;

    /// Read a feature by id. Returns `Ok(None)` if it does not exist.
    fn get(&self, id: FeatureId) -> StoreResult<Option<Feature>>;

    /// Id of the feature holding `title` under case-insensitive comparison.
    fn title_owner(&self, title: &str) -> StoreResult<Option<FeatureId>>;

    /// Apply title/description changes and stamp `updated_at`.
    ///
    /// The uniqueness check ignores the feature being updated, so a
    /// case-only change of its own title succeeds.
    fn update(&self, id: FeatureId, changes: &FeatureChanges, now: DateTime<Utc>) -> StoreResult<Feature>;

    /// Apply one vote and stamp `updated_at`. Downvotes floor at zero.
    fn apply_vote(&self, id: FeatureId, direction: VoteDirection, now: DateTime<Utc>) -> StoreResult<Feature>;

    /// Delete a feature permanently. Returns `true` if it existed.
    fn delete(&self, id: FeatureId) -> StoreResult<bool>;

    /// Filter, sort and window the collection.
    fn query(&self, query: &FeatureQuery) -> StoreResult<QueryResult>;

    /// Number of stored features.
    fn count(&self) -> StoreResult<usize>;
}
