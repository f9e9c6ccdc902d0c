use std::sync::Arc;

use fv_store::FeatureStore;
use fv_types::validation::{check_title, FIELD_TITLE, MSG_DUPLICATE_TITLE};
use fv_types::{Feature, FeatureChanges, FeatureId, FeatureInput, FieldErrors, VoteDirection};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::error::{ServiceError, ServiceResult};

/// How an update treats absent fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateMode {
    /// Every field is required (PUT).
    Full,
    /// Absent fields keep their stored value (PATCH).
    Partial,
}

/// Write-side operations on features.
#[derive(Clone)]
pub struct FeatureService {
    store: Arc<dyn FeatureStore>,
    clock: Arc<dyn Clock>,
}

impl FeatureService {
    pub fn new(store: Arc<dyn FeatureStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(store: Arc<dyn FeatureStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn get(&self, id: FeatureId) -> ServiceResult<Feature> {
        self.store.get(id)?.ok_or(ServiceError::NotFound(id))
    }

    /// Validate and insert a new feature with zero votes.
    pub fn create(&self, input: FeatureInput) -> ServiceResult<Feature> {
        let title = input.title.clone();
        let draft = match input.into_draft() {
            Ok(draft) => draft,
            Err(errors) => return Err(self.with_title_conflict(errors, title.as_deref(), None)?),
        };

        let feature = self.store.insert(&draft, self.clock.now())?;
        info!(id = %feature.id, title = %feature.title, "feature created");
        Ok(feature)
    }

    /// Validate and apply title/description changes.
    pub fn update(&self, id: FeatureId, input: FeatureInput, mode: UpdateMode) -> ServiceResult<Feature> {
        // Absent ids are reported before field errors.
        self.get(id)?;

        let title = input.title.clone();
        let validated = match mode {
            UpdateMode::Full => input.into_draft().map(FeatureChanges::from),
            UpdateMode::Partial => input.into_changes(),
        };
        let changes = match validated {
            Ok(changes) => changes,
            Err(errors) => return Err(self.with_title_conflict(errors, title.as_deref(), Some(id))?),
        };

        let feature = self.store.update(id, &changes, self.clock.now())?;
        info!(id = %feature.id, "feature updated");
        Ok(feature)
    }

    pub fn upvote(&self, id: FeatureId) -> ServiceResult<Feature> {
        self.vote(id, VoteDirection::Up)
    }

    pub fn downvote(&self, id: FeatureId) -> ServiceResult<Feature> {
        self.vote(id, VoteDirection::Down)
    }

    /// Apply one vote as a single atomic store operation.
    pub fn vote(&self, id: FeatureId, direction: VoteDirection) -> ServiceResult<Feature> {
        let feature = self.store.apply_vote(id, direction, self.clock.now())?;
        debug!(id = %id, %direction, votes = feature.votes, "vote applied");
        Ok(feature)
    }

    pub fn delete(&self, id: FeatureId) -> ServiceResult<()> {
        if !self.store.delete(id)? {
            return Err(ServiceError::NotFound(id));
        }
        info!(id = %id, "feature deleted");
        Ok(())
    }

    /// Field errors plus a duplicate-title error when the submitted title
    /// was otherwise valid but belongs to another feature.
    fn with_title_conflict(
        &self,
        mut errors: FieldErrors,
        raw_title: Option<&str>,
        updating: Option<FeatureId>,
    ) -> ServiceResult<ServiceError> {
        if !errors.contains(FIELD_TITLE) {
            if let Some(title) = raw_title.and_then(|raw| check_title(raw).ok()) {
                match self.store.title_owner(&title)? {
                    Some(owner) if Some(owner) != updating => errors.add(FIELD_TITLE, MSG_DUPLICATE_TITLE),
                    _ => {}
                }
            }
        }
        Ok(ServiceError::Validation(errors))
    }
}

impl std::fmt::Debug for FeatureService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureService").finish_non_exhaustive()
    }
}
