use std::sync::Arc;

use fv_service::{FeatureQueries, FeatureService};
use fv_store::{FeatureStore, InMemoryFeatureStore, JournaledFeatureStore};

use crate::config::ServerConfig;
use crate::error::ServerResult;

/// Shared handler state. Both services point at the same store.
#[derive(Clone, Debug)]
pub struct AppState {
    pub features: FeatureService,
    pub queries: FeatureQueries,
}

impl AppState {
    pub fn new(store: Arc<dyn FeatureStore>, config: &ServerConfig) -> Self {
        Self {
            features: FeatureService::new(store.clone()),
            queries: FeatureQueries::new(store, config.query_limits()),
        }
    }

    /// Open the store the config asks for: a journal at `data_path`, or
    /// memory when none is set.
    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        let store: Arc<dyn FeatureStore> = match &config.data_path {
            Some(path) => {
                tracing::info!(path = %path.display(), fsync = config.fsync, "opening feature journal");
                Arc::new(JournaledFeatureStore::open(path, config.journal_config())?)
            }
            None => {
                tracing::warn!("no data_path configured; features will not survive a restart");
                Arc::new(InMemoryFeatureStore::new())
            }
        };
        Ok(Self::new(store, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fv_types::FeatureInput;

    #[test]
    fn in_memory_by_default() {
        let state = AppState::from_config(&ServerConfig::default()).unwrap();
        assert_eq!(state.queries.list(None, None).unwrap().count, 0);
    }

    #[test]
    fn journaled_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            data_path: Some(dir.path().join("features.journal")),
            ..ServerConfig::default()
        };

        let id = {
            let state = AppState::from_config(&config).unwrap();
            let f = state.features.create(FeatureInput::new("Dark Mode", "Night theme")).unwrap();
            state.features.upvote(f.id).unwrap();
            f.id
        };

        let state = AppState::from_config(&config).unwrap();
        let f = state.features.get(id).unwrap();
        assert_eq!(f.title, "Dark Mode");
        assert_eq!(f.votes, 1);
    }
}
