use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use fv_service::QueryLimits;
use fv_store::{JournalConfig, SyncMode};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Journal file. `None` keeps features in memory only.
    pub data_path: Option<PathBuf>,
    /// fsync the journal after every write.
    pub fsync: bool,
    /// Features per list page.
    pub page_size: usize,
    /// Length of the top-voted and recent lists when no `limit` is given.
    pub default_limit: usize,
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let limits = QueryLimits::default();
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            data_path: None,
            fsync: false,
            page_size: limits.page_size,
            default_limit: limits.default_limit,
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file. Keys missing from the file take defaults.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> ServerResult<String> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.page_size == 0 {
            return Err(ServerError::Config("page_size must be at least 1".into()));
        }
        Ok(())
    }

    pub fn query_limits(&self) -> QueryLimits {
        QueryLimits {
            page_size: self.page_size,
            default_limit: self.default_limit,
        }
    }

    pub fn journal_config(&self) -> JournalConfig {
        JournalConfig {
            sync_mode: if self.fsync { SyncMode::EveryWrite } else { SyncMode::OsDefault },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    /// Accept any origin; overrides `allowed_origins`.
    pub allow_any_origin: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".into(), "http://127.0.0.1:3000".into()],
            allow_any_origin: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(c.page_size, 20);
        assert_eq!(c.default_limit, 10);
        assert!(c.data_path.is_none());
        assert!(!c.cors.allow_any_origin);
        c.validate().unwrap();
    }

    #[test]
    fn partial_toml_takes_defaults() {
        let c = ServerConfig::from_toml(
            r#"
            bind_addr = "0.0.0.0:9000"
            data_path = "/var/lib/featurevote/features.journal"

            [cors]
            allow_any_origin = true
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 9000);
        assert_eq!(c.data_path, Some(PathBuf::from("/var/lib/featurevote/features.journal")));
        assert_eq!(c.page_size, 20);
        assert!(c.cors.allow_any_origin);
        assert_eq!(c.cors.allowed_origins.len(), 2);
    }

    #[test]
    fn toml_round_trip() {
        let c = ServerConfig {
            data_path: Some("features.journal".into()),
            fsync: true,
            ..ServerConfig::default()
        };
        let text = c.to_toml().unwrap();
        assert_eq!(ServerConfig::from_toml(&text).unwrap(), c);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = ServerConfig::from_toml("page_size = \"many\"").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn validate_rejects_zero_page_size() {
        let zero = ServerConfig {
            page_size: 0,
            ..ServerConfig::default()
        };
        assert!(matches!(zero.validate(), Err(ServerError::Config(_))));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("featurevote.toml");
        std::fs::write(&path, "default_limit = 3\n").unwrap();
        let c = ServerConfig::load(&path).unwrap();
        assert_eq!(c.default_limit, 3);
        assert_eq!(c.query_limits().default_limit, 3);
    }

    #[test]
    fn journal_sync_mode_follows_fsync() {
        let c = ServerConfig {
            fsync: true,
            ..ServerConfig::default()
        };
        assert_eq!(c.journal_config().sync_mode, SyncMode::EveryWrite);
        assert_eq!(ServerConfig::default().journal_config().sync_mode, SyncMode::OsDefault);
    }
}
