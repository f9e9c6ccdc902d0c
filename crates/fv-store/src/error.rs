use std::path::PathBuf;

use fv_types::FeatureId;

/// Errors from feature store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested feature was not found.
    #[error("feature not found: {0}")]
    NotFound(FeatureId),

    /// Another feature already holds this title (case-insensitive).
    #[error("duplicate title: {0}")]
    DuplicateTitle(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Another handle holds the journal's lock.
    #[error("journal {} is in use by another process", .0.display())]
    Locked(PathBuf),

    /// An append failed and its partial bytes could not be discarded.
    #[error("journal {} stopped accepting writes after a failed append", .0.display())]
    JournalFailed(PathBuf),

    /// The journal file could not be replaced during compaction.
    #[error("failed to replace journal at {path}: {reason}")]
    Compaction { path: PathBuf, reason: String },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
