//! Error types for the snapshot engine.

use thiserror::Error;

/// Traversal protocol violations raised by the snapshot builder.
///
/// These signal a broken traversal driver, never a transient condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("Outside of root: no directory is open to receive this entry")]
    OutsideOfRoot,

    #[error("Traversal unfinished: {open_directories} directories still open")]
    UnfinishedTraversal { open_directories: usize },

    #[error("Root already holds a snapshot; a traversal yields a single root")]
    MultipleRoots,

    #[error("Root leaf visited while {open_directories} directories are open")]
    NotAtRoot { open_directories: usize },
}

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid workspace identity: {0:?}")]
    InvalidIdentity(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Execution history error: {0}")]
    HistoryStore(String),

    #[error("Traversal failed: {0}")]
    Traversal(#[from] SnapshotError),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Top-level errors surfaced to the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Path not found: {0}")]
    PathNotFound(std::path::PathBuf),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<SnapshotError> for ApiError {
    fn from(err: SnapshotError) -> Self {
        ApiError::StorageError(StorageError::Traversal(err))
    }
}
