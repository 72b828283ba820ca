//! Configuration System
//!
//! Layered configuration for scans, workspace storage and logging. Sources are
//! merged in order: defaults, global file, workspace files, environment.

use crate::logging::LoggingConfig;
use crate::snapshot::WalkerConfig;
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod paths;
mod sources;
mod storage;

pub use facade::ConfigLoader;
pub use storage::{ResolvedStorage, StorageConfig};

/// XDG path helpers
pub mod xdg {
    pub use super::paths::xdg_root::*;
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotsConfig {
    /// Traversal settings
    #[serde(default)]
    pub snapshot: WalkerConfig,

    /// Workspace and history storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Snapshot(String),
    Storage(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Snapshot(msg) => write!(f, "Snapshot: {}", msg),
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl SnapshotsConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for pattern in &self.snapshot.ignore_patterns {
            if pattern.is_empty() {
                errors.push(ValidationError::Snapshot(
                    "Ignore patterns cannot be empty".to_string(),
                ));
            } else if pattern.contains('/') || pattern.contains('\\') {
                errors.push(ValidationError::Snapshot(format!(
                    "Ignore pattern '{}' must be a single entry name",
                    pattern
                )));
            }
        }

        if let Err(e) = self.storage.validate() {
            errors.push(ValidationError::Storage(e));
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Render this configuration as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
