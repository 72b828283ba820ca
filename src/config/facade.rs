//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::xdg;
use super::SnapshotsConfig;
use config::ConfigError;
use std::path::{Path, PathBuf};

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Path of the global config file, when a home directory is known
    pub fn xdg_config_path() -> Option<PathBuf> {
        xdg::global_config_file()
    }

    /// Load configuration from files and environment.
    pub fn load(workspace_root: &Path) -> Result<SnapshotsConfig, ConfigError> {
        MergeService::load(workspace_root)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<SnapshotsConfig, ConfigError> {
        MergeService::load_from_file(path)
    }

    /// Create default configuration.
    pub fn default() -> SnapshotsConfig {
        SnapshotsConfig::default()
    }
}
