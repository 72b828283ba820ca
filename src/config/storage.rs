//! StorageConfig and path resolution for workspaces and execution history.

use crate::config::xdg;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_WORKSPACES_PATH: &str = ".snapshots/workspaces";
const DEFAULT_HISTORY_PATH: &str = ".snapshots/history";

fn default_workspaces_path() -> PathBuf {
    PathBuf::from(DEFAULT_WORKSPACES_PATH)
}

fn default_history_path() -> PathBuf {
    PathBuf::from(DEFAULT_HISTORY_PATH)
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one workspace per identity (relative to workspace root)
    #[serde(default = "default_workspaces_path")]
    pub workspaces_path: PathBuf,

    /// Execution history database (relative to workspace root)
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
}

/// Storage locations after resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStorage {
    pub workspaces_dir: PathBuf,
    pub history_db: PathBuf,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.workspaces_path.as_os_str().is_empty() {
            return Err("Workspaces path cannot be empty".to_string());
        }
        if self.history_path.as_os_str().is_empty() {
            return Err("History path cannot be empty".to_string());
        }
        Ok(())
    }

    /// Resolve storage paths to actual filesystem locations.
    ///
    /// Default paths live in the XDG data directory of the workspace, so scans
    /// never write into the tree being snapshotted. Custom paths are taken
    /// relative to the workspace root.
    pub fn resolve_paths(&self, workspace_root: &Path) -> Result<ResolvedStorage, ApiError> {
        let workspaces_dir = if self.workspaces_path == default_workspaces_path() {
            xdg::workspace_data_dir(workspace_root)?.join("workspaces")
        } else {
            workspace_root.join(&self.workspaces_path)
        };

        let history_db = if self.history_path == default_history_path() {
            xdg::workspace_data_dir(workspace_root)?.join("history")
        } else {
            workspace_root.join(&self.history_path)
        };

        Ok(ResolvedStorage {
            workspaces_dir,
            history_db,
        })
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            workspaces_path: default_workspaces_path(),
            history_path: default_history_path(),
        }
    }
}
