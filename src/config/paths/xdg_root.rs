//! XDG Base Directory utilities for workspace data management.

use crate::error::ApiError;
use std::path::{Component, Path, PathBuf};

/// Directory name used under the XDG config and data homes
pub const APP_DIR: &str = "merkle-snapshots";

/// Get XDG data home directory
///
/// Returns `$XDG_DATA_HOME` if set, otherwise defaults to `$HOME/.local/share`
pub fn data_home() -> Option<PathBuf> {
    if let Ok(xdg_data_home) = std::env::var("XDG_DATA_HOME") {
        return Some(PathBuf::from(xdg_data_home));
    }

    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".local").join("share"))
}

/// Get XDG config home directory
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise defaults to `$HOME/.config`
pub fn config_home() -> Option<PathBuf> {
    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home));
    }

    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config"))
}

/// Path of the global config file, `$XDG_CONFIG_HOME/merkle-snapshots/config.toml`
pub fn global_config_file() -> Option<PathBuf> {
    config_home().map(|home| home.join(APP_DIR).join("config.toml"))
}

/// Get the data directory for a specific workspace
///
/// Returns `$XDG_DATA_HOME/merkle-snapshots/<workspace_path>/`. The canonical
/// workspace path is mirrored as a directory structure, so
/// `/home/user/project` maps to `.../merkle-snapshots/home/user/project/`.
pub fn workspace_data_dir(workspace_root: &Path) -> Result<PathBuf, ApiError> {
    let data_home = data_home().ok_or_else(|| {
        ApiError::ConfigError(
            "Could not determine XDG data home directory (HOME not set)".to_string(),
        )
    })?;

    let canonical = dunce::canonicalize(workspace_root).map_err(|e| {
        ApiError::ConfigError(format!("Failed to canonicalize workspace path: {}", e))
    })?;

    let mut data_dir = data_home.join(APP_DIR);
    for component in canonical.components() {
        if let Component::Normal(name) = component {
            data_dir = data_dir.join(name);
        }
    }

    Ok(data_dir)
}
