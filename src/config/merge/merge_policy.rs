//! Merge rules: defaults, override order, conflict handling.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Lists are left to serde defaults: a later source replaces a list whole.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("snapshot.follow_symlinks", false)?
        .set_default("snapshot.sorted_walk", true)?
        .set_default("snapshot.empty_directories", "include_empty_dirs")?
        .set_default("storage.workspaces_path", ".snapshots/workspaces")?
        .set_default("storage.history_path", ".snapshots/history")?
        .set_default("logging.level", "info")
}
