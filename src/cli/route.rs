//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::command_name;
use crate::cli::parse::{Commands, ConfigCommands, HistoryCommands};
use crate::cli::presentation::{
    format_decision_json, format_decision_text, format_history_json, format_history_text,
    format_scan_json, format_scan_text,
};
use crate::config::{xdg, ConfigLoader, ResolvedStorage, SnapshotsConfig};
use crate::error::{ApiError, StorageError};
use crate::execution::IncrementalExecution;
use crate::snapshot::{DirectorySnapshotter, EmptyDirectoryHandling, WalkerConfig};
use crate::workspace::{
    validate_identity, DirectoryWorkspaceProvider, ExecutionHistoryStore,
    SledExecutionHistoryStore, WorkspaceProvider,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, info_span};

/// Runtime context for CLI execution: workspace, effective config, and storage paths.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config_path: Option<PathBuf>,
    config: SnapshotsConfig,
    storage: ResolvedStorage,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        if !workspace_root.exists() {
            return Err(ApiError::PathNotFound(workspace_root));
        }

        let config = if let Some(ref cfg_path) = config_path {
            if cfg_path.exists() {
                ConfigLoader::load_from_file(cfg_path)?
            } else {
                // `config init --config <path>` targets a file that is not there yet
                ConfigLoader::load(&workspace_root)?
            }
        } else {
            ConfigLoader::load(&workspace_root)?
        };

        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;

        let storage = config.storage.resolve_paths(&workspace_root)?;

        Ok(Self {
            workspace_root,
            config_path,
            config,
            storage,
        })
    }

    /// Effective configuration after all sources were merged.
    pub fn config(&self) -> &SnapshotsConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let name = command_name(command);
        let _span = info_span!("command", command = %name).entered();
        let started = Instant::now();
        let result = self.execute_inner(command);
        info!(
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis(),
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Scan {
                path,
                format,
                tree,
                exclude_empty,
                include_empty,
                unsorted_walk,
            } => {
                let mut walker_config = self.walker_config();
                if *exclude_empty {
                    walker_config.empty_directories = EmptyDirectoryHandling::ExcludeEmptyDirs;
                } else if *include_empty {
                    walker_config.empty_directories = EmptyDirectoryHandling::IncludeEmptyDirs;
                }
                if *unsorted_walk {
                    walker_config.sorted_walk = false;
                }

                let root = self.resolve_target(path.as_deref());
                let outcome = DirectorySnapshotter::new(walker_config).snapshot_with_stats(&root)?;
                if format == "json" {
                    format_scan_json(&root, &outcome, *tree)
                } else {
                    Ok(format_scan_text(&root, &outcome, *tree))
                }
            }
            Commands::Check {
                path,
                identity,
                record,
                format,
            } => self.handle_check(path.as_deref(), identity, *record, format),
            Commands::History { command } => self.handle_history_command(command),
            Commands::Config { command } => self.handle_config_command(command),
        }
    }

    fn handle_check(
        &self,
        path: Option<&Path>,
        identity: &str,
        record: bool,
        format: &str,
    ) -> Result<String, ApiError> {
        let root = self.resolve_target(path);
        let snapshot = self.snapshotter().snapshot(&root)?;
        let provider = self.open_provider()?;
        let execution = IncrementalExecution::new(&provider);

        let decision = execution.check(identity, snapshot.as_ref())?;
        let recorded = if record {
            Some(execution.record(identity, snapshot.as_ref())?)
        } else {
            None
        };
        provider.execution_history_store().flush()?;

        if format == "json" {
            format_decision_json(identity, &decision, recorded.as_ref())
        } else {
            Ok(format_decision_text(identity, &decision, recorded.as_ref()))
        }
    }

    fn handle_history_command(&self, command: &HistoryCommands) -> Result<String, ApiError> {
        let identity = match command {
            HistoryCommands::Show { identity, .. } | HistoryCommands::Clear { identity } => identity,
        };
        validate_identity(identity)?;
        let provider = self.open_provider()?;
        let history = provider.execution_history_store();
        match command {
            HistoryCommands::Show { identity, format } => {
                let record = history.load(identity)?;
                if format == "json" {
                    format_history_json(identity, record.as_ref())
                } else {
                    Ok(format_history_text(identity, record.as_ref()))
                }
            }
            HistoryCommands::Clear { identity } => {
                let removed = history.remove(identity)?;
                history.flush()?;
                Ok(if removed {
                    format!("Cleared execution history for {}", identity)
                } else {
                    format!("No execution history for {}", identity)
                })
            }
        }
    }

    fn handle_config_command(&self, command: &ConfigCommands) -> Result<String, ApiError> {
        match command {
            ConfigCommands::Init { force } => {
                let target = match &self.config_path {
                    Some(path) => path.clone(),
                    None => xdg::global_config_file().ok_or_else(|| {
                        ApiError::ConfigError(
                            "Could not determine config home directory (HOME not set)"
                                .to_string(),
                        )
                    })?,
                };
                if target.exists() && !force {
                    return Err(ApiError::ConfigError(format!(
                        "Configuration file already exists at {}. Use --force to overwrite.",
                        target.display()
                    )));
                }
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent).map_err(StorageError::from)?;
                }
                let rendered = render_toml(&SnapshotsConfig::default())?;
                std::fs::write(&target, rendered).map_err(StorageError::from)?;
                info!(path = %target.display(), "Wrote default configuration");
                Ok(format!("Wrote default configuration to {}", target.display()))
            }
            ConfigCommands::Show => render_toml(&self.config),
        }
    }

    fn snapshotter(&self) -> DirectorySnapshotter {
        DirectorySnapshotter::new(self.walker_config())
    }

    fn walker_config(&self) -> WalkerConfig {
        self.config.snapshot.clone()
    }

    /// Relative targets resolve against the workspace root.
    fn resolve_target(&self, path: Option<&Path>) -> PathBuf {
        match path {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => self.workspace_root.join(path),
            None => self.workspace_root.clone(),
        }
    }

    fn open_provider(&self) -> Result<DirectoryWorkspaceProvider, ApiError> {
        std::fs::create_dir_all(&self.storage.workspaces_dir).map_err(StorageError::from)?;
        if let Some(parent) = self.storage.history_db.parent() {
            std::fs::create_dir_all(parent).map_err(StorageError::from)?;
        }
        let history = SledExecutionHistoryStore::new(&self.storage.history_db)?;
        Ok(DirectoryWorkspaceProvider::new(
            self.storage.workspaces_dir.clone(),
            history,
        ))
    }
}

fn render_toml(config: &SnapshotsConfig) -> Result<String, ApiError> {
    config
        .to_toml()
        .map_err(|e| ApiError::ConfigError(format!("Failed to render configuration: {}", e)))
}
