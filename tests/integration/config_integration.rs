//! Integration tests for layered configuration and `config` commands

use crate::integration::test_utils::{with_xdg_env, write_tree};
use clap::Parser;
use merkle_snapshots::cli::{Cli, RunContext};
use merkle_snapshots::config::{xdg, ConfigLoader, StorageConfig};
use merkle_snapshots::snapshot::EmptyDirectoryHandling;
use std::path::PathBuf;
use tempfile::TempDir;

fn execute(argv: &[&str]) -> Result<String, String> {
    let cli = Cli::try_parse_from(argv).map_err(|e| e.to_string())?;
    let context =
        RunContext::new(cli.workspace.clone(), cli.config.clone()).map_err(|e| e.to_string())?;
    context.execute(&cli.command).map_err(|e| e.to_string())
}

#[test]
fn test_config_init_writes_global_file_once() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    std::fs::create_dir_all(&workspace).unwrap();
    let ws = workspace.to_string_lossy().to_string();

    with_xdg_env(&test_dir, || {
        let out = execute(&["snapshots", "--workspace", &ws, "config", "init"]).unwrap();
        let global = xdg::global_config_file().unwrap();
        assert_eq!(global, test_dir.path().join("config/merkle-snapshots/config.toml"));
        assert!(out.contains(&global.display().to_string()));

        let loaded = ConfigLoader::load_from_file(&global).unwrap();
        assert_eq!(loaded.snapshot.ignore_patterns, vec![".git".to_string()]);

        let again = execute(&["snapshots", "--workspace", &ws, "config", "init"]).unwrap_err();
        assert!(again.contains("--force"));
        assert!(execute(&["snapshots", "--workspace", &ws, "config", "init", "--force"]).is_ok());
    });
}

#[test]
fn test_environment_overrides_files() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    write_tree(
        &workspace,
        &[(
            "config/config.toml",
            "[snapshot]\nempty_directories = \"include_empty_dirs\"\n",
        )],
        &[],
    );

    with_xdg_env(&test_dir, || {
        std::env::set_var(
            "SNAPSHOTS__SNAPSHOT__EMPTY_DIRECTORIES",
            "exclude_empty_dirs",
        );
        let config = ConfigLoader::load(&workspace);
        std::env::remove_var("SNAPSHOTS__SNAPSHOT__EMPTY_DIRECTORIES");

        assert_eq!(
            config.unwrap().snapshot.empty_directories,
            EmptyDirectoryHandling::ExcludeEmptyDirs
        );
    });
}

#[test]
fn test_env_specific_workspace_file() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    write_tree(
        &workspace,
        &[
            ("config/config.toml", "[snapshot]\nfollow_symlinks = false\n"),
            ("config/ci.toml", "[snapshot]\nfollow_symlinks = true\n"),
        ],
        &[],
    );

    with_xdg_env(&test_dir, || {
        std::env::set_var("SNAPSHOTS_ENV", "ci");
        let config = ConfigLoader::load(&workspace);
        std::env::remove_var("SNAPSHOTS_ENV");

        assert!(config.unwrap().snapshot.follow_symlinks);
    });
}

#[test]
fn test_default_storage_resolves_into_xdg_data_home() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    std::fs::create_dir_all(&workspace).unwrap();

    with_xdg_env(&test_dir, || {
        let resolved = StorageConfig::default().resolve_paths(&workspace).unwrap();
        let data_home = test_dir.path().join("data").join("merkle-snapshots");
        assert!(resolved.workspaces_dir.starts_with(&data_home));
        assert!(resolved.workspaces_dir.ends_with("ws/workspaces"));
        assert!(resolved.history_db.ends_with("ws/history"));
    });
}

#[test]
fn test_invalid_config_file_rejected() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    write_tree(
        &workspace,
        &[("bad.toml", "[snapshot]\nignore_patterns = [\"a/b\"]\n")],
        &[],
    );
    let ws = workspace.to_string_lossy().to_string();
    let config: PathBuf = workspace.join("bad.toml");
    let config = config.to_string_lossy().to_string();

    with_xdg_env(&test_dir, || {
        let err = execute(&["snapshots", "--workspace", &ws, "--config", &config, "scan"])
            .unwrap_err();
        assert!(err.contains("validation failed"), "{}", err);
    });
}
