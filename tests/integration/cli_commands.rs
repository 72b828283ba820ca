//! Integration tests for CLI routing through RunContext

use crate::integration::test_utils::{with_xdg_env, write_tree};
use clap::Parser;
use merkle_snapshots::cli::{Cli, RunContext};
use merkle_snapshots::config::xdg;
use serde_json::Value;
use tempfile::TempDir;

fn run(workspace: &std::path::Path, args: &[&str]) -> Result<String, String> {
    let workspace_arg = workspace.to_string_lossy().to_string();
    let mut argv = vec!["snapshots", "--workspace", workspace_arg.as_str()];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).map_err(|e| e.to_string())?;
    let context = RunContext::new(cli.workspace.clone(), cli.config.clone())
        .map_err(|e| merkle_snapshots::cli::map_error(&e))?;
    context
        .execute(&cli.command)
        .map_err(|e| merkle_snapshots::cli::map_error(&e))
}

#[test]
fn test_scan_json_reports_root_hash() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    write_tree(&workspace, &[("a.txt", "a"), ("sub/b.txt", "b")], &["empty"]);

    with_xdg_env(&test_dir, || {
        let out = run(&workspace, &["scan", "--format", "json", "--tree"]).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["root_hash"].as_str().unwrap().len(), 64);
        assert_eq!(value["stats"]["files"], 2);
        assert_eq!(value["tree"]["children"].as_array().unwrap().len(), 3);

        let excluded = run(&workspace, &["scan", "--format", "json", "--exclude-empty"]).unwrap();
        let excluded: Value = serde_json::from_str(&excluded).unwrap();
        assert_eq!(excluded["stats"]["excluded_directories"], 1);
        assert_ne!(excluded["root_hash"], value["root_hash"]);

        let unsorted =
            run(&workspace, &["scan", "--format", "json", "--unsorted-walk"]).unwrap();
        let unsorted: Value = serde_json::from_str(&unsorted).unwrap();
        assert_eq!(unsorted["root_hash"], value["root_hash"]);
    });
}

#[test]
fn test_scan_relative_path_and_text_tree() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    write_tree(&workspace, &[("sub/b.txt", "b")], &[]);

    with_xdg_env(&test_dir, || {
        let out = run(&workspace, &["scan", "sub", "--tree"]).unwrap();
        assert!(out.contains("Root hash:"));
        assert!(out.contains("Files: 1"));
        assert!(out.contains("  b.txt  "));
    });
}

#[test]
fn test_check_record_and_history_flow() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    write_tree(&workspace, &[("input.txt", "v1")], &[]);

    with_xdg_env(&test_dir, || {
        let first = run(&workspace, &["check", "--identity", "build", "--record"]).unwrap();
        assert!(first.contains("no execution history"));
        assert!(first.contains("Recorded inputs"));

        let second = run(&workspace, &["check", "--identity", "build"]).unwrap();
        assert!(second.contains("up to date"), "{}", second);

        std::fs::write(workspace.join("input.txt"), "v2").unwrap();
        let third = run(&workspace, &["check", "--identity", "build", "--format", "json"]).unwrap();
        let third: Value = serde_json::from_str(&third).unwrap();
        assert_eq!(third["status"], "changed");
        assert_eq!(third["up_to_date"], false);

        let shown = run(&workspace, &["history", "show", "--identity", "build"]).unwrap();
        assert!(shown.contains("Successful: true"));

        // History lives in the XDG data dir, not in the scanned tree
        let data_dir = xdg::workspace_data_dir(&workspace).unwrap();
        assert!(data_dir.join("history").exists());
        assert!(!workspace.join(".snapshots").exists());

        let cleared = run(&workspace, &["history", "clear", "--identity", "build"]).unwrap();
        assert!(cleared.starts_with("Cleared"));
        let shown = run(&workspace, &["history", "show", "--identity", "build"]).unwrap();
        assert_eq!(shown, "No execution history for build");
    });
}

#[test]
fn test_invalid_identity_maps_to_stable_message() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    write_tree(&workspace, &[("input.txt", "v1")], &[]);

    with_xdg_env(&test_dir, || {
        let err = run(&workspace, &["check", "--identity", "../up"]).unwrap_err();
        assert!(err.contains("single path component"), "{}", err);

        for args in [
            ["history", "show", "--identity", "../up"],
            ["history", "clear", "--identity", "a/b"],
        ] {
            let err = run(&workspace, &args).unwrap_err();
            assert!(err.contains("single path component"), "{}", err);
        }
    });
}

#[test]
fn test_missing_workspace_is_reported() {
    let test_dir = TempDir::new().unwrap();
    with_xdg_env(&test_dir, || {
        let err = run(&test_dir.path().join("absent"), &["scan"]).unwrap_err();
        assert!(err.starts_with("Path not found"), "{}", err);
    });
}
