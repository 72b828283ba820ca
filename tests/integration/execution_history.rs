//! Integration tests for build avoidance over real trees and persistent history

use crate::integration::test_utils::write_tree;
use merkle_snapshots::execution::{ExecutionDecision, ExecutionOutcome, IncrementalExecution};
use merkle_snapshots::snapshot::{DirectorySnapshotter, WalkerConfig};
use merkle_snapshots::workspace::{
    identity_for_hash, DirectoryWorkspaceProvider, ExecutionHistoryStore,
    SledExecutionHistoryStore, WorkspaceProvider,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn open_provider(storage: &Path) -> DirectoryWorkspaceProvider {
    let history = SledExecutionHistoryStore::new(storage.join("history")).unwrap();
    DirectoryWorkspaceProvider::new(storage.join("workspaces"), history)
}

#[test]
fn test_unchanged_tree_is_up_to_date_across_reopen() {
    let sources = TempDir::new().unwrap();
    let storage = TempDir::new().unwrap();
    write_tree(
        sources.path(),
        &[("src/lib.txt", "fn main"), ("README", "hello")],
        &[],
    );
    let snapshotter = DirectorySnapshotter::new(WalkerConfig::default());

    {
        let provider = open_provider(storage.path());
        let execution = IncrementalExecution::new(&provider);
        let snapshot = snapshotter.snapshot(sources.path()).unwrap();

        let outcome = execution
            .execute("compile", snapshot.as_ref(), |_, workspace| {
                fs::write(workspace.join("artifact"), "compiled")
            })
            .unwrap();
        assert!(matches!(outcome, ExecutionOutcome::Succeeded { .. }));
        provider.execution_history_store().flush().unwrap();
    }

    let provider = open_provider(storage.path());
    let execution = IncrementalExecution::new(&provider);
    let snapshot = snapshotter.snapshot(sources.path()).unwrap();
    assert!(execution
        .check("compile", snapshot.as_ref())
        .unwrap()
        .is_up_to_date());
    assert!(storage
        .path()
        .join("workspaces")
        .join("compile")
        .join("artifact")
        .exists());

    fs::write(sources.path().join("README"), "changed").unwrap();
    let snapshot = snapshotter.snapshot(sources.path()).unwrap();
    match execution.check("compile", snapshot.as_ref()).unwrap() {
        ExecutionDecision::Changed { previous } => assert!(previous.successful),
        other => panic!("expected changed inputs, got {:?}", other),
    }
}

#[test]
fn test_identities_are_independent() {
    let sources = TempDir::new().unwrap();
    let storage = TempDir::new().unwrap();
    write_tree(sources.path(), &[("a.txt", "a")], &[]);

    let provider = open_provider(storage.path());
    let execution = IncrementalExecution::new(&provider);
    let snapshot = DirectorySnapshotter::new(WalkerConfig::default())
        .snapshot(sources.path())
        .unwrap();

    execution.record("lint", snapshot.as_ref()).unwrap();
    assert!(execution
        .check("lint", snapshot.as_ref())
        .unwrap()
        .is_up_to_date());
    assert_eq!(
        execution.check("test", snapshot.as_ref()).unwrap(),
        ExecutionDecision::NoHistory
    );
}

#[test]
fn test_content_addressed_identity() {
    let sources = TempDir::new().unwrap();
    let storage = TempDir::new().unwrap();
    write_tree(sources.path(), &[("input.txt", "data")], &[]);

    let provider = open_provider(storage.path());
    let snapshot = DirectorySnapshotter::new(WalkerConfig::default())
        .snapshot(sources.path())
        .unwrap()
        .unwrap();
    let identity = identity_for_hash("transform", snapshot.hash());

    let seen = provider
        .with_workspace(&identity, |id, dir| (id.to_string(), dir.to_path_buf()))
        .unwrap();
    assert_eq!(seen.0, identity);
    assert_eq!(seen.1, storage.path().join("workspaces").join(&identity));
    assert!(seen.1.is_dir());
    assert!(provider.cached_result::<String>(&identity).unwrap().is_none());
}

#[test]
fn test_invalid_identity_is_rejected_before_history() {
    let storage = TempDir::new().unwrap();
    let provider = open_provider(storage.path());
    let execution = IncrementalExecution::new(&provider);

    assert!(execution.check("../escape", None).is_err());
    assert!(execution.record("a/b", None).is_err());
    assert!(provider.with_workspace("", |_, _| ()).is_err());
}
