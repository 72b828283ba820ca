//! Integration tests for filesystem snapshot determinism

use crate::integration::test_utils::write_tree;
use merkle_snapshots::snapshot::{
    DirectorySnapshotter, EmptyDirectoryHandling, LocationSnapshot, WalkerConfig,
};
use merkle_snapshots::types::Hash;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn root_hash(root: &Path, config: WalkerConfig) -> Option<Hash> {
    DirectorySnapshotter::new(config)
        .snapshot(root)
        .unwrap()
        .map(|snapshot| *snapshot.hash())
}

fn default_root_hash(root: &Path) -> Hash {
    root_hash(root, WalkerConfig::default()).unwrap()
}

fn sample_tree(root: &Path) {
    write_tree(
        root,
        &[
            ("file1.txt", "content1"),
            ("file2.txt", "content2"),
            ("dir1/file3.txt", "content3"),
            ("dir1/nested/file4.txt", "content4"),
        ],
        &["empty"],
    );
}

/// Test that the same filesystem produces the same root hash
#[test]
fn test_same_filesystem_same_root() {
    let temp_dir = TempDir::new().unwrap();
    sample_tree(temp_dir.path());

    assert_eq!(
        default_root_hash(temp_dir.path()),
        default_root_hash(temp_dir.path())
    );
}

/// Absolute paths are not hashed: identical trees in different places match
#[test]
fn test_location_independent_root() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    sample_tree(first.path());
    sample_tree(&second.path().join("elsewhere"));

    // The root's own name is not part of its digest either
    assert_eq!(
        default_root_hash(first.path()),
        default_root_hash(&second.path().join("elsewhere"))
    );
}

/// Test that file content changes produce different root hashes
#[test]
fn test_file_content_change_different_root() {
    let temp_dir = TempDir::new().unwrap();
    sample_tree(temp_dir.path());
    let before = default_root_hash(temp_dir.path());

    fs::write(temp_dir.path().join("dir1/nested/file4.txt"), "changed").unwrap();

    assert_ne!(before, default_root_hash(temp_dir.path()));
}

/// Test that renaming a file produces a different root hash
#[test]
fn test_rename_different_root() {
    let temp_dir = TempDir::new().unwrap();
    sample_tree(temp_dir.path());
    let before = default_root_hash(temp_dir.path());

    fs::rename(
        temp_dir.path().join("file1.txt"),
        temp_dir.path().join("file1-renamed.txt"),
    )
    .unwrap();

    assert_ne!(before, default_root_hash(temp_dir.path()));
}

/// Unchanged siblings keep their digests when one subtree changes
#[test]
fn test_unchanged_subtree_keeps_digest() {
    let temp_dir = TempDir::new().unwrap();
    sample_tree(temp_dir.path());
    let snapshotter = DirectorySnapshotter::new(WalkerConfig::default());
    let before = snapshotter.snapshot(temp_dir.path()).unwrap().unwrap();

    fs::write(temp_dir.path().join("file2.txt"), "changed").unwrap();
    let after = snapshotter.snapshot(temp_dir.path()).unwrap().unwrap();

    let dir1 = |snapshot: &LocationSnapshot| {
        *snapshot
            .as_directory()
            .unwrap()
            .find("dir1")
            .unwrap()
            .hash()
    };
    assert_eq!(dir1(&before), dir1(&after));
    assert_ne!(before.hash(), after.hash());
}

/// Adding an empty directory changes the root only when empties are kept
#[test]
fn test_empty_directory_policy() {
    let temp_dir = TempDir::new().unwrap();
    write_tree(temp_dir.path(), &[("a.txt", "a")], &[]);

    let exclude = WalkerConfig {
        empty_directories: EmptyDirectoryHandling::ExcludeEmptyDirs,
        ..WalkerConfig::default()
    };
    let include_before = default_root_hash(temp_dir.path());
    let exclude_before = root_hash(temp_dir.path(), exclude.clone());

    fs::create_dir_all(temp_dir.path().join("new/deeper")).unwrap();

    assert_ne!(include_before, default_root_hash(temp_dir.path()));
    assert_eq!(exclude_before, root_hash(temp_dir.path(), exclude));
}

/// Filesystem walk order does not matter when the builder sorts
#[test]
fn test_unsorted_walk_matches_sorted_walk() {
    let temp_dir = TempDir::new().unwrap();
    sample_tree(temp_dir.path());

    let unsorted = WalkerConfig {
        sorted_walk: false,
        ..WalkerConfig::default()
    };
    assert_eq!(
        root_hash(temp_dir.path(), unsorted),
        Some(default_root_hash(temp_dir.path()))
    );
}

/// Snapshot stats agree with the traversal counters
#[test]
fn test_snapshot_stats_match_scan_stats() {
    let temp_dir = TempDir::new().unwrap();
    sample_tree(temp_dir.path());

    let outcome = DirectorySnapshotter::new(WalkerConfig::default())
        .snapshot_with_stats(temp_dir.path())
        .unwrap();
    let snapshot = outcome.snapshot.unwrap();
    let stats = snapshot.stats();

    assert_eq!(stats.files, 4);
    assert_eq!(stats.files, outcome.stats.files);
    // root, dir1, dir1/nested, empty
    assert_eq!(stats.directories, 4);
    assert_eq!(stats.directories, outcome.stats.directories);
}
