//! Scan presentation: summary, tree listing, and JSON node encoding.

use super::to_pretty_json;
use crate::error::ApiError;
use crate::snapshot::{
    AccessType, DirectorySnapshot, LeafKind, LeafSnapshot, LocationSnapshot, ScanOutcome,
    SnapshotHierarchyVisitor, SnapshotVisitResult,
};
use crate::types::hash_to_hex;
use serde_json::{json, Value};
use std::path::Path;

pub fn format_scan_text(root: &Path, outcome: &ScanOutcome, tree: bool) -> String {
    let stats = &outcome.stats;
    let mut s = match &outcome.snapshot {
        Some(snapshot) => format!(
            "Snapshot of {}\n  Root hash: {}\n  Kind: {}",
            root.display(),
            hash_to_hex(snapshot.hash()),
            kind_label(snapshot)
        ),
        None => format!(
            "Snapshot of {}\n  No result: the root is an empty directory and empty directories are excluded",
            root.display()
        ),
    };
    s.push_str(&format!(
        "\n  Directories: {}\n  Files: {}\n  Missing: {}",
        stats.directories, stats.files, stats.missing
    ));
    if stats.excluded_directories > 0 {
        s.push_str(&format!(
            "\n  Excluded empty directories: {}",
            stats.excluded_directories
        ));
    }
    if stats.ignored > 0 {
        s.push_str(&format!("\n  Ignored entries: {}", stats.ignored));
    }
    if stats.skipped_symlinks + stats.skipped_special > 0 {
        s.push_str(&format!(
            "\n  Skipped: {} symlinks, {} special files",
            stats.skipped_symlinks, stats.skipped_special
        ));
    }
    if let (true, Some(snapshot)) = (tree, &outcome.snapshot) {
        s.push_str("\n\n");
        s.push_str(&render_tree(snapshot));
    }
    s
}

pub fn format_scan_json(root: &Path, outcome: &ScanOutcome, tree: bool) -> Result<String, ApiError> {
    let stats = &outcome.stats;
    let mut out = json!({
        "root": root.to_string_lossy(),
        "root_hash": outcome.snapshot.as_ref().map(|s| hash_to_hex(s.hash())),
        "stats": {
            "directories": stats.directories,
            "excluded_directories": stats.excluded_directories,
            "files": stats.files,
            "missing": stats.missing,
            "ignored": stats.ignored,
            "skipped_symlinks": stats.skipped_symlinks,
            "skipped_special": stats.skipped_special,
        },
    });
    if let (true, Some(snapshot)) = (tree, &outcome.snapshot) {
        out["tree"] = snapshot_json(snapshot);
    }
    to_pretty_json(&out)
}

/// Indented listing of every node with its digest
pub fn render_tree(snapshot: &LocationSnapshot) -> String {
    let mut renderer = TreeRenderer::default();
    snapshot.accept(&mut renderer);
    renderer.lines.join("\n")
}

#[derive(Default)]
struct TreeRenderer {
    lines: Vec<String>,
    depth: usize,
}

impl TreeRenderer {
    fn push(&mut self, name: &str, hash: &[u8; 32], suffix: &str) {
        self.lines.push(format!(
            "{}{}  {}{}",
            "  ".repeat(self.depth),
            name,
            hex::encode(&hash[..8]),
            suffix
        ));
    }
}

impl SnapshotHierarchyVisitor for TreeRenderer {
    fn enter_directory(&mut self, directory: &DirectorySnapshot) -> SnapshotVisitResult {
        let name = format!("{}/", directory.name());
        self.push(&name, directory.hash(), access_suffix(directory.access_type()));
        self.depth += 1;
        SnapshotVisitResult::Continue
    }

    fn visit_leaf(&mut self, leaf: &LeafSnapshot) {
        let suffix = match leaf.kind() {
            LeafKind::Missing => " (missing)",
            LeafKind::RegularFile(_) => access_suffix(leaf.access_type()),
        };
        self.push(leaf.name(), leaf.hash(), suffix);
    }

    fn exit_directory(&mut self, _directory: &DirectorySnapshot) {
        self.depth = self.depth.saturating_sub(1);
    }
}

fn access_suffix(access_type: AccessType) -> &'static str {
    match access_type {
        AccessType::Direct => "",
        AccessType::ViaSymlink => " (via symlink)",
    }
}

fn kind_label(snapshot: &LocationSnapshot) -> &'static str {
    match snapshot {
        LocationSnapshot::Directory(_) => "directory",
        LocationSnapshot::Leaf(leaf) => match leaf.kind() {
            LeafKind::RegularFile(_) => "file",
            LeafKind::Missing => "missing",
        },
    }
}

fn snapshot_json(snapshot: &LocationSnapshot) -> Value {
    let access = match snapshot.access_type() {
        AccessType::Direct => "direct",
        AccessType::ViaSymlink => "via_symlink",
    };
    let mut node = json!({
        "name": snapshot.name(),
        "path": snapshot.absolute_path(),
        "hash": hash_to_hex(snapshot.hash()),
        "type": kind_label(snapshot),
        "access": access,
    });
    match snapshot {
        LocationSnapshot::Directory(dir) => {
            node["children"] = Value::Array(dir.children().iter().map(snapshot_json).collect());
        }
        LocationSnapshot::Leaf(leaf) => {
            if let LeafKind::RegularFile(metadata) = leaf.kind() {
                node["length"] = json!(metadata.length);
                node["last_modified"] = json!(metadata.last_modified);
            }
        }
    }
    node
}
