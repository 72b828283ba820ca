//! Location snapshot model
//!
//! Immutable result of a snapshot: every node, file or directory, carries a
//! digest. Directory digests are derived from the children by the builder and
//! are never supplied from the outside, so [`DirectorySnapshot`] can only be
//! assembled inside the crate.

use crate::snapshot::hasher::{HashFunction, MISSING_FILE_SIGNATURE};
use crate::types::Hash;
use std::cmp::Ordering;

/// How a filesystem entry was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessType {
    /// Reached directly
    Direct,
    /// Reached through a symbolic link
    ViaSymlink,
}

impl AccessType {
    pub fn via_symlink(is_symlink: bool) -> Self {
        if is_symlink {
            AccessType::ViaSymlink
        } else {
            AccessType::Direct
        }
    }
}

/// File metadata captured alongside a regular file's content hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    /// Length in bytes
    pub length: u64,
    /// Last modification time, milliseconds since the Unix epoch
    pub last_modified: i64,
}

/// Kind of terminal node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    RegularFile(FileMetadata),
    /// The path does not exist (or is a dangling link)
    Missing,
}

/// Snapshot of a single file or equivalent terminal node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSnapshot {
    absolute_path: String,
    name: String,
    access_type: AccessType,
    hash: Hash,
    kind: LeafKind,
}

impl LeafSnapshot {
    /// Snapshot of a regular file whose content hash was computed elsewhere
    pub fn regular_file(
        absolute_path: impl Into<String>,
        name: impl Into<String>,
        access_type: AccessType,
        content_hash: Hash,
        metadata: FileMetadata,
    ) -> Self {
        Self {
            absolute_path: absolute_path.into(),
            name: name.into(),
            access_type,
            hash: content_hash,
            kind: LeafKind::RegularFile(metadata),
        }
    }

    /// Snapshot of a path that does not exist
    ///
    /// All missing files share the `MISSING_FILE` signature digest.
    pub fn missing<H: HashFunction>(
        absolute_path: impl Into<String>,
        name: impl Into<String>,
        access_type: AccessType,
        hash_function: &H,
    ) -> Self {
        Self {
            absolute_path: absolute_path.into(),
            name: name.into(),
            access_type,
            hash: hash_function.signature(MISSING_FILE_SIGNATURE),
            kind: LeafKind::Missing,
        }
    }

    pub fn absolute_path(&self) -> &str {
        &self.absolute_path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn access_type(&self) -> AccessType {
        self.access_type
    }

    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    pub fn kind(&self) -> LeafKind {
        self.kind
    }
}

/// Snapshot of a directory and its ordered children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySnapshot {
    absolute_path: String,
    name: String,
    access_type: AccessType,
    hash: Hash,
    children: Box<[LocationSnapshot]>,
}

impl DirectorySnapshot {
    pub(crate) fn new(
        absolute_path: String,
        name: String,
        access_type: AccessType,
        hash: Hash,
        children: Vec<LocationSnapshot>,
    ) -> Self {
        Self {
            absolute_path,
            name,
            access_type,
            hash,
            children: children.into_boxed_slice(),
        }
    }

    pub fn absolute_path(&self) -> &str {
        &self.absolute_path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn access_type(&self) -> AccessType {
        self.access_type
    }

    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    /// Children in fold order (visit order or name order)
    pub fn children(&self) -> &[LocationSnapshot] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&LocationSnapshot> {
        self.children.iter().find(|child| child.name() == name)
    }

    /// Find a descendant by a `/`-separated path relative to this directory.
    ///
    /// Empty segments are ignored, so `"a//b/"` resolves like `"a/b"`.
    pub fn find(&self, relative_path: &str) -> Option<&LocationSnapshot> {
        let mut segments = relative_path.split('/').filter(|s| !s.is_empty());
        let first = segments.next()?;
        let mut current = self.child(first)?;
        for segment in segments {
            match current {
                LocationSnapshot::Directory(dir) => current = dir.child(segment)?,
                LocationSnapshot::Leaf(_) => return None,
            }
        }
        Some(current)
    }
}

/// A finished snapshot of one location: either a leaf or a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationSnapshot {
    Leaf(LeafSnapshot),
    Directory(DirectorySnapshot),
}

impl LocationSnapshot {
    pub fn name(&self) -> &str {
        match self {
            LocationSnapshot::Leaf(leaf) => leaf.name(),
            LocationSnapshot::Directory(dir) => dir.name(),
        }
    }

    pub fn absolute_path(&self) -> &str {
        match self {
            LocationSnapshot::Leaf(leaf) => leaf.absolute_path(),
            LocationSnapshot::Directory(dir) => dir.absolute_path(),
        }
    }

    pub fn access_type(&self) -> AccessType {
        match self {
            LocationSnapshot::Leaf(leaf) => leaf.access_type(),
            LocationSnapshot::Directory(dir) => dir.access_type(),
        }
    }

    pub fn hash(&self) -> &Hash {
        match self {
            LocationSnapshot::Leaf(leaf) => leaf.hash(),
            LocationSnapshot::Directory(dir) => dir.hash(),
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, LocationSnapshot::Directory(_))
    }

    pub fn as_directory(&self) -> Option<&DirectorySnapshot> {
        match self {
            LocationSnapshot::Directory(dir) => Some(dir),
            LocationSnapshot::Leaf(_) => None,
        }
    }

    /// Name order used when sorting children.
    ///
    /// `str` ordering compares UTF-8 bytes, which matches code point order
    /// and does not depend on the locale.
    pub fn by_name(a: &LocationSnapshot, b: &LocationSnapshot) -> Ordering {
        a.name().cmp(b.name())
    }

    /// Walk the hierarchy depth-first, in child order.
    pub fn accept<V: SnapshotHierarchyVisitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            LocationSnapshot::Leaf(leaf) => visitor.visit_leaf(leaf),
            LocationSnapshot::Directory(dir) => {
                if visitor.enter_directory(dir) == SnapshotVisitResult::SkipSubtree {
                    return;
                }
                for child in dir.children() {
                    child.accept(visitor);
                }
                visitor.exit_directory(dir);
            }
        }
    }

    pub fn stats(&self) -> SnapshotStats {
        let mut stats = SnapshotStats::default();
        self.accept(&mut stats);
        stats
    }
}

impl From<LeafSnapshot> for LocationSnapshot {
    fn from(leaf: LeafSnapshot) -> Self {
        LocationSnapshot::Leaf(leaf)
    }
}

impl From<DirectorySnapshot> for LocationSnapshot {
    fn from(dir: DirectorySnapshot) -> Self {
        LocationSnapshot::Directory(dir)
    }
}

/// Whether a visitor wants to descend into a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotVisitResult {
    Continue,
    SkipSubtree,
}

/// Depth-first visitor over a finished snapshot
pub trait SnapshotHierarchyVisitor {
    fn enter_directory(&mut self, _directory: &DirectorySnapshot) -> SnapshotVisitResult {
        SnapshotVisitResult::Continue
    }

    fn visit_leaf(&mut self, leaf: &LeafSnapshot);

    fn exit_directory(&mut self, _directory: &DirectorySnapshot) {}
}

/// Node counts for a snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotStats {
    pub directories: usize,
    pub files: usize,
    pub missing: usize,
}

impl SnapshotHierarchyVisitor for SnapshotStats {
    fn enter_directory(&mut self, _directory: &DirectorySnapshot) -> SnapshotVisitResult {
        self.directories += 1;
        SnapshotVisitResult::Continue
    }

    fn visit_leaf(&mut self, leaf: &LeafSnapshot) {
        match leaf.kind() {
            LeafKind::RegularFile(_) => self.files += 1,
            LeafKind::Missing => self.missing += 1,
        }
    }
}
