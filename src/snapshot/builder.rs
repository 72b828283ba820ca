//! Merkle directory snapshot builder
//!
//! Folds a depth-first stream of directory-enter, leaf-visit and
//! directory-exit events into a single content-addressed tree. A directory's
//! digest is computed the moment it is exited, from the names and digests of
//! its children, so only the levels along the current path are held open.

use crate::error::SnapshotError;
use crate::snapshot::hasher::{compute_directory_hash, Blake3, HashFunction, DIRECTORY_SIGNATURE};
use crate::snapshot::node::{AccessType, DirectorySnapshot, LeafSnapshot, LocationSnapshot};
use crate::types::{hash_to_hex, Hash};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// What to do with a directory that collected no children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyDirectoryHandling {
    /// Fold to a snapshot with no children
    #[default]
    IncludeEmptyDirs,
    /// Drop the directory; nothing is added to the parent
    ExcludeEmptyDirs,
}

/// Order of children inside a folded directory, fixed per builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildOrdering {
    /// Sort by name before folding; digests do not depend on walk order
    SortByName,
    /// Keep the exact visit order; the driver guarantees determinism
    VisitOrder,
}

enum Level {
    Root { result: Option<LocationSnapshot> },
    Directory(DirectoryLevel),
}

struct DirectoryLevel {
    access_type: AccessType,
    absolute_path: String,
    name: String,
    children: Vec<LocationSnapshot>,
    empty_directory_handling: EmptyDirectoryHandling,
}

impl DirectoryLevel {
    fn fold<H: HashFunction>(
        mut self,
        ordering: ChildOrdering,
        hash_function: &H,
        dir_signature: &Hash,
    ) -> Option<DirectorySnapshot> {
        if self.empty_directory_handling == EmptyDirectoryHandling::ExcludeEmptyDirs
            && self.children.is_empty()
        {
            return None;
        }
        if ordering == ChildOrdering::SortByName {
            self.children.sort_by(LocationSnapshot::by_name);
        }
        let hash = compute_directory_hash(
            hash_function,
            dir_signature,
            self.children.iter().map(|child| (child.name(), child.hash())),
        );
        trace!(
            path = %self.absolute_path,
            children = self.children.len(),
            hash = %hash_to_hex(&hash),
            "Folded directory"
        );
        Some(DirectorySnapshot::new(
            self.absolute_path,
            self.name,
            self.access_type,
            hash,
            self.children,
        ))
    }
}

/// Stack-based folding state machine driven by a traversal
///
/// One builder serves exactly one traversal; [`result`](Self::result)
/// consumes it. The builder is not synchronized and must stay on one thread.
pub struct MerkleDirectorySnapshotBuilder<H: HashFunction = Blake3> {
    stack: Vec<Level>,
    ordering: ChildOrdering,
    hash_function: H,
    dir_signature: Hash,
}

impl MerkleDirectorySnapshotBuilder<Blake3> {
    /// Builder that sorts each directory's children by name
    pub fn sorting_required() -> Self {
        Self::with_hash_function(ChildOrdering::SortByName, Blake3)
    }

    /// Builder that keeps children in visit order
    pub fn no_sorting_required() -> Self {
        Self::with_hash_function(ChildOrdering::VisitOrder, Blake3)
    }
}

impl<H: HashFunction> MerkleDirectorySnapshotBuilder<H> {
    pub fn with_hash_function(ordering: ChildOrdering, hash_function: H) -> Self {
        let dir_signature = hash_function.signature(DIRECTORY_SIGNATURE);
        Self {
            stack: vec![Level::Root { result: None }],
            ordering,
            hash_function,
            dir_signature,
        }
    }

    /// Number of directories currently open
    pub fn depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }

    /// Open a directory; its children follow until the matching exit.
    ///
    /// `empty_directory_handling` applies to this directory's own fold only.
    pub fn enter_directory(
        &mut self,
        access_type: AccessType,
        absolute_path: impl Into<String>,
        name: impl Into<String>,
        empty_directory_handling: EmptyDirectoryHandling,
    ) {
        self.stack.push(Level::Directory(DirectoryLevel {
            access_type,
            absolute_path: absolute_path.into(),
            name: name.into(),
            children: Vec::new(),
            empty_directory_handling,
        }));
    }

    /// Open a directory taking its identity from an existing snapshot.
    pub fn enter_directory_snapshot(
        &mut self,
        directory: &DirectorySnapshot,
        empty_directory_handling: EmptyDirectoryHandling,
    ) {
        self.enter_directory(
            directory.access_type(),
            directory.absolute_path(),
            directory.name(),
            empty_directory_handling,
        );
    }

    /// Record a leaf as a child of the innermost open directory.
    pub fn visit_leaf(&mut self, snapshot: LeafSnapshot) -> Result<(), SnapshotError> {
        match self.stack.last_mut() {
            Some(Level::Directory(directory)) => {
                directory.children.push(snapshot.into());
                Ok(())
            }
            _ => Err(SnapshotError::OutsideOfRoot),
        }
    }

    /// Record a bare leaf as the whole traversal result.
    ///
    /// This is the traversal of a root that is itself a file.
    pub fn visit_root_leaf(&mut self, snapshot: LeafSnapshot) -> Result<(), SnapshotError> {
        let open_directories = self.depth();
        if open_directories > 0 {
            return Err(SnapshotError::NotAtRoot { open_directories });
        }
        self.collect_entry(snapshot.into())
    }

    /// Close the innermost directory and fold it.
    ///
    /// Returns `false` when the directory was excluded for being empty; in
    /// that case nothing is added to the parent.
    pub fn exit_directory(&mut self) -> Result<bool, SnapshotError> {
        let directory = match self.stack.pop() {
            Some(Level::Directory(directory)) => directory,
            Some(root @ Level::Root { .. }) => {
                self.stack.push(root);
                return Err(SnapshotError::OutsideOfRoot);
            }
            None => return Err(SnapshotError::OutsideOfRoot),
        };

        let path = directory.absolute_path.clone();
        match directory.fold(self.ordering, &self.hash_function, &self.dir_signature) {
            Some(snapshot) => {
                self.collect_entry(snapshot.into())?;
                Ok(true)
            }
            None => {
                debug!(path = %path, "Excluded empty directory");
                Ok(false)
            }
        }
    }

    /// Absolute path of the innermost open directory
    pub fn current_directory_path(&self) -> Option<&str> {
        match self.stack.last() {
            Some(Level::Directory(directory)) => Some(&directory.absolute_path),
            _ => None,
        }
    }

    /// Close the innermost directory without folding it.
    ///
    /// Its children are dropped and nothing is added to the parent. Used when
    /// a directory disappears after it was entered.
    pub fn abandon_directory(&mut self) -> Result<(), SnapshotError> {
        match self.stack.pop() {
            Some(Level::Directory(directory)) => {
                debug!(path = %directory.absolute_path, "Abandoned directory");
                Ok(())
            }
            Some(root @ Level::Root { .. }) => {
                self.stack.push(root);
                Err(SnapshotError::OutsideOfRoot)
            }
            None => Err(SnapshotError::OutsideOfRoot),
        }
    }

    /// True once every opened directory has been exited
    pub fn is_finished(&self) -> bool {
        self.depth() == 0
    }

    /// Take the finished snapshot.
    ///
    /// `Ok(None)` when nothing was collected. Open directories are an error;
    /// a partial tree is never returned.
    pub fn result(mut self) -> Result<Option<LocationSnapshot>, SnapshotError> {
        let open_directories = self.depth();
        if open_directories > 0 {
            return Err(SnapshotError::UnfinishedTraversal { open_directories });
        }
        match self.stack.pop() {
            Some(Level::Root { result }) => Ok(result),
            _ => Err(SnapshotError::OutsideOfRoot),
        }
    }

    fn collect_entry(&mut self, snapshot: LocationSnapshot) -> Result<(), SnapshotError> {
        match self.stack.last_mut() {
            Some(Level::Directory(directory)) => {
                directory.children.push(snapshot);
                Ok(())
            }
            Some(Level::Root { result }) => {
                if result.is_some() {
                    return Err(SnapshotError::MultipleRoots);
                }
                *result = Some(snapshot);
                Ok(())
            }
            None => Err(SnapshotError::OutsideOfRoot),
        }
    }
}
