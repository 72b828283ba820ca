//! Filesystem traversal driver
//!
//! Walks a directory tree with `walkdir` and drives a
//! [`MerkleDirectorySnapshotBuilder`] with well-nested enter / leaf / exit
//! events. File contents are hashed by a [`LeafHasher`].

use crate::error::StorageError;
use crate::snapshot::builder::{ChildOrdering, EmptyDirectoryHandling, MerkleDirectorySnapshotBuilder};
use crate::snapshot::hasher::{Blake3, HashFunction};
use crate::snapshot::node::{AccessType, FileMetadata, LeafKind, LeafSnapshot, LocationSnapshot};
use crate::snapshot::path;
use crate::types::{hash_to_hex, Hash};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::{Instant, UNIX_EPOCH};
use tracing::{debug, info, instrument, warn};
use walkdir::{DirEntry, WalkDir};

/// Traversal configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkerConfig {
    /// Whether to follow symbolic links (default: false)
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Entry names to prune, together with everything below them
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// Walk in file-name order and keep visit order in the builder.
    /// When false the builder sorts each directory instead.
    #[serde(default = "default_true")]
    pub sorted_walk: bool,

    /// Handling of directories without children
    #[serde(default)]
    pub empty_directories: EmptyDirectoryHandling,
}

fn default_ignore_patterns() -> Vec<String> {
    vec![".git".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            ignore_patterns: default_ignore_patterns(),
            sorted_walk: default_true(),
            empty_directories: EmptyDirectoryHandling::default(),
        }
    }
}

/// Supplies content digests for regular files
pub trait LeafHasher {
    fn hash_file(&self, path: &Path) -> std::io::Result<Hash>;
}

/// Hashes the full file content with a hash function
#[derive(Debug, Clone, Default)]
pub struct ContentLeafHasher<H: HashFunction = Blake3> {
    hash_function: H,
}

impl<H: HashFunction> ContentLeafHasher<H> {
    pub fn new(hash_function: H) -> Self {
        Self { hash_function }
    }
}

impl<H: HashFunction> LeafHasher for ContentLeafHasher<H> {
    fn hash_file(&self, path: &Path) -> std::io::Result<Hash> {
        let content = std::fs::read(path)?;
        Ok(self.hash_function.hash_bytes(&content))
    }
}

/// Counters collected during one traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub directories: usize,
    pub excluded_directories: usize,
    pub files: usize,
    pub missing: usize,
    pub skipped_symlinks: usize,
    pub skipped_special: usize,
    pub ignored: usize,
}

/// Result of one traversal
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// `None` when the root was an excluded empty directory
    pub snapshot: Option<LocationSnapshot>,
    pub stats: ScanStats,
}

/// The root as the caller named it, and the path actually walked
///
/// Symlinks in the root are resolved for the walk only. The recorded name,
/// path and access kind stay those of the caller's path.
#[derive(Debug, Clone)]
struct RootLocation {
    walk_path: PathBuf,
    recorded_root: PathBuf,
    name: String,
    access_type: AccessType,
}

impl RootLocation {
    fn resolve(root: &Path) -> Result<Self, StorageError> {
        let absolute = if root.is_absolute() {
            root.to_path_buf()
        } else {
            std::env::current_dir()?.join(root)
        };
        let is_symlink = std::fs::symlink_metadata(&absolute)
            .map(|metadata| metadata.file_type().is_symlink())
            .unwrap_or(false);
        // Let the walk report the root as missing
        let walk_path = path::canonicalize_root(&absolute).unwrap_or_else(|_| absolute.clone());
        // `.` components drop out when collected; roots with `..` are
        // recorded in their resolved form
        let lexical: PathBuf = absolute.components().collect();
        let recorded_root = if lexical
            .components()
            .any(|component| component == Component::ParentDir)
        {
            walk_path.clone()
        } else {
            lexical
        };

        Ok(Self {
            name: path::entry_name(&recorded_root),
            walk_path,
            recorded_root,
            access_type: AccessType::via_symlink(is_symlink),
        })
    }

    /// Path recorded for a location reached at `walked` during the walk
    fn recorded_path(&self, walked: &Path) -> String {
        match walked.strip_prefix(&self.walk_path) {
            Ok(relative) if relative.as_os_str().is_empty() => {
                path::absolute_path_string(&self.recorded_root)
            }
            Ok(relative) => path::absolute_path_string(&self.recorded_root.join(relative)),
            Err(_) => path::absolute_path_string(walked),
        }
    }
}

/// Snapshots filesystem trees, one builder per call
pub struct DirectorySnapshotter<H = Blake3, L = ContentLeafHasher<H>>
where
    H: HashFunction + Clone,
    L: LeafHasher,
{
    config: WalkerConfig,
    hash_function: H,
    leaf_hasher: L,
}

impl DirectorySnapshotter {
    /// Create a snapshotter hashing with BLAKE3
    pub fn new(config: WalkerConfig) -> Self {
        Self::with_parts(config, Blake3, ContentLeafHasher::new(Blake3))
    }
}

impl<H, L> DirectorySnapshotter<H, L>
where
    H: HashFunction + Clone,
    L: LeafHasher,
{
    pub fn with_parts(config: WalkerConfig, hash_function: H, leaf_hasher: L) -> Self {
        Self {
            config,
            hash_function,
            leaf_hasher,
        }
    }

    pub fn config(&self) -> &WalkerConfig {
        &self.config
    }

    /// Snapshot the tree rooted at `root`
    pub fn snapshot(&self, root: &Path) -> Result<Option<LocationSnapshot>, StorageError> {
        Ok(self.snapshot_with_stats(root)?.snapshot)
    }

    /// Snapshot the tree rooted at `root` and report traversal counters
    #[instrument(skip(self, root), fields(root = %root.display()))]
    pub fn snapshot_with_stats(&self, root: &Path) -> Result<ScanOutcome, StorageError> {
        let start = Instant::now();
        let root = RootLocation::resolve(root)?;

        let ordering = if self.config.sorted_walk {
            ChildOrdering::VisitOrder
        } else {
            ChildOrdering::SortByName
        };
        let mut builder =
            MerkleDirectorySnapshotBuilder::with_hash_function(ordering, self.hash_function.clone());
        let mut stats = ScanStats::default();
        let mut ignored = 0usize;

        let mut walker = WalkDir::new(&root.walk_path).follow_links(self.config.follow_symlinks);
        if self.config.sorted_walk {
            walker = walker.sort_by_file_name();
        }
        let entries = walker.into_iter().filter_entry(|entry| {
            if entry.depth() > 0 && self.should_ignore(entry) {
                ignored += 1;
                return false;
            }
            true
        });

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    self.handle_walk_error(err, &root, &mut builder, &mut stats)?;
                    continue;
                }
            };

            let depth = entry.depth();
            self.close_to_depth(&mut builder, depth, &mut stats)?;

            let absolute_path = root.recorded_path(entry.path());
            let (name, access_type) = if depth == 0 {
                (root.name.clone(), root.access_type)
            } else {
                (
                    path::entry_name(entry.path()),
                    AccessType::via_symlink(entry.path_is_symlink()),
                )
            };
            let file_type = entry.file_type();

            if file_type.is_dir() {
                builder.enter_directory(
                    access_type,
                    absolute_path,
                    name,
                    self.config.empty_directories,
                );
            } else if file_type.is_file() {
                let leaf = self.file_snapshot(&entry, absolute_path, name, access_type)?;
                if leaf.kind() == LeafKind::Missing {
                    stats.missing += 1;
                } else {
                    stats.files += 1;
                }
                Self::collect_leaf(&mut builder, depth, leaf)?;
            } else if file_type.is_symlink() {
                debug!(path = %absolute_path, "Skipping symlink");
                stats.skipped_symlinks += 1;
            } else {
                debug!(path = %absolute_path, "Skipping special file");
                stats.skipped_special += 1;
            }
        }
        self.close_to_depth(&mut builder, 0, &mut stats)?;
        stats.ignored = ignored;

        let snapshot = builder.result()?;
        let duration = start.elapsed();
        match &snapshot {
            Some(snapshot) => info!(
                root_hash = %hash_to_hex(snapshot.hash()),
                directories = stats.directories,
                files = stats.files,
                excluded_directories = stats.excluded_directories,
                duration_ms = duration.as_millis(),
                "Snapshot completed"
            ),
            None => info!(
                duration_ms = duration.as_millis(),
                "Snapshot completed without result"
            ),
        }

        Ok(ScanOutcome { snapshot, stats })
    }

    fn close_to_depth(
        &self,
        builder: &mut MerkleDirectorySnapshotBuilder<H>,
        depth: usize,
        stats: &mut ScanStats,
    ) -> Result<(), StorageError> {
        while builder.depth() > depth {
            if builder.exit_directory()? {
                stats.directories += 1;
            } else {
                stats.excluded_directories += 1;
            }
        }
        Ok(())
    }

    fn collect_leaf(
        builder: &mut MerkleDirectorySnapshotBuilder<H>,
        depth: usize,
        leaf: LeafSnapshot,
    ) -> Result<(), StorageError> {
        if depth == 0 {
            builder.visit_root_leaf(leaf)?;
        } else {
            builder.visit_leaf(leaf)?;
        }
        Ok(())
    }

    fn file_snapshot(
        &self,
        entry: &DirEntry,
        absolute_path: String,
        name: String,
        access_type: AccessType,
    ) -> Result<LeafSnapshot, StorageError> {
        let hashed = entry
            .metadata()
            .map_err(std::io::Error::from)
            .and_then(|metadata| {
                let content_hash = self.leaf_hasher.hash_file(entry.path())?;
                Ok((metadata, content_hash))
            });

        match hashed {
            Ok((metadata, content_hash)) => {
                let last_modified = metadata
                    .modified()
                    .ok()
                    .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
                    .map(|duration| duration.as_millis() as i64)
                    .unwrap_or(0);
                Ok(LeafSnapshot::regular_file(
                    absolute_path,
                    name,
                    access_type,
                    content_hash,
                    FileMetadata {
                        length: metadata.len(),
                        last_modified,
                    },
                ))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // Removed between listing and hashing
                warn!(path = %absolute_path, "File disappeared during snapshot");
                Ok(LeafSnapshot::missing(
                    absolute_path,
                    name,
                    access_type,
                    &self.hash_function,
                ))
            }
            Err(e) => Err(StorageError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to hash file {}: {}", absolute_path, e),
            ))),
        }
    }

    /// Missing paths (a missing root, a dangling followed link, a directory
    /// removed mid-walk) become missing-file leaves; every other walk error
    /// aborts the snapshot.
    fn handle_walk_error(
        &self,
        err: walkdir::Error,
        root: &RootLocation,
        builder: &mut MerkleDirectorySnapshotBuilder<H>,
        stats: &mut ScanStats,
    ) -> Result<(), StorageError> {
        match (err.path(), err.io_error().map(|e| e.kind())) {
            (Some(missing_path), Some(ErrorKind::NotFound)) => {
                self.record_missing(builder, stats, root, err.depth(), missing_path)
            }
            _ => Err(StorageError::IoError(std::io::Error::new(
                ErrorKind::Other,
                format!("Failed to walk directory: {}", err),
            ))),
        }
    }

    fn record_missing(
        &self,
        builder: &mut MerkleDirectorySnapshotBuilder<H>,
        stats: &mut ScanStats,
        root: &RootLocation,
        depth: usize,
        missing_path: &Path,
    ) -> Result<(), StorageError> {
        let absolute_path = root.recorded_path(missing_path);

        // A directory read after it was entered may already be gone; the
        // missing leaf takes its place
        self.close_to_depth(builder, depth + 1, stats)?;
        if builder.depth() == depth + 1
            && builder.current_directory_path() == Some(absolute_path.as_str())
        {
            builder.abandon_directory()?;
        }
        self.close_to_depth(builder, depth, stats)?;

        let (name, access_type) = if depth == 0 {
            (root.name.clone(), root.access_type)
        } else {
            let is_symlink = std::fs::symlink_metadata(missing_path)
                .map(|metadata| metadata.file_type().is_symlink())
                .unwrap_or(false);
            (
                path::entry_name(missing_path),
                AccessType::via_symlink(is_symlink),
            )
        };
        debug!(path = %absolute_path, "Recording missing location");
        let leaf = LeafSnapshot::missing(absolute_path, name, access_type, &self.hash_function);
        stats.missing += 1;
        Self::collect_leaf(builder, depth, leaf)
    }

    /// An entry is ignored when its own name matches a pattern; pruning
    /// removes its subtree as well.
    fn should_ignore(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        self.config
            .ignore_patterns
            .iter()
            .any(|pattern| pattern.as_str() == name)
    }
}
