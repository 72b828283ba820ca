//! Filesystem Merkle snapshots
//!
//! Every node of a snapshot (file or directory) carries a digest; a
//! directory's digest is folded from its children's names and digests, so two
//! trees with the same structure and content share a root digest.

pub mod builder;
pub mod hasher;
pub mod node;
pub mod path;
pub mod walker;

pub use builder::{ChildOrdering, EmptyDirectoryHandling, MerkleDirectorySnapshotBuilder};
pub use hasher::{Blake3, HashFunction, Hasher};
pub use node::{
    AccessType, DirectorySnapshot, FileMetadata, LeafKind, LeafSnapshot, LocationSnapshot,
    SnapshotHierarchyVisitor, SnapshotStats, SnapshotVisitResult,
};
pub use walker::{DirectorySnapshotter, LeafHasher, ScanOutcome, ScanStats, WalkerConfig};
