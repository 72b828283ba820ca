//! Merkle Snapshots: content-addressed snapshots of filesystem trees
//!
//! Folds a depth-first traversal of a directory tree into a Merkle tree whose
//! root digest changes exactly when the names, structure, or file content
//! below it change. Snapshots drive build avoidance against a per-identity
//! execution history.

pub mod cli;
pub mod config;
pub mod error;
pub mod execution;
pub mod logging;
pub mod snapshot;
pub mod types;
pub mod workspace;
