//! Path utilities for the traversal driver
//!
//! Names are taken as-is from the filesystem and feed the digests. Absolute
//! paths are only carried for reporting, so they are normalized for display.

use crate::error::StorageError;
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Canonicalize the root of a snapshot
///
/// Resolves `..`, `.` and symlinks in the root itself. The result is only
/// walked; recorded paths keep the form the caller gave.
pub fn canonicalize_root(path: &Path) -> Result<PathBuf, StorageError> {
    dunce::canonicalize(path).map_err(|e| {
        StorageError::InvalidPath(format!(
            "Failed to canonicalize {}: {}",
            path.display(),
            e
        ))
    })
}

/// Absolute path string recorded in a snapshot
pub fn absolute_path_string(path: &Path) -> String {
    normalize_path_string(&path.to_string_lossy())
}

/// Name of an entry as hashed into its parent's digest
///
/// Falls back to the full path for roots without a final component (`/`).
pub fn entry_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.to_string_lossy().into_owned(),
    }
}

/// Normalize a path string for display (without filesystem access)
///
/// NFC-normalizes Unicode and removes trailing slashes, except for the root.
pub fn normalize_path_string(path: &str) -> String {
    let mut result: String = path.nfc().collect();
    while result.len() > 1 && (result.ends_with('/') || result.ends_with('\\')) {
        result.pop();
    }
    result
}
