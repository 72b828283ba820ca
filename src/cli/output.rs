//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, StorageError};

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::StorageError(StorageError::Traversal(inner)) => {
            format!("Internal traversal error: {}", inner)
        }
        ApiError::StorageError(StorageError::InvalidIdentity(identity)) => format!(
            "Invalid identity {:?}: identities must be a single path component",
            identity
        ),
        _ => e.to_string(),
    }
}
