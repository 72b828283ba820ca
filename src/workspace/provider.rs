//! Workspace provider: identity -> working directory + execution history

use crate::error::StorageError;
use crate::types::{hash_to_hex, Hash};
use crate::workspace::history::{ExecutionHistoryStore, SledExecutionHistoryStore};
use crate::workspace::locks::IdentityLockManager;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Maps an identity string to a workspace directory and an execution history
pub trait WorkspaceProvider {
    type History: ExecutionHistoryStore;

    fn execution_history_store(&self) -> &Self::History;

    /// Run `action` against the workspace directory for `identity`.
    ///
    /// The action receives the identity and the directory path.
    fn with_workspace<T, F>(&self, identity: &str, action: F) -> Result<T, StorageError>
    where
        F: FnOnce(&str, &Path) -> T;

    /// Look up a previously cached result for `identity`.
    fn cached_result<T>(&self, identity: &str) -> Result<Option<T>, StorageError>;
}

/// Build an identity from a kind and a snapshot digest
pub fn identity_for_hash(kind: &str, hash: &Hash) -> String {
    format!("{}-{}", kind, hash_to_hex(hash))
}

/// Reject identities that would escape the store directory
pub fn validate_identity(identity: &str) -> Result<(), StorageError> {
    let invalid = identity.is_empty()
        || identity == "."
        || identity == ".."
        || identity.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StorageError::InvalidIdentity(identity.to_string()));
    }
    Ok(())
}

/// Provider that keeps one subdirectory per identity under a store directory
///
/// Results are never cached: `cached_result` always reports nothing.
pub struct DirectoryWorkspaceProvider<S: ExecutionHistoryStore = SledExecutionHistoryStore> {
    store_directory: PathBuf,
    history: S,
    locks: IdentityLockManager,
}

impl<S: ExecutionHistoryStore> DirectoryWorkspaceProvider<S> {
    pub fn new(store_directory: impl Into<PathBuf>, history: S) -> Self {
        Self {
            store_directory: store_directory.into(),
            history,
            locks: IdentityLockManager::new(),
        }
    }

    /// Directory that `with_workspace` hands to actions for `identity`
    pub fn workspace_dir(&self, identity: &str) -> Result<PathBuf, StorageError> {
        validate_identity(identity)?;
        Ok(self.store_directory.join(identity))
    }
}

impl<S: ExecutionHistoryStore> WorkspaceProvider for DirectoryWorkspaceProvider<S> {
    type History = S;

    fn execution_history_store(&self) -> &S {
        &self.history
    }

    fn with_workspace<T, F>(&self, identity: &str, action: F) -> Result<T, StorageError>
    where
        F: FnOnce(&str, &Path) -> T,
    {
        let workspace_dir = self.workspace_dir(identity)?;
        let lock = self.locks.get_lock(identity);
        let result = {
            let _guard = lock.lock();
            Self::run_in_workspace(identity, &workspace_dir, action)
        };
        self.locks.release(identity, lock);
        result
    }

    fn cached_result<T>(&self, identity: &str) -> Result<Option<T>, StorageError> {
        validate_identity(identity)?;
        Ok(None)
    }
}

impl<S: ExecutionHistoryStore> DirectoryWorkspaceProvider<S> {
    fn run_in_workspace<T, F>(
        identity: &str,
        workspace_dir: &Path,
        action: F,
    ) -> Result<T, StorageError>
    where
        F: FnOnce(&str, &Path) -> T,
    {
        std::fs::create_dir_all(workspace_dir).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create workspace {}: {}",
                    workspace_dir.display(),
                    e
                ),
            ))
        })?;
        debug!(identity, workspace = %workspace_dir.display(), "Running workspace action");
        Ok(action(identity, workspace_dir))
    }
}
