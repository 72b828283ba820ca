//! Workspace domain: per-identity working directories and execution history.

pub mod history;
mod locks;
pub mod provider;

pub use history::{ExecutionHistoryStore, ExecutionRecord, SledExecutionHistoryStore};
pub use locks::IdentityLockManager;
pub use provider::{
    identity_for_hash, validate_identity, DirectoryWorkspaceProvider, WorkspaceProvider,
};
