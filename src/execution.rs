//! Build avoidance
//!
//! Compares the root digest of a fresh snapshot with the execution history of
//! an identity. Work whose inputs hash the same as at the last successful run
//! is skipped.

use crate::error::StorageError;
use crate::snapshot::LocationSnapshot;
use crate::types::Hash;
use crate::workspace::{ExecutionHistoryStore, ExecutionRecord, WorkspaceProvider};
use std::path::Path;
use tracing::{debug, info};

/// Result of comparing a snapshot with recorded history
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionDecision {
    /// The last successful run saw the same input digest
    UpToDate { record: ExecutionRecord },
    /// Inputs changed, or the last run failed
    Changed { previous: ExecutionRecord },
    /// Never executed
    NoHistory,
}

impl ExecutionDecision {
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, ExecutionDecision::UpToDate { .. })
    }
}

/// What `execute` did
#[derive(Debug)]
pub enum ExecutionOutcome<T, E> {
    UpToDate(ExecutionRecord),
    Succeeded { value: T, record: ExecutionRecord },
    Failed { error: E, record: ExecutionRecord },
}

/// Incremental execution against a workspace provider
pub struct IncrementalExecution<'a, P: WorkspaceProvider> {
    provider: &'a P,
}

impl<'a, P: WorkspaceProvider> IncrementalExecution<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Decide whether work for `identity` is up to date with `current`
    pub fn check(
        &self,
        identity: &str,
        current: Option<&LocationSnapshot>,
    ) -> Result<ExecutionDecision, StorageError> {
        crate::workspace::validate_identity(identity)?;
        let history = self.provider.execution_history_store();
        Ok(decide(history.load(identity)?, current_hash(current)))
    }

    /// Run `action` in the identity's workspace unless it is up to date.
    ///
    /// The check and the run happen under the workspace lock, so concurrent
    /// callers for one identity see each other's records.
    pub fn execute<T, E, F>(
        &self,
        identity: &str,
        current: Option<&LocationSnapshot>,
        action: F,
    ) -> Result<ExecutionOutcome<T, E>, StorageError>
    where
        F: FnOnce(&str, &Path) -> Result<T, E>,
    {
        let snapshot_hash = current_hash(current);
        let history = self.provider.execution_history_store();

        self.provider.with_workspace(
            identity,
            |identity, workspace_dir| -> Result<ExecutionOutcome<T, E>, StorageError> {
                match decide(history.load(identity)?, snapshot_hash) {
                    ExecutionDecision::UpToDate { record } => {
                        info!(identity, "Skipping up-to-date work");
                        return Ok(ExecutionOutcome::UpToDate(record));
                    }
                    ExecutionDecision::Changed { .. } => {
                        debug!(identity, "Inputs changed since last execution")
                    }
                    ExecutionDecision::NoHistory => debug!(identity, "No execution history"),
                }

                let outcome = match action(identity, workspace_dir) {
                    Ok(value) => {
                        let record = ExecutionRecord::new(snapshot_hash, true);
                        history.store(identity, &record)?;
                        ExecutionOutcome::Succeeded { value, record }
                    }
                    Err(error) => {
                        let record = ExecutionRecord::new(snapshot_hash, false);
                        history.store(identity, &record)?;
                        ExecutionOutcome::Failed { error, record }
                    }
                };
                Ok(outcome)
            },
        )?
    }

    /// Record `current` as the inputs of a successful run without executing
    pub fn record(
        &self,
        identity: &str,
        current: Option<&LocationSnapshot>,
    ) -> Result<ExecutionRecord, StorageError> {
        crate::workspace::validate_identity(identity)?;
        let record = ExecutionRecord::new(current_hash(current), true);
        self.provider
            .execution_history_store()
            .store(identity, &record)?;
        Ok(record)
    }
}

fn current_hash(current: Option<&LocationSnapshot>) -> Option<Hash> {
    current.map(|snapshot| *snapshot.hash())
}

fn decide(previous: Option<ExecutionRecord>, snapshot_hash: Option<Hash>) -> ExecutionDecision {
    match previous {
        None => ExecutionDecision::NoHistory,
        Some(record) if record.successful && record.snapshot_hash == snapshot_hash => {
            ExecutionDecision::UpToDate { record }
        }
        Some(previous) => ExecutionDecision::Changed { previous },
    }
}
