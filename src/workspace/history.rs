//! Execution history store
//!
//! Records, per workspace identity, the digest of the inputs the last
//! execution ran against. Build avoidance compares a fresh snapshot digest
//! against this record.

use crate::error::StorageError;
use crate::types::Hash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

const HISTORY_KEY_PREFIX: &str = "history:";

/// Outcome of one execution for an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Root digest of the input snapshot; `None` when there was no input
    pub snapshot_hash: Option<Hash>,
    pub recorded_at: DateTime<Utc>,
    pub successful: bool,
}

impl ExecutionRecord {
    pub fn new(snapshot_hash: Option<Hash>, successful: bool) -> Self {
        Self {
            snapshot_hash,
            recorded_at: Utc::now(),
            successful,
        }
    }
}

/// Execution history interface
pub trait ExecutionHistoryStore {
    fn load(&self, identity: &str) -> Result<Option<ExecutionRecord>, StorageError>;
    fn store(&self, identity: &str, record: &ExecutionRecord) -> Result<(), StorageError>;

    /// Returns whether a record existed.
    fn remove(&self, identity: &str) -> Result<bool, StorageError>;
}

/// Sled-based implementation of ExecutionHistoryStore
pub struct SledExecutionHistoryStore {
    db: sled::Db,
}

impl SledExecutionHistoryStore {
    /// Open (or create) a history database at the given directory
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path).map_err(|e| {
            StorageError::HistoryStore(format!("Failed to open sled database: {}", e))
        })?;
        Ok(Self { db })
    }

    /// History that lives only as long as this value
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open().map_err(|e| {
            StorageError::HistoryStore(format!("Failed to open temporary database: {}", e))
        })?;
        Ok(Self { db })
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.db
            .flush()
            .map_err(|e| StorageError::HistoryStore(format!("Failed to flush history: {}", e)))?;
        Ok(())
    }

    fn key(identity: &str) -> Vec<u8> {
        format!("{}{}", HISTORY_KEY_PREFIX, identity).into_bytes()
    }
}

impl ExecutionHistoryStore for SledExecutionHistoryStore {
    fn load(&self, identity: &str) -> Result<Option<ExecutionRecord>, StorageError> {
        let value = self
            .db
            .get(Self::key(identity))
            .map_err(|e| StorageError::HistoryStore(format!("Failed to get record: {}", e)))?;
        match value {
            Some(bytes) => {
                let record = bincode::deserialize(&bytes).map_err(|e| {
                    StorageError::HistoryStore(format!("Failed to deserialize record: {}", e))
                })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn store(&self, identity: &str, record: &ExecutionRecord) -> Result<(), StorageError> {
        let bytes = bincode::serialize(record).map_err(|e| {
            StorageError::HistoryStore(format!("Failed to serialize record: {}", e))
        })?;
        self.db
            .insert(Self::key(identity), bytes)
            .map_err(|e| StorageError::HistoryStore(format!("Failed to put record: {}", e)))?;
        Ok(())
    }

    fn remove(&self, identity: &str) -> Result<bool, StorageError> {
        let previous = self
            .db
            .remove(Self::key(identity))
            .map_err(|e| StorageError::HistoryStore(format!("Failed to remove record: {}", e)))?;
        Ok(previous.is_some())
    }
}
