//! Per-identity locking for workspace actions
//!
//! At most one action runs against a given identity at a time; actions for
//! different identities do not block each other. Entries live only while a
//! caller holds the lock, so the map is bounded by concurrent identities.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// Per-identity lock manager
pub struct IdentityLockManager {
    locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl IdentityLockManager {
    pub fn new() -> Self {
        Self {
            locks: RwLock::new(HashMap::new()),
        }
    }

    /// Get or create the lock for an identity
    pub fn get_lock(&self, identity: &str) -> Arc<Mutex<()>> {
        {
            let map = self.locks.read();
            if let Some(lock) = map.get(identity) {
                return lock.clone();
            }
        }

        // Another thread may have inserted it between the two guards
        let mut map = self.locks.write();
        map.entry(identity.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Hand back a lock from [`get_lock`](Self::get_lock) once its guard is dropped
    ///
    /// The entry is removed when no other caller still holds it.
    pub fn release(&self, identity: &str, lock: Arc<Mutex<()>>) {
        drop(lock);
        let mut map = self.locks.write();
        // Clones are only made under the map lock, so the count is stable here
        if map
            .get(identity)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            map.remove(identity);
        }
    }

    /// Number of identities with a live lock entry
    pub fn tracked_identities(&self) -> usize {
        self.locks.read().len()
    }
}

impl Default for IdentityLockManager {
    fn default() -> Self {
        Self::new()
    }
}
