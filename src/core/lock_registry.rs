//! Lazily provisioned per-resource mutual-exclusion locks.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RawMutex};

use crate::util::serde::ResourceId;

/// Shared handle to one resource's exclusive lock.
pub type ResourceLock = Arc<Mutex<()>>;

/// Owned guard over a [`ResourceLock`]; not tied to a borrow of the registry.
pub type ResourceGuard = lock_api::ArcMutexGuard<RawMutex, ()>;

/// Registry handing out exactly one lock per resource id for the process lifetime.
///
/// The internal map is guarded by its own short-lived mutex, held only while
/// looking up or inserting an entry and never while a resource lock is waited
/// on, so growth of the registry does not serialize unrelated bookings.
/// Entries are never removed.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<ResourceId, ResourceLock>>,
}

impl LockRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the lock for `resource`, creating it on first use.
    ///
    /// Every caller asking for the same id receives a handle to the same lock.
    pub fn get_lock(&self, resource: &ResourceId) -> ResourceLock {
        let mut locks = self.locks.lock();
        if let Some(lock) = locks.get(resource) {
            return Arc::clone(lock);
        }
        tracing::debug!("provisioning lock for resource {resource}");
        let lock = Arc::new(Mutex::new(()));
        locks.insert(resource.clone(), Arc::clone(&lock));
        lock
    }

    /// Number of provisioned locks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    /// True when no lock has been provisioned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }
}
