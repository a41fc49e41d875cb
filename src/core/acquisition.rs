//! Deadlock-free acquisition of several resource locks at once.
//!
//! Two rules make circular wait and hold-and-wait impossible:
//!
//! 1. Locks are always taken in [`canonical_order`] (ascending `ResourceId`),
//!    never in the order the caller listed them.
//! 2. If any lock cannot be taken within the timeout, every lock already held
//!    is released before returning. No partial set outlives the call.
//!
//! Release is fair: each guard is handed directly to the longest-parked waiter
//! (`unlock_fair`), so a contended resource serves its waiters in FIFO order
//! and no waiter starves behind a thread that re-locks in a tight loop.

use std::fmt;
use std::time::{Duration, Instant};

use lock_api::ArcMutexGuard;

use crate::core::lock_registry::{LockRegistry, ResourceGuard};
use crate::core::BookingError;
use crate::util::serde::ResourceId;

/// Default bound on waiting for any single resource lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Sort and de-duplicate resource ids into the global acquisition order.
#[must_use]
pub fn canonical_order(resources: &[ResourceId]) -> Vec<ResourceId> {
    let mut ordered = resources.to_vec();
    ordered.sort_unstable();
    ordered.dedup();
    ordered
}

/// A set of resource locks held together. Dropping it releases them in
/// reverse acquisition order.
#[must_use = "dropping the lock set immediately releases every resource lock"]
pub struct ResourceLockSet {
    guards: Vec<(ResourceId, ResourceGuard)>,
}

impl ResourceLockSet {
    /// Resources held, in acquisition order.
    pub fn resources(&self) -> impl Iterator<Item = &ResourceId> {
        self.guards.iter().map(|(id, _)| id)
    }

    /// Number of locks held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    /// True if no lock is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}

impl fmt::Debug for ResourceLockSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceLockSet")
            .field("resources", &self.resources().collect::<Vec<_>>())
            .finish()
    }
}

impl Drop for ResourceLockSet {
    fn drop(&mut self) {
        while let Some((resource, guard)) = self.guards.pop() {
            ArcMutexGuard::unlock_fair(guard);
            tracing::trace!("released lock on {resource}");
        }
    }
}

/// Acquire the lock of every resource in `resources`, in canonical order,
/// waiting at most `timeout` for each one.
///
/// # Errors
///
/// Returns [`BookingError::LockTimeout`] naming the first resource that could
/// not be locked in time. All locks taken before it have been released by the
/// time the error is returned.
pub fn acquire_all(
    registry: &LockRegistry,
    resources: &[ResourceId],
    timeout: Duration,
) -> Result<ResourceLockSet, BookingError> {
    let ordered = canonical_order(resources);
    let mut held = ResourceLockSet {
        guards: Vec::with_capacity(ordered.len()),
    };

    for resource in ordered {
        let lock = registry.get_lock(&resource);
        let started = Instant::now();
        if let Some(guard) = lock.try_lock_arc_for(timeout) {
            tracing::trace!("locked {resource} after {:?}", started.elapsed());
            held.guards.push((resource, guard));
        } else {
            tracing::warn!(
                "lock timeout on {resource} after {timeout:?}; releasing {} held lock(s)",
                held.len()
            );
            drop(held);
            return Err(BookingError::LockTimeout {
                resource,
                waited: timeout,
            });
        }
    }

    Ok(held)
}
