//! Persistent-store collaborator: exclusive transactions over reservation records.
//!
//! Any engine offering serializable or exclusive-lock isolation can serve as a
//! backend by implementing [`ReservationStore`] and [`StoreTx`].

mod ledger;

pub mod file;
pub mod memory;

use std::time::Duration;

use crate::core::{ReservationRecord, StoreError};
use crate::util::serde::{ResourceId, TimeWindow};

pub use file::FileStore;
pub use memory::InMemoryStore;

/// Default bound on opening an exclusive transaction.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Abstraction for reservation storage backends.
pub trait ReservationStore: Send + Sync {
    /// Open a transaction that excludes every other transaction until it ends.
    ///
    /// # Errors
    ///
    /// [`StoreError::Timeout`] if exclusivity is not obtained within `timeout`.
    fn begin_exclusive(&self, timeout: Duration) -> Result<Box<dyn StoreTx + '_>, StoreError>;

    /// Committed reservations on `resource` overlapping `range`, ordered by start.
    ///
    /// # Errors
    ///
    /// Backend-specific read failures.
    fn reservations(
        &self,
        resource: &ResourceId,
        range: &TimeWindow,
    ) -> Result<Vec<ReservationRecord>, StoreError>;

    /// Every resource that has at least one committed reservation.
    ///
    /// # Errors
    ///
    /// Backend-specific read failures.
    fn reserved_resources(&self) -> Result<Vec<ResourceId>, StoreError>;
}

/// An open exclusive transaction. Dropping it without `commit` rolls back.
pub trait StoreTx {
    /// First committed or staged reservation on `resource` overlapping `window`.
    ///
    /// # Errors
    ///
    /// Backend-specific read failures.
    fn query_overlaps(
        &self,
        resource: &ResourceId,
        window: &TimeWindow,
    ) -> Result<Option<ReservationRecord>, StoreError>;

    /// Stage a record for commit.
    ///
    /// # Errors
    ///
    /// Backend-specific write failures.
    fn insert(&mut self, record: ReservationRecord) -> Result<(), StoreError>;

    /// Make every staged record durable and visible, atomically.
    ///
    /// # Errors
    ///
    /// On failure nothing staged becomes visible.
    fn commit(self: Box<Self>) -> Result<(), StoreError>;

    /// Discard every staged record.
    ///
    /// # Errors
    ///
    /// Backend-specific failures while discarding.
    fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
