//! In-memory reservation store for development and testing.

use std::time::Duration;

use super::ledger::Ledger;
use super::{ReservationStore, StoreTx};
use crate::core::{ReservationRecord, StoreError};
use crate::util::serde::{ResourceId, TimeWindow};

/// Volatile store with store-wide exclusive transactions.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    ledger: Ledger,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ledger: Ledger::new(),
        }
    }

    /// Create a store pre-populated with committed records.
    pub fn with_records(records: impl IntoIterator<Item = ReservationRecord>) -> Self {
        let store = Self::new();
        store.ledger.apply(records);
        store
    }
}

impl ReservationStore for InMemoryStore {
    fn begin_exclusive(&self, timeout: Duration) -> Result<Box<dyn StoreTx + '_>, StoreError> {
        Ok(Box::new(self.ledger.begin(timeout, None)?))
    }

    fn reservations(
        &self,
        resource: &ResourceId,
        range: &TimeWindow,
    ) -> Result<Vec<ReservationRecord>, StoreError> {
        Ok(self.ledger.overlapping(resource, range))
    }

    fn reserved_resources(&self) -> Result<Vec<ResourceId>, StoreError> {
        Ok(self.ledger.resources())
    }
}
