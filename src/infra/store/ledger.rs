//! Shared in-process reservation ledger used by the bundled store backends.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex, RwLock};

use super::StoreTx;
use crate::core::{ReservationRecord, StoreError};
use crate::util::serde::{ResourceId, TimeWindow};

/// Durable sink called with the full staged batch before it becomes visible.
pub(crate) trait Journal: Send + Sync {
    fn append(&self, records: &[ReservationRecord]) -> Result<(), StoreError>;
}

/// Committed records per resource, each list sorted by window start, plus the
/// store-wide exclusive transaction lock.
#[derive(Debug, Default)]
pub(crate) struct Ledger {
    tx_lock: Arc<Mutex<()>>,
    records: RwLock<HashMap<ResourceId, Vec<ReservationRecord>>>,
}

impl Ledger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn begin<'a>(
        &'a self,
        timeout: Duration,
        journal: Option<&'a dyn Journal>,
    ) -> Result<LedgerTx<'a>, StoreError> {
        let guard = self
            .tx_lock
            .try_lock_arc_for(timeout)
            .ok_or(StoreError::Timeout(timeout))?;
        Ok(LedgerTx {
            ledger: self,
            journal,
            staged: Vec::new(),
            _exclusive: guard,
        })
    }

    /// Insert records directly, bypassing transactions. Used for replay.
    pub(crate) fn apply(&self, records: impl IntoIterator<Item = ReservationRecord>) {
        let mut map = self.records.write();
        for record in records {
            let list = map.entry(record.resource.clone()).or_default();
            let pos = list.partition_point(|r| r.window.start_ms <= record.window.start_ms);
            list.insert(pos, record);
        }
    }

    pub(crate) fn overlapping(
        &self,
        resource: &ResourceId,
        range: &TimeWindow,
    ) -> Vec<ReservationRecord> {
        let map = self.records.read();
        map.get(resource)
            .map(|list| {
                // Everything from `right` on starts at or after range.end and cannot overlap.
                let right = list.partition_point(|r| r.window.start_ms < range.end_ms);
                list[..right]
                    .iter()
                    .filter(|r| r.window.overlaps(range))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn resources(&self) -> Vec<ResourceId> {
        let map = self.records.read();
        let mut ids: Vec<_> = map
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}

/// Transaction over a [`Ledger`]; holds the exclusive lock until dropped.
pub(crate) struct LedgerTx<'a> {
    ledger: &'a Ledger,
    journal: Option<&'a dyn Journal>,
    staged: Vec<ReservationRecord>,
    _exclusive: ArcMutexGuard<RawMutex, ()>,
}

impl StoreTx for LedgerTx<'_> {
    fn query_overlaps(
        &self,
        resource: &ResourceId,
        window: &TimeWindow,
    ) -> Result<Option<ReservationRecord>, StoreError> {
        if let Some(staged) = self
            .staged
            .iter()
            .find(|r| &r.resource == resource && r.window.overlaps(window))
        {
            return Ok(Some(staged.clone()));
        }
        Ok(self.ledger.overlapping(resource, window).into_iter().next())
    }

    fn insert(&mut self, record: ReservationRecord) -> Result<(), StoreError> {
        self.staged.push(record);
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let LedgerTx {
            ledger,
            journal,
            staged,
            _exclusive,
        } = *self;
        if staged.is_empty() {
            return Ok(());
        }
        if let Some(journal) = journal {
            journal.append(&staged)?;
        }
        tracing::debug!("committing {} reservation record(s)", staged.len());
        ledger.apply(staged);
        Ok(())
    }

    fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        tracing::debug!("rolling back {} staged record(s)", self.staged.len());
        Ok(())
    }
}
