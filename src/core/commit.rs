//! Transactional commit: the availability double-check and the durable write.
//!
//! Runs inside the caller's critical section. Taking the held
//! [`ResourceLockSet`] as a parameter means the commit can only be called by
//! someone who already owns every resource lock it writes under.

use std::time::Duration;

use crate::core::acquisition::ResourceLockSet;
use crate::core::{BookingError, BookingRequest, ReservationRecord};
use crate::infra::store::{ReservationStore, StoreTx};

/// Re-check availability for every locked resource and, if all are free,
/// write one record per resource in a single exclusive transaction.
///
/// # Errors
///
/// - [`BookingError::Conflict`] if any resource already has an overlapping
///   committed reservation; the transaction is rolled back.
/// - [`BookingError::Store`] if the store cannot open, write, or commit; no
///   record becomes visible.
pub fn commit_under(
    locks: &ResourceLockSet,
    store: &dyn ReservationStore,
    request: &BookingRequest,
    store_timeout: Duration,
    now_ms: u128,
) -> Result<Vec<ReservationRecord>, BookingError> {
    let mut tx = store.begin_exclusive(store_timeout)?;

    for resource in locks.resources() {
        if let Some(existing) = tx.query_overlaps(resource, &request.window)? {
            abort(tx);
            return Err(BookingError::Conflict {
                resource: resource.clone(),
                holder: existing.request_id,
            });
        }
    }

    let records: Vec<ReservationRecord> = locks
        .resources()
        .map(|resource| ReservationRecord {
            resource: resource.clone(),
            window: request.window,
            request_id: request.id,
            committed_at_ms: now_ms,
        })
        .collect();

    for record in &records {
        if let Err(e) = tx.insert(record.clone()) {
            abort(tx);
            return Err(e.into());
        }
    }

    tx.commit()?;
    Ok(records)
}

fn abort(tx: Box<dyn StoreTx + '_>) {
    if let Err(e) = tx.rollback() {
        tracing::error!("rollback failed: {e}");
    }
}
