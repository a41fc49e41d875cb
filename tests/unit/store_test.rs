//! Tests for store transactions through the public trait

use std::time::Duration;

use prometheus_room_booking::core::{ReservationRecord, StoreError};
use prometheus_room_booking::infra::store::{FileStore, InMemoryStore, ReservationStore, StoreTx};
use prometheus_room_booking::util::serde::{RequestId, ResourceId, TimeWindow};

fn record(resource: &str, start_ms: u128, end_ms: u128) -> ReservationRecord {
    ReservationRecord {
        resource: resource.into(),
        window: TimeWindow::new(start_ms, end_ms),
        request_id: RequestId::new(),
        committed_at_ms: 0,
    }
}

fn exercise(store: &dyn ReservationStore) {
    let mut tx = store.begin_exclusive(Duration::from_secs(1)).unwrap();
    tx.insert(record("A101", 0, 10)).unwrap();
    tx.insert(record("A102", 0, 10)).unwrap();
    tx.commit().unwrap();

    let tx = store.begin_exclusive(Duration::from_secs(1)).unwrap();
    let hit = tx
        .query_overlaps(&"A101".into(), &TimeWindow::new(5, 15))
        .unwrap();
    assert!(hit.is_some());
    assert!(tx
        .query_overlaps(&"A101".into(), &TimeWindow::new(10, 20))
        .unwrap()
        .is_none());

    // Exclusive: a second transaction waits out its timeout.
    match store.begin_exclusive(Duration::from_millis(20)) {
        Err(StoreError::Timeout(_)) => {}
        Err(e) => panic!("expected timeout, got {e}"),
        Ok(_) => panic!("second transaction must not open"),
    }
    tx.rollback().unwrap();

    let expected: Vec<ResourceId> = vec!["A101".into(), "A102".into()];
    assert_eq!(store.reserved_resources().unwrap(), expected);
}

#[test]
fn test_in_memory_store_contract() {
    exercise(&InMemoryStore::new());
}

#[test]
fn test_file_store_contract() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path().join("r.jsonl")).unwrap();
    exercise(&store);
}
