//! Tests for engine builders

use std::sync::Arc;

use prometheus_room_booking::builders::{build_store, EngineBuilder};
use prometheus_room_booking::config::{EngineConfig, StoreBackendConfig};
use prometheus_room_booking::core::{BookingRequest, SharedAuditSink};
use prometheus_room_booking::infra::store::{InMemoryStore, ReservationStore};
use prometheus_room_booking::util::clock::{ManualClock, MS_PER_HOUR};
use prometheus_room_booking::util::serde::{Priority, ResourceId, TimeWindow};

#[test]
fn test_build_in_memory_store() {
    let store = build_store(&StoreBackendConfig::InMemory).unwrap();
    assert!(store.reserved_resources().unwrap().is_empty());
}

#[test]
fn test_builder_with_overrides() {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(ManualClock::new(5 * MS_PER_HOUR));
    let sink = SharedAuditSink::new();

    let engine = EngineBuilder::new(EngineConfig {
        admission_capacity: 2,
        ..EngineConfig::default()
    })
    .with_store(store.clone())
    .with_clock(clock)
    .with_audit(Box::new(sink.clone()))
    .build()
    .unwrap();

    assert_eq!(engine.admission().capacity(), 2);

    let request = BookingRequest::new(
        "dr.rao",
        [ResourceId::from("B201")],
        TimeWindow::new(0, MS_PER_HOUR),
        Priority::Normal,
        0,
    );
    let records = engine.submit(&request).into_result().unwrap();
    assert_eq!(records[0].committed_at_ms, 5 * MS_PER_HOUR);

    // The supplied store is the one written to.
    assert_eq!(store.reserved_resources().unwrap(), vec![ResourceId::from("B201")]);
    assert_eq!(sink.actions(), vec!["commit"]);
}

#[test]
fn test_builder_opens_file_backend() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reservations.jsonl");
    let engine = EngineBuilder::new(EngineConfig {
        store: StoreBackendConfig::File { path: path.clone() },
        ..EngineConfig::default()
    })
    .build()
    .unwrap();

    let request = BookingRequest::new(
        "dr.rao",
        [ResourceId::from("LT1")],
        TimeWindow::new(0, 10),
        Priority::High,
        0,
    );
    assert!(engine.submit(&request).is_committed());
    let journal = std::fs::read_to_string(&path).unwrap();
    assert_eq!(journal.lines().count(), 1);
    assert!(journal.contains("LT1"));
}
