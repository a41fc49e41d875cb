//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use prometheus_room_booking::config::EngineConfig;
use prometheus_room_booking::core::{BookingEngine, BookingRequest, ReservationRecord, StoreError};
use prometheus_room_booking::infra::store::{InMemoryStore, ReservationStore, StoreTx};
use prometheus_room_booking::util::clock::{Clock, SystemClock, MS_PER_HOUR};
use prometheus_room_booking::util::serde::{Priority, ResourceId, TimeWindow};

pub const H: u128 = MS_PER_HOUR;

pub fn engine_with(config: EngineConfig, store: Arc<dyn ReservationStore>) -> Arc<BookingEngine> {
    engine_on(config, store, Arc::new(SystemClock))
}

pub fn engine_on(
    config: EngineConfig,
    store: Arc<dyn ReservationStore>,
    clock: Arc<dyn Clock>,
) -> Arc<BookingEngine> {
    Arc::new(BookingEngine::new(&config, store, clock))
}

pub fn default_engine() -> Arc<BookingEngine> {
    engine_with(EngineConfig::default(), Arc::new(InMemoryStore::new()))
}

pub fn booking(requester: &str, rooms: &[&str], start_h: u128, end_h: u128) -> BookingRequest {
    BookingRequest::new(
        requester,
        rooms.iter().map(|r| ResourceId::from(*r)),
        TimeWindow::new(start_h * H, end_h * H),
        Priority::Normal,
        0,
    )
}

/// Pairwise-disjointness of every committed window per resource.
pub fn assert_no_overlaps(engine: &BookingEngine) {
    let everything = TimeWindow::new(0, u128::MAX);
    for resource in engine.store().reserved_resources().unwrap() {
        let records = engine.read_schedule(&resource, &everything).unwrap();
        for (i, a) in records.iter().enumerate() {
            for b in &records[i + 1..] {
                assert!(
                    !a.window.overlaps(&b.window),
                    "overlap on {resource}: {a:?} vs {b:?}"
                );
            }
        }
    }
}

/// Store that sleeps before opening each transaction, stretching the time an
/// admitted attempt holds its slot.
pub struct SlowStore {
    inner: InMemoryStore,
    delay: Duration,
}

impl SlowStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: InMemoryStore::new(),
            delay,
        }
    }
}

impl ReservationStore for SlowStore {
    fn begin_exclusive(&self, timeout: Duration) -> Result<Box<dyn StoreTx + '_>, StoreError> {
        thread::sleep(self.delay);
        self.inner.begin_exclusive(timeout)
    }

    fn reservations(
        &self,
        resource: &ResourceId,
        range: &TimeWindow,
    ) -> Result<Vec<ReservationRecord>, StoreError> {
        self.inner.reservations(resource, range)
    }

    fn reserved_resources(&self) -> Result<Vec<ResourceId>, StoreError> {
        self.inner.reserved_resources()
    }
}

/// Store whose reads wait until `expected` readers are inside at once, or
/// give up after a deadline. Records whether the rendezvous happened.
pub struct RendezvousStore {
    inner: InMemoryStore,
    expected: usize,
    inside: AtomicUsize,
    met: AtomicUsize,
}

impl RendezvousStore {
    pub fn new(expected: usize) -> Self {
        Self {
            inner: InMemoryStore::new(),
            expected,
            inside: AtomicUsize::new(0),
            met: AtomicUsize::new(0),
        }
    }

    /// Readers that observed every other reader inside concurrently.
    pub fn met(&self) -> usize {
        self.met.load(Ordering::Acquire)
    }
}

impl ReservationStore for RendezvousStore {
    fn begin_exclusive(&self, timeout: Duration) -> Result<Box<dyn StoreTx + '_>, StoreError> {
        self.inner.begin_exclusive(timeout)
    }

    fn reservations(
        &self,
        resource: &ResourceId,
        range: &TimeWindow,
    ) -> Result<Vec<ReservationRecord>, StoreError> {
        self.inside.fetch_add(1, Ordering::AcqRel);
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if self.inside.load(Ordering::Acquire) >= self.expected {
                self.met.fetch_add(1, Ordering::AcqRel);
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }
        self.inner.reservations(resource, range)
    }

    fn reserved_resources(&self) -> Result<Vec<ResourceId>, StoreError> {
        self.inner.reserved_resources()
    }
}

/// Store whose transactions stage normally but fail every commit with a
/// non-retryable backend error.
#[derive(Default)]
pub struct FailingCommitStore {
    inner: InMemoryStore,
}

impl FailingCommitStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryStore::new(),
        }
    }
}

struct FailingCommitTx<'a> {
    inner: Box<dyn StoreTx + 'a>,
}

impl StoreTx for FailingCommitTx<'_> {
    fn query_overlaps(
        &self,
        resource: &ResourceId,
        window: &TimeWindow,
    ) -> Result<Option<ReservationRecord>, StoreError> {
        self.inner.query_overlaps(resource, window)
    }

    fn insert(&mut self, record: ReservationRecord) -> Result<(), StoreError> {
        self.inner.insert(record)
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.inner.rollback()?;
        Err(StoreError::Backend("disk full".into()))
    }

    fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.inner.rollback()
    }
}

impl ReservationStore for FailingCommitStore {
    fn begin_exclusive(&self, timeout: Duration) -> Result<Box<dyn StoreTx + '_>, StoreError> {
        let inner = self.inner.begin_exclusive(timeout)?;
        Ok(Box::new(FailingCommitTx { inner }))
    }

    fn reservations(
        &self,
        resource: &ResourceId,
        range: &TimeWindow,
    ) -> Result<Vec<ReservationRecord>, StoreError> {
        self.inner.reservations(resource, range)
    }

    fn reserved_resources(&self) -> Result<Vec<ResourceId>, StoreError> {
        self.inner.reserved_resources()
    }
}
