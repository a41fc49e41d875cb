//! Core arbitration: locks, admission, the schedule gate, commit, and aging.

pub mod acquisition;
pub mod admission;
pub mod audit;
pub mod commit;
pub mod engine;
pub mod error;
pub mod lock_registry;
pub mod pending;
pub mod request;
pub mod schedule_gate;
pub mod scheduler;

pub use acquisition::{acquire_all, canonical_order, ResourceLockSet, DEFAULT_LOCK_TIMEOUT};
pub use admission::{AdmissionController, AdmissionPermit};
pub use audit::{build_audit_event, AuditEvent, AuditSink, InMemoryAuditSink, SharedAuditSink};
pub use commit::commit_under;
pub use engine::{BookingEngine, RequestFilter};
pub use error::{AppResult, BookingError, StoreError};
pub use lock_registry::{LockRegistry, ResourceGuard, ResourceLock};
pub use pending::PendingQueue;
pub use request::{BookingRequest, Outcome, RequestStatus, ReservationRecord, Resource};
pub use schedule_gate::{GateState, ReadTicket, ScheduleGate, WriteTicket};
pub use scheduler::{effective_priority, waiting_hours, AgingScheduler, PrioritizedRequest};
