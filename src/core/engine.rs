//! The booking engine: admission, ordered locking, gated commit, and the
//! approval backlog wired together.
//!
//! A submission flows through the components in a fixed order:
//!
//! 1. [`AdmissionController::try_enter`] (fail-fast `Busy`).
//! 2. [`acquire_all`] over the canonical resource order (`LockTimeout`).
//! 3. The write side of the [`ScheduleGate`], when aggregate readers must see
//!    the commit atomically.
//! 4. [`commit_under`] inside one exclusive store transaction (`Conflict`,
//!    `StoreError`).
//!
//! Every hold is an RAII value, so each exit path releases gate, locks, and
//! admission slot in that order.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::EngineConfig;
use crate::core::acquisition::{acquire_all, canonical_order};
use crate::core::audit::{build_audit_event, AuditSink};
use crate::core::commit::commit_under;
use crate::core::{
    AdmissionController, AgingScheduler, BookingError, BookingRequest, LockRegistry, Outcome,
    PendingQueue, PrioritizedRequest, RequestStatus, ReservationRecord, ScheduleGate,
};
use crate::infra::store::ReservationStore;
use crate::util::clock::Clock;
use crate::util::serde::{RequestId, ResourceId, TimeWindow};

/// Criteria for [`BookingEngine::list_requests`]. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    /// Only requests from this requester.
    pub requester: Option<String>,
    /// Only requests in this state.
    pub status: Option<RequestStatus>,
}

impl RequestFilter {
    fn matches(&self, request: &BookingRequest) -> bool {
        self.requester
            .as_deref()
            .map_or(true, |r| r == request.requester)
            && self.status.map_or(true, |s| s == request.status)
    }
}

/// Concurrency core arbitrating access to bookable resources.
pub struct BookingEngine {
    admission: AdmissionController,
    registry: LockRegistry,
    gate: ScheduleGate,
    store: Arc<dyn ReservationStore>,
    clock: Arc<dyn Clock>,
    scheduler: AgingScheduler,
    pending: PendingQueue,
    archive: Mutex<HashMap<RequestId, BookingRequest>>,
    audit: Option<Mutex<Box<dyn AuditSink>>>,
    lock_timeout: Duration,
    store_timeout: Duration,
    gate_single_resource_commits: bool,
}

impl BookingEngine {
    /// Create an engine over `store`, reading time from `clock`.
    pub fn new(config: &EngineConfig, store: Arc<dyn ReservationStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            admission: AdmissionController::new(config.admission_capacity),
            registry: LockRegistry::new(),
            gate: ScheduleGate::new(),
            store,
            clock,
            scheduler: AgingScheduler::new(config.aging_interval_hours),
            pending: PendingQueue::new(config.max_pending),
            archive: Mutex::new(HashMap::new()),
            audit: None,
            lock_timeout: config.lock_timeout(),
            store_timeout: config.store_timeout(),
            gate_single_resource_commits: config.gate_single_resource_commits,
        }
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(Mutex::new(audit));
        self
    }

    /// Arbitrate one request to completion.
    ///
    /// Terminal outcomes (commit, conflict, fatal store error) archive a
    /// decided copy of the request; retryable outcomes leave no trace. A
    /// request still waiting in the approval backlog is refused as invalid;
    /// it has to go through [`BookingEngine::approve`].
    pub fn submit(&self, request: &BookingRequest) -> Outcome {
        if self.pending.get(&request.id).is_some() {
            let outcome =
                Outcome::Invalid(format!("request {} is awaiting approval", request.id));
            self.log_outcome(request, &outcome);
            return outcome;
        }
        let outcome = self.process(request);
        match &outcome {
            Outcome::Committed(_) => {
                self.archive(request.clone(), RequestStatus::Committed);
            }
            Outcome::Conflict { .. } | Outcome::StoreError(_) if !outcome.is_retryable() => {
                self.archive(request.clone(), RequestStatus::Rejected);
            }
            _ => {}
        }
        outcome
    }

    /// Validate and add a request to the approval backlog.
    ///
    /// # Errors
    ///
    /// [`BookingError::InvalidRequest`] for a malformed or duplicate request,
    /// [`BookingError::QueueFull`] when the backlog is at capacity.
    pub fn enqueue(&self, request: BookingRequest) -> Result<RequestId, BookingError> {
        request.validate()?;
        if self.archive.lock().contains_key(&request.id) {
            return Err(BookingError::AlreadyDecided(request.id));
        }
        let id = request.id;
        self.pending.push(request.clone())?;
        self.record_audit(&request, "enqueue", None);
        tracing::info!("request {id} queued for approval");
        Ok(id)
    }

    /// Take a pending request out of the backlog and submit it.
    ///
    /// Committed requests become `Committed`; conflicts and fatal store errors
    /// mark them `Rejected`. Retryable outcomes put the request back, still
    /// pending.
    ///
    /// # Errors
    ///
    /// [`BookingError::AlreadyDecided`] if the request left the backlog
    /// earlier, [`BookingError::NotFound`] if it was never queued.
    pub fn approve(&self, id: RequestId) -> Result<Outcome, BookingError> {
        let request = self.take_pending(id)?;
        let outcome = self.process(&request);

        if outcome.is_committed() {
            self.record_audit(&request, "approve", None);
            tracing::info!("request {id} approved");
            self.archive(request, RequestStatus::Committed);
        } else if outcome.is_retryable() {
            tracing::debug!("request {id} returned to backlog after {}", outcome.label());
            self.pending.restore(request);
        } else {
            tracing::info!("request {id} rejected on approval: {}", outcome.label());
            self.archive(request, RequestStatus::Rejected);
        }
        Ok(outcome)
    }

    /// Turn down a pending request without touching any lock.
    ///
    /// # Errors
    ///
    /// Same as [`BookingEngine::approve`].
    pub fn reject(&self, id: RequestId) -> Result<BookingRequest, BookingError> {
        let request = self.take_pending(id)?;
        self.record_audit(&request, "reject", None);
        tracing::info!("request {id} rejected");
        Ok(self.archive(request, RequestStatus::Rejected))
    }

    /// Approve up to `limit` pending requests in aged-priority order.
    pub fn drain_pending(&self, limit: usize) -> Vec<(RequestId, Outcome)> {
        let mut decided = Vec::new();
        for entry in self.list_pending().into_iter().take(limit) {
            let id = entry.request.id;
            match self.approve(id) {
                Ok(outcome) => decided.push((id, outcome)),
                // Decided concurrently by another approver.
                Err(e) => tracing::debug!("skipping {id}: {e}"),
            }
        }
        decided
    }

    /// Pending requests ordered by aged priority at the engine clock's now.
    pub fn list_pending(&self) -> Vec<PrioritizedRequest> {
        self.list_pending_at(self.clock.now_ms())
    }

    /// Pending requests ordered by aged priority at `now_ms`.
    pub fn list_pending_at(&self, now_ms: u128) -> Vec<PrioritizedRequest> {
        self.scheduler.order(self.pending.snapshot(), now_ms)
    }

    /// Committed reservations on `resource` overlapping `range`, read under
    /// the schedule gate's shared side.
    ///
    /// # Errors
    ///
    /// [`BookingError::Store`] on a backend read failure.
    pub fn read_schedule(
        &self,
        resource: &ResourceId,
        range: &TimeWindow,
    ) -> Result<Vec<ReservationRecord>, BookingError> {
        let _ticket = self.gate.acquire_read();
        Ok(self.store.reservations(resource, range)?)
    }

    /// Candidates with no committed reservation overlapping `window`, in
    /// canonical order.
    ///
    /// # Errors
    ///
    /// [`BookingError::InvalidRequest`] for an empty window,
    /// [`BookingError::Store`] on a backend read failure.
    pub fn free_resources(
        &self,
        candidates: &[ResourceId],
        window: &TimeWindow,
    ) -> Result<Vec<ResourceId>, BookingError> {
        if window.is_empty() {
            return Err(BookingError::InvalidRequest(format!(
                "window [{}, {}) is empty",
                window.start_ms, window.end_ms
            )));
        }
        let _ticket = self.gate.acquire_read();
        let mut free = Vec::new();
        for resource in canonical_order(candidates) {
            if self.store.reservations(&resource, window)?.is_empty() {
                free.push(resource);
            }
        }
        Ok(free)
    }

    /// Look up a request, pending or decided.
    pub fn request(&self, id: RequestId) -> Option<BookingRequest> {
        self.pending
            .get(&id)
            .or_else(|| self.archive.lock().get(&id).cloned())
    }

    /// Known requests matching `filter`, newest first.
    pub fn list_requests(&self, filter: &RequestFilter) -> Vec<BookingRequest> {
        let mut found: Vec<BookingRequest> = self
            .pending
            .snapshot()
            .into_iter()
            .chain(self.archive.lock().values().cloned())
            .filter(|r| filter.matches(r))
            .collect();
        found.sort_by(|a, b| {
            b.created_at_ms
                .cmp(&a.created_at_ms)
                .then_with(|| a.id.cmp(&b.id))
        });
        found
    }

    /// Admission controller, for inspection.
    pub const fn admission(&self) -> &AdmissionController {
        &self.admission
    }

    /// Schedule gate, for inspection.
    pub const fn gate(&self) -> &ScheduleGate {
        &self.gate
    }

    /// Lock registry, for inspection.
    pub const fn registry(&self) -> &LockRegistry {
        &self.registry
    }

    /// Underlying reservation store.
    pub fn store(&self) -> &dyn ReservationStore {
        self.store.as_ref()
    }

    /// Number of requests awaiting approval.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn process(&self, request: &BookingRequest) -> Outcome {
        let outcome = match self.try_commit(request) {
            Ok(records) => Outcome::Committed(records),
            Err(e) => Outcome::from(e),
        };
        self.log_outcome(request, &outcome);
        outcome
    }

    fn try_commit(&self, request: &BookingRequest) -> Result<Vec<ReservationRecord>, BookingError> {
        request.validate()?;

        let _permit = self.admission.try_enter().ok_or_else(|| BookingError::Busy {
            active: self.admission.active(),
            capacity: self.admission.capacity(),
        })?;

        let locks = acquire_all(&self.registry, &request.resources, self.lock_timeout)?;

        let _ticket = (self.gate_single_resource_commits || locks.len() > 1)
            .then(|| self.gate.acquire_write());

        commit_under(
            &locks,
            self.store.as_ref(),
            request,
            self.store_timeout,
            self.clock.now_ms(),
        )
    }

    fn log_outcome(&self, request: &BookingRequest, outcome: &Outcome) {
        let id = request.id;
        let detail = match outcome {
            Outcome::Committed(records) => {
                tracing::info!("request {id} committed {} reservation(s)", records.len());
                None
            }
            Outcome::Conflict { resource, holder } => {
                tracing::info!("request {id} conflicts on {resource} with {holder}");
                Some(format!("{resource} held by {holder}"))
            }
            Outcome::Busy { active, capacity } => {
                tracing::warn!("request {id} turned away: {active}/{capacity} slots in use");
                None
            }
            Outcome::LockTimeout { resource, waited } => {
                tracing::warn!("request {id} timed out after {waited:?} on {resource}");
                Some(resource.to_string())
            }
            Outcome::StoreError(e) => {
                tracing::error!("request {id} failed in store: {e}");
                Some(e.to_string())
            }
            Outcome::Invalid(reason) => {
                tracing::debug!("request {id} invalid: {reason}");
                Some(reason.clone())
            }
        };
        self.record_audit(request, outcome.label(), detail);
    }

    fn take_pending(&self, id: RequestId) -> Result<BookingRequest, BookingError> {
        self.pending.take(&id).ok_or_else(|| {
            if self.archive.lock().contains_key(&id) {
                BookingError::AlreadyDecided(id)
            } else {
                BookingError::NotFound(id)
            }
        })
    }

    /// First decision wins; a later one for the same id is ignored.
    fn archive(&self, mut request: BookingRequest, status: RequestStatus) -> BookingRequest {
        request.decide(status, self.clock.now_ms());
        self.archive
            .lock()
            .entry(request.id)
            .or_insert(request)
            .clone()
    }

    fn record_audit(&self, request: &BookingRequest, action: &str, detail: Option<String>) {
        if let Some(audit) = &self.audit {
            let event = build_audit_event(request, action, detail, self.clock.now_ms());
            audit.lock().record(event);
        }
    }
}

impl std::fmt::Debug for BookingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingEngine")
            .field("admission", &self.admission)
            .field("gate", &self.gate.snapshot())
            .field("pending", &self.pending.len())
            .field("lock_timeout", &self.lock_timeout)
            .field("store_timeout", &self.store_timeout)
            .finish_non_exhaustive()
    }
}
