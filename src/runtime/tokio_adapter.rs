//! Tokio adapter running the blocking engine on the blocking thread pool.

use std::sync::Arc;

use crate::core::{
    BookingEngine, BookingError, BookingRequest, Outcome, PrioritizedRequest, ReservationRecord,
};
use crate::util::serde::{RequestId, ResourceId, TimeWindow};

/// Async facade over a shared [`BookingEngine`].
///
/// Lock waits and store transactions may park a thread for up to their
/// configured timeouts, so every call is moved onto
/// `tokio::task::spawn_blocking` instead of running on a runtime worker.
#[derive(Debug, Clone)]
pub struct AsyncBookingEngine {
    engine: Arc<BookingEngine>,
}

impl AsyncBookingEngine {
    /// Wrap a shared engine.
    #[must_use]
    pub const fn new(engine: Arc<BookingEngine>) -> Self {
        Self { engine }
    }

    /// The wrapped engine, for synchronous callers.
    #[must_use]
    pub fn engine(&self) -> &Arc<BookingEngine> {
        &self.engine
    }

    /// Async [`BookingEngine::submit`].
    ///
    /// # Errors
    ///
    /// [`BookingError::Runtime`] if the blocking task panicked or was cancelled.
    pub async fn submit(&self, request: BookingRequest) -> Result<Outcome, BookingError> {
        self.run(move |engine| engine.submit(&request)).await
    }

    /// Async [`BookingEngine::enqueue`].
    ///
    /// # Errors
    ///
    /// Engine errors, or [`BookingError::Runtime`] on a join failure.
    pub async fn enqueue(&self, request: BookingRequest) -> Result<RequestId, BookingError> {
        self.run(move |engine| engine.enqueue(request)).await?
    }

    /// Async [`BookingEngine::approve`].
    ///
    /// # Errors
    ///
    /// Engine errors, or [`BookingError::Runtime`] on a join failure.
    pub async fn approve(&self, id: RequestId) -> Result<Outcome, BookingError> {
        self.run(move |engine| engine.approve(id)).await?
    }

    /// Async [`BookingEngine::list_pending`].
    ///
    /// # Errors
    ///
    /// [`BookingError::Runtime`] on a join failure.
    pub async fn list_pending(&self) -> Result<Vec<PrioritizedRequest>, BookingError> {
        self.run(BookingEngine::list_pending).await
    }

    /// Async [`BookingEngine::read_schedule`].
    ///
    /// # Errors
    ///
    /// Engine errors, or [`BookingError::Runtime`] on a join failure.
    pub async fn read_schedule(
        &self,
        resource: ResourceId,
        range: TimeWindow,
    ) -> Result<Vec<ReservationRecord>, BookingError> {
        self.run(move |engine| engine.read_schedule(&resource, &range))
            .await?
    }

    async fn run<F, T>(&self, f: F) -> Result<T, BookingError>
    where
        F: FnOnce(&BookingEngine) -> T + Send + 'static,
        T: Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || f(&engine))
            .await
            .map_err(|e| {
                tracing::error!("blocking booking task failed: {e}");
                BookingError::Runtime(e.to_string())
            })
    }
}
