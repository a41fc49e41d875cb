//! Priority aging for the pending backlog.
//!
//! Effective priority is a pure function of the stored creation time and the
//! current time, recomputed on every read. There is no background timer.

use std::cmp::Ordering;

use serde::Serialize;

use crate::core::BookingRequest;
use crate::util::clock::MS_PER_HOUR;
use crate::util::serde::Priority;

/// Default hours of waiting that buy one step of urgency.
pub const DEFAULT_AGING_INTERVAL_HOURS: u64 = 24;

/// `max(1, base - floor(age_hours / 24))`.
///
/// A creation time in the future counts as zero age.
#[must_use]
pub fn effective_priority(base: Priority, created_at_ms: u128, now_ms: u128) -> u8 {
    aged_priority(base, created_at_ms, now_ms, DEFAULT_AGING_INTERVAL_HOURS)
}

/// [`effective_priority`] with a configurable aging interval.
#[must_use]
pub fn aged_priority(base: Priority, created_at_ms: u128, now_ms: u128, interval_hours: u64) -> u8 {
    let interval_ms = u128::from(interval_hours.max(1)) * MS_PER_HOUR;
    let steps = now_ms.saturating_sub(created_at_ms) / interval_ms;
    let bonus = u8::try_from(steps).unwrap_or(u8::MAX);
    base.rank().saturating_sub(bonus).max(1)
}

/// Hours waited so far, rounded to one decimal.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn waiting_hours(created_at_ms: u128, now_ms: u128) -> f64 {
    let age_ms = now_ms.saturating_sub(created_at_ms) as f64;
    (age_ms / MS_PER_HOUR as f64 * 10.0).round() / 10.0
}

/// A pending request annotated with its aged priority.
#[derive(Debug, Clone, Serialize)]
pub struct PrioritizedRequest {
    /// The request itself.
    pub request: BookingRequest,
    /// Aged priority, 1 = most urgent.
    pub effective_priority: u8,
    /// Hours since creation, one decimal.
    pub waiting_hours: f64,
}

/// Orders pending requests by aged priority, oldest first within a level.
#[derive(Debug, Clone, Copy)]
pub struct AgingScheduler {
    interval_hours: u64,
}

impl Default for AgingScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_AGING_INTERVAL_HOURS)
    }
}

impl AgingScheduler {
    /// Scheduler where every `interval_hours` of waiting improves rank by one.
    #[must_use]
    pub const fn new(interval_hours: u64) -> Self {
        Self { interval_hours }
    }

    /// Aged priority of one request at `now_ms`.
    #[must_use]
    pub fn priority_of(&self, request: &BookingRequest, now_ms: u128) -> u8 {
        aged_priority(request.priority, request.created_at_ms, now_ms, self.interval_hours)
    }

    /// Annotate and sort a snapshot of pending requests.
    pub fn order(
        &self,
        pending: impl IntoIterator<Item = BookingRequest>,
        now_ms: u128,
    ) -> Vec<PrioritizedRequest> {
        let mut ranked: Vec<PrioritizedRequest> = pending
            .into_iter()
            .map(|request| PrioritizedRequest {
                effective_priority: self.priority_of(&request, now_ms),
                waiting_hours: waiting_hours(request.created_at_ms, now_ms),
                request,
            })
            .collect();
        ranked.sort_by(compare);
        ranked
    }
}

fn compare(a: &PrioritizedRequest, b: &PrioritizedRequest) -> Ordering {
    a.effective_priority
        .cmp(&b.effective_priority)
        .then_with(|| a.request.created_at_ms.cmp(&b.request.created_at_ms))
        .then_with(|| a.request.id.cmp(&b.request.id))
}
