//! Serializable domain primitives shared across the crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of an exclusively bookable resource (a room).
///
/// The derived `Ord` is lexicographic over the id string; it is the single
/// canonical order every multi-resource acquisition follows.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Wrap a raw id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ResourceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Unique identifier of a booking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Base priority of a booking request. Lower rank is more urgent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Rank 1.
    Urgent,
    /// Rank 2.
    High,
    /// Rank 3.
    #[default]
    Normal,
    /// Rank 4.
    Low,
}

impl Priority {
    /// Numeric rank: urgent=1, high=2, normal=3, low=4.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Urgent => 1,
            Self::High => 2,
            Self::Normal => 3,
            Self::Low => 4,
        }
    }

    /// Inverse of [`Priority::rank`].
    #[must_use]
    pub const fn from_rank(rank: u8) -> Option<Self> {
        match rank {
            1 => Some(Self::Urgent),
            2 => Some(Self::High),
            3 => Some(Self::Normal),
            4 => Some(Self::Low),
            _ => None,
        }
    }

    /// Parse a priority label, falling back to `Normal` for anything unknown.
    #[must_use]
    pub fn parse_or_normal(label: &str) -> Self {
        label.parse().unwrap_or_default()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
        })
    }
}

/// Error returned when a priority label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority: {0}")]
pub struct UnknownPriority(pub String);

impl FromStr for Priority {
    type Err = UnknownPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "urgent" => Ok(Self::Urgent),
            "high" => Ok(Self::High),
            "normal" => Ok(Self::Normal),
            "low" => Ok(Self::Low),
            other => Err(UnknownPriority(other.to_owned())),
        }
    }
}

/// Half-open time window `[start_ms, end_ms)` in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Inclusive start.
    pub start_ms: u128,
    /// Exclusive end.
    pub end_ms: u128,
}

impl TimeWindow {
    /// Build a window. Does not validate; see [`TimeWindow::is_empty`].
    #[must_use]
    pub const fn new(start_ms: u128, end_ms: u128) -> Self {
        Self { start_ms, end_ms }
    }

    /// True when the window covers no time (`start >= end`).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start_ms >= self.end_ms
    }

    /// Length in milliseconds, zero for empty windows.
    #[must_use]
    pub const fn duration_ms(&self) -> u128 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Two half-open windows overlap iff each starts before the other ends.
    /// Back-to-back windows (`a.end == b.start`) do not overlap.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start_ms < other.end_ms && other.start_ms < self.end_ms
    }
}
