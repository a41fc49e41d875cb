//! Engine configuration structures.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::acquisition::DEFAULT_LOCK_TIMEOUT;
use crate::core::admission::DEFAULT_ADMISSION_CAPACITY;
use crate::core::pending::DEFAULT_MAX_PENDING;
use crate::core::scheduler::DEFAULT_AGING_INTERVAL_HOURS;
use crate::infra::store::DEFAULT_STORE_TIMEOUT;

#[allow(clippy::cast_possible_truncation)]
const DEFAULT_LOCK_TIMEOUT_MS: u64 = DEFAULT_LOCK_TIMEOUT.as_millis() as u64;
#[allow(clippy::cast_possible_truncation)]
const DEFAULT_STORE_TIMEOUT_MS: u64 = DEFAULT_STORE_TIMEOUT.as_millis() as u64;

/// Reservation store backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackendConfig {
    /// In-memory store for development/testing.
    #[default]
    InMemory,
    /// JSON-lines journal on local disk.
    File {
        /// Journal file location.
        path: PathBuf,
    },
}

/// Booking engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum concurrent booking attempts.
    pub admission_capacity: u32,
    /// Bound on waiting for each resource lock, in milliseconds.
    pub lock_timeout_ms: u64,
    /// Bound on opening a store transaction, in milliseconds.
    pub store_timeout_ms: u64,
    /// Maximum pending requests before enqueue is refused.
    pub max_pending: usize,
    /// Take the schedule write gate for single-resource commits too.
    pub gate_single_resource_commits: bool,
    /// Hours of waiting that improve a pending request's priority by one.
    pub aging_interval_hours: u64,
    /// Store backend selection.
    pub store: StoreBackendConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            admission_capacity: DEFAULT_ADMISSION_CAPACITY,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            store_timeout_ms: DEFAULT_STORE_TIMEOUT_MS,
            max_pending: DEFAULT_MAX_PENDING,
            gate_single_resource_commits: true,
            aging_interval_hours: DEFAULT_AGING_INTERVAL_HOURS,
            store: StoreBackendConfig::InMemory,
        }
    }
}

impl EngineConfig {
    /// Lock acquisition bound as a `Duration`.
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Store transaction bound as a `Duration`.
    #[must_use]
    pub const fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.admission_capacity == 0 {
            return Err("admission_capacity must be greater than 0".into());
        }
        if self.lock_timeout_ms == 0 {
            return Err("lock_timeout_ms must be greater than 0".into());
        }
        if self.store_timeout_ms == 0 {
            return Err("store_timeout_ms must be greater than 0".into());
        }
        if self.max_pending == 0 {
            return Err("max_pending must be greater than 0".into());
        }
        if self.aging_interval_hours == 0 {
            return Err("aging_interval_hours must be greater than 0".into());
        }
        if let StoreBackendConfig::File { path } = &self.store {
            if path.as_os_str().is_empty() {
                return Err("file store path must not be empty".into());
            }
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate. Missing fields
    /// take their defaults.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: EngineConfig =
            serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load `.env` if present, then apply `BOOKING_*` variables over the defaults.
    ///
    /// Recognised variables: `BOOKING_ADMISSION_CAPACITY`,
    /// `BOOKING_LOCK_TIMEOUT_MS`, `BOOKING_STORE_TIMEOUT_MS`,
    /// `BOOKING_MAX_PENDING`, `BOOKING_GATE_SINGLE_RESOURCE_COMMITS`,
    /// `BOOKING_AGING_INTERVAL_HOURS`, and `BOOKING_STORE_PATH` (selects the
    /// file store when set).
    pub fn from_env() -> Result<Self, String> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(format!(".env error: {e}"));
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; `from_env` with the process
    /// environment swapped out.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut cfg = Self::default();
        if let Some(v) = parse_var(&lookup, "BOOKING_ADMISSION_CAPACITY")? {
            cfg.admission_capacity = v;
        }
        if let Some(v) = parse_var(&lookup, "BOOKING_LOCK_TIMEOUT_MS")? {
            cfg.lock_timeout_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "BOOKING_STORE_TIMEOUT_MS")? {
            cfg.store_timeout_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "BOOKING_MAX_PENDING")? {
            cfg.max_pending = v;
        }
        if let Some(v) = parse_var(&lookup, "BOOKING_GATE_SINGLE_RESOURCE_COMMITS")? {
            cfg.gate_single_resource_commits = v;
        }
        if let Some(v) = parse_var(&lookup, "BOOKING_AGING_INTERVAL_HOURS")? {
            cfg.aging_interval_hours = v;
        }
        if let Some(path) = lookup("BOOKING_STORE_PATH").filter(|p| !p.trim().is_empty()) {
            cfg.store = StoreBackendConfig::File {
                path: PathBuf::from(path),
            };
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| format!("{key}={raw:?}: {e}"))
        })
        .transpose()
}
