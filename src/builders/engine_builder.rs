//! Engine construction from configuration.

use std::sync::Arc;

use anyhow::Context;

use crate::config::{EngineConfig, StoreBackendConfig};
use crate::core::{AppResult, AuditSink, BookingEngine, BookingError, StoreError};
use crate::infra::store::{FileStore, InMemoryStore, ReservationStore};
use crate::util::clock::{Clock, SystemClock};

/// Open the store backend named by `cfg`.
///
/// # Errors
///
/// Propagates [`StoreError`] from opening or replaying a file store.
pub fn build_store(cfg: &StoreBackendConfig) -> Result<Arc<dyn ReservationStore>, StoreError> {
    match cfg {
        StoreBackendConfig::InMemory => Ok(Arc::new(InMemoryStore::new())),
        StoreBackendConfig::File { path } => {
            tracing::info!("opening reservation journal at {}", path.display());
            Ok(Arc::new(FileStore::open(path)?))
        }
    }
}

/// Assembles a [`BookingEngine`] from an [`EngineConfig`], with optional
/// overrides for the store, clock, and audit sink.
pub struct EngineBuilder {
    config: EngineConfig,
    store: Option<Arc<dyn ReservationStore>>,
    clock: Arc<dyn Clock>,
    audit: Option<Box<dyn AuditSink>>,
}

impl EngineBuilder {
    /// Start from `config`.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            store: None,
            clock: Arc::new(SystemClock),
            audit: None,
        }
    }

    /// Use `store` instead of the backend named in the config.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ReservationStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use `clock` instead of the system clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Validate the config, open the store if none was supplied, and build.
    ///
    /// # Errors
    ///
    /// [`BookingError::Config`] for invalid settings, [`BookingError::Store`]
    /// if the configured backend cannot be opened.
    pub fn build(self) -> Result<BookingEngine, BookingError> {
        self.config.validate().map_err(BookingError::Config)?;
        let store = match self.store {
            Some(store) => store,
            None => build_store(&self.config.store)?,
        };
        let engine = BookingEngine::new(&self.config, store, self.clock);
        tracing::info!(
            "booking engine ready: admission capacity {}, lock timeout {:?}",
            self.config.admission_capacity,
            self.config.lock_timeout()
        );
        Ok(match self.audit {
            Some(audit) => engine.with_audit(audit),
            None => engine,
        })
    }
}

/// Read `.env` and `BOOKING_*` variables and build an engine on the system clock.
///
/// # Errors
///
/// Configuration or store failures, with context.
pub fn build_engine_from_env() -> AppResult<BookingEngine> {
    let config = EngineConfig::from_env()
        .map_err(anyhow::Error::msg)
        .context("loading booking configuration")?;
    EngineBuilder::new(config)
        .build()
        .context("building booking engine")
}
