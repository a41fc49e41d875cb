//! Configuration models for the engine, store backend, and timeouts.

pub mod engine;

pub use engine::{EngineConfig, StoreBackendConfig};
