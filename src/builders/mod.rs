//! Builders to construct booking engines from configuration.

pub mod engine_builder;

pub use engine_builder::{build_engine_from_env, build_store, EngineBuilder};
