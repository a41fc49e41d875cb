//! Tests for configuration validation

use std::path::PathBuf;

use prometheus_room_booking::config::{EngineConfig, StoreBackendConfig};

#[test]
fn test_engine_config_defaults() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.admission_capacity, 5);
    assert_eq!(cfg.lock_timeout_ms, 10_000);
    assert_eq!(cfg.store_timeout_ms, 10_000);
    assert_eq!(cfg.max_pending, 1_000);
    assert_eq!(cfg.aging_interval_hours, 24);
    assert!(cfg.gate_single_resource_commits);
    assert_eq!(cfg.store, StoreBackendConfig::InMemory);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_engine_config_invalid_values() {
    let zeroed = [
        EngineConfig {
            admission_capacity: 0,
            ..EngineConfig::default()
        },
        EngineConfig {
            lock_timeout_ms: 0,
            ..EngineConfig::default()
        },
        EngineConfig {
            store_timeout_ms: 0,
            ..EngineConfig::default()
        },
        EngineConfig {
            max_pending: 0,
            ..EngineConfig::default()
        },
        EngineConfig {
            aging_interval_hours: 0,
            ..EngineConfig::default()
        },
    ];
    for cfg in zeroed {
        assert!(cfg.validate().is_err(), "{cfg:?} should be rejected");
    }
}

#[test]
fn test_from_json_fills_defaults() {
    let cfg = EngineConfig::from_json_str(r#"{ "admission_capacity": 3 }"#).unwrap();
    assert_eq!(cfg.admission_capacity, 3);
    assert_eq!(cfg.lock_timeout_ms, 10_000);
}

#[test]
fn test_from_json_file_backend() {
    let json = r#"{
        "lock_timeout_ms": 250,
        "store": { "file": { "path": "/var/lib/booking/reservations.jsonl" } }
    }"#;
    let cfg = EngineConfig::from_json_str(json).unwrap();
    assert_eq!(
        cfg.store,
        StoreBackendConfig::File {
            path: PathBuf::from("/var/lib/booking/reservations.jsonl")
        }
    );
    assert_eq!(cfg.lock_timeout().as_millis(), 250);
}

#[test]
fn test_from_json_rejects_invalid() {
    assert!(EngineConfig::from_json_str("not json").is_err());
    assert!(EngineConfig::from_json_str(r#"{ "max_pending": 0 }"#).is_err());
    assert!(EngineConfig::from_json_str(r#"{ "store": { "file": { "path": "" } } }"#).is_err());
}

#[test]
fn test_from_lookup_without_variables_is_default() {
    let cfg = EngineConfig::from_lookup(|_| None).unwrap();
    assert_eq!(cfg, EngineConfig::default());
}
