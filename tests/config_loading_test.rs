//! Configuration loading tests
//!
//! Layering of defaults, TOML file, and EUNOIA__* environment overrides.
//! Tests touching the environment run serially.

use eunoia_core::{EngineConfig, EunoiaError};
use serial_test::serial;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("eunoia.toml");
    fs::write(&path, contents).unwrap();
    path
}

fn clear_overrides() {
    for key in [
        "EUNOIA__FACT_SCORE_MIN",
        "EUNOIA__WINDOW_SIZE",
        "EUNOIA__VERIFIER_CACHE__CAPACITY",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_load_without_sources_gives_defaults() {
    clear_overrides();
    let config = EngineConfig::load(None).unwrap();
    assert_eq!(config, EngineConfig::default());
}

#[test]
#[serial]
fn test_load_from_file() {
    clear_overrides();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        emotion_drift_max = 0.2
        regenerator_timeout = 15

        [verifier_cache]
        enabled = false
        "#,
    );

    let config = EngineConfig::load(Some(&path)).unwrap();
    assert_eq!(config.emotion_drift_max, 0.2);
    assert_eq!(config.regenerator_timeout, Duration::from_secs(15));
    assert!(!config.verifier_cache.enabled);
    assert_eq!(config.window_size, 30);
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_overrides();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "fact_score_min = 0.8\n");

    std::env::set_var("EUNOIA__FACT_SCORE_MIN", "0.9");
    std::env::set_var("EUNOIA__VERIFIER_CACHE__CAPACITY", "8");
    let config = EngineConfig::load(Some(&path));
    clear_overrides();

    let config = config.unwrap();
    assert_eq!(config.fact_score_min, 0.9);
    assert_eq!(config.verifier_cache.capacity, 8);
}

#[test]
#[serial]
fn test_invalid_override_rejected() {
    clear_overrides();
    std::env::set_var("EUNOIA__WINDOW_SIZE", "0");
    let result = EngineConfig::load(None);
    clear_overrides();

    assert!(matches!(result, Err(EunoiaError::Config(_))));
}

#[test]
fn test_from_file_reports_parse_errors() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "fact_score_min = \"high\"\n");

    let err = EngineConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, EunoiaError::ConfigParse(_)));
}

#[test]
fn test_from_file_missing_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = EngineConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, EunoiaError::Io(_)));
}
