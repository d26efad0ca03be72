use std::fs;

use fragment_host::config::{ConfigError, HostConfig};
use fragment_host::util::BreakpointPreset;
use tempfile::TempDir;

fn write_config(content: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("config.toml");
    fs::write(&path, content).expect("Failed to write config");
    (dir, path)
}

#[test]
fn test_config_path_ends_with_expected() {
    let path = HostConfig::config_path();
    assert!(path.ends_with("fragment-host/config.toml"));
}

#[test]
fn test_default_timing_values() {
    let config = HostConfig::default();
    assert_eq!(config.timing.search_debounce_ms, 300);
    assert_eq!(config.timing.resize_debounce_ms, 250);
    assert_eq!(config.timing.live_refresh_secs, 30);
    assert_eq!(config.timing.label_refresh_secs, 60);
    assert_eq!(config.timing.sidebar_refresh_secs, 300);
    assert_eq!(config.timing.feedback_ms, 2000);
    assert!(config.analytics.enabled);
    assert_eq!(config.logging.filter, "info");
    assert_eq!(config.breakpoints.preset, BreakpointPreset::Grid);
}

#[test]
fn test_load_full_file() {
    let (_dir, path) = write_config(
        r#"
[timing]
search_debounce_ms = 150
live_refresh_secs = 10

[breakpoints]
preset = "device"

[analytics]
enabled = false

[logging]
filter = "fragment_host=debug"
"#,
    );

    let config = HostConfig::load_from(&path).expect("valid config");
    assert_eq!(config.timing.search_debounce_ms, 150);
    assert_eq!(config.timing.live_refresh_secs, 10);
    assert_eq!(config.timing.resize_debounce_ms, 250);
    assert!(!config.analytics.enabled);
    assert_eq!(config.logging.filter, "fragment_host=debug");

    let table = config.breakpoints.table().expect("preset table");
    assert_eq!(table.resolve(800), "desktop-small");
}

#[test]
fn test_custom_tiers() {
    let (_dir, path) = write_config(
        r#"
[breakpoints]
tiers = [
  { min_width = 900, label = "wide" },
  { min_width = 0, label = "narrow" },
]
"#,
    );

    let config = HostConfig::load_from(&path).expect("valid config");
    let table = config.breakpoints.table().expect("custom table");
    assert_eq!(table.resolve(1000), "wide");
    assert_eq!(table.resolve(899), "narrow");
}

#[test]
fn test_unordered_tiers_rejected() {
    let (_dir, path) = write_config(
        r#"
[breakpoints]
tiers = [
  { min_width = 0, label = "narrow" },
  { min_width = 900, label = "wide" },
]
"#,
    );

    let err = HostConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { .. }));
}

#[test]
fn test_zero_timing_rejected() {
    let (_dir, path) = write_config("[timing]\nfeedback_ms = 0\n");
    match HostConfig::load_from(&path) {
        Err(ConfigError::ValidationError { message }) => {
            assert!(message.contains("timing.feedback_ms"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_missing_file_is_read_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let err = HostConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadError { .. }));
}

#[test]
fn test_malformed_file_is_parse_error() {
    let (_dir, path) = write_config("[timing\nsearch_debounce_ms = ");
    let err = HostConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
    assert!(err.to_string().contains("config.toml"));
}
