//! Integration tests for layered configuration
//!
//! These tests verify that configuration loading follows the correct precedence:
//! CLI arguments > Environment variables > Config file > Defaults

use infrarisk_core::config::{
    CliConfigOverrides, ConfigSource, LayeredConfig, MatchStrategy, DEFAULT_ENDPOINT,
};
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

const ENV_VARS: [&str; 6] = [
    "INFRARISK_SLACK_M",
    "INFRARISK_SCALE_LONGITUDE",
    "INFRARISK_STRATEGY",
    "INFRARISK_BUFFER_SEGMENTS",
    "INFRARISK_API_KEY",
    "INFRARISK_MAX_RECORDS",
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", contents).unwrap();
    file
}

#[test]
fn test_default_configuration() {
    let config = LayeredConfig::with_defaults();

    assert_eq!(config.slack_m.value, 0.5);
    assert_eq!(config.default_width_m.value, 4.0);
    assert_eq!(config.buffer_segments.value, 64);
    assert_eq!(config.endpoint.value, DEFAULT_ENDPOINT);
    assert_eq!(config.page_size.value, 500);
    assert_eq!(config.max_records.value, 2000);
    assert_eq!(config.page_delay_ms.value, 500);
    assert!(config.scale_longitude.value);
}

#[test]
fn test_partial_file_configuration() {
    let file = config_file(
        r#"
slack_m = 1.0
# Only override slack, leave others as defaults
"#,
    );

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

    assert_eq!(config.slack_m.value, 1.0);
    assert_eq!(config.slack_m.source, ConfigSource::File);
    assert_eq!(config.strategy.value, MatchStrategy::Pairwise);
    assert_eq!(config.strategy.source, ConfigSource::Default);
}

#[test]
fn test_malformed_file_is_rejected() {
    let file = config_file("slack_m = \"half a meter\"");
    assert!(LayeredConfig::with_defaults().load_from_file(file.path()).is_err());
}

#[test]
fn test_missing_file_is_rejected() {
    let result = LayeredConfig::with_defaults().load_from_file("/nonexistent/infrarisk.toml");
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    env::set_var("INFRARISK_SLACK_M", "0.75");
    env::set_var("INFRARISK_STRATEGY", "rtree");
    env::set_var("INFRARISK_API_KEY", "env-key");
    env::set_var("INFRARISK_SCALE_LONGITUDE", "off");

    let file = config_file(
        r#"
slack_m = 1.0
strategy = "pairwise"
buffer_segments = 32
"#,
    );

    let config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();

    assert_eq!(config.slack_m.value, 0.75);
    assert_eq!(config.slack_m.source, ConfigSource::Environment);
    assert_eq!(config.strategy.value, MatchStrategy::Rtree);
    assert_eq!(config.buffer_segments.value, 32);
    assert_eq!(config.buffer_segments.source, ConfigSource::File);
    assert_eq!(config.to_catalog_config().api_key.as_deref(), Some("env-key"));
    assert!(!config.to_analysis_config().scale_longitude);
    assert_eq!(config.scale_longitude.source, ConfigSource::Environment);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_environment_values_are_ignored() {
    clear_env();
    env::set_var("INFRARISK_SLACK_M", "-2");
    env::set_var("INFRARISK_BUFFER_SEGMENTS", "three");
    env::set_var("INFRARISK_MAX_RECORDS", "0");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.slack_m.value, 0.5);
    assert_eq!(config.slack_m.source, ConfigSource::Default);
    assert_eq!(config.buffer_segments.source, ConfigSource::Default);
    assert_eq!(config.max_records.value, 2000);

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_everything() {
    clear_env();
    env::set_var("INFRARISK_SLACK_M", "0.75");

    let file = config_file("slack_m = 1.0");

    let mut config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();

    config
        .update_from_cli(CliConfigOverrides { slack_m: Some(0.25), ..Default::default() })
        .unwrap();

    assert_eq!(config.slack_m.value, 0.25);
    assert_eq!(config.slack_m.source, ConfigSource::Cli);
    assert_eq!(config.to_analysis_config().slack_m, 0.25);

    clear_env();
}
