//! Integration tests for command output
//!
//! These tests run the binary and verify that JSON output is a single valid
//! document and that the sample datasets flow through analysis.

use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const CONFIG_ENV: [&str; 4] =
    ["INFRARISK_API_KEY", "INFRARISK_SLACK_M", "INFRARISK_STRATEGY", "INFRARISK_SCALE_LONGITUDE"];

fn infrarisk(dir: &Path, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_infrarisk"));
    command.args(args).current_dir(dir).env("RUST_LOG", "warn");
    for var in CONFIG_ENV {
        command.env_remove(var);
    }
    command.output().expect("Failed to execute command")
}

fn json_stdout(output: &Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

#[test]
fn test_sample_then_analyze() {
    let dir = TempDir::new().unwrap();

    let output = infrarisk(dir.path(), &["sample", "--out-dir", "data", "--json"]);
    assert!(output.status.success(), "sample should succeed");
    let parsed = json_stdout(&output);
    assert_eq!(parsed["status"], "success");
    assert_eq!(parsed["data"]["files"].as_array().map(Vec::len), Some(2));
    assert!(dir.path().join("data/bridges.json").exists());
    assert!(dir.path().join("data/pipes.json").exists());

    let output = infrarisk(
        dir.path(),
        &["analyze", "--areas", "data/bridges.json", "--linears", "data/pipes.json", "--json"],
    );
    assert!(output.status.success(), "analyze should succeed");
    let data = &json_stdout(&output)["data"];
    assert_eq!(data["stats"]["area_total"], 12);
    assert_eq!(data["stats"]["linear_total"], 16);
    assert_eq!(data["stats"]["intersecting_pairs"], 8);
    assert_eq!(data["stats"]["high_risk"], 4);
    assert_eq!(data["matches"].as_array().map(Vec::len), Some(8));
    assert_eq!(data["parameters"]["strategy"], "pairwise");
}

#[test]
fn test_high_only_listing_keeps_full_report() {
    let dir = TempDir::new().unwrap();
    assert!(infrarisk(dir.path(), &["sample", "--json"]).status.success());

    let output = infrarisk(
        dir.path(),
        &[
            "analyze",
            "--areas",
            "bridges.json",
            "--linears",
            "pipes.json",
            "--strategy",
            "rtree",
            "--high-only",
            "--out",
            "report.json",
            "--json",
        ],
    );
    assert!(output.status.success(), "analyze should succeed");

    let data = &json_stdout(&output)["data"];
    let matches = data["matches"].as_array().cloned().unwrap_or_default();
    assert_eq!(matches.len(), 4);
    assert!(matches.iter().all(|m| m["risk_level"] == "HIGH"));

    let report: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("report.json")).unwrap())
            .unwrap();
    assert_eq!(report["matches"].as_array().map(Vec::len), Some(8));
}

#[test]
fn test_fetch_from_sample_catalog() {
    let dir = TempDir::new().unwrap();

    let output = infrarisk(
        dir.path(),
        &["fetch", "--dataset", "water", "--sample", "--out", "water.json", "--json"],
    );
    assert!(output.status.success(), "fetch should succeed");

    let data = &json_stdout(&output)["data"];
    assert_eq!(data["dataset"], "water");
    assert_eq!(data["source"], "sample");
    assert_eq!(data["entity_count"], 16);

    let saved: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("water.json")).unwrap())
            .unwrap();
    assert_eq!(saved["dataset"], "water");
    assert!(saved["fetched_at"].is_string());
    assert_eq!(saved["entities"][0]["category"], "LinearAsset");
}

#[test]
fn test_fetch_without_api_key_fails_with_help() {
    let dir = TempDir::new().unwrap();

    let output = infrarisk(dir.path(), &["fetch", "--dataset", "bridge", "--term", "広島県"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("API key"), "stderr: {}", stderr);
    assert!(stderr.contains("INFRARISK_API_KEY"));
    assert!(!dir.path().join("bridge.json").exists());
}

#[test]
fn test_analyze_missing_file() {
    let dir = TempDir::new().unwrap();

    let output = infrarisk(dir.path(), &["analyze", "--areas", "a.json", "--linears", "b.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Entity file not found"));
}

#[test]
fn test_config_reports_sources() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("infrarisk.toml"), "strategy = \"rtree\"\n").unwrap();

    let mut command = Command::new(env!("CARGO_BIN_EXE_infrarisk"));
    command.args(["config", "--json"]).current_dir(dir.path()).env("RUST_LOG", "warn");
    for var in CONFIG_ENV {
        command.env_remove(var);
    }
    let output = command.env("INFRARISK_SLACK_M", "1.25").output().unwrap();
    assert!(output.status.success());

    let data = &json_stdout(&output)["data"];
    assert_eq!(data["config_file"], "infrarisk.toml");

    let values = data["values"].as_array().cloned().unwrap_or_default();
    let entry = |key: &str| values.iter().find(|v| v["key"] == key).cloned().unwrap();

    assert_eq!(entry("slack_m")["value"], "1.25");
    assert_eq!(entry("slack_m")["source"], "Environment");
    assert_eq!(entry("strategy")["value"], "rtree");
    assert_eq!(entry("strategy")["source"], "File");
    assert_eq!(entry("api_key")["value"], "<unset>");
    assert_eq!(entry("page_size")["source"], "Default");
}
