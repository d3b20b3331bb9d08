//! E2E tests for `tg analyze`, `tg condense` and `tg check`.
//!
//! Each test writes graph descriptions into a temp directory and runs the
//! binary there, so `taskgraph.toml` discovery only sees what the test puts
//! down.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCENARIO: &str = r#"{
    "directed": true,
    "n": 5,
    "edges": [
        {"u": 0, "v": 1, "w": 1},
        {"u": 1, "v": 2, "w": 1},
        {"u": 2, "v": 0, "w": 1},
        {"u": 2, "v": 3, "w": 2},
        {"u": 3, "v": 4, "w": 3}
    ],
    "source": 0
}"#;

const CHAIN: &str = r#"{"n": 3, "edges": [{"u": 0, "v": 1}, {"u": 1, "v": 2}]}"#;

fn tg_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tg"));
    cmd.current_dir(dir);
    cmd.env("TASKGRAPH_LOG", "error");
    cmd.env("XDG_CONFIG_HOME", dir.join("xdg"));
    cmd.env_remove("FORMAT");
    cmd.env_remove("TASKGRAPH_TIMING");
    cmd
}

fn write_graph(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).expect("write graph file");
    path
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = tg_cmd(dir)
        .args(args)
        .args(["--format", "json"])
        .output()
        .expect("tg should not crash");
    assert!(
        output.status.success(),
        "tg {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout must be JSON")
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

#[test]
fn analyze_json_reports_every_stage() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "tasks.json", SCENARIO);

    let json = run_json(dir.path(), &["analyze", "tasks.json"]);

    assert_eq!(json["nodes"], 5);
    assert_eq!(json["components"].as_array().unwrap().len(), 3);
    assert_eq!(json["order"], serde_json::json!([2, 1, 0]));
    assert_eq!(json["expanded_order"], serde_json::json!([2, 1, 0, 3, 4]));
    assert_eq!(json["shortest"]["source"], 0);
    assert_eq!(json["shortest"]["distances"], serde_json::json!([2.0, 1.0, 0.0]));
    assert_eq!(json["critical_path"]["length"], 2.0);
    assert_eq!(
        json["critical_path"]["expanded_path"],
        serde_json::json!([2, 1, 0, 3, 4])
    );
    assert!(json["content_hash"].as_str().unwrap().starts_with("blake3:"));
}

#[test]
fn analyze_source_flag_overrides_file() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "tasks.json", SCENARIO);

    let json = run_json(dir.path(), &["analyze", "tasks.json", "--source", "4"]);
    assert_eq!(json["shortest"]["source"], 4);
    assert!(json["shortest"]["distances"][2].is_null());
}

#[test]
fn analyze_text_output() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "tasks.json", SCENARIO);

    tg_cmd(dir.path())
        .args(["analyze", "tasks.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Component 2: [2, 1, 0]"))
        .stdout(predicate::str::contains("Topological order: [2, 1, 0]"))
        .stdout(predicate::str::contains("Critical path length: 2"));
}

#[test]
fn analyze_timing_goes_to_stderr() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "tasks.json", SCENARIO);

    let output = tg_cmd(dir.path())
        .args(["analyze", "tasks.json", "--format", "json", "--timing"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("timing report:"), "{stderr}");
    assert!(stderr.contains("scc"), "{stderr}");
    // stdout stays a single JSON document.
    let _: Value = serde_json::from_slice(&output.stdout).expect("stdout must be JSON");
}

#[test]
fn project_config_disables_stages() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "tasks.json", SCENARIO);
    std::fs::write(
        dir.path().join("taskgraph.toml"),
        "[analysis]\nshortest_paths = false\nexpand_components = false\n",
    )
    .unwrap();

    let json = run_json(dir.path(), &["analyze", "tasks.json"]);
    assert!(json.get("shortest").is_none());
    assert!(json.get("expanded_order").is_none());
    assert_eq!(json["critical_path"]["length"], 2.0);
}

#[test]
fn explicit_config_path_must_exist() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "tasks.json", SCENARIO);

    tg_cmd(dir.path())
        .args(["--config", "missing.toml", "analyze", "tasks.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.toml"));
}

// ---------------------------------------------------------------------------
// condense
// ---------------------------------------------------------------------------

#[test]
fn condense_dot_output() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "tasks.json", SCENARIO);

    tg_cmd(dir.path())
        .args(["condense", "tasks.json", "--format", "dot"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph {"))
        .stdout(predicate::str::contains("2 -> 1"));
}

#[test]
fn condense_json_lists_component_edges() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "tasks.json", SCENARIO);

    let json = run_json(dir.path(), &["condense", "tasks.json"]);
    let edges = json["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 2);
    assert!(edges.iter().any(|e| e["from"] == 2 && e["to"] == 1));
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_reports_cycles() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "tasks.json", SCENARIO);

    let json = run_json(dir.path(), &["check", "tasks.json"]);
    assert_eq!(json["acyclic"], false);
    assert_eq!(json["edges"], 5);
}

#[test]
fn check_reports_dag_order() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "chain.json", CHAIN);

    let json = run_json(dir.path(), &["check", "chain.json"]);
    assert_eq!(json["acyclic"], true);
    assert_eq!(json["order"], serde_json::json!([0, 1, 2]));
}

// ---------------------------------------------------------------------------
// errors
// ---------------------------------------------------------------------------

#[test]
fn invalid_edge_fails_with_code() {
    let dir = TempDir::new().unwrap();
    write_graph(
        dir.path(),
        "bad.json",
        r#"{"n": 2, "edges": [{"u": 0, "v": 7}]}"#,
    );

    let output = tg_cmd(dir.path())
        .args(["check", "bad.json", "--format", "json"])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let json: Value = serde_json::from_slice(&output.stderr).expect("stderr must be JSON");
    assert_eq!(json["error"]["error_code"], "invalid_input");
    assert!(
        json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("edge 0")
    );
}

#[test]
fn malformed_json_fails() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "bad.json", "{ not json");

    tg_cmd(dir.path())
        .args(["analyze", "bad.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn missing_file_fails() {
    let dir = TempDir::new().unwrap();

    tg_cmd(dir.path())
        .args(["analyze", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.json"));
}

#[test]
fn out_of_range_source_flag_fails() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "tasks.json", SCENARIO);

    tg_cmd(dir.path())
        .args(["analyze", "tasks.json", "--source", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("suggestion: pick a source in 0..5"));
}
