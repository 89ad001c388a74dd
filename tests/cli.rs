//! End-to-end tests for the jsplay binary. None of these need a JavaScript runtime.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn buffer(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".js")
        .tempfile()
        .expect("temp file");
    file.write_all(contents.as_bytes()).expect("write buffer");
    file
}

fn jsplay() -> Command {
    Command::cargo_bin("jsplay").expect("binary to build")
}

#[test]
fn test_units_command() {
    let file = buffer("const o = {\n  a: 1\n};\no.a\n");
    jsplay()
        .arg("units")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[line 3]"))
        .stdout(predicate::str::contains("[line 4]"))
        .stdout(predicate::str::contains("[line 1]").not());
}

#[test]
fn test_units_command_json() {
    let file = buffer("1\n2");
    let output = jsplay()
        .args(["units", "--format", "json"])
        .arg(file.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value, serde_json::json!({"1": "1", "2": "1\n2"}));
}

#[test]
fn test_tokens_command() {
    let file = buffer("x / 2");
    jsplay()
        .arg("tokens")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1:2-1:3 Punctuator /"));
}

#[test]
fn test_tokens_command_reports_syntax_errors() {
    let file = buffer("let s = `never closed");
    jsplay()
        .arg("tokens")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Line 1: Unterminated template literal"));
}

#[test]
fn test_script_tags_are_stripped_before_segmenting() {
    let file = buffer("a\n<script>ignored()</script>\nb");
    jsplay()
        .args(["units", "--format", "json"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"3\": \"a\\n\\nb\""))
        .stdout(predicate::str::contains("ignored").not());
}

#[test]
fn test_run_blank_buffer_needs_no_runtime() {
    let file = buffer("  \n");
    jsplay()
        .arg("run")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("status: no code"));
}

#[test]
fn test_run_reports_missing_runtime() {
    let mut config = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    writeln!(config, "[executor]\nprogram = \"/nonexistent/jsplay-node\"").unwrap();
    let file = buffer("1 + 1");

    jsplay()
        .arg("--config")
        .arg(config.path())
        .arg("run")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("status: error"))
        .stdout(predicate::str::contains("failed to start `/nonexistent/jsplay-node`"));
}

#[test]
fn test_missing_file() {
    jsplay()
        .args(["units", "/nonexistent/buffer.js"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error reading /nonexistent/buffer.js"));
}

#[test]
fn test_unknown_format_is_rejected() {
    let file = buffer("1");
    jsplay()
        .args(["units", "--format", "xml"])
        .arg(file.path())
        .assert()
        .failure();
}
