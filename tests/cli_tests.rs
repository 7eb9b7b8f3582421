// CLI behaviour: each invocation drives one engine operation on the file store

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn intake(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dealer-intake").unwrap();
    cmd.current_dir(dir.path())
        .env("RUST_LOG", "warn")
        .arg("--storage")
        .arg("file")
        .arg("--data-dir")
        .arg(dir.path().join("sessions"));
    cmd
}

fn response(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("stdout carries a JSON response document")
}

#[test]
fn test_help_lists_operations() {
    Command::cargo_bin("dealer-intake")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("transition"))
        .stdout(predicate::str::contains("back"))
        .stdout(predicate::str::contains("abandon"));
}

#[test]
fn test_start_transition_and_status_across_invocations() {
    let dir = TempDir::new().unwrap();

    let out = intake(&dir)
        .args(["start", "--session", "cli-1", "--workflow-type", "selling"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let start = response(&out);
    assert_eq!(start["stepId"], "intent-selection");
    assert_eq!(start["status"], "SUCCESS");

    intake(&dir)
        .args([
            "transition",
            "--session",
            "cli-1",
            "--step",
            "intent-selection",
            "--data",
            r#"{"intent":"selling"}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"stepId\": \"has-buyer\""));

    let out = intake(&dir)
        .args(["status", "--session", "cli-1"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let status = response(&out);
    assert_eq!(status["stepId"], "has-buyer");
    assert_eq!(status["sessionStatus"], "in_progress");
    assert_eq!(status["previousStep"], "intent-selection");
}

#[test]
fn test_stale_step_exits_with_business_rule_code() {
    let dir = TempDir::new().unwrap();
    intake(&dir)
        .args(["start", "--session", "cli-2", "--workflow-type", "buying"])
        .assert()
        .success();

    intake(&dir)
        .args(["transition", "--session", "cli-2", "--step", "has-buyer"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("BUSINESS_RULE_ERROR"))
        .stdout(predicate::str::contains("Step mismatch"));
}

#[test]
fn test_unknown_session_exits_with_system_error_code() {
    let dir = TempDir::new().unwrap();
    intake(&dir)
        .args(["abandon", "--session", "nobody"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("SYSTEM_ERROR"));
}

#[test]
fn test_handle_reads_request_document_from_stdin() {
    let dir = TempDir::new().unwrap();
    intake(&dir)
        .arg("handle")
        .write_stdin(r#"{"operation":"start","sessionId":"doc-1","workflowType":"buying"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("intent-selection"));

    intake(&dir)
        .args([
            "handle",
            "--request",
            r#"{"operation":"back","sessionId":"doc-1","currentStep":"intent-selection"}"#,
        ])
        .assert()
        .code(2);

    let out = intake(&dir).arg("sessions").assert().success().get_output().stdout.clone();
    let sessions = response(&out);
    assert_eq!(sessions[0]["sessionId"], "doc-1");
    assert_eq!(sessions[0]["currentStep"], "intent-selection");
}

#[test]
fn test_invalid_data_is_rejected_before_the_engine_runs() {
    let dir = TempDir::new().unwrap();
    intake(&dir)
        .args(["transition", "--session", "x", "--step", "intent-selection", "--data", "[1]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON object"));
}

#[test]
fn test_graph_reports_a_valid_registry() {
    let dir = TempDir::new().unwrap();
    let out = intake(&dir)
        .args(["graph", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report = response(&out);
    assert_eq!(report["steps"], 20);
    assert_eq!(report["problems"].as_array().unwrap().len(), 0);

    intake(&dir)
        .arg("graph")
        .assert()
        .success()
        .stdout(predicate::str::contains("replacement-check [ReplacementCheck]"))
        .stdout(predicate::str::contains("replacement == no_replacement -> classify"));
}
