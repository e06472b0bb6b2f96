#![cfg(feature = "cli")]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn runner() -> Command {
    Command::cargo_bin("survey-runner").expect("binary builds")
}

fn write_state(dir: &TempDir, state: Value) -> PathBuf {
    let path = dir.path().join("state.json");
    fs::write(&path, serde_json::to_string_pretty(&state).expect("state json"))
        .expect("write state");
    path
}

#[test]
fn validate_reports_schema_summary() {
    runner()
        .arg("validate")
        .arg("--schema")
        .arg(fixture("household.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("ok (3 sections"));
}

#[test]
fn validate_rejects_broken_schema() {
    let dir = TempDir::new().expect("tempdir");
    let schema = dir.path().join("schema.json");
    fs::write(
        &schema,
        json!({
            "survey_id": "0",
            "sections": [{
                "id": "s",
                "repeat": { "for_list": "ghosts" },
                "groups": [{ "id": "g", "blocks": [{ "id": "b", "type": "Interstitial" }] }]
            }]
        })
        .to_string(),
    )
    .expect("write schema");

    runner()
        .arg("validate")
        .arg("--schema")
        .arg(&schema)
        .assert()
        .failure()
        .stderr(predicate::str::contains("undeclared list 'ghosts'"));
}

#[test]
fn path_prints_section_urls() {
    runner()
        .args(["path", "--section", "default-section", "--schema"])
        .arg(fixture("test_textfield.json"))
        .assert()
        .success()
        .stdout(
            "/questionnaire/default-section/name-block/\n/questionnaire/default-section/summary/\n",
        );
}

#[test]
fn path_json_for_list_item() {
    let dir = TempDir::new().expect("tempdir");
    let state = write_state(
        &dir,
        json!({
            "lists": [{ "name": "people", "items": ["abc123"], "primary_person": "abc123" }]
        }),
    );
    let output = runner()
        .args([
            "path",
            "--section",
            "personal-details-section",
            "--list-item",
            "abc123",
            "--json",
            "--schema",
        ])
        .arg(fixture("repeating_sections_with_hub.json"))
        .arg("--state")
        .arg(&state)
        .output()
        .expect("run");
    assert!(output.status.success());
    let urls: Vec<String> = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(
        urls.first().map(String::as_str),
        Some("/questionnaire/personal-details-section/people/abc123/proxy/")
    );
    assert_eq!(urls.len(), 4);
}

#[test]
fn path_requires_list_item_for_repeating_section() {
    runner()
        .args(["path", "--section", "personal-details-section", "--schema"])
        .arg(fixture("repeating_sections_with_hub.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("list item id is required"));
}

#[test]
fn next_and_previous() {
    runner()
        .args(["next", "--location", "/questionnaire/default-section/name-block/", "--schema"])
        .arg(fixture("test_textfield.json"))
        .assert()
        .success()
        .stdout("/questionnaire/default-section/summary/\n");

    runner()
        .args([
            "previous",
            "--location",
            "/questionnaire/employment-section/employment-status/",
            "--json",
            "--schema",
        ])
        .arg(fixture("hub_and_spoke.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"to\": \"/questionnaire/\""));
}

#[test]
fn next_rejects_malformed_location() {
    runner()
        .args(["next", "--location", "/elsewhere/", "--schema"])
        .arg(fixture("test_textfield.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a questionnaire url"));
}

#[test]
fn status_reports_completion() {
    let dir = TempDir::new().expect("tempdir");
    let state = write_state(
        &dir,
        json!({
            "progress": [{
                "section_id": "default-section",
                "status": "COMPLETED",
                "locations": [{ "section_id": "default-section", "block_id": "name-block" }]
            }]
        }),
    );
    let output = runner()
        .args(["status", "--json", "--schema"])
        .arg(fixture("test_textfield.json"))
        .arg("--state")
        .arg(&state)
        .output()
        .expect("run");
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(report["complete"], json!(true));
    assert_eq!(report["sections"][0]["status"], json!("COMPLETED"));
    assert!(report.get("resume_at").is_none());
}

#[test]
fn missing_state_file_is_reported() {
    runner()
        .args(["status", "--state", "/nonexistent/state.json", "--schema"])
        .arg(fixture("test_textfield.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read state"));
}
