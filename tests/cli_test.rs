//! CLI smoke tests for the collector binary.

use assert_cmd::Command;
use predicates::prelude::*;

mod common;

#[test]
fn status_reports_unconfigured_for_missing_home() {
    let parent = tempfile::TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("token-dash-collector").unwrap();
    cmd.env("CLAUDE_HOME", parent.path().join("missing"))
        .env("LOG_LEVEL", "error")
        .arg("status");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"configured\": false"));
}

#[test]
fn once_emits_line_protocol_for_seeded_home() {
    let home = common::claude_home().unwrap();
    common::write_session_file(
        home.path(),
        "-home-user-proj",
        "session-a.jsonl",
        &[common::assistant_line(
            "cli-u-1",
            "claude-sonnet-4-20250514",
            10,
            5,
        )],
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("token-dash-collector").unwrap();
    cmd.env("CLAUDE_HOME", home.path())
        .env("LOG_LEVEL", "error")
        .arg("once");
    cmd.assert().success().stdout(
        predicate::str::contains("token_usage,provider=anthropic,model=claude-sonnet-4")
            .and(predicate::str::contains("data_type=message")),
    );
}

#[test]
fn once_json_outputs_an_event_array() {
    let home = common::claude_home().unwrap();
    common::write_session_file(
        home.path(),
        "-home-user-proj",
        "session-a.jsonl",
        &[common::assistant_line(
            "cli-u-2",
            "claude-sonnet-4-20250514",
            10,
            5,
        )],
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("token-dash-collector").unwrap();
    cmd.env("CLAUDE_HOME", home.path())
        .env("LOG_LEVEL", "error")
        .args(["once", "--json"]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let events: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(events.as_array().unwrap().len(), 1);
    assert_eq!(events[0]["model"], "claude-sonnet-4");
    assert_eq!(events[0]["total_tokens"], 15);
}
