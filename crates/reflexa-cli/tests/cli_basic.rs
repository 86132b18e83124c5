//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs.

use std::io::Write;
use std::process::{Command, Stdio};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    run_cli_with_input(args, "")
}

/// Run a CLI command with `input` piped to stdin.
fn run_cli_with_input(args: &[&str], input: &str) -> (String, String, i32) {
    let mut child = Command::new("cargo")
        .args(["run", "-q", "-p", "reflexa-cli", "--"])
        .args(args)
        .env("REFLEXA_ENV", "dev")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    child
        .stdin
        .take()
        .expect("stdin piped")
        .write_all(input.as_bytes())
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait for CLI");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_rules_json_lists_quota() {
    let (stdout, _, code) = run_cli(&["rules", "--json", "--minutes", "3"]);
    assert_eq!(code, 0, "rules failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let quota = parsed["quota"].as_array().expect("quota array");
    assert_eq!(quota.len(), 3);
    assert!(parsed["scoring"]["buckets"].is_array());
}

#[test]
fn test_rules_text() {
    let (stdout, _, code) = run_cli(&["rules", "--minutes", "2"]);
    assert_eq!(code, 0, "rules failed");
    assert!(stdout.contains("Required inputs"));
    assert!(stdout.contains("lightning") || stdout.contains("Label"));
}

#[test]
fn test_config_get_known_key() {
    let (stdout, _, code) = run_cli(&["config", "get", "survival.max_continuations"]);
    assert_eq!(code, 0, "config get failed");
    assert!(!stdout.trim().is_empty());
}

#[test]
fn test_config_get_unknown_key_fails() {
    let (_, stderr, code) = run_cli(&["config", "get", "survival.nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_play_quit_prints_summary() {
    let (stdout, _, code) = run_cli_with_input(&["play", "--json", "--seed", "1"], "q\n");
    assert_eq!(code, 0, "play failed");
    assert!(stdout.contains("\"type\":\"session_started\""));
    assert!(stdout.contains("\"end_reason\":\"quit\""));
}

#[test]
fn test_play_eof_ends_session() {
    let (stdout, _, code) = run_cli_with_input(&["play", "--json"], "");
    assert_eq!(code, 0, "play failed");
    assert!(stdout.contains("session_ended"));
}

#[test]
fn test_recall_wrong_attempt_ends_game() {
    let (stdout, _, code) = run_cli_with_input(&["recall", "--json", "--seed", "4"], "nonsense\n");
    assert_eq!(code, 0, "recall failed");
    assert!(stdout.contains("\"rounds_completed\": 0"));
}
