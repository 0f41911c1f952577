// ABOUTME: Integration tests for the deployment-gate CLI commands.
// ABOUTME: Validates --help output, init behavior and input errors of wait.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn gate_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("deployment-gate"));
    for var in [
        "INPUT_GITHUB_TOKEN",
        "GITHUB_TOKEN",
        "GITHUB_ENV",
        "GITHUB_EVENT_PATH",
        "INPUT_APPLICATIONS",
        "INPUT_MAX_TIMEOUT",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn help_shows_commands() {
    gate_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("wait"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn init_creates_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("deployment-gate.yml");

    gate_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "-a", "web", "-a", "docs"])
        .assert()
        .success();

    assert!(config_path.exists(), "deployment-gate.yml should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("actor_name:"));
    assert!(content.contains("  - docs"));
}

#[test]
fn init_refuses_to_overwrite_existing_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("deployment-gate.yml"), "environment: x").unwrap();

    gate_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn wait_requires_token() {
    let temp_dir = tempfile::tempdir().unwrap();

    gate_cmd()
        .current_dir(temp_dir.path())
        .args(["wait", "--repository", "acme/site", "--sha", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Required field `github_token` was not provided",
        ));
}

#[test]
fn wait_rejects_invalid_timeout_input() {
    let temp_dir = tempfile::tempdir().unwrap();

    gate_cmd()
        .current_dir(temp_dir.path())
        .env("INPUT_MAX_TIMEOUT", "soon")
        .args(["wait", "--repository", "acme/site"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_timeout"));
}

#[test]
fn wait_rejects_missing_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();

    gate_cmd()
        .current_dir(temp_dir.path())
        .args(["--config", "missing.yml", "wait"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}
