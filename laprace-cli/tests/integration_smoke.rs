//! Smoke tests for command wiring and an end-to-end race against a temp database

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `laprace` isolated from the user's config and environment
fn laprace(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("laprace").unwrap();
    cmd.env("HOME", dir.path())
        .env_remove("LAPRACE_DATABASE")
        .env_remove("RUST_LOG")
        .arg("--db")
        .arg(dir.path().join("race.sqlite"));
    cmd
}

// === Help Tests ===

#[test]
fn test_lap_add_help() {
    let mut cmd = Command::cargo_bin("laprace").unwrap();
    cmd.arg("lap").arg("add").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("repeat for several teams"));
}

#[test]
fn test_team_help() {
    let mut cmd = Command::cargo_bin("laprace").unwrap();
    cmd.arg("team").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Register a team"));
}

#[test]
fn test_results_help() {
    let mut cmd = Command::cargo_bin("laprace").unwrap();
    cmd.arg("results").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("current standings"));
}

// === Input Validation ===

#[test]
fn test_bad_time_is_rejected() {
    let dir = TempDir::new().unwrap();
    laprace(&dir).args(["init"]).assert().success();

    laprace(&dir)
        .args(["lap", "add", "--time", "25:00:00", "--team", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected HH:MM:SS"));
}

#[test]
fn test_bad_team_id_is_rejected() {
    let dir = TempDir::new().unwrap();
    laprace(&dir).args(["init"]).assert().success();

    laprace(&dir)
        .args(["team", "delete", "seven"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected an integer"));
}

// === End to End ===

#[test]
fn test_race_flow() {
    let dir = TempDir::new().unwrap();

    laprace(&dir)
        .args(["init", "--start", "10:00:00"])
        .assert()
        .success();
    laprace(&dir).args(["team", "add", "7", "Hares"]).assert().success();
    laprace(&dir).args(["team", "add", "9", "Snails"]).assert().success();

    laprace(&dir)
        .args(["--json", "team", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Hares\""));

    // Team ids are assigned in insertion order
    laprace(&dir)
        .args(["lap", "add", "--time", "10:05:00", "--team", "1", "--team", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#7 Hares"));
    laprace(&dir)
        .args(["lap", "add", "--time", "10:12:00", "--team", "1"])
        .assert()
        .success();

    laprace(&dir)
        .args(["lap", "list", "--team", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("7m0s"));

    laprace(&dir)
        .args(["--json", "results"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"elapsed\": \"12m0s\""))
        .stdout(predicate::str::contains("\"elapsed\": \"5m0s\""));

    // Unknown team rolls the whole batch back
    laprace(&dir)
        .args(["lap", "add", "--time", "10:20:00", "--team", "2", "--team", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown team 99"));
    laprace(&dir)
        .args(["lap", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10:20:00").not());
}

#[test]
fn test_results_before_start_fails() {
    let dir = TempDir::new().unwrap();
    laprace(&dir).args(["init"]).assert().success();

    laprace(&dir)
        .args(["results"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("race not found"));
}
