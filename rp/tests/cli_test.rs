//! Binary behaviour that needs no network

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `rp` with logs kept inside the temp dir
fn rp(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rp").unwrap();
    cmd.env("XDG_DATA_HOME", temp.path())
        .env("HOME", temp.path())
        .current_dir(temp.path());
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let temp = TempDir::new().unwrap();
    rp(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve").and(predicate::str::contains("plan")));
}

#[test]
fn test_plan_requires_theme() {
    let temp = TempDir::new().unwrap();
    rp(&temp)
        .args(["plan", "--location", "Seoul"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--theme"));
}

#[test]
fn test_serve_fails_fast_without_api_key() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("routepick.yml");
    fs::write(&config, "llm:\n  api-key-env: ROUTEPICK_TEST_MISSING_KEY\n").unwrap();

    rp(&temp)
        .env_remove("ROUTEPICK_TEST_MISSING_KEY")
        .arg("--config")
        .arg(&config)
        .args(["serve", "--bind", "127.0.0.1:0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ROUTEPICK_TEST_MISSING_KEY"));
}

#[test]
fn test_broken_config_is_reported() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("broken.yml");
    fs::write(&config, "llm: [not, a, map\n").unwrap();

    rp(&temp)
        .arg("--config")
        .arg(&config)
        .args(["plan", "--theme", "art", "--location", "Seoul"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn test_log_file_is_written() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("routepick.yml");
    fs::write(&config, "llm:\n  api-key-env: ROUTEPICK_TEST_MISSING_KEY\n").unwrap();

    rp(&temp)
        .env_remove("ROUTEPICK_TEST_MISSING_KEY")
        .arg("--config")
        .arg(&config)
        .args(["--log-level", "debug", "serve"])
        .assert()
        .failure();

    let log = temp.path().join("routepick").join("logs").join("routepick.log");
    let content = fs::read_to_string(log).unwrap();
    assert!(content.contains("Logging initialized"));
}
