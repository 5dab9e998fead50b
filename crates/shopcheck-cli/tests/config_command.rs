use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_shopcheck_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("shopcheck")
}

#[test]
fn test_config_command_help() {
    let mut cmd = Command::new(get_shopcheck_bin());
    cmd.arg("config").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("resolved run configuration"))
        .stdout(predicate::str::contains("--format"));
}

#[test]
fn test_config_command_prints_browser() {
    let mut cmd = Command::new(get_shopcheck_bin());
    cmd.arg("config").env("BROWSER", "firefox");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("firefox"));
}

#[test]
fn test_config_command_json_output() {
    let mut cmd = Command::new(get_shopcheck_bin());
    cmd.arg("config")
        .arg("--format")
        .arg("json")
        .env("BROWSER", "edge")
        .env("SHOPCHECK_IMPLICIT_WAIT", "7");

    let output = cmd.assert().success().get_output().stdout.clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(parsed["browser"], "edge");
    assert_eq!(parsed["implicit_wait_secs"], 7);
}

#[test]
fn test_config_command_rejects_bad_environment() {
    let mut cmd = Command::new(get_shopcheck_bin());
    cmd.arg("config").env("SHOPCHECK_ENV", "production");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("SHOPCHECK_ENV"));
}
