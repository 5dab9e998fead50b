use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_shopcheck_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("shopcheck")
}

#[test]
fn test_completion_bash() {
    let mut cmd = Command::new(get_shopcheck_bin());
    cmd.arg("completion").arg("bash");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("shopcheck"));
}

#[test]
fn test_completion_requires_shell() {
    let mut cmd = Command::new(get_shopcheck_bin());
    cmd.arg("completion");

    cmd.assert().failure();
}
