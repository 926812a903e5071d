use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_commands() {
    let mut cmd = Command::cargo_bin("xtask").expect("xtask binary is built");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("doctest"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn list_shows_infrastructure_crates() {
    let mut cmd = Command::cargo_bin("xtask").expect("xtask binary is built");
    cmd.args(["list", "infra"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Infrastructure"))
        .stdout(predicate::str::contains("stager-fetch"))
        .stdout(predicate::str::contains("stager-logger"));
}

#[test]
fn unknown_group_is_rejected() {
    let mut cmd = Command::cargo_bin("xtask").expect("xtask binary is built");
    cmd.args(["list", "plugins"]).assert().failure();
}
