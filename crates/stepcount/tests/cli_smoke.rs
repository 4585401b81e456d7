use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_displays_usage() {
    Command::cargo_bin("stepcount")
        .expect("binary exists")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn headless_count_prints_a_report() {
    let temp = tempfile::tempdir().expect("tempdir");
    std::fs::write(temp.path().join("main.py"), "x = 1\ny = 2\n").expect("fixture");

    Command::cargo_bin("stepcount")
        .expect("binary exists")
        .current_dir(temp.path())
        .args(["count", ".", "--format", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 2 steps across 1 files"));
}

#[test]
fn invalid_format_value_fails() {
    Command::cargo_bin("stepcount")
        .expect("binary exists")
        .args(["count", "--format", "spreadsheet"])
        .assert()
        .failure();
}
