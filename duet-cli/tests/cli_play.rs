use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_subcommands() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("duet"));
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("play"))
        .stdout(predicate::str::contains("devices"))
        .stdout(predicate::str::contains("create"));
}

#[test]
fn play_requires_both_devices() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("duet"));
    cmd.args(["play", "backing.wav", "vocal.wav", "--performer", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--broadcast"));
}

#[test]
fn play_with_missing_files_fails() {
    let dir = tempfile::tempdir().unwrap();
    let backing = dir.path().join("backing.wav");
    let vocal = dir.path().join("vocal.wav");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("duet"));
    cmd.arg("play")
        .arg(&backing)
        .arg(&vocal)
        .args(["--performer", "0", "--broadcast", "1", "--quiet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn play_rejects_a_broken_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("settings.json");
    std::fs::write(&settings, "{ not json").unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("duet"));
    cmd.args(["play", "backing.wav", "vocal.wav", "-p", "0", "-b", "1", "--quiet"])
        .arg("--settings")
        .arg(&settings)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid settings"));
}

#[test]
fn play_rejects_a_non_numeric_block_size() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("duet"));
    cmd.args(["play", "a.wav", "b.wav", "-p", "0", "-b", "1"])
        .args(["--block-frames", "large"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--block-frames"));
}
