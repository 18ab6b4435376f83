//! End-to-end tests for the `ferrybot` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn ferrybot(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ferrybot").unwrap();
    cmd.env_remove("FERRY_BOT_TOKEN")
        .env_remove("FERRY_OWNER_ID")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(home.join("config.toml"))
        .arg("--no-color");
    cmd
}

#[test]
fn config_path_honours_flag() {
    let home = tempfile::tempdir().unwrap();
    ferrybot(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn stats_on_fresh_directory() {
    let home = tempfile::tempdir().unwrap();
    let data = home.path().join("state");
    let output = ferrybot(home.path())
        .args(["stats", "-o", "json", "--data-dir"])
        .arg(&data)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_messages"], 0);
    assert_eq!(json["whitelisted"], 0);
    assert!(json["start_time"].is_null());

    // Reading statistics never writes state
    assert_eq!(std::fs::read_dir(&data).unwrap().count(), 0);
}

#[test]
fn stats_reads_persisted_files() {
    let home = tempfile::tempdir().unwrap();
    let data = home.path().join("state");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(data.join("whitelist.json"), "[1, 2, 3]").unwrap();
    std::fs::write(data.join("blacklist.json"), "[4]").unwrap();

    ferrybot(home.path())
        .arg("stats")
        .arg("--data-dir")
        .arg(&data)
        .assert()
        .success()
        .stdout(predicate::str::contains("Whitelisted:"))
        .stdout(predicate::str::contains("3"));
}

#[test]
fn run_without_token_fails() {
    let home = tempfile::tempdir().unwrap();
    ferrybot(home.path())
        .args(["run", "--owner", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bot token required"));
}

#[test]
fn run_without_owner_fails() {
    let home = tempfile::tempdir().unwrap();
    ferrybot(home.path())
        .args(["--token", "123:abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("operator id required"));
}

#[test]
fn config_init_then_show() {
    let home = tempfile::tempdir().unwrap();
    ferrybot(home.path())
        .args(["config", "init"])
        .assert()
        .success();
    assert!(home.path().join("config.toml").exists());

    ferrybot(home.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    std::fs::write(
        home.path().join("config.toml"),
        "bot_token = \"123456:SECRETSECRET\"\nowner_id = 42\n",
    )
    .unwrap();

    ferrybot(home.path())
        .args(["config", "show", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1234...CRET"))
        .stdout(predicate::str::contains("SECRETSECRET").not());
}
