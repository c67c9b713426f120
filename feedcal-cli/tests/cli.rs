use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `feedcal` with the global config directory pointed at `home`.
fn feedcal(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("feedcal").unwrap();
    cmd.env("XDG_CONFIG_HOME", home)
        .env("HOME", home)
        .env_remove("RUST_LOG");
    cmd
}

fn unpublished_repo(extra: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("feedcal.toml"),
        format!("{extra}\n[publish]\nenabled = false\n"),
    )
    .unwrap();
    dir
}

#[test]
fn help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    feedcal(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("schedule"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn init_writes_config_once() {
    let home = tempfile::tempdir().unwrap();
    let repo = tempfile::tempdir().unwrap();

    feedcal(home.path())
        .args(["init", "--repo"])
        .arg(repo.path())
        .assert()
        .success();

    let written = fs::read_to_string(repo.path().join("feedcal.toml")).unwrap();
    assert!(written.contains("# feedcal configuration"));

    feedcal(home.path())
        .args(["init", "--repo"])
        .arg(repo.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    feedcal(home.path())
        .args(["init", "--force", "--repo"])
        .arg(repo.path())
        .assert()
        .success();
}

#[test]
fn check_passes_without_publishing() {
    let home = tempfile::tempdir().unwrap();
    let repo = unpublished_repo("");

    feedcal(home.path())
        .args(["check", "--repo"])
        .arg(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("publishing disabled"));
}

#[test]
fn check_rejects_unknown_timezone() {
    let home = tempfile::tempdir().unwrap();
    let repo = unpublished_repo("timezone = \"Mars/Olympus_Mons\"");

    feedcal(home.path())
        .args(["check", "--repo"])
        .arg(repo.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown timezone"));
}

#[test]
fn environment_overrides_config_file() {
    let home = tempfile::tempdir().unwrap();
    let repo = unpublished_repo("");

    feedcal(home.path())
        .env("FEEDCAL_TIMEZONE", "Nowhere/Special")
        .args(["check", "--repo"])
        .arg(repo.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nowhere/Special"));
}

#[test]
fn check_fails_outside_a_git_repository_when_publishing() {
    let home = tempfile::tempdir().unwrap();
    let repo = tempfile::tempdir().unwrap();

    feedcal(home.path())
        .args(["check", "--repo"])
        .arg(repo.path())
        .assert()
        .failure();
}

#[test]
fn missing_explicit_config_fails() {
    let home = tempfile::tempdir().unwrap();
    let repo = tempfile::tempdir().unwrap();

    feedcal(home.path())
        .args(["check", "--repo"])
        .arg(repo.path())
        .arg("--config")
        .arg(repo.path().join("nope.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn generate_fails_when_feed_is_unreachable() {
    let home = tempfile::tempdir().unwrap();
    let repo = unpublished_repo(
        "feed_url = \"http://127.0.0.1:9/events.xml\"\noutput_file = \"events.ics\"\ntimeout_secs = 5",
    );

    feedcal(home.path())
        .args(["generate", "--repo"])
        .arg(repo.path())
        .assert()
        .failure();

    assert!(!repo.path().join("events.ics").exists());
}
