//! CLI interface tests

mod common;

use assert_cmd::Command;
use common::{fixture, top_level_names};
use predicates::prelude::*;
use tempfile::TempDir;

fn tagsnap() -> Command {
    let mut cmd = Command::cargo_bin("tagsnap").unwrap();
    cmd.env_remove("TAGSNAP_REPOPATH")
        .env_remove("TAGSNAP_TAG")
        .env_remove("TAGSNAP_SSHPATH")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_version_flag() {
    tagsnap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tagsnap"));
}

#[test]
fn test_help_flag() {
    tagsnap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sparse-checkout allowlist"))
        .stdout(predicate::str::contains("--repopath"))
        .stdout(predicate::str::contains("--sshpath"));
}

#[test]
fn test_missing_config_error() {
    tagsnap()
        .arg("--config")
        .arg("nonexistent.yaml")
        .assert()
        .failure()
        .code(1) // Configuration error
        .stdout(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_missing_repopath() {
    let temp_dir = TempDir::new().unwrap();

    tagsnap()
        .current_dir(temp_dir.path())
        .args(["--tag", "v1.0"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("No repository path given"));
}

#[test]
fn test_not_a_repository() {
    let temp_dir = TempDir::new().unwrap();

    tagsnap()
        .current_dir(temp_dir.path())
        .arg("--repopath")
        .arg(temp_dir.path())
        .args(["--tag", "v1.0"])
        .assert()
        .failure()
        .code(2)
        .stdout(predicate::str::contains("Failed to open repository"));
}

#[test]
fn test_checkout_and_prune() {
    let fixture = fixture();
    fixture.write_sparse_spec("second\n");

    tagsnap()
        .current_dir(fixture.clone_path())
        .arg("--repopath")
        .arg(fixture.clone_path())
        .args(["--tag", "v1.0", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Checked out tag v1.0"))
        .stdout(predicate::str::contains(fixture.v1.to_string()));

    assert_eq!(top_level_names(fixture.clone_path()), [".git", "second"]);
}

#[test]
fn test_repopath_from_environment() {
    let fixture = fixture();

    tagsnap()
        .current_dir(fixture.clone_path())
        .env("TAGSNAP_REPOPATH", fixture.clone_path())
        .env("TAGSNAP_TAG", "v1.0")
        .args(["--quiet", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sparse prune skipped"));

    assert!(!fixture.clone_path().join("fourth.txt").exists());
}

#[test]
fn test_unknown_tag() {
    let fixture = fixture();
    fixture.write_sparse_spec("second\n");

    tagsnap()
        .current_dir(fixture.clone_path())
        .arg("--repopath")
        .arg(fixture.clone_path())
        .args(["--tag", "v9.9", "--quiet"])
        .assert()
        .failure()
        .code(4)
        .stdout(predicate::str::contains("Tag 'v9.9' not found"));

    assert!(fixture.clone_path().join("first").exists());
}
