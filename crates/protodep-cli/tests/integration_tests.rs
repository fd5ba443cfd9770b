//! Integration tests for the protodep CLI binary.
//!
//! These tests exercise the actual compiled binary using assert_cmd. None of
//! them reach the network: every `up` scenario fails before a fetch.

use assert_cmd::Command;
use predicates::prelude::*;
use protodep_test_utils::TestProject;

/// Get a Command for the protodep binary
fn protodep_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("protodep"))
}

/// Command running inside `project` with its temporary home directory.
fn project_cmd(project: &TestProject) -> Command {
    let mut cmd = protodep_cmd();
    cmd.current_dir(project.root())
        .env("HOME", project.home())
        .env_remove("RUST_LOG")
        .env_remove("PROTODEP_BASIC_AUTH_USERNAME")
        .env_remove("PROTODEP_BASIC_AUTH_PASSWORD");
    cmd
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_output() {
    protodep_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("up"))
        .stdout(predicate::str::contains("version"));
}

#[test]
fn test_up_help_lists_flags() {
    protodep_cmd()
        .args(["up", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"))
        .stdout(predicate::str::contains("--cleanup"))
        .stdout(predicate::str::contains("--use-https"))
        .stdout(predicate::str::contains("--identity-file"))
        .stdout(predicate::str::contains("--basic-auth-username"));
}

#[test]
fn test_version_command() {
    protodep_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_json() {
    let output = protodep_cmd()
        .args(["version", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_no_command_shows_help_hint() {
    protodep_cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("protodep --help"));
}

#[test]
fn test_unknown_flag_is_rejected() {
    protodep_cmd().args(["up", "--bogus"]).assert().failure();
}

// ============================================================================
// Up Failure Tests
// ============================================================================

#[test]
fn test_up_without_manifest_fails() {
    let project = TestProject::new();

    project_cmd(&project)
        .arg("up")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("protodep.toml"));
}

#[test]
fn test_up_with_unsupported_protocol_fails() {
    let project = TestProject::new();
    project.write_manifest(
        r#"proto_outdir = "./proto"

[[dependencies]]
target = "github.com/org/repo"
protocol = "ftp"
"#,
    );

    project_cmd(&project)
        .arg("up")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ftp protocol is not accepted"));
    project.assert_file_not_exists("protodep.lock");
}

#[test]
fn test_up_with_malformed_pattern_fails() {
    let project = TestProject::new();
    project.write_manifest(
        r#"proto_outdir = "./proto"

[[dependencies]]
target = "github.com/org/repo"
protocol = "https"
ignores = ["[broken"]
"#,
    );

    project_cmd(&project)
        .arg("up")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid pattern '[broken'"));
}

#[test]
fn test_up_with_malformed_manifest_fails() {
    let project = TestProject::new();
    project.write_manifest("proto_outdir = [\n");

    project_cmd(&project)
        .args(["up", "--force"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse"));
}

#[test]
fn test_up_with_empty_manifest_writes_lock() {
    let project = TestProject::new();
    project.write_manifest("proto_outdir = \"./proto\"\n");

    project_cmd(&project)
        .arg("up")
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolved"));

    project.assert_file_exists("protodep.lock");
    project.assert_file_contains("protodep.lock", "proto_outdir = \"./proto\"");
}
