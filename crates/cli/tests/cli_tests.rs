//! CLI integration tests

use std::process::Command;

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "usc-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("Utility Scaler"),
        "Should show app name"
    );
    assert!(stdout.contains("status"), "Should show status command");
    assert!(stdout.contains("decisions"), "Should show decisions command");
    assert!(stdout.contains("catalog"), "Should show catalog command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = Command::new("cargo")
        .args(["run", "-p", "usc-cli", "--", "--version"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("usc"), "Should show binary name");
}

/// Test decisions subcommand help
#[test]
fn test_decisions_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "usc-cli", "--", "decisions", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Decisions help should succeed");
    assert!(stdout.contains("--service"), "Should show service filter");
}

/// Test catalog subcommand help
#[test]
fn test_catalog_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "usc-cli", "--", "catalog", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Catalog help should succeed");
    assert!(stdout.contains("--file"), "Should show file option");
}

/// Test that a bad subcommand fails
#[test]
fn test_unknown_subcommand_fails() {
    let output = Command::new("cargo")
        .args(["run", "-p", "usc-cli", "--", "frobnicate"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Unknown subcommand should fail");
}
