//! Tests for startup parameter and settings validation.
//!
//! Configuration errors must stop primer before any collaborator runs.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_non_numeric_port_fails_before_any_call() {
    let t = Test::new();

    let output = t.run_args(&["app", "http", "admin", "a@x.com", "4", PARAM]);
    assert_exit_code(&output, 64);
    assert_stderr_contains(&output, "invalid port 'http'");
    assert!(t.calls().is_empty());
}

#[test]
fn test_zero_workers_rejected() {
    let t = Test::new();

    let output = t.run_args(&["app", "8080", "admin", "a@x.com", "0", PARAM]);
    assert_exit_code(&output, 64);
    assert_stderr_contains(&output, "workers");
    assert!(t.calls().is_empty());
}

#[test]
fn test_empty_username_rejected() {
    let t = Test::new();

    let output = t.run_args(&["app", "8080", "", "a@x.com", "4", PARAM]);
    assert_exit_code(&output, 64);
    assert_stderr_contains(&output, "superuser username must not be empty");
    assert!(t.calls().is_empty());
}

#[test]
fn test_invalid_service_rejected() {
    let t = Test::new();

    let output = t.run_args(&["my-app", "8080", "admin", "a@x.com", "4", PARAM]);
    assert_exit_code(&output, 64);
    assert_stderr_contains(&output, "invalid service");
}

#[test]
fn test_missing_positional_is_usage_error() {
    let t = Test::new();

    let output = t.run_args(&["app", "8080"]);
    assert_exit_code(&output, 64);
    assert!(t.calls().is_empty());
}

#[test]
fn test_positionals_fall_back_to_environment() {
    let t = Test::new();

    let output = t
        .cmd()
        .env("PRIMER_SUPERUSER", "ops")
        .env("PRIMER_EMAIL", "ops@x.com")
        .env("PRIMER_WORKERS", "2")
        .env("PRIMER_SECRET_PARAM", PARAM)
        .args(["--dry-run", "app", "8080"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "ops <ops@x.com>");
    assert_stdout_contains(&output, "--workers 2");
}

#[test]
fn test_missing_settings_file() {
    let t = Test::new();

    let output = t.boot_with(free_port(), &["--settings", "/nonexistent/primer.toml"]);
    assert_exit_code(&output, 64);
    assert_stderr_contains(&output, "settings file not found");
    assert_stderr_contains(&output, "--settings");
    assert!(t.calls().is_empty());
}

#[test]
fn test_malformed_settings_file() {
    let t = Test::new();
    t.write("primer.toml", "[server\nprogram = 1\n");

    let output = t.boot(free_port());
    assert_exit_code(&output, 64);
    assert_stderr_contains(&output, "failed to parse settings file");
    assert!(t.calls().is_empty());
}

#[test]
fn test_help_and_version() {
    let t = Test::new();

    t.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("<SECRET_PARAM>").and(predicate::str::contains("--dry-run")));

    let output = t.cmd().arg("--version").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "primer");
}
