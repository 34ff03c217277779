//! Tests for repeated container starts.

use crate::support::*;

#[test]
fn test_second_start_converges() {
    let t = Test::new();

    let first = t.boot(free_port());
    assert_success(&first);
    let account = t.read("account");

    let second = t.boot(free_port());
    assert_success(&second);

    assert_eq!(t.read("account"), account);
    assert!(t.exists("migrated"));
    assert!(t.exists("static/app.css"));
    assert_eq!(
        t.calls(),
        vec![
            "migrate",
            "get-parameter",
            "shell",
            "collectstatic",
            "server",
            "migrate",
            "get-parameter",
            "shell",
            "collectstatic",
            "server",
        ]
    );
}

#[test]
fn test_existing_account_keeps_its_password() {
    let t = Test::new();

    assert_success(&t.boot(free_port()));
    assert_eq!(t.read("account"), format!("admin:a@x.com:{}", PASSWORD));

    // Rotated in the parameter store after the account was created
    t.set_payload(r#"{"superuser_password": "rotated-pw"}"#);

    let output = t.boot(free_port());
    assert_success(&output);
    assert_stderr_contains(&output, "account already exists");
    assert_eq!(t.read("account"), format!("admin:a@x.com:{}", PASSWORD));
}

#[test]
fn test_pre_existing_account_is_not_an_error() {
    let t = Test::new();
    t.write("account", "admin:old@x.com:original");

    let output = t.boot(free_port());
    assert_success(&output);
    assert_eq!(t.read("account"), "admin:old@x.com:original");
    assert!(t.exists("server-args"));
}
