//! Tests for the server hand-off.

use crate::support::*;
use std::net::TcpListener;

fn server_pid(output: &std::process::Output) -> u32 {
    stdout(output)
        .lines()
        .find_map(|l| l.strip_prefix("server-pid="))
        .and_then(|pid| pid.trim().parse().ok())
        .expect("server did not report its pid")
}

#[test]
fn test_server_replaces_primer_process() {
    let t = Test::new();

    let output = t.boot(free_port());
    assert_success(&output);

    // primer logs its own pid right before exec; the server must report the same one
    let pid = server_pid(&output);
    assert_stderr_contains(&output, &format!(" pid={}", pid));
}

#[test]
fn test_server_exit_status_is_the_process_status() {
    let t = Test::new();
    t.write(
        "bin/gunicorn",
        "#!/bin/sh\necho server >> \"$PRIMER_FAKE_STATE/calls\"\nexit 3\n",
    );

    let output = t.boot(free_port());
    // No primer wrapper remains to translate the code
    assert_exit_code(&output, 3);
    assert_eq!(t.calls().last().map(String::as_str), Some("server"));
}

#[test]
fn test_busy_port_is_a_launch_failure() {
    let t = Test::new();
    let held = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = held.local_addr().unwrap().port();

    let output = t.boot(port);
    assert_exit_code(&output, 14);
    assert_stderr_contains(&output, "server launch failed");
    assert_stderr_contains(&output, &format!("127.0.0.1:{}", port));
    assert_eq!(
        t.calls(),
        vec!["migrate", "get-parameter", "shell", "collectstatic"]
    );
    drop(held);
}

#[test]
fn test_missing_server_program() {
    let t = Test::new();
    std::fs::remove_file(t.path("bin/gunicorn")).unwrap();

    let output = t.boot(free_port());
    assert_exit_code(&output, 14);
    assert_stderr_contains(&output, "server program not found");
    assert_stderr_contains(&output, "server.program");
}

#[test]
fn test_workers_and_port_reach_server() {
    let t = Test::new();
    let port = free_port();

    let output = t
        .cmd()
        .args(["shop", &port.to_string(), "admin", "a@x.com", "9", PARAM])
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(
        t.read("server-args").trim(),
        format!("shop.wsgi:application --bind 127.0.0.1:{} --workers 9", port)
    );
}
