//! Tests for `--dry-run`.

use crate::support::*;

#[test]
fn test_dry_run_calls_nothing() {
    let t = Test::new();

    let output = t.boot_with(8080, &["--dry-run"]);
    assert_success(&output);
    assert!(t.calls().is_empty());
    assert!(!t.exists("migrated"));
}

#[test]
fn test_dry_run_lists_every_phase() {
    let t = Test::new();

    let output = t.boot_with(8080, &["--dry-run"]);
    assert_success(&output);

    let out = stdout(&output);
    let phases = ["migrate", "fetch-secret", "provision", "publish-assets", "launch"];
    let positions: Vec<usize> = phases
        .iter()
        .map(|p| out.find(p).unwrap_or_else(|| panic!("missing phase {}", p)))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    assert_stdout_contains(&output, "manage.py migrate --noinput");
    assert_stdout_contains(&output, "manage.py shell -c <script>");
    assert_stdout_contains(&output, "manage.py collectstatic --noinput");
    assert_stdout_contains(&output, "app.wsgi:application --bind 127.0.0.1:8080 --workers 4");
    assert_stdout_contains(&output, "aws-cli prod/superuser");
}

#[test]
fn test_dry_run_still_validates() {
    let t = Test::new();

    let output = t.run_args(&["--dry-run", "app", "0", "admin", "a@x.com", "4", PARAM]);
    assert_exit_code(&output, 64);
}
