//! Fake collaborators and test constants.
//!
//! The fakes are small shell scripts. They append one line per call to
//! `$PRIMER_FAKE_STATE/calls` and keep their "external state" (schema,
//! account, static files) as files in the same directory, so tests can
//! observe the collaborators rather than primer's own output.

/// Password stored in the default parameter.
pub const PASSWORD: &str = "s3cret-pw-5f2a";

/// Parameter name used by `Test::boot`.
pub const PARAM: &str = "prod/superuser";

/// `aws ssm get-parameter` response carrying `PASSWORD`.
pub fn ssm_response(value_json: &str) -> String {
    let value = serde_json::to_string(value_json).expect("encode value");
    format!(
        r#"{{"Parameter": {{"Name": "{}", "Type": "SecureString", "Value": {}, "Version": 1}}}}"#,
        PARAM, value
    )
}

pub fn default_payload() -> String {
    format!(r#"{{"superuser_password": "{}"}}"#, PASSWORD)
}

/// Fake `python`: understands `manage.py migrate|shell|collectstatic`.
///
/// - `fail-<cmd>` makes that command exit 7
/// - `no-marker` makes `shell` print nothing
/// - the account is a file holding `username:email:password`
pub const FAKE_PYTHON: &str = r#"#!/bin/sh
state="$PRIMER_FAKE_STATE"
echo "$2" >> "$state/calls"
echo "$ENVIRONMENT" > "$state/environment"
pwd > "$state/cwd"
if [ -f "$state/fail-$2" ]; then
  echo "fake $2 failed" >&2
  exit 7
fi
case "$2" in
  migrate)
    touch "$state/migrated"
    ;;
  shell)
    if [ -f "$state/no-marker" ]; then
      exit 0
    fi
    if [ -f "$state/account" ]; then
      echo "primer:account=exists"
    else
      printf '%s:%s:%s' "$DJANGO_SUPERUSER_USERNAME" "$DJANGO_SUPERUSER_EMAIL" "$DJANGO_SUPERUSER_PASSWORD" > "$state/account"
      echo "primer:account=created"
    fi
    ;;
  collectstatic)
    mkdir -p "$state/static"
    touch "$state/static/app.css"
    ;;
esac
exit 0
"#;

/// Fake `aws`: serves `ssm.json` for `ssm get-parameter --with-decryption`.
pub const FAKE_AWS: &str = r#"#!/bin/sh
state="$PRIMER_FAKE_STATE"
echo "get-parameter" >> "$state/calls"
echo "$@" > "$state/aws-args"
case " $* " in
  *" --with-decryption "*) ;;
  *) echo "decryption flag missing" >&2; exit 2 ;;
esac
if [ -f "$state/aws-denied" ]; then
  echo "An error occurred (AccessDeniedException) when calling the GetParameter operation: not authorized to perform kms:Decrypt" >&2
  exit 254
fi
if [ -f "$state/ssm.json" ]; then
  cat "$state/ssm.json"
  exit 0
fi
echo "An error occurred (ParameterNotFound) when calling the GetParameter operation: " >&2
exit 254
"#;

/// Fake `gunicorn`: records its arguments and pid, then exits.
pub const FAKE_SERVER: &str = r#"#!/bin/sh
state="$PRIMER_FAKE_STATE"
echo "server" >> "$state/calls"
echo "$@" > "$state/server-args"
echo "server-pid=$$"
exit 0
"#;
