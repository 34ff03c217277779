//! Constants used throughout primer.
//!
//! Centralizes magic strings, default collaborator commands and exit codes.

/// Settings file looked up in the working directory when none is given.
pub const SETTINGS_FILE: &str = "primer.toml";

/// Field of the parameter payload holding the superuser password.
pub const PASSWORD_FIELD: &str = "superuser_password";

/// Address the server binds to unless overridden.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default application server.
pub const DEFAULT_SERVER: &str = "gunicorn";

/// Server entry module; `{service}` is replaced by the service identifier.
pub const DEFAULT_MODULE: &str = "{service}.wsgi:application";

/// Placeholder substituted in the module template.
pub const SERVICE_PLACEHOLDER: &str = "{service}";

/// Default interpreter and management script.
pub const DEFAULT_PYTHON: &str = "python";
pub const DEFAULT_MANAGE: &str = "manage.py";

/// Default AWS CLI program for the `aws-cli` secret backend.
pub const DEFAULT_AWS: &str = "aws";

/// Arguments after `manage.py` for each management command.
pub const MIGRATE_ARGS: &[&str] = &["migrate", "--noinput"];
pub const COLLECTSTATIC_ARGS: &[&str] = &["collectstatic", "--noinput"];

/// Environment variables that carry the account to the provisioning script.
pub const ENV_SUPERUSER_USERNAME: &str = "DJANGO_SUPERUSER_USERNAME";
pub const ENV_SUPERUSER_EMAIL: &str = "DJANGO_SUPERUSER_EMAIL";
pub const ENV_SUPERUSER_PASSWORD: &str = "DJANGO_SUPERUSER_PASSWORD";

/// Marker lines printed by the provisioning script.
pub const MARKER_CREATED: &str = "primer:account=created";
pub const MARKER_EXISTING: &str = "primer:account=exists";

/// Check-then-act superuser script run through `manage.py shell -c`.
///
/// Looks the account up by the user model's username field and only creates
/// it when absent, so an existing password is never touched.
pub const PROVISION_SCRIPT: &str = r#"import os
from django.contrib.auth import get_user_model
User = get_user_model()
username = os.environ["DJANGO_SUPERUSER_USERNAME"]
if User.objects.filter(**{User.USERNAME_FIELD: username}).exists():
    print("primer:account=exists")
else:
    User.objects.create_superuser(
        username,
        os.environ["DJANGO_SUPERUSER_EMAIL"],
        os.environ["DJANGO_SUPERUSER_PASSWORD"],
    )
    print("primer:account=created")
"#;

/// Process exit codes.
pub mod exit {
    /// Missing or malformed startup parameter or setting (EX_USAGE).
    pub const CONFIG: i32 = 64;
    pub const MIGRATION: i32 = 10;
    pub const SECRET: i32 = 11;
    pub const PROVISION: i32 = 12;
    pub const ASSETS: i32 = 13;
    pub const LAUNCH: i32 = 14;
}
