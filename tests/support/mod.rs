//! Test support utilities for primer integration tests.
//!
//! Provides an isolated app directory with fake collaborators and helpers
//! to run the binary against it.

#![allow(dead_code)]

pub mod commands;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test environment: a temporary app directory holding the fake
/// collaborators, their state files and `primer.toml`.
///
/// No process-global state is mutated; the binary runs with
/// `.current_dir()` so tests can run in parallel.
pub struct Test {
    pub dir: TempDir,
}

impl Test {
    /// App directory with fakes, a `primer.toml` wiring them up, and the
    /// default parameter in place.
    pub fn new() -> Self {
        Self::with_preflight(true)
    }

    /// Same as `new`, but the server's listen address is not probed, so
    /// fixed ports such as 8080 can be used.
    pub fn without_preflight() -> Self {
        Self::with_preflight(false)
    }

    fn with_preflight(preflight: bool) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let t = Self { dir };

        fs::create_dir_all(t.path("bin")).expect("failed to create bin dir");
        t.script("bin/python", FAKE_PYTHON);
        t.script("bin/aws", FAKE_AWS);
        t.script("bin/gunicorn", FAKE_SERVER);

        t.write("primer.toml", &t.settings_toml(preflight));
        t.write("ssm.json", &ssm_response(&default_payload()));
        t
    }

    /// Settings pointing every collaborator at the fakes.
    pub fn settings_toml(&self, preflight: bool) -> String {
        let root = self.dir.path().display();
        format!(
            r#"
[app]
python = '{root}/bin/python'
workdir = '{root}'

[secrets]
backend = "aws-cli"
aws = '{root}/bin/aws'
region = "eu-west-1"

[server]
program = '{root}/bin/gunicorn'
host = "127.0.0.1"
preflight_bind = {preflight}

[env]
PRIMER_FAKE_STATE = '{root}'
ENVIRONMENT = "PROD"
"#
        )
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, contents: &str) {
        fs::write(self.path(name), contents).expect("failed to write test file");
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).unwrap_or_default()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    /// Create a flag file for the fakes.
    pub fn touch(&self, name: &str) {
        self.write(name, "");
    }

    pub fn remove(&self, name: &str) {
        let _ = fs::remove_file(self.path(name));
    }

    /// Write an executable script, creating its parent directory.
    pub fn script(&self, name: &str, contents: &str) {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create script dir");
        }
        fs::write(&path, contents).expect("failed to write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("failed to chmod script");
    }

    /// Collaborator calls in order.
    pub fn calls(&self) -> Vec<String> {
        self.read("calls").lines().map(str::to_string).collect()
    }

    /// Replace the stored parameter payload.
    pub fn set_payload(&self, payload_json: &str) {
        self.write("ssm.json", &ssm_response(payload_json));
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

/// A port that was free a moment ago.
pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("failed to bind");
    listener.local_addr().expect("no local addr").port()
}
