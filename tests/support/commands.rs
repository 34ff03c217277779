//! Command helper methods for Test.

use super::{Test, PARAM};
use assert_cmd::Command;
use std::process::Output;

/// Startup variables that would otherwise leak in from the test runner.
const STARTUP_ENV: &[&str] = &[
    "PRIMER_SERVICE",
    "PRIMER_PORT",
    "PRIMER_SUPERUSER",
    "PRIMER_EMAIL",
    "PRIMER_WORKERS",
    "PRIMER_SECRET_PARAM",
    "PRIMER_SETTINGS",
    "PRIMER_LOG",
    "PRIMER_LOG_FORMAT",
];

impl Test {
    /// Create a primer command running in the app directory.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("primer").expect("failed to find primer binary");
        for key in STARTUP_ENV {
            cmd.env_remove(key);
        }
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Full bootstrap with the reference parameters on `port`.
    pub fn boot(&self, port: u16) -> Output {
        self.boot_with(port, &[])
    }

    /// Full bootstrap with extra leading flags.
    pub fn boot_with(&self, port: u16, flags: &[&str]) -> Output {
        let port = port.to_string();
        self.cmd()
            .args(flags)
            .args(["app", port.as_str(), "admin", "a@x.com", "4", PARAM])
            .output()
            .expect("failed to run primer")
    }

    /// Run with explicit positionals.
    pub fn run_args(&self, args: &[&str]) -> Output {
        self.cmd()
            .args(args)
            .output()
            .expect("failed to run primer")
    }
}
