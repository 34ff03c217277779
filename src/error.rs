//! Error types for primer.
//!
//! Every failure is tied to the bootstrap phase that produced it, so the
//! process can exit with a code an operator can read off the task status.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::constants::exit;
use crate::core::phase::Phase;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    /// Startup parameters or settings are missing or malformed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Schema migration failed.
    #[error("migration failed: {0}")]
    Migration(CommandError),

    /// The superuser credential could not be retrieved.
    #[error("secret retrieval failed: {0}")]
    Secret(#[from] SecretError),

    /// The administrative account could not be ensured.
    #[error("account provisioning failed: {0}")]
    Provision(#[from] ProvisionError),

    /// Static assets could not be published.
    #[error("static asset publish failed: {0}")]
    Assets(CommandError),

    /// The server process could not be started.
    #[error("server launch failed: {0}")]
    Launch(#[from] LaunchError),
}

impl Error {
    /// The phase that failed, or `None` for configuration errors raised
    /// before any phase ran.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Error::Config(_) => None,
            Error::Migration(_) => Some(Phase::Migrate),
            Error::Secret(_) => Some(Phase::FetchSecret),
            Error::Provision(_) => Some(Phase::Provision),
            Error::Assets(_) => Some(Phase::PublishAssets),
            Error::Launch(_) => Some(Phase::Launch),
        }
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self.phase() {
            None => exit::CONFIG,
            Some(phase) => phase.exit_code(),
        }
    }
}

/// Invalid startup parameters or settings file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("invalid {field} '{value}': {reason}")]
    Invalid {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("settings file not found: {}", .0.display())]
    SettingsNotFound(PathBuf),

    #[error("failed to read settings file {}: {source}", .path.display())]
    ReadSettings {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {}: {source}", .path.display())]
    ParseSettings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid setting {key}: {reason}")]
    Setting { key: &'static str, reason: String },
}

/// An external command that did not complete successfully.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("program not found: {0}")]
    NotFound(String),

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {code}")]
    Exited { program: String, code: i32 },

    #[error("{program} was terminated by a signal")]
    Signaled { program: String },
}

/// Why a credential could not be read from the parameter store.
///
/// None of these variants carry payload text.
#[derive(Error, Debug)]
pub enum SecretError {
    #[error("parameter not found: {0}")]
    NotFound(String),

    #[error("decryption denied for parameter {name}: {reason}")]
    DecryptDenied { name: String, reason: String },

    #[error("payload of parameter {name} is not valid JSON (line {line}, column {column})")]
    Parse {
        name: String,
        line: usize,
        column: usize,
    },

    #[error("payload of parameter {name} has no '{field}' field")]
    FieldMissing { name: String, field: String },

    #[error("field '{field}' of parameter {name} is not a non-empty string")]
    FieldNotString { name: String, field: String },

    #[error("parameter store error: {0}")]
    Store(String),
}

impl SecretError {
    /// Build a parse error from a `serde_json` error, keeping the position only.
    pub fn parse(name: &str, err: &serde_json::Error) -> Self {
        SecretError::Parse {
            name: name.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }
}

/// Failure while ensuring the administrative account.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("provisioning script for '{username}' reported no outcome")]
    UnexpectedOutput { username: String },
}

/// Failure to hand the process over to the server.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("cannot bind {addr}: {source}")]
    PortUnavailable {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server program not found: {0}")]
    ProgramNotFound(String),

    #[error("failed to exec {program}: {source}")]
    Exec {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
