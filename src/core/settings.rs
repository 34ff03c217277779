//! Settings file management.
//!
//! Handles reading and validating `primer.toml`, which wires the
//! collaborator commands. Every section is optional; a missing file means
//! built-in defaults for a stock Django + gunicorn image.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::constants;
use crate::error::{ConfigError, Result};

/// Collaborator wiring loaded from `primer.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Application management commands
    pub app: AppSettings,
    /// Parameter store backend
    pub secrets: SecretSettings,
    /// Application server
    pub server: ServerSettings,
    /// Extra environment applied to every collaborator
    pub env: BTreeMap<String, String>,
}

/// How to reach the application's management entry point.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppSettings {
    /// Interpreter used to run `manage`
    pub python: String,
    /// Management script, relative to `workdir`
    pub manage: PathBuf,
    /// Arguments after `manage` for the migration phase
    pub migrate: Vec<String>,
    /// Arguments after `manage` for the static asset phase
    pub collectstatic: Vec<String>,
    /// Working directory for every collaborator, including the server
    pub workdir: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            python: constants::DEFAULT_PYTHON.to_string(),
            manage: PathBuf::from(constants::DEFAULT_MANAGE),
            migrate: to_strings(constants::MIGRATE_ARGS),
            collectstatic: to_strings(constants::COLLECTSTATIC_ARGS),
            workdir: None,
        }
    }
}

/// Which parameter store backend to read the credential from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecretBackendKind {
    /// `aws ssm get-parameter` through the AWS CLI
    #[default]
    AwsCli,
    /// AWS SDK, requires the `aws` feature
    AwsSdk,
    /// Local JSON file
    File,
}

impl SecretBackendKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AwsCli => "aws-cli",
            Self::AwsSdk => "aws-sdk",
            Self::File => "file",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecretSettings {
    pub backend: SecretBackendKind,
    /// Payload field holding the password
    pub field: String,
    /// AWS region; falls back to the SDK/CLI default chain
    pub region: Option<String>,
    /// AWS CLI program for the `aws-cli` backend
    pub aws: String,
    /// JSON file for the `file` backend
    pub path: Option<PathBuf>,
}

impl Default for SecretSettings {
    fn default() -> Self {
        Self {
            backend: SecretBackendKind::default(),
            field: constants::PASSWORD_FIELD.to_string(),
            region: None,
            aws: constants::DEFAULT_AWS.to_string(),
            path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
    pub program: String,
    /// Entry module template; `{service}` is substituted
    pub module: String,
    pub host: String,
    /// Extra arguments appended after bind and workers
    pub args: Vec<String>,
    /// Bind-and-release the listen address before exec
    pub preflight_bind: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            program: constants::DEFAULT_SERVER.to_string(),
            module: constants::DEFAULT_MODULE.to_string(),
            host: constants::DEFAULT_HOST.to_string(),
            args: Vec::new(),
            preflight_bind: true,
        }
    }
}

impl Settings {
    /// Resolve and load settings.
    ///
    /// An explicit path must exist. Without one, `primer.toml` in the
    /// working directory is used if present, otherwise defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file can't be read, parsed or validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::SettingsNotFound(path.to_path_buf()).into());
                }
                Self::from_file(path)
            }
            None => {
                let path = PathBuf::from(constants::SETTINGS_FILE);
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    debug!("no settings file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load settings from a specific file.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading settings");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadSettings {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    /// Parse and validate settings from TOML text; `path` is for error messages.
    pub fn parse(contents: &str, path: &Path) -> Result<Self> {
        let settings: Self = toml::from_str(contents).map_err(|source| ConfigError::ParseSettings {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;

        debug!(
            backend = settings.secrets.backend.name(),
            server = %settings.server.program,
            env = settings.env.len(),
            "settings loaded"
        );
        Ok(settings)
    }

    /// Validate settings for internal consistency.
    pub fn validate(&self) -> Result<()> {
        fn non_empty(key: &'static str, value: &str) -> Result<()> {
            if value.trim().is_empty() {
                return Err(ConfigError::Setting {
                    key,
                    reason: "must not be empty".to_string(),
                }
                .into());
            }
            Ok(())
        }

        non_empty("app.python", &self.app.python)?;
        non_empty("app.manage", &self.app.manage.to_string_lossy())?;
        non_empty("secrets.field", &self.secrets.field)?;
        non_empty("server.program", &self.server.program)?;
        non_empty("server.host", &self.server.host)?;

        if !self.server.module.contains(constants::SERVICE_PLACEHOLDER) {
            return Err(ConfigError::Setting {
                key: "server.module",
                reason: format!("must contain {}", constants::SERVICE_PLACEHOLDER),
            }
            .into());
        }

        if let Some(key) = self.env.keys().find(|k| k.is_empty() || k.contains('=')) {
            return Err(ConfigError::Setting {
                key: "env",
                reason: format!("invalid variable name '{}'", key),
            }
            .into());
        }

        Ok(())
    }

    /// Server entry module for a service.
    pub fn module_for(&self, service: &str) -> String {
        self.server
            .module
            .replace(constants::SERVICE_PLACEHOLDER, service)
    }
}

fn to_strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}
