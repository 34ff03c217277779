//! Parameter store access.
//!
//! Retrieves the credential bundle by name and extracts the superuser
//! password from it. Backends implement [`SecretStore`]:
//!
//! - **aws-cli**: default. Shells out to `aws ssm get-parameter --with-decryption`.
//! - **aws-sdk**: feature-gated (`aws`). Uses `aws-sdk-ssm` directly.
//! - **file**: a local JSON file, for development and tests.
//!
//! ## Adding a New Backend
//!
//! 1. Implement the `SecretStore` trait
//! 2. Add the implementation in a new file
//! 3. Feature-gate if it pulls in an SDK
//! 4. Wire it into [`open`]

use serde_json::Value;
use std::fmt;
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::settings::{SecretBackendKind, Settings};
use crate::error::{self, ConfigError, Error, SecretError};

mod aws_cli;
mod file;

#[cfg(feature = "aws")]
pub mod aws;

pub use aws_cli::AwsCli;
pub use file::FileStore;

/// A remote key-value store that decrypts on read.
pub trait SecretStore {
    /// Fetch the parameter called `name`, decrypted and parsed as JSON.
    ///
    /// # Errors
    ///
    /// Returns `SecretError::NotFound`, `DecryptDenied`, `Parse` or `Store`.
    fn fetch(&self, name: &str) -> Result<Value, SecretError>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// Decrypted superuser password.
///
/// Wiped from memory on drop. No `Display` or `Serialize`; `Debug` is
/// redacted.
pub struct Secret(Zeroizing<String>);

impl Secret {
    pub fn new(value: String) -> Self {
        Self(Zeroizing::new(value))
    }

    /// Pull `field` out of a fetched payload.
    ///
    /// # Errors
    ///
    /// Returns `SecretError::FieldMissing` if the payload has no such field
    /// and `FieldNotString` if it is not a non-empty string. There is no
    /// fallback value.
    pub fn extract(payload: &Value, name: &str, field: &str) -> Result<Self, SecretError> {
        let value = payload.get(field).ok_or_else(|| SecretError::FieldMissing {
            name: name.to_string(),
            field: field.to_string(),
        })?;
        match value.as_str() {
            Some(s) if !s.is_empty() => Ok(Self::new(s.to_string())),
            _ => Err(SecretError::FieldNotString {
                name: name.to_string(),
                field: field.to_string(),
            }),
        }
    }

    /// The plaintext. Only hand this to the collaborator that needs it.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Parse a parameter value that is itself a JSON document.
///
/// SSM stores the bundle as a JSON-encoded string under `Parameter.Value`.
pub fn parse_payload(name: &str, raw: &str) -> Result<Value, SecretError> {
    serde_json::from_str(raw).map_err(|e| SecretError::parse(name, &e))
}

/// Fetch `name` from `store` and extract the password field.
pub fn retrieve<S: SecretStore + ?Sized>(
    store: &S,
    name: &str,
    field: &str,
) -> Result<Secret, SecretError> {
    debug!(backend = store.name(), parameter = name, "fetching parameter");
    let payload = store.fetch(name)?;
    let secret = Secret::extract(&payload, name, field)?;
    debug!(parameter = name, len = secret.len(), "password extracted");
    Ok(secret)
}

/// Open the backend selected in settings.
///
/// Backend-specific settings are checked here rather than in
/// [`Settings::validate`].
///
/// # Errors
///
/// Returns `ConfigError::Setting` if the backend is missing a required
/// setting, or is `aws-sdk` in a build without the `aws` feature.
pub fn open(settings: &Settings) -> error::Result<Box<dyn SecretStore>> {
    let secrets = &settings.secrets;
    match secrets.backend {
        SecretBackendKind::AwsCli => {
            if secrets.aws.trim().is_empty() {
                return Err(setting("secrets.aws", "must not be empty"));
            }
            debug!("creating aws-cli parameter store");
            Ok(Box::new(
                AwsCli::new(secrets.aws.clone(), secrets.region.clone())
                    .with_env(settings.env.clone()),
            ))
        }
        SecretBackendKind::AwsSdk => {
            #[cfg(feature = "aws")]
            {
                debug!("creating aws-sdk parameter store");
                Ok(Box::new(aws::AwsSsm::new(secrets.region.clone())))
            }
            #[cfg(not(feature = "aws"))]
            {
                Err(setting(
                    "secrets.backend",
                    "aws-sdk is not available in this build (rebuild with: cargo install primer --features aws)",
                ))
            }
        }
        SecretBackendKind::File => {
            let path = secrets
                .path
                .clone()
                .ok_or_else(|| setting("secrets.path", "required for the file backend"))?;
            let path = match (&settings.app.workdir, path.is_relative()) {
                (Some(dir), true) => dir.join(path),
                _ => path,
            };
            debug!(path = %path.display(), "creating file parameter store");
            Ok(Box::new(FileStore::new(path)))
        }
    }
}

fn setting(key: &'static str, reason: &str) -> Error {
    ConfigError::Setting {
        key,
        reason: reason.to_string(),
    }
    .into()
}

/// In-memory store for unit tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockStore {
    pub params: std::collections::BTreeMap<String, Value>,
}

#[cfg(test)]
impl SecretStore for MockStore {
    fn fetch(&self, name: &str) -> Result<Value, SecretError> {
        self.params
            .get(name)
            .cloned()
            .ok_or_else(|| SecretError::NotFound(name.to_string()))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
