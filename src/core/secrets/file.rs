//! Local JSON file parameter store.
//!
//! The file maps parameter names to payloads. A payload may be a JSON object
//! or, mirroring SSM's `Parameter.Value`, a string holding a JSON document:
//!
//! ```json
//! {
//!   "prod/superuser": { "superuser_password": "..." },
//!   "stage/superuser": "{\"superuser_password\": \"...\"}"
//! }
//! ```

use serde_json::Value;
use std::path::PathBuf;
use tracing::trace;
use zeroize::Zeroizing;

use super::{parse_payload, SecretStore};
use crate::error::SecretError;

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SecretStore for FileStore {
    fn fetch(&self, name: &str) -> Result<Value, SecretError> {
        trace!(path = %self.path.display(), "reading parameter file");

        let contents = std::fs::read_to_string(&self.path).map(Zeroizing::new).map_err(|e| {
            SecretError::Store(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        let mut params: Value =
            serde_json::from_str(&contents).map_err(|e| SecretError::parse(name, &e))?;

        match params.get_mut(name).map(Value::take) {
            None => Err(SecretError::NotFound(name.to_string())),
            Some(Value::String(raw)) => {
                let raw = Zeroizing::new(raw);
                parse_payload(name, &raw)
            }
            Some(payload @ Value::Object(_)) => Ok(payload),
            Some(_) => Err(SecretError::Store(format!(
                "parameter {} is neither an object nor a JSON string",
                name
            ))),
        }
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
