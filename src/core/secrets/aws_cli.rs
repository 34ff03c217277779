//! SSM Parameter Store through the AWS CLI.
//!
//! ## Requirements
//!
//! - `aws` CLI v2 on `PATH` with credentials from the task role or environment
//! - `ssm:GetParameter` on the parameter and `kms:Decrypt` on its key
//!
//! The CLI prints the parameter as:
//! ```json
//! { "Parameter": { "Name": "prod/superuser", "Value": "{\"superuser_password\": \"...\"}" } }
//! ```

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::trace;
use zeroize::Zeroizing;

use super::{parse_payload, SecretStore};
use crate::core::command::Invocation;
use crate::error::{CommandError, SecretError};

/// Parameter store backend using the `aws` CLI.
#[derive(Debug, Clone)]
pub struct AwsCli {
    program: String,
    region: Option<String>,
    env: BTreeMap<String, String>,
}

impl AwsCli {
    pub fn new(program: String, region: Option<String>) -> Self {
        Self {
            program,
            region,
            env: BTreeMap::new(),
        }
    }

    /// Pass-through environment for the CLI process.
    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    fn invocation(&self, name: &str) -> Invocation {
        let mut inv = Invocation::new(&self.program)
            .args(["ssm", "get-parameter", "--name", name, "--with-decryption"])
            .args(["--output", "json"])
            .envs(&self.env);
        if let Some(region) = &self.region {
            inv = inv.args(["--region", region.as_str()]);
        }
        inv
    }
}

impl SecretStore for AwsCli {
    fn fetch(&self, name: &str) -> Result<Value, SecretError> {
        let inv = self.invocation(name);
        trace!(command = %inv.display(), "querying parameter store");

        let mut cmd = inv.command().map_err(|e| match e {
            CommandError::NotFound(program) => {
                SecretError::Store(format!("program not found: {}", program))
            }
            other => SecretError::Store(other.to_string()),
        })?;

        let output = cmd
            .stdin(std::process::Stdio::null())
            .output()
            .map_err(|e| SecretError::Store(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify(name, output.status.code(), &stderr));
        }

        let stdout = Zeroizing::new(output.stdout);
        trace!(response_len = stdout.len(), "parameter store responded");
        unwrap_parameter(name, &stdout)
    }

    fn name(&self) -> &'static str {
        "aws-cli"
    }
}

/// The parts of a `get-parameter` response that are read.
#[derive(Deserialize)]
struct GetParameterOutput {
    #[serde(rename = "Parameter")]
    parameter: Option<Parameter>,
}

#[derive(Deserialize)]
struct Parameter {
    #[serde(rename = "Value")]
    value: Option<String>,
}

/// Extract and parse `Parameter.Value` from a `get-parameter` response.
pub(crate) fn unwrap_parameter(name: &str, response: &[u8]) -> Result<Value, SecretError> {
    let response: GetParameterOutput =
        serde_json::from_slice(response).map_err(|e| SecretError::parse(name, &e))?;
    let raw = response
        .parameter
        .and_then(|p| p.value)
        .map(Zeroizing::new)
        .ok_or_else(|| {
            SecretError::Store(format!("response for {} has no Parameter.Value", name))
        })?;
    parse_payload(name, &raw)
}

/// Map a failed CLI call onto the secret error taxonomy.
///
/// The CLI reports service errors as
/// `An error occurred (ParameterNotFound) when calling the GetParameter operation: ...`.
fn classify(name: &str, code: Option<i32>, stderr: &str) -> SecretError {
    let detail = stderr
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("no error output")
        .to_string();

    if stderr.contains("ParameterNotFound") {
        return SecretError::NotFound(name.to_string());
    }
    if stderr.contains("AccessDenied")
        || stderr.contains("KMS.")
        || stderr.contains("InvalidKeyId")
    {
        return SecretError::DecryptDenied {
            name: name.to_string(),
            reason: detail,
        };
    }
    match code {
        Some(code) => SecretError::Store(format!("aws exited with status {}: {}", code, detail)),
        None => SecretError::Store(format!("aws was terminated by a signal: {}", detail)),
    }
}
