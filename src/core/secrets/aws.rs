//! SSM Parameter Store through the AWS SDK.
//!
//! Enable with `--features aws`, then select it in `primer.toml`:
//! ```toml
//! [secrets]
//! backend = "aws-sdk"
//! region = "eu-west-1"
//! ```
//!
//! Credentials come from the default provider chain (task role,
//! `AWS_ACCESS_KEY_ID`, profile, ...).

use aws_sdk_ssm::error::ProvideErrorMetadata;
use aws_sdk_ssm::operation::get_parameter::GetParameterError;
use serde_json::Value;
use tracing::trace;
use zeroize::Zeroizing;

use super::{parse_payload, SecretStore};
use crate::error::SecretError;

/// Parameter store backend using `aws-sdk-ssm`.
#[derive(Debug, Clone)]
pub struct AwsSsm {
    region: Option<String>,
}

impl AwsSsm {
    pub fn new(region: Option<String>) -> Self {
        Self { region }
    }
}

impl SecretStore for AwsSsm {
    fn fetch(&self, name: &str) -> Result<Value, SecretError> {
        trace!(parameter = name, "fetching parameter with AWS SDK");

        // The SDK is async; a current-thread runtime keeps the process single-threaded
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SecretError::Store(format!("failed to create runtime: {}", e)))?;

        let raw = rt.block_on(async {
            let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
            if let Some(region) = &self.region {
                loader = loader.region(aws_sdk_ssm::config::Region::new(region.clone()));
            }
            let config = loader.load().await;
            let client = aws_sdk_ssm::Client::new(&config);

            let result = client
                .get_parameter()
                .name(name)
                .with_decryption(true)
                .send()
                .await
                .map_err(|e| match e.as_service_error() {
                    Some(service) => classify(name, service),
                    None => SecretError::Store(format!("GetParameter failed: {}", e)),
                })?;

            result
                .parameter()
                .and_then(|p| p.value())
                .map(|v| Zeroizing::new(v.to_string()))
                .ok_or_else(|| {
                    SecretError::Store(format!("response for {} has no parameter value", name))
                })
        })?;

        trace!(value_len = raw.len(), "fetched parameter with AWS SDK");
        parse_payload(name, &raw)
    }

    fn name(&self) -> &'static str {
        "aws-sdk"
    }
}

fn classify(name: &str, err: &GetParameterError) -> SecretError {
    match err {
        GetParameterError::ParameterNotFound(_) | GetParameterError::ParameterVersionNotFound(_) => {
            SecretError::NotFound(name.to_string())
        }
        GetParameterError::InvalidKeyId(_) => SecretError::DecryptDenied {
            name: name.to_string(),
            reason: err.to_string(),
        },
        other => match other.code() {
            Some(code) if code.contains("AccessDenied") || code.starts_with("KMS") => {
                SecretError::DecryptDenied {
                    name: name.to_string(),
                    reason: code.to_string(),
                }
            }
            _ => SecretError::Store(format!("GetParameter failed: {}", other)),
        },
    }
}
