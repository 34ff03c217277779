//! Startup parameters.
//!
//! Parsed once from the six positional arguments and immutable afterwards.

use crate::error::{ConfigError, Result};

/// Validated startup parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    service: String,
    port: u16,
    username: String,
    email: String,
    workers: u32,
    secret_param: String,
}

impl StartupConfig {
    /// Validate raw positional values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any value is empty, the service is not a
    /// module name, the port is not in `1..=65535`, or the worker count is
    /// not a positive integer.
    pub fn parse(
        service: &str,
        port: &str,
        username: &str,
        email: &str,
        workers: &str,
        secret_param: &str,
    ) -> Result<Self> {
        let config = Self {
            service: validate_service(service)?,
            port: validate_port(port)?,
            username: required("superuser username", username)?,
            email: required("superuser email", email)?,
            workers: validate_workers(workers)?,
            secret_param: required("secret parameter name", secret_param)?,
        };
        Ok(config)
    }

    /// Service identifier; names the server entry module.
    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn workers(&self) -> u32 {
        self.workers
    }

    /// Name under which the credential bundle is stored.
    pub fn secret_param(&self) -> &str {
        &self.secret_param
    }
}

fn required(field: &'static str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::Empty { field }.into());
    }
    Ok(value.to_string())
}

/// The service becomes part of a Python import path, so only dotted
/// identifiers are accepted.
fn validate_service(value: &str) -> Result<String> {
    let service = required("service", value)?;

    let invalid = |reason: &str| ConfigError::Invalid {
        field: "service",
        value: service.clone(),
        reason: reason.to_string(),
    };

    for segment in service.split('.') {
        let Some(first) = segment.chars().next() else {
            return Err(invalid("empty module path segment").into());
        };
        if first.is_ascii_digit() {
            return Err(invalid("module path segments cannot start with a digit").into());
        }
        if let Some(ch) = segment
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '_')
        {
            return Err(invalid(&format!(
                "invalid character '{}'. Only A-Z, a-z, 0-9, '_' and '.' are allowed",
                ch
            ))
            .into());
        }
    }

    Ok(service)
}

fn validate_port(value: &str) -> Result<u16> {
    let raw = required("port", value)?;
    let port: u16 = raw.parse().map_err(|_| ConfigError::Invalid {
        field: "port",
        value: raw.clone(),
        reason: "expected an integer between 1 and 65535".to_string(),
    })?;
    if port == 0 {
        return Err(ConfigError::Invalid {
            field: "port",
            value: raw,
            reason: "port must be positive".to_string(),
        }
        .into());
    }
    Ok(port)
}

fn validate_workers(value: &str) -> Result<u32> {
    let raw = required("workers", value)?;
    match raw.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid {
            field: "workers",
            value: raw,
            reason: "expected a positive integer".to_string(),
        }
        .into()),
    }
}
