//! Primer - container startup bootstrap.

use clap::error::ErrorKind;
use clap::Parser;
use std::io::IsTerminal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use primer::cli::output;
use primer::cli::{execute, Cli, LogFormat};
use primer::core::constants::exit;
use primer::error::{CommandError, ConfigError, Error, LaunchError, SecretError};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                std::process::exit(exit::CONFIG);
            }
        },
    };

    init_tracing(cli.verbose, cli.log_format);

    if let Err(e) = execute(cli) {
        output::error(&e.to_string());
        if let Some(hint) = hint(&e) {
            output::hint(hint);
        }
        std::process::exit(e.exit_code());
    }
}

/// Logs go to stderr; stdout belongs to the collaborators and the server.
fn init_tracing(verbose: bool, format: LogFormat) {
    let filter = EnvFilter::try_from_env("PRIMER_LOG").unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("primer=debug")
        } else {
            EnvFilter::new("primer=info")
        }
    });

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(std::io::stderr().is_terminal())
                    .with_target(false),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false),
            )
            .init(),
    }
}

fn hint(e: &Error) -> Option<&'static str> {
    match e {
        Error::Config(ConfigError::SettingsNotFound(_)) => {
            Some("pass --settings <PATH> or create primer.toml")
        }
        Error::Config(ConfigError::Empty { .. }) | Error::Config(ConfigError::Invalid { .. }) => {
            Some("usage: primer <SERVICE> <PORT> <SUPERUSER> <EMAIL> <WORKERS> <SECRET_PARAM>")
        }
        Error::Migration(CommandError::NotFound(_)) | Error::Assets(CommandError::NotFound(_)) => {
            Some("set app.python in primer.toml")
        }
        Error::Secret(SecretError::NotFound(_)) => Some("check the parameter name and region"),
        Error::Secret(SecretError::DecryptDenied { .. }) => {
            Some("grant ssm:GetParameter and kms:Decrypt to the task role")
        }
        Error::Launch(LaunchError::PortUnavailable { .. }) => {
            Some("another process is already listening on this port")
        }
        Error::Launch(LaunchError::ProgramNotFound(_)) => {
            Some("install the server or set server.program in primer.toml")
        }
        _ => None,
    }
}
