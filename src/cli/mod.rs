//! Command-line interface.

pub mod output;
pub mod plan;

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::debug;

use crate::core::bootstrap::Bootstrap;
use crate::core::django::Django;
use crate::core::secrets;
use crate::core::settings::Settings;
use crate::core::startup::StartupConfig;
use crate::error::Result;

/// Primer - container startup bootstrap.
///
/// Migrates the schema, fetches the superuser password from the parameter
/// store, ensures the admin account exists, collects static files, then
/// replaces itself with the application server.
#[derive(Parser, Debug)]
#[command(
    name = "primer",
    about = "Container startup bootstrap: migrate, provision, collect static, exec the server",
    version
)]
pub struct Cli {
    /// Service identifier; the server entry module is <SERVICE>.wsgi
    #[arg(env = "PRIMER_SERVICE")]
    pub service: String,

    /// Container listen port
    #[arg(env = "PRIMER_PORT")]
    pub port: String,

    /// Superuser username
    #[arg(env = "PRIMER_SUPERUSER")]
    pub superuser: String,

    /// Superuser email
    #[arg(env = "PRIMER_EMAIL")]
    pub email: String,

    /// Server worker count
    #[arg(env = "PRIMER_WORKERS")]
    pub workers: String,

    /// Parameter store name of the credential bundle
    #[arg(env = "PRIMER_SECRET_PARAM")]
    pub secret_param: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Settings file (default: ./primer.toml if present)
    #[arg(long, env = "PRIMER_SETTINGS", value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, env = "PRIMER_LOG_FORMAT", default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Print the planned commands and exit without running anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Log formats.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Validate inputs and run the bootstrap.
///
/// Returns only for a dry run or on failure; a successful bootstrap ends in
/// the server replacing this process.
pub fn execute(cli: Cli) -> Result<()> {
    let config = StartupConfig::parse(
        &cli.service,
        &cli.port,
        &cli.superuser,
        &cli.email,
        &cli.workers,
        &cli.secret_param,
    )?;
    let settings = Settings::load(cli.settings.as_deref())?;
    let store = secrets::open(&settings)?;

    debug!(
        service = config.service(),
        port = config.port(),
        workers = config.workers(),
        backend = store.name(),
        "startup configuration"
    );

    let django = Django::new(settings, config, store);

    if cli.dry_run {
        plan::print(&django);
        return Ok(());
    }

    let never = Bootstrap::new(django).run()?;
    match never {}
}
