//! Application server hand-off.
//!
//! The last phase replaces this process with the server (`execve`), so the
//! server keeps the container's PID and receives `SIGTERM` from the runtime
//! directly. Nothing of primer survives a successful launch.

use std::convert::Infallible;
use std::net::TcpListener;
use tracing::{debug, info};

use crate::core::command::Invocation;
use crate::core::settings::Settings;
use crate::core::startup::StartupConfig;
use crate::error::{CommandError, LaunchError};

/// The server command for one service, ready to exec.
#[derive(Debug, Clone)]
pub struct Server {
    invocation: Invocation,
    bind: String,
    preflight: bool,
}

impl Server {
    /// `gunicorn <module> --bind <host>:<port> --workers <n> [args...]`
    pub fn new(settings: &Settings, config: &StartupConfig) -> Self {
        let bind = bind_address(&settings.server.host, config.port());
        let invocation = Invocation::new(&settings.server.program)
            .arg(settings.module_for(config.service()))
            .args(["--bind", bind.as_str()])
            .args(["--workers".to_string(), config.workers().to_string()])
            .args(settings.server.args.iter().cloned())
            .envs(&settings.env)
            .current_dir(settings.app.workdir.as_deref());

        Self {
            invocation,
            bind,
            preflight: settings.server.preflight_bind,
        }
    }

    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    /// `host:port` the server binds to.
    pub fn bind(&self) -> &str {
        &self.bind
    }

    /// Bind and immediately release the listen address.
    ///
    /// Once exec'd, a bind failure would surface as the server exiting; this
    /// reports it as a launch failure while primer still owns the process.
    pub fn preflight(&self) -> Result<(), LaunchError> {
        if !self.preflight {
            return Ok(());
        }
        debug!(addr = %self.bind, "checking listen address");
        let listener = TcpListener::bind(&self.bind).map_err(|source| {
            LaunchError::PortUnavailable {
                addr: self.bind.clone(),
                source,
            }
        })?;
        drop(listener);
        Ok(())
    }

    /// Replace the current process with the server.
    ///
    /// Only returns on failure.
    pub fn exec(&self) -> Result<Infallible, LaunchError> {
        self.preflight()?;

        let mut cmd = self.invocation.command().map_err(|e| match e {
            CommandError::NotFound(program) => LaunchError::ProgramNotFound(program),
            other => LaunchError::Exec {
                program: self.invocation.program().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, other.to_string()),
            },
        })?;

        info!(
            command = %self.invocation.display(),
            pid = std::process::id(),
            "handing off to server"
        );

        exec(&mut cmd).map_err(|source| LaunchError::Exec {
            program: self.invocation.program().to_string(),
            source,
        })
    }
}

fn bind_address(host: &str, port: u16) -> String {
    // Bare IPv6 literals need brackets
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

#[cfg(unix)]
fn exec(cmd: &mut std::process::Command) -> std::io::Result<Infallible> {
    use std::os::unix::process::CommandExt;
    Err(cmd.exec())
}

/// No process-image substitution outside unix: run the server as a child and
/// mirror its exit code.
#[cfg(not(unix))]
fn exec(cmd: &mut std::process::Command) -> std::io::Result<Infallible> {
    let status = cmd.status()?;
    std::process::exit(status.code().unwrap_or(1));
}
