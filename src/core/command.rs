//! External command invocation.
//!
//! Every collaborator (manage.py, the AWS CLI, the server) is described by
//! an [`Invocation`]: program, arguments, pass-through environment and
//! working directory. Stdio is inherited so collaborator output lands in the
//! container log, except where a phase needs to read stdout.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::debug;

use crate::error::CommandError;

/// A collaborator command, not yet started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    workdir: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            workdir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Environment applied on top of the inherited one.
    pub fn envs(mut self, env: &BTreeMap<String, String>) -> Self {
        self.env
            .extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn current_dir(mut self, dir: Option<&Path>) -> Self {
        self.workdir = dir.map(Path::to_path_buf);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn get_env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }

    /// Locate the program on `PATH`, or relative to the working directory
    /// when it contains a path separator.
    ///
    /// `PATH` from the invocation's own environment wins over primer's, so
    /// the lookup sees what the collaborator would see. The result is
    /// absolute even when the working directory is relative.
    pub fn resolve(&self) -> Result<PathBuf, CommandError> {
        let cwd = self.absolute_workdir()?;
        let paths = self
            .env
            .get("PATH")
            .map(OsString::from)
            .or_else(|| std::env::var_os("PATH"));
        which::which_in(&self.program, paths, cwd)
            .map_err(|_| CommandError::NotFound(self.program.clone()))
    }

    fn absolute_workdir(&self) -> Result<PathBuf, CommandError> {
        let cwd = std::env::current_dir().map_err(|source| self.spawn_error(source))?;
        Ok(match &self.workdir {
            Some(dir) => cwd.join(dir),
            None => cwd,
        })
    }

    /// Build a `std::process::Command` for the resolved program.
    pub fn command(&self) -> Result<Command, CommandError> {
        let program = self.resolve()?;
        let mut cmd = Command::new(program);
        cmd.args(&self.args);
        cmd.envs(&self.env);
        if self.workdir.is_some() {
            cmd.current_dir(self.absolute_workdir()?);
        }
        Ok(cmd)
    }

    /// Run to completion with inherited stdio.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` if the program is missing, fails to start,
    /// exits non-zero or is killed by a signal.
    pub fn run(&self) -> Result<(), CommandError> {
        debug!(command = %self.display(), "running");
        let status = self
            .command()?
            .status()
            .map_err(|source| self.spawn_error(source))?;
        self.check(status)
    }

    /// Run to completion capturing stdout; stderr stays inherited.
    ///
    /// `configure` can add per-call settings, such as sensitive environment
    /// variables that must not be kept on the invocation itself.
    pub fn output_with<F>(&self, configure: F) -> Result<String, CommandError>
    where
        F: FnOnce(&mut Command),
    {
        debug!(command = %self.display(), "running");
        let mut cmd = self.command()?;
        configure(&mut cmd);
        let output = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| self.spawn_error(source))?;
        self.check(output.status)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn spawn_error(&self, source: std::io::Error) -> CommandError {
        CommandError::Spawn {
            program: self.program.clone(),
            source,
        }
    }

    fn check(&self, status: ExitStatus) -> Result<(), CommandError> {
        if status.success() {
            return Ok(());
        }
        match status.code() {
            Some(code) => Err(CommandError::Exited {
                program: self.program.clone(),
                code,
            }),
            None => Err(CommandError::Signaled {
                program: self.program.clone(),
            }),
        }
    }

    /// Shell-like rendering for logs and dry runs.
    ///
    /// Multi-line arguments (inline scripts) are abbreviated.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote(arg: &str) -> String {
    if arg.contains('\n') {
        return "<script>".to_string();
    }
    if !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@,+{}".contains(c))
    {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}
