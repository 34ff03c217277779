//! The bootstrap sequence.
//!
//! Runs the five phases strictly in order and stops at the first failure.
//! There are no retries: a failed start is retried by restarting the
//! container.

use std::convert::Infallible;
use std::time::Instant;
use tracing::{error, info};

use crate::core::phase::{Phase, Stage};
use crate::core::secrets::Secret;
use crate::error::{CommandError, Error, LaunchError, ProvisionError, Result, SecretError};

/// What provisioning found in the user store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountOutcome {
    /// The account was absent and has been created.
    Created,
    /// The account already existed and was left untouched.
    Existing,
}

impl AccountOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            AccountOutcome::Created => "created",
            AccountOutcome::Existing => "existing",
        }
    }
}

/// One operation per phase, each a thin wrapper around an external call.
pub trait Steps {
    /// Apply schema migrations non-interactively.
    fn migrate(&mut self) -> std::result::Result<(), CommandError>;

    /// Fetch and decrypt the superuser password.
    fn fetch_secret(&mut self) -> std::result::Result<Secret, SecretError>;

    /// Ensure the administrative account exists, creating it only if absent.
    fn provision(&mut self, secret: &Secret) -> std::result::Result<AccountOutcome, ProvisionError>;

    /// Collect static assets into their serving location.
    fn publish_assets(&mut self) -> std::result::Result<(), CommandError>;

    /// Replace this process with the server. Only returns on failure.
    fn launch(&mut self) -> std::result::Result<Infallible, LaunchError>;
}

/// Drives [`Steps`] through the startup state machine.
#[derive(Debug)]
pub struct Bootstrap<S> {
    steps: S,
    stage: Stage,
}

impl<S: Steps> Bootstrap<S> {
    pub fn new(steps: S) -> Self {
        Self {
            steps,
            stage: Stage::Init,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn steps(&self) -> &S {
        &self.steps
    }

    /// Run every phase. Does not return on success.
    ///
    /// # Errors
    ///
    /// Returns the first phase failure; the stage is left at
    /// `Stage::Failed(phase)` and no later phase runs.
    pub fn run(&mut self) -> Result<Infallible> {
        self.phase(Phase::Migrate, |s| s.migrate().map_err(Error::Migration))?;

        let secret = self.phase(Phase::FetchSecret, |s| s.fetch_secret().map_err(Error::from))?;

        let outcome = self.phase(Phase::Provision, |s| {
            s.provision(&secret).map_err(Error::from)
        })?;
        drop(secret);
        info!(account = outcome.label(), "administrative account ready");

        self.phase(Phase::PublishAssets, |s| {
            s.publish_assets().map_err(Error::Assets)
        })?;

        self.phase(Phase::Launch, |s| s.launch().map_err(Error::from))
    }

    fn phase<T, F>(&mut self, phase: Phase, f: F) -> Result<T>
    where
        F: FnOnce(&mut S) -> Result<T>,
    {
        debug_assert_eq!(self.stage.next_phase(), Some(phase));

        info!(phase = %phase, "phase start");
        let started = Instant::now();

        match f(&mut self.steps) {
            Ok(value) => {
                self.stage = Stage::after(phase);
                info!(
                    phase = %phase,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "phase complete"
                );
                Ok(value)
            }
            Err(err) => {
                self.stage = Stage::Failed(phase);
                error!(
                    phase = %phase,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "phase failed"
                );
                Err(err)
            }
        }
    }
}
