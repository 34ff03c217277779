//! Production [`Steps`] for a Django application.
//!
//! Migration, provisioning and static collection all go through
//! `python manage.py`; the password comes from a [`SecretStore`] and the
//! server is exec'd last.

use std::convert::Infallible;
use tracing::{debug, warn};

use crate::core::bootstrap::{AccountOutcome, Steps};
use crate::core::command::Invocation;
use crate::core::constants;
use crate::core::secrets::{self, Secret, SecretStore};
use crate::core::server::Server;
use crate::core::settings::Settings;
use crate::core::startup::StartupConfig;
use crate::error::{CommandError, LaunchError, ProvisionError, SecretError};

pub struct Django {
    settings: Settings,
    config: StartupConfig,
    store: Box<dyn SecretStore>,
    server: Server,
}

impl Django {
    pub fn new(settings: Settings, config: StartupConfig, store: Box<dyn SecretStore>) -> Self {
        let server = Server::new(&settings, &config);
        Self {
            settings,
            config,
            store,
            server,
        }
    }

    /// `python manage.py` with the pass-through environment applied.
    fn manage(&self) -> Invocation {
        let app = &self.settings.app;
        Invocation::new(&app.python)
            .arg(app.manage.to_string_lossy())
            .envs(&self.settings.env)
            .current_dir(app.workdir.as_deref())
    }

    pub fn migrate_invocation(&self) -> Invocation {
        self.manage().args(self.settings.app.migrate.iter().cloned())
    }

    /// The account travels in the environment, added per call.
    pub fn provision_invocation(&self) -> Invocation {
        self.manage()
            .args(["shell", "-c"])
            .arg(constants::PROVISION_SCRIPT)
    }

    pub fn collectstatic_invocation(&self) -> Invocation {
        self.manage()
            .args(self.settings.app.collectstatic.iter().cloned())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config(&self) -> &StartupConfig {
        &self.config
    }

    pub fn server(&self) -> &Server {
        &self.server
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }
}

impl Steps for Django {
    fn migrate(&mut self) -> Result<(), CommandError> {
        self.migrate_invocation().run()
    }

    fn fetch_secret(&mut self) -> Result<Secret, SecretError> {
        secrets::retrieve(
            self.store.as_ref(),
            self.config.secret_param(),
            &self.settings.secrets.field,
        )
    }

    fn provision(&mut self, secret: &Secret) -> Result<AccountOutcome, ProvisionError> {
        let username = self.config.username();
        let stdout = self.provision_invocation().output_with(|cmd| {
            cmd.env(constants::ENV_SUPERUSER_USERNAME, username)
                .env(constants::ENV_SUPERUSER_EMAIL, self.config.email())
                .env(constants::ENV_SUPERUSER_PASSWORD, secret.expose());
        })?;
        parse_outcome(&stdout, username)
    }

    fn publish_assets(&mut self) -> Result<(), CommandError> {
        self.collectstatic_invocation().run()
    }

    fn launch(&mut self) -> Result<Infallible, LaunchError> {
        self.server.exec()
    }
}

/// Read the marker line printed by the provisioning script.
fn parse_outcome(stdout: &str, username: &str) -> Result<AccountOutcome, ProvisionError> {
    let mut outcome = None;
    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match line {
            constants::MARKER_CREATED => outcome = Some(AccountOutcome::Created),
            constants::MARKER_EXISTING => outcome = Some(AccountOutcome::Existing),
            other => debug!(output = other, "provisioning script"),
        }
    }

    match outcome {
        Some(AccountOutcome::Existing) => {
            warn!(username, "account already exists, password left unchanged");
            Ok(AccountOutcome::Existing)
        }
        Some(outcome) => {
            debug!(username, "account created");
            Ok(outcome)
        }
        None => Err(ProvisionError::UnexpectedOutput {
            username: username.to_string(),
        }),
    }
}
