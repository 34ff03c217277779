//! Bootstrap phases and the startup state machine.
//!
//! ```text
//! Init → Migrated → SecretFetched → AccountReady → StaticReady → Serving
//!   └──────────┴────────────┴──────────────┴──────────────┴──→ Failed(phase)
//! ```

use std::fmt;

use super::constants::exit;

/// One ordered, fatal-on-failure step of the bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Migrate,
    FetchSecret,
    Provision,
    PublishAssets,
    Launch,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Phase; 5] = [
        Phase::Migrate,
        Phase::FetchSecret,
        Phase::Provision,
        Phase::PublishAssets,
        Phase::Launch,
    ];

    /// Label used in logs and failure messages.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Migrate => "migrate",
            Phase::FetchSecret => "fetch-secret",
            Phase::Provision => "provision",
            Phase::PublishAssets => "publish-assets",
            Phase::Launch => "launch",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Phase::Migrate => exit::MIGRATION,
            Phase::FetchSecret => exit::SECRET,
            Phase::Provision => exit::PROVISION,
            Phase::PublishAssets => exit::ASSETS,
            Phase::Launch => exit::LAUNCH,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where the bootstrap currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Migrated,
    SecretFetched,
    AccountReady,
    StaticReady,
    /// Terminal: the process image now belongs to the server.
    Serving,
    /// Terminal: the named phase failed.
    Failed(Phase),
}

impl Stage {
    /// The phase that runs next, if any.
    pub fn next_phase(&self) -> Option<Phase> {
        match self {
            Stage::Init => Some(Phase::Migrate),
            Stage::Migrated => Some(Phase::FetchSecret),
            Stage::SecretFetched => Some(Phase::Provision),
            Stage::AccountReady => Some(Phase::PublishAssets),
            Stage::StaticReady => Some(Phase::Launch),
            Stage::Serving | Stage::Failed(_) => None,
        }
    }

    /// Stage reached once `phase` completes.
    pub fn after(phase: Phase) -> Stage {
        match phase {
            Phase::Migrate => Stage::Migrated,
            Phase::FetchSecret => Stage::SecretFetched,
            Phase::Provision => Stage::AccountReady,
            Phase::PublishAssets => Stage::StaticReady,
            Phase::Launch => Stage::Serving,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Serving | Stage::Failed(_))
    }
}
