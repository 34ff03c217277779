//! Dry run.
//!
//! Prints what the bootstrap would do without calling any collaborator.

use crate::cli::output;
use crate::core::django::Django;
use crate::core::phase::Phase;

/// Print the startup parameters and the command behind each phase.
pub fn print(django: &Django) {
    let config = django.config();
    let settings = django.settings();

    output::header("Bootstrap plan");
    output::rule();
    output::kv("service:", config.service());
    output::kv("bind:", django.server().bind());
    output::kv("workers:", config.workers());
    output::kv(
        "superuser:",
        format!("{} <{}>", config.username(), config.email()),
    );
    output::kv(
        "secret:",
        format!(
            "{} ({}, field {})",
            config.secret_param(),
            django.store_name(),
            settings.secrets.field
        ),
    );
    if !settings.env.is_empty() {
        let keys: Vec<&str> = settings.env.keys().map(String::as_str).collect();
        output::kv("env:", keys.join(", "));
    }

    output::section("Phases");
    for (i, phase) in Phase::ALL.iter().enumerate() {
        let command = match phase {
            Phase::Migrate => django.migrate_invocation().display(),
            Phase::FetchSecret => format!("{} {}", django.store_name(), config.secret_param()),
            Phase::Provision => django.provision_invocation().display(),
            Phase::PublishAssets => django.collectstatic_invocation().display(),
            Phase::Launch => format!("exec {}", django.server().invocation().display()),
        };
        output::step(i + 1, phase.label(), &command);
    }
}
