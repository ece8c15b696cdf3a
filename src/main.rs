//! Foundry - manage resources on a multi-tenant application platform
//!
//! Every subcommand declares the requirements (login, resource existence)
//! that must hold before it runs, then talks to the platform's cloud
//! controller API and reports `OK` or `FAILED`.

mod api;
mod cli;
mod core;
mod requirements;
mod utils;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::api::RepositoryLocator;
use crate::cli::commands::{all_commands, Context, Dependencies};
use crate::cli::output::{TerminalUi, Ui};
use crate::cli::runner::{run_command, run_with_args};
use crate::cli::Invocation;
use crate::core::{Config, ConfigReader};
use crate::requirements::Factory;

#[tokio::main]
async fn main() {
    let ui: Arc<dyn Ui> = Arc::new(TerminalUi);

    let (config, config_error) = match Config::load_default() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    let config: Arc<dyn ConfigReader> = Arc::new(config);

    let repos = match RepositoryLocator::new(config.clone()) {
        Ok(repos) => repos,
        Err(e) => {
            ui.failed(&e.to_string());
            std::process::exit(e.exit_code());
        }
    };

    let deps = Dependencies {
        ui: ui.clone(),
        config: config.clone(),
        repos: repos.clone(),
    };
    let mut commands = all_commands(&deps);

    let argv: Vec<String> = std::env::args().collect();
    let invocation = cli::parse(&commands, &argv).unwrap_or_else(|e| e.exit());

    // Initialize tracing
    let default_level = if invocation.verbose() { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if let Some(e) = config_error {
        ui.warn(&format!("Could not load session, continuing without one: {}", e));
    }

    let name = invocation.name().to_string();
    let Some(command) = commands.iter_mut().find(|c| c.metadata().name == name) else {
        ui.failed(&format!("'{}' is not a registered command", name));
        std::process::exit(2);
    };

    let factory = Factory::new(config, repos);
    let outcome = match invocation {
        Invocation::Parsed { matches, .. } => {
            let context = Context::from_matches(matches);
            run_command(&mut **command, &context, &factory, ui.as_ref()).await
        }
        Invocation::Rejected { args, .. } => {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            run_with_args(&mut **command, &args, &factory, ui.as_ref()).await
        }
    };
    tracing::debug!(
        "{} finished: {:?} (requirements passed: {})",
        name,
        outcome,
        outcome.passed_requirements()
    );

    std::process::exit(outcome.exit_code());
}
