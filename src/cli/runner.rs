//! Command runner
//!
//! Drives one command through `ArgsParsed -> RequirementsEvaluated ->
//! {Skipped | Executing -> {Succeeded | Failed}}` and reports the outcome.

use crate::cli::commands::{Command, CommandMetadata, Context};
use crate::cli::output::Ui;
use crate::core::FoundryError;
use crate::requirements::RequirementsFactory;

/// Terminal state of a command run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Arguments or a requirement failed; the body never ran
    Skipped { exit_code: i32 },
    Succeeded,
    Failed { exit_code: i32 },
}

impl RunOutcome {
    pub fn passed_requirements(&self) -> bool {
        !matches!(self, RunOutcome::Skipped { .. })
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Succeeded => 0,
            RunOutcome::Skipped { exit_code } | RunOutcome::Failed { exit_code } => *exit_code,
        }
    }
}

/// Parse `args` against the command's own flags, then run it
pub async fn run_with_args(
    command: &mut dyn Command,
    args: &[&str],
    factory: &dyn RequirementsFactory,
    ui: &dyn Ui,
) -> RunOutcome {
    let metadata = command.metadata();

    match Context::parse(&metadata, args.iter().copied()) {
        Ok(context) => run_command(command, &context, factory, ui).await,
        Err(err) => {
            report(ui, &metadata, &err);
            RunOutcome::Skipped { exit_code: err.exit_code() }
        }
    }
}

/// Evaluate the command's requirements in order and run it if they all pass
pub async fn run_command(
    command: &mut dyn Command,
    context: &Context,
    factory: &dyn RequirementsFactory,
    ui: &dyn Ui,
) -> RunOutcome {
    let metadata = command.metadata();

    let requirements = match command.requirements(factory, context) {
        Ok(requirements) => requirements,
        Err(err) => {
            report(ui, &metadata, &err);
            return RunOutcome::Skipped { exit_code: err.exit_code() };
        }
    };

    for requirement in &requirements {
        tracing::debug!("{}: checking {} requirement", metadata.name, requirement.name());

        if let Err(err) = requirement.execute().await {
            tracing::debug!("{}: {} requirement failed", metadata.name, requirement.name());
            report(ui, &metadata, &err);
            return RunOutcome::Skipped { exit_code: err.exit_code() };
        }
    }

    match command.run(context).await {
        Ok(()) => RunOutcome::Succeeded,
        Err(err) => {
            report(ui, &metadata, &err);
            RunOutcome::Failed { exit_code: err.exit_code() }
        }
    }
}

fn report(ui: &dyn Ui, metadata: &CommandMetadata, err: &FoundryError) {
    if err.shows_usage() {
        ui.fail_with_usage(&err.to_string(), metadata.usage);
    } else {
        ui.failed(&err.to_string());
    }
}
