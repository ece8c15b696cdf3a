//! CLI module for Foundry
//!
//! Global options are declared with clap's derive API; each subcommand is
//! built from the metadata its [`commands::Command`] declares.

pub mod commands;
pub mod output;
pub mod runner;

use clap::error::ErrorKind;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};

use commands::Command;

/// Foundry - manage buildpacks, quotas and security groups on your platform
#[derive(Parser)]
#[command(name = "foundry")]
#[command(author = "Foundry Contributors")]
#[command(version)]
#[command(about = "Manage buildpacks, quotas and security groups on an application platform", long_about = None)]
#[command(propagate_version = true)]
#[command(subcommand_required = true, arg_required_else_help = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Build the top-level parser with one subcommand per command
pub fn build(commands: &[Box<dyn Command>]) -> clap::Command {
    commands
        .iter()
        .fold(Cli::command(), |root, command| root.subcommand(command.metadata().to_clap()))
}

/// What the top-level parser made of the command line
#[derive(Debug)]
pub enum Invocation {
    /// Global flags and the subcommand's matches parsed cleanly
    Parsed {
        verbose: bool,
        name: String,
        matches: ArgMatches,
    },
    /// A subcommand was named but its arguments did not parse; `args` are the
    /// raw arguments that followed it, for the runner to re-parse and report
    Rejected {
        verbose: bool,
        name: String,
        args: Vec<String>,
    },
}

impl Invocation {
    pub fn verbose(&self) -> bool {
        match self {
            Invocation::Parsed { verbose, .. } | Invocation::Rejected { verbose, .. } => *verbose,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Invocation::Parsed { name, .. } | Invocation::Rejected { name, .. } => name,
        }
    }
}

/// Parse `argv` (binary name first).
///
/// Returns clap's own error for help, version, a missing or unknown
/// subcommand. Errors inside a known subcommand become
/// [`Invocation::Rejected`] so they are reported like any other usage failure.
pub fn parse(commands: &[Box<dyn Command>], argv: &[String]) -> Result<Invocation, clap::Error> {
    let err = match build(commands).try_get_matches_from(argv) {
        Ok(matches) => {
            let cli = Cli::from_arg_matches(&matches)?;
            let Some((name, sub_matches)) = matches.subcommand() else {
                return Err(build(commands).error(ErrorKind::MissingSubcommand, "a subcommand is required"));
            };
            return Ok(Invocation::Parsed {
                verbose: cli.verbose,
                name: name.to_string(),
                matches: sub_matches.clone(),
            });
        }
        Err(err) => err,
    };

    if matches!(
        err.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    ) {
        return Err(err);
    }

    let rest = argv.get(1..).unwrap_or_default();
    let Some(position) = rest
        .iter()
        .position(|arg| commands.iter().any(|command| command.metadata().name == arg.as_str()))
    else {
        return Err(err);
    };

    Ok(Invocation::Rejected {
        verbose: rest.iter().any(|arg| is_verbose_flag(arg)),
        name: rest[position].clone(),
        args: rest[position + 1..]
            .iter()
            .filter(|arg| !is_verbose_flag(arg))
            .cloned()
            .collect(),
    })
}

fn is_verbose_flag(arg: &str) -> bool {
    arg == "-v" || arg == "--verbose"
}
