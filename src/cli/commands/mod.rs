//! CLI command implementations
//!
//! Every command pairs static [`CommandMetadata`] with a two-phase contract:
//! [`Command::requirements`] validates the arguments and declares the
//! preconditions, [`Command::run`] performs the action once they all pass.

pub mod buildpack;
pub mod quota;
pub mod security_group;

use std::sync::Arc;

use async_trait::async_trait;
use clap::{Arg, ArgAction, ArgMatches};

use crate::api::RepositoryLocator;
use crate::cli::output::Ui;
use crate::core::{ConfigReader, FoundryError, FoundryResult};
use crate::requirements::{Requirement, RequirementsFactory};

/// Id of the catch-all positional argument
const ARGS: &str = "args";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    String,
    Int,
    Bool,
}

/// A flag declared by a command
#[derive(Debug, Clone)]
pub struct FlagSpec {
    /// One character for a short flag (`-m`), longer for a long flag (`--enable`)
    pub name: &'static str,
    pub kind: FlagKind,
    pub usage: &'static str,
}

impl FlagSpec {
    pub const fn string(name: &'static str, usage: &'static str) -> Self {
        Self { name, kind: FlagKind::String, usage }
    }

    pub const fn int(name: &'static str, usage: &'static str) -> Self {
        Self { name, kind: FlagKind::Int, usage }
    }

    pub const fn bool(name: &'static str, usage: &'static str) -> Self {
        Self { name, kind: FlagKind::Bool, usage }
    }

    fn to_arg(&self) -> Arg {
        let mut chars = self.name.chars();
        let arg = match (chars.next(), chars.next()) {
            (Some(short), None) => Arg::new(self.name).short(short),
            _ => Arg::new(self.name).long(self.name),
        }
        .help(self.usage);

        match self.kind {
            FlagKind::Bool => arg.action(ArgAction::SetTrue),
            FlagKind::String => arg.action(ArgAction::Set).value_name("VALUE"),
            FlagKind::Int => arg
                .action(ArgAction::Set)
                .value_name("N")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64)),
        }
    }
}

/// Name, help and flags of a command
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub flags: Vec<FlagSpec>,
}

impl CommandMetadata {
    /// Build the clap definition used to parse this command's arguments.
    ///
    /// Positional arguments are collected without a count limit so each
    /// command can report a wrong count with its own usage message.
    pub fn to_clap(&self) -> clap::Command {
        let positional = Arg::new(ARGS)
            .action(ArgAction::Append)
            .num_args(1..)
            .required(false)
            .hide(true);

        self.flags.iter().fold(
            clap::Command::new(self.name)
                .about(self.description)
                .override_usage(self.usage)
                .arg(positional),
            |command, flag| command.arg(flag.to_arg()),
        )
    }
}

/// Parsed arguments and flags of one invocation
#[derive(Debug, Clone)]
pub struct Context {
    matches: ArgMatches,
}

impl Context {
    /// Parse `args` (without the command name) against `metadata`
    pub fn parse<I, T>(metadata: &CommandMetadata, args: I) -> FoundryResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = metadata
            .to_clap()
            .no_binary_name(true)
            .try_get_matches_from(args)
            .map_err(|e| FoundryError::usage(clap_message(&e)))?;

        Ok(Self { matches })
    }

    /// Wrap matches already produced by the top-level parser
    pub fn from_matches(matches: ArgMatches) -> Self {
        Self { matches }
    }

    /// Positional arguments
    pub fn args(&self) -> Vec<String> {
        self.matches
            .try_get_many::<String>(ARGS)
            .ok()
            .flatten()
            .map(|values| values.cloned().collect())
            .unwrap_or_default()
    }

    /// Value of a string flag, if passed
    pub fn string(&self, name: &str) -> Option<String> {
        self.matches.try_get_one::<String>(name).ok().flatten().cloned()
    }

    /// Value of an int flag, if passed
    pub fn int(&self, name: &str) -> Option<i64> {
        self.matches.try_get_one::<i64>(name).ok().flatten().copied()
    }

    /// Whether a boolean flag was passed
    pub fn bool(&self, name: &str) -> bool {
        self.matches
            .try_get_one::<bool>(name)
            .ok()
            .flatten()
            .copied()
            .unwrap_or(false)
    }
}

/// First line of a clap error, without its `error: ` prefix
fn clap_message(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.trim_start_matches("error: ").to_string()
}

/// A command: metadata plus the requirements-then-run contract
#[async_trait]
pub trait Command: Send {
    fn metadata(&self) -> CommandMetadata;

    /// Validate the arguments and declare, in order, what must hold before [`Command::run`]
    fn requirements(
        &mut self,
        factory: &dyn RequirementsFactory,
        context: &Context,
    ) -> FoundryResult<Vec<Arc<dyn Requirement>>>;

    async fn run(&mut self, context: &Context) -> FoundryResult<()>;
}

/// Everything commands are constructed from
#[derive(Clone)]
pub struct Dependencies {
    pub ui: Arc<dyn Ui>,
    pub config: Arc<dyn ConfigReader>,
    pub repos: RepositoryLocator,
}

/// Every command this CLI offers
pub fn all_commands(deps: &Dependencies) -> Vec<Box<dyn Command>> {
    vec![
        Box::new(buildpack::UpdateBuildpack::new(
            deps.ui.clone(),
            deps.repos.buildpacks.clone(),
            deps.repos.buildpack_bits.clone(),
        )),
        Box::new(quota::UpdateQuota::new(
            deps.ui.clone(),
            deps.config.clone(),
            deps.repos.quotas.clone(),
        )),
        Box::new(security_group::AddToDefaultStagingGroup::new(
            deps.ui.clone(),
            deps.config.clone(),
            deps.repos.security_groups.clone(),
            deps.repos.staging_security_groups.clone(),
        )),
        Box::new(security_group::RemoveFromDefaultStagingGroup::new(
            deps.ui.clone(),
            deps.config.clone(),
            deps.repos.security_groups.clone(),
            deps.repos.staging_security_groups.clone(),
        )),
        Box::new(security_group::ListStagingSecurityGroups::new(
            deps.ui.clone(),
            deps.config.clone(),
            deps.repos.staging_security_groups.clone(),
        )),
    ]
}

/// Fail with a usage error unless exactly one positional argument was given
pub fn single_argument(context: &Context, missing: &str) -> FoundryResult<String> {
    let mut args = context.args();
    if args.len() != 1 {
        return Err(FoundryError::usage(missing));
    }
    Ok(args.remove(0))
}
