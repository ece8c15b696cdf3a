//! Preconditions evaluated before a command body runs
//!
//! A command declares an ordered list of requirements. The runner executes
//! them in order and stops at the first one that fails; the command body only
//! runs when every requirement passed.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::api::{Buildpack, BuildpackRepository, RepositoryLocator};
use crate::core::{ConfigReader, FoundryError, FoundryResult};

/// A single precondition check
#[async_trait]
pub trait Requirement: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Pass, or fail with the message to show the user
    async fn execute(&self) -> FoundryResult<()>;
}

/// Builds requirements bound to the current session
pub trait RequirementsFactory: Send + Sync {
    fn login_requirement(&self) -> Arc<dyn Requirement>;

    fn buildpack_requirement(&self, name: &str) -> Arc<BuildpackRequirement>;
}

/// Requirements backed by the real session and repositories
pub struct Factory {
    config: Arc<dyn ConfigReader>,
    repos: RepositoryLocator,
}

impl Factory {
    pub fn new(config: Arc<dyn ConfigReader>, repos: RepositoryLocator) -> Self {
        Self { config, repos }
    }
}

impl RequirementsFactory for Factory {
    fn login_requirement(&self) -> Arc<dyn Requirement> {
        Arc::new(LoginRequirement::new(self.config.clone()))
    }

    fn buildpack_requirement(&self, name: &str) -> Arc<BuildpackRequirement> {
        Arc::new(BuildpackRequirement::new(name, self.repos.buildpacks.clone()))
    }
}

/// The user has targeted an API endpoint and holds an access token
pub struct LoginRequirement {
    config: Arc<dyn ConfigReader>,
}

impl LoginRequirement {
    pub fn new(config: Arc<dyn ConfigReader>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Requirement for LoginRequirement {
    fn name(&self) -> &str {
        "login"
    }

    async fn execute(&self) -> FoundryResult<()> {
        if self.config.api_endpoint().is_none() {
            return Err(FoundryError::NoApiEndpoint);
        }
        if self.config.access_token().is_none() {
            return Err(FoundryError::NotLoggedIn);
        }
        Ok(())
    }
}

/// The named buildpack exists; keeps the fetched record for the command body
pub struct BuildpackRequirement {
    name: String,
    repo: Arc<dyn BuildpackRepository>,
    buildpack: RwLock<Option<Buildpack>>,
}

impl BuildpackRequirement {
    pub fn new(name: &str, repo: Arc<dyn BuildpackRepository>) -> Self {
        Self {
            name: name.to_string(),
            repo,
            buildpack: RwLock::new(None),
        }
    }

    /// The buildpack fetched by the latest execution of the requirement
    pub fn buildpack(&self) -> FoundryResult<Buildpack> {
        self.buildpack
            .read()
            .clone()
            .ok_or_else(|| FoundryError::not_found("Buildpack", self.name.clone()))
    }
}

#[async_trait]
impl Requirement for BuildpackRequirement {
    fn name(&self) -> &str {
        "buildpack"
    }

    async fn execute(&self) -> FoundryResult<()> {
        self.buildpack.write().take();

        let buildpack = self.repo.find_by_name(&self.name).await?;
        *self.buildpack.write() = Some(buildpack);
        Ok(())
    }
}
