//! Cloud controller API client and repositories

pub mod buildpacks;
pub mod client;
pub mod quotas;
pub mod security_groups;
pub mod types;

use std::sync::Arc;

pub use buildpacks::{BuildpackBitsRepository, BuildpackRepository};
pub use client::CloudControllerClient;
pub use quotas::QuotaRepository;
pub use security_groups::{SecurityGroupRepository, StagingSecurityGroupsRepository};
pub use types::{Buildpack, BuildpackUpdate};

use crate::core::{ConfigReader, FoundryResult};

/// Every repository a command may need
#[derive(Clone)]
pub struct RepositoryLocator {
    pub buildpacks: Arc<dyn BuildpackRepository>,
    pub buildpack_bits: Arc<dyn BuildpackBitsRepository>,
    pub quotas: Arc<dyn QuotaRepository>,
    pub security_groups: Arc<dyn SecurityGroupRepository>,
    pub staging_security_groups: Arc<dyn StagingSecurityGroupsRepository>,
}

impl RepositoryLocator {
    /// Build the HTTP-backed repositories for the session in `config`
    pub fn new(config: Arc<dyn ConfigReader>) -> FoundryResult<Self> {
        let gateway = Arc::new(CloudControllerClient::new(config)?);

        Ok(Self {
            buildpacks: Arc::new(buildpacks::CloudControllerBuildpackRepository::new(gateway.clone())),
            buildpack_bits: Arc::new(buildpacks::CloudControllerBuildpackBitsRepository::new(
                gateway.clone(),
            )),
            quotas: Arc::new(quotas::CloudControllerQuotaRepository::new(gateway.clone())),
            security_groups: Arc::new(security_groups::CloudControllerSecurityGroupRepository::new(
                gateway.clone(),
            )),
            staging_security_groups: Arc::new(
                security_groups::CloudControllerStagingSecurityGroupsRepository::new(gateway),
            ),
        })
    }
}
