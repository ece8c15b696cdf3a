//! Security group repositories

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::client::CloudControllerClient;
use crate::api::types::{SecurityGroup, SecurityGroupEntity};
use crate::core::{FoundryError, FoundryResult};

const STAGING_SET_PATH: &str = "/v2/config/staging_security_groups";

#[async_trait]
pub trait SecurityGroupRepository: Send + Sync {
    /// Read a security group by name
    async fn read(&self, name: &str) -> FoundryResult<SecurityGroup>;
}

/// The default set of security groups applied to staging containers
#[async_trait]
pub trait StagingSecurityGroupsRepository: Send + Sync {
    async fn bind_to_staging_set(&self, guid: &str) -> FoundryResult<()>;

    async fn unbind_from_staging_set(&self, guid: &str) -> FoundryResult<()>;

    async fn list(&self) -> FoundryResult<Vec<SecurityGroup>>;
}

pub struct CloudControllerSecurityGroupRepository {
    gateway: Arc<CloudControllerClient>,
}

impl CloudControllerSecurityGroupRepository {
    pub fn new(gateway: Arc<CloudControllerClient>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl SecurityGroupRepository for CloudControllerSecurityGroupRepository {
    async fn read(&self, name: &str) -> FoundryResult<SecurityGroup> {
        let query = format!("name:{}", name);
        let resources = self
            .gateway
            .list_resources::<SecurityGroupEntity>("/v2/security_groups", &[("q", query.as_str())])
            .await?;

        resources
            .into_iter()
            .next()
            .map(SecurityGroup::from)
            .ok_or_else(|| FoundryError::not_found("Security group", name))
    }
}

pub struct CloudControllerStagingSecurityGroupsRepository {
    gateway: Arc<CloudControllerClient>,
}

impl CloudControllerStagingSecurityGroupsRepository {
    pub fn new(gateway: Arc<CloudControllerClient>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl StagingSecurityGroupsRepository for CloudControllerStagingSecurityGroupsRepository {
    async fn bind_to_staging_set(&self, guid: &str) -> FoundryResult<()> {
        self.gateway.put(&format!("{}/{}", STAGING_SET_PATH, guid)).await
    }

    async fn unbind_from_staging_set(&self, guid: &str) -> FoundryResult<()> {
        self.gateway.delete(&format!("{}/{}", STAGING_SET_PATH, guid)).await
    }

    async fn list(&self) -> FoundryResult<Vec<SecurityGroup>> {
        let resources = self
            .gateway
            .list_resources::<SecurityGroupEntity>(STAGING_SET_PATH, &[])
            .await?;

        Ok(resources.into_iter().map(SecurityGroup::from).collect())
    }
}
