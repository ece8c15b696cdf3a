//! Quota definition repository

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::client::CloudControllerClient;
use crate::api::types::{Quota, QuotaEntity};
use crate::core::{FoundryError, FoundryResult};

#[async_trait]
pub trait QuotaRepository: Send + Sync {
    /// Find a quota definition by its name
    async fn find_by_name(&self, name: &str) -> FoundryResult<Quota>;

    /// Submit the whole quota record
    async fn update(&self, quota: &Quota) -> FoundryResult<()>;
}

pub struct CloudControllerQuotaRepository {
    gateway: Arc<CloudControllerClient>,
}

impl CloudControllerQuotaRepository {
    pub fn new(gateway: Arc<CloudControllerClient>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl QuotaRepository for CloudControllerQuotaRepository {
    async fn find_by_name(&self, name: &str) -> FoundryResult<Quota> {
        let query = format!("name:{}", name);
        let resources = self
            .gateway
            .list_resources::<QuotaEntity>("/v2/quota_definitions", &[("q", query.as_str())])
            .await?;

        resources
            .into_iter()
            .next()
            .map(Quota::from)
            .ok_or_else(|| FoundryError::not_found("Quota", name))
    }

    async fn update(&self, quota: &Quota) -> FoundryResult<()> {
        let path = format!("/v2/quota_definitions/{}", quota.guid);
        self.gateway
            .update_resource::<_, QuotaEntity>(&path, &QuotaEntity::from(quota))
            .await?;
        Ok(())
    }
}
