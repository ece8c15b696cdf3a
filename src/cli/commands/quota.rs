//! foundry update-quota - Update an existing resource quota

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::QuotaRepository;
use crate::cli::commands::{single_argument, Command, CommandMetadata, Context, FlagSpec};
use crate::cli::output::{entity_name, Ui};
use crate::core::{ConfigReader, FoundryResult};
use crate::requirements::{Requirement, RequirementsFactory};
use crate::utils::to_megabytes;

pub struct UpdateQuota {
    ui: Arc<dyn Ui>,
    config: Arc<dyn ConfigReader>,
    quota_repo: Arc<dyn QuotaRepository>,
}

impl UpdateQuota {
    pub fn new(ui: Arc<dyn Ui>, config: Arc<dyn ConfigReader>, quota_repo: Arc<dyn QuotaRepository>) -> Self {
        Self { ui, config, quota_repo }
    }
}

#[async_trait]
impl Command for UpdateQuota {
    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "update-quota",
            description: "Update an existing resource quota",
            usage: "foundry update-quota QUOTA [-m MEMORY] [-n NEW_NAME] [-r ROUTES] [-s SERVICE_INSTANCES]",
            flags: vec![
                FlagSpec::string("m", "Total amount of memory (e.g. 1024M, 1G, 10G)"),
                FlagSpec::string("n", "New name"),
                FlagSpec::int("r", "Total number of routes"),
                FlagSpec::int("s", "Total number of service instances"),
            ],
        }
    }

    fn requirements(
        &mut self,
        factory: &dyn RequirementsFactory,
        context: &Context,
    ) -> FoundryResult<Vec<Arc<dyn Requirement>>> {
        single_argument(context, "Requires QUOTA argument")?;
        Ok(vec![factory.login_requirement()])
    }

    async fn run(&mut self, context: &Context) -> FoundryResult<()> {
        let old_name = single_argument(context, "Requires QUOTA argument")?;

        // Malformed sizes are rejected before any remote call.
        let memory = context
            .string("m")
            .filter(|m| !m.is_empty())
            .map(|m| to_megabytes(&m))
            .transpose()?;

        let mut quota = self.quota_repo.find_by_name(&old_name).await?;

        if let Some(memory) = memory {
            quota.memory_limit = memory;
        }

        if let Some(new_name) = context.string("n").filter(|n| !n.is_empty()) {
            quota.name = new_name;
        }

        if let Some(services) = context.int("s") {
            quota.services_limit = services;
        }

        if let Some(routes) = context.int("r") {
            quota.routes_limit = routes;
        }

        self.ui.say(&format!(
            "Updating quota {} as {}...",
            entity_name(&old_name),
            entity_name(&self.config.username())
        ));

        self.quota_repo.update(&quota).await?;

        self.ui.ok();
        Ok(())
    }
}
