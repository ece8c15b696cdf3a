//! Default staging security group commands

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::{SecurityGroupRepository, StagingSecurityGroupsRepository};
use crate::cli::commands::{single_argument, Command, CommandMetadata, Context};
use crate::cli::output::{entity_name, Ui};
use crate::core::{ConfigReader, FoundryError, FoundryResult};
use crate::requirements::{Requirement, RequirementsFactory};

/// foundry add-default-staging-security-group
pub struct AddToDefaultStagingGroup {
    ui: Arc<dyn Ui>,
    config: Arc<dyn ConfigReader>,
    security_group_repo: Arc<dyn SecurityGroupRepository>,
    staging_group_repo: Arc<dyn StagingSecurityGroupsRepository>,
}

impl AddToDefaultStagingGroup {
    pub fn new(
        ui: Arc<dyn Ui>,
        config: Arc<dyn ConfigReader>,
        security_group_repo: Arc<dyn SecurityGroupRepository>,
        staging_group_repo: Arc<dyn StagingSecurityGroupsRepository>,
    ) -> Self {
        Self {
            ui,
            config,
            security_group_repo,
            staging_group_repo,
        }
    }
}

#[async_trait]
impl Command for AddToDefaultStagingGroup {
    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "add-default-staging-security-group",
            description: "Add a security group to the set of groups applied to staging containers",
            usage: "foundry add-default-staging-security-group NAME",
            flags: vec![],
        }
    }

    fn requirements(
        &mut self,
        factory: &dyn RequirementsFactory,
        context: &Context,
    ) -> FoundryResult<Vec<Arc<dyn Requirement>>> {
        single_argument(context, "Requires NAME argument")?;
        Ok(vec![factory.login_requirement()])
    }

    async fn run(&mut self, context: &Context) -> FoundryResult<()> {
        let name = single_argument(context, "Requires NAME argument")?;
        let security_group = self.security_group_repo.read(&name).await?;

        self.ui.say(&format!(
            "Adding security group '{}' to defaults for staging as '{}'",
            entity_name(&security_group.name),
            entity_name(&self.config.username())
        ));

        self.staging_group_repo
            .bind_to_staging_set(&security_group.guid)
            .await?;

        self.ui.ok();
        Ok(())
    }
}

/// foundry remove-default-staging-security-group
pub struct RemoveFromDefaultStagingGroup {
    ui: Arc<dyn Ui>,
    config: Arc<dyn ConfigReader>,
    security_group_repo: Arc<dyn SecurityGroupRepository>,
    staging_group_repo: Arc<dyn StagingSecurityGroupsRepository>,
}

impl RemoveFromDefaultStagingGroup {
    pub fn new(
        ui: Arc<dyn Ui>,
        config: Arc<dyn ConfigReader>,
        security_group_repo: Arc<dyn SecurityGroupRepository>,
        staging_group_repo: Arc<dyn StagingSecurityGroupsRepository>,
    ) -> Self {
        Self {
            ui,
            config,
            security_group_repo,
            staging_group_repo,
        }
    }
}

#[async_trait]
impl Command for RemoveFromDefaultStagingGroup {
    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "remove-default-staging-security-group",
            description: "Remove a security group from the set of groups applied to staging containers",
            usage: "foundry remove-default-staging-security-group NAME",
            flags: vec![],
        }
    }

    fn requirements(
        &mut self,
        factory: &dyn RequirementsFactory,
        context: &Context,
    ) -> FoundryResult<Vec<Arc<dyn Requirement>>> {
        single_argument(context, "Requires NAME argument")?;
        Ok(vec![factory.login_requirement()])
    }

    async fn run(&mut self, context: &Context) -> FoundryResult<()> {
        let name = single_argument(context, "Requires NAME argument")?;
        let security_group = self.security_group_repo.read(&name).await?;

        self.ui.say(&format!(
            "Removing security group '{}' from defaults for staging as '{}'",
            entity_name(&security_group.name),
            entity_name(&self.config.username())
        ));

        self.staging_group_repo
            .unbind_from_staging_set(&security_group.guid)
            .await?;

        self.ui.ok();
        Ok(())
    }
}

/// foundry staging-security-groups
pub struct ListStagingSecurityGroups {
    ui: Arc<dyn Ui>,
    config: Arc<dyn ConfigReader>,
    staging_group_repo: Arc<dyn StagingSecurityGroupsRepository>,
}

impl ListStagingSecurityGroups {
    pub fn new(
        ui: Arc<dyn Ui>,
        config: Arc<dyn ConfigReader>,
        staging_group_repo: Arc<dyn StagingSecurityGroupsRepository>,
    ) -> Self {
        Self {
            ui,
            config,
            staging_group_repo,
        }
    }
}

#[async_trait]
impl Command for ListStagingSecurityGroups {
    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "staging-security-groups",
            description: "List the security groups applied to staging containers",
            usage: "foundry staging-security-groups",
            flags: vec![],
        }
    }

    fn requirements(
        &mut self,
        factory: &dyn RequirementsFactory,
        context: &Context,
    ) -> FoundryResult<Vec<Arc<dyn Requirement>>> {
        if !context.args().is_empty() {
            return Err(FoundryError::usage("No argument required"));
        }
        Ok(vec![factory.login_requirement()])
    }

    async fn run(&mut self, _context: &Context) -> FoundryResult<()> {
        self.ui.say(&format!(
            "Acquiring default staging security groups as '{}'",
            entity_name(&self.config.username())
        ));

        let groups = self.staging_group_repo.list().await?;

        self.ui.ok();

        if groups.is_empty() {
            self.ui.say("No default staging security groups set");
        }
        for group in &groups {
            self.ui.say(&group.name);
        }

        Ok(())
    }
}
