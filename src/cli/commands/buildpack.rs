//! foundry update-buildpack - Update a buildpack

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::{BuildpackBitsRepository, BuildpackRepository, BuildpackUpdate};
use crate::cli::commands::{single_argument, Command, CommandMetadata, Context, FlagSpec};
use crate::cli::output::{entity_name, Ui};
use crate::core::{FoundryError, FoundryResult};
use crate::requirements::{BuildpackRequirement, Requirement, RequirementsFactory};

pub struct UpdateBuildpack {
    ui: Arc<dyn Ui>,
    buildpack_repo: Arc<dyn BuildpackRepository>,
    bits_repo: Arc<dyn BuildpackBitsRepository>,
    buildpack_req: Option<Arc<BuildpackRequirement>>,
}

impl UpdateBuildpack {
    pub fn new(
        ui: Arc<dyn Ui>,
        buildpack_repo: Arc<dyn BuildpackRepository>,
        bits_repo: Arc<dyn BuildpackBitsRepository>,
    ) -> Self {
        Self {
            ui,
            buildpack_repo,
            bits_repo,
            buildpack_req: None,
        }
    }
}

/// Collapse an on/off flag pair into an optional value
fn switch(on: bool, off: bool, conflict: &str) -> FoundryResult<Option<bool>> {
    match (on, off) {
        (true, true) => Err(FoundryError::usage(conflict)),
        (true, false) => Ok(Some(true)),
        (false, true) => Ok(Some(false)),
        (false, false) => Ok(None),
    }
}

#[async_trait]
impl Command for UpdateBuildpack {
    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "update-buildpack",
            description: "Update a buildpack",
            usage: "foundry update-buildpack BUILDPACK [-p PATH] [-i POSITION] [--enable|--disable] [--lock|--unlock]",
            flags: vec![
                FlagSpec::int("i", "Buildpack position among other buildpacks"),
                FlagSpec::string("p", "Path to directory or zip file"),
                FlagSpec::bool("enable", "Enable the buildpack"),
                FlagSpec::bool("disable", "Disable the buildpack"),
                FlagSpec::bool("lock", "Lock the buildpack"),
                FlagSpec::bool("unlock", "Unlock the buildpack"),
            ],
        }
    }

    fn requirements(
        &mut self,
        factory: &dyn RequirementsFactory,
        context: &Context,
    ) -> FoundryResult<Vec<Arc<dyn Requirement>>> {
        let name = single_argument(context, "Requires BUILDPACK argument")?;

        let buildpack_req = factory.buildpack_requirement(&name);
        self.buildpack_req = Some(buildpack_req.clone());

        Ok(vec![factory.login_requirement(), buildpack_req])
    }

    async fn run(&mut self, context: &Context) -> FoundryResult<()> {
        let mut buildpack = self
            .buildpack_req
            .as_ref()
            .ok_or_else(|| FoundryError::usage("Requires BUILDPACK argument"))?
            .buildpack()?;
        let name = buildpack.name.clone();

        self.ui.say(&format!("Updating buildpack {}...", entity_name(&name)));

        let path = context.string("p").filter(|path| !path.is_empty());
        let lock = context.bool("lock");
        let unlock = context.bool("unlock");

        if path.is_some() && (lock || unlock) {
            return Err(FoundryError::usage("Cannot specify buildpack bits and lock/unlock."));
        }

        let mut update = BuildpackUpdate::for_buildpack(&buildpack);
        update.position = context.int("i");
        update.enabled = switch(
            context.bool("enable"),
            context.bool("disable"),
            "Cannot specify both enabled and disabled.",
        )?;
        update.locked = switch(lock, unlock, "Cannot specify both lock and unlock.")?;

        if update.has_changes() {
            tracing::debug!("updating buildpack {} with {:?}", name, update);
            buildpack = self
                .buildpack_repo
                .update(&update)
                .await
                .map_err(|e| e.context(format!("Error updating buildpack {}", name)))?;
        }

        if let Some(path) = path {
            let progress = self.ui.progress(&format!("Uploading {}...", path));
            let result = self.bits_repo.upload_buildpack(&buildpack, &path).await;
            progress.finish_and_clear();

            result.map_err(|e| e.context(format!("Error uploading buildpack {}", name)))?;
        }

        self.ui.ok();
        Ok(())
    }
}
