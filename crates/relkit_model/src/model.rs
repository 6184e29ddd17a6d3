//! The root of the release configuration tree.

use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use tracing::{debug, info};

use crate::active::Activatable;
use crate::announce::Announce;
use crate::archive::Assemble;
use crate::distribution::Distribution;
use crate::download::Download;
use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{FreezeState, Freezable};
use crate::hooks::Hooks;
use crate::merge::{merge_model, Merge};
use crate::packagers::Packagers;
use crate::project::Project;
use crate::release::Release;
use crate::secrets::{SecretAware, SecretResolver};
use crate::signing::Signing;
use crate::upload::Upload;

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;

/// Complete release configuration.
///
/// `packagers` holds project-wide packager defaults. Each distribution may
/// override them; the two are combined when enablement is resolved.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReleaseModel {
    #[serde(skip)]
    state: FreezeState,
    project: Project,
    release: Release,
    announce: Announce,
    packagers: Packagers,
    distributions: IndexMap<String, Distribution>,
    upload: Upload,
    download: Download,
    signing: Signing,
    hooks: Hooks,
    assemble: Assemble,
}

impl ReleaseModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn project_mut(&mut self) -> ConfigurationResult<&mut Project> {
        self.ensure_mutable()?;
        Ok(&mut self.project)
    }

    pub fn release(&self) -> &Release {
        &self.release
    }

    pub fn release_mut(&mut self) -> ConfigurationResult<&mut Release> {
        self.ensure_mutable()?;
        Ok(&mut self.release)
    }

    pub fn announce(&self) -> &Announce {
        &self.announce
    }

    pub fn announce_mut(&mut self) -> ConfigurationResult<&mut Announce> {
        self.ensure_mutable()?;
        Ok(&mut self.announce)
    }

    pub fn packagers(&self) -> &Packagers {
        &self.packagers
    }

    pub fn packagers_mut(&mut self) -> ConfigurationResult<&mut Packagers> {
        self.ensure_mutable()?;
        Ok(&mut self.packagers)
    }

    pub fn distributions(&self) -> &IndexMap<String, Distribution> {
        &self.distributions
    }

    pub fn distribution(&self, name: &str) -> Option<&Distribution> {
        self.distributions.get(name)
    }

    /// Adds or replaces the distribution stored under `name`.
    pub fn add_distribution(&mut self, name: &str, mut distribution: Distribution) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        if distribution.name().is_empty() {
            distribution.set_name(name)?;
        }
        self.distributions.insert(name.to_string(), distribution);
        Ok(())
    }

    pub fn upload(&self) -> &Upload {
        &self.upload
    }

    pub fn upload_mut(&mut self) -> ConfigurationResult<&mut Upload> {
        self.ensure_mutable()?;
        Ok(&mut self.upload)
    }

    pub fn download(&self) -> &Download {
        &self.download
    }

    pub fn download_mut(&mut self) -> ConfigurationResult<&mut Download> {
        self.ensure_mutable()?;
        Ok(&mut self.download)
    }

    pub fn signing(&self) -> &Signing {
        &self.signing
    }

    pub fn signing_mut(&mut self) -> ConfigurationResult<&mut Signing> {
        self.ensure_mutable()?;
        Ok(&mut self.signing)
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> ConfigurationResult<&mut Hooks> {
        self.ensure_mutable()?;
        Ok(&mut self.hooks)
    }

    pub fn assemble(&self) -> &Assemble {
        &self.assemble
    }

    pub fn assemble_mut(&mut self) -> ConfigurationResult<&mut Assemble> {
        self.ensure_mutable()?;
        Ok(&mut self.assemble)
    }

    /// Copies map keys into the names of named entries that have none.
    pub fn normalize_names(&mut self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.announce.normalize_names()?;
        self.upload.normalize_names()?;
        self.download.normalize_names()?;
        self.assemble.normalize_names()?;
        for (name, distribution) in self.distributions.iter_mut() {
            if distribution.name().is_empty() {
                distribution.set_name(name.clone())?;
            }
        }
        Ok(())
    }

    /// Derives the enabled flag of every entity from its policy and the
    /// project's release state.
    ///
    /// Containers are resolved before their children. Distribution packagers
    /// are the project-wide defaults overlaid with the distribution's own
    /// settings, resolved against that distribution.
    pub fn resolve_enabled(&mut self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        let project = self.project.clone();
        debug!(
            "Resolving enablement for {} (snapshot: {})",
            project.name().unwrap_or_default(),
            project.is_snapshot()
        );

        self.announce.resolve_enabled_all(&project)?;
        self.upload.resolve_enabled_all(&project)?;
        self.download.resolve_enabled_all(&project)?;
        self.signing.resolve_enabled(&project)?;
        self.hooks.resolve_enabled_all(&project)?;
        self.assemble.resolve_enabled_all(&project)?;

        for distribution in self.distributions.values_mut() {
            distribution.resolve_enabled(&project)?;
            distribution.resolve_packagers(&self.packagers, &project)?;
        }
        info!("Resolved enablement for {} distributions", self.distributions.len());
        Ok(())
    }
}

impl Freezable for ReleaseModel {
    fn kind(&self) -> &'static str {
        "model"
    }

    fn freeze_state(&self) -> &FreezeState {
        &self.state
    }

    fn freeze_state_mut(&mut self) -> &mut FreezeState {
        &mut self.state
    }

    fn visit_children(&mut self, visitor: &mut dyn FnMut(&mut dyn Freezable)) {
        visitor(&mut self.project);
        visitor(&mut self.release);
        visitor(&mut self.announce);
        visitor(&mut self.packagers);
        for distribution in self.distributions.values_mut() {
            visitor(distribution);
        }
        visitor(&mut self.upload);
        visitor(&mut self.download);
        visitor(&mut self.signing);
        visitor(&mut self.hooks);
        visitor(&mut self.assemble);
    }
}

impl Merge for ReleaseModel {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.project.merge(&incoming.project)?;
        self.release.merge(&incoming.release)?;
        self.announce.merge(&incoming.announce)?;
        self.packagers.merge(&incoming.packagers)?;
        merge_model(&mut self.distributions, &incoming.distributions)?;
        self.upload.merge(&incoming.upload)?;
        self.download.merge(&incoming.download)?;
        self.signing.merge(&incoming.signing)?;
        self.hooks.merge(&incoming.hooks)?;
        self.assemble.merge(&incoming.assemble)
    }
}

impl SecretAware for ReleaseModel {
    fn resolve_secrets(&mut self, resolver: &dyn SecretResolver) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.release.resolve_secrets(resolver)?;
        self.announce.resolve_secrets(resolver)?;
        self.packagers.resolve_secrets(resolver)?;
        for distribution in self.distributions.values_mut() {
            distribution.resolve_secrets(resolver)?;
        }
        self.upload.resolve_secrets(resolver)?;
        self.download.resolve_secrets(resolver)?;
        self.signing.resolve_secrets(resolver)
    }

    /// Every variable consulted, without duplicates, in tree order.
    fn secret_variables(&self) -> Vec<String> {
        let mut variables = IndexSet::new();
        variables.extend(self.release.secret_variables());
        variables.extend(self.announce.secret_variables());
        variables.extend(self.packagers.secret_variables());
        for distribution in self.distributions.values() {
            variables.extend(distribution.secret_variables());
        }
        variables.extend(self.upload.secret_variables());
        variables.extend(self.download.secret_variables());
        variables.extend(self.signing.secret_variables());
        variables.into_iter().collect()
    }
}

/// Project-wide packager defaults are not exported on their own: they are
/// never resolved by themselves, and each distribution reports the packagers
/// it actually uses.
impl AsMap for ReleaseModel {
    fn as_map(&self, full: bool) -> ConfigMap {
        MapWriter::new()
            .put_child("project", self.project.as_map(full))
            .put_child("release", self.release.as_map(full))
            .put_child("announce", self.announce.as_map(full))
            .put_named("distributions", &self.distributions, full)
            .put_child("upload", self.upload.as_map(full))
            .put_child("download", self.download.as_map(full))
            .put_child("signing", self.signing.as_map(full))
            .put_child("hooks", self.hooks.as_map(full))
            .put_child("assemble", self.assemble.as_map(full))
            .build()
    }
}
