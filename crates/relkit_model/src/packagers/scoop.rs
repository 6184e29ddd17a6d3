//! Scoop manifests for Windows.

use serde::Deserialize;
use serde_json::Value;

use super::{packager, Packager, PackagerCommon, SupportTable, Tap};
use crate::active::Activatable;
use crate::artifact::Artifact;
use crate::context::ReleaseContext;
use crate::distribution::{Distribution, DistributionType};
use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, Freezable};
use crate::merge::{merge_text, non_blank, Merge};
use crate::properties::Properties;
use crate::secrets::{SecretAware, SecretResolver};

#[cfg(test)]
#[path = "scoop_tests.rs"]
mod tests;

pub const DEFAULT_SCOOP_REPOSITORY: &str = "scoop-bucket";
pub const DEFAULT_CHECKVER_URL: &str = "https://{{repoHost}}/{{repoOwner}}/{{repoName}}/releases/latest";
pub const DEFAULT_AUTOUPDATE_URL: &str =
    "https://{{repoHost}}/{{repoOwner}}/{{repoName}}/releases/download/{{tagName}}/{{artifactFileName}}";

pub const SUPPORTED: SupportTable = &[
    (DistributionType::Binary, &[".zip"]),
    (DistributionType::JavaBinary, &[".zip"]),
    (DistributionType::Jlink, &[".zip"]),
    (DistributionType::NativeImage, &[".zip"]),
    (DistributionType::NativePackage, &[".msi"]),
];

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Scoop {
    #[serde(flatten)]
    pub(crate) common: PackagerCommon,
    package_name: Option<String>,
    checkver_url: Option<String>,
    autoupdate_url: Option<String>,
    repository: Tap,
}

packager!(Scoop, "scoop", snapshots: false);

impl Scoop {
    setters! {
        set_package_name => package_name: String,
        set_checkver_url => checkver_url: String,
        set_autoupdate_url => autoupdate_url: String,
    }

    pub fn checkver_url(&self) -> &str {
        non_blank(&self.checkver_url).unwrap_or(DEFAULT_CHECKVER_URL)
    }

    pub fn autoupdate_url(&self) -> &str {
        non_blank(&self.autoupdate_url).unwrap_or(DEFAULT_AUTOUPDATE_URL)
    }

    pub fn repository(&self) -> &Tap {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> ConfigurationResult<&mut Tap> {
        self.ensure_mutable()?;
        Ok(&mut self.repository)
    }

    pub fn package_name<'a>(&'a self, distribution: &'a Distribution) -> &'a str {
        non_blank(&self.package_name).unwrap_or(distribution.name())
    }

    pub fn resolved_props(
        &self,
        context: &ReleaseContext,
        distribution: &Distribution,
    ) -> ConfigurationResult<Properties> {
        let mut props = self.packager_props(&context.props()?, distribution);
        props.insert(
            "scoopPackageName".into(),
            Value::String(self.package_name(distribution).to_string()),
        );
        let checkver = context.render(self.checkver_url(), &props)?;
        props.insert("scoopCheckverUrl".into(), Value::String(checkver));
        Ok(props)
    }

    /// Autoupdate URL for `artifact`.
    pub fn resolved_autoupdate_url(
        &self,
        context: &ReleaseContext,
        distribution: &Distribution,
        artifact: &Artifact,
    ) -> ConfigurationResult<String> {
        let mut props = self.resolved_props(context, distribution)?;
        props.extend(artifact.props());
        context.render(self.autoupdate_url(), &props)
    }

    pub fn resolved_commit_message(
        &self,
        context: &ReleaseContext,
        distribution: &Distribution,
    ) -> ConfigurationResult<String> {
        let props = self.resolved_props(context, distribution)?;
        self.repository.resolved_commit_message(context, &props)
    }
}

impl Packager for Scoop {
    fn supported(&self) -> SupportTable {
        SUPPORTED
    }

    fn supports_platform(&self, artifact: &Artifact) -> bool {
        artifact.is_windows_compatible()
    }
}

impl Merge for Scoop {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.common.merge(&incoming.common);
        merge_text(&mut self.package_name, &incoming.package_name);
        merge_text(&mut self.checkver_url, &incoming.checkver_url);
        merge_text(&mut self.autoupdate_url, &incoming.autoupdate_url);
        self.repository.merge(&incoming.repository)
    }
}

impl SecretAware for Scoop {
    fn resolve_secrets(&mut self, resolver: &dyn SecretResolver) -> ConfigurationResult<()> {
        self.repository.resolve_token(resolver, "scoop")
    }

    fn secret_variables(&self) -> Vec<String> {
        Tap::token_variables("scoop")
    }
}

impl AsMap for Scoop {
    fn as_map(&self, full: bool) -> ConfigMap {
        if !full && !self.is_enabled() {
            return ConfigMap::new();
        }
        let mut writer = MapWriter::new();
        self.common.write_head(&mut writer);
        writer
            .put("package_name", &self.package_name)
            .put("checkver_url", self.checkver_url())
            .put("autoupdate_url", self.autoupdate_url())
            .put_child("repository", self.repository.write_map(DEFAULT_SCOOP_REPOSITORY))
            .put("extra_properties", &self.common.extra_properties);
        writer.build()
    }
}
