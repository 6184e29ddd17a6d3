//! Chocolatey packages for Windows.

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
use crate::merge::{merge_text, merge_value, non_blank, Merge};
use crate::properties::Properties;
use crate::secrets::{resolve_secret, secret_keys, SecretAware, SecretResolver};

#[cfg(test)]
#[path = "chocolatey_tests.rs"]
mod tests;

pub const DEFAULT_CHOCOLATEY_PUSH_URL: &str = "https://push.chocolatey.org/";
pub const DEFAULT_CHOCOLATEY_REPOSITORY: &str = "chocolatey-bucket";

pub const SUPPORTED: SupportTable = &[
    (DistributionType::Binary, &[".zip"]),
    (DistributionType::JavaBinary, &[".zip"]),
    (DistributionType::Jlink, &[".zip"]),
    (DistributionType::NativeImage, &[".zip"]),
    (DistributionType::NativePackage, &[".msi"]),
];

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Chocolatey {
    #[serde(flatten)]
    pub(crate) common: PackagerCommon,
    package_name: Option<String>,
    username: Option<String>,
    api_key: Option<String>,
    title: Option<String>,
    icon_url: Option<String>,
    source: Option<String>,
    remote_build: Option<bool>,
    repository: Tap,
}

packager!(Chocolatey, "chocolatey", snapshots: false);

impl Chocolatey {
    setters! {
        set_package_name => package_name: String,
        set_username => username: String,
        set_api_key => api_key: String,
        set_title => title: String,
        set_icon_url => icon_url: String,
        set_source => source: String,
        set_remote_build => remote_build: bool,
    }

    pub fn api_key(&self) -> Option<&str> {
        non_blank(&self.api_key)
    }

    pub fn username(&self) -> Option<&str> {
        non_blank(&self.username)
    }

    pub fn source(&self) -> &str {
        non_blank(&self.source).unwrap_or(DEFAULT_CHOCOLATEY_PUSH_URL)
    }

    pub fn is_remote_build(&self) -> bool {
        self.remote_build.unwrap_or(false)
    }

    pub fn repository(&self) -> &Tap {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> ConfigurationResult<&mut Tap> {
        self.ensure_mutable()?;
        Ok(&mut self.repository)
    }

    /// Package name, defaulting to the distribution name.
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
            "chocolateyPackageName".into(),
            Value::String(self.package_name(distribution).to_string()),
        );
        props.insert(
            "chocolateyTitle".into(),
            Value::String(non_blank(&self.title).unwrap_or(distribution.name()).to_string()),
        );
        props.insert("chocolateySource".into(), Value::String(self.source().to_string()));
        if let Some(username) = self.username() {
            props.insert("chocolateyUsername".into(), Value::String(username.to_string()));
        }
        if let Some(icon_url) = non_blank(&self.icon_url) {
            props.insert("chocolateyIconUrl".into(), Value::String(icon_url.to_string()));
        }
        Ok(props)
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

impl Packager for Chocolatey {
    fn supported(&self) -> SupportTable {
        SUPPORTED
    }

    fn supports_platform(&self, artifact: &Artifact) -> bool {
        artifact.is_windows_compatible()
    }
}

impl Merge for Chocolatey {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.common.merge(&incoming.common);
        merge_text(&mut self.package_name, &incoming.package_name);
        merge_text(&mut self.username, &incoming.username);
        merge_text(&mut self.api_key, &incoming.api_key);
        merge_text(&mut self.title, &incoming.title);
        merge_text(&mut self.icon_url, &incoming.icon_url);
        merge_text(&mut self.source, &incoming.source);
        merge_value(&mut self.remote_build, &incoming.remote_build);
        self.repository.merge(&incoming.repository)
    }
}

impl SecretAware for Chocolatey {
    fn resolve_secrets(&mut self, resolver: &dyn SecretResolver) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.api_key = resolve_secret(resolver, "chocolatey", None, "api_key", self.api_key.as_deref());
        self.repository.resolve_token(resolver, "chocolatey")
    }

    fn secret_variables(&self) -> Vec<String> {
        let mut variables = secret_keys("chocolatey", None, "api_key");
        variables.extend(Tap::token_variables("chocolatey"));
        variables
    }
}

impl AsMap for Chocolatey {
    fn as_map(&self, full: bool) -> ConfigMap {
        if !full && !self.is_enabled() {
            return ConfigMap::new();
        }
        let mut writer = MapWriter::new();
        self.common.write_head(&mut writer);
        writer
            .put("package_name", &self.package_name)
            .put("username", &self.username)
            .put_secret("api_key", self.api_key.as_deref())
            .put("title", &self.title)
            .put("icon_url", &self.icon_url)
            .put("source", self.source())
            .put("remote_build", self.is_remote_build())
            .put_child(
                "repository",
                self.repository.write_map(DEFAULT_CHOCOLATEY_REPOSITORY),
            )
            .put("extra_properties", &self.common.extra_properties);
        writer.build()
    }
}
