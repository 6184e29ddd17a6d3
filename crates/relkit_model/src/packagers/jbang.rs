//! JBang catalog entries.

use serde::Deserialize;
use serde_json::Value;

use super::{packager, Packager, PackagerCommon, SupportTable, Tap};
use crate::active::Activatable;
use crate::context::ReleaseContext;
use crate::distribution::{Distribution, DistributionType};
use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, Freezable};
use crate::merge::{merge_text, non_blank, Merge};
use crate::properties::Properties;
use crate::secrets::{SecretAware, SecretResolver};

#[cfg(test)]
#[path = "jbang_tests.rs"]
mod tests;

pub const DEFAULT_JBANG_REPOSITORY: &str = "jbang-catalog";

pub const SUPPORTED: SupportTable = &[
    (DistributionType::JavaBinary, &[".zip", ".tar", ".tar.gz", ".tgz"]),
    (DistributionType::SingleJar, &[".jar"]),
];

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Jbang {
    #[serde(flatten)]
    pub(crate) common: PackagerCommon,
    alias: Option<String>,
    script: Option<String>,
    repository: Tap,
}

packager!(Jbang, "jbang", snapshots: true);

impl Jbang {
    setters! {
        set_alias => alias: String,
        set_script => script: String,
    }

    /// Catalog alias, defaulting to the distribution name. Snapshot aliases
    /// get a `-snapshot` suffix.
    pub fn alias(&self, context: &ReleaseContext, distribution: &Distribution) -> String {
        let alias = non_blank(&self.alias).unwrap_or(distribution.name());
        if context.model().project().is_snapshot() {
            format!("{alias}-snapshot")
        } else {
            alias.to_string()
        }
    }

    /// Script file name inside the catalog repository.
    pub fn script<'a>(&'a self, distribution: &'a Distribution) -> &'a str {
        non_blank(&self.script).unwrap_or(distribution.name())
    }

    pub fn repository(&self) -> &Tap {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> ConfigurationResult<&mut Tap> {
        self.ensure_mutable()?;
        Ok(&mut self.repository)
    }

    pub fn resolved_props(
        &self,
        context: &ReleaseContext,
        distribution: &Distribution,
    ) -> ConfigurationResult<Properties> {
        let mut props = self.packager_props(&context.props()?, distribution);
        props.insert(
            "jbangAlias".into(),
            Value::String(self.alias(context, distribution)),
        );
        props.insert(
            "jbangScript".into(),
            Value::String(self.script(distribution).to_string()),
        );
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

impl Packager for Jbang {
    fn supported(&self) -> SupportTable {
        SUPPORTED
    }
}

impl Merge for Jbang {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.common.merge(&incoming.common);
        merge_text(&mut self.alias, &incoming.alias);
        merge_text(&mut self.script, &incoming.script);
        self.repository.merge(&incoming.repository)
    }
}

impl SecretAware for Jbang {
    fn resolve_secrets(&mut self, resolver: &dyn SecretResolver) -> ConfigurationResult<()> {
        self.repository.resolve_token(resolver, "jbang")
    }

    fn secret_variables(&self) -> Vec<String> {
        Tap::token_variables("jbang")
    }
}

impl AsMap for Jbang {
    fn as_map(&self, full: bool) -> ConfigMap {
        if !full && !self.is_enabled() {
            return ConfigMap::new();
        }
        let mut writer = MapWriter::new();
        self.common.write_head(&mut writer);
        writer
            .put("alias", &self.alias)
            .put("script", &self.script)
            .put_child("repository", self.repository.write_map(DEFAULT_JBANG_REPOSITORY))
            .put("extra_properties", &self.common.extra_properties);
        writer.build()
    }
}
