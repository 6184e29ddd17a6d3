//! Uploads to the Gitea generic package registry.

use serde::Deserialize;
use serde_json::Value;

use super::gitlab::{DEFAULT_PACKAGE_NAME, DEFAULT_PACKAGE_VERSION};
use super::{uploader, Uploader, UploaderCommon};
use crate::active::Activatable;
use crate::artifact::Artifact;
use crate::context::ReleaseContext;
use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, Freezable};
use crate::merge::{merge_text, non_blank, Merge};
use crate::properties::Properties;
use crate::secrets::{resolve_secret, secret_keys, SecretAware, SecretResolver};

pub const GITEA_PACKAGE_URL: &str =
    "https://{{host}}/api/packages/{{owner}}/generic/{{packageName}}/{{packageVersion}}/{{artifactFileName}}";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GiteaUploader {
    #[serde(flatten)]
    pub(crate) common: UploaderCommon,
    host: Option<String>,
    owner: Option<String>,
    token: Option<String>,
    package_name: Option<String>,
    package_version: Option<String>,
}

uploader!(GiteaUploader, "gitea");

impl GiteaUploader {
    setters! {
        set_host => host: String,
        set_owner => owner: String,
        set_token => token: String,
        set_package_name => package_name: String,
        set_package_version => package_version: String,
    }

    pub fn host(&self) -> Option<&str> {
        non_blank(&self.host)
    }

    pub fn owner(&self) -> Option<&str> {
        non_blank(&self.owner)
    }

    pub fn token(&self) -> Option<&str> {
        non_blank(&self.token)
    }

    pub fn package_name(&self) -> &str {
        non_blank(&self.package_name).unwrap_or(DEFAULT_PACKAGE_NAME)
    }

    pub fn package_version(&self) -> &str {
        non_blank(&self.package_version).unwrap_or(DEFAULT_PACKAGE_VERSION)
    }
}

impl Uploader for GiteaUploader {
    fn common(&self) -> &UploaderCommon {
        &self.common
    }

    fn uploader_props(&self) -> Properties {
        let mut props = Properties::new();
        props.insert("host".into(), Value::String(self.host().unwrap_or_default().to_string()));
        props.insert("owner".into(), Value::String(self.owner().unwrap_or_default().to_string()));
        props
    }

    fn resolved_upload_url(&self, context: &ReleaseContext, artifact: &Artifact) -> ConfigurationResult<String> {
        let mut props = self.artifact_props(context, artifact)?;
        let name = context.render(self.package_name(), &props)?;
        let version = context.render(self.package_version(), &props)?;
        props.insert("packageName".into(), Value::String(name));
        props.insert("packageVersion".into(), Value::String(version));
        context.render(GITEA_PACKAGE_URL, &props)
    }

    fn resolved_download_url(
        &self,
        context: &ReleaseContext,
        artifact: &Artifact,
    ) -> ConfigurationResult<String> {
        self.resolved_upload_url(context, artifact)
    }
}

impl Merge for GiteaUploader {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.common.merge(&incoming.common);
        merge_text(&mut self.host, &incoming.host);
        merge_text(&mut self.owner, &incoming.owner);
        merge_text(&mut self.token, &incoming.token);
        merge_text(&mut self.package_name, &incoming.package_name);
        merge_text(&mut self.package_version, &incoming.package_version);
        Ok(())
    }
}

impl SecretAware for GiteaUploader {
    fn resolve_secrets(&mut self, resolver: &dyn SecretResolver) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        let name = self.common.name.clone();
        self.token = resolve_secret(resolver, "gitea", Some(name.as_str()), "token", self.token.as_deref());
        Ok(())
    }

    fn secret_variables(&self) -> Vec<String> {
        secret_keys("gitea", Some(self.name()), "token")
    }
}

impl AsMap for GiteaUploader {
    fn as_map(&self, full: bool) -> ConfigMap {
        if !full && !self.is_enabled() {
            return ConfigMap::new();
        }
        let mut writer = MapWriter::new();
        self.common.write_head(&mut writer);
        writer
            .put("host", &self.host)
            .put("owner", &self.owner)
            .put_secret("token", self.token.as_deref())
            .put("package_name", self.package_name())
            .put("package_version", self.package_version());
        self.common.write_tail(&mut writer);
        writer.build()
    }
}
