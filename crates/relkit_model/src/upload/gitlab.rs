//! Uploads to the GitLab generic package registry.

use serde::Deserialize;
use serde_json::Value;

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

pub const DEFAULT_GITLAB_HOST: &str = "gitlab.com";
pub const DEFAULT_PACKAGE_NAME: &str = "{{projectName}}";
pub const DEFAULT_PACKAGE_VERSION: &str = "{{projectVersion}}";
pub const GITLAB_PACKAGE_URL: &str = "https://{{host}}/api/v4/projects/{{projectIdentifier}}/packages/generic/{{packageName}}/{{packageVersion}}/{{artifactFileName}}";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GitlabUploader {
    #[serde(flatten)]
    pub(crate) common: UploaderCommon,
    host: Option<String>,
    token: Option<String>,
    project_identifier: Option<String>,
    package_name: Option<String>,
    package_version: Option<String>,
}

uploader!(GitlabUploader, "gitlab");

impl GitlabUploader {
    setters! {
        set_host => host: String,
        set_token => token: String,
        set_project_identifier => project_identifier: String,
        set_package_name => package_name: String,
        set_package_version => package_version: String,
    }

    pub fn host(&self) -> &str {
        non_blank(&self.host).unwrap_or(DEFAULT_GITLAB_HOST)
    }

    pub fn token(&self) -> Option<&str> {
        non_blank(&self.token)
    }

    pub fn project_identifier(&self) -> Option<&str> {
        non_blank(&self.project_identifier)
    }

    pub fn package_name(&self) -> &str {
        non_blank(&self.package_name).unwrap_or(DEFAULT_PACKAGE_NAME)
    }

    pub fn package_version(&self) -> &str {
        non_blank(&self.package_version).unwrap_or(DEFAULT_PACKAGE_VERSION)
    }

    fn package_props(&self, context: &ReleaseContext, artifact: &Artifact) -> ConfigurationResult<Properties> {
        let mut props = self.artifact_props(context, artifact)?;
        let name = context.render(self.package_name(), &props)?;
        let version = context.render(self.package_version(), &props)?;
        props.insert("packageName".into(), Value::String(name));
        props.insert("packageVersion".into(), Value::String(version));
        Ok(props)
    }
}

impl Uploader for GitlabUploader {
    fn common(&self) -> &UploaderCommon {
        &self.common
    }

    fn uploader_props(&self) -> Properties {
        let mut props = Properties::new();
        props.insert("host".into(), Value::String(self.host().to_string()));
        props.insert(
            "projectIdentifier".into(),
            Value::String(self.project_identifier().unwrap_or_default().to_string()),
        );
        props
    }

    fn resolved_upload_url(&self, context: &ReleaseContext, artifact: &Artifact) -> ConfigurationResult<String> {
        let props = self.package_props(context, artifact)?;
        context.render(GITLAB_PACKAGE_URL, &props)
    }

    fn resolved_download_url(
        &self,
        context: &ReleaseContext,
        artifact: &Artifact,
    ) -> ConfigurationResult<String> {
        self.resolved_upload_url(context, artifact)
    }
}

impl Merge for GitlabUploader {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.common.merge(&incoming.common);
        merge_text(&mut self.host, &incoming.host);
        merge_text(&mut self.token, &incoming.token);
        merge_text(&mut self.project_identifier, &incoming.project_identifier);
        merge_text(&mut self.package_name, &incoming.package_name);
        merge_text(&mut self.package_version, &incoming.package_version);
        Ok(())
    }
}

impl SecretAware for GitlabUploader {
    fn resolve_secrets(&mut self, resolver: &dyn SecretResolver) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        let name = self.common.name.clone();
        self.token = resolve_secret(resolver, "gitlab", Some(name.as_str()), "token", self.token.as_deref());
        Ok(())
    }

    fn secret_variables(&self) -> Vec<String> {
        secret_keys("gitlab", Some(self.name()), "token")
    }
}

impl AsMap for GitlabUploader {
    fn as_map(&self, full: bool) -> ConfigMap {
        if !full && !self.is_enabled() {
            return ConfigMap::new();
        }
        let mut writer = MapWriter::new();
        self.common.write_head(&mut writer);
        writer
            .put("host", self.host())
            .put_secret("token", self.token.as_deref())
            .put("project_identifier", &self.project_identifier)
            .put("package_name", self.package_name())
            .put("package_version", self.package_version());
        self.common.write_tail(&mut writer);
        writer.build()
    }
}
