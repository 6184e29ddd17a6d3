//! Uploads over FTP.

use serde::Deserialize;
use serde_json::Value;

use super::{uploader, Uploader, UploaderCommon};
use crate::active::Activatable;
use crate::artifact::Artifact;
use crate::context::ReleaseContext;
use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, Freezable};
use crate::merge::{merge_text, merge_value, non_blank, Merge};
use crate::properties::Properties;
use crate::secrets::{resolve_secret, secret_keys, SecretAware, SecretResolver};

pub const DEFAULT_FTP_PORT: u16 = 21;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FtpUploader {
    #[serde(flatten)]
    pub(crate) common: UploaderCommon,
    host: Option<String>,
    port: Option<u16>,
    username: Option<String>,
    password: Option<String>,
    path: Option<String>,
    download_url: Option<String>,
}

uploader!(FtpUploader, "ftp");

impl FtpUploader {
    setters! {
        set_host => host: String,
        set_port => port: u16,
        set_username => username: String,
        set_password => password: String,
        set_path => path: String,
        set_download_url => download_url: String,
    }

    pub fn host(&self) -> Option<&str> {
        non_blank(&self.host)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_FTP_PORT)
    }

    pub fn username(&self) -> Option<&str> {
        non_blank(&self.username)
    }

    pub fn password(&self) -> Option<&str> {
        non_blank(&self.password)
    }

    pub fn path(&self) -> Option<&str> {
        non_blank(&self.path)
    }

    /// Remote path for `artifact`, without a leading slash.
    pub fn resolved_path(&self, context: &ReleaseContext, artifact: &Artifact) -> ConfigurationResult<String> {
        let template = self.path().ok_or_else(|| ConfigurationError::InvalidValue {
            field: format!("upload.ftp.{}.path", self.name()),
            value: String::new(),
            reason: "must not be blank".to_string(),
        })?;
        let props = self.artifact_props(context, artifact)?;
        Ok(context.render(template, &props)?.trim_start_matches('/').to_string())
    }
}

impl Uploader for FtpUploader {
    fn common(&self) -> &UploaderCommon {
        &self.common
    }

    fn uploader_props(&self) -> Properties {
        let mut props = Properties::new();
        if let Some(host) = self.host() {
            props.insert("ftpHost".into(), Value::String(host.to_string()));
        }
        props.insert("ftpPort".into(), Value::String(self.port().to_string()));
        props
    }

    fn resolved_upload_url(&self, context: &ReleaseContext, artifact: &Artifact) -> ConfigurationResult<String> {
        let path = self.resolved_path(context, artifact)?;
        Ok(format!(
            "ftp://{}:{}/{}",
            self.host().unwrap_or_default(),
            self.port(),
            path
        ))
    }

    fn resolved_download_url(
        &self,
        context: &ReleaseContext,
        artifact: &Artifact,
    ) -> ConfigurationResult<String> {
        match non_blank(&self.download_url) {
            Some(template) => {
                let props = self.artifact_props(context, artifact)?;
                context.render(template, &props)
            }
            None => self.resolved_upload_url(context, artifact),
        }
    }
}

impl Merge for FtpUploader {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.common.merge(&incoming.common);
        merge_text(&mut self.host, &incoming.host);
        merge_value(&mut self.port, &incoming.port);
        merge_text(&mut self.username, &incoming.username);
        merge_text(&mut self.password, &incoming.password);
        merge_text(&mut self.path, &incoming.path);
        merge_text(&mut self.download_url, &incoming.download_url);
        Ok(())
    }
}

impl SecretAware for FtpUploader {
    fn resolve_secrets(&mut self, resolver: &dyn SecretResolver) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        let name = self.common.name.clone();
        self.username = resolve_secret(resolver, "ftp", Some(name.as_str()), "username", self.username.as_deref());
        self.password = resolve_secret(resolver, "ftp", Some(name.as_str()), "password", self.password.as_deref());
        Ok(())
    }

    fn secret_variables(&self) -> Vec<String> {
        let mut variables = secret_keys("ftp", Some(self.name()), "username");
        variables.extend(secret_keys("ftp", Some(self.name()), "password"));
        variables
    }
}

impl AsMap for FtpUploader {
    fn as_map(&self, full: bool) -> ConfigMap {
        if !full && !self.is_enabled() {
            return ConfigMap::new();
        }
        let mut writer = MapWriter::new();
        self.common.write_head(&mut writer);
        writer
            .put("host", &self.host)
            .put("port", self.port())
            .put_secret("username", self.username.as_deref())
            .put_secret("password", self.password.as_deref())
            .put("path", &self.path)
            .put("download_url", &self.download_url);
        self.common.write_tail(&mut writer);
        writer.build()
    }
}
