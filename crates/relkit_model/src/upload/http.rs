//! Uploads to arbitrary HTTP endpoints.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

use super::{uploader, Uploader, UploaderCommon};
use crate::active::Activatable;
use crate::artifact::Artifact;
use crate::context::ReleaseContext;
use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, Freezable};
use crate::merge::{merge_map, merge_text, merge_value, non_blank, Merge};
use crate::secrets::{resolve_secret, secret_keys, SecretAware, SecretResolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum HttpMethod {
    #[default]
    Put,
    Post,
}

impl HttpMethod {
    pub fn parse(value: &str) -> ConfigurationResult<Self> {
        match value.trim().to_uppercase().as_str() {
            "PUT" => Ok(HttpMethod::Put),
            "POST" => Ok(HttpMethod::Post),
            _ => Err(ConfigurationError::InvalidValue {
                field: "method".to_string(),
                value: value.to_string(),
                reason: "expected PUT or POST".to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HttpMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// How credentials are attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Authorization {
    #[default]
    None,
    Basic,
    Bearer,
}

impl Authorization {
    pub fn parse(value: &str) -> ConfigurationResult<Self> {
        match value.trim().to_uppercase().as_str() {
            "NONE" => Ok(Authorization::None),
            "BASIC" => Ok(Authorization::Basic),
            "BEARER" => Ok(Authorization::Bearer),
            _ => Err(ConfigurationError::InvalidValue {
                field: "authorization".to_string(),
                value: value.to_string(),
                reason: "expected NONE, BASIC or BEARER".to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Authorization::None => "NONE",
            Authorization::Basic => "BASIC",
            Authorization::Bearer => "BEARER",
        }
    }
}

impl fmt::Display for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Authorization {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl TryFrom<String> for Authorization {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HttpUploader {
    #[serde(flatten)]
    pub(crate) common: UploaderCommon,
    upload_url: Option<String>,
    download_url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    method: Option<HttpMethod>,
    authorization: Option<Authorization>,
    headers: IndexMap<String, String>,
}

uploader!(HttpUploader, "http");

impl HttpUploader {
    setters! {
        set_upload_url => upload_url: String,
        set_download_url => download_url: String,
        set_username => username: String,
        set_password => password: String,
        set_method => method: HttpMethod,
        set_authorization => authorization: Authorization,
    }

    pub fn upload_url(&self) -> Option<&str> {
        non_blank(&self.upload_url)
    }

    pub fn username(&self) -> Option<&str> {
        non_blank(&self.username)
    }

    pub fn password(&self) -> Option<&str> {
        non_blank(&self.password)
    }

    pub fn method(&self) -> HttpMethod {
        self.method.unwrap_or_default()
    }

    pub fn authorization(&self) -> Authorization {
        self.authorization.unwrap_or_default()
    }

    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> ConfigurationResult<&mut IndexMap<String, String>> {
        self.ensure_mutable()?;
        Ok(&mut self.headers)
    }

    /// Header values expanded for `artifact`.
    pub fn resolved_headers(
        &self,
        context: &ReleaseContext,
        artifact: &Artifact,
    ) -> ConfigurationResult<IndexMap<String, String>> {
        let props = self.artifact_props(context, artifact)?;
        self.headers
            .iter()
            .map(|(name, value)| -> ConfigurationResult<(String, String)> {
                Ok((name.clone(), context.render(value, &props)?))
            })
            .collect()
    }
}

impl Uploader for HttpUploader {
    fn common(&self) -> &UploaderCommon {
        &self.common
    }

    fn resolved_upload_url(&self, context: &ReleaseContext, artifact: &Artifact) -> ConfigurationResult<String> {
        let template = self.upload_url().ok_or_else(|| ConfigurationError::InvalidValue {
            field: format!("upload.http.{}.upload_url", self.name()),
            value: String::new(),
            reason: "must not be blank".to_string(),
        })?;
        let props = self.artifact_props(context, artifact)?;
        context.render(template, &props)
    }

    /// The download URL, falling back to the upload URL.
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

impl Merge for HttpUploader {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.common.merge(&incoming.common);
        merge_text(&mut self.upload_url, &incoming.upload_url);
        merge_text(&mut self.download_url, &incoming.download_url);
        merge_text(&mut self.username, &incoming.username);
        merge_text(&mut self.password, &incoming.password);
        merge_value(&mut self.method, &incoming.method);
        merge_value(&mut self.authorization, &incoming.authorization);
        merge_map(&mut self.headers, &incoming.headers);
        Ok(())
    }
}

impl SecretAware for HttpUploader {
    fn resolve_secrets(&mut self, resolver: &dyn SecretResolver) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        let name = self.common.name.clone();
        self.username = resolve_secret(resolver, "http", Some(name.as_str()), "username", self.username.as_deref());
        self.password = resolve_secret(resolver, "http", Some(name.as_str()), "password", self.password.as_deref());
        Ok(())
    }

    fn secret_variables(&self) -> Vec<String> {
        let mut variables = secret_keys("http", Some(self.name()), "username");
        variables.extend(secret_keys("http", Some(self.name()), "password"));
        variables
    }
}

impl AsMap for HttpUploader {
    fn as_map(&self, full: bool) -> ConfigMap {
        if !full && !self.is_enabled() {
            return ConfigMap::new();
        }
        let mut writer = MapWriter::new();
        self.common.write_head(&mut writer);
        writer
            .put("upload_url", &self.upload_url)
            .put("download_url", &self.download_url)
            .put_secret("username", self.username.as_deref())
            .put_secret("password", self.password.as_deref())
            .put("method", self.method())
            .put("authorization", self.authorization())
            .put("headers", &self.headers);
        self.common.write_tail(&mut writer);
        writer.build()
    }
}
