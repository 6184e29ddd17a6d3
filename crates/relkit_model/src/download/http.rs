//! Downloads over HTTP.

use indexmap::IndexMap;
use serde::Deserialize;

use super::{downloader, Downloader, DownloaderCommon};
use crate::active::Activatable;
use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, Freezable};
use crate::merge::{merge_map, merge_text, merge_value, non_blank, Merge};
use crate::secrets::{resolve_secret, secret_keys, SecretAware, SecretResolver};
use crate::upload::Authorization;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HttpDownloader {
    #[serde(flatten)]
    pub(crate) common: DownloaderCommon,
    username: Option<String>,
    password: Option<String>,
    authorization: Option<Authorization>,
    headers: IndexMap<String, String>,
}

downloader!(HttpDownloader, "http");

impl HttpDownloader {
    setters! {
        set_username => username: String,
        set_password => password: String,
        set_authorization => authorization: Authorization,
    }

    pub fn username(&self) -> Option<&str> {
        non_blank(&self.username)
    }

    pub fn password(&self) -> Option<&str> {
        non_blank(&self.password)
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
}

impl Downloader for HttpDownloader {
    fn common(&self) -> &DownloaderCommon {
        &self.common
    }
}

impl Merge for HttpDownloader {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.common.merge(&incoming.common)?;
        merge_text(&mut self.username, &incoming.username);
        merge_text(&mut self.password, &incoming.password);
        merge_value(&mut self.authorization, &incoming.authorization);
        merge_map(&mut self.headers, &incoming.headers);
        Ok(())
    }
}

impl SecretAware for HttpDownloader {
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

impl AsMap for HttpDownloader {
    fn as_map(&self, full: bool) -> ConfigMap {
        if !full && !self.is_enabled() {
            return ConfigMap::new();
        }
        let mut writer = MapWriter::new();
        self.common.write_head(&mut writer);
        writer
            .put_secret("username", self.username.as_deref())
            .put_secret("password", self.password.as_deref())
            .put("authorization", self.authorization())
            .put("headers", &self.headers);
        self.common.write_tail(&mut writer, full);
        writer.build()
    }
}
