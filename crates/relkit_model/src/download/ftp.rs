//! Downloads over FTP.

use serde::Deserialize;

use super::{downloader, Asset, Downloader, DownloaderCommon};
use crate::active::Activatable;
use crate::context::ReleaseContext;
use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, Freezable};
use crate::merge::{merge_text, merge_value, non_blank, Merge};
use crate::secrets::{resolve_secret, secret_keys, SecretAware, SecretResolver};
use crate::upload::ftp::DEFAULT_FTP_PORT;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FtpDownloader {
    #[serde(flatten)]
    pub(crate) common: DownloaderCommon,
    host: Option<String>,
    port: Option<u16>,
    username: Option<String>,
    password: Option<String>,
}

downloader!(FtpDownloader, "ftp");

impl FtpDownloader {
    setters! {
        set_host => host: String,
        set_port => port: u16,
        set_username => username: String,
        set_password => password: String,
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
}

impl Downloader for FtpDownloader {
    fn common(&self) -> &DownloaderCommon {
        &self.common
    }

    /// `ftp://host:port/<input>`.
    fn resolved_input(&self, context: &ReleaseContext, asset: &Asset) -> ConfigurationResult<String> {
        let props = self.downloader_props(context)?;
        let path = context.render(asset.input(), &props)?;
        Ok(format!(
            "ftp://{}:{}/{}",
            self.host().unwrap_or_default(),
            self.port(),
            path.trim_start_matches('/')
        ))
    }
}

impl Merge for FtpDownloader {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.common.merge(&incoming.common)?;
        merge_text(&mut self.host, &incoming.host);
        merge_value(&mut self.port, &incoming.port);
        merge_text(&mut self.username, &incoming.username);
        merge_text(&mut self.password, &incoming.password);
        Ok(())
    }
}

impl SecretAware for FtpDownloader {
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

impl AsMap for FtpDownloader {
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
            .put_secret("password", self.password.as_deref());
        self.common.write_tail(&mut writer, full);
        writer.build()
    }
}
