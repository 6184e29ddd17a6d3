//! Downloaders fetch remote assets before a release is assembled.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::active::{Activatable, Active, Activation};
use crate::context::ReleaseContext;
use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{FreezeState, Freezable};
use crate::merge::{merge_model, merge_properties, Merge};
use crate::project::Project;
use crate::properties::{ExtraProperties, Properties};
use crate::secrets::{SecretAware, SecretResolver};
use crate::timeout::{TimeoutAware, Timeouts};

pub mod asset;
pub mod ftp;
pub mod http;

pub use asset::{merge_assets, Asset, Unpack};
pub use ftp::FtpDownloader;
pub use http::HttpDownloader;

#[cfg(test)]
#[path = "download_tests.rs"]
mod tests;

/// Fields every downloader carries.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DownloaderCommon {
    #[serde(skip)]
    pub(crate) state: FreezeState,
    #[serde(flatten)]
    pub(crate) activation: Activation,
    #[serde(flatten)]
    pub(crate) timeouts: Timeouts,
    pub(crate) name: String,
    pub(crate) assets: Vec<Asset>,
    pub(crate) extra_properties: Properties,
}

impl DownloaderCommon {
    pub(crate) fn merge(&mut self, incoming: &DownloaderCommon) -> ConfigurationResult<()> {
        self.activation.merge(&incoming.activation);
        self.timeouts.merge(&incoming.timeouts);
        if !incoming.name.trim().is_empty() {
            self.name = incoming.name.clone();
        }
        merge_assets(&mut self.assets, &incoming.assets)?;
        merge_properties(&mut self.extra_properties, &incoming.extra_properties);
        Ok(())
    }

    pub(crate) fn write_head(&self, writer: &mut MapWriter) {
        writer
            .put("enabled", self.activation.is_enabled())
            .put("active", self.activation.active())
            .put("name", &self.name);
    }

    pub(crate) fn write_tail(&self, writer: &mut MapWriter, full: bool) {
        writer
            .put_children("assets", "asset", &self.assets, full)
            .put("connect_timeout", self.timeouts.connect_timeout())
            .put("read_timeout", self.timeouts.read_timeout())
            .put("extra_properties", &self.extra_properties);
    }
}

/// Common behavior of every downloader.
pub trait Downloader: Activatable + ExtraProperties + TimeoutAware + AsMap {
    fn common(&self) -> &DownloaderCommon;

    fn name(&self) -> &str {
        &self.common().name
    }

    fn assets(&self) -> &[Asset] {
        &self.common().assets
    }

    fn downloader_props(&self, context: &ReleaseContext) -> ConfigurationResult<Properties> {
        let mut props = context.props()?;
        props.insert("downloaderName".into(), Value::String(self.name().to_string()));
        props.extend(self.resolved_extra_properties());
        Ok(props)
    }

    /// Source location of `asset` with placeholders expanded.
    fn resolved_input(&self, context: &ReleaseContext, asset: &Asset) -> ConfigurationResult<String> {
        let props = self.downloader_props(context)?;
        context.render(asset.input(), &props)
    }

    /// Target file name of `asset`: the expanded output template, or the
    /// last segment of the resolved input.
    fn resolved_output(&self, context: &ReleaseContext, asset: &Asset) -> ConfigurationResult<String> {
        let props = self.downloader_props(context)?;
        match asset.output() {
            Some(output) => context.render(output, &props),
            None => {
                let input = context.render(asset.input(), &props)?;
                Ok(input.rsplit('/').next().unwrap_or_default().to_string())
            }
        }
    }
}

/// Implements the capability traits for a struct with a `common:
/// DownloaderCommon` field.
macro_rules! downloader {
    ($ty:ty, $kind:literal) => {
        impl $crate::freeze::Freezable for $ty {
            fn kind(&self) -> &'static str {
                $kind
            }

            fn freeze_state(&self) -> &$crate::freeze::FreezeState {
                &self.common.state
            }

            fn freeze_state_mut(&mut self) -> &mut $crate::freeze::FreezeState {
                &mut self.common.state
            }

            fn visit_children(&mut self, visitor: &mut dyn FnMut(&mut dyn $crate::freeze::Freezable)) {
                for asset in &mut self.common.assets {
                    visitor(asset);
                }
            }
        }

        impl $crate::active::Activatable for $ty {
            fn activation(&self) -> &$crate::active::Activation {
                &self.common.activation
            }

            fn activation_mut(&mut self) -> &mut $crate::active::Activation {
                &mut self.common.activation
            }

            fn default_active(&self) -> $crate::active::Active {
                $crate::active::Active::Always
            }
        }

        impl $crate::properties::ExtraProperties for $ty {
            fn prefix(&self) -> &str {
                $kind
            }

            fn extra_properties(&self) -> &$crate::properties::Properties {
                &self.common.extra_properties
            }

            fn extra_properties_slot(&mut self) -> &mut $crate::properties::Properties {
                &mut self.common.extra_properties
            }
        }

        impl $crate::timeout::TimeoutAware for $ty {
            fn timeouts(&self) -> &$crate::timeout::Timeouts {
                &self.common.timeouts
            }
        }

        impl $ty {
            pub fn new(name: &str) -> Self {
                let mut downloader = Self::default();
                downloader.common.name = name.to_string();
                downloader
            }

            pub fn set_name(&mut self, name: impl Into<String>) -> $crate::errors::ConfigurationResult<()> {
                $crate::freeze::Freezable::ensure_mutable(self)?;
                self.common.name = name.into();
                Ok(())
            }

            pub fn add_asset(&mut self, asset: $crate::download::Asset) -> $crate::errors::ConfigurationResult<()> {
                $crate::freeze::Freezable::ensure_mutable(self)?;
                self.common.assets.push(asset);
                Ok(())
            }
        }
    };
}

pub(crate) use downloader;

/// All downloaders of a project, keyed by type and then by name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Download {
    #[serde(skip)]
    state: FreezeState,
    #[serde(flatten)]
    activation: Activation,
    ftp: IndexMap<String, FtpDownloader>,
    http: IndexMap<String, HttpDownloader>,
}

impl Download {
    pub fn ftp(&self) -> &IndexMap<String, FtpDownloader> {
        &self.ftp
    }

    pub fn http(&self) -> &IndexMap<String, HttpDownloader> {
        &self.http
    }

    pub fn add_ftp(&mut self, downloader: FtpDownloader) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.ftp.insert(downloader.name().to_string(), downloader);
        Ok(())
    }

    pub fn add_http(&mut self, downloader: HttpDownloader) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.http.insert(downloader.name().to_string(), downloader);
        Ok(())
    }

    pub fn downloaders(&self) -> Vec<&dyn Downloader> {
        let mut downloaders: Vec<&dyn Downloader> = Vec::new();
        downloaders.extend(self.ftp.values().map(|d| d as &dyn Downloader));
        downloaders.extend(self.http.values().map(|d| d as &dyn Downloader));
        downloaders
    }

    pub(crate) fn normalize_names(&mut self) -> ConfigurationResult<()> {
        for (name, downloader) in self.ftp.iter_mut() {
            if downloader.name().is_empty() {
                downloader.set_name(name.clone())?;
            }
        }
        for (name, downloader) in self.http.iter_mut() {
            if downloader.name().is_empty() {
                downloader.set_name(name.clone())?;
            }
        }
        Ok(())
    }

    /// Resolves the container and every downloader. A disabled container
    /// disables all downloaders.
    pub fn resolve_enabled_all(&mut self, project: &Project) -> ConfigurationResult<bool> {
        let enabled = self.resolve_enabled(project)?;
        let mut children: Vec<&mut dyn Activatable> = Vec::new();
        children.extend(self.ftp.values_mut().map(|d| d as &mut dyn Activatable));
        children.extend(self.http.values_mut().map(|d| d as &mut dyn Activatable));
        for child in children {
            if enabled {
                child.resolve_enabled(project)?;
            } else {
                child.disable()?;
            }
        }
        Ok(enabled)
    }
}

impl Freezable for Download {
    fn kind(&self) -> &'static str {
        "download"
    }

    fn freeze_state(&self) -> &FreezeState {
        &self.state
    }

    fn freeze_state_mut(&mut self) -> &mut FreezeState {
        &mut self.state
    }

    fn visit_children(&mut self, visitor: &mut dyn FnMut(&mut dyn Freezable)) {
        for downloader in self.ftp.values_mut() {
            visitor(downloader);
        }
        for downloader in self.http.values_mut() {
            visitor(downloader);
        }
    }
}

impl Activatable for Download {
    fn activation(&self) -> &Activation {
        &self.activation
    }

    fn activation_mut(&mut self) -> &mut Activation {
        &mut self.activation
    }

    fn default_active(&self) -> Active {
        Active::Always
    }
}

impl Merge for Download {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.activation.merge(&incoming.activation);
        merge_model(&mut self.ftp, &incoming.ftp)?;
        merge_model(&mut self.http, &incoming.http)
    }
}

impl SecretAware for Download {
    fn resolve_secrets(&mut self, resolver: &dyn SecretResolver) -> ConfigurationResult<()> {
        for downloader in self.ftp.values_mut() {
            downloader.resolve_secrets(resolver)?;
        }
        for downloader in self.http.values_mut() {
            downloader.resolve_secrets(resolver)?;
        }
        Ok(())
    }

    fn secret_variables(&self) -> Vec<String> {
        let mut variables: Vec<String> = self.ftp.values().flat_map(|d| d.secret_variables()).collect();
        variables.extend(self.http.values().flat_map(|d| d.secret_variables()));
        variables
    }
}

impl AsMap for Download {
    fn as_map(&self, full: bool) -> ConfigMap {
        if !full && !self.is_enabled() {
            return ConfigMap::new();
        }
        MapWriter::new()
            .put("enabled", self.is_enabled())
            .put("active", self.active())
            .put_named("ftp", &self.ftp, full)
            .put_named("http", &self.http, full)
            .build()
    }
}
