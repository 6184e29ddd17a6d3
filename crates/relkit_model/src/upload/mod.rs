//! Uploaders push release artifacts to generic file endpoints.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::active::{Activatable, Active, Activation};
use crate::artifact::Artifact;
use crate::context::ReleaseContext;
use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{FreezeState, Freezable};
use crate::merge::{merge_model, merge_properties, merge_value, Merge};
use crate::project::Project;
use crate::properties::{ExtraProperties, Properties};
use crate::secrets::{SecretAware, SecretResolver};
use crate::timeout::{TimeoutAware, Timeouts};

pub mod ftp;
pub mod gitea;
pub mod gitlab;
pub mod http;

pub use ftp::FtpUploader;
pub use gitea::GiteaUploader;
pub use gitlab::GitlabUploader;
pub use http::{Authorization, HttpMethod, HttpUploader};

#[cfg(test)]
#[path = "upload_tests.rs"]
mod tests;

/// Fields every uploader carries.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UploaderCommon {
    #[serde(skip)]
    pub(crate) state: FreezeState,
    #[serde(flatten)]
    pub(crate) activation: Activation,
    #[serde(flatten)]
    pub(crate) timeouts: Timeouts,
    pub(crate) name: String,
    pub(crate) artifacts: Option<bool>,
    pub(crate) files: Option<bool>,
    pub(crate) signatures: Option<bool>,
    pub(crate) checksums: Option<bool>,
    pub(crate) extra_properties: Properties,
}

impl UploaderCommon {
    pub(crate) fn merge(&mut self, incoming: &UploaderCommon) {
        self.activation.merge(&incoming.activation);
        self.timeouts.merge(&incoming.timeouts);
        if !incoming.name.trim().is_empty() {
            self.name = incoming.name.clone();
        }
        merge_value(&mut self.artifacts, &incoming.artifacts);
        merge_value(&mut self.files, &incoming.files);
        merge_value(&mut self.signatures, &incoming.signatures);
        merge_value(&mut self.checksums, &incoming.checksums);
        merge_properties(&mut self.extra_properties, &incoming.extra_properties);
    }

    pub(crate) fn write_head(&self, writer: &mut MapWriter) {
        writer
            .put("enabled", self.activation.is_enabled())
            .put("active", self.activation.active())
            .put("name", &self.name)
            .put("artifacts", self.artifacts.unwrap_or(true))
            .put("files", self.files.unwrap_or(true))
            .put("signatures", self.signatures.unwrap_or(true))
            .put("checksums", self.checksums.unwrap_or(true));
    }

    pub(crate) fn write_tail(&self, writer: &mut MapWriter) {
        writer
            .put("connect_timeout", self.timeouts.connect_timeout())
            .put("read_timeout", self.timeouts.read_timeout())
            .put("extra_properties", &self.extra_properties);
    }
}

/// Common behavior of every uploader.
pub trait Uploader: Activatable + ExtraProperties + TimeoutAware + AsMap {
    fn common(&self) -> &UploaderCommon;

    fn name(&self) -> &str {
        &self.common().name
    }

    fn is_artifacts(&self) -> bool {
        self.common().artifacts.unwrap_or(true)
    }

    fn is_files(&self) -> bool {
        self.common().files.unwrap_or(true)
    }

    fn is_signatures(&self) -> bool {
        self.common().signatures.unwrap_or(true)
    }

    fn is_checksums(&self) -> bool {
        self.common().checksums.unwrap_or(true)
    }

    /// Properties specific to this uploader type, e.g. host and owner.
    fn uploader_props(&self) -> Properties {
        Properties::new()
    }

    /// Global, uploader, artifact and extra properties, in that order.
    fn artifact_props(&self, context: &ReleaseContext, artifact: &Artifact) -> ConfigurationResult<Properties> {
        let mut props = context.props()?;
        props.insert("uploaderName".into(), Value::String(self.name().to_string()));
        props.extend(self.uploader_props());
        props.extend(artifact.props());
        props.extend(self.resolved_extra_properties());
        Ok(props)
    }

    fn resolved_upload_url(&self, context: &ReleaseContext, artifact: &Artifact) -> ConfigurationResult<String>;

    fn resolved_download_url(&self, context: &ReleaseContext, artifact: &Artifact)
        -> ConfigurationResult<String>;
}

/// Implements the capability traits for a struct with a `common:
/// UploaderCommon` field.
macro_rules! uploader {
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
        }

        impl $crate::active::Activatable for $ty {
            fn activation(&self) -> &$crate::active::Activation {
                &self.common.activation
            }

            fn activation_mut(&mut self) -> &mut $crate::active::Activation {
                &mut self.common.activation
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
                let mut uploader = Self::default();
                uploader.common.name = name.to_string();
                uploader
            }

            pub fn set_name(&mut self, name: impl Into<String>) -> $crate::errors::ConfigurationResult<()> {
                $crate::freeze::Freezable::ensure_mutable(self)?;
                self.common.name = name.into();
                Ok(())
            }

            pub fn set_artifacts(&mut self, enabled: bool) -> $crate::errors::ConfigurationResult<()> {
                $crate::freeze::Freezable::ensure_mutable(self)?;
                self.common.artifacts = Some(enabled);
                Ok(())
            }

            pub fn set_files(&mut self, enabled: bool) -> $crate::errors::ConfigurationResult<()> {
                $crate::freeze::Freezable::ensure_mutable(self)?;
                self.common.files = Some(enabled);
                Ok(())
            }

            pub fn set_signatures(&mut self, enabled: bool) -> $crate::errors::ConfigurationResult<()> {
                $crate::freeze::Freezable::ensure_mutable(self)?;
                self.common.signatures = Some(enabled);
                Ok(())
            }

            pub fn set_checksums(&mut self, enabled: bool) -> $crate::errors::ConfigurationResult<()> {
                $crate::freeze::Freezable::ensure_mutable(self)?;
                self.common.checksums = Some(enabled);
                Ok(())
            }
        }
    };
}

pub(crate) use uploader;

/// All uploaders of a project, keyed by type and then by name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Upload {
    #[serde(skip)]
    state: FreezeState,
    #[serde(flatten)]
    activation: Activation,
    ftp: IndexMap<String, FtpUploader>,
    http: IndexMap<String, HttpUploader>,
    gitlab: IndexMap<String, GitlabUploader>,
    gitea: IndexMap<String, GiteaUploader>,
}

impl Upload {
    pub fn ftp(&self) -> &IndexMap<String, FtpUploader> {
        &self.ftp
    }

    pub fn http(&self) -> &IndexMap<String, HttpUploader> {
        &self.http
    }

    pub fn gitlab(&self) -> &IndexMap<String, GitlabUploader> {
        &self.gitlab
    }

    pub fn gitea(&self) -> &IndexMap<String, GiteaUploader> {
        &self.gitea
    }

    pub fn add_ftp(&mut self, uploader: FtpUploader) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.ftp.insert(uploader.name().to_string(), uploader);
        Ok(())
    }

    pub fn add_http(&mut self, uploader: HttpUploader) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.http.insert(uploader.name().to_string(), uploader);
        Ok(())
    }

    pub fn add_gitlab(&mut self, uploader: GitlabUploader) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.gitlab.insert(uploader.name().to_string(), uploader);
        Ok(())
    }

    pub fn add_gitea(&mut self, uploader: GiteaUploader) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.gitea.insert(uploader.name().to_string(), uploader);
        Ok(())
    }

    /// Every uploader, grouped by type in declaration order.
    pub fn uploaders(&self) -> Vec<&dyn Uploader> {
        let mut uploaders: Vec<&dyn Uploader> = Vec::new();
        uploaders.extend(self.ftp.values().map(|u| u as &dyn Uploader));
        uploaders.extend(self.http.values().map(|u| u as &dyn Uploader));
        uploaders.extend(self.gitlab.values().map(|u| u as &dyn Uploader));
        uploaders.extend(self.gitea.values().map(|u| u as &dyn Uploader));
        uploaders
    }

    /// Looks an uploader up by type and name.
    pub fn find(&self, upload_type: &str, name: &str) -> Option<&dyn Uploader> {
        match upload_type {
            "ftp" => self.ftp.get(name).map(|u| u as &dyn Uploader),
            "http" => self.http.get(name).map(|u| u as &dyn Uploader),
            "gitlab" => self.gitlab.get(name).map(|u| u as &dyn Uploader),
            "gitea" => self.gitea.get(name).map(|u| u as &dyn Uploader),
            _ => None,
        }
    }

    pub(crate) fn normalize_names(&mut self) -> ConfigurationResult<()> {
        fill_names(&mut self.ftp, |u, n| u.set_name(n))?;
        fill_names(&mut self.http, |u, n| u.set_name(n))?;
        fill_names(&mut self.gitlab, |u, n| u.set_name(n))?;
        fill_names(&mut self.gitea, |u, n| u.set_name(n))
    }

    /// Resolves the container and every uploader. A disabled container
    /// disables all uploaders.
    pub fn resolve_enabled_all(&mut self, project: &Project) -> ConfigurationResult<bool> {
        let enabled = self.resolve_enabled(project)?;
        let mut children: Vec<&mut dyn Activatable> = Vec::new();
        children.extend(self.ftp.values_mut().map(|u| u as &mut dyn Activatable));
        children.extend(self.http.values_mut().map(|u| u as &mut dyn Activatable));
        children.extend(self.gitlab.values_mut().map(|u| u as &mut dyn Activatable));
        children.extend(self.gitea.values_mut().map(|u| u as &mut dyn Activatable));
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

fn fill_names<T, F>(entries: &mut IndexMap<String, T>, mut set_name: F) -> ConfigurationResult<()>
where
    T: Uploader,
    F: FnMut(&mut T, String) -> ConfigurationResult<()>,
{
    for (name, entry) in entries.iter_mut() {
        if entry.name().is_empty() {
            set_name(entry, name.clone())?;
        }
    }
    Ok(())
}

impl Freezable for Upload {
    fn kind(&self) -> &'static str {
        "upload"
    }

    fn freeze_state(&self) -> &FreezeState {
        &self.state
    }

    fn freeze_state_mut(&mut self) -> &mut FreezeState {
        &mut self.state
    }

    fn visit_children(&mut self, visitor: &mut dyn FnMut(&mut dyn Freezable)) {
        for uploader in self.ftp.values_mut() {
            visitor(uploader);
        }
        for uploader in self.http.values_mut() {
            visitor(uploader);
        }
        for uploader in self.gitlab.values_mut() {
            visitor(uploader);
        }
        for uploader in self.gitea.values_mut() {
            visitor(uploader);
        }
    }
}

impl Activatable for Upload {
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

impl Merge for Upload {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.activation.merge(&incoming.activation);
        merge_model(&mut self.ftp, &incoming.ftp)?;
        merge_model(&mut self.http, &incoming.http)?;
        merge_model(&mut self.gitlab, &incoming.gitlab)?;
        merge_model(&mut self.gitea, &incoming.gitea)
    }
}

impl SecretAware for Upload {
    fn resolve_secrets(&mut self, resolver: &dyn SecretResolver) -> ConfigurationResult<()> {
        for uploader in self.ftp.values_mut() {
            uploader.resolve_secrets(resolver)?;
        }
        for uploader in self.http.values_mut() {
            uploader.resolve_secrets(resolver)?;
        }
        for uploader in self.gitlab.values_mut() {
            uploader.resolve_secrets(resolver)?;
        }
        for uploader in self.gitea.values_mut() {
            uploader.resolve_secrets(resolver)?;
        }
        Ok(())
    }

    fn secret_variables(&self) -> Vec<String> {
        let mut variables = Vec::new();
        variables.extend(self.ftp.values().flat_map(|u| u.secret_variables()));
        variables.extend(self.http.values().flat_map(|u| u.secret_variables()));
        variables.extend(self.gitlab.values().flat_map(|u| u.secret_variables()));
        variables.extend(self.gitea.values().flat_map(|u| u.secret_variables()));
        variables
    }
}

impl AsMap for Upload {
    fn as_map(&self, full: bool) -> ConfigMap {
        if !full && !self.is_enabled() {
            return ConfigMap::new();
        }
        MapWriter::new()
            .put("enabled", self.is_enabled())
            .put("active", self.active())
            .put_named("ftp", &self.ftp, full)
            .put_named("http", &self.http, full)
            .put_named("gitlab", &self.gitlab, full)
            .put_named("gitea", &self.gitea, full)
            .build()
    }
}
