//! Files produced or consumed by a release.

use serde::Deserialize;
use serde_json::Value;

use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, FreezeState, Freezable};
use crate::merge::{merge_properties, merge_text, Merge};
use crate::properties::{ExtraProperties, Properties};

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;

/// Multi-part extensions recognized before falling back to the last dot.
pub const COMPOUND_EXTENSIONS: [&str; 5] = [".tar.gz", ".tar.bz2", ".tar.xz", ".tar.zst", ".tar.Z"];

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Artifact {
    #[serde(skip)]
    state: FreezeState,
    path: Option<String>,
    platform: Option<String>,
    extra_properties: Properties,
}

impl Artifact {
    pub fn new(path: &str) -> Self {
        Self {
            path: Some(path.to_string()),
            ..Self::default()
        }
    }

    setters! {
        set_path => path: String,
        set_platform => platform: String,
    }

    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or_default()
    }

    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref().filter(|p| !p.trim().is_empty())
    }

    /// Last path segment.
    pub fn file_name(&self) -> &str {
        let path = self.path();
        path.rsplit(['/', '\\']).next().unwrap_or(path)
    }

    /// Extension including the leading dot, e.g. `.tar.gz`. Empty if none.
    pub fn extension(&self) -> &str {
        let file_name = self.file_name();
        if let Some(ext) = COMPOUND_EXTENSIONS.iter().find(|ext| file_name.ends_with(*ext)) {
            return &file_name[file_name.len() - ext.len()..];
        }
        match file_name.rfind('.') {
            Some(index) if index > 0 => &file_name[index..],
            _ => "",
        }
    }

    /// File name without its extension.
    pub fn name(&self) -> &str {
        let file_name = self.file_name();
        &file_name[..file_name.len() - self.extension().len()]
    }

    /// True for artifacts built for Windows or for no platform in particular.
    pub fn is_windows_compatible(&self) -> bool {
        self.platform().map_or(true, |platform| platform.contains("windows"))
    }

    /// Template properties describing this artifact.
    pub fn props(&self) -> Properties {
        let mut props = Properties::new();
        props.insert("artifactPath".into(), Value::String(self.path().to_string()));
        props.insert("artifactFileName".into(), Value::String(self.file_name().to_string()));
        props.insert("artifactName".into(), Value::String(self.name().to_string()));
        props.insert("artifactExtension".into(), Value::String(self.extension().to_string()));
        if let Some(platform) = self.platform() {
            props.insert("artifactPlatform".into(), Value::String(platform.to_string()));
        }
        props.extend(self.resolved_extra_properties());
        props
    }
}

/// Merges artifact lists keyed by path. Same-path entries merge, new paths
/// are appended.
pub fn merge_artifacts(existing: &mut Vec<Artifact>, incoming: &[Artifact]) -> ConfigurationResult<()> {
    for artifact in incoming {
        match existing.iter_mut().find(|a| a.path() == artifact.path()) {
            Some(current) => current.merge(artifact)?,
            None => existing.push(artifact.clone()),
        }
    }
    Ok(())
}

impl Freezable for Artifact {
    fn kind(&self) -> &'static str {
        "artifact"
    }

    fn freeze_state(&self) -> &FreezeState {
        &self.state
    }

    fn freeze_state_mut(&mut self) -> &mut FreezeState {
        &mut self.state
    }
}

impl ExtraProperties for Artifact {
    fn prefix(&self) -> &str {
        "artifact"
    }

    fn extra_properties(&self) -> &Properties {
        &self.extra_properties
    }

    fn extra_properties_slot(&mut self) -> &mut Properties {
        &mut self.extra_properties
    }
}

impl Merge for Artifact {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        merge_text(&mut self.path, &incoming.path);
        merge_text(&mut self.platform, &incoming.platform);
        merge_properties(&mut self.extra_properties, &incoming.extra_properties);
        Ok(())
    }
}

impl AsMap for Artifact {
    fn as_map(&self, _full: bool) -> ConfigMap {
        MapWriter::new()
            .put("path", self.path())
            .put("platform", self.platform())
            .put("extra_properties", &self.extra_properties)
            .build()
    }
}
