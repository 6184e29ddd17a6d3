//! Distributions: named sets of artifacts that packagers publish.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::active::{Activatable, Active, Activation};
use crate::artifact::{merge_artifacts, Artifact};
use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, FreezeState, Freezable};
use crate::merge::{merge_properties, merge_text, merge_value, Merge};
use crate::packagers::Packagers;
use crate::project::Project;
use crate::properties::{ExtraProperties, Properties};
use crate::secrets::{SecretAware, SecretResolver};

#[cfg(test)]
#[path = "distribution_tests.rs"]
mod tests;

/// How a distribution is laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum DistributionType {
    Binary,
    JavaBinary,
    Jlink,
    NativeImage,
    NativePackage,
    SingleJar,
}

impl DistributionType {
    pub const ALL: [DistributionType; 6] = [
        DistributionType::Binary,
        DistributionType::JavaBinary,
        DistributionType::Jlink,
        DistributionType::NativeImage,
        DistributionType::NativePackage,
        DistributionType::SingleJar,
    ];

    /// Parses a type name. Case is ignored and `-` is accepted for `_`.
    pub fn parse(value: &str) -> ConfigurationResult<Self> {
        let normalized = value.trim().to_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ConfigurationError::InvalidValue {
                field: "distribution_type".to_string(),
                value: value.to_string(),
                reason: "unknown distribution type".to_string(),
            })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionType::Binary => "BINARY",
            DistributionType::JavaBinary => "JAVA_BINARY",
            DistributionType::Jlink => "JLINK",
            DistributionType::NativeImage => "NATIVE_IMAGE",
            DistributionType::NativePackage => "NATIVE_PACKAGE",
            DistributionType::SingleJar => "SINGLE_JAR",
        }
    }
}

impl fmt::Display for DistributionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DistributionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl TryFrom<String> for DistributionType {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Distribution {
    #[serde(skip)]
    state: FreezeState,
    #[serde(flatten)]
    activation: Activation,
    name: String,
    #[serde(rename = "type")]
    distribution_type: Option<DistributionType>,
    executable: Option<String>,
    artifacts: Vec<Artifact>,
    packagers: Packagers,
    extra_properties: Properties,
}

impl Distribution {
    pub fn new(name: &str, distribution_type: DistributionType) -> Self {
        Self {
            name: name.to_string(),
            distribution_type: Some(distribution_type),
            ..Self::default()
        }
    }

    setters! {
        set_distribution_type => distribution_type: DistributionType,
        set_executable => executable: String,
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.name = name.into();
        Ok(())
    }

    pub fn distribution_type(&self) -> Option<DistributionType> {
        self.distribution_type
    }

    /// Executable name, defaulting to the distribution name.
    pub fn executable(&self) -> &str {
        self.executable
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or(&self.name)
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn add_artifact(&mut self, artifact: Artifact) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.artifacts.push(artifact);
        Ok(())
    }

    pub fn packagers(&self) -> &Packagers {
        &self.packagers
    }

    pub fn packagers_mut(&mut self) -> ConfigurationResult<&mut Packagers> {
        self.ensure_mutable()?;
        Ok(&mut self.packagers)
    }

    /// Template properties describing this distribution.
    pub fn props(&self) -> Properties {
        let mut props = Properties::new();
        props.insert("distributionName".into(), Value::String(self.name.clone()));
        props.insert(
            "distributionExecutable".into(),
            Value::String(self.executable().to_string()),
        );
        if let Some(kind) = self.distribution_type {
            props.insert("distributionType".into(), Value::String(kind.to_string()));
        }
        props.extend(self.resolved_extra_properties());
        props
    }

    /// Layers this distribution's packager settings over `defaults` and
    /// resolves each packager against the result.
    pub(crate) fn resolve_packagers(
        &mut self,
        defaults: &Packagers,
        project: &Project,
    ) -> ConfigurationResult<()> {
        let mut effective = defaults.clone();
        effective.merge(&self.packagers)?;
        let enabled = self.is_enabled();
        effective.resolve_enabled_for(project, self, enabled)?;
        self.packagers = effective;
        Ok(())
    }
}

impl Freezable for Distribution {
    fn kind(&self) -> &'static str {
        "distribution"
    }

    fn freeze_state(&self) -> &FreezeState {
        &self.state
    }

    fn freeze_state_mut(&mut self) -> &mut FreezeState {
        &mut self.state
    }

    fn visit_children(&mut self, visitor: &mut dyn FnMut(&mut dyn Freezable)) {
        for artifact in &mut self.artifacts {
            visitor(artifact);
        }
        visitor(&mut self.packagers);
    }
}

impl Activatable for Distribution {
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

impl ExtraProperties for Distribution {
    fn prefix(&self) -> &str {
        "distribution"
    }

    fn extra_properties(&self) -> &Properties {
        &self.extra_properties
    }

    fn extra_properties_slot(&mut self) -> &mut Properties {
        &mut self.extra_properties
    }
}

impl Merge for Distribution {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.activation.merge(&incoming.activation);
        if !incoming.name.trim().is_empty() {
            self.name = incoming.name.clone();
        }
        merge_value(&mut self.distribution_type, &incoming.distribution_type);
        merge_text(&mut self.executable, &incoming.executable);
        merge_artifacts(&mut self.artifacts, &incoming.artifacts)?;
        self.packagers.merge(&incoming.packagers)?;
        merge_properties(&mut self.extra_properties, &incoming.extra_properties);
        Ok(())
    }
}

impl SecretAware for Distribution {
    fn resolve_secrets(&mut self, resolver: &dyn SecretResolver) -> ConfigurationResult<()> {
        self.packagers.resolve_secrets(resolver)
    }

    fn secret_variables(&self) -> Vec<String> {
        self.packagers.secret_variables()
    }
}

impl AsMap for Distribution {
    fn as_map(&self, full: bool) -> ConfigMap {
        if !full && !self.is_enabled() {
            return ConfigMap::new();
        }
        MapWriter::new()
            .put("enabled", self.is_enabled())
            .put("active", self.active())
            .put("name", &self.name)
            .put("type", self.distribution_type)
            .put("executable", self.executable())
            .put_children("artifacts", "artifact", &self.artifacts, full)
            .put_child("packagers", self.packagers.as_map(full))
            .put("extra_properties", &self.extra_properties)
            .build()
    }
}
