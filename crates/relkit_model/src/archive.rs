//! Archive assemblers package files into distributable archives.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::active::{Activatable, Active, Activation};
use crate::context::ReleaseContext;
use crate::distribution::DistributionType;
use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, FreezeState, Freezable};
use crate::merge::{merge_model, merge_properties, merge_set, merge_text, merge_value, non_blank, Merge};
use crate::project::Project;
use crate::properties::{ExtraProperties, Properties};

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;

pub const DEFAULT_ARCHIVE_NAME: &str = "{{distributionName}}-{{projectVersion}}";

/// Archive container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Format {
    Zip,
    Tar,
    TarGz,
    TarXz,
    TarBz2,
    TarZst,
    Tgz,
    Txz,
    Tbz2,
}

impl Format {
    pub const ALL: [Format; 9] = [
        Format::Zip,
        Format::Tar,
        Format::TarGz,
        Format::TarXz,
        Format::TarBz2,
        Format::TarZst,
        Format::Tgz,
        Format::Txz,
        Format::Tbz2,
    ];

    /// Parses a format name.
    ///
    /// Accepts the enumeration name (`TAR_GZ`) as well as the file
    /// extension style (`tar.gz`), ignoring case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use relkit_model::archive::Format;
    ///
    /// assert_eq!(Format::parse("tar.gz").unwrap(), Format::TarGz);
    /// assert_eq!(Format::parse("ZIP").unwrap(), Format::Zip);
    /// assert!(Format::parse("rar").is_err());
    /// ```
    pub fn parse(value: &str) -> ConfigurationResult<Self> {
        let normalized = value
            .trim()
            .trim_start_matches('.')
            .to_uppercase()
            .replace(['.', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == normalized)
            .ok_or_else(|| ConfigurationError::InvalidValue {
                field: "format".to_string(),
                value: value.to_string(),
                reason: "unsupported archive format".to_string(),
            })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Zip => "ZIP",
            Format::Tar => "TAR",
            Format::TarGz => "TAR_GZ",
            Format::TarXz => "TAR_XZ",
            Format::TarBz2 => "TAR_BZ2",
            Format::TarZst => "TAR_ZST",
            Format::Tgz => "TGZ",
            Format::Txz => "TXZ",
            Format::Tbz2 => "TBZ2",
        }
    }

    /// File extension including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Zip => ".zip",
            Format::Tar => ".tar",
            Format::TarGz => ".tar.gz",
            Format::TarXz => ".tar.xz",
            Format::TarBz2 => ".tar.bz2",
            Format::TarZst => ".tar.zst",
            Format::Tgz => ".tgz",
            Format::Txz => ".txz",
            Format::Tbz2 => ".tbz2",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Format {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl TryFrom<String> for Format {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Files copied from `input` into the archive under `output`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileSet {
    #[serde(skip)]
    state: FreezeState,
    input: Option<String>,
    output: Option<String>,
    includes: IndexSet<String>,
    excludes: IndexSet<String>,
    fail_on_missing_input: Option<bool>,
}

impl FileSet {
    pub fn new(input: &str) -> Self {
        Self {
            input: Some(input.to_string()),
            ..Self::default()
        }
    }

    setters! {
        set_input => input: String,
        set_output => output: String,
        set_fail_on_missing_input => fail_on_missing_input: bool,
    }

    pub fn input(&self) -> &str {
        non_blank(&self.input).unwrap_or_default()
    }

    pub fn output(&self) -> Option<&str> {
        non_blank(&self.output)
    }

    pub fn includes(&self) -> &IndexSet<String> {
        &self.includes
    }

    pub fn includes_mut(&mut self) -> ConfigurationResult<&mut IndexSet<String>> {
        self.ensure_mutable()?;
        Ok(&mut self.includes)
    }

    pub fn excludes(&self) -> &IndexSet<String> {
        &self.excludes
    }

    pub fn excludes_mut(&mut self) -> ConfigurationResult<&mut IndexSet<String>> {
        self.ensure_mutable()?;
        Ok(&mut self.excludes)
    }

    pub fn is_fail_on_missing_input(&self) -> bool {
        self.fail_on_missing_input.unwrap_or(true)
    }
}

fn merge_file_sets(existing: &mut Vec<FileSet>, incoming: &[FileSet]) -> ConfigurationResult<()> {
    for file_set in incoming {
        match existing.iter_mut().find(|f| f.input() == file_set.input()) {
            Some(current) => current.merge(file_set)?,
            None => existing.push(file_set.clone()),
        }
    }
    Ok(())
}

impl Freezable for FileSet {
    fn kind(&self) -> &'static str {
        "file set"
    }

    fn freeze_state(&self) -> &FreezeState {
        &self.state
    }

    fn freeze_state_mut(&mut self) -> &mut FreezeState {
        &mut self.state
    }
}

impl Merge for FileSet {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        merge_text(&mut self.input, &incoming.input);
        merge_text(&mut self.output, &incoming.output);
        merge_set(&mut self.includes, &incoming.includes);
        merge_set(&mut self.excludes, &incoming.excludes);
        merge_value(&mut self.fail_on_missing_input, &incoming.fail_on_missing_input);
        Ok(())
    }
}

impl AsMap for FileSet {
    fn as_map(&self, _full: bool) -> ConfigMap {
        MapWriter::new()
            .put("input", &self.input)
            .put("output", &self.output)
            .put("includes", &self.includes)
            .put("excludes", &self.excludes)
            .put("fail_on_missing_input", self.is_fail_on_missing_input())
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArchiveAssembler {
    #[serde(skip)]
    state: FreezeState,
    #[serde(flatten)]
    activation: Activation,
    name: String,
    archive_name: Option<String>,
    distribution_type: Option<DistributionType>,
    attach_platform: Option<bool>,
    formats: IndexSet<Format>,
    file_sets: Vec<FileSet>,
    extra_properties: Properties,
}

impl ArchiveAssembler {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    setters! {
        set_archive_name => archive_name: String,
        set_distribution_type => distribution_type: DistributionType,
        set_attach_platform => attach_platform: bool,
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.name = name.into();
        Ok(())
    }

    /// Archive name template.
    pub fn archive_name(&self) -> &str {
        non_blank(&self.archive_name).unwrap_or(DEFAULT_ARCHIVE_NAME)
    }

    pub fn distribution_type(&self) -> DistributionType {
        self.distribution_type.unwrap_or(DistributionType::Binary)
    }

    pub fn is_attach_platform(&self) -> bool {
        self.attach_platform.unwrap_or(false)
    }

    pub fn formats(&self) -> &IndexSet<Format> {
        &self.formats
    }

    pub fn add_format(&mut self, format: Format) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.formats.insert(format);
        Ok(())
    }

    pub fn file_sets(&self) -> &[FileSet] {
        &self.file_sets
    }

    pub fn add_file_set(&mut self, file_set: FileSet) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.file_sets.push(file_set);
        Ok(())
    }

    /// The expanded archive name, without extension.
    ///
    /// With `attach_platform` set and a `platform` given, `-<platform>` is
    /// appended.
    pub fn resolved_archive_name(
        &self,
        context: &ReleaseContext,
        platform: Option<&str>,
    ) -> ConfigurationResult<String> {
        let mut props = context.props()?;
        props.insert("distributionName".into(), Value::String(self.name.clone()));
        props.extend(self.resolved_extra_properties());
        let name = context.render(self.archive_name(), &props)?;
        match platform.filter(|_| self.is_attach_platform()) {
            Some(platform) => Ok(format!("{name}-{platform}")),
            None => Ok(name),
        }
    }

    /// File names produced, one per format.
    pub fn resolved_file_names(
        &self,
        context: &ReleaseContext,
        platform: Option<&str>,
    ) -> ConfigurationResult<Vec<String>> {
        let name = self.resolved_archive_name(context, platform)?;
        Ok(self
            .formats
            .iter()
            .map(|format| format!("{name}{}", format.extension()))
            .collect())
    }
}

impl Freezable for ArchiveAssembler {
    fn kind(&self) -> &'static str {
        "archive"
    }

    fn freeze_state(&self) -> &FreezeState {
        &self.state
    }

    fn freeze_state_mut(&mut self) -> &mut FreezeState {
        &mut self.state
    }

    fn visit_children(&mut self, visitor: &mut dyn FnMut(&mut dyn Freezable)) {
        for file_set in &mut self.file_sets {
            visitor(file_set);
        }
    }
}

impl Activatable for ArchiveAssembler {
    fn activation(&self) -> &Activation {
        &self.activation
    }

    fn activation_mut(&mut self) -> &mut Activation {
        &mut self.activation
    }
}

impl ExtraProperties for ArchiveAssembler {
    fn prefix(&self) -> &str {
        "archive"
    }

    fn extra_properties(&self) -> &Properties {
        &self.extra_properties
    }

    fn extra_properties_slot(&mut self) -> &mut Properties {
        &mut self.extra_properties
    }
}

impl Merge for ArchiveAssembler {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.activation.merge(&incoming.activation);
        if !incoming.name.trim().is_empty() {
            self.name = incoming.name.clone();
        }
        merge_text(&mut self.archive_name, &incoming.archive_name);
        merge_value(&mut self.distribution_type, &incoming.distribution_type);
        merge_value(&mut self.attach_platform, &incoming.attach_platform);
        merge_set(&mut self.formats, &incoming.formats);
        merge_file_sets(&mut self.file_sets, &incoming.file_sets)?;
        merge_properties(&mut self.extra_properties, &incoming.extra_properties);
        Ok(())
    }
}

impl AsMap for ArchiveAssembler {
    fn as_map(&self, full: bool) -> ConfigMap {
        if !full && !self.is_enabled() {
            return ConfigMap::new();
        }
        MapWriter::new()
            .put("enabled", self.is_enabled())
            .put("active", self.active())
            .put("name", &self.name)
            .put("archive_name", self.archive_name())
            .put("distribution_type", self.distribution_type())
            .put("attach_platform", self.is_attach_platform())
            .put("formats", &self.formats)
            .put_children("file_sets", "file set", &self.file_sets, full)
            .put("extra_properties", &self.extra_properties)
            .build()
    }
}

/// All assemblers of a project.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Assemble {
    #[serde(skip)]
    state: FreezeState,
    #[serde(flatten)]
    activation: Activation,
    archive: IndexMap<String, ArchiveAssembler>,
}

impl Assemble {
    pub fn archive(&self) -> &IndexMap<String, ArchiveAssembler> {
        &self.archive
    }

    pub fn add_archive(&mut self, assembler: ArchiveAssembler) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.archive.insert(assembler.name().to_string(), assembler);
        Ok(())
    }

    pub(crate) fn normalize_names(&mut self) -> ConfigurationResult<()> {
        for (name, assembler) in self.archive.iter_mut() {
            if assembler.name().is_empty() {
                assembler.set_name(name.clone())?;
            }
        }
        Ok(())
    }

    pub fn resolve_enabled_all(&mut self, project: &Project) -> ConfigurationResult<bool> {
        let enabled = self.resolve_enabled(project)?;
        for assembler in self.archive.values_mut() {
            if enabled {
                assembler.resolve_enabled(project)?;
            } else {
                assembler.disable()?;
            }
        }
        Ok(enabled)
    }
}

impl Freezable for Assemble {
    fn kind(&self) -> &'static str {
        "assemble"
    }

    fn freeze_state(&self) -> &FreezeState {
        &self.state
    }

    fn freeze_state_mut(&mut self) -> &mut FreezeState {
        &mut self.state
    }

    fn visit_children(&mut self, visitor: &mut dyn FnMut(&mut dyn Freezable)) {
        for assembler in self.archive.values_mut() {
            visitor(assembler);
        }
    }
}

impl Activatable for Assemble {
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

impl Merge for Assemble {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.activation.merge(&incoming.activation);
        merge_model(&mut self.archive, &incoming.archive)
    }
}

impl AsMap for Assemble {
    fn as_map(&self, full: bool) -> ConfigMap {
        if !full && !self.is_enabled() {
            return ConfigMap::new();
        }
        MapWriter::new()
            .put("enabled", self.is_enabled())
            .put("active", self.active())
            .put_named("archive", &self.archive, full)
            .build()
    }
}
