//! Project metadata and release state.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, FreezeState, Freezable};
use crate::merge::{merge_list, merge_properties, merge_text, Merge};
use crate::properties::{capitalize, ExtraProperties, Properties};

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;

pub const DEFAULT_SNAPSHOT_PATTERN: &str = ".*-SNAPSHOT";
pub const DEFAULT_SNAPSHOT_LABEL: &str = "early-access";

/// How snapshot versions are recognized.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    #[serde(skip)]
    state: FreezeState,
    pattern: Option<String>,
    label: Option<String>,
    #[serde(skip)]
    compiled: CompiledPattern,
}

/// Lazily compiled snapshot regex. `None` marks an invalid pattern.
///
/// Copies start uncompiled and the cache never takes part in equality.
#[derive(Debug, Default)]
struct CompiledPattern(OnceLock<Option<Regex>>);

impl Clone for CompiledPattern {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl PartialEq for CompiledPattern {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Snapshot {
    setters! {
        set_label => label: String,
    }

    pub fn set_pattern(&mut self, pattern: impl Into<String>) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.pattern = Some(pattern.into());
        self.compiled = CompiledPattern::default();
        Ok(())
    }

    /// Regular expression a version must fully match to be a snapshot.
    pub fn pattern(&self) -> &str {
        self.pattern.as_deref().unwrap_or(DEFAULT_SNAPSHOT_PATTERN)
    }

    /// Label used in place of the version for snapshot releases.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(DEFAULT_SNAPSHOT_LABEL)
    }

    /// Whether `version` is a snapshot. An invalid pattern falls back to the
    /// `-SNAPSHOT` suffix. The pattern is compiled once.
    pub fn matches(&self, version: &str) -> bool {
        match self.regex() {
            Some(regex) => regex.is_match(version),
            None => version.ends_with("-SNAPSHOT"),
        }
    }

    fn regex(&self) -> Option<&Regex> {
        self.compiled
            .0
            .get_or_init(|| match Regex::new(&format!("^(?:{})$", self.pattern())) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    warn!("Invalid snapshot pattern '{}': {}", self.pattern(), e);
                    None
                }
            })
            .as_ref()
    }
}

impl Freezable for Snapshot {
    fn kind(&self) -> &'static str {
        "snapshot"
    }

    fn freeze_state(&self) -> &FreezeState {
        &self.state
    }

    fn freeze_state_mut(&mut self) -> &mut FreezeState {
        &mut self.state
    }
}

impl Merge for Snapshot {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        merge_text(&mut self.pattern, &incoming.pattern);
        merge_text(&mut self.label, &incoming.label);
        self.compiled = CompiledPattern::default();
        Ok(())
    }
}

impl AsMap for Snapshot {
    fn as_map(&self, _full: bool) -> ConfigMap {
        MapWriter::new()
            .put("pattern", self.pattern())
            .put("label", self.label())
            .build()
    }
}

/// The project being released.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Project {
    #[serde(skip)]
    state: FreezeState,
    name: Option<String>,
    version: Option<String>,
    description: Option<String>,
    website: Option<String>,
    license: Option<String>,
    vendor: Option<String>,
    copyright: Option<String>,
    authors: Vec<String>,
    tags: Vec<String>,
    snapshot: Snapshot,
    extra_properties: Properties,
}

impl Project {
    setters! {
        set_name => name: String,
        set_version => version: String,
        set_description => description: String,
        set_website => website: String,
        set_license => license: String,
        set_vendor => vendor: String,
        set_copyright => copyright: String,
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    pub fn authors_mut(&mut self) -> ConfigurationResult<&mut Vec<String>> {
        self.ensure_mutable()?;
        Ok(&mut self.authors)
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> ConfigurationResult<&mut Vec<String>> {
        self.ensure_mutable()?;
        Ok(&mut self.tags)
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn snapshot_mut(&mut self) -> ConfigurationResult<&mut Snapshot> {
        self.ensure_mutable()?;
        Ok(&mut self.snapshot)
    }

    pub fn is_snapshot(&self) -> bool {
        self.version
            .as_deref()
            .map_or(false, |version| self.snapshot.matches(version))
    }

    pub fn is_release(&self) -> bool {
        !self.is_snapshot()
    }

    /// The version for releases, the snapshot label for snapshots.
    pub fn effective_version(&self) -> String {
        if self.is_snapshot() {
            self.snapshot.label().to_string()
        } else {
            self.version.clone().unwrap_or_default()
        }
    }

    /// Template properties describing the project.
    pub fn props(&self) -> Properties {
        let mut props = Properties::new();
        let name = self.name.clone().unwrap_or_default();
        let version = self.version.clone().unwrap_or_default();

        props.insert("projectName".into(), Value::String(name.clone()));
        props.insert("projectNameCapitalized".into(), Value::String(capitalize(&name)));
        props.insert("projectVersion".into(), Value::String(version.clone()));
        props.insert("projectEffectiveVersion".into(), Value::String(self.effective_version()));
        props.insert("projectSnapshot".into(), Value::String(self.is_snapshot().to_string()));
        for (key, value) in [
            ("projectDescription", &self.description),
            ("projectWebsite", &self.website),
            ("projectLicense", &self.license),
            ("projectVendor", &self.vendor),
            ("projectCopyright", &self.copyright),
        ] {
            if let Some(value) = value {
                props.insert(key.into(), Value::String(value.clone()));
            }
        }
        props.insert("projectAuthorsBySpace".into(), Value::String(self.authors.join(" ")));
        props.insert("projectAuthorsByComma".into(), Value::String(self.authors.join(",")));

        if let Ok(parsed) = semver::Version::parse(&version) {
            props.insert("projectVersionMajor".into(), Value::String(parsed.major.to_string()));
            props.insert("projectVersionMinor".into(), Value::String(parsed.minor.to_string()));
            props.insert("projectVersionPatch".into(), Value::String(parsed.patch.to_string()));
            if !parsed.pre.is_empty() {
                props.insert("projectVersionTag".into(), Value::String(parsed.pre.to_string()));
            }
            if !parsed.build.is_empty() {
                props.insert("projectVersionBuild".into(), Value::String(parsed.build.to_string()));
            }
        }

        props.extend(self.resolved_extra_properties());
        props
    }
}

impl Freezable for Project {
    fn kind(&self) -> &'static str {
        "project"
    }

    fn freeze_state(&self) -> &FreezeState {
        &self.state
    }

    fn freeze_state_mut(&mut self) -> &mut FreezeState {
        &mut self.state
    }

    fn visit_children(&mut self, visitor: &mut dyn FnMut(&mut dyn Freezable)) {
        visitor(&mut self.snapshot);
    }
}

impl ExtraProperties for Project {
    fn prefix(&self) -> &str {
        "project"
    }

    fn extra_properties(&self) -> &Properties {
        &self.extra_properties
    }

    fn extra_properties_slot(&mut self) -> &mut Properties {
        &mut self.extra_properties
    }
}

impl Merge for Project {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        merge_text(&mut self.name, &incoming.name);
        merge_text(&mut self.version, &incoming.version);
        merge_text(&mut self.description, &incoming.description);
        merge_text(&mut self.website, &incoming.website);
        merge_text(&mut self.license, &incoming.license);
        merge_text(&mut self.vendor, &incoming.vendor);
        merge_text(&mut self.copyright, &incoming.copyright);
        merge_list(&mut self.authors, &incoming.authors);
        merge_list(&mut self.tags, &incoming.tags);
        self.snapshot.merge(&incoming.snapshot)?;
        merge_properties(&mut self.extra_properties, &incoming.extra_properties);
        Ok(())
    }
}

impl AsMap for Project {
    fn as_map(&self, full: bool) -> ConfigMap {
        MapWriter::new()
            .put("name", &self.name)
            .put("version", &self.version)
            .put("snapshot", self.is_snapshot())
            .put("description", &self.description)
            .put("website", &self.website)
            .put("license", &self.license)
            .put("vendor", &self.vendor)
            .put("copyright", &self.copyright)
            .put("authors", &self.authors)
            .put("tags", &self.tags)
            .put_child("snapshot_settings", self.snapshot.as_map(full))
            .put("extra_properties", &self.extra_properties)
            .build()
    }
}
