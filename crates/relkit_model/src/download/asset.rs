//! Remote files fetched by a downloader.

use serde::Deserialize;

use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, FreezeState, Freezable};
use crate::merge::{merge_text, merge_value, non_blank, Merge};

/// Archive extraction settings for a downloaded asset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Unpack {
    #[serde(skip)]
    state: FreezeState,
    enabled: Option<bool>,
    skip_root_entry: Option<bool>,
}

impl Unpack {
    setters! {
        set_enabled => enabled: bool,
        set_skip_root_entry => skip_root_entry: bool,
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }

    pub fn is_skip_root_entry(&self) -> bool {
        self.skip_root_entry.unwrap_or(false)
    }
}

impl Freezable for Unpack {
    fn kind(&self) -> &'static str {
        "unpack"
    }

    fn freeze_state(&self) -> &FreezeState {
        &self.state
    }

    fn freeze_state_mut(&mut self) -> &mut FreezeState {
        &mut self.state
    }
}

impl Merge for Unpack {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        merge_value(&mut self.enabled, &incoming.enabled);
        merge_value(&mut self.skip_root_entry, &incoming.skip_root_entry);
        Ok(())
    }
}

impl AsMap for Unpack {
    fn as_map(&self, _full: bool) -> ConfigMap {
        MapWriter::new()
            .put("enabled", self.is_enabled())
            .put("skip_root_entry", self.is_skip_root_entry())
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Asset {
    #[serde(skip)]
    state: FreezeState,
    input: Option<String>,
    output: Option<String>,
    unpack: Unpack,
}

impl Asset {
    pub fn new(input: &str) -> Self {
        Self {
            input: Some(input.to_string()),
            ..Self::default()
        }
    }

    setters! {
        set_input => input: String,
        set_output => output: String,
    }

    /// Source location template.
    pub fn input(&self) -> &str {
        non_blank(&self.input).unwrap_or_default()
    }

    /// Target file name template, if any.
    pub fn output(&self) -> Option<&str> {
        non_blank(&self.output)
    }

    pub fn unpack(&self) -> &Unpack {
        &self.unpack
    }

    pub fn unpack_mut(&mut self) -> ConfigurationResult<&mut Unpack> {
        self.ensure_mutable()?;
        Ok(&mut self.unpack)
    }
}

/// Merges asset lists keyed by input. Same-input entries merge, new inputs
/// are appended.
pub fn merge_assets(existing: &mut Vec<Asset>, incoming: &[Asset]) -> ConfigurationResult<()> {
    for asset in incoming {
        match existing.iter_mut().find(|a| a.input() == asset.input()) {
            Some(current) => current.merge(asset)?,
            None => existing.push(asset.clone()),
        }
    }
    Ok(())
}

impl Freezable for Asset {
    fn kind(&self) -> &'static str {
        "asset"
    }

    fn freeze_state(&self) -> &FreezeState {
        &self.state
    }

    fn freeze_state_mut(&mut self) -> &mut FreezeState {
        &mut self.state
    }

    fn visit_children(&mut self, visitor: &mut dyn FnMut(&mut dyn Freezable)) {
        visitor(&mut self.unpack);
    }
}

impl Merge for Asset {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        merge_text(&mut self.input, &incoming.input);
        merge_text(&mut self.output, &incoming.output);
        self.unpack.merge(&incoming.unpack)
    }
}

impl AsMap for Asset {
    fn as_map(&self, full: bool) -> ConfigMap {
        MapWriter::new()
            .put("input", &self.input)
            .put("output", &self.output)
            .put_child("unpack", self.unpack.as_map(full))
            .build()
    }
}
