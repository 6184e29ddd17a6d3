//! Milestone closed when a release is published.

use std::sync::OnceLock;

use serde::Deserialize;

use crate::context::ReleaseContext;
use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, FreezeState, Freezable};
use crate::merge::{merge_text, merge_value, non_blank, Merge};
use crate::properties::Properties;

pub const DEFAULT_MILESTONE_NAME: &str = "{{tagName}}";

/// Milestone settings.
///
/// The resolved name is computed on first use and then cached for the life
/// of the instance: later calls return the cached value even if the
/// property bag differs. The cache is never populated from configuration
/// and is not carried over by merge.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Milestone {
    #[serde(skip)]
    state: FreezeState,
    name: Option<String>,
    close: Option<bool>,
    #[serde(skip)]
    resolved_name: OnceLock<String>,
}

impl Milestone {
    setters! {
        set_name => name: String,
        set_close => close: bool,
    }

    /// Name template.
    pub fn name(&self) -> &str {
        non_blank(&self.name).unwrap_or(DEFAULT_MILESTONE_NAME)
    }

    pub fn is_close(&self) -> bool {
        self.close.unwrap_or(true)
    }

    /// The expanded milestone name, cached after the first success.
    pub fn resolved_name(&self, context: &ReleaseContext, props: &Properties) -> ConfigurationResult<String> {
        if let Some(name) = self.resolved_name.get() {
            return Ok(name.clone());
        }
        let name = context.render(self.name(), props)?;
        Ok(self.resolved_name.get_or_init(|| name).clone())
    }

    /// The cached name, if it has been resolved.
    pub fn cached_name(&self) -> Option<&str> {
        self.resolved_name.get().map(String::as_str)
    }
}

impl Freezable for Milestone {
    fn kind(&self) -> &'static str {
        "milestone"
    }

    fn freeze_state(&self) -> &FreezeState {
        &self.state
    }

    fn freeze_state_mut(&mut self) -> &mut FreezeState {
        &mut self.state
    }
}

impl Merge for Milestone {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        merge_text(&mut self.name, &incoming.name);
        merge_value(&mut self.close, &incoming.close);
        Ok(())
    }
}

impl AsMap for Milestone {
    fn as_map(&self, _full: bool) -> ConfigMap {
        MapWriter::new()
            .put("name", self.name())
            .put("close", self.is_close())
            .build()
    }
}
