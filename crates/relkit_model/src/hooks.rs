//! Commands run around each release step.

use indexmap::IndexSet;
use serde::Deserialize;

use crate::active::{Activatable, Active, Activation};
use crate::context::ReleaseContext;
use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, FreezeState, Freezable};
use crate::merge::{merge_set, merge_text, non_blank, Merge};
use crate::project::Project;

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;

/// Step names a hook applies to. An empty include set matches every step.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StepFilter {
    includes: IndexSet<String>,
    excludes: IndexSet<String>,
}

impl StepFilter {
    pub fn includes(&self) -> &IndexSet<String> {
        &self.includes
    }

    pub fn excludes(&self) -> &IndexSet<String> {
        &self.excludes
    }

    pub fn include(&mut self, step: &str) {
        self.includes.insert(step.to_string());
    }

    pub fn exclude(&mut self, step: &str) {
        self.excludes.insert(step.to_string());
    }

    pub fn matches(&self, step: &str) -> bool {
        let included = self.includes.is_empty() || self.includes.contains(step);
        included && !self.excludes.contains(step)
    }

    fn merge(&mut self, incoming: &StepFilter) {
        merge_set(&mut self.includes, &incoming.includes);
        merge_set(&mut self.excludes, &incoming.excludes);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CommandHook {
    #[serde(skip)]
    state: FreezeState,
    #[serde(flatten)]
    activation: Activation,
    cmd: Option<String>,
    #[serde(flatten)]
    filter: StepFilter,
    platforms: IndexSet<String>,
}

impl CommandHook {
    pub fn new(cmd: &str) -> Self {
        Self {
            cmd: Some(cmd.to_string()),
            ..Self::default()
        }
    }

    setters! {
        set_cmd => cmd: String,
    }

    pub fn cmd(&self) -> &str {
        non_blank(&self.cmd).unwrap_or_default()
    }

    pub fn filter(&self) -> &StepFilter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> ConfigurationResult<&mut StepFilter> {
        self.ensure_mutable()?;
        Ok(&mut self.filter)
    }

    pub fn platforms(&self) -> &IndexSet<String> {
        &self.platforms
    }

    pub fn platforms_mut(&mut self) -> ConfigurationResult<&mut IndexSet<String>> {
        self.ensure_mutable()?;
        Ok(&mut self.platforms)
    }

    /// Whether the hook runs on `platform`.
    ///
    /// No platforms means every platform. Entries starting with `!` exclude
    /// platforms containing the rest of the entry.
    pub fn matches_platform(&self, platform: &str) -> bool {
        let (excluded, included): (Vec<&String>, Vec<&String>) =
            self.platforms.iter().partition(|p| p.starts_with('!'));
        if excluded.iter().any(|p| platform.contains(&p[1..])) {
            return false;
        }
        included.is_empty() || included.iter().any(|p| platform.contains(p.as_str()))
    }

    /// Whether this hook runs for `step` on `platform`.
    pub fn applies_to(&self, step: &str, platform: &str) -> bool {
        self.is_enabled() && self.filter.matches(step) && self.matches_platform(platform)
    }

    pub fn resolved_cmd(&self, context: &ReleaseContext) -> ConfigurationResult<String> {
        let props = context.props()?;
        context.render(self.cmd(), &props)
    }
}

/// Merges hook lists keyed by command.
fn merge_hooks(existing: &mut Vec<CommandHook>, incoming: &[CommandHook]) -> ConfigurationResult<()> {
    for hook in incoming {
        match existing.iter_mut().find(|h| h.cmd() == hook.cmd()) {
            Some(current) => current.merge(hook)?,
            None => existing.push(hook.clone()),
        }
    }
    Ok(())
}

impl Freezable for CommandHook {
    fn kind(&self) -> &'static str {
        "command hook"
    }

    fn freeze_state(&self) -> &FreezeState {
        &self.state
    }

    fn freeze_state_mut(&mut self) -> &mut FreezeState {
        &mut self.state
    }
}

impl Activatable for CommandHook {
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

impl Merge for CommandHook {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.activation.merge(&incoming.activation);
        merge_text(&mut self.cmd, &incoming.cmd);
        self.filter.merge(&incoming.filter);
        merge_set(&mut self.platforms, &incoming.platforms);
        Ok(())
    }
}

impl AsMap for CommandHook {
    fn as_map(&self, full: bool) -> ConfigMap {
        if !full && !self.is_enabled() {
            return ConfigMap::new();
        }
        MapWriter::new()
            .put("enabled", self.is_enabled())
            .put("active", self.active())
            .put("cmd", self.cmd())
            .put("includes", &self.filter.includes)
            .put("excludes", &self.filter.excludes)
            .put("platforms", &self.platforms)
            .build()
    }
}

/// Command hooks grouped by when they run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CommandHooks {
    #[serde(skip)]
    state: FreezeState,
    #[serde(flatten)]
    activation: Activation,
    before: Vec<CommandHook>,
    success: Vec<CommandHook>,
    failure: Vec<CommandHook>,
}

impl CommandHooks {
    pub fn before(&self) -> &[CommandHook] {
        &self.before
    }

    pub fn success(&self) -> &[CommandHook] {
        &self.success
    }

    pub fn failure(&self) -> &[CommandHook] {
        &self.failure
    }

    pub fn add_before(&mut self, hook: CommandHook) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.before.push(hook);
        Ok(())
    }

    pub fn add_success(&mut self, hook: CommandHook) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.success.push(hook);
        Ok(())
    }

    pub fn add_failure(&mut self, hook: CommandHook) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.failure.push(hook);
        Ok(())
    }

    fn hooks_mut(&mut self) -> impl Iterator<Item = &mut CommandHook> {
        self.before
            .iter_mut()
            .chain(self.success.iter_mut())
            .chain(self.failure.iter_mut())
    }

    pub(crate) fn resolve_enabled_all(&mut self, project: &Project, parent_enabled: bool) -> ConfigurationResult<bool> {
        let enabled = if parent_enabled {
            self.resolve_enabled(project)?
        } else {
            self.disable()?;
            false
        };
        for hook in self.hooks_mut() {
            if enabled {
                hook.resolve_enabled(project)?;
            } else {
                hook.disable()?;
            }
        }
        Ok(enabled)
    }
}

impl Freezable for CommandHooks {
    fn kind(&self) -> &'static str {
        "command hooks"
    }

    fn freeze_state(&self) -> &FreezeState {
        &self.state
    }

    fn freeze_state_mut(&mut self) -> &mut FreezeState {
        &mut self.state
    }

    fn visit_children(&mut self, visitor: &mut dyn FnMut(&mut dyn Freezable)) {
        for hook in self.hooks_mut() {
            visitor(hook);
        }
    }
}

impl Activatable for CommandHooks {
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

impl Merge for CommandHooks {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.activation.merge(&incoming.activation);
        merge_hooks(&mut self.before, &incoming.before)?;
        merge_hooks(&mut self.success, &incoming.success)?;
        merge_hooks(&mut self.failure, &incoming.failure)
    }
}

impl AsMap for CommandHooks {
    fn as_map(&self, full: bool) -> ConfigMap {
        if !full && !self.is_enabled() {
            return ConfigMap::new();
        }
        MapWriter::new()
            .put("enabled", self.is_enabled())
            .put("active", self.active())
            .put_children("before", "hook", &self.before, full)
            .put_children("success", "hook", &self.success, full)
            .put_children("failure", "hook", &self.failure, full)
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Hooks {
    #[serde(skip)]
    state: FreezeState,
    #[serde(flatten)]
    activation: Activation,
    command: CommandHooks,
}

impl Hooks {
    pub fn command(&self) -> &CommandHooks {
        &self.command
    }

    pub fn command_mut(&mut self) -> ConfigurationResult<&mut CommandHooks> {
        self.ensure_mutable()?;
        Ok(&mut self.command)
    }

    /// Resolves the hook tree top-down. Disabled parents disable children.
    pub fn resolve_enabled_all(&mut self, project: &Project) -> ConfigurationResult<bool> {
        let enabled = self.resolve_enabled(project)?;
        self.command.resolve_enabled_all(project, enabled)?;
        Ok(enabled)
    }
}

impl Freezable for Hooks {
    fn kind(&self) -> &'static str {
        "hooks"
    }

    fn freeze_state(&self) -> &FreezeState {
        &self.state
    }

    fn freeze_state_mut(&mut self) -> &mut FreezeState {
        &mut self.state
    }

    fn visit_children(&mut self, visitor: &mut dyn FnMut(&mut dyn Freezable)) {
        visitor(&mut self.command);
    }
}

impl Activatable for Hooks {
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

impl Merge for Hooks {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.activation.merge(&incoming.activation);
        self.command.merge(&incoming.command)
    }
}

impl AsMap for Hooks {
    fn as_map(&self, full: bool) -> ConfigMap {
        if !full && !self.is_enabled() {
            return ConfigMap::new();
        }
        MapWriter::new()
            .put("enabled", self.is_enabled())
            .put("active", self.active())
            .put_child("command", self.command.as_map(full))
            .build()
    }
}
