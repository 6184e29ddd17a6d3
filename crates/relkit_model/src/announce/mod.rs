//! Release announcers.
//!
//! Announcers notify external channels once a release is published. They
//! are off unless explicitly activated and never run for snapshot releases.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::active::{Activatable, Active, Activation};
use crate::context::ReleaseContext;
use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{FreezeState, Freezable};
use crate::merge::{merge_model, merge_properties, non_blank, Merge};
use crate::project::Project;
use crate::properties::Properties;
use crate::secrets::{SecretAware, SecretResolver};
use crate::timeout::{TimeoutAware, Timeouts};

pub mod discord;
pub mod slack;
pub mod twitter;
pub mod webhook;

pub use discord::Discord;
pub use slack::Slack;
pub use twitter::Twitter;
pub use webhook::WebhookAnnouncer;

#[cfg(test)]
#[path = "announce_tests.rs"]
mod tests;

/// Default announcement shared by the chat announcers.
pub const DEFAULT_MESSAGE: &str =
    "🚀 {{projectNameCapitalized}} {{projectVersion}} has been released! {{releaseNotesUrl}}";

/// Fields every announcer carries.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnnouncerCommon {
    #[serde(skip)]
    pub(crate) state: FreezeState,
    #[serde(flatten)]
    pub(crate) activation: Activation,
    #[serde(flatten)]
    pub(crate) timeouts: Timeouts,
    pub(crate) extra_properties: Properties,
}

impl AnnouncerCommon {
    pub(crate) fn merge(&mut self, incoming: &AnnouncerCommon) {
        self.activation.merge(&incoming.activation);
        self.timeouts.merge(&incoming.timeouts);
        merge_properties(&mut self.extra_properties, &incoming.extra_properties);
    }

    pub(crate) fn write_head(&self, writer: &mut MapWriter) {
        writer
            .put("enabled", self.activation.is_enabled())
            .put("active", self.activation.active());
    }

    pub(crate) fn write_tail(&self, writer: &mut MapWriter) {
        writer
            .put("connect_timeout", self.timeouts.connect_timeout())
            .put("read_timeout", self.timeouts.read_timeout())
            .put("extra_properties", &self.extra_properties);
    }
}

/// Implements the capability traits for a struct with a `common:
/// AnnouncerCommon` field.
macro_rules! announcer {
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

            fn supports_snapshot(&self) -> bool {
                false
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
    };
}

pub(crate) use announcer;

/// Global properties overlaid with an announcer's extra properties.
pub(crate) fn announcer_props<T>(announcer: &T, context: &ReleaseContext) -> ConfigurationResult<Properties>
where
    T: crate::properties::ExtraProperties,
{
    let mut props = context.props()?;
    props.extend(announcer.resolved_extra_properties());
    Ok(props)
}

/// Picks the inline message, then the template file, then `default`.
pub(crate) fn resolve_message(
    context: &ReleaseContext,
    props: &Properties,
    message: &Option<String>,
    message_template: &Option<String>,
    default: &str,
) -> ConfigurationResult<String> {
    if let Some(message) = non_blank(message) {
        return context.render(message, props);
    }
    if let Some(template) = non_blank(message_template) {
        return context.render_file(template.trim(), props);
    }
    context.render(default, props)
}

/// All announcers of a project.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Announce {
    #[serde(skip)]
    state: FreezeState,
    #[serde(flatten)]
    activation: Activation,
    slack: Slack,
    discord: Discord,
    twitter: Twitter,
    webhooks: IndexMap<String, WebhookAnnouncer>,
}

impl Announce {
    pub fn slack(&self) -> &Slack {
        &self.slack
    }

    pub fn slack_mut(&mut self) -> ConfigurationResult<&mut Slack> {
        self.ensure_mutable()?;
        Ok(&mut self.slack)
    }

    pub fn discord(&self) -> &Discord {
        &self.discord
    }

    pub fn discord_mut(&mut self) -> ConfigurationResult<&mut Discord> {
        self.ensure_mutable()?;
        Ok(&mut self.discord)
    }

    pub fn twitter(&self) -> &Twitter {
        &self.twitter
    }

    pub fn twitter_mut(&mut self) -> ConfigurationResult<&mut Twitter> {
        self.ensure_mutable()?;
        Ok(&mut self.twitter)
    }

    pub fn webhooks(&self) -> &IndexMap<String, WebhookAnnouncer> {
        &self.webhooks
    }

    pub fn webhooks_mut(&mut self) -> ConfigurationResult<&mut IndexMap<String, WebhookAnnouncer>> {
        self.ensure_mutable()?;
        Ok(&mut self.webhooks)
    }

    /// Adds or replaces the webhook stored under `name`.
    pub fn add_webhook(&mut self, name: &str, mut webhook: WebhookAnnouncer) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        if webhook.name().is_empty() {
            webhook.set_name(name)?;
        }
        self.webhooks.insert(name.to_string(), webhook);
        Ok(())
    }

    /// Copies map keys into the names of entries that have none.
    pub(crate) fn normalize_names(&mut self) -> ConfigurationResult<()> {
        for (name, webhook) in self.webhooks.iter_mut() {
            if webhook.name().is_empty() {
                webhook.set_name(name.clone())?;
            }
        }
        Ok(())
    }

    /// Resolves the container and every announcer.
    ///
    /// A disabled container disables all announcers regardless of their own
    /// policy.
    pub fn resolve_enabled_all(&mut self, project: &Project) -> ConfigurationResult<bool> {
        let enabled = self.resolve_enabled(project)?;
        if !enabled {
            self.slack.disable()?;
            self.discord.disable()?;
            self.twitter.disable()?;
            for webhook in self.webhooks.values_mut() {
                webhook.disable()?;
            }
            return Ok(false);
        }

        self.slack.resolve_enabled(project)?;
        self.discord.resolve_enabled(project)?;
        self.twitter.resolve_enabled(project)?;
        for webhook in self.webhooks.values_mut() {
            webhook.resolve_enabled(project)?;
        }
        Ok(true)
    }

    /// Whether any announcer will run.
    pub fn has_enabled_announcers(&self) -> bool {
        self.is_enabled()
            && (self.slack.is_enabled()
                || self.discord.is_enabled()
                || self.twitter.is_enabled()
                || self.webhooks.values().any(|w| w.is_enabled()))
    }
}

impl Freezable for Announce {
    fn kind(&self) -> &'static str {
        "announce"
    }

    fn freeze_state(&self) -> &FreezeState {
        &self.state
    }

    fn freeze_state_mut(&mut self) -> &mut FreezeState {
        &mut self.state
    }

    fn visit_children(&mut self, visitor: &mut dyn FnMut(&mut dyn Freezable)) {
        visitor(&mut self.slack);
        visitor(&mut self.discord);
        visitor(&mut self.twitter);
        for webhook in self.webhooks.values_mut() {
            visitor(webhook);
        }
    }
}

impl Activatable for Announce {
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

impl Merge for Announce {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.activation.merge(&incoming.activation);
        self.slack.merge(&incoming.slack)?;
        self.discord.merge(&incoming.discord)?;
        self.twitter.merge(&incoming.twitter)?;
        merge_model(&mut self.webhooks, &incoming.webhooks)
    }
}

impl SecretAware for Announce {
    fn resolve_secrets(&mut self, resolver: &dyn SecretResolver) -> ConfigurationResult<()> {
        self.slack.resolve_secrets(resolver)?;
        self.discord.resolve_secrets(resolver)?;
        self.twitter.resolve_secrets(resolver)?;
        for webhook in self.webhooks.values_mut() {
            webhook.resolve_secrets(resolver)?;
        }
        Ok(())
    }

    fn secret_variables(&self) -> Vec<String> {
        let mut variables = self.slack.secret_variables();
        variables.extend(self.discord.secret_variables());
        variables.extend(self.twitter.secret_variables());
        for webhook in self.webhooks.values() {
            variables.extend(webhook.secret_variables());
        }
        variables
    }
}

impl AsMap for Announce {
    fn as_map(&self, full: bool) -> ConfigMap {
        if !full && !self.is_enabled() {
            return ConfigMap::new();
        }
        MapWriter::new()
            .put("enabled", self.is_enabled())
            .put("active", self.active())
            .put_child("slack", self.slack.as_map(full))
            .put_child("discord", self.discord.as_map(full))
            .put_child("twitter", self.twitter.as_map(full))
            .put_named("webhooks", &self.webhooks, full)
            .build()
    }
}
