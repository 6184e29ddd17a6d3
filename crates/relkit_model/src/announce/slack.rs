//! Slack announcer.

use serde::Deserialize;

use super::{announcer, announcer_props, resolve_message, AnnouncerCommon, DEFAULT_MESSAGE};
use crate::active::Activatable;
use crate::context::ReleaseContext;
use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, Freezable};
use crate::merge::{merge_text, Merge};
use crate::secrets::{resolve_secret, secret_keys, SecretAware, SecretResolver};

#[cfg(test)]
#[path = "slack_tests.rs"]
mod tests;

/// Posts the release announcement to a Slack channel, either through the
/// Web API (`token` + `channel`) or an incoming webhook.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Slack {
    #[serde(flatten)]
    pub(crate) common: AnnouncerCommon,
    token: Option<String>,
    webhook: Option<String>,
    channel: Option<String>,
    message: Option<String>,
    message_template: Option<String>,
}

announcer!(Slack, "slack");

impl Slack {
    setters! {
        set_token => token: String,
        set_webhook => webhook: String,
        set_channel => channel: String,
        set_message => message: String,
        set_message_template => message_template: String,
        set_connect_timeout => common.timeouts.connect_timeout: u32,
        set_read_timeout => common.timeouts.read_timeout: u32,
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn webhook(&self) -> Option<&str> {
        self.webhook.as_deref()
    }

    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn message_template(&self) -> Option<&str> {
        self.message_template.as_deref()
    }

    /// The announcement text with all placeholders expanded.
    pub fn resolved_message(&self, context: &ReleaseContext) -> ConfigurationResult<String> {
        let mut props = announcer_props(self, context)?;
        if let Some(channel) = &self.channel {
            props.insert("slackChannel".into(), channel.clone().into());
        }
        resolve_message(context, &props, &self.message, &self.message_template, DEFAULT_MESSAGE)
    }
}

impl Merge for Slack {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.common.merge(&incoming.common);
        merge_text(&mut self.token, &incoming.token);
        merge_text(&mut self.webhook, &incoming.webhook);
        merge_text(&mut self.channel, &incoming.channel);
        merge_text(&mut self.message, &incoming.message);
        merge_text(&mut self.message_template, &incoming.message_template);
        Ok(())
    }
}

impl SecretAware for Slack {
    fn resolve_secrets(&mut self, resolver: &dyn SecretResolver) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.token = resolve_secret(resolver, "slack", None, "token", self.token.as_deref());
        self.webhook = resolve_secret(resolver, "slack", None, "webhook", self.webhook.as_deref());
        Ok(())
    }

    fn secret_variables(&self) -> Vec<String> {
        let mut variables = secret_keys("slack", None, "token");
        variables.extend(secret_keys("slack", None, "webhook"));
        variables
    }
}

impl AsMap for Slack {
    fn as_map(&self, full: bool) -> ConfigMap {
        if !full && !self.is_enabled() {
            return ConfigMap::new();
        }
        let mut writer = MapWriter::new();
        self.common.write_head(&mut writer);
        writer
            .put_secret("token", self.token.as_deref())
            .put_secret("webhook", self.webhook.as_deref())
            .put("channel", &self.channel)
            .put("message", &self.message)
            .put("message_template", &self.message_template);
        self.common.write_tail(&mut writer);
        writer.build()
    }
}
