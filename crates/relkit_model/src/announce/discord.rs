//! Discord announcer.

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
#[path = "discord_tests.rs"]
mod tests;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Discord {
    #[serde(flatten)]
    pub(crate) common: AnnouncerCommon,
    webhook: Option<String>,
    message: Option<String>,
    message_template: Option<String>,
}

announcer!(Discord, "discord");

impl Discord {
    setters! {
        set_webhook => webhook: String,
        set_message => message: String,
        set_message_template => message_template: String,
        set_connect_timeout => common.timeouts.connect_timeout: u32,
        set_read_timeout => common.timeouts.read_timeout: u32,
    }

    pub fn webhook(&self) -> Option<&str> {
        self.webhook.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn message_template(&self) -> Option<&str> {
        self.message_template.as_deref()
    }

    pub fn resolved_message(&self, context: &ReleaseContext) -> ConfigurationResult<String> {
        let props = announcer_props(self, context)?;
        resolve_message(context, &props, &self.message, &self.message_template, DEFAULT_MESSAGE)
    }
}

impl Merge for Discord {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.common.merge(&incoming.common);
        merge_text(&mut self.webhook, &incoming.webhook);
        merge_text(&mut self.message, &incoming.message);
        merge_text(&mut self.message_template, &incoming.message_template);
        Ok(())
    }
}

impl SecretAware for Discord {
    fn resolve_secrets(&mut self, resolver: &dyn SecretResolver) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.webhook = resolve_secret(resolver, "discord", None, "webhook", self.webhook.as_deref());
        Ok(())
    }

    fn secret_variables(&self) -> Vec<String> {
        secret_keys("discord", None, "webhook")
    }
}

impl AsMap for Discord {
    fn as_map(&self, full: bool) -> ConfigMap {
        if !full && !self.is_enabled() {
            return ConfigMap::new();
        }
        let mut writer = MapWriter::new();
        self.common.write_head(&mut writer);
        writer
            .put_secret("webhook", self.webhook.as_deref())
            .put("message", &self.message)
            .put("message_template", &self.message_template);
        self.common.write_tail(&mut writer);
        writer.build()
    }
}
