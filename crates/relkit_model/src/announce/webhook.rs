//! Generic webhook announcers, configured by name.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{announcer, announcer_props, resolve_message, AnnouncerCommon, DEFAULT_MESSAGE};
use crate::active::Activatable;
use crate::context::ReleaseContext;
use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, Freezable};
use crate::merge::{merge_text, merge_value, non_blank, Merge};
use crate::secrets::{resolve_secret, secret_keys, SecretAware, SecretResolver};

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;

pub const DEFAULT_MESSAGE_PROPERTY: &str = "text";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WebhookAnnouncer {
    #[serde(flatten)]
    pub(crate) common: AnnouncerCommon,
    name: String,
    webhook: Option<String>,
    message: Option<String>,
    message_property: Option<String>,
    message_template: Option<String>,
    structured_message: Option<bool>,
}

announcer!(WebhookAnnouncer, "webhook");

impl WebhookAnnouncer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    setters! {
        set_webhook => webhook: String,
        set_message => message: String,
        set_message_property => message_property: String,
        set_message_template => message_template: String,
        set_structured_message => structured_message: bool,
        set_connect_timeout => common.timeouts.connect_timeout: u32,
        set_read_timeout => common.timeouts.read_timeout: u32,
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.name = name.into();
        Ok(())
    }

    pub fn webhook(&self) -> Option<&str> {
        self.webhook.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// JSON property that carries the message in unstructured payloads.
    pub fn message_property(&self) -> &str {
        non_blank(&self.message_property).unwrap_or(DEFAULT_MESSAGE_PROPERTY)
    }

    pub fn message_template(&self) -> Option<&str> {
        self.message_template.as_deref()
    }

    pub fn is_structured_message(&self) -> bool {
        self.structured_message.unwrap_or(false)
    }

    pub fn resolved_message(&self, context: &ReleaseContext) -> ConfigurationResult<String> {
        let mut props = announcer_props(self, context)?;
        props.insert("webhookName".into(), Value::String(self.name.clone()));
        resolve_message(context, &props, &self.message, &self.message_template, DEFAULT_MESSAGE)
    }

    /// Request body to post.
    ///
    /// Structured messages are sent as rendered and must already be JSON.
    /// Plain messages are wrapped as `{"<message_property>": "<message>"}`.
    pub fn resolved_payload(&self, context: &ReleaseContext) -> ConfigurationResult<String> {
        let message = self.resolved_message(context)?;
        if self.is_structured_message() {
            serde_json::from_str::<Value>(&message).map_err(|e| ConfigurationError::InvalidValue {
                field: format!("webhook.{}.message", self.name),
                value: message.clone(),
                reason: format!("structured message is not valid JSON: {e}"),
            })?;
            return Ok(message);
        }

        let mut payload = Map::new();
        payload.insert(self.message_property().to_string(), Value::String(message));
        Ok(Value::Object(payload).to_string())
    }
}

impl Merge for WebhookAnnouncer {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.common.merge(&incoming.common);
        if !incoming.name.trim().is_empty() {
            self.name = incoming.name.clone();
        }
        merge_text(&mut self.webhook, &incoming.webhook);
        merge_text(&mut self.message, &incoming.message);
        merge_text(&mut self.message_property, &incoming.message_property);
        merge_text(&mut self.message_template, &incoming.message_template);
        merge_value(&mut self.structured_message, &incoming.structured_message);
        Ok(())
    }
}

impl SecretAware for WebhookAnnouncer {
    fn resolve_secrets(&mut self, resolver: &dyn SecretResolver) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.webhook = resolve_secret(
            resolver,
            "webhook",
            Some(self.name.as_str()),
            "webhook",
            self.webhook.as_deref(),
        );
        Ok(())
    }

    fn secret_variables(&self) -> Vec<String> {
        secret_keys("webhook", Some(self.name.as_str()), "webhook")
    }
}

impl AsMap for WebhookAnnouncer {
    fn as_map(&self, full: bool) -> ConfigMap {
        if !full && !self.is_enabled() {
            return ConfigMap::new();
        }
        let mut writer = MapWriter::new();
        self.common.write_head(&mut writer);
        writer
            .put("name", &self.name)
            .put_secret("webhook", self.webhook.as_deref())
            .put("message", &self.message)
            .put("message_property", self.message_property())
            .put("message_template", &self.message_template)
            .put("structured_message", self.is_structured_message());
        self.common.write_tail(&mut writer);
        writer.build()
    }
}
