//! Twitter announcer.

use serde::Deserialize;

use super::{announcer, announcer_props, AnnouncerCommon, DEFAULT_MESSAGE};
use crate::active::Activatable;
use crate::context::ReleaseContext;
use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, Freezable};
use crate::merge::{merge_list, merge_text, non_blank, Merge};
use crate::secrets::{resolve_secret, secret_keys, SecretAware, SecretResolver};

#[cfg(test)]
#[path = "twitter_tests.rs"]
mod tests;

/// Line separating consecutive statuses in a status template file.
pub const STATUS_SEPARATOR: &str = "---";

const SECRET_FIELDS: [&str; 4] = [
    "consumer_key",
    "consumer_secret",
    "access_token",
    "access_token_secret",
];

/// Posts one status, or a thread of statuses, to Twitter.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Twitter {
    #[serde(flatten)]
    pub(crate) common: AnnouncerCommon,
    consumer_key: Option<String>,
    consumer_secret: Option<String>,
    access_token: Option<String>,
    access_token_secret: Option<String>,
    status: Option<String>,
    statuses: Vec<String>,
    status_template: Option<String>,
}

announcer!(Twitter, "twitter");

impl Twitter {
    setters! {
        set_consumer_key => consumer_key: String,
        set_consumer_secret => consumer_secret: String,
        set_access_token => access_token: String,
        set_access_token_secret => access_token_secret: String,
        set_status => status: String,
        set_status_template => status_template: String,
        set_connect_timeout => common.timeouts.connect_timeout: u32,
        set_read_timeout => common.timeouts.read_timeout: u32,
    }

    pub fn consumer_key(&self) -> Option<&str> {
        self.consumer_key.as_deref()
    }

    pub fn consumer_secret(&self) -> Option<&str> {
        self.consumer_secret.as_deref()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn access_token_secret(&self) -> Option<&str> {
        self.access_token_secret.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn statuses(&self) -> &[String] {
        &self.statuses
    }

    pub fn statuses_mut(&mut self) -> ConfigurationResult<&mut Vec<String>> {
        self.ensure_mutable()?;
        Ok(&mut self.statuses)
    }

    pub fn status_template(&self) -> Option<&str> {
        self.status_template.as_deref()
    }

    /// Statuses to post, in order.
    ///
    /// Uses the `statuses` list if it has entries, then the single `status`,
    /// then the status template file split on lines containing only `---`,
    /// and finally the default announcement.
    pub fn resolved_statuses(&self, context: &ReleaseContext) -> ConfigurationResult<Vec<String>> {
        let props = announcer_props(self, context)?;

        if !self.statuses.is_empty() {
            return self
                .statuses
                .iter()
                .map(|status| context.render(status, &props))
                .collect();
        }
        if let Some(status) = non_blank(&self.status) {
            return Ok(vec![context.render(status, &props)?]);
        }
        if let Some(template) = non_blank(&self.status_template) {
            let rendered = context.render_file(template.trim(), &props)?;
            return Ok(split_statuses(&rendered));
        }
        Ok(vec![context.render(DEFAULT_MESSAGE, &props)?])
    }
}

fn split_statuses(text: &str) -> Vec<String> {
    let mut statuses = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        if line.trim() == STATUS_SEPARATOR {
            statuses.push(current.join("\n"));
            current.clear();
        } else {
            current.push(line);
        }
    }
    statuses.push(current.join("\n"));

    statuses
        .into_iter()
        .map(|status| status.trim().to_string())
        .filter(|status| !status.is_empty())
        .collect()
}

impl Merge for Twitter {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.common.merge(&incoming.common);
        merge_text(&mut self.consumer_key, &incoming.consumer_key);
        merge_text(&mut self.consumer_secret, &incoming.consumer_secret);
        merge_text(&mut self.access_token, &incoming.access_token);
        merge_text(&mut self.access_token_secret, &incoming.access_token_secret);
        merge_text(&mut self.status, &incoming.status);
        merge_list(&mut self.statuses, &incoming.statuses);
        merge_text(&mut self.status_template, &incoming.status_template);
        Ok(())
    }
}

impl SecretAware for Twitter {
    fn resolve_secrets(&mut self, resolver: &dyn SecretResolver) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.consumer_key =
            resolve_secret(resolver, "twitter", None, "consumer_key", self.consumer_key.as_deref());
        self.consumer_secret = resolve_secret(
            resolver,
            "twitter",
            None,
            "consumer_secret",
            self.consumer_secret.as_deref(),
        );
        self.access_token =
            resolve_secret(resolver, "twitter", None, "access_token", self.access_token.as_deref());
        self.access_token_secret = resolve_secret(
            resolver,
            "twitter",
            None,
            "access_token_secret",
            self.access_token_secret.as_deref(),
        );
        Ok(())
    }

    fn secret_variables(&self) -> Vec<String> {
        SECRET_FIELDS
            .iter()
            .flat_map(|field| secret_keys("twitter", None, field))
            .collect()
    }
}

impl AsMap for Twitter {
    fn as_map(&self, full: bool) -> ConfigMap {
        if !full && !self.is_enabled() {
            return ConfigMap::new();
        }
        let mut writer = MapWriter::new();
        self.common.write_head(&mut writer);
        writer
            .put_secret("consumer_key", self.consumer_key.as_deref())
            .put_secret("consumer_secret", self.consumer_secret.as_deref())
            .put_secret("access_token", self.access_token.as_deref())
            .put_secret("access_token_secret", self.access_token_secret.as_deref())
            .put("status", &self.status)
            .put("statuses", &self.statuses)
            .put("status_template", &self.status_template);
        self.common.write_tail(&mut writer);
        writer.build()
    }
}
