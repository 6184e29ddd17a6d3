//! Template property bags and per-entity extra properties.

use serde_json::{Map, Value};

use crate::errors::ConfigurationResult;
use crate::freeze::Freezable;

#[cfg(test)]
#[path = "properties_tests.rs"]
mod tests;

/// Ordered string-keyed property bag used for template expansion.
pub type Properties = Map<String, Value>;

/// Namespaces `key` with `prefix` unless it is already namespaced.
///
/// `channel` with prefix `slack` becomes `slackChannel`.
pub fn prefixed_key(prefix: &str, key: &str) -> String {
    if key.starts_with(prefix) {
        return key.to_string();
    }
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => format!("{}{}{}", prefix, first.to_uppercase(), chars.as_str()),
        None => prefix.to_string(),
    }
}

/// Capitalizes the first character of `text`.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Free-form key/value bag attached to an entity and injected into templates.
pub trait ExtraProperties: Freezable {
    /// Namespace applied to keys when they join the global property bag.
    fn prefix(&self) -> &str;

    fn extra_properties(&self) -> &Properties;

    #[doc(hidden)]
    fn extra_properties_slot(&mut self) -> &mut Properties;

    /// Mutable access, only while the entity is not frozen.
    fn extra_properties_mut(&mut self) -> ConfigurationResult<&mut Properties> {
        self.ensure_mutable()?;
        Ok(self.extra_properties_slot())
    }

    fn add_extra_property(&mut self, key: &str, value: Value) -> ConfigurationResult<()> {
        self.extra_properties_mut()?.insert(key.to_string(), value);
        Ok(())
    }

    /// Extra properties with every key namespaced by [`ExtraProperties::prefix`].
    fn resolved_extra_properties(&self) -> Properties {
        let prefix = self.prefix();
        self.extra_properties()
            .iter()
            .map(|(key, value)| (prefixed_key(prefix, key), value.clone()))
            .collect()
    }
}
