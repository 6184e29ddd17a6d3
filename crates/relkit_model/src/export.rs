//! Diagnostic export of the configuration tree.
//!
//! [`AsMap::as_map`] turns an entity into an ordered map for logging and
//! reporting. Disabled entities export nothing unless the full view is
//! requested, and secrets are always replaced by a marker.

use serde::Serialize;
use serde_json::{Map, Value};

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;

/// Ordered string-keyed map tree produced by [`AsMap::as_map`].
pub type ConfigMap = Map<String, Value>;

/// Marker shown in place of a secret that is set.
pub const HIDE: &str = "************";

/// Marker shown in place of a secret that is not set.
pub const UNSET: &str = "**unset**";

/// Replaces a secret value with [`HIDE`] or [`UNSET`].
pub fn secret_marker(secret: Option<&str>) -> &'static str {
    match secret {
        Some(value) if !value.trim().is_empty() => HIDE,
        _ => UNSET,
    }
}

/// Diagnostic export of an entity's current state.
pub trait AsMap {
    /// Returns the entity as an ordered map.
    ///
    /// With `full == false`, disabled entities return an empty map.
    fn as_map(&self, full: bool) -> ConfigMap;
}

/// Small helper for assembling a [`ConfigMap`] in insertion order.
#[derive(Debug, Default)]
pub struct MapWriter {
    map: ConfigMap,
}

impl MapWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: &str, value: impl Serialize) -> &mut Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.map.insert(key.to_string(), value);
        self
    }

    pub fn put_secret(&mut self, key: &str, secret: Option<&str>) -> &mut Self {
        self.map
            .insert(key.to_string(), Value::String(secret_marker(secret).to_string()));
        self
    }

    /// Nests a child map. Empty children (disabled entities) are skipped.
    pub fn put_child(&mut self, key: &str, child: ConfigMap) -> &mut Self {
        if !child.is_empty() {
            self.map.insert(key.to_string(), Value::Object(child));
        }
        self
    }

    /// Nests every element of an unnamed list under `"<label> <index>"`.
    pub fn put_children<'a, T, I>(&mut self, key: &str, label: &str, items: I, full: bool) -> &mut Self
    where
        T: AsMap + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut children = ConfigMap::new();
        for (index, item) in items.into_iter().enumerate() {
            let child = item.as_map(full);
            if !child.is_empty() {
                children.insert(format!("{label} {index}"), Value::Object(child));
            }
        }
        self.put_child(key, children)
    }

    /// Nests every entry of a name-keyed collection under its name.
    pub fn put_named<'a, T, I>(&mut self, key: &str, items: I, full: bool) -> &mut Self
    where
        T: AsMap + 'a,
        I: IntoIterator<Item = (&'a String, &'a T)>,
    {
        let mut children = ConfigMap::new();
        for (name, item) in items {
            let child = item.as_map(full);
            if !child.is_empty() {
                children.insert(name.clone(), Value::Object(child));
            }
        }
        self.put_child(key, children)
    }

    /// Copies all entries of `other` into this map.
    pub fn extend(&mut self, other: ConfigMap) -> &mut Self {
        self.map.extend(other);
        self
    }

    pub fn build(&mut self) -> ConfigMap {
        std::mem::take(&mut self.map)
    }
}
