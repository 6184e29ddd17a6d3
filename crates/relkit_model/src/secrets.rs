//! Secret resolution for tokens, passwords and webhooks.
//!
//! Deployment secrets override checked-in configuration: for a secret field
//! the resolver first looks up `<TYPE>_<NORMALIZED_NAME>_<FIELD>`, then the
//! type-wide `<TYPE>_<FIELD>`, and only then falls back to the configured
//! value.
//!
//! Secret values are never logged; only the variable names are.

use std::collections::HashMap;

use tracing::debug;

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod tests;

/// Source of secret values keyed by variable name.
pub trait SecretResolver {
    fn resolve_secret(&self, key: &str) -> Option<String>;
}

/// Resolves secrets from process environment variables.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvironmentSecretResolver;

impl EnvironmentSecretResolver {
    pub fn new() -> Self {
        Self
    }
}

impl SecretResolver for EnvironmentSecretResolver {
    fn resolve_secret(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Resolves secrets from an in-memory map.
#[derive(Debug, Default, Clone)]
pub struct MapSecretResolver {
    values: HashMap<String, String>,
}

impl MapSecretResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl SecretResolver for MapSecretResolver {
    fn resolve_secret(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Uppercases `name` and collapses every run of non-alphanumerics into `_`.
///
/// `release-notes.hook` becomes `RELEASE_NOTES_HOOK`.
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut pending_separator = false;
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !normalized.is_empty() {
                normalized.push('_');
            }
            pending_separator = false;
            normalized.push(c.to_ascii_uppercase());
        } else {
            pending_separator = true;
        }
    }
    normalized
}

/// Variable names consulted for a secret, most specific first.
pub fn secret_keys(entity_type: &str, name: Option<&str>, field: &str) -> Vec<String> {
    let entity_type = normalize_name(entity_type);
    let field = normalize_name(field);
    let mut keys = Vec::with_capacity(2);

    if let Some(name) = name.map(normalize_name).filter(|n| !n.is_empty()) {
        keys.push(format!("{entity_type}_{name}_{field}"));
    }
    keys.push(format!("{entity_type}_{field}"));
    keys
}

/// Resolves a secret, preferring the resolver over the configured value.
///
/// Blank values from either source count as unset.
pub fn resolve_secret(
    resolver: &dyn SecretResolver,
    entity_type: &str,
    name: Option<&str>,
    field: &str,
    configured: Option<&str>,
) -> Option<String> {
    for key in secret_keys(entity_type, name, field) {
        if let Some(value) = resolver.resolve_secret(&key) {
            if !value.trim().is_empty() {
                debug!("Resolved {} for {} from {}", field, entity_type, key);
                return Some(value);
            }
        }
    }

    configured
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
}

/// Entities carrying secret fields.
pub trait SecretAware {
    /// Replaces each secret field with its resolved value.
    fn resolve_secrets(&mut self, resolver: &dyn SecretResolver) -> crate::ConfigurationResult<()>;

    /// Variable names each secret field consults, for diagnostics.
    fn secret_variables(&self) -> Vec<String>;
}
