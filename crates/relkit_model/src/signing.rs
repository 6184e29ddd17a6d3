//! Signing of release artifacts, checksums and files.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::active::{Activatable, Activation};
use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, FreezeState, Freezable};
use crate::merge::{merge_text, merge_value, non_blank, Merge};
use crate::secrets::{resolve_secret, secret_keys, SecretAware, SecretResolver};

#[cfg(test)]
#[path = "signing_tests.rs"]
mod tests;

/// Where signing keys come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum SigningMode {
    /// Armored keys held in configuration or environment variables.
    #[default]
    Memory,
    /// Key rings on disk.
    File,
    /// An external `gpg` executable.
    Command,
    Cosign,
}

impl SigningMode {
    pub const ALL: [SigningMode; 4] = [
        SigningMode::Memory,
        SigningMode::File,
        SigningMode::Command,
        SigningMode::Cosign,
    ];

    pub fn parse(value: &str) -> ConfigurationResult<Self> {
        let normalized = value.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| ConfigurationError::InvalidValue {
                field: "mode".to_string(),
                value: value.to_string(),
                reason: "expected one of MEMORY, FILE, COMMAND, COSIGN".to_string(),
            })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SigningMode::Memory => "MEMORY",
            SigningMode::File => "FILE",
            SigningMode::Command => "COMMAND",
            SigningMode::Cosign => "COSIGN",
        }
    }
}

impl fmt::Display for SigningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SigningMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl TryFrom<String> for SigningMode {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Signing {
    #[serde(skip)]
    state: FreezeState,
    #[serde(flatten)]
    activation: Activation,
    mode: Option<SigningMode>,
    armored: Option<bool>,
    public_key: Option<String>,
    secret_key: Option<String>,
    passphrase: Option<String>,
    artifacts: Option<bool>,
    files: Option<bool>,
    checksums: Option<bool>,
}

impl Signing {
    setters! {
        set_mode => mode: SigningMode,
        set_armored => armored: bool,
        set_public_key => public_key: String,
        set_secret_key => secret_key: String,
        set_passphrase => passphrase: String,
        set_artifacts => artifacts: bool,
        set_files => files: bool,
        set_checksums => checksums: bool,
    }

    pub fn mode(&self) -> SigningMode {
        self.mode.unwrap_or_default()
    }

    pub fn is_armored(&self) -> bool {
        self.armored.unwrap_or(true)
    }

    pub fn public_key(&self) -> Option<&str> {
        non_blank(&self.public_key)
    }

    pub fn secret_key(&self) -> Option<&str> {
        non_blank(&self.secret_key)
    }

    pub fn passphrase(&self) -> Option<&str> {
        non_blank(&self.passphrase)
    }

    pub fn is_artifacts(&self) -> bool {
        self.artifacts.unwrap_or(true)
    }

    pub fn is_files(&self) -> bool {
        self.files.unwrap_or(true)
    }

    pub fn is_checksums(&self) -> bool {
        self.checksums.unwrap_or(true)
    }

    /// Signature file extension.
    pub fn signature_extension(&self) -> &'static str {
        match self.mode() {
            SigningMode::Cosign => ".sig",
            _ if self.is_armored() => ".asc",
            _ => ".sig",
        }
    }
}

impl Freezable for Signing {
    fn kind(&self) -> &'static str {
        "signing"
    }

    fn freeze_state(&self) -> &FreezeState {
        &self.state
    }

    fn freeze_state_mut(&mut self) -> &mut FreezeState {
        &mut self.state
    }
}

impl Activatable for Signing {
    fn activation(&self) -> &Activation {
        &self.activation
    }

    fn activation_mut(&mut self) -> &mut Activation {
        &mut self.activation
    }
}

impl Merge for Signing {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.activation.merge(&incoming.activation);
        merge_value(&mut self.mode, &incoming.mode);
        merge_value(&mut self.armored, &incoming.armored);
        merge_text(&mut self.public_key, &incoming.public_key);
        merge_text(&mut self.secret_key, &incoming.secret_key);
        merge_text(&mut self.passphrase, &incoming.passphrase);
        merge_value(&mut self.artifacts, &incoming.artifacts);
        merge_value(&mut self.files, &incoming.files);
        merge_value(&mut self.checksums, &incoming.checksums);
        Ok(())
    }
}

impl SecretAware for Signing {
    fn resolve_secrets(&mut self, resolver: &dyn SecretResolver) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.public_key = resolve_secret(resolver, "signing", None, "public_key", self.public_key.as_deref());
        self.secret_key = resolve_secret(resolver, "signing", None, "secret_key", self.secret_key.as_deref());
        self.passphrase = resolve_secret(resolver, "signing", None, "passphrase", self.passphrase.as_deref());
        Ok(())
    }

    fn secret_variables(&self) -> Vec<String> {
        ["public_key", "secret_key", "passphrase"]
            .iter()
            .flat_map(|field| secret_keys("signing", None, field))
            .collect()
    }
}

impl AsMap for Signing {
    fn as_map(&self, full: bool) -> ConfigMap {
        if !full && !self.is_enabled() {
            return ConfigMap::new();
        }
        MapWriter::new()
            .put("enabled", self.is_enabled())
            .put("active", self.active())
            .put("mode", self.mode())
            .put("armored", self.is_armored())
            .put_secret("public_key", self.public_key.as_deref())
            .put_secret("secret_key", self.secret_key.as_deref())
            .put_secret("passphrase", self.passphrase.as_deref())
            .put("artifacts", self.is_artifacts())
            .put("files", self.is_files())
            .put("checksums", self.is_checksums())
            .build()
    }
}
