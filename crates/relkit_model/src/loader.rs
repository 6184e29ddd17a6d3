//! Loading layered TOML configuration files.
//!
//! Each file deserializes into a complete [`ReleaseModel`]. Layers are merged
//! in the order given, so a later file overrides scalar values of an earlier
//! one while lists, sets and named maps accumulate.

use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info};

use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::merge::Merge;
use crate::model::ReleaseModel;

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;

/// Reads release configuration from TOML.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn new() -> Self {
        Self
    }

    /// Parses one TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::ParseError` for malformed TOML and for
    /// values that fail validation, such as an unknown `active` policy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use relkit_model::ConfigLoader;
    ///
    /// let model = ConfigLoader::new()
    ///     .parse("[project]\nname = \"app\"\nversion = \"1.0.0\"\n")
    ///     .unwrap();
    /// assert_eq!(model.project().name(), Some("app"));
    /// ```
    pub fn parse(&self, content: &str) -> ConfigurationResult<ReleaseModel> {
        let mut model: ReleaseModel = toml::from_str(content).map_err(|e| ConfigurationError::ParseError {
            reason: e.to_string(),
        })?;
        model.normalize_names()?;
        Ok(model)
    }

    /// Reads and parses a single file.
    pub fn load_file(&self, path: &Path) -> ConfigurationResult<ReleaseModel> {
        debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigurationError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigurationError::FileAccessError {
                path: path.display().to_string(),
                reason: e.to_string(),
            },
        })?;

        self.parse(&content).map_err(|e| match e {
            ConfigurationError::ParseError { reason } => ConfigurationError::ParseError {
                reason: format!("{}: {}", path.display(), reason),
            },
            other => other,
        })
    }

    /// Loads every file and merges them in order.
    ///
    /// An empty list yields an empty model.
    pub fn load_layers<P: AsRef<Path>>(&self, paths: &[P]) -> ConfigurationResult<ReleaseModel> {
        let mut model = ReleaseModel::default();
        for path in paths {
            let layer = self.load_file(path.as_ref())?;
            model.merge(&layer)?;
        }
        info!("Loaded {} configuration layer(s)", paths.len());
        Ok(model)
    }
}
