//! # Mustache-style template engine
//!
//! Release configuration strings (archive names, commit messages, URLs,
//! announcement bodies) use double-curly-brace placeholders such as
//! `{{projectVersion}}`. This module renders them through Handlebars, which
//! accepts that syntax, with HTML escaping turned off and missing variables
//! rendered as empty strings.
//!
//! ## Examples
//!
//! ```rust
//! # use template_engine::{TemplateEngine, TemplateContext};
//! # use serde_json::json;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = TemplateEngine::new()?;
//! let context = TemplateContext::new(json!({
//!     "projectName": "app",
//!     "projectVersion": "1.2.0"
//! }));
//!
//! let result = engine.render("{{projectName}}-{{projectVersion}}", &context)?;
//! assert_eq!(result, "app-1.2.0");
//!
//! let tag = engine.render("{{upper_case projectName}}", &context)?;
//! assert_eq!(tag, "APP");
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use handlebars::{handlebars_helper, no_escape, Handlebars, RenderErrorReason};
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::TemplateError;

#[cfg(test)]
#[path = "handlebars_engine_tests.rs"]
mod tests;

fn to_separated(text: &str, separator: char) -> String {
    text.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' | '_' | '.' => separator,
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

handlebars_helper!(snake_case: |text: str| to_separated(text, '_'));
handlebars_helper!(kebab_case: |text: str| to_separated(text, '-'));
handlebars_helper!(upper_case: |text: str| text.to_uppercase());
handlebars_helper!(lower_case: |text: str| text.to_lowercase());
handlebars_helper!(capitalize: |text: str| capitalize_first(text));
handlebars_helper!(default_value: |value: Json, fallback: Json| {
    match value {
        Value::Null => fallback.clone(),
        Value::String(s) if s.trim().is_empty() => fallback.clone(),
        other => other.clone(),
    }
});

/// Variables available while rendering a template.
///
/// Variables are held as a JSON value so entity-computed properties can be
/// strings, booleans, numbers or nested objects.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    pub variables: Value,
}

impl TemplateContext {
    pub fn new(variables: Value) -> Self {
        Self { variables }
    }

    /// Creates a context from an ordered property bag.
    pub fn from_properties(properties: Map<String, Value>) -> Self {
        Self::new(Value::Object(properties))
    }
}

/// Configuration for template rendering behavior.
#[derive(Debug, Clone)]
pub struct TemplateRenderConfig {
    /// Whether to fail on undefined variables (true) or render them empty (false).
    ///
    /// **Default**: `false`, matching Mustache semantics.
    pub strict_variables: bool,

    /// Maximum size of template content in bytes.
    ///
    /// **Default**: 1MB (1,048,576 bytes)
    pub max_template_size: usize,
}

impl Default for TemplateRenderConfig {
    fn default() -> Self {
        Self {
            strict_variables: false,
            max_template_size: 1_048_576,
        }
    }
}

/// Template engine with the release helpers registered.
///
/// Registered helpers: `snake_case`, `kebab_case`, `upper_case`,
/// `lower_case`, `capitalize` and `default_value`.
///
/// The engine is `Send + Sync` and can be shared by every pipeline stage once
/// configuration is frozen.
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
    config: TemplateRenderConfig,
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("config", &self.config)
            .finish()
    }
}

impl TemplateEngine {
    /// Creates an engine with the default configuration.
    pub fn new() -> Result<Self, TemplateError> {
        Self::with_config(TemplateRenderConfig::default())
    }

    /// Creates an engine with a custom configuration.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use template_engine::{TemplateEngine, TemplateRenderConfig};
    ///
    /// let config = TemplateRenderConfig {
    ///     strict_variables: true,
    ///     ..Default::default()
    /// };
    /// let engine = TemplateEngine::with_config(config)?;
    /// assert!(engine.config().strict_variables);
    /// # Ok::<(), template_engine::TemplateError>(())
    /// ```
    pub fn with_config(config: TemplateRenderConfig) -> Result<Self, TemplateError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(config.strict_variables);
        handlebars.register_escape_fn(no_escape);

        handlebars.register_helper("snake_case", Box::new(snake_case));
        handlebars.register_helper("kebab_case", Box::new(kebab_case));
        handlebars.register_helper("upper_case", Box::new(upper_case));
        handlebars.register_helper("lower_case", Box::new(lower_case));
        handlebars.register_helper("capitalize", Box::new(capitalize));
        handlebars.register_helper("default_value", Box::new(default_value));

        Ok(Self { handlebars, config })
    }

    pub fn config(&self) -> &TemplateRenderConfig {
        &self.config
    }

    /// Expands a template string against the given context.
    ///
    /// Rendering is pure: the template string is never modified and the same
    /// template may be rendered repeatedly against different contexts.
    ///
    /// # Errors
    ///
    /// - `TemplateError::ResourceLimit`: the template exceeds the size limit
    /// - `TemplateError::Compilation`: the template syntax is invalid
    /// - `TemplateError::Render`: rendering failed (e.g. a helper rejected its input)
    pub fn render(&self, template: &str, context: &TemplateContext) -> Result<String, TemplateError> {
        if template.len() > self.config.max_template_size {
            return Err(TemplateError::ResourceLimit {
                limit_type: "template_size".to_string(),
                message: format!(
                    "Template size {} bytes exceeds limit of {} bytes",
                    template.len(),
                    self.config.max_template_size
                ),
            });
        }

        self.handlebars
            .render_template(template, &context.variables)
            .map_err(|e| match e.reason() {
                RenderErrorReason::TemplateError(inner) => TemplateError::Compilation {
                    message: inner.to_string(),
                },
                _ => TemplateError::Render {
                    message: e.to_string(),
                },
            })
    }

    /// Reads a template file and expands it against the given context.
    ///
    /// `display_path` is the path as the user wrote it in configuration and is
    /// the one reported in errors.
    ///
    /// # Errors
    ///
    /// - `TemplateError::FileNotFound`: nothing exists at `path`
    /// - `TemplateError::FileUnreadable`: the file cannot be read as UTF-8 text
    /// - any error produced by [`TemplateEngine::render`]
    pub fn render_file(
        &self,
        path: &Path,
        display_path: &str,
        context: &TemplateContext,
    ) -> Result<String, TemplateError> {
        debug!("Reading template file {:?}", path);

        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TemplateError::FileNotFound {
                path: display_path.to_string(),
            },
            _ => TemplateError::FileUnreadable {
                path: display_path.to_string(),
                reason: e.to_string(),
            },
        })?;

        self.render(&content, context)
    }
}
