//! Resolution context shared by every template-producing accessor.
//!
//! A [`ReleaseContext`] owns the validated configuration tree. Building one
//! resolves secrets, derives enablement and freezes the model, so everything
//! reachable from [`ReleaseContext::model`] is read-only.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use template_engine::{TemplateContext, TemplateEngine};
use tracing::{debug, info};

use crate::errors::ConfigurationResult;
use crate::freeze::Freezable;
use crate::model::ReleaseModel;
use crate::properties::Properties;
use crate::secrets::{EnvironmentSecretResolver, SecretAware, SecretResolver};

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;

pub struct ReleaseContext {
    base_dir: PathBuf,
    model: ReleaseModel,
    engine: TemplateEngine,
    resolver: Box<dyn SecretResolver>,
    timestamp: DateTime<Utc>,
}

impl ReleaseContext {
    /// Builds a context that reads secrets from the process environment.
    pub fn new(base_dir: impl Into<PathBuf>, model: ReleaseModel) -> ConfigurationResult<Self> {
        Self::with_resolver(base_dir, model, Box::new(EnvironmentSecretResolver::new()))
    }

    /// Builds a context with an explicit secret source.
    ///
    /// # Errors
    ///
    /// Fails with `ConfigurationError::Immutable` if `model` is already frozen,
    /// and with `MultipleReleaseServices` if more than one release target is
    /// configured.
    pub fn with_resolver(
        base_dir: impl Into<PathBuf>,
        mut model: ReleaseModel,
        resolver: Box<dyn SecretResolver>,
    ) -> ConfigurationResult<Self> {
        model.release().validate()?;
        model.resolve_secrets(resolver.as_ref())?;
        model.resolve_enabled()?;
        model.freeze();
        info!("Release model resolved and frozen");

        Ok(Self {
            base_dir: base_dir.into(),
            model,
            engine: TemplateEngine::new()?,
            resolver,
            timestamp: Utc::now(),
        })
    }

    pub fn model(&self) -> &ReleaseModel {
        &self.model
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn resolver(&self) -> &dyn SecretResolver {
        self.resolver.as_ref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Project properties plus the run timestamp.
    pub fn project_props(&self) -> Properties {
        let mut props = self.model.project().props();
        props.insert(
            "timestamp".into(),
            Value::String(self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        props
    }

    /// The global property bag: project, release service and timestamp.
    pub fn props(&self) -> ConfigurationResult<Properties> {
        let mut props = self.project_props();
        if let Some(service) = self.model.release().service() {
            props.extend(service.props(self)?);
        }
        Ok(props)
    }

    /// Expands `template` against `props`.
    pub fn render(&self, template: &str, props: &Properties) -> ConfigurationResult<String> {
        let context = TemplateContext::from_properties(props.clone());
        Ok(self.engine.render(template, &context)?)
    }

    /// Reads a template file relative to the base directory and expands it.
    pub fn render_file(&self, relative_path: &str, props: &Properties) -> ConfigurationResult<String> {
        let path = self.base_dir.join(relative_path);
        debug!("Rendering template file {}", path.display());
        let context = TemplateContext::from_properties(props.clone());
        Ok(self.engine.render_file(&path, relative_path, &context)?)
    }
}

impl fmt::Debug for ReleaseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseContext")
            .field("base_dir", &self.base_dir)
            .field("model", &self.model)
            .field("timestamp", &self.timestamp)
            .finish_non_exhaustive()
    }
}
