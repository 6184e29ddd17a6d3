//! Packagers publish a distribution to a package repository.
//!
//! Packager settings exist at two levels: project-wide defaults and a
//! per-distribution overlay. During resolution the overlay is merged over
//! the defaults, and each packager is enabled only if its policy allows it
//! and it can handle the distribution's type, platform and artifacts.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::active::{Activatable, Active, Activation};
use crate::artifact::Artifact;
use crate::distribution::{Distribution, DistributionType};
use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{FreezeState, Freezable};
use crate::merge::{merge_properties, merge_text, merge_value, Merge};
use crate::project::Project;
use crate::properties::{ExtraProperties, Properties};
use crate::secrets::{SecretAware, SecretResolver};

pub mod chocolatey;
pub mod jbang;
pub mod scoop;
pub mod tap;

pub use chocolatey::Chocolatey;
pub use jbang::Jbang;
pub use scoop::Scoop;
pub use tap::Tap;

#[cfg(test)]
#[path = "packagers_tests.rs"]
mod tests;

/// Environment variable overriding the default policy of every packager.
pub const DEFAULT_PACKAGER_ACTIVE: &str = "DEFAULT_PACKAGER_ACTIVE";

/// Artifact extensions a packager accepts, per distribution type.
pub type SupportTable = &'static [(DistributionType, &'static [&'static str])];

/// Policy for packagers without an explicit `active` setting.
///
/// Read from [`DEFAULT_PACKAGER_ACTIVE`], falling back to `NEVER` when the
/// variable is unset or invalid.
pub fn default_packager_active() -> Active {
    match std::env::var(DEFAULT_PACKAGER_ACTIVE) {
        Ok(value) => Active::parse(&value).unwrap_or_else(|e| {
            warn!("Ignoring {}: {}", DEFAULT_PACKAGER_ACTIVE, e);
            Active::Never
        }),
        Err(_) => Active::Never,
    }
}

/// Fields every packager carries.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PackagerCommon {
    #[serde(skip)]
    pub(crate) state: FreezeState,
    #[serde(flatten)]
    pub(crate) activation: Activation,
    pub(crate) continue_on_error: Option<bool>,
    pub(crate) download_url: Option<String>,
    pub(crate) extra_properties: Properties,
}

impl PackagerCommon {
    pub(crate) fn merge(&mut self, incoming: &PackagerCommon) {
        self.activation.merge(&incoming.activation);
        merge_value(&mut self.continue_on_error, &incoming.continue_on_error);
        merge_text(&mut self.download_url, &incoming.download_url);
        merge_properties(&mut self.extra_properties, &incoming.extra_properties);
    }

    pub(crate) fn write_head(&self, writer: &mut MapWriter) {
        writer
            .put("enabled", self.activation.is_enabled())
            .put("active", self.activation.active())
            .put("continue_on_error", self.continue_on_error.unwrap_or(false))
            .put("download_url", &self.download_url);
    }
}

/// A packager that can be resolved against a distribution.
pub trait Packager: Activatable + ExtraProperties + AsMap {
    /// Accepted artifact extensions per distribution type.
    fn supported(&self) -> SupportTable;

    /// Whether an artifact built for `artifact.platform()` can be packaged.
    fn supports_platform(&self, _artifact: &Artifact) -> bool {
        true
    }

    fn supports_distribution_type(&self, distribution_type: DistributionType) -> bool {
        self.supported().iter().any(|(kind, _)| *kind == distribution_type)
    }

    /// Artifacts of `distribution` this packager can publish.
    fn candidate_artifacts<'a>(&self, distribution: &'a Distribution) -> Vec<&'a Artifact> {
        let Some(kind) = distribution.distribution_type() else {
            return Vec::new();
        };
        let extensions = self
            .supported()
            .iter()
            .find(|(supported, _)| *supported == kind)
            .map(|(_, extensions)| *extensions)
            .unwrap_or_default();

        distribution
            .artifacts()
            .iter()
            .filter(|artifact| extensions.iter().any(|ext| *ext == artifact.extension()))
            .filter(|artifact| self.supports_platform(artifact))
            .collect()
    }

    /// Resolves the policy, then switches the packager off if it cannot
    /// handle `distribution`.
    fn resolve_enabled_for(
        &mut self,
        project: &Project,
        distribution: &Distribution,
    ) -> ConfigurationResult<bool> {
        let mut enabled = self.resolve_enabled(project)?;
        if enabled {
            let supported = distribution
                .distribution_type()
                .is_some_and(|kind| self.supports_distribution_type(kind));
            if !supported || self.candidate_artifacts(distribution).is_empty() {
                debug!(
                    "{} cannot package distribution {}",
                    self.kind(),
                    distribution.name()
                );
                enabled = false;
            }
        }
        self.activation_mut().enabled = enabled;
        Ok(enabled)
    }

    /// Distribution and global properties overlaid with this packager's
    /// extra properties.
    fn packager_props(&self, global: &Properties, distribution: &Distribution) -> Properties {
        let mut props = global.clone();
        props.extend(distribution.props());
        props.extend(self.resolved_extra_properties());
        props
    }
}

/// Implements the capability traits for a struct with a `common:
/// PackagerCommon` field.
macro_rules! packager {
    ($ty:ty, $kind:literal, snapshots: $snapshots:literal) => {
        impl $crate::freeze::Freezable for $ty {
            fn kind(&self) -> &'static str {
                $kind
            }

            fn freeze_state(&self) -> &$crate::freeze::FreezeState {
                &self.common.state
            }

            fn freeze_state_mut(&mut self) -> &mut $crate::freeze::FreezeState {
                &mut self.common.state
            }

            fn visit_children(&mut self, visitor: &mut dyn FnMut(&mut dyn $crate::freeze::Freezable)) {
                visitor(&mut self.repository);
            }
        }

        impl $crate::active::Activatable for $ty {
            fn activation(&self) -> &$crate::active::Activation {
                &self.common.activation
            }

            fn activation_mut(&mut self) -> &mut $crate::active::Activation {
                &mut self.common.activation
            }

            fn default_active(&self) -> $crate::active::Active {
                $crate::packagers::default_packager_active()
            }

            fn supports_snapshot(&self) -> bool {
                $snapshots
            }
        }

        impl $crate::properties::ExtraProperties for $ty {
            fn prefix(&self) -> &str {
                $kind
            }

            fn extra_properties(&self) -> &$crate::properties::Properties {
                &self.common.extra_properties
            }

            fn extra_properties_slot(&mut self) -> &mut $crate::properties::Properties {
                &mut self.common.extra_properties
            }
        }
    };
}

pub(crate) use packager;

/// The packagers known to a project or distribution.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Packagers {
    #[serde(skip)]
    state: FreezeState,
    chocolatey: Chocolatey,
    jbang: Jbang,
    scoop: Scoop,
}

impl Packagers {
    pub fn chocolatey(&self) -> &Chocolatey {
        &self.chocolatey
    }

    pub fn chocolatey_mut(&mut self) -> ConfigurationResult<&mut Chocolatey> {
        self.ensure_mutable()?;
        Ok(&mut self.chocolatey)
    }

    pub fn jbang(&self) -> &Jbang {
        &self.jbang
    }

    pub fn jbang_mut(&mut self) -> ConfigurationResult<&mut Jbang> {
        self.ensure_mutable()?;
        Ok(&mut self.jbang)
    }

    pub fn scoop(&self) -> &Scoop {
        &self.scoop
    }

    pub fn scoop_mut(&mut self) -> ConfigurationResult<&mut Scoop> {
        self.ensure_mutable()?;
        Ok(&mut self.scoop)
    }

    /// Resolves every packager against `distribution`. A disabled
    /// distribution disables all of them.
    pub fn resolve_enabled_for(
        &mut self,
        project: &Project,
        distribution: &Distribution,
        distribution_enabled: bool,
    ) -> ConfigurationResult<()> {
        if !distribution_enabled {
            self.chocolatey.disable()?;
            self.jbang.disable()?;
            self.scoop.disable()?;
            return Ok(());
        }
        self.chocolatey.resolve_enabled_for(project, distribution)?;
        self.jbang.resolve_enabled_for(project, distribution)?;
        self.scoop.resolve_enabled_for(project, distribution)?;
        Ok(())
    }

    pub fn has_enabled_packagers(&self) -> bool {
        self.chocolatey.is_enabled() || self.jbang.is_enabled() || self.scoop.is_enabled()
    }
}

impl Freezable for Packagers {
    fn kind(&self) -> &'static str {
        "packagers"
    }

    fn freeze_state(&self) -> &FreezeState {
        &self.state
    }

    fn freeze_state_mut(&mut self) -> &mut FreezeState {
        &mut self.state
    }

    fn visit_children(&mut self, visitor: &mut dyn FnMut(&mut dyn Freezable)) {
        visitor(&mut self.chocolatey);
        visitor(&mut self.jbang);
        visitor(&mut self.scoop);
    }
}

impl Merge for Packagers {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.chocolatey.merge(&incoming.chocolatey)?;
        self.jbang.merge(&incoming.jbang)?;
        self.scoop.merge(&incoming.scoop)
    }
}

impl SecretAware for Packagers {
    fn resolve_secrets(&mut self, resolver: &dyn SecretResolver) -> ConfigurationResult<()> {
        self.chocolatey.resolve_secrets(resolver)?;
        self.jbang.resolve_secrets(resolver)?;
        self.scoop.resolve_secrets(resolver)
    }

    fn secret_variables(&self) -> Vec<String> {
        let mut variables = self.chocolatey.secret_variables();
        variables.extend(self.jbang.secret_variables());
        variables.extend(self.scoop.secret_variables());
        variables
    }
}

impl AsMap for Packagers {
    fn as_map(&self, full: bool) -> ConfigMap {
        MapWriter::new()
            .put_child("chocolatey", self.chocolatey.as_map(full))
            .put_child("jbang", self.jbang.as_map(full))
            .put_child("scoop", self.scoop.as_map(full))
            .build()
    }
}
