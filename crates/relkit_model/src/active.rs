//! Active policy and derived enablement.
//!
//! Every entity that participates in the release pipeline carries an
//! [`Active`] policy. The derived `enabled` flag is computed once per
//! validation pass by [`Activatable::resolve_enabled`] and is never read from
//! configuration input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::freeze::Freezable;
use crate::project::Project;

#[cfg(test)]
#[path = "active_tests.rs"]
mod tests;

/// When an entity takes part in a release run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Active {
    Always,
    Never,
    Release,
    Snapshot,
}

impl Active {
    pub const ALL: [Active; 4] = [
        Active::Always,
        Active::Never,
        Active::Release,
        Active::Snapshot,
    ];

    /// Parses a policy name, ignoring case and surrounding whitespace.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use relkit_model::Active;
    ///
    /// assert_eq!(Active::parse(" release ").unwrap(), Active::Release);
    /// assert!(Active::parse("sometimes").is_err());
    /// ```
    pub fn parse(value: &str) -> ConfigurationResult<Self> {
        let normalized = value.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|active| active.as_str() == normalized)
            .ok_or_else(|| ConfigurationError::InvalidValue {
                field: "active".to_string(),
                value: value.to_string(),
                reason: "expected one of ALWAYS, NEVER, RELEASE, SNAPSHOT".to_string(),
            })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Active::Always => "ALWAYS",
            Active::Never => "NEVER",
            Active::Release => "RELEASE",
            Active::Snapshot => "SNAPSHOT",
        }
    }

    /// Evaluates the policy against the project's release state.
    pub fn check(&self, project: &Project) -> bool {
        match self {
            Active::Always => true,
            Active::Never => false,
            Active::Release => project.is_release(),
            Active::Snapshot => project.is_snapshot(),
        }
    }
}

impl fmt::Display for Active {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Active {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl FromStr for Active {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Active {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Configured policy plus the derived enabled flag.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Activation {
    pub(crate) active: Option<Active>,

    #[serde(skip)]
    pub(crate) enabled: bool,
}

impl Activation {
    pub fn active(&self) -> Option<Active> {
        self.active
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Takes the incoming policy when set. The derived flag is not merged.
    pub fn merge(&mut self, incoming: &Activation) {
        if incoming.active.is_some() {
            self.active = incoming.active;
        }
    }
}

/// Entities whose participation is controlled by an [`Active`] policy.
pub trait Activatable: Freezable {
    fn activation(&self) -> &Activation;

    fn activation_mut(&mut self) -> &mut Activation;

    /// Policy applied when none was configured.
    fn default_active(&self) -> Active {
        Active::Never
    }

    /// Whether the entity may run when the project is a snapshot.
    fn supports_snapshot(&self) -> bool {
        true
    }

    fn active(&self) -> Option<Active> {
        self.activation().active
    }

    fn is_enabled(&self) -> bool {
        self.activation().enabled
    }

    fn set_active(&mut self, active: Active) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.activation_mut().active = Some(active);
        Ok(())
    }

    /// Evaluates the policy against `project` and stores the result.
    ///
    /// An unset policy is replaced by [`Activatable::default_active`]. The
    /// entity is forced off when the project is a snapshot and the entity does
    /// not support snapshots.
    fn resolve_enabled(&mut self, project: &Project) -> ConfigurationResult<bool> {
        self.ensure_mutable()?;

        let active = match self.active() {
            Some(active) => active,
            None => {
                let fallback = self.default_active();
                self.activation_mut().active = Some(fallback);
                fallback
            }
        };

        let mut enabled = active.check(project);
        if enabled && project.is_snapshot() && !self.supports_snapshot() {
            debug!("{} does not support snapshot releases", self.kind());
            enabled = false;
        }

        self.activation_mut().enabled = enabled;
        debug!("{} active={} enabled={}", self.kind(), active, enabled);
        Ok(enabled)
    }

    /// Unconditionally switches the entity off.
    fn disable(&mut self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        let activation = self.activation_mut();
        activation.active = Some(Active::Never);
        activation.enabled = false;
        Ok(())
    }
}
