//! Release configuration model for relkit.
//!
//! The model is a tree of entities (project, release target, announcers,
//! packagers, uploaders, downloaders, signing, hooks, assemblers and
//! distributions) loaded from layered TOML files. Every entity follows the
//! same lifecycle:
//!
//! 1. layers are merged ([`Merge`]),
//! 2. secrets are resolved from the environment ([`SecretAware`]),
//! 3. enablement is derived from each entity's [`Active`] policy,
//! 4. the tree is frozen ([`Freezable`]) and shared read-only through a
//!    [`ReleaseContext`], which expands `{{placeholder}}` templates.

pub mod active;
pub mod announce;
pub mod archive;
pub mod artifact;
pub mod context;
pub mod distribution;
pub mod download;
pub mod errors;
pub mod export;
pub mod freeze;
pub mod hooks;
pub mod loader;
pub mod merge;
pub mod model;
pub mod packagers;
pub mod project;
pub mod properties;
pub mod release;
pub mod secrets;
pub mod signing;
pub mod timeout;
pub mod upload;

pub use active::{Activatable, Active, Activation};
pub use context::ReleaseContext;
pub use errors::{ConfigurationError, ConfigurationResult};
pub use export::{AsMap, ConfigMap, HIDE, UNSET};
pub use freeze::Freezable;
pub use loader::ConfigLoader;
pub use merge::Merge;
pub use model::ReleaseModel;
pub use project::Project;
pub use properties::{ExtraProperties, Properties};
pub use secrets::{EnvironmentSecretResolver, MapSecretResolver, SecretAware, SecretResolver};
pub use timeout::TimeoutAware;

#[cfg(test)]
mod test_support;
