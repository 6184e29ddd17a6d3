//! Git hosting services that receive the release.
//!
//! At most one service may be configured. Its properties (host, owner, tag
//! and release names, URLs) join the global template property bag.

use serde::Deserialize;
use serde_json::Value;

use crate::artifact::Artifact;
use crate::context::ReleaseContext;
use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{FreezeState, Freezable};
use crate::merge::{merge_optional_model, merge_properties, merge_text, merge_value, non_blank, Merge};
use crate::properties::{ExtraProperties, Properties};
use crate::secrets::{resolve_secret, secret_keys, SecretAware, SecretResolver};

pub mod codeberg;
pub mod generic;
pub mod gitea;
pub mod github;
pub mod gitlab;
pub mod milestone;

pub use codeberg::Codeberg;
pub use generic::GenericGit;
pub use gitea::Gitea;
pub use github::Github;
pub use gitlab::Gitlab;
pub use milestone::Milestone;

#[cfg(test)]
#[path = "release_tests.rs"]
mod tests;

pub const DEFAULT_TAG_NAME: &str = "v{{projectVersion}}";
pub const DEFAULT_RELEASE_NAME: &str = "Release {{tagName}}";
pub const DEFAULT_BRANCH: &str = "main";

/// Per-service defaults for host and URL templates. Empty means no default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceDefaults {
    pub host: &'static str,
    pub repo_url: &'static str,
    pub commit_url: &'static str,
    pub release_notes_url: &'static str,
    pub latest_release_url: &'static str,
    pub download_url: &'static str,
}

/// Fields every git service carries.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GitServiceCommon {
    #[serde(skip)]
    pub(crate) state: FreezeState,
    pub(crate) host: Option<String>,
    pub(crate) owner: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) username: Option<String>,
    pub(crate) token: Option<String>,
    pub(crate) tag_name: Option<String>,
    pub(crate) release_name: Option<String>,
    pub(crate) branch: Option<String>,
    pub(crate) repo_url: Option<String>,
    pub(crate) commit_url: Option<String>,
    pub(crate) release_notes_url: Option<String>,
    pub(crate) latest_release_url: Option<String>,
    pub(crate) download_url: Option<String>,
    pub(crate) skip_tag: Option<bool>,
    pub(crate) skip_release: Option<bool>,
    pub(crate) overwrite: Option<bool>,
    pub(crate) sign: Option<bool>,
    pub(crate) milestone: Milestone,
    pub(crate) extra_properties: Properties,
}

impl GitServiceCommon {
    pub(crate) fn merge(&mut self, incoming: &GitServiceCommon) -> ConfigurationResult<()> {
        merge_text(&mut self.host, &incoming.host);
        merge_text(&mut self.owner, &incoming.owner);
        merge_text(&mut self.name, &incoming.name);
        merge_text(&mut self.username, &incoming.username);
        merge_text(&mut self.token, &incoming.token);
        merge_text(&mut self.tag_name, &incoming.tag_name);
        merge_text(&mut self.release_name, &incoming.release_name);
        merge_text(&mut self.branch, &incoming.branch);
        merge_text(&mut self.repo_url, &incoming.repo_url);
        merge_text(&mut self.commit_url, &incoming.commit_url);
        merge_text(&mut self.release_notes_url, &incoming.release_notes_url);
        merge_text(&mut self.latest_release_url, &incoming.latest_release_url);
        merge_text(&mut self.download_url, &incoming.download_url);
        merge_value(&mut self.skip_tag, &incoming.skip_tag);
        merge_value(&mut self.skip_release, &incoming.skip_release);
        merge_value(&mut self.overwrite, &incoming.overwrite);
        merge_value(&mut self.sign, &incoming.sign);
        self.milestone.merge(&incoming.milestone)?;
        merge_properties(&mut self.extra_properties, &incoming.extra_properties);
        Ok(())
    }

    pub(crate) fn resolve_token(&mut self, resolver: &dyn SecretResolver, service: &str) {
        self.token = resolve_secret(resolver, service, None, "token", self.token.as_deref());
    }
}

/// A git hosting service that tags and publishes the release.
pub trait GitService: ExtraProperties + AsMap {
    fn common(&self) -> &GitServiceCommon;

    fn defaults(&self) -> &'static ServiceDefaults;

    fn host(&self) -> &str {
        non_blank(&self.common().host).unwrap_or(self.defaults().host)
    }

    fn owner(&self) -> &str {
        non_blank(&self.common().owner).unwrap_or_default()
    }

    fn name(&self) -> &str {
        non_blank(&self.common().name).unwrap_or_default()
    }

    /// Account used for git operations, defaulting to the owner.
    fn username(&self) -> &str {
        non_blank(&self.common().username).unwrap_or(self.owner())
    }

    fn token(&self) -> Option<&str> {
        non_blank(&self.common().token)
    }

    fn branch(&self) -> &str {
        non_blank(&self.common().branch).unwrap_or(DEFAULT_BRANCH)
    }

    fn tag_name(&self) -> &str {
        non_blank(&self.common().tag_name).unwrap_or(DEFAULT_TAG_NAME)
    }

    fn release_name(&self) -> &str {
        non_blank(&self.common().release_name).unwrap_or(DEFAULT_RELEASE_NAME)
    }

    fn repo_url(&self) -> &str {
        non_blank(&self.common().repo_url).unwrap_or(self.defaults().repo_url)
    }

    fn commit_url(&self) -> &str {
        non_blank(&self.common().commit_url).unwrap_or(self.defaults().commit_url)
    }

    fn release_notes_url(&self) -> &str {
        non_blank(&self.common().release_notes_url).unwrap_or(self.defaults().release_notes_url)
    }

    fn latest_release_url(&self) -> &str {
        non_blank(&self.common().latest_release_url).unwrap_or(self.defaults().latest_release_url)
    }

    fn download_url(&self) -> &str {
        non_blank(&self.common().download_url).unwrap_or(self.defaults().download_url)
    }

    fn is_skip_tag(&self) -> bool {
        self.common().skip_tag.unwrap_or(false)
    }

    fn is_skip_release(&self) -> bool {
        self.common().skip_release.unwrap_or(false)
    }

    fn is_overwrite(&self) -> bool {
        self.common().overwrite.unwrap_or(false)
    }

    fn is_sign(&self) -> bool {
        self.common().sign.unwrap_or(false)
    }

    fn milestone(&self) -> &Milestone {
        &self.common().milestone
    }

    /// Repository, tag, release, milestone and URL properties.
    ///
    /// Expanded against the project properties only, so these values can be
    /// referenced by every other template.
    fn props(&self, context: &ReleaseContext) -> ConfigurationResult<Properties> {
        let mut props = context.project_props();
        let owner = self.owner().to_string();
        let name = self.name().to_string();

        props.insert("repoHost".into(), Value::String(self.host().to_string()));
        props.insert("repoOwner".into(), Value::String(owner.clone()));
        props.insert("repoName".into(), Value::String(name.clone()));
        props.insert("repoBranch".into(), Value::String(self.branch().to_string()));
        props.insert("repoCanonicalName".into(), Value::String(format!("{owner}/{name}")));
        props.extend(self.resolved_extra_properties());

        let tag_name = context.render(self.tag_name(), &props)?;
        props.insert("tagName".into(), Value::String(tag_name));
        let release_name = context.render(self.release_name(), &props)?;
        props.insert("releaseName".into(), Value::String(release_name));
        let milestone = self.milestone().resolved_name(context, &props)?;
        props.insert("milestoneName".into(), Value::String(milestone));

        for (key, template) in [
            ("repoUrl", self.repo_url()),
            ("commitsUrl", self.commit_url()),
            ("releaseNotesUrl", self.release_notes_url()),
            ("latestReleaseUrl", self.latest_release_url()),
        ] {
            if !template.trim().is_empty() {
                let url = context.render(template, &props)?;
                props.insert(key.into(), Value::String(url));
            }
        }
        Ok(props)
    }

    /// Public download URL of `artifact` once attached to the release.
    fn resolved_download_url(&self, context: &ReleaseContext, artifact: &Artifact) -> ConfigurationResult<String> {
        let mut props = context.props()?;
        props.extend(artifact.props());
        context.render(self.download_url(), &props)
    }

    /// Writes the shared fields in export order.
    fn write_common(&self, writer: &mut MapWriter) {
        let common = self.common();
        writer
            .put("host", self.host())
            .put("owner", self.owner())
            .put("name", self.name())
            .put("username", self.username())
            .put_secret("token", common.token.as_deref())
            .put("branch", self.branch())
            .put("tag_name", self.tag_name())
            .put("release_name", self.release_name())
            .put("repo_url", self.repo_url())
            .put("commit_url", self.commit_url())
            .put("release_notes_url", self.release_notes_url())
            .put("latest_release_url", self.latest_release_url())
            .put("download_url", self.download_url())
            .put("skip_tag", self.is_skip_tag())
            .put("skip_release", self.is_skip_release())
            .put("overwrite", self.is_overwrite())
            .put("sign", self.is_sign())
            .put_child("milestone", common.milestone.as_map(true))
            .put("extra_properties", &common.extra_properties);
    }
}

/// Implements `Freezable`, `ExtraProperties` and `GitService` for a struct
/// with a `common: GitServiceCommon` field.
macro_rules! git_service {
    ($ty:ty, $kind:literal, $defaults:expr) => {
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
                visitor(&mut self.common.milestone);
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

        impl $crate::release::GitService for $ty {
            fn common(&self) -> &$crate::release::GitServiceCommon {
                &self.common
            }

            fn defaults(&self) -> &'static $crate::release::ServiceDefaults {
                &$defaults
            }
        }

        impl $ty {
            $crate::freeze::setters! {
                set_host => common.host: String,
                set_owner => common.owner: String,
                set_name => common.name: String,
                set_username => common.username: String,
                set_token => common.token: String,
                set_tag_name => common.tag_name: String,
                set_release_name => common.release_name: String,
                set_branch => common.branch: String,
                set_repo_url => common.repo_url: String,
                set_commit_url => common.commit_url: String,
                set_release_notes_url => common.release_notes_url: String,
                set_latest_release_url => common.latest_release_url: String,
                set_download_url => common.download_url: String,
                set_skip_tag => common.skip_tag: bool,
                set_skip_release => common.skip_release: bool,
                set_overwrite => common.overwrite: bool,
                set_sign => common.sign: bool,
            }

            pub fn milestone_mut(&mut self) -> $crate::errors::ConfigurationResult<&mut $crate::release::Milestone> {
                $crate::freeze::Freezable::ensure_mutable(self)?;
                Ok(&mut self.common.milestone)
            }
        }

        impl $crate::secrets::SecretAware for $ty {
            fn resolve_secrets(
                &mut self,
                resolver: &dyn $crate::secrets::SecretResolver,
            ) -> $crate::errors::ConfigurationResult<()> {
                $crate::freeze::Freezable::ensure_mutable(self)?;
                self.common.resolve_token(resolver, $kind);
                Ok(())
            }

            fn secret_variables(&self) -> Vec<String> {
                $crate::secrets::secret_keys($kind, None, "token")
            }
        }
    };
}

pub(crate) use git_service;

/// The release target. At most one service may be set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Release {
    #[serde(skip)]
    state: FreezeState,
    github: Option<Github>,
    gitlab: Option<Gitlab>,
    gitea: Option<Gitea>,
    codeberg: Option<Codeberg>,
    generic: Option<GenericGit>,
}

impl Release {
    pub fn github(&self) -> Option<&Github> {
        self.github.as_ref()
    }

    pub fn gitlab(&self) -> Option<&Gitlab> {
        self.gitlab.as_ref()
    }

    pub fn gitea(&self) -> Option<&Gitea> {
        self.gitea.as_ref()
    }

    pub fn codeberg(&self) -> Option<&Codeberg> {
        self.codeberg.as_ref()
    }

    pub fn generic(&self) -> Option<&GenericGit> {
        self.generic.as_ref()
    }

    pub fn set_github(&mut self, service: Github) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.github = Some(service);
        Ok(())
    }

    pub fn set_gitlab(&mut self, service: Gitlab) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.gitlab = Some(service);
        Ok(())
    }

    pub fn set_gitea(&mut self, service: Gitea) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.gitea = Some(service);
        Ok(())
    }

    pub fn set_codeberg(&mut self, service: Codeberg) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.codeberg = Some(service);
        Ok(())
    }

    pub fn set_generic(&mut self, service: GenericGit) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.generic = Some(service);
        Ok(())
    }

    fn configured(&self) -> Vec<&dyn GitService> {
        let mut services: Vec<&dyn GitService> = Vec::new();
        if let Some(service) = &self.github {
            services.push(service);
        }
        if let Some(service) = &self.gitlab {
            services.push(service);
        }
        if let Some(service) = &self.gitea {
            services.push(service);
        }
        if let Some(service) = &self.codeberg {
            services.push(service);
        }
        if let Some(service) = &self.generic {
            services.push(service);
        }
        services
    }

    /// Fails when more than one service is configured.
    pub fn validate(&self) -> ConfigurationResult<()> {
        let services = self.configured();
        if services.len() > 1 {
            return Err(ConfigurationError::MultipleReleaseServices {
                services: services.iter().map(|s| s.kind().to_string()).collect(),
            });
        }
        Ok(())
    }

    /// The configured service, if any.
    pub fn service(&self) -> Option<&dyn GitService> {
        self.configured().into_iter().next()
    }
}

impl Freezable for Release {
    fn kind(&self) -> &'static str {
        "release"
    }

    fn freeze_state(&self) -> &FreezeState {
        &self.state
    }

    fn freeze_state_mut(&mut self) -> &mut FreezeState {
        &mut self.state
    }

    fn visit_children(&mut self, visitor: &mut dyn FnMut(&mut dyn Freezable)) {
        if let Some(service) = &mut self.github {
            visitor(service);
        }
        if let Some(service) = &mut self.gitlab {
            visitor(service);
        }
        if let Some(service) = &mut self.gitea {
            visitor(service);
        }
        if let Some(service) = &mut self.codeberg {
            visitor(service);
        }
        if let Some(service) = &mut self.generic {
            visitor(service);
        }
    }
}

impl Merge for Release {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        merge_optional_model(&mut self.github, &incoming.github)?;
        merge_optional_model(&mut self.gitlab, &incoming.gitlab)?;
        merge_optional_model(&mut self.gitea, &incoming.gitea)?;
        merge_optional_model(&mut self.codeberg, &incoming.codeberg)?;
        merge_optional_model(&mut self.generic, &incoming.generic)
    }
}

impl SecretAware for Release {
    fn resolve_secrets(&mut self, resolver: &dyn SecretResolver) -> ConfigurationResult<()> {
        if let Some(service) = &mut self.github {
            service.resolve_secrets(resolver)?;
        }
        if let Some(service) = &mut self.gitlab {
            service.resolve_secrets(resolver)?;
        }
        if let Some(service) = &mut self.gitea {
            service.resolve_secrets(resolver)?;
        }
        if let Some(service) = &mut self.codeberg {
            service.resolve_secrets(resolver)?;
        }
        if let Some(service) = &mut self.generic {
            service.resolve_secrets(resolver)?;
        }
        Ok(())
    }

    fn secret_variables(&self) -> Vec<String> {
        let mut variables = Vec::new();
        for service in self.configured() {
            variables.extend(secret_keys(service.kind(), None, "token"));
        }
        variables
    }
}

impl AsMap for Release {
    fn as_map(&self, full: bool) -> ConfigMap {
        let mut writer = MapWriter::new();
        if let Some(service) = &self.github {
            writer.put_child("github", service.as_map(full));
        }
        if let Some(service) = &self.gitlab {
            writer.put_child("gitlab", service.as_map(full));
        }
        if let Some(service) = &self.gitea {
            writer.put_child("gitea", service.as_map(full));
        }
        if let Some(service) = &self.codeberg {
            writer.put_child("codeberg", service.as_map(full));
        }
        if let Some(service) = &self.generic {
            writer.put_child("generic", service.as_map(full));
        }
        writer.build()
    }
}
