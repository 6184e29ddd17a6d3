//! Gitea releases on a self-hosted instance.

use serde::Deserialize;

use super::{git_service, GitService, GitServiceCommon, ServiceDefaults};
use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, Freezable};
use crate::merge::{merge_value, Merge};

/// Gitea has no canonical host; it must be configured.
pub const GITEA_DEFAULTS: ServiceDefaults = ServiceDefaults {
    host: "",
    repo_url: "https://{{repoHost}}/{{repoOwner}}/{{repoName}}",
    commit_url: "https://{{repoHost}}/{{repoOwner}}/{{repoName}}/commits",
    release_notes_url: "https://{{repoHost}}/{{repoOwner}}/{{repoName}}/releases/tag/{{tagName}}",
    latest_release_url: "https://{{repoHost}}/{{repoOwner}}/{{repoName}}/releases/latest",
    download_url: "https://{{repoHost}}/{{repoOwner}}/{{repoName}}/releases/download/{{tagName}}/{{artifactFileName}}",
};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Gitea {
    #[serde(flatten)]
    pub(crate) common: GitServiceCommon,
    draft: Option<bool>,
    prerelease: Option<bool>,
}

git_service!(Gitea, "gitea", GITEA_DEFAULTS);

impl Gitea {
    setters! {
        set_draft => draft: bool,
        set_prerelease => prerelease: bool,
    }

    pub fn is_draft(&self) -> bool {
        self.draft.unwrap_or(false)
    }

    pub fn is_prerelease(&self) -> bool {
        self.prerelease.unwrap_or(false)
    }
}

impl Merge for Gitea {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.common.merge(&incoming.common)?;
        merge_value(&mut self.draft, &incoming.draft);
        merge_value(&mut self.prerelease, &incoming.prerelease);
        Ok(())
    }
}

impl AsMap for Gitea {
    fn as_map(&self, _full: bool) -> ConfigMap {
        let mut writer = MapWriter::new();
        self.write_common(&mut writer);
        writer
            .put("draft", self.is_draft())
            .put("prerelease", self.is_prerelease());
        writer.build()
    }
}
