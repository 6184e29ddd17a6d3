//! GitHub releases.

use serde::Deserialize;

use super::{git_service, GitService, GitServiceCommon, ServiceDefaults};
use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, Freezable};
use crate::merge::{merge_text, merge_value, Merge};

pub const GITHUB_DEFAULTS: ServiceDefaults = ServiceDefaults {
    host: "github.com",
    repo_url: "https://{{repoHost}}/{{repoOwner}}/{{repoName}}",
    commit_url: "https://{{repoHost}}/{{repoOwner}}/{{repoName}}/commits",
    release_notes_url: "https://{{repoHost}}/{{repoOwner}}/{{repoName}}/releases/tag/{{tagName}}",
    latest_release_url: "https://{{repoHost}}/{{repoOwner}}/{{repoName}}/releases/latest",
    download_url: "https://{{repoHost}}/{{repoOwner}}/{{repoName}}/releases/download/{{tagName}}/{{artifactFileName}}",
};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Github {
    #[serde(flatten)]
    pub(crate) common: GitServiceCommon,
    draft: Option<bool>,
    prerelease: Option<bool>,
    discussion_category_name: Option<String>,
}

git_service!(Github, "github", GITHUB_DEFAULTS);

impl Github {
    setters! {
        set_draft => draft: bool,
        set_prerelease => prerelease: bool,
        set_discussion_category_name => discussion_category_name: String,
    }

    pub fn is_draft(&self) -> bool {
        self.draft.unwrap_or(false)
    }

    pub fn is_prerelease(&self) -> bool {
        self.prerelease.unwrap_or(false)
    }

    pub fn discussion_category_name(&self) -> Option<&str> {
        self.discussion_category_name.as_deref()
    }
}

impl Merge for Github {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.common.merge(&incoming.common)?;
        merge_value(&mut self.draft, &incoming.draft);
        merge_value(&mut self.prerelease, &incoming.prerelease);
        merge_text(&mut self.discussion_category_name, &incoming.discussion_category_name);
        Ok(())
    }
}

impl AsMap for Github {
    fn as_map(&self, _full: bool) -> ConfigMap {
        let mut writer = MapWriter::new();
        self.write_common(&mut writer);
        writer
            .put("draft", self.is_draft())
            .put("prerelease", self.is_prerelease())
            .put("discussion_category_name", &self.discussion_category_name);
        writer.build()
    }
}
