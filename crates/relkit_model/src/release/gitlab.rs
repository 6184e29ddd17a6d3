//! GitLab releases.

use serde::Deserialize;

use super::{git_service, GitService, GitServiceCommon, ServiceDefaults};
use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, Freezable};
use crate::merge::{merge_text, Merge};

pub const GITLAB_DEFAULTS: ServiceDefaults = ServiceDefaults {
    host: "gitlab.com",
    repo_url: "https://{{repoHost}}/{{repoOwner}}/{{repoName}}",
    commit_url: "https://{{repoHost}}/{{repoOwner}}/{{repoName}}/-/commits",
    release_notes_url: "https://{{repoHost}}/{{repoOwner}}/{{repoName}}/-/releases/{{tagName}}",
    latest_release_url: "https://{{repoHost}}/{{repoOwner}}/{{repoName}}/-/releases/permalink/latest",
    download_url: "https://{{repoHost}}/{{repoOwner}}/{{repoName}}/-/releases/{{tagName}}/downloads/{{artifactFileName}}",
};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Gitlab {
    #[serde(flatten)]
    pub(crate) common: GitServiceCommon,
    project_identifier: Option<String>,
}

git_service!(Gitlab, "gitlab", GITLAB_DEFAULTS);

impl Gitlab {
    setters! {
        set_project_identifier => project_identifier: String,
    }

    /// Numeric project id or `owner/name` path used by the API.
    pub fn project_identifier(&self) -> String {
        match self.project_identifier.as_deref().filter(|id| !id.trim().is_empty()) {
            Some(id) => id.to_string(),
            None => format!("{}/{}", self.owner(), GitService::name(self)),
        }
    }
}

impl Merge for Gitlab {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.common.merge(&incoming.common)?;
        merge_text(&mut self.project_identifier, &incoming.project_identifier);
        Ok(())
    }
}

impl AsMap for Gitlab {
    fn as_map(&self, _full: bool) -> ConfigMap {
        let mut writer = MapWriter::new();
        self.write_common(&mut writer);
        writer.put("project_identifier", self.project_identifier());
        writer.build()
    }
}
