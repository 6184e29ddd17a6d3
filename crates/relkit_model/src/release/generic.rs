//! Plain git remotes without a release API.

use serde::Deserialize;

use super::{git_service, GitService, GitServiceCommon, ServiceDefaults};
use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::Freezable;
use crate::merge::Merge;

/// No defaults: every URL must be configured explicitly.
pub const GENERIC_DEFAULTS: ServiceDefaults = ServiceDefaults {
    host: "",
    repo_url: "",
    commit_url: "",
    release_notes_url: "",
    latest_release_url: "",
    download_url: "",
};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenericGit {
    #[serde(flatten)]
    pub(crate) common: GitServiceCommon,
}

git_service!(GenericGit, "generic", GENERIC_DEFAULTS);

impl Merge for GenericGit {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.common.merge(&incoming.common)
    }
}

impl AsMap for GenericGit {
    fn as_map(&self, _full: bool) -> ConfigMap {
        let mut writer = MapWriter::new();
        self.write_common(&mut writer);
        writer.build()
    }
}
