//! Codeberg releases. Codeberg runs Forgejo, so URLs follow Gitea.

use serde::Deserialize;

use super::{git_service, GitService, GitServiceCommon, ServiceDefaults};
use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, Freezable};
use crate::merge::{merge_value, Merge};

pub const CODEBERG_DEFAULTS: ServiceDefaults = ServiceDefaults {
    host: "codeberg.org",
    ..super::gitea::GITEA_DEFAULTS
};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Codeberg {
    #[serde(flatten)]
    pub(crate) common: GitServiceCommon,
    draft: Option<bool>,
    prerelease: Option<bool>,
}

git_service!(Codeberg, "codeberg", CODEBERG_DEFAULTS);

impl Codeberg {
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

impl Merge for Codeberg {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.common.merge(&incoming.common)?;
        merge_value(&mut self.draft, &incoming.draft);
        merge_value(&mut self.prerelease, &incoming.prerelease);
        Ok(())
    }
}

impl AsMap for Codeberg {
    fn as_map(&self, _full: bool) -> ConfigMap {
        let mut writer = MapWriter::new();
        self.write_common(&mut writer);
        writer
            .put("draft", self.is_draft())
            .put("prerelease", self.is_prerelease());
        writer.build()
    }
}
