//! Repository a packager commits its manifest into.

use serde::Deserialize;

use crate::context::ReleaseContext;
use crate::errors::ConfigurationResult;
use crate::export::{AsMap, ConfigMap, MapWriter};
use crate::freeze::{setters, FreezeState, Freezable};
use crate::merge::{merge_text, non_blank, Merge};
use crate::properties::Properties;
use crate::secrets::{resolve_secret, secret_keys, SecretResolver};

pub const DEFAULT_TAP_BRANCH: &str = "main";
pub const DEFAULT_COMMIT_MESSAGE: &str = "{{distributionName}} {{tagName}}";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tap {
    #[serde(skip)]
    state: FreezeState,
    owner: Option<String>,
    name: Option<String>,
    branch: Option<String>,
    username: Option<String>,
    token: Option<String>,
    commit_message: Option<String>,
}

impl Tap {
    setters! {
        set_owner => owner: String,
        set_name => name: String,
        set_branch => branch: String,
        set_username => username: String,
        set_token => token: String,
        set_commit_message => commit_message: String,
    }

    pub fn owner(&self) -> Option<&str> {
        non_blank(&self.owner)
    }

    /// Repository name, or `default` when none is configured.
    pub fn name_or<'a>(&'a self, default: &'a str) -> &'a str {
        non_blank(&self.name).unwrap_or(default)
    }

    pub fn branch(&self) -> &str {
        non_blank(&self.branch).unwrap_or(DEFAULT_TAP_BRANCH)
    }

    pub fn username(&self) -> Option<&str> {
        non_blank(&self.username)
    }

    pub fn token(&self) -> Option<&str> {
        non_blank(&self.token)
    }

    pub fn commit_message(&self) -> &str {
        non_blank(&self.commit_message).unwrap_or(DEFAULT_COMMIT_MESSAGE)
    }

    pub fn resolved_commit_message(
        &self,
        context: &ReleaseContext,
        props: &Properties,
    ) -> ConfigurationResult<String> {
        context.render(self.commit_message(), props)
    }

    /// Resolves the token from `<PACKAGER>_REPOSITORY_TOKEN`, then
    /// `<PACKAGER>_TOKEN`.
    pub(crate) fn resolve_token(
        &mut self,
        resolver: &dyn SecretResolver,
        packager: &str,
    ) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        self.token = resolve_secret(resolver, packager, Some("repository"), "token", self.token.as_deref());
        Ok(())
    }

    pub(crate) fn token_variables(packager: &str) -> Vec<String> {
        secret_keys(packager, Some("repository"), "token")
    }

    pub(crate) fn write_map(&self, default_name: &str) -> ConfigMap {
        MapWriter::new()
            .put("owner", &self.owner)
            .put("name", self.name_or(default_name))
            .put("branch", self.branch())
            .put("username", &self.username)
            .put_secret("token", self.token.as_deref())
            .put("commit_message", self.commit_message())
            .build()
    }
}

impl Freezable for Tap {
    fn kind(&self) -> &'static str {
        "repository"
    }

    fn freeze_state(&self) -> &FreezeState {
        &self.state
    }

    fn freeze_state_mut(&mut self) -> &mut FreezeState {
        &mut self.state
    }
}

impl Merge for Tap {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        self.ensure_mutable()?;
        merge_text(&mut self.owner, &incoming.owner);
        merge_text(&mut self.name, &incoming.name);
        merge_text(&mut self.branch, &incoming.branch);
        merge_text(&mut self.username, &incoming.username);
        merge_text(&mut self.token, &incoming.token);
        merge_text(&mut self.commit_message, &incoming.commit_message);
        Ok(())
    }
}

impl AsMap for Tap {
    fn as_map(&self, _full: bool) -> ConfigMap {
        self.write_map("")
    }
}
