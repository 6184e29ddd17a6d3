use super::*;
use crate::secrets::MapSecretResolver;
use crate::test_support::{context, context_in, model};

fn github() -> Github {
    let mut github = Github::default();
    github.set_owner("acme").unwrap();
    github.set_name("app").unwrap();
    github
}

#[test]
fn test_github_defaults() {
    let github = github();

    assert_eq!(github.host(), "github.com");
    assert_eq!(github.username(), "acme");
    assert_eq!(github.branch(), "main");
    assert_eq!(github.tag_name(), DEFAULT_TAG_NAME);
    assert_eq!(github.release_name(), DEFAULT_RELEASE_NAME);
    assert!(!github.is_draft());
    assert!(!github.is_skip_tag());
    assert!(github.milestone().is_close());
    assert_eq!(github.milestone().name(), "{{tagName}}");
}

#[test]
fn test_codeberg_uses_gitea_urls() {
    let codeberg = Codeberg::default();

    assert_eq!(codeberg.host(), "codeberg.org");
    assert_eq!(codeberg.repo_url(), GITEA_URL);
}

const GITEA_URL: &str = "https://{{repoHost}}/{{repoOwner}}/{{repoName}}";

#[test]
fn test_gitlab_project_identifier() {
    let mut gitlab = Gitlab::default();
    gitlab.set_owner("acme").unwrap();
    gitlab.set_name("app").unwrap();
    assert_eq!(gitlab.project_identifier(), "acme/app");

    gitlab.set_project_identifier("4711").unwrap();
    assert_eq!(gitlab.project_identifier(), "4711");
}

#[test]
fn test_validate_single_service() {
    let mut release = Release::default();
    assert!(release.validate().is_ok());
    assert!(release.service().is_none());

    release.set_gitea(Gitea::default()).unwrap();
    assert!(release.validate().is_ok());
    assert_eq!(release.service().map(|s| s.kind()), Some("gitea"));

    release.set_codeberg(Codeberg::default()).unwrap();
    assert_eq!(
        release.validate(),
        Err(ConfigurationError::MultipleReleaseServices {
            services: vec!["gitea".to_string(), "codeberg".to_string()],
        })
    );
}

#[test]
fn test_props_expand_in_order() {
    let mut model = model("2.0.0");
    let mut github = github();
    github.set_release_name("{{projectName}} {{tagName}}").unwrap();
    model.release_mut().unwrap().set_github(github).unwrap();
    let context = context(model);

    let props = context.props().unwrap();

    assert_eq!(props["repoHost"], "github.com");
    assert_eq!(props["tagName"], "v2.0.0");
    assert_eq!(props["releaseName"], "app v2.0.0");
    assert_eq!(props["milestoneName"], "v2.0.0");
    assert_eq!(props["commitsUrl"], "https://github.com/acme/app/commits");
    assert_eq!(props["latestReleaseUrl"], "https://github.com/acme/app/releases/latest");
}

#[test]
fn test_generic_skips_blank_urls() {
    let mut model = model("1.0.0");
    let mut generic = GenericGit::default();
    generic.set_owner("acme").unwrap();
    generic.set_name("app").unwrap();
    model.release_mut().unwrap().set_generic(generic).unwrap();
    let context = context(model);

    let props = context.props().unwrap();

    assert_eq!(props["repoCanonicalName"], "acme/app");
    assert!(!props.contains_key("repoUrl"));
    assert!(!props.contains_key("releaseNotesUrl"));
}

#[test]
fn test_milestone_name_is_cached() {
    let mut model = model("1.0.0");
    let mut github = github();
    github.milestone_mut().unwrap().set_name("{{projectName}}-{{projectVersion}}").unwrap();
    model.release_mut().unwrap().set_github(github).unwrap();
    let context = context(model);
    let milestone = context.model().release().github().unwrap().milestone();
    assert_eq!(milestone.cached_name(), None);

    context.props().unwrap();
    assert_eq!(milestone.cached_name(), Some("app-1.0.0"));

    let name = milestone.resolved_name(&context, &Properties::new()).unwrap();
    assert_eq!(name, "app-1.0.0");
}

#[test]
fn test_download_url_uses_artifact() {
    let mut model = model("1.0.0");
    model.release_mut().unwrap().set_gitlab({
        let mut gitlab = Gitlab::default();
        gitlab.set_owner("acme").unwrap();
        gitlab.set_name("app").unwrap();
        gitlab
    })
    .unwrap();
    let context = context(model);
    let service = context.model().release().service().unwrap();

    let url = service
        .resolved_download_url(&context, &Artifact::new("build/app-1.0.0.zip"))
        .unwrap();

    assert_eq!(
        url,
        "https://gitlab.com/acme/app/-/releases/v1.0.0/downloads/app-1.0.0.zip"
    );
}

#[test]
fn test_token_from_environment() {
    let mut model = model("1.0.0");
    let mut github = github();
    github.set_token("from-config").unwrap();
    model.release_mut().unwrap().set_github(github).unwrap();
    let resolver = MapSecretResolver::new().with("GITHUB_TOKEN", "from-env");
    let context = context_in(std::path::Path::new("."), model, resolver);

    let github = context.model().release().github().unwrap();

    assert_eq!(github.token(), Some("from-env"));
    assert_eq!(github.secret_variables(), vec!["GITHUB_TOKEN".to_string()]);
}

#[test]
fn test_merge_keeps_unset_fields() {
    let mut base = Release::default();
    base.set_github(github()).unwrap();
    let mut overlay = Release::default();
    let mut github = Github::default();
    github.set_draft(true).unwrap();
    github.set_tag_name("  ").unwrap();
    overlay.set_github(github).unwrap();

    base.merge(&overlay).unwrap();

    let merged = base.github().unwrap();
    assert_eq!(merged.owner(), "acme");
    assert!(merged.is_draft());
    assert_eq!(merged.tag_name(), DEFAULT_TAG_NAME);
}

#[test]
fn test_frozen_service_rejects_changes() {
    let mut release = Release::default();
    release.set_github(github()).unwrap();
    release.freeze();

    assert!(matches!(
        release.set_gitlab(Gitlab::default()),
        Err(ConfigurationError::Immutable { .. })
    ));
}

#[test]
fn test_as_map_hides_token() {
    let mut github = github();
    github.set_token("secret").unwrap();

    let map = github.as_map(false);

    assert_eq!(map["token"], crate::export::HIDE);
    assert_eq!(map["owner"], "acme");
    assert_eq!(map["milestone"]["close"], true);
    assert_eq!(map["draft"], false);
}
