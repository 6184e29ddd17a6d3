//! Tests for building and using the resolution context.

use super::*;
use crate::errors::ConfigurationError;
use crate::release::{GitService, Github, Gitlab};
use crate::secrets::MapSecretResolver;
use crate::test_support::{context, context_in, model};
use std::fs;
use tempfile::TempDir;

fn github_model() -> ReleaseModel {
    let mut model = model("1.0.0");
    let mut github = Github::default();
    github.set_owner("acme").unwrap();
    github.set_name("app").unwrap();
    model.release_mut().unwrap().set_github(github).unwrap();
    model
}

#[test]
fn test_context_freezes_model() {
    let context = context(model("1.0.0"));

    assert!(context.model().is_frozen());
    assert!(context.model().project().is_frozen());
    assert_eq!(context.base_dir(), Path::new("."));
}

#[test]
fn test_context_rejects_frozen_model() {
    let mut model = model("1.0.0");
    model.freeze();

    let result = ReleaseContext::with_resolver(".", model, Box::new(MapSecretResolver::new()));

    assert!(matches!(result, Err(ConfigurationError::Immutable { .. })));
}

#[test]
fn test_context_rejects_multiple_release_services() {
    let mut model = github_model();
    model.release_mut().unwrap().set_gitlab(Gitlab::default()).unwrap();

    let result = ReleaseContext::with_resolver(".", model, Box::new(MapSecretResolver::new()));

    match result {
        Err(ConfigurationError::MultipleReleaseServices { services }) => {
            assert_eq!(services, vec!["github".to_string(), "gitlab".to_string()]);
        }
        other => panic!("Expected MultipleReleaseServices, got {other:?}"),
    }
}

#[test]
fn test_project_props_include_utc_timestamp() {
    let context = context(model("1.0.0"));

    let props = context.project_props();

    let timestamp = props["timestamp"].as_str().unwrap();
    assert!(timestamp.ends_with('Z'));
    assert_eq!(props["projectName"], "app");
    assert_eq!(props["projectVersion"], "1.0.0");
}

#[test]
fn test_props_include_release_service() {
    let context = context(github_model());

    let props = context.props().unwrap();

    assert_eq!(props["repoOwner"], "acme");
    assert_eq!(props["repoCanonicalName"], "acme/app");
    assert_eq!(props["tagName"], "v1.0.0");
    assert_eq!(props["releaseName"], "Release v1.0.0");
    assert_eq!(props["repoUrl"], "https://github.com/acme/app");
    assert_eq!(
        props["releaseNotesUrl"],
        "https://github.com/acme/app/releases/tag/v1.0.0"
    );
}

#[test]
fn test_release_token_resolved_from_resolver() {
    let resolver = MapSecretResolver::new().with("GITHUB_TOKEN", "ghp_123");
    let context = context_in(Path::new("."), github_model(), resolver);

    let github = context.model().release().github().unwrap();

    assert_eq!(github.token(), Some("ghp_123"));
}

#[test]
fn test_render_expands_placeholders() {
    let context = context(github_model());
    let props = context.props().unwrap();

    let rendered = context.render("{{projectName}} {{tagName}}", &props).unwrap();

    assert_eq!(rendered, "app v1.0.0");
}

#[test]
fn test_render_file_reads_relative_to_base_dir() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    fs::write(temp_dir.path().join("notes.tpl"), "Released {{projectVersion}}").unwrap();
    let context = context_in(temp_dir.path(), model("2.1.0"), MapSecretResolver::new());

    let rendered = context.render_file("notes.tpl", &context.project_props()).unwrap();

    assert_eq!(rendered, "Released 2.1.0");
}

#[test]
fn test_render_file_missing_template() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let context = context_in(temp_dir.path(), model("1.0.0"), MapSecretResolver::new());

    let result = context.render_file("missing.tpl", &context.project_props());

    assert!(matches!(result, Err(ConfigurationError::TemplateFileNotFound { .. })));
}
