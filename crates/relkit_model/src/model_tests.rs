use super::*;
use crate::active::Active;
use crate::distribution::DistributionType;
use crate::errors::ConfigurationError;
use crate::loader::ConfigLoader;
use crate::release::GitService;
use crate::secrets::MapSecretResolver;
use crate::test_support::model;

const BASE: &str = r#"
[project]
name = "app"
version = "1.0.0"

[packagers.chocolatey]
active = "ALWAYS"
source = "https://choco.example/"

[distributions.app]
type = "BINARY"

[[distributions.app.artifacts]]
path = "out/app-1.0.0-windows-x86_64.zip"
platform = "windows-x86_64"

[[distributions.app.artifacts]]
path = "out/app-1.0.0-linux-x86_64.tar.gz"
platform = "linux-x86_64"

[distributions.tool]
type = "SINGLE_JAR"

[[distributions.tool.artifacts]]
path = "out/tool-1.0.0.jar"
"#;

fn parse(content: &str) -> ReleaseModel {
    ConfigLoader::new().parse(content).unwrap()
}

#[test]
fn test_new_model_is_empty_and_mutable() {
    let model = ReleaseModel::new();

    assert!(!model.is_frozen());
    assert!(model.distributions().is_empty());
    assert!(model.release().service().is_none());
}

#[test]
fn test_add_distribution_uses_key_as_name() {
    let mut model = model("1.0.0");

    model
        .add_distribution("cli", Distribution::new("", DistributionType::Binary))
        .unwrap();

    assert_eq!(model.distribution("cli").unwrap().name(), "cli");
    assert!(model.distribution("other").is_none());
}

#[test]
fn test_merge_distributions_by_name() {
    let mut base = parse(BASE);
    let overlay = parse(
        r#"
[distributions.app]
executable = "app-cli"

[distributions.extra]
type = "JAVA_BINARY"
"#,
    );

    base.merge(&overlay).unwrap();

    let names: Vec<&str> = base.distributions().keys().map(String::as_str).collect();
    assert_eq!(names, vec!["app", "tool", "extra"]);
    let app = base.distribution("app").unwrap();
    assert_eq!(app.executable(), "app-cli");
    assert_eq!(app.distribution_type(), Some(DistributionType::Binary));
    assert_eq!(app.artifacts().len(), 2);
}

#[test]
fn test_resolve_enabled_layers_packager_defaults_per_distribution() {
    let mut model = parse(BASE);

    model.resolve_enabled().unwrap();

    let app = model.distribution("app").unwrap();
    assert!(app.is_enabled());
    assert!(app.packagers().chocolatey().is_enabled());
    assert_eq!(app.packagers().chocolatey().source(), "https://choco.example/");

    let tool = model.distribution("tool").unwrap();
    assert!(tool.is_enabled());
    assert!(!tool.packagers().chocolatey().is_enabled());
}

#[test]
fn test_resolve_enabled_distribution_overlay_wins() {
    let mut model = parse(BASE);
    model
        .distributions
        .get_mut("app")
        .unwrap()
        .packagers_mut()
        .unwrap()
        .chocolatey_mut()
        .unwrap()
        .set_active(Active::Never)
        .unwrap();

    model.resolve_enabled().unwrap();

    assert!(!model.distribution("app").unwrap().packagers().chocolatey().is_enabled());
}

#[test]
fn test_resolve_enabled_disabled_distribution_disables_packagers() {
    let mut model = parse(BASE);
    model
        .distributions
        .get_mut("app")
        .unwrap()
        .set_active(Active::Never)
        .unwrap();

    model.resolve_enabled().unwrap();

    let app = model.distribution("app").unwrap();
    assert!(!app.is_enabled());
    assert!(!app.packagers().has_enabled_packagers());
}

#[test]
fn test_freeze_cascades_through_tree() {
    let mut model = parse(BASE);

    model.freeze();

    assert!(model.project().is_frozen());
    assert!(model.distribution("app").unwrap().is_frozen());
    assert!(matches!(model.project_mut(), Err(ConfigurationError::Immutable { .. })));
}

#[test]
fn test_mutate_thaws_whole_tree_temporarily() {
    let mut model = parse(BASE);
    model.freeze();

    model
        .mutate(|m| m.project_mut()?.set_description("patched"))
        .unwrap();

    assert_eq!(model.project().description(), Some("patched"));
    assert!(model.project().is_frozen());
}

#[test]
fn test_merge_into_frozen_model_fails() {
    let mut model = parse(BASE);
    model.freeze();

    let result = model.merge(&ReleaseModel::default());

    assert!(matches!(result, Err(ConfigurationError::Immutable { .. })));
}

#[test]
fn test_secret_variables_are_unique() {
    let model = parse(
        r#"
[release.github]
owner = "acme"

[announce.webhooks.team]
active = "ALWAYS"

[announce.webhooks.ops]
active = "ALWAYS"
"#,
    );

    let variables = model.secret_variables();

    assert_eq!(variables.iter().filter(|v| *v == "WEBHOOK_WEBHOOK").count(), 1);
    assert!(variables.contains(&"WEBHOOK_TEAM_WEBHOOK".to_string()));
    assert!(variables.contains(&"WEBHOOK_OPS_WEBHOOK".to_string()));
    assert_eq!(variables[0], "GITHUB_TOKEN");
}

#[test]
fn test_resolve_secrets_prefers_resolver() {
    let mut model = parse("[release.github]\nowner = \"acme\"\ntoken = \"from-file\"\n");
    let resolver = MapSecretResolver::new().with("GITHUB_TOKEN", "from-env");

    model.resolve_secrets(&resolver).unwrap();

    assert_eq!(model.release().github().unwrap().token(), Some("from-env"));
}

#[test]
fn test_as_map_skips_disabled_sections() {
    let mut model = parse(BASE);
    model.resolve_enabled().unwrap();

    let map = model.as_map(false);

    assert!(map.contains_key("project"));
    assert!(map.contains_key("distributions"));
    assert!(!map.contains_key("signing"));
    assert!(!map.contains_key("release"));
}

#[test]
fn test_as_map_reports_packagers_per_distribution_only() {
    let mut model = parse(BASE);
    model.resolve_enabled().unwrap();

    let map = model.as_map(true);

    assert!(!map.contains_key("packagers"));
    let chocolatey = &map["distributions"]["app"]["packagers"]["chocolatey"];
    assert_eq!(chocolatey["active"], "ALWAYS");
    assert_eq!(chocolatey["enabled"], true);
}
