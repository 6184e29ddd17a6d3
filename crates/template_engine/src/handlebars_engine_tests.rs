//! Tests for the Mustache-style template engine.

use super::*;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn engine() -> TemplateEngine {
    TemplateEngine::new().expect("engine should initialize")
}

#[test]
fn test_engine_new_uses_lenient_defaults() {
    let engine = engine();
    assert!(!engine.config().strict_variables);
    assert_eq!(engine.config().max_template_size, 1_048_576);
}

#[test]
fn test_render_simple_placeholders() {
    let context = TemplateContext::new(json!({
        "projectName": "app",
        "projectVersion": "1.0.0"
    }));

    let result = engine()
        .render("{{projectName}}-{{projectVersion}}.zip", &context)
        .expect("render should succeed");

    assert_eq!(result, "app-1.0.0.zip");
}

#[test]
fn test_render_missing_variable_is_empty() {
    let context = TemplateContext::new(json!({"projectName": "app"}));

    let result = engine()
        .render("{{projectName}}{{missing}}", &context)
        .expect("missing variables render empty");

    assert_eq!(result, "app");
}

#[test]
fn test_render_strict_mode_rejects_missing_variable() {
    let engine = TemplateEngine::with_config(TemplateRenderConfig {
        strict_variables: true,
        ..Default::default()
    })
    .unwrap();
    let context = TemplateContext::new(json!({}));

    let result = engine.render("{{missing}}", &context);

    assert!(result.is_err());
}

#[test]
fn test_render_does_not_escape_urls() {
    let context = TemplateContext::new(json!({
        "url": "https://example.com/download?a=1&b=2"
    }));

    let result = engine().render("{{url}}", &context).unwrap();

    assert_eq!(result, "https://example.com/download?a=1&b=2");
}

#[test]
fn test_render_is_repeatable_with_different_contexts() {
    let engine = engine();
    let template = "{{artifactFileName}}";

    let first = engine
        .render(template, &TemplateContext::new(json!({"artifactFileName": "a.zip"})))
        .unwrap();
    let second = engine
        .render(template, &TemplateContext::new(json!({"artifactFileName": "b.tgz"})))
        .unwrap();

    assert_eq!(first, "a.zip");
    assert_eq!(second, "b.tgz");
    assert_eq!(template, "{{artifactFileName}}");
}

#[test]
fn test_case_helpers() {
    let context = TemplateContext::new(json!({"name": "My Cool-App"}));
    let engine = engine();

    assert_eq!(engine.render("{{snake_case name}}", &context).unwrap(), "my_cool_app");
    assert_eq!(engine.render("{{kebab_case name}}", &context).unwrap(), "my-cool-app");
    assert_eq!(engine.render("{{upper_case name}}", &context).unwrap(), "MY COOL-APP");
    assert_eq!(engine.render("{{lower_case name}}", &context).unwrap(), "my cool-app");
}

#[test]
fn test_capitalize_helper() {
    let context = TemplateContext::new(json!({"name": "release"}));

    let result = engine().render("{{capitalize name}}", &context).unwrap();

    assert_eq!(result, "Release");
}

#[test]
fn test_default_value_helper_uses_fallback_for_blank() {
    let context = TemplateContext::new(json!({"branch": "  ", "fallback": "main"}));

    let result = engine()
        .render("{{default_value branch fallback}}", &context)
        .unwrap();

    assert_eq!(result, "main");
}

#[test]
fn test_default_value_helper_keeps_present_value() {
    let context = TemplateContext::new(json!({"branch": "develop", "fallback": "main"}));

    let result = engine()
        .render("{{default_value branch fallback}}", &context)
        .unwrap();

    assert_eq!(result, "develop");
}

#[test]
fn test_render_invalid_syntax_is_compilation_error() {
    let context = TemplateContext::new(json!({"flag": true}));

    let result = engine().render("{{#if flag}}unterminated", &context);

    assert!(matches!(result, Err(TemplateError::Compilation { .. })));
}

#[test]
fn test_render_rejects_oversized_template() {
    let engine = TemplateEngine::with_config(TemplateRenderConfig {
        max_template_size: 8,
        ..Default::default()
    })
    .unwrap();

    let result = engine.render("{{projectName}}", &TemplateContext::default());

    match result {
        Err(TemplateError::ResourceLimit { limit_type, .. }) => {
            assert_eq!(limit_type, "template_size")
        }
        other => panic!("expected resource limit error, got {other:?}"),
    }
}

#[test]
fn test_render_file_expands_content() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("message.tpl");
    fs::write(&path, "Released {{projectName}} {{projectVersion}}!").unwrap();
    let context = TemplateContext::new(json!({
        "projectName": "app",
        "projectVersion": "2.0.0"
    }));

    let result = engine()
        .render_file(&path, "message.tpl", &context)
        .unwrap();

    assert_eq!(result, "Released app 2.0.0!");
}

#[test]
fn test_render_file_missing_reports_display_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nope.tpl");

    let result = engine().render_file(&path, "templates/nope.tpl", &TemplateContext::default());

    match result {
        Err(TemplateError::FileNotFound { path }) => assert_eq!(path, "templates/nope.tpl"),
        other => panic!("expected file not found, got {other:?}"),
    }
}

#[test]
fn test_render_file_invalid_utf8_is_unreadable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("binary.tpl");
    fs::write(&path, [0xff, 0xfe, 0xfd]).unwrap();

    let result = engine().render_file(&path, "binary.tpl", &TemplateContext::default());

    assert!(matches!(result, Err(TemplateError::FileUnreadable { .. })));
}

#[test]
fn test_context_from_properties() {
    let mut props = Map::new();
    props.insert("projectName".to_string(), json!("app"));

    let context = TemplateContext::from_properties(props);

    assert_eq!(context.variables["projectName"], "app");
}
