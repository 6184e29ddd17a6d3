use super::*;
use crate::errors::ConfigurationError;
use crate::test_support::{context, model};

#[test]
fn test_step_filter() {
    let mut filter = StepFilter::default();
    assert!(filter.matches("assemble"));

    filter.include("release");
    filter.include("announce");
    filter.exclude("announce");

    assert!(filter.matches("release"));
    assert!(!filter.matches("announce"));
    assert!(!filter.matches("assemble"));
}

#[test]
fn test_platform_matching() {
    let mut hook = CommandHook::new("make");
    assert!(hook.matches_platform("linux-x86_64"));

    hook.platforms_mut().unwrap().insert("linux".to_string());
    assert!(hook.matches_platform("linux-aarch_64"));
    assert!(!hook.matches_platform("osx-x86_64"));

    let mut hook = CommandHook::new("make");
    hook.platforms_mut().unwrap().insert("!windows".to_string());
    assert!(hook.matches_platform("osx-x86_64"));
    assert!(!hook.matches_platform("windows-x86_64"));
}

#[test]
fn test_applies_to_requires_enabled() {
    let mut hook = CommandHook::new("echo done");
    hook.filter_mut().unwrap().include("release");
    assert!(!hook.applies_to("release", "linux-x86_64"));

    hook.resolve_enabled(model("1.0.0").project()).unwrap();

    assert!(hook.applies_to("release", "linux-x86_64"));
    assert!(!hook.applies_to("upload", "linux-x86_64"));
}

#[test]
fn test_disabled_hooks_disable_commands() {
    let mut hooks = Hooks::default();
    hooks.command_mut().unwrap().add_before(CommandHook::new("make")).unwrap();
    hooks.command_mut().unwrap().add_failure(CommandHook::new("notify")).unwrap();
    hooks.set_active(Active::Never).unwrap();

    let enabled = hooks.resolve_enabled_all(model("1.0.0").project()).unwrap();

    assert!(!enabled);
    assert!(!hooks.command().is_enabled());
    assert!(!hooks.command().before()[0].is_enabled());
    assert!(!hooks.command().failure()[0].is_enabled());
}

#[test]
fn test_snapshot_only_hook() {
    let mut hooks = Hooks::default();
    let mut hook = CommandHook::new("publish-nightly");
    hook.set_active(Active::Snapshot).unwrap();
    hooks.command_mut().unwrap().add_success(hook).unwrap();

    hooks.resolve_enabled_all(model("2.0.0").project()).unwrap();

    assert!(hooks.command().is_enabled());
    assert!(!hooks.command().success()[0].is_enabled());
}

#[test]
fn test_merge_by_command() {
    let mut base: Hooks = toml::from_str(
        r#"
[command]
before = [{ cmd = "make", includes = ["assemble"] }]
"#,
    )
    .unwrap();
    let overlay: Hooks = toml::from_str(
        r#"
[command]
before = [
    { cmd = "make", excludes = ["release"], platforms = ["linux"] },
    { cmd = "lint" },
]
"#,
    )
    .unwrap();

    base.merge(&overlay).unwrap();

    let before = base.command().before();
    assert_eq!(before.len(), 2);
    assert_eq!(before[0].cmd(), "make");
    assert!(before[0].filter().includes().contains("assemble"));
    assert!(before[0].filter().excludes().contains("release"));
    assert!(before[0].platforms().contains("linux"));
    assert_eq!(before[1].cmd(), "lint");
}

#[test]
fn test_resolved_cmd() {
    let mut model = model("1.3.0");
    model
        .hooks_mut()
        .unwrap()
        .command_mut()
        .unwrap()
        .add_before(CommandHook::new("echo {{projectName}} {{projectVersion}}"))
        .unwrap();
    let context = context(model);

    let hook = &context.model().hooks().command().before()[0];

    assert!(hook.is_enabled());
    assert_eq!(hook.resolved_cmd(&context).unwrap(), "echo app 1.3.0");
}

#[test]
fn test_frozen_hook_rejects_filter_changes() {
    let mut hook = CommandHook::new("make");
    hook.freeze();

    assert!(matches!(hook.filter_mut(), Err(ConfigurationError::Immutable { .. })));
    assert!(matches!(hook.platforms_mut(), Err(ConfigurationError::Immutable { .. })));
}

#[test]
fn test_as_map_labels_hooks() {
    let mut hooks = Hooks::default();
    hooks.command_mut().unwrap().add_before(CommandHook::new("make")).unwrap();
    hooks.command_mut().unwrap().add_before(CommandHook::new("test")).unwrap();
    hooks.resolve_enabled_all(model("1.0.0").project()).unwrap();

    let map = hooks.as_map(false);

    assert_eq!(map["command"]["before"]["hook 0"]["cmd"], "make");
    assert_eq!(map["command"]["before"]["hook 1"]["cmd"], "test");
    assert!(map["command"].get("success").is_none());
}
