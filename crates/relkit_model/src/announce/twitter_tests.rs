use super::*;
use crate::secrets::MapSecretResolver;
use crate::test_support::{context, context_in, model};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_statuses_list_takes_precedence() {
    let mut model = model("1.0.0");
    let twitter = model.announce_mut().unwrap().twitter_mut().unwrap();
    twitter.set_status("single").unwrap();
    twitter
        .statuses_mut()
        .unwrap()
        .extend(["{{projectName}} 1/2".to_string(), "{{projectName}} 2/2".to_string()]);
    let context = context(model);

    let statuses = context.model().announce().twitter().resolved_statuses(&context).unwrap();

    assert_eq!(statuses, vec!["app 1/2".to_string(), "app 2/2".to_string()]);
}

#[test]
fn test_single_status() {
    let mut model = model("1.0.0");
    model
        .announce_mut()
        .unwrap()
        .twitter_mut()
        .unwrap()
        .set_status("{{projectName}} {{projectVersion}} is out")
        .unwrap();
    let context = context(model);

    let statuses = context.model().announce().twitter().resolved_statuses(&context).unwrap();

    assert_eq!(statuses, vec!["app 1.0.0 is out".to_string()]);
}

#[test]
fn test_status_template_split_on_separator_lines() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    fs::write(
        temp_dir.path().join("tweets.tpl"),
        "{{projectName}} {{projectVersion}}\nis out\n---\nchangelog below\n  ---  \n\n---\n",
    )
    .unwrap();
    let mut model = model("2.0.0");
    model
        .announce_mut()
        .unwrap()
        .twitter_mut()
        .unwrap()
        .set_status_template("tweets.tpl")
        .unwrap();
    let context = context_in(temp_dir.path(), model, MapSecretResolver::new());

    let statuses = context.model().announce().twitter().resolved_statuses(&context).unwrap();

    assert_eq!(
        statuses,
        vec!["app 2.0.0\nis out".to_string(), "changelog below".to_string()]
    );
}

#[test]
fn test_default_status() {
    let context = context(model("1.0.0"));

    let statuses = context.model().announce().twitter().resolved_statuses(&context).unwrap();

    assert_eq!(statuses.len(), 1);
    assert!(statuses[0].starts_with("🚀 App 1.0.0"));
}

#[test]
fn test_split_statuses_keeps_inline_dashes() {
    let statuses = split_statuses("a --- b\n---\nc");

    assert_eq!(statuses, vec!["a --- b".to_string(), "c".to_string()]);
}

#[test]
fn test_secret_variables_cover_all_credentials() {
    let twitter = Twitter::default();

    assert_eq!(
        twitter.secret_variables(),
        vec![
            "TWITTER_CONSUMER_KEY".to_string(),
            "TWITTER_CONSUMER_SECRET".to_string(),
            "TWITTER_ACCESS_TOKEN".to_string(),
            "TWITTER_ACCESS_TOKEN_SECRET".to_string(),
        ]
    );
}

#[test]
fn test_merge_appends_statuses() {
    let mut base = Twitter::default();
    base.statuses_mut().unwrap().push("one".to_string());
    let mut overlay = Twitter::default();
    overlay.statuses_mut().unwrap().push("two".to_string());

    base.merge(&overlay).unwrap();

    assert_eq!(base.statuses(), ["one".to_string(), "two".to_string()]);
}
