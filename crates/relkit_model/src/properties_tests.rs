use super::*;
use crate::freeze::FreezeState;
use serde_json::json;

#[derive(Default)]
struct Holder {
    state: FreezeState,
    extra: Properties,
}

impl Freezable for Holder {
    fn kind(&self) -> &'static str {
        "holder"
    }

    fn freeze_state(&self) -> &FreezeState {
        &self.state
    }

    fn freeze_state_mut(&mut self) -> &mut FreezeState {
        &mut self.state
    }
}

impl ExtraProperties for Holder {
    fn prefix(&self) -> &str {
        "slack"
    }

    fn extra_properties(&self) -> &Properties {
        &self.extra
    }

    fn extra_properties_slot(&mut self) -> &mut Properties {
        &mut self.extra
    }
}

#[test]
fn test_prefixed_key_capitalizes_after_prefix() {
    assert_eq!(prefixed_key("slack", "channel"), "slackChannel");
}

#[test]
fn test_prefixed_key_keeps_already_prefixed_keys() {
    assert_eq!(prefixed_key("slack", "slackEmoji"), "slackEmoji");
}

#[test]
fn test_capitalize() {
    assert_eq!(capitalize("app"), "App");
    assert_eq!(capitalize(""), "");
}

#[test]
fn test_resolved_extra_properties_are_namespaced_in_order() {
    let mut holder = Holder::default();
    holder.add_extra_property("emoji", json!(":rocket:")).unwrap();
    holder.add_extra_property("slackColor", json!("green")).unwrap();

    let resolved = holder.resolved_extra_properties();

    assert_eq!(
        resolved.keys().collect::<Vec<_>>(),
        vec!["slackEmoji", "slackColor"]
    );
    assert_eq!(resolved["slackEmoji"], ":rocket:");
}

#[test]
fn test_extra_properties_are_read_only_after_freeze() {
    let mut holder = Holder::default();
    holder.freeze();

    assert!(holder.add_extra_property("k", json!("v")).is_err());
    assert!(holder.extra_properties_mut().is_err());
    assert!(holder.extra_properties().is_empty());
}
