//! Tests for the merge primitives.

use super::*;
use crate::errors::ConfigurationError;
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Default)]
struct Entry {
    frozen: bool,
    url: Option<String>,
    tags: Vec<String>,
}

impl Merge for Entry {
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()> {
        if self.frozen {
            return Err(ConfigurationError::Immutable {
                entity: "entry".to_string(),
            });
        }
        merge_text(&mut self.url, &incoming.url);
        merge_list(&mut self.tags, &incoming.tags);
        Ok(())
    }
}

fn entry(url: &str) -> Entry {
    Entry {
        url: Some(url.to_string()),
        ..Default::default()
    }
}

#[test]
fn test_merge_value_incoming_wins_when_present() {
    let mut existing = Some(10);
    merge_value(&mut existing, &Some(20));
    assert_eq!(existing, Some(20));
}

#[test]
fn test_merge_value_absent_incoming_keeps_existing() {
    let mut existing = Some(true);
    merge_value(&mut existing, &None);
    assert_eq!(existing, Some(true));
}

#[test]
fn test_merge_value_fills_unset_existing() {
    let mut existing: Option<u32> = None;
    merge_value(&mut existing, &Some(5));
    assert_eq!(existing, Some(5));
}

#[test]
fn test_merge_text_blank_does_not_erase() {
    let mut existing = Some("base".to_string());

    merge_text(&mut existing, &Some("   ".to_string()));
    merge_text(&mut existing, &Some(String::new()));
    merge_text(&mut existing, &None);

    assert_eq!(existing.as_deref(), Some("base"));
}

#[test]
fn test_merge_text_present_replaces() {
    let mut existing = Some("base".to_string());
    merge_text(&mut existing, &Some("override".to_string()));
    assert_eq!(existing.as_deref(), Some("override"));
}

#[test]
fn test_is_blank() {
    assert!(is_blank(&None));
    assert!(is_blank(&Some(" \t".to_string())));
    assert!(!is_blank(&Some("x".to_string())));
}

#[test]
fn test_merge_list_is_union_with_base_order_first() {
    let mut existing = vec!["a", "b", "c"];
    merge_list(&mut existing, &["c", "d", "a", "e"]);
    assert_eq!(existing, vec!["a", "b", "c", "d", "e"]);
}

#[test]
fn test_merge_list_into_empty_base() {
    let mut existing: Vec<i32> = Vec::new();
    merge_list(&mut existing, &[3, 1, 3]);
    assert_eq!(existing, vec![3, 1]);
}

#[test]
fn test_merge_set_preserves_insertion_order() {
    let mut existing: IndexSet<&str> = ["zip", "tgz"].into_iter().collect();
    let incoming: IndexSet<&str> = ["tar", "zip"].into_iter().collect();

    merge_set(&mut existing, &incoming);

    assert_eq!(existing.into_iter().collect::<Vec<_>>(), vec!["zip", "tgz", "tar"]);
}

#[test]
fn test_merge_map_keeps_existing_keys() {
    let mut existing: IndexMap<String, String> = IndexMap::new();
    existing.insert("a".into(), "base".into());
    let mut incoming = IndexMap::new();
    incoming.insert("a".to_string(), "incoming".to_string());
    incoming.insert("b".to_string(), "new".to_string());

    merge_map(&mut existing, &incoming);

    assert_eq!(existing["a"], "base");
    assert_eq!(existing["b"], "new");
    assert_eq!(existing.keys().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn test_merge_map_with_empty_base_takes_all_incoming() {
    let mut existing: IndexMap<String, i32> = IndexMap::new();
    let incoming: IndexMap<String, i32> =
        [("x".to_string(), 1), ("y".to_string(), 2)].into_iter().collect();

    merge_map(&mut existing, &incoming);

    assert_eq!(existing, incoming);
}

#[test]
fn test_merge_map_with_empty_incoming_is_noop() {
    let mut existing: IndexMap<String, i32> = [("x".to_string(), 1)].into_iter().collect();
    merge_map(&mut existing, &IndexMap::new());
    assert_eq!(existing.len(), 1);
}

#[test]
fn test_merge_properties_keeps_existing_values() {
    let mut existing = json!({"owner": "base"}).as_object().cloned().unwrap();
    let incoming = json!({"owner": "other", "extra": 1}).as_object().cloned().unwrap();

    merge_properties(&mut existing, &incoming);

    assert_eq!(existing["owner"], "base");
    assert_eq!(existing["extra"], 1);
}

#[test]
fn test_merge_model_merges_same_names_and_appends_new() {
    let mut existing: IndexMap<String, Entry> = IndexMap::new();
    existing.insert(
        "a".into(),
        Entry {
            url: Some("x1".into()),
            tags: vec!["t1".into()],
            ..Default::default()
        },
    );
    let mut incoming: IndexMap<String, Entry> = IndexMap::new();
    incoming.insert(
        "a".into(),
        Entry {
            url: Some("x2".into()),
            tags: vec!["t2".into()],
            ..Default::default()
        },
    );
    incoming.insert("b".into(), entry("y"));

    merge_model(&mut existing, &incoming).unwrap();

    assert_eq!(existing.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(existing["a"].url.as_deref(), Some("x2"));
    assert_eq!(existing["a"].tags, vec!["t1".to_string(), "t2".to_string()]);
    assert_eq!(existing["b"], entry("y"));
}

#[test]
fn test_merge_model_propagates_entity_errors() {
    let mut existing: IndexMap<String, Entry> = IndexMap::new();
    existing.insert(
        "a".into(),
        Entry {
            frozen: true,
            ..Default::default()
        },
    );
    let incoming: IndexMap<String, Entry> = [("a".to_string(), entry("z"))].into_iter().collect();

    let result = merge_model(&mut existing, &incoming);

    assert!(matches!(result, Err(ConfigurationError::Immutable { .. })));
}

#[test]
fn test_merge_optional_model() {
    let mut existing: Option<Entry> = None;
    merge_optional_model(&mut existing, &Some(entry("first"))).unwrap();
    assert_eq!(existing, Some(entry("first")));

    merge_optional_model(&mut existing, &Some(entry("second"))).unwrap();
    assert_eq!(existing.as_ref().and_then(|e| e.url.as_deref()), Some("second"));

    merge_optional_model(&mut existing, &None).unwrap();
    assert_eq!(existing.as_ref().and_then(|e| e.url.as_deref()), Some("second"));
}
