//! Layered configuration merge primitives.
//!
//! A merge combines an existing layer (`self`) with an incoming layer of the
//! same type. The rules are the same everywhere:
//!
//! - scalars: a present incoming value replaces the existing one; an absent
//!   incoming value never erases it. Strings count as absent when blank.
//! - lists and sets: union, existing elements first, then incoming elements
//!   that are not already present.
//! - maps: existing keys are kept, keys only present in the incoming map are
//!   appended. A map that was never configured is simply empty.
//! - name-keyed entity maps: same-named entries are merged recursively, new
//!   names are appended after the existing ones.

use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

use crate::errors::ConfigurationResult;

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;

/// Layered merge of two values of the same entity type.
pub trait Merge {
    /// Merges `incoming` into `self` in place.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::Immutable` if `self` is frozen.
    fn merge(&mut self, incoming: &Self) -> ConfigurationResult<()>;
}

/// Replaces `existing` with `incoming` when `incoming` is set.
pub fn merge_value<T: Clone>(existing: &mut Option<T>, incoming: &Option<T>) {
    if let Some(value) = incoming {
        *existing = Some(value.clone());
    }
}

/// Replaces `existing` with `incoming` when `incoming` is not blank.
pub fn merge_text(existing: &mut Option<String>, incoming: &Option<String>) {
    if let Some(value) = incoming {
        if !value.trim().is_empty() {
            *existing = Some(value.clone());
        }
    }
}

/// Returns true when the value is unset or whitespace only.
pub fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Returns the value unless it is unset or whitespace only.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Appends the incoming elements that `existing` does not contain yet.
pub fn merge_list<T: Clone + PartialEq>(existing: &mut Vec<T>, incoming: &[T]) {
    for item in incoming {
        if !existing.contains(item) {
            existing.push(item.clone());
        }
    }
}

/// Set flavour of [`merge_list`]; insertion order is preserved.
pub fn merge_set<T: Clone + Eq + Hash>(existing: &mut IndexSet<T>, incoming: &IndexSet<T>) {
    for item in incoming {
        if !existing.contains(item) {
            existing.insert(item.clone());
        }
    }
}

/// Adds the entries of `incoming` whose keys are absent from `existing`.
pub fn merge_map<K, V>(existing: &mut IndexMap<K, V>, incoming: &IndexMap<K, V>)
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    for (key, value) in incoming {
        if !existing.contains_key(key) {
            existing.insert(key.clone(), value.clone());
        }
    }
}

/// [`merge_map`] for JSON property bags.
pub fn merge_properties(
    existing: &mut serde_json::Map<String, serde_json::Value>,
    incoming: &serde_json::Map<String, serde_json::Value>,
) {
    for (key, value) in incoming {
        if !existing.contains_key(key) {
            existing.insert(key.clone(), value.clone());
        }
    }
}

/// Merges name-keyed entity maps.
///
/// Entries present in both maps are merged recursively, entries only present
/// in `incoming` are appended in their incoming order.
pub fn merge_model<T>(
    existing: &mut IndexMap<String, T>,
    incoming: &IndexMap<String, T>,
) -> ConfigurationResult<()>
where
    T: Merge + Clone,
{
    for (name, entity) in incoming {
        match existing.get_mut(name) {
            Some(current) => current.merge(entity)?,
            None => {
                existing.insert(name.clone(), entity.clone());
            }
        }
    }
    Ok(())
}

/// Merges optional nested entities.
pub fn merge_optional_model<T>(existing: &mut Option<T>, incoming: &Option<T>) -> ConfigurationResult<()>
where
    T: Merge + Clone,
{
    match (existing.as_mut(), incoming) {
        (Some(current), Some(entity)) => current.merge(entity),
        (None, Some(entity)) => {
            *existing = Some(entity.clone());
            Ok(())
        }
        (_, None) => Ok(()),
    }
}
