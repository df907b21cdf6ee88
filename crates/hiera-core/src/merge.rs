//! Deep merge of keyed structures
//!
//! Per-entry rules, applied recursively:
//! - Maps are merged key by key
//! - Lists are concatenated (existing entries first, duplicates kept)
//! - Sets are unioned
//! - Anything else is overwritten by the update

use crate::value::{Map, Value};

/// Merge `update` into `acc`, returning the accumulator.
///
/// Values are copied out of `update`, so the accumulator never shares
/// storage with backend data. When the accumulator holds a different kind of
/// value at a key than the update, the update replaces it.
///
/// # Example
/// ```
/// use hiera_core::merge::deep_merge;
/// use hiera_core::Value;
///
/// let mut acc = Value::from(serde_json::json!({"timeout": 30, "retries": 3}));
/// let update = Value::from(serde_json::json!({"timeout": 60}));
/// deep_merge(update.as_map().unwrap(), acc.as_map_mut().unwrap());
/// assert_eq!(acc, Value::from(serde_json::json!({"timeout": 60, "retries": 3})));
/// ```
pub fn deep_merge<'a>(update: &Map, acc: &'a mut Map) -> &'a mut Map {
    for (key, value) in update {
        match value {
            Value::Map(nested) => {
                let slot = acc.entry(key.clone()).or_insert_with(Value::empty_map);
                if !slot.is_map() {
                    *slot = Value::empty_map();
                }
                if let Value::Map(target) = slot {
                    deep_merge(nested, target);
                }
            }
            Value::List(items) => match acc.get_mut(key) {
                Some(Value::List(existing)) => existing.extend(items.iter().cloned()),
                _ => {
                    acc.insert(key.clone(), Value::List(items.clone()));
                }
            },
            Value::Set(items) => match acc.get_mut(key) {
                Some(Value::Set(existing)) => existing.extend(items.iter().cloned()),
                _ => {
                    acc.insert(key.clone(), Value::Set(items.clone()));
                }
            },
            scalar => {
                acc.insert(key.clone(), scalar.clone());
            }
        }
    }
    acc
}

/// Fold maps in order into a fresh accumulator; later maps win conflicts.
pub fn deep_merge_all<'a>(maps: impl IntoIterator<Item = &'a Map>) -> Map {
    let mut acc = Map::new();
    for map in maps {
        deep_merge(map, &mut acc);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(json: serde_json::Value) -> Map {
        match Value::from(json) {
            Value::Map(map) => map,
            other => panic!("not a map: {other}"),
        }
    }

    #[test]
    fn test_scalar_override() {
        let mut acc = map(json!({"timeout": 30, "retries": 3}));
        deep_merge(&map(json!({"timeout": 60})), &mut acc);
        assert_eq!(acc, map(json!({"timeout": 60, "retries": 3})));
    }

    #[test]
    fn test_nested_maps_merge() {
        let mut acc = map(json!({"a": "base", "b": {"blarg": "x", "other": "y"}}));
        deep_merge(&map(json!({"b": {"blarg": "z"}})), &mut acc);
        assert_eq!(
            acc,
            map(json!({"a": "base", "b": {"blarg": "z", "other": "y"}}))
        );
    }

    #[test]
    fn test_missing_nested_map_is_created() {
        let mut acc = Map::new();
        deep_merge(&map(json!({"db": {"pool": {"size": 5}}})), &mut acc);
        assert_eq!(acc, map(json!({"db": {"pool": {"size": 5}}})));
    }

    #[test]
    fn test_lists_concatenate() {
        let mut acc = map(json!({"servers": ["s1", "s2"]}));
        deep_merge(&map(json!({"servers": ["s3", "s1"]})), &mut acc);
        assert_eq!(acc, map(json!({"servers": ["s1", "s2", "s3", "s1"]})));
    }

    #[test]
    fn test_sets_union() {
        let mut acc = Map::new();
        acc.insert("tags".into(), Value::set(["a", "b"]));
        let mut update = Map::new();
        update.insert("tags".into(), Value::set(["c", "a"]));

        deep_merge(&update, &mut acc);
        assert_eq!(acc.get("tags"), Some(&Value::set(["a", "b", "c"])));
    }

    #[test]
    fn test_copies_do_not_alias_source() {
        let mut update = Map::new();
        update.insert("servers".into(), Value::from(vec!["s1"]));
        update.insert("tags".into(), Value::set(["a"]));

        let mut acc = Map::new();
        deep_merge(&update, &mut acc);

        if let Some(Value::List(items)) = acc.get_mut("servers") {
            items.push(Value::from("s2"));
        }
        if let Some(Value::Set(items)) = acc.get_mut("tags") {
            items.insert(Value::from("b"));
        }

        assert_eq!(update.get("servers"), Some(&Value::from(vec!["s1"])));
        assert_eq!(update.get("tags"), Some(&Value::set(["a"])));
    }

    #[test]
    fn test_map_replaces_scalar() {
        let mut acc = map(json!({"value": 42}));
        deep_merge(&map(json!({"value": {"nested": true}})), &mut acc);
        assert_eq!(acc, map(json!({"value": {"nested": true}})));
    }

    #[test]
    fn test_null_overwrites() {
        let mut acc = map(json!({"a": 1}));
        deep_merge(&map(json!({"a": null})), &mut acc);
        assert_eq!(acc.get("a"), Some(&Value::Null));
    }

    #[test]
    fn test_merge_all_later_wins() {
        let layers = [
            map(json!({"a": 1, "list": [1]})),
            map(json!({"b": 2, "list": [2]})),
            map(json!({"a": 3})),
        ];
        let merged = deep_merge_all(layers.iter());
        assert_eq!(merged, map(json!({"a": 3, "b": 2, "list": [1, 2]})));
    }
}
