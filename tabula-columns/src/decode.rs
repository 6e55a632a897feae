//! Field accessors for reading typed views out of validated documents.
//!
//! Required fields are read with `?`: a `None` from a validated document
//! means the typed view and its schema disagree.

use indexmap::IndexMap;
use tabula_value::{Callable, Map, Value};

pub(crate) fn string(map: &Map, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

pub(crate) fn number(map: &Map, key: &str) -> Option<f64> {
    map.get(key).and_then(Value::as_f64)
}

pub(crate) fn boolean(map: &Map, key: &str) -> Option<bool> {
    map.get(key).and_then(Value::as_bool)
}

pub(crate) fn callable(map: &Map, key: &str) -> Option<Callable> {
    map.get(key).and_then(Value::as_callable).cloned()
}

pub(crate) fn object<'a>(map: &'a Map, key: &str) -> Option<&'a Map> {
    map.get(key).and_then(Value::as_object)
}

/// Present and not `null`.
pub(crate) fn present<'a>(map: &'a Map, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| !value.is_null())
}

/// Decode every entry of the record at `key`; an absent record is empty.
pub(crate) fn record<T>(
    map: &Map,
    key: &str,
    decode: impl Fn(&Value) -> Option<T>,
) -> Option<IndexMap<String, T>> {
    let Some(entries) = map.get(key) else {
        return Some(IndexMap::new());
    };
    entries
        .as_object()?
        .iter()
        .map(|(name, value)| Some((name.clone(), decode(value)?)))
        .collect()
}

/// Decode every item of the array at `key`.
pub(crate) fn list<T>(map: &Map, key: &str, decode: impl Fn(&Value) -> Option<T>) -> Option<Vec<T>> {
    map.get(key)?.as_array()?.iter().map(decode).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Map {
        Value::from(json!({
            "name": "a",
            "gap": 2,
            "grow": true,
            "items": [1, 2],
            "filters": {"=": 1, "<": 2},
            "empty": null
        }))
        .as_object()
        .unwrap()
        .clone()
    }

    #[test]
    fn reads_fields() {
        let map = doc();
        assert_eq!(string(&map, "name").as_deref(), Some("a"));
        assert_eq!(number(&map, "gap"), Some(2.0));
        assert_eq!(boolean(&map, "grow"), Some(true));
        assert_eq!(string(&map, "gap"), None);
        assert!(present(&map, "empty").is_none());
        assert!(callable(&map, "name").is_none());
    }

    #[test]
    fn reads_collections() {
        let map = doc();
        let items = list(&map, "items", Value::as_f64).unwrap();
        assert_eq!(items, vec![1.0, 2.0]);
        let filters = record(&map, "filters", Value::as_f64).unwrap();
        assert_eq!(filters.keys().collect::<Vec<_>>(), vec!["=", "<"]);
        assert!(record(&map, "missing", Value::as_f64).unwrap().is_empty());
        assert!(record(&map, "items", Value::as_f64).is_none());
    }
}
