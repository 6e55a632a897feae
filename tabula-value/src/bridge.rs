//! Conversion between `serde_json::Value` and [`Value`]
//!
//! JSON → `Value` is total: JSON has no dates and no functions. The other
//! direction follows `JSON.stringify`: dates become RFC 3339 strings,
//! function-valued object keys are omitted and functions inside arrays
//! become `null`.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::value::{Map, Value};

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            // Numbers outside f64 range don't occur in serde_json without arbitrary_precision
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect::<Map>(),
            ),
        }
    }
}

/// Convert a `Value` to JSON the way `JSON.stringify` would.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null | Value::Function(_) => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Date(d) => serde_json::Value::String(d.to_rfc3339()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Object(map) => serde_json::Value::Object(
            stringified_entries(map)
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect(),
        ),
    }
}

/// Object entries `JSON.stringify` keeps.
fn stringified_entries(map: &Map) -> impl Iterator<Item = (&String, &Value)> {
    map.iter().filter(|(_, v)| !matches!(v, Value::Function(_)))
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        to_json(value)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null | Value::Function(_) => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Date(d) => serializer.serialize_str(&d.to_rfc3339()),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let mut out = serializer.serialize_map(Some(stringified_entries(map).count()))?;
                for (k, v) in stringified_entries(map) {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}
