//! Object schemas with named fields.

use indexmap::IndexMap;
use tabula_value::{Map, Value};

use super::{Checked, Invalid, Schema, Validator};
use crate::config::UnknownKeys;
use crate::issue::IssueCode;

/// Named fields, each with its own schema. Keys the object does not declare
/// are handled by the validator's [`UnknownKeys`] policy.
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    fields: IndexMap<&'static str, Schema>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field; redeclaring a name replaces its schema.
    pub fn field(mut self, name: &'static str, schema: impl Into<Schema>) -> Self {
        self.fields.insert(name, schema.into());
        self
    }

    /// Declare a field that may be absent.
    pub fn optional(self, name: &'static str, schema: impl Into<Schema>) -> Self {
        self.field(name, schema.into().optional())
    }

    /// Add every field of `other`, replacing same-named fields.
    pub fn extend(mut self, other: ObjectSchema) -> Self {
        self.fields.extend(other.fields);
        self
    }

    /// Remove the named fields.
    pub fn omit(mut self, names: &[&str]) -> Self {
        for name in names {
            self.fields.shift_remove(*name);
        }
        self
    }

    /// Make every field optional.
    pub fn partial(mut self) -> Self {
        for schema in self.fields.values_mut() {
            if !schema.accepts_missing() {
                let inner = std::mem::replace(schema, Schema::Never);
                *schema = inner.optional();
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.fields.get(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    /// Validate an object's entries. Output keeps the input's key order,
    /// followed by any defaults filled in for absent fields.
    pub fn validate_map(&self, map: &Map, v: &mut Validator) -> Checked {
        let mut out = Map::with_capacity(map.len());
        let mut ok = true;

        for (key, value) in map {
            match self.fields.get(key.as_str()) {
                Some(schema) => match v.nested(key.as_str(), |v| schema.validate(Some(value), v)) {
                    Ok(Some(checked)) => {
                        out.insert(key.clone(), checked);
                    }
                    Ok(None) => {}
                    Err(Invalid) => ok = false,
                },
                None => match v.unknown_keys() {
                    UnknownKeys::Passthrough => {
                        out.insert(key.clone(), value.clone());
                    }
                    UnknownKeys::Strip => {}
                    UnknownKeys::Strict => {
                        v.report(IssueCode::UnrecognizedKey { key: key.clone() });
                        ok = false;
                    }
                },
            }
        }

        for (name, schema) in &self.fields {
            if map.contains_key(*name) {
                continue;
            }
            match v.nested(*name, |v| schema.validate(None, v)) {
                Ok(Some(filled)) => {
                    out.insert(name.to_string(), filled);
                }
                Ok(None) => {}
                Err(Invalid) => ok = false,
            }
        }

        if ok {
            Ok(Some(Value::Object(out)))
        } else {
            Err(Invalid)
        }
    }
}
