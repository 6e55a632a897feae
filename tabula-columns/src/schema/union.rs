//! Plain unions and unions discriminated by a tag field.

use indexmap::IndexMap;
use tabula_value::Value;
use tracing::trace;

use super::{Checked, Invalid, ObjectSchema, Schema, Validator};
use crate::issue::{Issue, IssueCode};

/// Try each branch in order; the first that accepts wins.
///
/// When none accepts, branches that rejected the value's outer type are
/// summarized as one "expected A | B" issue. A single branch that got further
/// reports its own issues; several such branches report an `InvalidUnion`
/// followed by all of theirs.
pub(super) fn validate_union(
    union: &Schema,
    branches: &[Schema],
    value: &Value,
    v: &mut Validator,
) -> Checked {
    let mut deeper: Vec<Vec<Issue>> = Vec::new();

    for branch in branches {
        let mut attempt = v.fork();
        if let Ok(out) = branch.validate(Some(value), &mut attempt) {
            if attempt.is_clean() {
                return Ok(out);
            }
        }
        let issues = attempt.into_issues();
        let shallow = issues.iter().all(|issue| match &issue.code {
            IssueCode::ShapeMismatch { received, .. } => {
                issue.path.as_slice() == v.path() && received == value.type_name()
            }
            _ => false,
        });
        if !shallow {
            deeper.push(issues);
        }
    }

    match deeper.len() {
        0 => v.mismatch(union.describe(), value.type_name()),
        1 => {
            v.absorb(deeper.remove(0));
            Err(Invalid)
        }
        n => {
            v.report(IssueCode::InvalidUnion { branches: n });
            for issues in deeper {
                v.absorb(issues);
            }
            Err(Invalid)
        }
    }
}

/// Objects discriminated by a string tag field.
///
/// Each variant's object schema includes the tag field itself, so the
/// validated output keeps it.
#[derive(Debug, Clone)]
pub struct TaggedUnion {
    field: &'static str,
    variants: IndexMap<&'static str, ObjectSchema>,
}

impl TaggedUnion {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            variants: IndexMap::new(),
        }
    }

    /// Add a variant. Its schema gets `field: literal(tag)` prepended.
    pub fn variant(mut self, tag: &'static str, object: ObjectSchema) -> Self {
        debug_assert!(
            !self.variants.contains_key(tag),
            "variant '{}' declared twice",
            tag
        );
        let object = ObjectSchema::new()
            .field(self.field, Schema::literal(tag))
            .extend(object);
        self.variants.insert(tag, object);
        self
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.variants.keys().copied()
    }

    pub fn get(&self, tag: &str) -> Option<&ObjectSchema> {
        self.variants.get(tag)
    }

    pub(super) fn validate(&self, value: &Value, v: &mut Validator) -> Checked {
        let Value::Object(map) = value else {
            return v.mismatch("object", value.type_name());
        };

        let received = map.get(self.field);
        let variant = match received {
            Some(Value::String(tag)) => self.variants.get_key_value(tag.as_str()),
            _ => None,
        };
        let Some((tag, object)) = variant else {
            v.report_at(
                self.field,
                IssueCode::InvalidDiscriminant {
                    field: self.field.to_string(),
                    received: received.map(Value::preview),
                    allowed: self.tags().map(str::to_string).collect(),
                },
            );
            return Err(Invalid);
        };

        trace!(field = self.field, tag = *tag, "dispatching tagged variant");
        let before = v.issue_count();
        let out = object.validate_map(map, v);
        if v.issue_count() > before {
            let summary = Issue::new(
                v.path().to_vec(),
                IssueCode::VariantShapeMismatch {
                    tag: tag.to_string(),
                },
            );
            v.insert_issue(before, summary);
        }
        out
    }
}
