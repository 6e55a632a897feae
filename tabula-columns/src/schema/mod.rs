//! Composable runtime schemas.
//!
//! A [`Schema`] describes the accepted shape of a [`Value`]. Validation walks
//! the whole input, records every problem as an [`Issue`] with its path, and
//! produces the validated output: the input itself, with declared defaults
//! filled in and callables wrapped in contract guards.
//!
//! Self-referential shapes use [`Schema::lazy`], which stores a function
//! returning a `'static` schema and resolves it only when a value is
//! validated against it.

mod function;
mod object;
mod union;

use std::fmt;

use tabula_value::Value;

use crate::config::{CheckConfig, UnknownKeys};
use crate::issue::{Issue, IssueCode, PathSegment, SchemaValidationError};

pub use function::{ContextScope, FunctionContract};
pub use object::ObjectSchema;
pub use union::TaggedUnion;

/// Stack that must remain before a nested descent moves to a fresh segment.
const RED_ZONE: usize = 128 * 1024;
/// Size of each fresh stack segment.
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

/// Run `f` on a stack with room for another level of nested descent.
/// Layouts nest without limit; recursive walks over documents go through here.
pub(crate) fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, f)
}

/// Marker for a position that failed validation; details are in the issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invalid;

/// `Ok(None)` means "absent and allowed to be".
pub type Checked = std::result::Result<Option<Value>, Invalid>;

/// Forward reference to a schema built on first use.
#[derive(Clone, Copy)]
pub struct LazySchema(fn() -> &'static Schema);

impl LazySchema {
    pub fn get(&self) -> &'static Schema {
        (self.0)()
    }
}

impl fmt::Debug for LazySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Lazy")
    }
}

#[derive(Debug, Clone)]
pub enum Schema {
    Any,
    Never,
    Null,
    String { min_len: usize },
    Number { positive: bool },
    Boolean,
    Date,
    Literal(&'static str),
    OneOf(&'static [&'static str]),
    Array(Box<Schema>),
    Tuple(Vec<Schema>),
    Record(Box<Schema>),
    Object(ObjectSchema),
    Union(Vec<Schema>),
    Tagged(TaggedUnion),
    Optional(Box<Schema>),
    Nullable(Box<Schema>),
    Default(Box<Schema>, Value),
    Function(std::sync::Arc<FunctionContract>),
    Lazy(LazySchema),
}

impl Schema {
    pub fn any() -> Self {
        Schema::Any
    }

    pub fn never() -> Self {
        Schema::Never
    }

    pub fn null() -> Self {
        Schema::Null
    }

    pub fn string() -> Self {
        Schema::String { min_len: 0 }
    }

    pub fn non_empty_string() -> Self {
        Schema::String { min_len: 1 }
    }

    pub fn number() -> Self {
        Schema::Number { positive: false }
    }

    pub fn positive_number() -> Self {
        Schema::Number { positive: true }
    }

    pub fn boolean() -> Self {
        Schema::Boolean
    }

    pub fn date() -> Self {
        Schema::Date
    }

    pub fn literal(tag: &'static str) -> Self {
        Schema::Literal(tag)
    }

    pub fn one_of(tags: &'static [&'static str]) -> Self {
        Schema::OneOf(tags)
    }

    pub fn array(item: impl Into<Schema>) -> Self {
        Schema::Array(Box::new(item.into()))
    }

    pub fn tuple(items: Vec<Schema>) -> Self {
        Schema::Tuple(items)
    }

    pub fn record(value: impl Into<Schema>) -> Self {
        Schema::Record(Box::new(value.into()))
    }

    pub fn union(branches: Vec<Schema>) -> Self {
        Schema::Union(branches)
    }

    pub fn lazy(resolve: fn() -> &'static Schema) -> Self {
        Schema::Lazy(LazySchema(resolve))
    }

    pub fn optional(self) -> Self {
        Schema::Optional(Box::new(self))
    }

    pub fn nullable(self) -> Self {
        Schema::Nullable(Box::new(self))
    }

    /// Absent input validates to `value`.
    pub fn default_to(self, value: impl Into<Value>) -> Self {
        Schema::Default(Box::new(self), value.into())
    }

    /// `self | other`, flattening when `self` is already a union.
    pub fn or(self, other: impl Into<Schema>) -> Self {
        match self {
            Schema::Union(mut branches) => {
                branches.push(other.into());
                Schema::Union(branches)
            }
            first => Schema::Union(vec![first, other.into()]),
        }
    }

    /// Whether an absent value is acceptable.
    pub fn accepts_missing(&self) -> bool {
        match self {
            Schema::Any | Schema::Optional(_) | Schema::Default(..) => true,
            Schema::Nullable(inner) => inner.accepts_missing(),
            Schema::Union(branches) => branches.iter().any(Schema::accepts_missing),
            Schema::Lazy(lazy) => lazy.get().accepts_missing(),
            _ => false,
        }
    }

    /// Short description used in "expected X" messages.
    pub fn describe(&self) -> String {
        match self {
            Schema::Any => "any value".to_string(),
            Schema::Never => "no value".to_string(),
            Schema::Null => "null".to_string(),
            Schema::String { min_len: 0 } => "string".to_string(),
            Schema::String { min_len: 1 } => "non-empty string".to_string(),
            Schema::String { min_len } => format!("string of at least {} characters", min_len),
            Schema::Number { positive: false } => "number".to_string(),
            Schema::Number { positive: true } => "positive number".to_string(),
            Schema::Boolean => "boolean".to_string(),
            Schema::Date => "date".to_string(),
            Schema::Literal(tag) => format!("'{}'", tag),
            Schema::OneOf(tags) => tags
                .iter()
                .map(|t| format!("'{}'", t))
                .collect::<Vec<_>>()
                .join(" | "),
            Schema::Array(item) => format!("array of {}", item.describe()),
            Schema::Tuple(items) => format!("tuple of {}", items.len()),
            Schema::Record(_) => "record".to_string(),
            Schema::Object(_) | Schema::Tagged(_) => "object".to_string(),
            Schema::Union(branches) => branches
                .iter()
                .map(Schema::describe)
                .collect::<Vec<_>>()
                .join(" | "),
            Schema::Optional(inner) | Schema::Default(inner, _) => inner.describe(),
            Schema::Nullable(inner) => format!("{} | null", inner.describe()),
            Schema::Function(_) => "function".to_string(),
            Schema::Lazy(lazy) => lazy.get().describe(),
        }
    }

    /// Validate `value` as a whole document.
    pub fn parse(
        &self,
        value: &Value,
        config: &CheckConfig,
    ) -> std::result::Result<Value, SchemaValidationError> {
        let mut validator = Validator::new(config.unknown_keys);
        match self.validate(Some(value), &mut validator) {
            Ok(out) if validator.is_clean() => Ok(out.unwrap_or(Value::Null)),
            _ => Err(SchemaValidationError::new(
                validator.into_issues(),
                &config.report,
            )),
        }
    }

    /// Validate one position. `None` input means the value is absent.
    pub fn validate(&self, input: Option<&Value>, v: &mut Validator) -> Checked {
        with_stack(|| self.validate_input(input, v))
    }

    fn validate_input(&self, input: Option<&Value>, v: &mut Validator) -> Checked {
        let Some(value) = input else {
            return self.validate_missing(v);
        };
        match self {
            Schema::Any => Ok(Some(value.clone())),
            Schema::Never => v.mismatch(self.describe(), value.type_name()),
            Schema::Null => match value {
                Value::Null => Ok(Some(Value::Null)),
                _ => v.mismatch("null", value.type_name()),
            },
            Schema::String { min_len } => match value {
                Value::String(s) if s.chars().count() >= *min_len => Ok(Some(value.clone())),
                Value::String(_) => v.mismatch(self.describe(), value.preview()),
                _ => v.mismatch(self.describe(), value.type_name()),
            },
            Schema::Number { positive } => match value {
                Value::Number(n) if n.is_nan() => v.mismatch(self.describe(), "NaN"),
                Value::Number(n) if *positive && *n <= 0.0 => {
                    v.mismatch(self.describe(), value.preview())
                }
                Value::Number(_) => Ok(Some(value.clone())),
                _ => v.mismatch(self.describe(), value.type_name()),
            },
            Schema::Boolean => match value {
                Value::Bool(_) => Ok(Some(value.clone())),
                _ => v.mismatch("boolean", value.type_name()),
            },
            Schema::Date => match value {
                Value::Date(_) => Ok(Some(value.clone())),
                _ => v.mismatch("date", value.type_name()),
            },
            Schema::Literal(tag) => match value {
                Value::String(s) if s == tag => Ok(Some(value.clone())),
                _ => v.mismatch(self.describe(), value.preview()),
            },
            Schema::OneOf(tags) => match value {
                Value::String(s) if tags.contains(&s.as_str()) => Ok(Some(value.clone())),
                _ => v.mismatch(self.describe(), value.preview()),
            },
            Schema::Array(item) => match value {
                Value::Array(items) => validate_items(items, |_| Some(item.as_ref()), v),
                _ => v.mismatch(self.describe(), value.type_name()),
            },
            Schema::Tuple(schemas) => match value {
                Value::Array(items) if items.len() <= schemas.len() => {
                    let mut out = Vec::with_capacity(schemas.len());
                    let mut ok = true;
                    for (i, schema) in schemas.iter().enumerate() {
                        match v.nested(i, |v| schema.validate(items.get(i), v)) {
                            Ok(Some(o)) => out.push(o),
                            Ok(None) => {}
                            Err(Invalid) => ok = false,
                        }
                    }
                    if ok {
                        Ok(Some(Value::Array(out)))
                    } else {
                        Err(Invalid)
                    }
                }
                _ => v.mismatch(self.describe(), value.preview()),
            },
            Schema::Record(inner) => match value {
                Value::Object(map) => {
                    let mut out = tabula_value::Map::with_capacity(map.len());
                    let mut ok = true;
                    for (key, item) in map {
                        match v.nested(key.as_str(), |v| inner.validate(Some(item), v)) {
                            Ok(Some(o)) => {
                                out.insert(key.clone(), o);
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
                _ => v.mismatch("record", value.type_name()),
            },
            Schema::Object(object) => match value {
                Value::Object(map) => object.validate_map(map, v),
                _ => v.mismatch("object", value.type_name()),
            },
            Schema::Union(branches) => union::validate_union(self, branches, value, v),
            Schema::Tagged(tagged) => tagged.validate(value, v),
            Schema::Optional(inner) | Schema::Default(inner, _) => inner.validate(Some(value), v),
            Schema::Nullable(inner) => match value {
                Value::Null => Ok(Some(Value::Null)),
                _ => inner.validate(Some(value), v),
            },
            Schema::Function(contract) => contract.validate(value, v),
            Schema::Lazy(lazy) => lazy.get().validate(Some(value), v),
        }
    }

    fn validate_missing(&self, v: &mut Validator) -> Checked {
        match self {
            Schema::Default(_, value) => Ok(Some(value.clone())),
            Schema::Nullable(inner) => inner.validate_missing(v),
            Schema::Lazy(lazy) => lazy.get().validate_missing(v),
            _ if self.accepts_missing() => Ok(None),
            _ => {
                v.report(IssueCode::MissingRequiredField);
                Err(Invalid)
            }
        }
    }
}

fn validate_items<'s>(
    items: &[Value],
    schema_for: impl Fn(usize) -> Option<&'s Schema>,
    v: &mut Validator,
) -> Checked {
    let mut out = Vec::with_capacity(items.len());
    let mut ok = true;
    for (i, item) in items.iter().enumerate() {
        let Some(schema) = schema_for(i) else {
            continue;
        };
        match v.nested(i, |v| schema.validate(Some(item), v)) {
            Ok(Some(o)) => out.push(o),
            Ok(None) => out.push(Value::Null),
            Err(Invalid) => ok = false,
        }
    }
    if ok {
        Ok(Some(Value::Array(out)))
    } else {
        Err(Invalid)
    }
}

impl From<ObjectSchema> for Schema {
    fn from(object: ObjectSchema) -> Self {
        Schema::Object(object)
    }
}

impl From<TaggedUnion> for Schema {
    fn from(tagged: TaggedUnion) -> Self {
        Schema::Tagged(tagged)
    }
}

impl From<FunctionContract> for Schema {
    fn from(contract: FunctionContract) -> Self {
        Schema::Function(std::sync::Arc::new(contract))
    }
}

/// Accumulates issues while a value is walked.
#[derive(Debug)]
pub struct Validator {
    unknown_keys: UnknownKeys,
    path: Vec<PathSegment>,
    issues: Vec<Issue>,
}

impl Validator {
    pub fn new(unknown_keys: UnknownKeys) -> Self {
        Self {
            unknown_keys,
            path: Vec::new(),
            issues: Vec::new(),
        }
    }

    /// Start at `path` instead of the root, e.g. `["returns"]`.
    pub fn at(unknown_keys: UnknownKeys, path: Vec<PathSegment>) -> Self {
        Self {
            unknown_keys,
            path,
            issues: Vec::new(),
        }
    }

    pub fn unknown_keys(&self) -> UnknownKeys {
        self.unknown_keys
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub(crate) fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// Record an issue at the current path.
    pub(crate) fn report(&mut self, code: IssueCode) {
        self.issues.push(Issue::new(self.path.clone(), code));
    }

    /// Record an issue one segment below the current path.
    pub(crate) fn report_at(&mut self, segment: impl Into<PathSegment>, code: IssueCode) {
        let mut path = self.path.clone();
        path.push(segment.into());
        self.issues.push(Issue::new(path, code));
    }

    pub(crate) fn mismatch(
        &mut self,
        expected: impl Into<String>,
        received: impl Into<String>,
    ) -> Checked {
        self.report(IssueCode::ShapeMismatch {
            expected: expected.into(),
            received: received.into(),
        });
        Err(Invalid)
    }

    /// Run `f` one segment deeper.
    pub(crate) fn nested<T>(
        &mut self,
        segment: impl Into<PathSegment>,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        self.path.push(segment.into());
        let out = f(self);
        self.path.pop();
        out
    }

    /// Empty validator at the same path, for trying union branches.
    pub(crate) fn fork(&self) -> Self {
        Self {
            unknown_keys: self.unknown_keys,
            path: self.path.clone(),
            issues: Vec::new(),
        }
    }

    pub(crate) fn absorb(&mut self, issues: Vec<Issue>) {
        self.issues.extend(issues);
    }

    pub(crate) fn issue_count(&self) -> usize {
        self.issues.len()
    }

    pub(crate) fn insert_issue(&mut self, index: usize, issue: Issue) {
        self.issues.insert(index, issue);
    }
}
