//! Validation issues and the aggregate error returned by `check`.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::config::ReportConfig;
use crate::report;

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Render a path as `a.b[0]["="]`; the empty path renders as `(root)`.
pub fn render_path(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return "(root)".to_string();
    }
    let mut out = String::new();
    for segment in path {
        match segment {
            PathSegment::Index(i) => out.push_str(&format!("[{}]", i)),
            PathSegment::Key(k) if is_identifier(k) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(k);
            }
            PathSegment::Key(k) => out.push_str(&format!("[{:?}]", k)),
        }
    }
    out
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// What went wrong at a path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum IssueCode {
    /// Discriminant tag absent or not one of the allowed tags
    InvalidDiscriminant {
        field: String,
        received: Option<String>,
        allowed: Vec<String>,
    },
    /// Tag recognised, but the variant's fields are invalid
    VariantShapeMismatch { tag: String },
    /// Value has the wrong type or violates a constraint
    ShapeMismatch { expected: String, received: String },
    /// A required field is absent
    MissingRequiredField,
    /// Key not declared by the object (strict key policy only)
    UnrecognizedKey { key: String },
    /// No branch of a union accepted the value
    InvalidUnion { branches: usize },
}

impl IssueCode {
    /// Stable snake_case name of the code.
    pub fn name(&self) -> &'static str {
        match self {
            IssueCode::InvalidDiscriminant { .. } => "invalid_discriminant",
            IssueCode::VariantShapeMismatch { .. } => "variant_shape_mismatch",
            IssueCode::ShapeMismatch { .. } => "shape_mismatch",
            IssueCode::MissingRequiredField => "missing_required_field",
            IssueCode::UnrecognizedKey { .. } => "unrecognized_key",
            IssueCode::InvalidUnion { .. } => "invalid_union",
        }
    }

    /// Human description used as the issue message.
    pub fn describe(&self) -> String {
        match self {
            IssueCode::InvalidDiscriminant {
                field,
                received,
                allowed,
            } => {
                let allowed = quote_all(allowed);
                match received {
                    Some(received) => format!(
                        "Invalid discriminator value. Expected {}, received {}",
                        allowed, received
                    ),
                    None => format!("Required discriminator '{}'. Expected {}", field, allowed),
                }
            }
            IssueCode::VariantShapeMismatch { tag } => format!("Invalid '{}' variant", tag),
            IssueCode::ShapeMismatch { expected, received } => {
                format!("Expected {}, received {}", expected, received)
            }
            IssueCode::MissingRequiredField => "Required".to_string(),
            IssueCode::UnrecognizedKey { key } => format!("Unrecognized key '{}'", key),
            IssueCode::InvalidUnion { branches } => {
                format!("Input matched none of the {} accepted shapes", branches)
            }
        }
    }
}

fn quote_all(items: &[String]) -> String {
    items
        .iter()
        .map(|s| format!("'{}'", s))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// A single field-level problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub path: Vec<PathSegment>,
    #[serde(flatten)]
    pub code: IssueCode,
    pub message: String,
}

impl Issue {
    pub fn new(path: Vec<PathSegment>, code: IssueCode) -> Self {
        let message = code.describe();
        Self {
            path,
            code,
            message,
        }
    }

    pub fn path_string(&self) -> String {
        render_path(&self.path)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path_string(), self.message)
    }
}

/// Aggregate failure of a `check` call: every issue found, in document
/// order, plus a pre-rendered summary for display to a column author.
#[derive(Debug, Clone, Error)]
#[error("{readable}")]
pub struct SchemaValidationError {
    issues: Vec<Issue>,
    readable: String,
}

impl SchemaValidationError {
    pub fn new(issues: Vec<Issue>, report: &ReportConfig) -> Self {
        let readable = report::render(&issues, report);
        Self { issues, readable }
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn readable(&self) -> &str {
        &self.readable
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    /// Whether any issue carries the code named `name` (see [`IssueCode::name`]).
    pub fn has_code(&self, name: &str) -> bool {
        self.issues.iter().any(|i| i.code.name() == name)
    }

    /// Issues whose rendered path equals `path`.
    pub fn at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Issue> + 'a {
        self.issues.iter().filter(move |i| i.path_string() == path)
    }
}
