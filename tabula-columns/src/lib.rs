//! Column definition schema and validation engine
//!
//! `tabula-columns` validates the declarative definition of a spreadsheet
//! column: how it stores, displays, parses, filters, configures and fetches
//! its values. Definitions are untrusted documents that embed user functions;
//! validation checks their shape, guards every embedded function with its
//! contract, and reports every problem at once.
//!
//! # Architecture
//!
//! - **Schema engine** ([`schema`]): composable runtime schemas with tagged
//!   unions, function contracts and lazily resolved self references
//! - **Schema families**: display widgets ([`display`]), filter and config
//!   options ([`option`]), lifecycle hooks ([`events`]), value sources
//!   ([`request`]), all rooted at the column schema ([`column`])
//! - **Typed views**: a successful [`check`] yields a [`ColumnDefinition`]
//!   narrowed to its [`ValueKind`]
//! - **Reports**: failures carry every [`Issue`] plus a readable summary
//!   shaped by [`ReportConfig`]
//!
//! ```
//! use serde_json::json;
//!
//! let column = tabula_columns::check_json(&json!({
//!     "type": "string",
//!     "name": "title",
//!     "info": "Title of the row",
//! }))
//! .unwrap();
//! assert_eq!(column.name, "title");
//! ```

pub mod api;
pub mod check;
pub mod column;
pub mod config;
mod decode;
pub mod display;
pub mod error;
pub mod events;
pub mod issue;
pub mod kind;
pub mod option;
pub mod parse;
pub mod report;
pub mod request;
pub mod schema;

pub use check::{check, check_configured, check_json, check_with};
pub use column::{column_schema, ColumnDefinition, Exposed, Menu, MenuItem};
pub use config::{CheckConfig, ReportConfig, UnknownKeys};
pub use display::{
    ColumnDisplay, DisplayDescriptor, Form, InputDescriptor, InputKind, LayoutNode,
    StaticDescriptor, StaticKind,
};
pub use error::{ColumnsError, Result};
pub use events::{Event, Events};
pub use issue::{Issue, IssueCode, PathSegment, SchemaValidationError};
pub use kind::{OptionKind, ValueKind};
pub use option::{ConfigOption, FilterOption};
pub use parse::{ParsedValue, ParsedValues};
pub use request::{
    CellSource, ListRequest, Method, ReadRequest, RequestDescriptor, RequestSource, ValueSource,
    WriteRequest,
};
pub use schema::{FunctionContract, ObjectSchema, Schema, TaggedUnion};
pub use tabula_value::{CellApi, ColumnApi, ColumnScope, Value};
