//! Value sources: where a column's cell values come from.
//!
//! A `cell` source means values are typed into the grid. A `request` source
//! describes HTTP requests an external runtime executes: `read` per cell,
//! `write` per committed cell value, and `list` once for the whole column.
//! Nothing here performs I/O; descriptors only resolve their parameters.

use serde::{Deserialize, Serialize};
use tabula_value::{Callable, Context, Map, Value};

use crate::decode;
use crate::display::{form_schema, Form};
use crate::parse::{parse_value, parse_values};
use crate::schema::{ContextScope, FunctionContract, ObjectSchema, Schema, TaggedUnion};

const METHODS: &[&str] = &["get", "post", "put", "patch"];
const BODY_TYPES: &[&str] = &["json", "form"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
}

impl Method {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "get" => Some(Method::Get),
            "post" => Some(Method::Post),
            "put" => Some(Method::Put),
            "patch" => Some(Method::Patch),
            _ => None,
        }
    }
}

/// Encoding of the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    Json,
    Form,
}

impl BodyType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "json" => Some(BodyType::Json),
            "form" => Some(BodyType::Form),
            _ => None,
        }
    }
}

fn contract(scope: ContextScope, value: &Schema, returns: Schema) -> FunctionContract {
    let contract = match scope {
        ContextScope::Cell => FunctionContract::cell(returns),
        ContextScope::Column => FunctionContract::column(returns),
    };
    contract.value(value.clone())
}

fn record_source(scope: ContextScope, value: &Schema) -> Schema {
    Schema::from(contract(scope, value, Schema::record(Schema::any())))
        .or(Schema::record(Schema::any()))
}

fn request_fields(scope: ContextScope, value: &Schema) -> ObjectSchema {
    ObjectSchema::new()
        .field(
            "url",
            Schema::from(contract(scope, value, Schema::string())).or(Schema::string()),
        )
        .field("method", Schema::one_of(METHODS))
        .optional("type", Schema::one_of(BODY_TYPES))
        .field("validate", contract(scope, value, Schema::boolean()))
        .optional("query", record_source(scope, value))
        .optional("body", record_source(scope, value))
        .optional("headers", record_source(scope, value))
}

fn refetch(scope: ContextScope, value: &Schema) -> Schema {
    request_fields(scope, value)
        .field("every", Schema::positive_number())
        .partial()
        .into()
}

/// Schema of a column's `value` for a column holding `value`.
pub fn value_source_schema(value: Schema) -> Schema {
    let cell_parse = || parse_value(value.clone(), Schema::any()).value(value.clone());
    let read = request_fields(ContextScope::Cell, &value)
        .optional("parse", cell_parse())
        .optional("refetch", refetch(ContextScope::Cell, &value));
    let write = request_fields(ContextScope::Cell, &value)
        .optional("parse", cell_parse())
        .optional("refetch", Schema::never());
    let list = request_fields(ContextScope::Column, &value)
        .optional(
            "parse",
            parse_values(value.clone(), Schema::any()).value(value.clone()),
        )
        .optional("refetch", refetch(ContextScope::Column, &value));

    TaggedUnion::new("type")
        .variant(
            "cell",
            ObjectSchema::new()
                .optional("info", Schema::string())
                .optional("form", form_schema(value.clone())),
        )
        .variant(
            "request",
            ObjectSchema::new()
                .optional("info", Schema::string())
                .optional("read", read)
                .optional("write", write)
                .optional("list", list),
        )
        .into()
}

/// A string, or a function computing one from the context.
#[derive(Debug, Clone, PartialEq)]
pub enum UrlSource {
    Fixed(String),
    Computed(Callable),
}

/// A record, or a function computing one from the context.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordSource {
    Fixed(Map),
    Computed(Callable),
}

impl UrlSource {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(url) => Some(UrlSource::Fixed(url.clone())),
            Value::Function(f) => Some(UrlSource::Computed(f.clone())),
            _ => None,
        }
    }

    pub fn resolve(&self, context: &Context) -> tabula_value::Result<String> {
        match self {
            UrlSource::Fixed(url) => Ok(url.clone()),
            UrlSource::Computed(f) => {
                let url = f.call_with(context, &[])?;
                Ok(url.as_str().unwrap_or_default().to_string())
            }
        }
    }
}

impl RecordSource {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(RecordSource::Fixed(map.clone())),
            Value::Function(f) => Some(RecordSource::Computed(f.clone())),
            _ => None,
        }
    }

    pub fn resolve(&self, context: &Context) -> tabula_value::Result<Map> {
        match self {
            RecordSource::Fixed(map) => Ok(map.clone()),
            RecordSource::Computed(f) => {
                let record = f.call_with(context, &[])?;
                Ok(record.as_object().cloned().unwrap_or_default())
            }
        }
    }
}

fn optional_record(map: &Map, key: &str) -> Option<Option<RecordSource>> {
    match decode::present(map, key) {
        Some(value) => RecordSource::from_value(value).map(Some),
        None => Some(None),
    }
}

/// Parameters of one HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub url: UrlSource,
    pub method: Method,
    pub body_type: Option<BodyType>,
    /// The request fires only when this returns true
    pub validate: Callable,
    pub query: Option<RecordSource>,
    pub body: Option<RecordSource>,
    pub headers: Option<RecordSource>,
}

impl RequestDescriptor {
    fn from_map(map: &Map) -> Option<Self> {
        Some(Self {
            url: UrlSource::from_value(map.get("url")?)?,
            method: Method::from_tag(map.get("method")?.as_str()?)?,
            body_type: decode::string(map, "type").and_then(|t| BodyType::from_tag(&t)),
            validate: decode::callable(map, "validate")?,
            query: optional_record(map, "query")?,
            body: optional_record(map, "body")?,
            headers: optional_record(map, "headers")?,
        })
    }

    pub fn should_fire(&self, context: &Context) -> tabula_value::Result<bool> {
        let verdict = self.validate.call_with(context, &[])?;
        Ok(verdict.as_bool().unwrap_or(false))
    }

    pub fn resolve_url(&self, context: &Context) -> tabula_value::Result<String> {
        self.url.resolve(context)
    }

    pub fn resolve_query(&self, context: &Context) -> tabula_value::Result<Option<Map>> {
        self.query.as_ref().map(|q| q.resolve(context)).transpose()
    }

    pub fn resolve_body(&self, context: &Context) -> tabula_value::Result<Option<Map>> {
        self.body.as_ref().map(|b| b.resolve(context)).transpose()
    }

    pub fn resolve_headers(&self, context: &Context) -> tabula_value::Result<Option<Map>> {
        self.headers.as_ref().map(|h| h.resolve(context)).transpose()
    }
}

/// Polling settings; every request field may override the parent's.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Refetch {
    /// Interval in milliseconds
    pub every: Option<f64>,
    pub url: Option<UrlSource>,
    pub method: Option<Method>,
    pub body_type: Option<BodyType>,
    pub validate: Option<Callable>,
    pub query: Option<RecordSource>,
    pub body: Option<RecordSource>,
    pub headers: Option<RecordSource>,
}

impl Refetch {
    fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            every: decode::number(map, "every"),
            url: map.get("url").and_then(UrlSource::from_value),
            method: decode::string(map, "method").and_then(|m| Method::from_tag(&m)),
            body_type: decode::string(map, "type").and_then(|t| BodyType::from_tag(&t)),
            validate: decode::callable(map, "validate"),
            query: optional_record(map, "query")?,
            body: optional_record(map, "body")?,
            headers: optional_record(map, "headers")?,
        })
    }
}

fn refetch_of(map: &Map) -> Option<Option<Refetch>> {
    match map.get("refetch") {
        Some(value) => Refetch::from_value(value).map(Some),
        None => Some(None),
    }
}

/// Fetches a single cell's value.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadRequest {
    pub request: RequestDescriptor,
    /// parse-value function applied to the response
    pub parse: Option<Callable>,
    pub refetch: Option<Refetch>,
}

/// Sends a committed cell value; never polled.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRequest {
    pub request: RequestDescriptor,
    pub parse: Option<Callable>,
}

/// Fetches values for the whole column.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRequest {
    pub request: RequestDescriptor,
    /// parse-values function applied to the response
    pub parse: Option<Callable>,
    pub refetch: Option<Refetch>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellSource {
    pub info: Option<String>,
    pub form: Option<Form>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestSource {
    pub info: Option<String>,
    pub read: Option<ReadRequest>,
    pub write: Option<WriteRequest>,
    pub list: Option<ListRequest>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueSource {
    Cell(CellSource),
    Request(RequestSource),
}

impl ValueSource {
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let info = decode::string(map, "info");
        match map.get("type")?.as_str()? {
            "cell" => Some(ValueSource::Cell(CellSource {
                info,
                form: match map.get("form") {
                    Some(form) => Some(Form::from_value(form)?),
                    None => None,
                },
            })),
            "request" => {
                let mut source = RequestSource {
                    info,
                    ..Default::default()
                };
                if let Some(read) = decode::object(map, "read") {
                    source.read = Some(ReadRequest {
                        request: RequestDescriptor::from_map(read)?,
                        parse: decode::callable(read, "parse"),
                        refetch: refetch_of(read)?,
                    });
                }
                if let Some(write) = decode::object(map, "write") {
                    source.write = Some(WriteRequest {
                        request: RequestDescriptor::from_map(write)?,
                        parse: decode::callable(write, "parse"),
                    });
                }
                if let Some(list) = decode::object(map, "list") {
                    source.list = Some(ListRequest {
                        request: RequestDescriptor::from_map(list)?,
                        parse: decode::callable(list, "parse"),
                        refetch: refetch_of(list)?,
                    });
                }
                Some(ValueSource::Request(source))
            }
            _ => None,
        }
    }

    pub fn info(&self) -> Option<&str> {
        match self {
            ValueSource::Cell(cell) => cell.info.as_deref(),
            ValueSource::Request(request) => request.info.as_deref(),
        }
    }
}
