//! Filter and config options.
//!
//! Both are records keyed by a free-form token (a filter's autocomplete
//! token such as `=`, a config key such as `height`). Each entry is
//! discriminated by the `type` of its option value; the key never takes
//! part in dispatch.

use tabula_value::{CellApi, Callable, ColumnApi, Context, Value};

use crate::decode;
use crate::display::{input_descriptor_schema, Form};
use crate::kind::OptionKind;
use crate::schema::{FunctionContract, ObjectSchema, Schema, TaggedUnion};

fn input_form() -> Schema {
    Schema::lazy(input_descriptor_schema)
}

fn option_parse(value: &Schema, kind: OptionKind) -> FunctionContract {
    FunctionContract::column(kind.value_schema())
        .value(value.clone())
        .arg(Schema::any())
}

fn filter_variant(value: &Schema, kind: OptionKind) -> ObjectSchema {
    let form = FunctionContract::column(input_form())
        .value(value.clone())
        .arg(Schema::any());
    ObjectSchema::new()
        .optional("info", Schema::string())
        .optional("form", input_form().or(form))
        .optional("parse", option_parse(value, kind))
        .field(
            "logic",
            FunctionContract::cell(Schema::boolean())
                .value(value.clone())
                .arg(kind.value_schema()),
        )
}

fn config_variant(value: &Schema, kind: OptionKind) -> ObjectSchema {
    let form = FunctionContract::column(input_form()).value(value.clone());
    ObjectSchema::new()
        .field("label", Schema::string())
        .optional("info", Schema::string())
        .field("form", input_form().or(form))
        .optional("parse", option_parse(value, kind))
}

/// Schema of one filter entry for a column holding `value`.
pub fn filter_schema(value: Schema) -> Schema {
    OptionKind::ALL
        .into_iter()
        .fold(TaggedUnion::new("type"), |union, kind| {
            union.variant(kind.tag(), filter_variant(&value, kind))
        })
        .into()
}

/// Schema of one config entry for a column holding `value`.
pub fn config_schema(value: Schema) -> Schema {
    OptionKind::ALL
        .into_iter()
        .fold(TaggedUnion::new("type"), |union, kind| {
            union.variant(kind.tag(), config_variant(&value, kind))
        })
        .into()
}

/// A filter predicate offered for a column.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOption {
    pub kind: OptionKind,
    pub info: Option<String>,
    /// Editor for the comparison value
    pub form: Option<Form>,
    /// `(ColumnApi, raw) -> comparison value`; when absent the consumer casts
    pub parse: Option<Callable>,
    /// `(CellApi, comparison value) -> boolean`
    pub logic: Callable,
}

impl FilterOption {
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            kind: OptionKind::from_tag(map.get("type")?.as_str()?)?,
            info: decode::string(map, "info"),
            form: match map.get("form") {
                Some(form) => Some(Form::from_value(form)?),
                None => None,
            },
            parse: decode::callable(map, "parse"),
            logic: decode::callable(map, "logic")?,
        })
    }

    /// Whether the cell passes the filter for `comparison`.
    pub fn matches(&self, api: &CellApi, comparison: &Value) -> tabula_value::Result<bool> {
        let context = Context::Cell(api.clone());
        let verdict = self
            .logic
            .call_with(&context, std::slice::from_ref(comparison))?;
        Ok(verdict.as_bool().unwrap_or(false))
    }
}

/// A user-settable column configuration entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigOption {
    pub kind: OptionKind,
    pub label: String,
    pub info: Option<String>,
    pub form: Form,
    /// `(ColumnApi, raw) -> config value`; when absent the consumer casts
    pub parse: Option<Callable>,
}

impl ConfigOption {
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            kind: OptionKind::from_tag(map.get("type")?.as_str()?)?,
            label: decode::string(map, "label")?,
            info: decode::string(map, "info"),
            form: Form::from_value(map.get("form")?)?,
            parse: decode::callable(map, "parse"),
        })
    }

    /// Run `parse` on a raw entry; `None` when the option has no parser.
    pub fn parse_raw(&self, api: &ColumnApi, raw: &Value) -> tabula_value::Result<Option<Value>> {
        let Some(parse) = &self.parse else {
            return Ok(None);
        };
        let context = Context::Column(api.clone());
        parse.call_with(&context, std::slice::from_ref(raw)).map(Some)
    }
}
