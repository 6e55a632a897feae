//! Input widgets: editors rendered for a cell, a config entry or a filter.

use std::fmt;

use once_cell::sync::Lazy;
use tabula_value::{CellApi, Callable, Context, Value};
use tracing::trace;

use super::registry::{self, Family};
use crate::decode;
use crate::parse::{self, ParsedValue};
use crate::schema::{FunctionContract, ObjectSchema, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    Text,
    Month,
    Time,
    Number,
    Date,
    Select,
    Week,
    Checkbox,
    Color,
    Range,
    /// Picks another column by id
    Column,
}

impl InputKind {
    pub const ALL: [InputKind; 11] = [
        InputKind::Text,
        InputKind::Month,
        InputKind::Time,
        InputKind::Number,
        InputKind::Date,
        InputKind::Select,
        InputKind::Week,
        InputKind::Checkbox,
        InputKind::Color,
        InputKind::Range,
        InputKind::Column,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Month => "month",
            InputKind::Time => "time",
            InputKind::Number => "number",
            InputKind::Date => "date",
            InputKind::Select => "select",
            InputKind::Week => "week",
            InputKind::Checkbox => "checkbox",
            InputKind::Color => "color",
            InputKind::Range => "range",
            InputKind::Column => "column",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Schema of the value the widget edits.
    pub fn value_schema(&self) -> Schema {
        match self {
            InputKind::Text | InputKind::Color | InputKind::Column => Schema::string(),
            InputKind::Month | InputKind::Time | InputKind::Date | InputKind::Week => {
                Schema::date()
            }
            InputKind::Number | InputKind::Range => Schema::number(),
            InputKind::Select => Schema::string().or(Schema::array(Schema::string())),
            InputKind::Checkbox => Schema::boolean().optional(),
        }
    }

    fn props_fields(&self) -> ObjectSchema {
        let props = ObjectSchema::new();
        match self {
            InputKind::Text => props
                .optional("minlength", Schema::number())
                .optional("maxlength", Schema::number()),
            InputKind::Number => props.optional("step", Schema::number()),
            InputKind::Select => props.optional("multiple", Schema::boolean()).field(
                "options",
                Schema::array(
                    ObjectSchema::new()
                        .field("value", Schema::any())
                        .optional("label", Schema::string()),
                ),
            ),
            InputKind::Range => props
                .field("min", Schema::number())
                .field("max", Schema::number())
                .optional("step", Schema::number()),
            _ => props,
        }
    }

    /// Fields of this widget's descriptor, besides `type`.
    pub(crate) fn variant(&self) -> ObjectSchema {
        if *self == InputKind::Column {
            return ObjectSchema::new();
        }
        let value = self.value_schema();
        let props = self
            .props_fields()
            .field("value", value.clone().nullable());
        ObjectSchema::new()
            .optional("error", Schema::string().nullable())
            .optional(
                "props",
                FunctionContract::cell(props).arg(value.clone().nullable()),
            )
            .optional("parse", parse::parse_value(value.clone(), value.nullable()))
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

pub(crate) fn family() -> Family {
    InputKind::ALL
        .into_iter()
        .fold(Family::new("input"), |family, kind| {
            family.variant(kind.tag(), kind.variant())
        })
}

static INPUT_DESCRIPTOR: Lazy<Schema> = Lazy::new(|| {
    trace!("initialising input descriptor schema");
    registry::compose("type", vec![family()], &[])
        .expect("invalid built-in input family")
        .into()
});

/// Tagged union of every input widget.
pub fn input_descriptor_schema() -> &'static Schema {
    &INPUT_DESCRIPTOR
}

/// A validated input widget descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct InputDescriptor {
    pub kind: InputKind,
    pub error: Option<String>,
    /// `(CellApi, value | null) -> props`
    pub props: Option<Callable>,
    /// `(CellApi, value | null) -> parse result`
    pub parse: Option<Callable>,
}

impl InputDescriptor {
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let kind = InputKind::from_tag(map.get("type")?.as_str()?)?;
        Some(Self {
            kind,
            error: decode::string(map, "error"),
            props: decode::callable(map, "props"),
            parse: decode::callable(map, "parse"),
        })
    }

    /// Props for rendering the widget, or `None` when the descriptor has no
    /// `props` function and the caller injects `value` itself.
    pub fn render_props(&self, api: &CellApi, value: &Value) -> tabula_value::Result<Option<Value>> {
        let Some(props) = &self.props else {
            return Ok(None);
        };
        let context = Context::Cell(api.clone());
        props.call_with(&context, std::slice::from_ref(value)).map(Some)
    }

    /// Run the widget's `parse` on a raw entry.
    pub fn parse_entry(&self, api: &CellApi, raw: &Value) -> tabula_value::Result<Option<ParsedValue>> {
        let Some(parse) = &self.parse else {
            return Ok(None);
        };
        let context = Context::Cell(api.clone());
        let output = parse.call_with(&context, std::slice::from_ref(raw))?;
        Ok(Some(ParsedValue::from_output(output)))
    }
}
