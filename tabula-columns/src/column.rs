//! The column definition: root of the schema tree.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use tabula_value::{CellApi, Callable, Context, Value};
use tracing::trace;

use crate::decode;
use crate::display::{display_schema, ColumnDisplay};
use crate::events::{events_schema, Events};
use crate::kind::ValueKind;
use crate::option::{config_schema, filter_schema, ConfigOption, FilterOption};
use crate::parse::{parse_value, ParsedValue};
use crate::request::{value_source_schema, ValueSource};
use crate::schema::{FunctionContract, ObjectSchema, Schema, TaggedUnion};

fn primitive() -> Schema {
    Schema::number()
        .or(Schema::string())
        .or(Schema::boolean())
        .or(Schema::null())
}

fn menu_item(scope_contract: FunctionContract) -> Schema {
    Schema::record(
        ObjectSchema::new()
            .field("label", Schema::string())
            .optional("info", Schema::string())
            .field("action", scope_contract),
    )
}

/// Fields of the column variant for `kind`, besides `type`.
fn column_variant(kind: ValueKind) -> ObjectSchema {
    let value = kind.value_schema();
    let cell = |returns: Schema| FunctionContract::cell(returns).value(value.clone());

    let expose = ObjectSchema::new()
        .optional("label", Schema::string())
        .optional("info", Schema::string())
        .field("returns", cell(Schema::any()));
    let menu = ObjectSchema::new()
        .optional("cell", menu_item(cell(Schema::any())))
        .optional(
            "column",
            menu_item(FunctionContract::column(Schema::any()).value(value.clone())),
        );

    ObjectSchema::new()
        .field("name", Schema::non_empty_string())
        .field("info", Schema::string())
        .optional("display", display_schema(value.clone()))
        .optional(
            "parse",
            parse_value(value.clone(), Schema::any()).value(value.clone()),
        )
        .optional("primitive", cell(primitive()))
        .optional("filters", Schema::record(filter_schema(value.clone())))
        .optional("config", Schema::record(config_schema(value.clone())))
        .optional("expose", Schema::record(expose))
        .optional("menu", menu)
        .optional("events", events_schema(value.clone()))
        .optional("value", value_source_schema(value))
}

static COLUMN: Lazy<Schema> = Lazy::new(|| {
    trace!("initialising column definition schema");
    ValueKind::ALL
        .into_iter()
        .fold(TaggedUnion::new("type"), |union, kind| {
            union.variant(kind.tag(), column_variant(kind))
        })
        .into()
});

/// Schema every column definition is validated against.
pub fn column_schema() -> &'static Schema {
    &COLUMN
}

/// A value another column can read from this one.
#[derive(Debug, Clone, PartialEq)]
pub struct Exposed {
    pub label: Option<String>,
    pub info: Option<String>,
    /// `(CellApi) -> any`
    pub returns: Callable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub label: String,
    pub info: Option<String>,
    pub action: Callable,
}

/// Context-menu entries for a cell and for the column header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Menu {
    pub cell: IndexMap<String, MenuItem>,
    pub column: IndexMap<String, MenuItem>,
}

impl Exposed {
    fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            label: decode::string(map, "label"),
            info: decode::string(map, "info"),
            returns: decode::callable(map, "returns")?,
        })
    }
}

impl MenuItem {
    fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            label: decode::string(map, "label")?,
            info: decode::string(map, "info"),
            action: decode::callable(map, "action")?,
        })
    }
}

impl Menu {
    fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            cell: decode::record(map, "cell", MenuItem::from_value)?,
            column: decode::record(map, "column", MenuItem::from_value)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.cell.is_empty() && self.column.is_empty()
    }
}

/// A validated column definition.
///
/// Callables inside are guarded by their contracts. The validated document
/// is kept as is and returned by [`ColumnDefinition::to_value`], so checking
/// it again yields an equal definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub kind: ValueKind,
    pub name: String,
    /// Markdown
    pub info: String,
    pub display: Option<ColumnDisplay>,
    pub parse: Option<Callable>,
    /// Sort and group representation of a cell value
    pub primitive: Option<Callable>,
    pub filters: IndexMap<String, FilterOption>,
    pub config: IndexMap<String, ConfigOption>,
    pub expose: IndexMap<String, Exposed>,
    pub menu: Menu,
    pub events: Events,
    pub value: Option<ValueSource>,
    document: Value,
}

impl ColumnDefinition {
    /// Read the typed view of a document that passed [`column_schema`].
    pub(crate) fn from_validated(document: Value) -> Option<Self> {
        let map = document.as_object()?;
        let definition = Self {
            kind: ValueKind::from_tag(map.get("type")?.as_str()?)?,
            name: decode::string(map, "name")?,
            info: decode::string(map, "info")?,
            display: match map.get("display") {
                Some(display) => Some(ColumnDisplay::from_value(display)?),
                None => None,
            },
            parse: decode::callable(map, "parse"),
            primitive: decode::callable(map, "primitive"),
            filters: decode::record(map, "filters", FilterOption::from_value)?,
            config: decode::record(map, "config", ConfigOption::from_value)?,
            expose: decode::record(map, "expose", Exposed::from_value)?,
            menu: match map.get("menu") {
                Some(menu) => Menu::from_value(menu)?,
                None => Menu::default(),
            },
            events: match map.get("events") {
                Some(events) => Events::from_value(events)?,
                None => Events::default(),
            },
            value: match map.get("value") {
                Some(source) => Some(ValueSource::from_value(source)?),
                None => None,
            },
            document: Value::Null,
        };
        Some(Self {
            document,
            ..definition
        })
    }

    /// The validated document.
    pub fn to_value(&self) -> &Value {
        &self.document
    }

    pub fn into_value(self) -> Value {
        self.document
    }

    /// Sort/group representation of the cell's value. Without a `primitive`
    /// function the value itself is used.
    pub fn primitive_of(&self, api: &CellApi) -> tabula_value::Result<Value> {
        match &self.primitive {
            Some(primitive) => primitive.call_with(&Context::Cell(api.clone()), &[]),
            None => Ok(api.value.clone()),
        }
    }

    /// Run the column's `parse` on a raw entry; `None` without one.
    pub fn parse_entry(&self, api: &CellApi, raw: &Value) -> tabula_value::Result<Option<ParsedValue>> {
        let Some(parse) = &self.parse else {
            return Ok(None);
        };
        let output = parse.call_with(&Context::Cell(api.clone()), std::slice::from_ref(raw))?;
        Ok(Some(ParsedValue::from_output(output)))
    }
}
