//! Layout nodes arranging other display descriptors.
//!
//! Nodes nest without limit: a row's `content` and a stack's `items` are full
//! display descriptors, resolved through [`super::descriptor_schema`].

use tabula_value::Value;

use super::registry::Family;
use super::DisplayDescriptor;
use crate::decode;
use crate::schema::{with_stack, ObjectSchema, Schema};

pub const GRID: &str = "grid";
pub const STACK: &str = "stack";

fn node() -> Schema {
    Schema::lazy(super::descriptor_schema)
}

fn row() -> ObjectSchema {
    ObjectSchema::new()
        .optional("order", Schema::number())
        .optional(
            "span",
            Schema::number().or(Schema::one_of(&["auto", "content"])),
        )
        .optional("offset", Schema::number())
        .field("content", node())
}

pub(crate) fn family() -> Family {
    Family::new("layout")
        .variant(
            GRID,
            ObjectSchema::new()
                .optional("grow", Schema::boolean())
                .optional("gap", Schema::number())
                .optional("columns", Schema::number())
                .field("rows", Schema::array(row())),
        )
        .variant(
            STACK,
            ObjectSchema::new()
                .optional("gap", Schema::number())
                .field("items", Schema::array(node())),
        )
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutNode {
    Grid(Grid),
    Stack(Stack),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub grow: Option<bool>,
    pub gap: Option<f64>,
    pub columns: Option<f64>,
    pub rows: Vec<GridRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub order: Option<f64>,
    pub span: Option<Span>,
    pub offset: Option<f64>,
    pub content: DisplayDescriptor,
}

/// How many grid columns a row occupies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Span {
    Columns(f64),
    Auto,
    Content,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    pub gap: Option<f64>,
    pub items: Vec<DisplayDescriptor>,
}

impl LayoutNode {
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        match map.get("type")?.as_str()? {
            GRID => Some(LayoutNode::Grid(Grid {
                grow: decode::boolean(map, "grow"),
                gap: decode::number(map, "gap"),
                columns: decode::number(map, "columns"),
                rows: decode::list(map, "rows", GridRow::from_value)?,
            })),
            STACK => Some(LayoutNode::Stack(Stack {
                gap: decode::number(map, "gap"),
                items: decode::list(map, "items", DisplayDescriptor::from_value)?,
            })),
            _ => None,
        }
    }

    /// Nesting depth; a layout holding only widgets has depth 1.
    pub fn depth(&self) -> usize {
        let children: Box<dyn Iterator<Item = &DisplayDescriptor>> = match self {
            LayoutNode::Grid(grid) => Box::new(grid.rows.iter().map(|row| &row.content)),
            LayoutNode::Stack(stack) => Box::new(stack.items.iter()),
        };
        1 + children
            .filter_map(|child| match child {
                DisplayDescriptor::Layout(node) => Some(with_stack(|| node.depth())),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }
}

impl GridRow {
    fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let span = match map.get("span") {
            Some(Value::Number(n)) => Some(Span::Columns(*n)),
            Some(Value::String(s)) if s == "auto" => Some(Span::Auto),
            Some(Value::String(s)) if s == "content" => Some(Span::Content),
            _ => None,
        };
        Some(Self {
            order: decode::number(map, "order"),
            span,
            offset: decode::number(map, "offset"),
            content: DisplayDescriptor::from_value(map.get("content")?)?,
        })
    }
}
