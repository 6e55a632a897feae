//! Display descriptors: what a column renders in its cells and forms.
//!
//! Three widget families share the `type` discriminant: static widgets,
//! input widgets and layouts. `checkbox` and `range` exist as both static and
//! input widgets; in a display slot they resolve to the static widget.

pub mod input;
pub mod layout;
pub mod registry;
pub mod statics;

use once_cell::sync::Lazy;
use tabula_value::{Callable, Value};
use tracing::trace;

use crate::error::Result;
use crate::schema::{with_stack, FunctionContract, Schema, TaggedUnion};

pub use input::{input_descriptor_schema, InputDescriptor, InputKind};
pub use layout::{Grid, GridRow, LayoutNode, Span, Stack};
pub use registry::{compose, Family};
pub use statics::{StaticDescriptor, StaticKind};

/// Tags registered by more than one family on purpose.
pub const SHARED_TAGS: &[&str] = &["checkbox", "range"];

/// Build the display union, checking tag registration.
pub fn registry() -> Result<TaggedUnion> {
    compose(
        "type",
        vec![statics::family(), input::family(), layout::family()],
        SHARED_TAGS,
    )
}

static DESCRIPTOR: Lazy<Schema> = Lazy::new(|| {
    trace!("initialising display descriptor schema");
    registry()
        .expect("invalid built-in display families")
        .into()
});

/// Tagged union of every static, input and layout descriptor.
pub fn descriptor_schema() -> &'static Schema {
    &DESCRIPTOR
}

/// A column's `display`: a descriptor, or `(CellApi<V>) -> descriptor`.
pub fn display_schema(value: Schema) -> Schema {
    Schema::from(FunctionContract::cell(Schema::lazy(descriptor_schema)).value(value))
        .or(Schema::lazy(descriptor_schema))
}

/// A cell form: an input descriptor, or `(CellApi<V>) -> input descriptor`.
pub fn form_schema(value: Schema) -> Schema {
    Schema::from(FunctionContract::cell(Schema::lazy(input_descriptor_schema)).value(value))
        .or(Schema::lazy(input_descriptor_schema))
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayDescriptor {
    Input(InputDescriptor),
    Static(StaticDescriptor),
    Layout(LayoutNode),
}

impl DisplayDescriptor {
    /// Read a validated descriptor. Shared tags read as static widgets.
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        let tag = value.get("type")?.as_str()?;
        if StaticKind::from_tag(tag).is_some() {
            StaticDescriptor::from_value(value).map(DisplayDescriptor::Static)
        } else if InputKind::from_tag(tag).is_some() {
            InputDescriptor::from_value(value).map(DisplayDescriptor::Input)
        } else {
            with_stack(|| LayoutNode::from_value(value)).map(DisplayDescriptor::Layout)
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            DisplayDescriptor::Input(input) => input.kind.tag(),
            DisplayDescriptor::Static(widget) => widget.kind.tag(),
            DisplayDescriptor::Layout(LayoutNode::Grid(_)) => layout::GRID,
            DisplayDescriptor::Layout(LayoutNode::Stack(_)) => layout::STACK,
        }
    }
}

/// The `display` slot of a column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDisplay {
    /// Computes a descriptor per cell
    Render(Callable),
    Descriptor(DisplayDescriptor),
}

impl ColumnDisplay {
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Function(render) => Some(ColumnDisplay::Render(render.clone())),
            other => DisplayDescriptor::from_value(other).map(ColumnDisplay::Descriptor),
        }
    }
}

/// An input slot: a fixed descriptor, or a function producing one.
#[derive(Debug, Clone, PartialEq)]
pub enum Form {
    Render(Callable),
    Input(InputDescriptor),
}

impl Form {
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Function(render) => Some(Form::Render(render.clone())),
            other => InputDescriptor::from_value(other).map(Form::Input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckConfig;
    use serde_json::json;
    use tabula_value::{ColumnScope, Context, ValueError};

    #[test]
    fn built_in_families_compose() {
        let union = registry().unwrap();
        let tags: Vec<&str> = union.tags().collect();
        for tag in ["string", "checkbox", "range", "text", "select", "column", "grid", "stack"] {
            assert!(tags.contains(&tag), "missing {}", tag);
        }
        assert_eq!(tags.iter().filter(|t| **t == "checkbox").count(), 1);
        assert_eq!(tags.len(), 9 + 11 - 2 + 2);
    }

    #[test]
    fn built_in_schema_initialises() {
        let schema = Lazy::force(&DESCRIPTOR);
        assert!(std::ptr::eq(schema, descriptor_schema()));
        let config = CheckConfig::default();
        for doc in [
            json!({"type": "string"}),
            json!({"type": "select"}),
            json!({"type": "stack", "items": []}),
        ] {
            assert!(schema.parse(&Value::from(doc.clone()), &config).is_ok(), "{doc}");
        }
    }

    #[test]
    fn shared_tags_resolve_to_static() {
        let doc = Value::from(json!({"type": "range"}));
        let checked = descriptor_schema()
            .parse(&doc, &CheckConfig::default())
            .unwrap();
        assert!(matches!(
            DisplayDescriptor::from_value(&checked),
            Some(DisplayDescriptor::Static(StaticDescriptor {
                kind: StaticKind::Range,
                ..
            }))
        ));
        let parse_on_checkbox = Value::object([
            ("type", Value::from("checkbox")),
            ("parse", Value::from("not a function")),
        ]);
        assert!(descriptor_schema()
            .parse(&parse_on_checkbox, &CheckConfig::default())
            .is_ok());
    }

    #[test]
    fn unknown_display_tag() {
        let err = display_schema(Schema::string())
            .parse(&Value::from(json!({"type": "textblabla"})), &CheckConfig::default())
            .unwrap_err();
        assert_eq!(err.issues().len(), 1);
        assert_eq!(err.issues()[0].path_string(), "type");
        assert!(err.issues()[0].message.contains("received 'textblabla'"));
    }

    #[test]
    fn display_as_render_function() {
        let render = Value::function(|call| {
            let text = call.cell().and_then(|c| c.value.as_str().map(str::to_string));
            Ok(Value::object([
                ("type", Value::from("string")),
                ("info", Value::from(text.unwrap_or_default())),
            ]))
        });
        let checked = display_schema(Schema::string())
            .parse(&render, &CheckConfig::default())
            .unwrap();
        let Some(ColumnDisplay::Render(render)) = ColumnDisplay::from_value(&checked) else {
            panic!("expected a render function");
        };
        let scope = ColumnScope::new("title");
        let cell = Context::from(scope.cell("c1").value("hello").build());
        let descriptor = render.call_with(&cell, &[]).unwrap();
        assert_eq!(descriptor.get("type"), Some(&Value::from("string")));

        let wrong = Context::from(scope.cell("c2").value(3).build());
        assert!(matches!(
            render.call_with(&wrong, &[]),
            Err(ValueError::InvalidArguments { .. })
        ));
    }

    #[test]
    fn forms_only_take_inputs() {
        let form = form_schema(Schema::string());
        let config = CheckConfig::default();
        assert!(form.parse(&Value::from(json!({"type": "text"})), &config).is_ok());
        assert!(form.parse(&Value::from(json!({"type": "sparkline"})), &config).is_err());
        assert!(form.parse(&Value::from(json!({"type": "grid", "rows": []})), &config).is_err());
    }
}
