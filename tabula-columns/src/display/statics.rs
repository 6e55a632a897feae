//! Read-only widgets rendered in a cell.

use std::fmt;

use tabula_value::{CellApi, Callable, Context, Value};

use super::input::InputKind;
use super::registry::Family;
use crate::decode;
use crate::schema::{FunctionContract, ObjectSchema, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaticKind {
    String,
    Range,
    Checkbox,
    Sparkline,
    Button,
    Tags,
    Link,
    Img,
    Loading,
}

impl StaticKind {
    pub const ALL: [StaticKind; 9] = [
        StaticKind::String,
        StaticKind::Range,
        StaticKind::Checkbox,
        StaticKind::Sparkline,
        StaticKind::Button,
        StaticKind::Tags,
        StaticKind::Link,
        StaticKind::Img,
        StaticKind::Loading,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            StaticKind::String => "string",
            StaticKind::Range => "range",
            StaticKind::Checkbox => "checkbox",
            StaticKind::Sparkline => "sparkline",
            StaticKind::Button => "button",
            StaticKind::Tags => "tags",
            StaticKind::Link => "link",
            StaticKind::Img => "img",
            StaticKind::Loading => "loading",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Shape the `props` function must return.
    fn props(&self) -> ObjectSchema {
        let height = ObjectSchema::new().optional("height", Schema::number());
        match self {
            StaticKind::String => height.field("value", Schema::string().nullable()),
            StaticKind::Range => height
                .field("min", Schema::number().default_to(0))
                .field("max", Schema::number().default_to(100))
                .field("step", Schema::number().default_to(1))
                .optional("label", Schema::string())
                .field("value", Schema::number()),
            StaticKind::Sparkline => height
                .field(
                    "type",
                    Schema::one_of(&["line", "bar"]).default_to("line"),
                )
                .field("value", Schema::array(Schema::number()))
                .optional("color", Schema::string())
                .optional(
                    "yaxis",
                    Schema::tuple(vec![Schema::number(), Schema::number()]),
                )
                .optional("labels", Schema::array(Schema::string())),
            StaticKind::Button => height
                .field("label", Schema::string())
                .optional("round", Schema::number())
                .optional("color", Schema::one_of(&["primary", "secondary"]))
                .optional(
                    "onClick",
                    FunctionContract::bare(Schema::any()).arg(Schema::any()),
                ),
            StaticKind::Tags => {
                let labelled = ObjectSchema::new()
                    .field("label", Schema::string())
                    .field("img", Schema::string());
                height.field(
                    "value",
                    Schema::array(Schema::string())
                        .or(Schema::array(labelled))
                        .nullable(),
                )
            }
            StaticKind::Link => height
                .field("label", Schema::string().nullable())
                .field("value", Schema::string().nullable()),
            StaticKind::Img => height
                .field("value", Schema::array(Schema::string()).nullable())
                .optional("round", Schema::number()),
            StaticKind::Checkbox | StaticKind::Loading => height,
        }
    }

    pub(crate) fn variant(&self) -> ObjectSchema {
        match self {
            // the checkbox input, read-only
            StaticKind::Checkbox => InputKind::Checkbox.variant().omit(&["parse"]),
            // a link has nothing to show without props
            StaticKind::Link => {
                ObjectSchema::new().field("props", FunctionContract::cell(self.props()))
            }
            _ => ObjectSchema::new().optional("props", FunctionContract::cell(self.props())),
        }
    }
}

impl fmt::Display for StaticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

pub(crate) fn family() -> Family {
    StaticKind::ALL
        .into_iter()
        .fold(Family::new("static"), |family, kind| {
            family.variant(kind.tag(), kind.variant())
        })
}

/// A validated static widget descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticDescriptor {
    pub kind: StaticKind,
    /// `(CellApi) -> props`
    pub props: Option<Callable>,
    /// Only the checkbox carries an error
    pub error: Option<String>,
}

impl StaticDescriptor {
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let kind = StaticKind::from_tag(map.get("type")?.as_str()?)?;
        Some(Self {
            kind,
            props: decode::callable(map, "props"),
            error: decode::string(map, "error"),
        })
    }

    pub fn render_props(&self, api: &CellApi) -> tabula_value::Result<Option<Value>> {
        let Some(props) = &self.props else {
            return Ok(None);
        };
        let context = Context::Cell(api.clone());
        let args: &[Value] = match self.kind {
            StaticKind::Checkbox => std::slice::from_ref(&api.value),
            _ => &[],
        };
        props.call_with(&context, args).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckConfig;
    use crate::schema::TaggedUnion;
    use serde_json::json;
    use tabula_value::{ColumnScope, ValueError};

    fn statics() -> Schema {
        StaticKind::ALL
            .into_iter()
            .fold(TaggedUnion::new("type"), |union, kind| {
                union.variant(kind.tag(), kind.variant())
            })
            .into()
    }

    fn descriptor(doc: Value) -> StaticDescriptor {
        let checked = statics().parse(&doc, &CheckConfig::default()).unwrap();
        StaticDescriptor::from_value(&checked).unwrap()
    }

    #[test]
    fn link_requires_props() {
        let err = statics()
            .parse(&Value::from(json!({"type": "link"})), &CheckConfig::default())
            .unwrap_err();
        assert_eq!(err.at("props").count(), 1);
        assert!(statics()
            .parse(&Value::from(json!({"type": "img"})), &CheckConfig::default())
            .is_ok());
    }

    #[test]
    fn range_props_get_defaults() {
        let d = descriptor(Value::object([
            ("type", Value::from("range")),
            (
                "props",
                Value::function(|call| {
                    let value = call.cell().map(|c| c.value.clone()).unwrap_or_default();
                    Ok(Value::object([("value", value)]))
                }),
            ),
        ]));
        let api = ColumnScope::new("progress").cell("c1").value(40).build();
        let props = d.render_props(&api).unwrap().unwrap();
        assert_eq!(props.get("min"), Some(&Value::from(0)));
        assert_eq!(props.get("max"), Some(&Value::from(100)));
        assert_eq!(props.get("step"), Some(&Value::from(1)));
        assert_eq!(props.get("value"), Some(&Value::from(40)));
    }

    #[test]
    fn sparkline_props_are_checked() {
        let d = descriptor(Value::object([
            ("type", Value::from("sparkline")),
            (
                "props",
                Value::function(|_| Ok(Value::from(json!({"value": [1, 2, "3"]})))),
            ),
        ]));
        let api = ColumnScope::new("trend").cell("c1").build();
        let err = d.render_props(&api).unwrap_err();
        match err {
            ValueError::InvalidReturn { issues } => {
                assert_eq!(issues, vec!["returns.value[2]: Expected number, received string"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn tags_accept_labelled_images() {
        let d = descriptor(Value::object([
            ("type", Value::from("tags")),
            (
                "props",
                Value::function(|_| {
                    Ok(Value::from(json!({"value": [{"label": "a", "img": "a.png"}]})))
                }),
            ),
        ]));
        let api = ColumnScope::new("t").cell("c1").build();
        assert!(d.render_props(&api).is_ok());
    }

    #[test]
    fn checkbox_has_no_parse_slot() {
        assert!(StaticKind::Checkbox.variant().get("parse").is_none());
        assert!(StaticKind::Checkbox.variant().get("error").is_some());
    }
}
