//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use tabula_columns::Value;

/// A callable that ignores its arguments and returns `result`.
pub fn returning(result: impl Into<Value>) -> Value {
    let result = result.into();
    Value::function(move |_| Ok(result.clone()))
}

/// `depth` stacks wrapped around `leaf`, each holding the next as its only item.
pub fn nested_stacks(depth: usize, leaf: Value) -> Value {
    (0..depth).fold(leaf, |node, _| {
        Value::object([
            ("type", Value::from("stack")),
            ("items", Value::Array(vec![node])),
        ])
    })
}

fn display() -> Value {
    let buttons = Value::object([
        ("type", Value::from("stack")),
        ("gap", Value::from(2)),
        (
            "items",
            Value::Array(vec![
                Value::object([("type", Value::from("button")), ("props", returning(Value::Null))]),
                Value::object([
                    ("type", Value::from("number")),
                    ("error", Value::Null),
                    ("parse", returning(Value::Null)),
                ]),
            ]),
        ),
    ]);
    Value::object([
        ("type", Value::from("grid")),
        ("grow", Value::from(true)),
        ("gap", Value::from(4)),
        ("columns", Value::from(2)),
        (
            "rows",
            Value::Array(vec![
                Value::object([
                    ("span", Value::from("auto")),
                    (
                        "content",
                        Value::object([("type", Value::from("string")), ("props", returning(Value::Null))]),
                    ),
                ]),
                Value::object([
                    ("order", Value::from(1)),
                    ("span", Value::from(2)),
                    ("offset", Value::from(0)),
                    ("content", buttons),
                ]),
            ]),
        ),
    ])
}

fn filters() -> Value {
    Value::object([
        (
            "=",
            Value::object([
                ("type", Value::from("number")),
                ("info", Value::from("equal to")),
                ("form", Value::object([("type", Value::from("number"))])),
                ("parse", returning(1)),
                ("logic", returning(true)),
            ]),
        ),
        (
            "in",
            Value::object([
                ("type", Value::from("number[]")),
                ("form", returning(Value::object([("type", Value::from("text"))]))),
                ("logic", returning(false)),
            ]),
        ),
    ])
}

fn config() -> Value {
    Value::object([
        (
            "height",
            Value::object([
                ("type", Value::from("number")),
                ("label", Value::from("Height")),
                ("info", Value::from("row height in pixels")),
                (
                    "form",
                    Value::object([("type", Value::from("range")), ("props", returning(Value::Null))]),
                ),
                ("parse", returning(40)),
            ]),
        ),
        (
            "source",
            Value::object([
                ("type", Value::from("column")),
                ("label", Value::from("Source")),
                ("form", returning(Value::object([("type", Value::from("column"))]))),
            ]),
        ),
    ])
}

fn menu() -> Value {
    let item = |label: &str| {
        Value::object([("label", Value::from(label)), ("action", returning(Value::Null))])
    };
    Value::object([
        ("cell", Value::object([("reset", item("Reset"))])),
        ("column", Value::object([("refresh", item("Refresh"))])),
    ])
}

fn request_source() -> Value {
    Value::object([
        ("type", Value::from("request")),
        ("info", Value::from("remote values")),
        (
            "read",
            Value::object([
                ("url", returning("http://api/cell")),
                ("method", Value::from("get")),
                ("validate", returning(true)),
                ("query", Value::object([("page", Value::from(1))])),
                ("parse", returning(Value::Null)),
                ("refetch", Value::object([("every", Value::from(5000))])),
            ]),
        ),
        (
            "write",
            Value::object([
                ("url", Value::from("http://api/cell")),
                ("method", Value::from("put")),
                ("type", Value::from("json")),
                ("validate", returning(true)),
                ("body", returning(Value::object([("v", Value::from(1))]))),
            ]),
        ),
        (
            "list",
            Value::object([
                ("url", Value::from("http://api/all")),
                ("method", Value::from("post")),
                ("type", Value::from("form")),
                ("validate", returning(false)),
                ("headers", Value::object([("accept", Value::from("json"))])),
                ("parse", returning(Value::Null)),
                (
                    "refetch",
                    Value::object([
                        ("every", Value::from(60000)),
                        ("url", Value::from("http://api/delta")),
                    ]),
                ),
            ]),
        ),
    ])
}

/// A definition using every section a column can carry.
///
/// It contains no slot with a default, so checking leaves it unchanged.
pub fn populated_column(kind: &str, name: &str, info: &str) -> Value {
    Value::object([
        ("type", Value::from(kind)),
        ("name", Value::from(name)),
        ("info", Value::from(info)),
        ("display", display()),
        ("parse", returning(Value::Null)),
        ("primitive", returning(0)),
        ("filters", filters()),
        ("config", config()),
        (
            "expose",
            Value::object([(
                "total",
                Value::object([("label", Value::from("Total")), ("returns", returning(0))]),
            )]),
        ),
        ("menu", menu()),
        (
            "events",
            Value::object([
                ("onCellCreated", returning(Value::Null)),
                ("onConfigUpdated", returning(Value::Null)),
            ]),
        ),
        ("value", request_source()),
    ])
}
