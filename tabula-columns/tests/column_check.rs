//! End-to-end checks of whole column definitions.

mod common;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use common::{nested_stacks, populated_column};
use tabula_columns::{
    check, check_json, check_with, CheckConfig, ColumnDisplay, DisplayDescriptor, Event,
    IssueCode, LayoutNode, Method, OptionKind, StaticKind, UnknownKeys, Value, ValueKind,
    ValueSource,
};
use tabula_value::{ColumnScope, Context};

fn always(result: bool) -> Value {
    Value::function(move |_| Ok(Value::from(result)))
}

#[test]
fn barebones_string_column() {
    let column = check_json(&json!({
        "name": "barebones",
        "type": "string",
        "info": "just the default string"
    }))
    .unwrap();

    assert_eq!(column.kind, ValueKind::String);
    assert_eq!(column.info, "just the default string");
    assert!(column.display.is_none());
    assert!(column.filters.is_empty());
    assert!(column.value.is_none());
}

#[test]
fn empty_type_is_an_invalid_discriminant() {
    let err = check_json(&json!({"type": ""})).unwrap_err();

    assert_eq!(err.issues().len(), 1);
    let issue = &err.issues()[0];
    assert_eq!(issue.path_string(), "type");
    match &issue.code {
        IssueCode::InvalidDiscriminant {
            received, allowed, ..
        } => {
            assert_eq!(received.as_deref(), Some("''"));
            assert_eq!(allowed.len(), ValueKind::ALL.len());
        }
        other => panic!("unexpected code {other:?}"),
    }
}

#[test]
fn missing_type_is_an_invalid_discriminant() {
    let err = check_json(&json!({"name": "x", "info": ""})).unwrap_err();
    assert_eq!(err.issues()[0].code.name(), "invalid_discriminant");
    assert!(err.readable().contains("Required discriminator 'type'"));
}

#[test]
fn unknown_display_tag_is_reported() {
    let err = check_json(&json!({
        "type": "string",
        "info": "wawa",
        "display": {"type": "textblabla"}
    }))
    .unwrap_err();

    let display: Vec<_> = err.at("display.type").collect();
    assert_eq!(display.len(), 1);
    assert_eq!(display[0].code.name(), "invalid_discriminant");
    assert_eq!(err.at("name").count(), 1);
}

#[test]
fn null_and_empty_objects_are_rejected() {
    assert!(check_json(&json!(null)).is_err());
    let err = check_json(&json!({})).unwrap_err();
    assert_eq!(err.issues().len(), 1);
    assert_eq!(err.issues()[0].code.name(), "invalid_discriminant");
}

#[test]
fn filter_key_round_trips() {
    let doc = Value::object([
        ("type", Value::from("number")),
        ("name", Value::from("amount")),
        ("info", Value::from("")),
        (
            "filters",
            Value::object([(
                "=",
                Value::object([
                    ("type", Value::from("number")),
                    ("info", Value::from("equal to")),
                    (
                        "logic",
                        Value::function(|call| {
                            let value = call.cell().and_then(|c| c.value.as_f64());
                            Ok(Value::from(value == call.arg(0).and_then(Value::as_f64)))
                        }),
                    ),
                ]),
            )]),
        ),
    ]);

    let column = check(&doc).unwrap();
    let equal = &column.filters["="];
    assert_eq!(equal.kind, OptionKind::Value(ValueKind::Number));
    assert_eq!(equal.info.as_deref(), Some("equal to"));
    assert!(column.to_value().get("filters").unwrap().get("=").is_some());

    let scope = ColumnScope::new("amount");
    let api = scope.cell("c1").value(4).build();
    assert!(equal.matches(&api, &Value::from(4)).unwrap());
    assert!(!equal.matches(&api, &Value::from(5)).unwrap());
}

#[test]
fn request_source_discriminates_against_cell() {
    let doc = Value::object([
        ("type", Value::from("string")),
        ("name", Value::from("remote")),
        ("info", Value::from("")),
        (
            "value",
            Value::object([
                ("type", Value::from("request")),
                (
                    "read",
                    Value::object([
                        ("url", Value::from("http://bla")),
                        ("method", Value::from("get")),
                        ("validate", always(true)),
                    ]),
                ),
            ]),
        ),
    ]);

    let column = check(&doc).unwrap();
    let Some(ValueSource::Request(source)) = &column.value else {
        panic!("expected a request source, got {:?}", column.value);
    };
    let read = source.read.as_ref().unwrap();
    assert_eq!(read.request.method, Method::Get);

    let scope = ColumnScope::new("remote");
    let cell = Context::from(scope.cell("c1").build());
    assert!(read.request.should_fire(&cell).unwrap());
    assert_eq!(read.request.resolve_url(&cell).unwrap(), "http://bla");
}

#[test]
fn cell_source_rejects_request_fields_under_strict() {
    let doc = Value::from(json!({
        "type": "string",
        "name": "typed",
        "info": "",
        "value": {"type": "cell", "read": {"url": "http://bla"}}
    }));
    assert!(matches!(
        check(&doc).unwrap().value,
        Some(ValueSource::Cell(_))
    ));

    let strict = CheckConfig::default().with_unknown_keys(UnknownKeys::Strict);
    let err = check_with(&strict, &doc).unwrap_err();
    assert!(err.at("value").any(|i| i.code.name() == "unrecognized_key"));
}

#[test]
fn checking_is_idempotent() {
    let doc = Value::object([
        ("type", Value::from("boolean")),
        ("name", Value::from("done")),
        ("info", Value::from("")),
        ("display", Value::object([("type", Value::from("checkbox"))])),
        ("primitive", Value::function(|_| Ok(Value::from(1)))),
    ]);

    let first = check(&doc).unwrap();
    let second = check(first.to_value()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_value(), &doc);
}

#[test]
fn populated_definition_survives_checking_unchanged() {
    let doc = populated_column("number", "amount", "every section filled in");

    let first = check(&doc).unwrap();
    assert_eq!(first.to_value(), &doc);
    let second = check(first.to_value()).unwrap();
    assert_eq!(first, second);
    assert_eq!(second.to_value(), &doc);

    assert_eq!(
        first.filters.keys().collect::<Vec<_>>(),
        vec!["=", "in"]
    );
    assert_eq!(first.filters["in"].kind, OptionKind::Value(ValueKind::NumberList));
    assert!(first.filters["="].parse.is_some());
    assert_eq!(first.config["source"].kind, OptionKind::Column);
    assert_eq!(first.expose["total"].label.as_deref(), Some("Total"));
    assert_eq!(first.menu.cell["reset"].label, "Reset");
    assert_eq!(first.menu.column["refresh"].label, "Refresh");
    assert!(first.events.hook(Event::CellCreated).is_some());
    assert!(first.events.hook(Event::CellDeleted).is_none());

    let Some(ValueSource::Request(source)) = &first.value else {
        panic!("expected a request source, got {:?}", first.value);
    };
    assert_eq!(source.read.as_ref().unwrap().request.method, Method::Get);
    assert_eq!(source.write.as_ref().unwrap().request.method, Method::Put);
    assert_eq!(source.list.as_ref().unwrap().request.method, Method::Post);

    let Some(ColumnDisplay::Descriptor(DisplayDescriptor::Layout(layout))) = &first.display else {
        panic!("expected a layout");
    };
    assert_eq!(layout.depth(), 2);
}

#[test]
fn every_problem_is_reported_at_once() {
    let err = check_json(&json!({
        "type": "date",
        "name": "",
        "info": 3,
        "display": {"type": "link"},
        "filters": {"before": {"type": "date"}}
    }))
    .unwrap_err();

    for path in ["name", "info", "display.props", "filters.before.logic"] {
        assert!(err.at(path).count() > 0, "no issue at {path}: {err}");
    }
}

#[test]
fn deep_layout_nesting() {
    let mut node = json!({"type": "string"});
    for depth in 0..25 {
        node = if depth % 2 == 0 {
            json!({"type": "grid", "rows": [{"content": node}]})
        } else {
            json!({"type": "stack", "items": [node]})
        };
    }
    let column = check_json(&json!({
        "type": "string",
        "name": "nested",
        "info": "",
        "display": node
    }))
    .unwrap();

    let Some(ColumnDisplay::Descriptor(DisplayDescriptor::Layout(layout))) = &column.display else {
        panic!("expected a layout");
    };
    assert_eq!(layout.depth(), 25);
    assert!(matches!(layout, LayoutNode::Grid(_)));
}

fn nested_layout_column(leaf: Value) -> Value {
    let grid = Value::object([
        ("type", Value::from("grid")),
        (
            "rows",
            Value::Array(vec![Value::object([("content", nested_stacks(1000, leaf))])]),
        ),
    ]);
    Value::object([
        ("type", Value::from("string")),
        ("name", Value::from("nested")),
        ("info", Value::from("")),
        ("display", grid),
    ])
}

#[test]
fn thousand_level_layout_checks() {
    let doc = nested_layout_column(Value::object([("type", Value::from("string"))]));
    let column = check(&doc).unwrap();

    let Some(ColumnDisplay::Descriptor(DisplayDescriptor::Layout(layout))) = &column.display else {
        panic!("expected a layout");
    };
    assert!(matches!(layout, LayoutNode::Grid(_)));
    assert_eq!(layout.depth(), 1001);
}

#[test]
fn thousand_level_layout_reports_the_innermost_tag() {
    let doc = nested_layout_column(Value::object([("type", Value::from("textblabla"))]));
    let err = check(&doc).unwrap_err();

    let tags: Vec<_> = err
        .issues()
        .iter()
        .filter(|issue| issue.code.name() == "invalid_discriminant")
        .collect();
    assert_eq!(tags.len(), 1);
    // display, rows, [0], content, then items/[i] per stack, then type
    assert_eq!(tags[0].path.len(), 1 + 3 + 2 * 1000 + 1);
    assert!(tags[0].path_string().ends_with("items[0].type"));
}

#[test]
fn shared_display_tags_read_as_static_widgets() {
    let column = check_json(&json!({
        "type": "number",
        "name": "progress",
        "info": "",
        "display": {"type": "range", "props": {"max": 10}}
    }))
    .unwrap();

    let Some(ColumnDisplay::Descriptor(DisplayDescriptor::Static(widget))) = &column.display else {
        panic!("expected a static widget");
    };
    assert_eq!(widget.kind, StaticKind::Range);
}

#[test]
fn date_columns_parse_into_dates() {
    let parse = Value::function(|call| {
        let raw = call.arg(0).and_then(Value::as_str).unwrap_or_default();
        Ok(raw
            .parse::<DateTime<Utc>>()
            .map(Value::from)
            .unwrap_or(Value::Null))
    });
    let doc = Value::object([
        ("type", Value::from("date")),
        ("name", Value::from("due")),
        ("info", Value::from("")),
        ("parse", parse),
    ]);
    let column = check(&doc).unwrap();
    let due = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();

    let scope = ColumnScope::new("due");
    let api = scope.cell("c1").build();
    let parsed = column
        .parse_entry(&api, &Value::from("2024-05-01T00:00:00Z"))
        .unwrap()
        .unwrap();
    assert_eq!(parsed.value(), Some(&Value::from(due)));

    let filled = scope.cell("c2").value(due).build();
    assert_eq!(column.primitive_of(&filled).unwrap(), Value::from(due));
}
