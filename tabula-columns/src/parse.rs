//! Contracts of user parse functions and the results they produce.
//!
//! A parse-value function turns a raw input (form entry, import, response
//! body) into a cell value; a parse-values function turns a column-wide
//! response into a batch of values. Both may also write to the column's
//! `store` and `cache`.

use tabula_value::{Call, Callable, Map, Value};

use crate::schema::{FunctionContract, ObjectSchema, Schema};

/// `(CellApi, param) -> {value?, store?, cache?} | value | null`
pub fn parse_value(value: Schema, param: Schema) -> FunctionContract {
    let update = ObjectSchema::new()
        .optional("value", value.clone())
        .optional("store", Schema::any())
        .optional("cache", Schema::any());
    let returns = Schema::from(update).nullable().or(value.nullable());
    FunctionContract::cell(returns).arg(param)
}

/// `(ColumnApi, param) -> {values?: {items, key?}, store?, cache?} | null`
pub fn parse_values(value: Schema, param: Schema) -> FunctionContract {
    let key = Schema::string().or(FunctionContract::bare(Schema::string())
        .arg(Schema::any())
        .arg(Schema::string()));
    let values = ObjectSchema::new()
        .field(
            "items",
            Schema::array(value.clone()).or(Schema::record(value)),
        )
        .optional("key", key);
    let returns = ObjectSchema::new()
        .optional("values", values)
        .optional("store", Schema::any())
        .optional("cache", Schema::any());
    FunctionContract::column(Schema::from(returns).nullable()).arg(param)
}

/// What a parse-value function asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    /// `null`: leave the cell alone
    Skip,
    /// A bare value to write to the cell
    Value(Value),
    /// Explicit updates; an absent `value` leaves the cell unwritten
    Update {
        value: Option<Value>,
        store: Option<Value>,
        cache: Option<Value>,
    },
}

impl ParsedValue {
    /// Interpret the return value of a guarded parse-value call.
    pub fn from_output(output: Value) -> Self {
        match output {
            Value::Null => ParsedValue::Skip,
            Value::Object(mut map) => ParsedValue::Update {
                value: map.shift_remove("value"),
                store: map.shift_remove("store"),
                cache: map.shift_remove("cache"),
            },
            value => ParsedValue::Value(value),
        }
    }

    /// The value to write to the cell, if any.
    pub fn value(&self) -> Option<&Value> {
        match self {
            ParsedValue::Skip => None,
            ParsedValue::Value(value) => Some(value),
            ParsedValue::Update { value, .. } => value.as_ref(),
        }
    }
}

/// Items produced by a parse-values function.
#[derive(Debug, Clone, PartialEq)]
pub enum Items {
    /// Replace the column's values in order
    List(Vec<Value>),
    /// Merge into the column's values by cell id
    Keyed(Map),
}

/// How each listed item's cell id is derived.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKey {
    /// Read the named property of the item
    Field(String),
    /// Call `(item, index) -> key`
    Derive(Callable),
}

impl ItemKey {
    pub fn key_for(&self, item: &Value, index: usize) -> tabula_value::Result<Option<String>> {
        match self {
            ItemKey::Field(field) => Ok(item.get(field).and_then(Value::as_str).map(str::to_string)),
            ItemKey::Derive(derive) => {
                let args = [item.clone(), Value::from(index.to_string())];
                let key = derive.call(Call::new(&args))?;
                Ok(key.as_str().map(str::to_string))
            }
        }
    }
}

/// What a parse-values function asked for.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedValues {
    pub items: Option<Items>,
    pub key: Option<ItemKey>,
    pub store: Option<Value>,
    pub cache: Option<Value>,
}

impl ParsedValues {
    /// Interpret the return value of a guarded parse-values call; `None` for
    /// a `null` result.
    pub fn from_output(output: Value) -> Option<Self> {
        let Value::Object(mut map) = output else {
            return None;
        };
        let mut parsed = ParsedValues {
            store: map.shift_remove("store"),
            cache: map.shift_remove("cache"),
            ..Default::default()
        };
        if let Some(Value::Object(values)) = map.shift_remove("values") {
            parsed.items = match values.get("items") {
                Some(Value::Array(items)) => Some(Items::List(items.clone())),
                Some(Value::Object(items)) => Some(Items::Keyed(items.clone())),
                _ => None,
            };
            parsed.key = match values.get("key") {
                Some(Value::String(field)) => Some(ItemKey::Field(field.clone())),
                Some(Value::Function(derive)) => Some(ItemKey::Derive(derive.clone())),
                _ => None,
            };
        }
        Some(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckConfig;
    use serde_json::json;
    use tabula_value::{ColumnScope, Context, ValueError};

    fn guarded(contract: FunctionContract, f: Callable) -> Callable {
        Schema::from(contract)
            .parse(&Value::Function(f), &CheckConfig::default())
            .unwrap()
            .as_callable()
            .unwrap()
            .clone()
    }

    fn cell(value: impl Into<Value>) -> Context {
        ColumnScope::new("price").cell("c1").value(value).build().into()
    }

    #[test]
    fn parse_value_accepts_every_result_shape() {
        let contract = || parse_value(Schema::number(), Schema::any()).value(Schema::number());
        let bare = guarded(contract(), Callable::new(|_| Ok(Value::from(3))));
        let update = guarded(
            contract(),
            Callable::new(|_| Ok(Value::from(json!({"value": 4, "store": {"seen": true}})))),
        );
        let skip = guarded(contract(), Callable::new(|_| Ok(Value::Null)));
        let ctx = cell(1);
        let raw = [Value::from("4")];

        let out = ParsedValue::from_output(bare.call_with(&ctx, &raw).unwrap());
        assert_eq!(out, ParsedValue::Value(Value::from(3)));

        let out = ParsedValue::from_output(update.call_with(&ctx, &raw).unwrap());
        assert_eq!(out.value(), Some(&Value::from(4)));
        assert!(matches!(out, ParsedValue::Update { store: Some(_), cache: None, .. }));

        let out = ParsedValue::from_output(skip.call_with(&ctx, &raw).unwrap());
        assert_eq!(out, ParsedValue::Skip);
        assert_eq!(out.value(), None);
    }

    #[test]
    fn parse_value_rejects_mistyped_results() {
        let f = guarded(
            parse_value(Schema::number(), Schema::any()),
            Callable::new(|_| Ok(Value::from("four"))),
        );
        let err = f.call_with(&cell(1), &[Value::from("4")]).unwrap_err();
        assert!(matches!(err, ValueError::InvalidReturn { .. }));
    }

    #[test]
    fn parse_values_lists_and_keys() {
        let f = guarded(
            parse_values(Schema::string(), Schema::any()),
            Callable::new(|_| {
                Ok(Value::from(json!({
                    "values": {"items": ["a", "b"], "key": "id"},
                    "cache": {"page": 2}
                })))
            }),
        );
        let scope = ColumnScope::new("names");
        let ctx = Context::from(scope.column_api(Map::new()));
        let out = f.call_with(&ctx, &[Value::Null]).unwrap();
        let parsed = ParsedValues::from_output(out).unwrap();
        assert_eq!(
            parsed.items,
            Some(Items::List(vec![Value::from("a"), Value::from("b")]))
        );
        assert_eq!(parsed.key, Some(ItemKey::Field("id".into())));
        assert!(parsed.cache.is_some());
    }

    #[test]
    fn parse_values_null_means_nothing_to_do() {
        assert_eq!(ParsedValues::from_output(Value::Null), None);
    }

    #[test]
    fn derived_item_keys() {
        let key = ItemKey::Derive(Callable::new(|call| {
            let index = call.arg(1).and_then(Value::as_str).unwrap_or_default();
            Ok(Value::from(format!("row-{}", index)))
        }));
        assert_eq!(
            key.key_for(&Value::from("x"), 3).unwrap().as_deref(),
            Some("row-3")
        );
        let field = ItemKey::Field("sku".into());
        let item = Value::from(json!({"sku": "A-1"}));
        assert_eq!(field.key_for(&item, 0).unwrap().as_deref(), Some("A-1"));
    }
}
