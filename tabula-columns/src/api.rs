//! Schemas of the capability contexts user callables receive.
//!
//! Both are parameterized by the column's value schema. A cell's own value
//! may be empty, so `value` and the entries of `values` are nullable.

use crate::schema::{ObjectSchema, Schema};

fn row_cell_schema() -> Schema {
    ObjectSchema::new()
        .field("value", Schema::any())
        .field("cellId", Schema::string())
        .field("columnId", Schema::string())
        .into()
}

fn shared_fields(value: Schema) -> ObjectSchema {
    ObjectSchema::new()
        .field("values", Schema::record(value.nullable()))
        .field("config", Schema::record(Schema::any()))
        .field("cache", Schema::record(Schema::any()))
        .field("store", Schema::record(Schema::any()))
        .field("column", Schema::record(row_cell_schema()))
}

/// Context for callables evaluated per cell.
pub fn cell_api_schema(value: Schema) -> Schema {
    ObjectSchema::new()
        .field("value", value.clone().nullable())
        .field("id", Schema::string())
        .extend(shared_fields(value))
        .into()
}

/// Context for callables evaluated per column: the cell context without
/// `value` and `id`.
pub fn column_api_schema(value: Schema) -> Schema {
    shared_fields(value).into()
}
