//! Capability contexts handed to user callables.
//!
//! A [`ColumnScope`] is created once per column by the runtime and owns the
//! column's `cache` and `store`. Every [`CellApi`] and [`ColumnApi`] it mints
//! holds a handle to those same maps, so a write made while evaluating one
//! cell is visible while evaluating its siblings.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexMap;
use tracing::trace;

use crate::value::{Map, Value};

/// Reference-counted concurrent key/value map shared by a column's cells.
///
/// Cloning yields another handle to the same map. Write ordering between
/// concurrent cells is the runtime's concern.
#[derive(Clone, Default)]
pub struct SharedMap(Arc<DashMap<String, Value>>);

impl SharedMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a map, e.g. with a persisted `store` loaded by the runtime.
    pub fn from_map(map: Map) -> Self {
        let inner = DashMap::new();
        for (k, v) in map {
            inner.insert(k, v);
        }
        Self(Arc::new(inner))
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.get(key).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.remove(key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy of the current contents, keys sorted.
    pub fn snapshot(&self) -> Map {
        let mut map: Map = self
            .0
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        map.sort_keys();
        map
    }

    /// Whether both handles refer to the same map.
    pub fn ptr_eq(&self, other: &SharedMap) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for SharedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedMap").field("len", &self.len()).finish()
    }
}

/// Another column's cell in the same row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowCell {
    pub value: Value,
    pub cell_id: String,
    pub column_id: String,
}

impl RowCell {
    fn to_value(&self) -> Value {
        Value::object([
            ("value", self.value.clone()),
            ("cellId", Value::from(self.cell_id.as_str())),
            ("columnId", Value::from(self.column_id.as_str())),
        ])
    }
}

/// Context for callables evaluated on behalf of one cell.
#[derive(Debug, Clone)]
pub struct CellApi {
    /// The cell's value, `Null` when empty
    pub value: Value,
    /// Values of the column keyed by cell id, self included
    pub values: Map,
    /// Config values; only keys declared by the column's `config` appear
    pub config: Map,
    /// Ephemeral, column-scoped
    pub cache: SharedMap,
    /// Persisted, column-scoped
    pub store: SharedMap,
    /// Cell id
    pub id: String,
    /// Other columns' cells in the same row, keyed by column id
    pub column: IndexMap<String, RowCell>,
}

impl CellApi {
    /// Snapshot in the document shape user code sees.
    pub fn to_value(&self) -> Value {
        Value::object([
            ("value", self.value.clone()),
            ("values", Value::Object(self.values.clone())),
            ("config", Value::Object(self.config.clone())),
            ("cache", Value::Object(self.cache.snapshot())),
            ("store", Value::Object(self.store.snapshot())),
            ("id", Value::from(self.id.as_str())),
            ("column", row_to_value(&self.column)),
        ])
    }
}

/// Context for callables evaluated on behalf of the whole column.
///
/// The cell context without the single-cell identity fields (`value`, `id`).
#[derive(Debug, Clone)]
pub struct ColumnApi {
    pub values: Map,
    pub config: Map,
    pub cache: SharedMap,
    pub store: SharedMap,
    pub column: IndexMap<String, RowCell>,
}

impl ColumnApi {
    pub fn to_value(&self) -> Value {
        Value::object([
            ("values", Value::Object(self.values.clone())),
            ("config", Value::Object(self.config.clone())),
            ("cache", Value::Object(self.cache.snapshot())),
            ("store", Value::Object(self.store.snapshot())),
            ("column", row_to_value(&self.column)),
        ])
    }
}

fn row_to_value(row: &IndexMap<String, RowCell>) -> Value {
    Value::Object(
        row.iter()
            .map(|(column_id, cell)| (column_id.clone(), cell.to_value()))
            .collect(),
    )
}

/// Either capability context.
#[derive(Debug, Clone)]
pub enum Context {
    Cell(CellApi),
    Column(ColumnApi),
}

impl Context {
    /// `"cell"` or `"column"`.
    pub fn scope_name(&self) -> &'static str {
        match self {
            Context::Cell(_) => "cell",
            Context::Column(_) => "column",
        }
    }

    pub fn values(&self) -> &Map {
        match self {
            Context::Cell(api) => &api.values,
            Context::Column(api) => &api.values,
        }
    }

    pub fn config(&self) -> &Map {
        match self {
            Context::Cell(api) => &api.config,
            Context::Column(api) => &api.config,
        }
    }

    pub fn cache(&self) -> &SharedMap {
        match self {
            Context::Cell(api) => &api.cache,
            Context::Column(api) => &api.cache,
        }
    }

    pub fn store(&self) -> &SharedMap {
        match self {
            Context::Cell(api) => &api.store,
            Context::Column(api) => &api.store,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Context::Cell(api) => api.to_value(),
            Context::Column(api) => api.to_value(),
        }
    }
}

impl From<CellApi> for Context {
    fn from(api: CellApi) -> Self {
        Context::Cell(api)
    }
}

impl From<ColumnApi> for Context {
    fn from(api: ColumnApi) -> Self {
        Context::Column(api)
    }
}

/// Per-column owner of the shared `cache` / `store` maps and config.
#[derive(Debug, Clone)]
pub struct ColumnScope {
    id: String,
    config: Map,
    cache: SharedMap,
    store: SharedMap,
}

impl ColumnScope {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            config: Map::new(),
            cache: SharedMap::new(),
            store: SharedMap::new(),
        }
    }

    /// Set the config values exposed as `api.config`.
    pub fn with_config(mut self, config: Map) -> Self {
        self.config = config;
        self
    }

    /// Seed the persisted store.
    pub fn with_store(mut self, store: Map) -> Self {
        self.store = SharedMap::from_map(store);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &Map {
        &self.config
    }

    /// Replace the config; contexts minted afterwards see the new values.
    pub fn set_config(&mut self, config: Map) {
        self.config = config;
    }

    pub fn cache(&self) -> &SharedMap {
        &self.cache
    }

    pub fn store(&self) -> &SharedMap {
        &self.store
    }

    /// Start building the context for `cell_id`.
    pub fn cell(&self, cell_id: impl Into<String>) -> CellApiBuilder<'_> {
        CellApiBuilder {
            scope: self,
            id: cell_id.into(),
            value: Value::Null,
            values: Map::new(),
            row: IndexMap::new(),
        }
    }

    /// Context for column-wide callables over `values`.
    pub fn column_api(&self, values: Map) -> ColumnApi {
        trace!(column = %self.id, cells = values.len(), "minted column context");
        ColumnApi {
            values,
            config: self.config.clone(),
            cache: self.cache.clone(),
            store: self.store.clone(),
            column: IndexMap::new(),
        }
    }
}

/// Builder for [`CellApi`]. Created by [`ColumnScope::cell`].
pub struct CellApiBuilder<'s> {
    scope: &'s ColumnScope,
    id: String,
    value: Value,
    values: Map,
    row: IndexMap<String, RowCell>,
}

impl CellApiBuilder<'_> {
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Values of the whole column keyed by cell id.
    pub fn values(mut self, values: Map) -> Self {
        self.values = values;
        self
    }

    /// Expose another column's cell in the same row.
    pub fn row_cell(
        mut self,
        column_id: impl Into<String>,
        cell_id: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        let column_id = column_id.into();
        self.row.insert(
            column_id.clone(),
            RowCell {
                value: value.into(),
                cell_id: cell_id.into(),
                column_id,
            },
        );
        self
    }

    /// Finish the context. `values` always contains this cell's own entry.
    pub fn build(self) -> CellApi {
        let mut values = self.values;
        values.insert(self.id.clone(), self.value.clone());
        trace!(column = %self.scope.id, cell = %self.id, "minted cell context");
        CellApi {
            value: self.value,
            values,
            config: self.scope.config.clone(),
            cache: self.scope.cache.clone(),
            store: self.scope.store.clone(),
            id: self.id,
            column: self.row,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_values_include_self() {
        let scope = ColumnScope::new("price");
        let api = scope.cell("c1").value(3).build();
        assert_eq!(api.values.get("c1"), Some(&Value::from(3)));
        assert_eq!(api.id, "c1");
    }

    #[test]
    fn siblings_share_cache_and_store() {
        let scope = ColumnScope::new("price");
        let a = scope.cell("a").build();
        let b = scope.cell("b").build();
        a.cache.insert("visited", true);
        a.store.insert("count", 1);
        assert_eq!(b.cache.get("visited"), Some(Value::Bool(true)));
        assert_eq!(b.store.get("count"), Some(Value::from(1)));
        assert!(a.cache.ptr_eq(&b.cache));

        let col = scope.column_api(Map::new());
        assert!(col.store.ptr_eq(&a.store));
    }

    #[test]
    fn separate_columns_do_not_share() {
        let a = ColumnScope::new("a").cell("x").build();
        let b = ColumnScope::new("b").cell("x").build();
        a.cache.insert("k", 1);
        assert!(b.cache.get("k").is_none());
        assert!(!a.cache.ptr_eq(&b.cache));
    }

    #[test]
    fn snapshot_shape() {
        let scope = ColumnScope::new("price")
            .with_config(Map::from_iter([("currency".to_string(), Value::from("EUR"))]))
            .with_store(Map::from_iter([("seen".to_string(), Value::from(2))]));
        let api = scope.cell("c1").value("9.99").row_cell("sku", "c7", "A-1").build();
        let v = api.to_value();
        assert_eq!(v.get("id"), Some(&Value::from("c1")));
        assert_eq!(v.get("config").and_then(|c| c.get("currency")), Some(&Value::from("EUR")));
        assert_eq!(v.get("store").and_then(|s| s.get("seen")), Some(&Value::from(2)));
        let row = v.get("column").and_then(|c| c.get("sku")).unwrap();
        assert_eq!(row.get("cellId"), Some(&Value::from("c7")));
        assert_eq!(row.get("columnId"), Some(&Value::from("sku")));
    }

    #[test]
    fn column_context_omits_identity() {
        let v = ColumnScope::new("p").column_api(Map::new()).to_value();
        assert!(v.get("value").is_none());
        assert!(v.get("id").is_none());
        assert!(v.get("values").is_some());
    }

    #[test]
    fn shared_map_snapshot_sorted() {
        let m = SharedMap::new();
        m.insert("b", 2);
        m.insert("a", 1);
        let keys: Vec<String> = m.snapshot().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(m.remove("a"), Some(Value::from(1)));
        assert_eq!(m.len(), 1);
    }
}
