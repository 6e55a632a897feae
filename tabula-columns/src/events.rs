//! Lifecycle hooks a column may register.

use std::fmt;

use tabula_value::{CellApi, Callable, Context, Value};
use tracing::debug;

use crate::decode;
use crate::schema::{FunctionContract, ObjectSchema, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// After the cell is created
    CellCreated,
    /// After a parsed value was committed to the cell
    CellUpdated,
    /// After the cell was deleted; `api.value` holds its last value
    CellDeleted,
    ConfigUpdated,
}

impl Event {
    pub const ALL: [Event; 4] = [
        Event::CellCreated,
        Event::CellUpdated,
        Event::CellDeleted,
        Event::ConfigUpdated,
    ];

    /// Key of the hook in the `events` object.
    pub fn key(&self) -> &'static str {
        match self {
            Event::CellCreated => "onCellCreated",
            Event::CellUpdated => "onCellUpdated",
            Event::CellDeleted => "onCellDeleted",
            Event::ConfigUpdated => "onConfigUpdated",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Every hook is optional and has the shape `(CellApi<V>) -> any`.
pub fn events_schema(value: Schema) -> Schema {
    Event::ALL
        .into_iter()
        .fold(ObjectSchema::new(), |object, event| {
            object.optional(
                event.key(),
                FunctionContract::cell(Schema::any()).value(value.clone()),
            )
        })
        .into()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Events {
    pub on_cell_created: Option<Callable>,
    pub on_cell_updated: Option<Callable>,
    pub on_cell_deleted: Option<Callable>,
    pub on_config_updated: Option<Callable>,
}

impl Events {
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            on_cell_created: decode::callable(map, Event::CellCreated.key()),
            on_cell_updated: decode::callable(map, Event::CellUpdated.key()),
            on_cell_deleted: decode::callable(map, Event::CellDeleted.key()),
            on_config_updated: decode::callable(map, Event::ConfigUpdated.key()),
        })
    }

    pub fn hook(&self, event: Event) -> Option<&Callable> {
        match event {
            Event::CellCreated => self.on_cell_created.as_ref(),
            Event::CellUpdated => self.on_cell_updated.as_ref(),
            Event::CellDeleted => self.on_cell_deleted.as_ref(),
            Event::ConfigUpdated => self.on_config_updated.as_ref(),
        }
    }

    /// Invoke the hook for `event`, if registered.
    pub fn fire(&self, event: Event, api: &CellApi) -> Option<tabula_value::Result<Value>> {
        let hook = self.hook(event)?;
        debug!(event = %event, cell = %api.id, "firing column event");
        Some(hook.call_with(&Context::Cell(api.clone()), &[]))
    }
}
