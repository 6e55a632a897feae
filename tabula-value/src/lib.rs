//! Dynamic value model for tabula column definitions
//!
//! Column definitions arrive as untrusted, dynamically shaped documents that
//! may embed user functions. This crate owns the pieces every consumer of a
//! definition needs, independent of how the definition is validated:
//!
//! - **Value**: ordered, JSON-like tree extended with dates and callables
//! - **Callable**: shareable handle to a user function, optionally wrapped by a
//!   [`CallGuard`] that checks arguments and return values
//! - **Capability contexts**: [`CellApi`] / [`ColumnApi`] handed to every user
//!   function, minted by a per-column [`ColumnScope`] so that `cache` and
//!   `store` are shared by every cell of the column
//! - **Bridge**: lossless conversion from `serde_json::Value`, and the
//!   `JSON.stringify`-style conversion back

pub mod bridge;
pub mod callable;
pub mod context;
pub mod error;
pub mod value;

pub use callable::{Call, CallGuard, Callable};
pub use context::{CellApi, CellApiBuilder, ColumnApi, ColumnScope, Context, RowCell, SharedMap};
pub use error::{Result, ValueError};
pub use value::{Map, Value};
