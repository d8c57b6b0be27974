//! Convenient re-exports for downstream crates.

pub use crate::error::{Error, Result};
pub use crate::hkey::{hkey_cmp, prefix_cmp, HKey, HKeySegment};
pub use crate::id::TypeId;
pub use crate::row::Row;
pub use crate::schema::{RowType, RowTypeDef, SchemaRegistry};
pub use crate::value::{value_cmp, value_tuple_cmp, Value};
