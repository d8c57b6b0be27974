//! arbor-store: the in-memory hkey-ordered group store.
//!
//! A `Map` holds a whole group (rows of every type in one hierarchy) sorted
//! by hkey once closed; `Index` derives a secondary, value-ordered map from
//! it. Cursors are plain forward iterators; all random access is a binary
//! search. No persistence and no concurrency: the store is loaded once and
//! read by a single operator tree.

pub mod index;
pub mod map;

pub use index::Index;
pub use map::{Cursor, Map};
