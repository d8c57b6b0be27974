//! arbor-core: row types, rows, hierarchical keys, and the schema registry.
//!
//! Rows of different declared types live together in one group, ordered by a
//! composite hierarchical key (hkey) whose prefix containment encodes
//! ancestry. This crate is pure data: no store, no operators, no I/O.
//!
//! Conventions:
//! - Type-level `ancestor_of` is inclusive (a type is its own ancestor, for
//!   dispatch); row-level `ancestor_of` is strict (a row is not).
//! - All row construction validates arity against the declared field list.

pub mod error;
pub mod hkey;
pub mod id;
pub mod prelude;
pub mod row;
pub mod schema;
pub mod value;

pub use error::{Error, Result};
