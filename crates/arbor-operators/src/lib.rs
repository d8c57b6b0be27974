#![forbid(unsafe_code)]
//! arbor-operators: pull-based physical operators over hkey-ordered groups.
//!
//! Design intent:
//! - Keep this crate pure and synchronous (no async, no I/O of its own).
//! - Operators compose into an exclusively-owned tree; the root's `next()`
//!   pulls recursively, one row at a time.
//! - Multi-row emission goes through a bounded pending queue per operator
//!   instance, never unbounded buffering (Sort's materialize buffer is the
//!   one declared exception).

pub mod stats;
pub mod traits;

pub mod cut;
pub mod project;
pub mod scan;
pub mod select;

pub mod flatten;
pub mod lookup;
pub mod sort;

pub use cut::{Cut, Extract};
pub use flatten::{Flatten, FlattenFlags};
pub use lookup::{AncestorLookup, IndexLookup, IndexRange, IndexScan};
pub use project::Project;
pub use scan::Scan;
pub use select::Select;
pub use sort::Sort;
pub use stats::ExecStats;
pub use traits::{OpError, OpState, Operator};
