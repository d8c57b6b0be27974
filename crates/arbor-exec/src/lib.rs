#![forbid(unsafe_code)]
//! arbor-exec: pull-to-completion runtime for operator trees.
//!
//! The algebra itself lives in `arbor-operators`; this crate only drives a
//! composed tree (open / drain / close) and exposes lightweight metrics
//! hooks behind the `tracing` feature.

pub mod metrics;
pub mod runtime;

pub use runtime::{execute, ExecError, Execution};
