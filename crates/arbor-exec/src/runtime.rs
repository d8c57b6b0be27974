//! Runtime: drive an operator tree to completion.
//!
//! The caller composes physical operators directly and hands the root here;
//! `execute` opens the tree, pulls until exhaustion, closes it on both the
//! success and the error path, and returns the collected rows together with
//! the tree's merged access counters.

use thiserror::Error;

use arbor_core::prelude::Row;
use arbor_operators::{ExecStats, OpError, Operator};

use crate::metrics;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("operator exec: {0}")]
    Operator(#[from] OpError),
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct Execution {
    pub rows: Vec<Row>,
    pub stats: ExecStats,
}

/// Run `root` to exhaustion. The tree is closed before returning, whether
/// iteration succeeded or failed.
pub fn execute(root: &mut dyn Operator) -> Result<Execution, ExecError> {
    metrics::emit_event("execute.open", &[("operator", root.name().to_string())]);
    if let Err(e) = root.open() {
        root.close();
        return Err(e.into());
    }
    let mut rows = Vec::new();
    loop {
        match root.next() {
            Ok(Some(row)) => rows.push(row),
            Ok(None) => break,
            Err(e) => {
                root.close();
                return Err(e.into());
            }
        }
    }
    root.close();
    let stats = root.stats();
    metrics::emit_event(
        "execute.done",
        &[
            ("rows", rows.len().to_string()),
            ("random_access", stats.random_access.to_string()),
            ("sequential_access", stats.sequential_access.to_string()),
        ],
    );
    Ok(Execution { rows, stats })
}
