//! Operator trait + common interfaces.
//!
//! Every physical operator is a pull-based iterator: `open()` recursively
//! opens inputs (no store access happens earlier), `next()` produces a lazy,
//! finite, non-restartable row sequence, `close()` recursively releases
//! cursors and inputs and is idempotent. `stats()` merges this operator's
//! counters with its inputs', recursively.

use arbor_core::prelude::Row;

use crate::stats::ExecStats;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpError {
    #[error("operator protocol: {0}")]
    Protocol(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("execution error: {0}")]
    Exec(String),
}

impl From<arbor_core::Error> for OpError {
    fn from(e: arbor_core::Error) -> Self {
        OpError::Schema(e.to_string())
    }
}

/// Trait that all operators must implement.
///
/// Invariants:
/// - `next()` keeps returning `Ok(None)` once exhausted; it never resumes.
/// - `close()` may be called at any point, any number of times, and must
///   propagate to inputs even after partial iteration.
/// - `stats()` stays well-defined after `close()`.
pub trait Operator {
    /// Human-readable operator name (stable).
    fn name(&self) -> &'static str;

    fn open(&mut self) -> Result<(), OpError>;

    fn next(&mut self) -> Result<Option<Row>, OpError>;

    fn close(&mut self);

    fn stats(&self) -> ExecStats;
}

/// Lifecycle position shared by every operator implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpState {
    #[default]
    Unopened,
    Open,
    Closed,
}

impl OpState {
    /// Guard for `open()`.
    pub fn check_unopened(self, op: &'static str) -> Result<(), OpError> {
        match self {
            OpState::Unopened => Ok(()),
            OpState::Open => Err(OpError::Protocol(format!("{}: open called twice", op))),
            OpState::Closed => Err(OpError::Protocol(format!("{}: open after close", op))),
        }
    }

    /// Guard for `next()`.
    pub fn check_open(self, op: &'static str) -> Result<(), OpError> {
        match self {
            OpState::Open => Ok(()),
            OpState::Unopened => Err(OpError::Protocol(format!("{}: next before open", op))),
            OpState::Closed => Err(OpError::Protocol(format!("{}: next after close", op))),
        }
    }
}
