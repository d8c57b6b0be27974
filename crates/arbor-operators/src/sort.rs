//! Sort: blocking materialize-then-emit.
//!
//! The first `next()` drains the whole input into a buffer, stable-sorts it
//! under a caller-supplied key extraction, and replays it row by row. Not
//! restartable, not incremental.

use std::sync::Arc;

use arbor_core::prelude::{value_tuple_cmp, Row, RowType, Value};

use crate::stats::ExecStats;
use crate::traits::{OpError, OpState, Operator};

pub struct Sort<'a> {
    input: Box<dyn Operator + 'a>,
    rowtype: Arc<RowType>,
    key_fn: Box<dyn Fn(&Row) -> Vec<Value> + 'a>,
    buffer: Vec<Row>,
    pos: usize,
    loaded: bool,
    state: OpState,
    stats: ExecStats,
}

impl<'a> Sort<'a> {
    /// Every input row must be of `rowtype`; `key_fn` extracts the sort key
    /// tuple, compared under the total value order. Ties keep input order.
    pub fn new(
        input: Box<dyn Operator + 'a>,
        rowtype: &Arc<RowType>,
        key_fn: impl Fn(&Row) -> Vec<Value> + 'a,
    ) -> Self {
        Self {
            input,
            rowtype: Arc::clone(rowtype),
            key_fn: Box::new(key_fn),
            buffer: Vec::new(),
            pos: 0,
            loaded: false,
            state: OpState::default(),
            stats: ExecStats::default(),
        }
    }

    /// Drain the input, sort, and count the materialized rows once.
    fn load(&mut self) -> Result<(), OpError> {
        let mut keyed: Vec<(Vec<Value>, Row)> = Vec::new();
        while let Some(row) = self.input.next()? {
            if row.rowtype().id() != self.rowtype.id() {
                return Err(OpError::Exec(format!(
                    "sort over '{}' got a row of '{}'",
                    self.rowtype.name(),
                    row.rowtype().name()
                )));
            }
            keyed.push(((self.key_fn)(&row), row));
        }
        keyed.sort_by(|(a, _), (b, _)| value_tuple_cmp(a, b));
        self.stats.sort_row_count += keyed.len() as u64;
        self.buffer = keyed.into_iter().map(|(_, row)| row).collect();
        self.loaded = true;
        Ok(())
    }
}

impl<'a> Operator for Sort<'a> {
    fn name(&self) -> &'static str {
        "sort"
    }

    fn open(&mut self) -> Result<(), OpError> {
        self.state.check_unopened(self.name())?;
        self.input.open()?;
        self.state = OpState::Open;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>, OpError> {
        self.state.check_open(self.name())?;
        if !self.loaded {
            self.load()?;
        }
        match self.buffer.get(self.pos) {
            Some(row) => {
                self.pos += 1;
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }

    fn close(&mut self) {
        self.buffer.clear();
        self.input.close();
        self.state = OpState::Closed;
    }

    fn stats(&self) -> ExecStats {
        self.stats.merged(self.input.stats())
    }
}
