//! Cut / Extract: complementary type-subtree filters.
//!
//! For any input stream and type T, Cut's output plus Extract's output is
//! exactly the input, in order, with no row in both.

use std::sync::Arc;

use arbor_core::prelude::{Row, RowType};

use crate::stats::ExecStats;
use crate::traits::{OpError, OpState, Operator};

/// Drops every row whose type is `rowtype` or a descendant of it.
pub struct Cut<'a> {
    input: Box<dyn Operator + 'a>,
    rowtype: Arc<RowType>,
    state: OpState,
}

impl<'a> Cut<'a> {
    pub fn new(input: Box<dyn Operator + 'a>, rowtype: &Arc<RowType>) -> Self {
        Self {
            input,
            rowtype: Arc::clone(rowtype),
            state: OpState::default(),
        }
    }
}

impl<'a> Operator for Cut<'a> {
    fn name(&self) -> &'static str {
        "cut"
    }

    fn open(&mut self) -> Result<(), OpError> {
        self.state.check_unopened(self.name())?;
        self.input.open()?;
        self.state = OpState::Open;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>, OpError> {
        self.state.check_open(self.name())?;
        loop {
            let Some(row) = self.input.next()? else {
                return Ok(None);
            };
            if !self.rowtype.ancestor_of(row.rowtype()) {
                return Ok(Some(row));
            }
        }
    }

    fn close(&mut self) {
        self.input.close();
        self.state = OpState::Closed;
    }

    fn stats(&self) -> ExecStats {
        self.input.stats()
    }
}

/// Keeps only rows whose type is `rowtype` or a descendant of it.
pub struct Extract<'a> {
    input: Box<dyn Operator + 'a>,
    rowtype: Arc<RowType>,
    state: OpState,
}

impl<'a> Extract<'a> {
    pub fn new(input: Box<dyn Operator + 'a>, rowtype: &Arc<RowType>) -> Self {
        Self {
            input,
            rowtype: Arc::clone(rowtype),
            state: OpState::default(),
        }
    }
}

impl<'a> Operator for Extract<'a> {
    fn name(&self) -> &'static str {
        "extract"
    }

    fn open(&mut self) -> Result<(), OpError> {
        self.state.check_unopened(self.name())?;
        self.input.open()?;
        self.state = OpState::Open;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>, OpError> {
        self.state.check_open(self.name())?;
        loop {
            let Some(row) = self.input.next()? else {
                return Ok(None);
            };
            if self.rowtype.ancestor_of(row.rowtype()) {
                return Ok(Some(row));
            }
        }
    }

    fn close(&mut self) {
        self.input.close();
        self.state = OpState::Closed;
    }

    fn stats(&self) -> ExecStats {
        self.input.stats()
    }
}
