//! Select: predicate filter that propagates its verdict down a subtree.
//!
//! The predicate is evaluated once per row of the selected type; descendant
//! rows inherit the remembered verdict, so an entire subtree is accepted or
//! rejected in a single forward pass without buffering it.

use std::sync::Arc;

use arbor_core::prelude::{Row, RowType};

use crate::stats::ExecStats;
use crate::traits::{OpError, OpState, Operator};

pub struct Select<'a> {
    input: Box<dyn Operator + 'a>,
    rowtype: Arc<RowType>,
    predicate: Box<dyn Fn(&Row) -> bool + 'a>,
    /// Most recent row of the selected type and its verdict.
    remembered: Option<(Row, bool)>,
    state: OpState,
}

impl<'a> Select<'a> {
    pub fn new(
        input: Box<dyn Operator + 'a>,
        rowtype: &Arc<RowType>,
        predicate: impl Fn(&Row) -> bool + 'a,
    ) -> Self {
        Self {
            input,
            rowtype: Arc::clone(rowtype),
            predicate: Box::new(predicate),
            remembered: None,
            state: OpState::default(),
        }
    }
}

impl<'a> Operator for Select<'a> {
    fn name(&self) -> &'static str {
        "select"
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
            let rt = Arc::clone(row.rowtype());
            if rt.id() == self.rowtype.id() {
                let verdict = (self.predicate)(&row);
                self.remembered = Some((row.clone(), verdict));
                if verdict {
                    return Ok(Some(row));
                }
            } else if self.rowtype.proper_ancestor_of(&rt) {
                match &self.remembered {
                    Some((selected, verdict)) if selected.ancestor_of(&row) => {
                        if *verdict {
                            return Ok(Some(row));
                        }
                    }
                    _ => {
                        // orphan: its selected-type ancestor was filtered or never seen
                        self.remembered = None;
                    }
                }
            } else {
                // unrelated to the selected type, or one of its ancestors
                return Ok(Some(row));
            }
        }
    }

    fn close(&mut self) {
        self.remembered = None;
        self.input.close();
        self.state = OpState::Closed;
    }

    fn stats(&self) -> ExecStats {
        self.input.stats()
    }
}
