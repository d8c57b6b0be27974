//! Scan: wrap a single store cursor as an operator.

use arbor_core::prelude::{HKey, Row};
use arbor_store::{Cursor, Map};

use crate::stats::ExecStats;
use crate::traits::{OpError, OpState, Operator};

/// Full or hkey-bounded scan of a map. The cursor is created at `open()`
/// (one random access); each yielded row is one sequential access.
pub struct Scan<'a> {
    source: &'a Map,
    lo: Option<HKey>,
    hi: Option<HKey>,
    cursor: Option<Cursor<'a>>,
    state: OpState,
    stats: ExecStats,
}

impl<'a> Scan<'a> {
    pub fn new(source: &'a Map) -> Self {
        Self::with_bounds(source, None, None)
    }

    /// Literal inclusive hkey bounds, either optional.
    pub fn with_bounds(source: &'a Map, lo: Option<HKey>, hi: Option<HKey>) -> Self {
        Self {
            source,
            lo,
            hi,
            cursor: None,
            state: OpState::default(),
            stats: ExecStats::default(),
        }
    }
}

impl<'a> Operator for Scan<'a> {
    fn name(&self) -> &'static str {
        "scan"
    }

    fn open(&mut self) -> Result<(), OpError> {
        self.state.check_unopened(self.name())?;
        let source = self.source;
        let cursor = source.cursor(self.lo.as_ref(), self.hi.as_ref());
        self.cursor = Some(cursor);
        self.stats.random_access += 1;
        self.state = OpState::Open;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>, OpError> {
        self.state.check_open(self.name())?;
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(None);
        };
        match cursor.next() {
            Some(row) => {
                self.stats.sequential_access += 1;
                Ok(Some(row.clone()))
            }
            None => {
                // terminal: drop the cursor so later calls stay cheap
                self.cursor = None;
                Ok(None)
            }
        }
    }

    fn close(&mut self) {
        self.cursor = None;
        self.state = OpState::Closed;
    }

    fn stats(&self) -> ExecStats {
        self.stats
    }
}
