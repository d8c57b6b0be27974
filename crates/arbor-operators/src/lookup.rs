//! Index lookup operators: reconcile a narrow secondary index against the
//! full group store.
//!
//! IndexScan ranges over index entries; IndexLookup re-derives, from each
//! index entry, the whole subtree its source hkey implies (optionally
//! backfilling ancestor rows an index on a descendant type skips over);
//! AncestorLookup probes 0-or-1 ancestor row per declared type for group
//! rows already in hand.

use std::collections::VecDeque;
use std::sync::Arc;

use arbor_core::prelude::{Error, Result as CoreResult, Row, RowType, Value};
use arbor_store::{Cursor, Index, Map};

use crate::stats::ExecStats;
use crate::traits::{OpError, OpState, Operator};

/// Sub-range of an index to scan, in indexed-value space.
#[derive(Debug, Clone)]
pub enum IndexRange {
    All,
    /// All entries whose leading indexed values equal the given tuple.
    Eq(Vec<Value>),
    /// Inclusive value bounds, either optional.
    Range {
        lo: Option<Vec<Value>>,
        hi: Option<Vec<Value>>,
    },
}

/// Scan over a sub-range of an index's entries. One random access at cursor
/// creation, one sequential access per entry.
pub struct IndexScan<'a> {
    index: &'a Index,
    range: IndexRange,
    cursor: Option<Cursor<'a>>,
    state: OpState,
    stats: ExecStats,
}

impl<'a> IndexScan<'a> {
    pub fn new(index: &'a Index, range: IndexRange) -> Self {
        Self {
            index,
            range,
            cursor: None,
            state: OpState::default(),
            stats: ExecStats::default(),
        }
    }
}

impl<'a> Operator for IndexScan<'a> {
    fn name(&self) -> &'static str {
        "index_scan"
    }

    fn open(&mut self) -> Result<(), OpError> {
        self.state.check_unopened(self.name())?;
        let index = self.index;
        let map = index.map();
        let cursor = match &self.range {
            IndexRange::All => map.cursor(None, None),
            IndexRange::Eq(values) => map.cursor_prefix(&index.value_prefix(values)),
            IndexRange::Range { lo, hi } => {
                let lo = lo.as_ref().map(|v| index.value_prefix(v));
                let hi = hi.as_ref().map(|v| index.value_prefix(v));
                map.cursor_prefix_range(lo.as_ref(), hi.as_ref())
            }
        };
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

/// For each input index entry, stream the base-store subtree rooted at the
/// entry's source hkey. An index built on a descendant type skips the
/// intermediate ancestor rows a query still needs; declaring them as
/// `missing_ancestors` probes each truncated hkey prefix on the way down
/// and queues matching rows ahead of the subtree.
pub struct IndexLookup<'a> {
    input: Box<dyn Operator + 'a>,
    base: &'a Map,
    missing_ancestors: Vec<Arc<RowType>>,
    pending: VecDeque<Row>,
    cursor: Option<Cursor<'a>>,
    state: OpState,
    stats: ExecStats,
}

impl<'a> IndexLookup<'a> {
    pub fn new(input: Box<dyn Operator + 'a>, base: &'a Map) -> Self {
        Self::with_missing_ancestors(input, base, Vec::new())
    }

    pub fn with_missing_ancestors(
        input: Box<dyn Operator + 'a>,
        base: &'a Map,
        missing_ancestors: Vec<Arc<RowType>>,
    ) -> Self {
        Self {
            input,
            base,
            missing_ancestors,
            pending: VecDeque::new(),
            cursor: None,
            state: OpState::default(),
            stats: ExecStats::default(),
        }
    }

    /// Position on the next index entry's subtree, backfilling ancestors.
    fn start_lookup(&mut self, entry: &Row) -> Result<(), OpError> {
        if entry.hkey().len() < 2 {
            return Err(OpError::Exec(format!(
                "index entry of type '{}' carries no source hkey",
                entry.rowtype().name()
            )));
        }
        let base = self.base;
        let lookup = Index::source_hkey(entry);
        if !self.missing_ancestors.is_empty() {
            // one probe per ancestor level, shallowest first (hkey order)
            for depth in 1..lookup.len() {
                let prefix = lookup.prefix(depth);
                self.stats.random_access += 1;
                if let Some(row) = base.get(&prefix) {
                    let wanted = self
                        .missing_ancestors
                        .iter()
                        .any(|t| t.id() == row.rowtype().id());
                    if wanted {
                        self.pending.push_back(row.clone());
                    }
                }
            }
        }
        self.stats.random_access += 1;
        self.cursor = Some(base.cursor_prefix(&lookup));
        Ok(())
    }
}

impl<'a> Operator for IndexLookup<'a> {
    fn name(&self) -> &'static str {
        "index_lookup"
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
            if let Some(row) = self.pending.pop_front() {
                return Ok(Some(row));
            }
            if let Some(cursor) = self.cursor.as_mut() {
                if let Some(row) = cursor.next() {
                    self.stats.sequential_access += 1;
                    return Ok(Some(row.clone()));
                }
                self.cursor = None;
            }
            let Some(entry) = self.input.next()? else {
                return Ok(None);
            };
            self.start_lookup(&entry)?;
        }
    }

    fn close(&mut self) {
        self.pending.clear();
        self.cursor = None;
        self.input.close();
        self.state = OpState::Closed;
    }

    fn stats(&self) -> ExecStats {
        self.stats.merged(self.input.stats())
    }
}

/// For each input row of `rowtype`, probe the base store for the row of
/// each declared ancestor type (0 or 1 per type) by shortening the hkey to
/// that type's depth; located ancestors are emitted in hkey order, then the
/// input row itself if `keep_input`. Other rows pass through.
pub struct AncestorLookup<'a> {
    input: Box<dyn Operator + 'a>,
    base: &'a Map,
    rowtype: Arc<RowType>,
    ancestor_types: Vec<Arc<RowType>>,
    keep_input: bool,
    pending: VecDeque<Row>,
    state: OpState,
    stats: ExecStats,
}

impl<'a> AncestorLookup<'a> {
    /// Each ancestor type must be a proper type-level ancestor of `rowtype`.
    pub fn new(
        input: Box<dyn Operator + 'a>,
        base: &'a Map,
        rowtype: &Arc<RowType>,
        ancestor_types: &[Arc<RowType>],
        keep_input: bool,
    ) -> CoreResult<Self> {
        let mut ancestors = ancestor_types.to_vec();
        for t in &ancestors {
            if !t.proper_ancestor_of(rowtype) {
                return Err(Error::Schema(format!(
                    "'{}' is not an ancestor of '{}'",
                    t.name(),
                    rowtype.name()
                )));
            }
        }
        // probe shallowest first so output is in hkey order
        ancestors.sort_by_key(|t| t.depth());
        Ok(Self {
            input,
            base,
            rowtype: Arc::clone(rowtype),
            ancestor_types: ancestors,
            keep_input,
            pending: VecDeque::new(),
            state: OpState::default(),
            stats: ExecStats::default(),
        })
    }
}

impl<'a> Operator for AncestorLookup<'a> {
    fn name(&self) -> &'static str {
        "ancestor_lookup"
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
            if let Some(row) = self.pending.pop_front() {
                return Ok(Some(row));
            }
            let Some(row) = self.input.next()? else {
                return Ok(None);
            };
            if row.rowtype().id() != self.rowtype.id() {
                return Ok(Some(row));
            }
            for ancestor in &self.ancestor_types {
                let prefix = row.hkey().prefix(ancestor.depth());
                self.stats.random_access += 1;
                if let Some(found) = self.base.get(&prefix) {
                    self.pending.push_back(found.clone());
                }
            }
            if self.keep_input {
                self.pending.push_back(row);
            }
        }
    }

    fn close(&mut self) {
        self.pending.clear();
        self.input.close();
        self.state = OpState::Closed;
    }

    fn stats(&self) -> ExecStats {
        self.stats.merged(self.input.stats())
    }
}
