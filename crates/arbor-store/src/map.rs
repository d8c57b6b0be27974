//! The group store: an in-memory, hkey-ordered collection of rows.
//!
//! A `Map` is loaded once (insert while open), then `close()` sorts it and
//! freezes it. Cursors and probes exist only on a closed map; misuse of the
//! lifecycle is a programming error and panics.

use std::cmp::Ordering;

use arbor_core::prelude::{hkey_cmp, prefix_cmp, HKey, Row};

#[derive(Debug, Default)]
pub struct Map {
    rows: Vec<Row>,
    closed: bool,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert during the load phase.
    pub fn insert(&mut self, row: Row) {
        assert!(!self.closed, "insert into closed map");
        self.rows.push(row);
    }

    /// Sort by hkey and freeze. Idempotent.
    pub fn close(&mut self) {
        if !self.closed {
            self.rows.sort_by(|a, b| hkey_cmp(a.hkey(), b.hkey()));
            self.closed = true;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in hkey order.
    pub fn rows(&self) -> &[Row] {
        assert!(self.closed, "row access on open map");
        &self.rows
    }

    /// Rows within the literal inclusive hkey range `[lo, hi]`; either bound
    /// optional. Note that a row *under* `hi` (hi a strict hkey prefix of it)
    /// sorts after `hi` and is excluded; use `cursor_prefix` for subtrees.
    pub fn cursor(&self, lo: Option<&HKey>, hi: Option<&HKey>) -> Cursor<'_> {
        let rows = self.rows();
        let start = match lo {
            Some(lo) => rows.partition_point(|r| hkey_cmp(r.hkey(), lo) == Ordering::Less),
            None => 0,
        };
        let end = match hi {
            Some(hi) => rows.partition_point(|r| hkey_cmp(r.hkey(), hi) != Ordering::Greater),
            None => rows.len(),
        };
        Cursor::over(&rows[start..end.max(start)])
    }

    /// All rows whose hkey carries `prefix`: the row at the prefix itself, if
    /// any, followed by its whole subtree.
    pub fn cursor_prefix(&self, prefix: &HKey) -> Cursor<'_> {
        self.cursor_prefix_range(Some(prefix), Some(prefix))
    }

    /// Range cursor with prefix-inclusive bounds: starts at the first row at
    /// or under `lo`, ends after the last row at or under `hi`.
    pub fn cursor_prefix_range(&self, lo: Option<&HKey>, hi: Option<&HKey>) -> Cursor<'_> {
        let rows = self.rows();
        let start = match lo {
            Some(lo) => rows.partition_point(|r| prefix_cmp(lo, r.hkey()) == Ordering::Less),
            None => 0,
        };
        let end = match hi {
            Some(hi) => rows.partition_point(|r| prefix_cmp(hi, r.hkey()) != Ordering::Greater),
            None => rows.len(),
        };
        Cursor::over(&rows[start..end.max(start)])
    }

    /// Probe for the single row with exactly this hkey.
    pub fn get(&self, hkey: &HKey) -> Option<&Row> {
        let rows = self.rows();
        let at = rows.partition_point(|r| hkey_cmp(r.hkey(), hkey) == Ordering::Less);
        rows.get(at)
            .filter(|r| hkey_cmp(r.hkey(), hkey) == Ordering::Equal)
    }
}

/// Forward-only view over a contiguous hkey range of a closed map.
#[derive(Debug)]
pub struct Cursor<'a> {
    rows: &'a [Row],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn over(rows: &'a [Row]) -> Self {
        Self { rows, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.rows.len() - self.pos
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = &'a Row;

    fn next(&mut self) -> Option<&'a Row> {
        let row = self.rows.get(self.pos)?;
        self.pos += 1;
        Some(row)
    }
}
