//! Flatten: the stateful hierarchical join.
//!
//! Combines parent-type and child-type rows of an hkey-ordered stream into
//! rows of a declared flattened type. Pairing is hierarchical (hkey prefix
//! containment), not equality-based; join mode only controls what happens
//! to unmatched parents (LEFT) and orphaned children (RIGHT). Rows of other
//! types pass through, and one input row can produce up to two output rows
//! (an optional echo plus a synthesized row), so output is staged through a
//! small pending queue drained before any further input is pulled.

use std::collections::VecDeque;
use std::ops::BitOr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use arbor_core::prelude::{Row, RowType, Value};

use crate::stats::ExecStats;
use crate::traits::{OpError, OpState, Operator};

/// Flatten behavior flags. Join mode defaults to LEFT when none of the join
/// bits is set; INNER is accepted for API symmetry but adds nothing beyond
/// LEFT/RIGHT controlling unmatched-row emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlattenFlags(u32);

impl FlattenFlags {
    pub const KEEP_PARENT: FlattenFlags = FlattenFlags(0x01);
    pub const KEEP_CHILD: FlattenFlags = FlattenFlags(0x02);
    pub const INNER_JOIN: FlattenFlags = FlattenFlags(0x04);
    pub const LEFT_JOIN: FlattenFlags = FlattenFlags(0x08);
    pub const RIGHT_JOIN: FlattenFlags = FlattenFlags(0x10);
    pub const FULL_JOIN: FlattenFlags = FlattenFlags(0x08 | 0x10);

    pub const fn empty() -> FlattenFlags {
        FlattenFlags(0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: FlattenFlags) -> bool {
        self.0 & other.0 == other.0
    }

    const fn join_bits(self) -> u32 {
        self.0 & (Self::INNER_JOIN.0 | Self::LEFT_JOIN.0 | Self::RIGHT_JOIN.0)
    }
}

impl Default for FlattenFlags {
    fn default() -> Self {
        Self::LEFT_JOIN
    }
}

impl BitOr for FlattenFlags {
    type Output = FlattenFlags;

    fn bitor(self, rhs: FlattenFlags) -> FlattenFlags {
        FlattenFlags(self.0 | rhs.0)
    }
}

pub struct Flatten<'a> {
    input: Box<dyn Operator + 'a>,
    parent_type: Arc<RowType>,
    child_type: Arc<RowType>,
    flatten_type: Arc<RowType>,
    keep_parent: bool,
    keep_child: bool,
    left_join: bool,
    right_join: bool,

    // State between input rows.
    current_parent: Option<Row>,
    current_child: Option<Row>,
    childless_parent: bool,
    pending: VecDeque<Row>,
    input_done: bool,
    flushed: bool,
    state: OpState,
}

impl<'a> Flatten<'a> {
    pub fn new(
        input: Box<dyn Operator + 'a>,
        parent_type: &Arc<RowType>,
        child_type: &Arc<RowType>,
        flatten_type: &Arc<RowType>,
        flags: FlattenFlags,
    ) -> Self {
        let joined = if flags.join_bits() == 0 {
            flags | FlattenFlags::LEFT_JOIN
        } else {
            flags
        };
        Self {
            input,
            parent_type: Arc::clone(parent_type),
            child_type: Arc::clone(child_type),
            flatten_type: Arc::clone(flatten_type),
            keep_parent: joined.contains(FlattenFlags::KEEP_PARENT),
            keep_child: joined.contains(FlattenFlags::KEEP_CHILD),
            left_join: joined.contains(FlattenFlags::LEFT_JOIN),
            right_join: joined.contains(FlattenFlags::RIGHT_JOIN),
            current_parent: None,
            current_child: None,
            childless_parent: false,
            pending: VecDeque::with_capacity(2),
            input_done: false,
            flushed: false,
            state: OpState::default(),
        }
    }

    /// Apply the transition rules to one input row, enqueueing any output.
    fn absorb(&mut self, row: Row) {
        let rt = Arc::clone(row.rowtype());
        if rt.id() == self.parent_type.id() {
            if self.keep_parent {
                self.pending.push_back(row.clone());
            }
            self.close_out_parent();
            self.current_parent = Some(row);
            self.current_child = None;
            self.childless_parent = true;
        } else if rt.id() == self.child_type.id() {
            if self.keep_child {
                self.pending.push_back(row.clone());
            }
            match &self.current_parent {
                Some(parent) if parent.ancestor_of(&row) => {
                    // true parent-child pair: always pairs, whatever the join mode
                    self.childless_parent = false;
                    let joined = self.joined_row(Some(parent), Some(&row));
                    self.pending.push_back(joined);
                }
                _ => {
                    // orphan child: no matching ancestor in scope
                    self.current_parent = None;
                    self.childless_parent = false;
                    if self.right_join {
                        let joined = self.joined_row(None, Some(&row));
                        self.pending.push_back(joined);
                    }
                }
            }
            self.current_child = Some(row);
        } else {
            self.pending.push_back(row.clone());
            if self.parent_type.proper_ancestor_of(&rt) {
                let stale = !matches!(&self.current_parent, Some(p) if p.ancestor_of(&row));
                if stale {
                    self.current_parent = None;
                    self.childless_parent = false;
                }
            }
            if self.child_type.proper_ancestor_of(&rt) {
                let stale = !matches!(&self.current_child, Some(c) if c.ancestor_of(&row));
                if stale {
                    self.current_child = None;
                }
            }
        }
    }

    /// Finish the outstanding parent: a childless parent owes a left-join
    /// row if LEFT is enabled.
    fn close_out_parent(&mut self) {
        if let Some(parent) = self.current_parent.take() {
            if self.childless_parent && self.left_join {
                let joined = self.joined_row(Some(&parent), None);
                self.pending.push_back(joined);
            }
        }
        self.childless_parent = false;
    }

    /// Build a flattened row. Field values resolve child-first, then
    /// parent, else null; the row sits at the child's hkey when a child is
    /// present, otherwise at the parent's.
    fn joined_row(&self, parent: Option<&Row>, child: Option<&Row>) -> Row {
        debug_assert!(parent.is_some() || child.is_some());
        let values: Vec<Value> = self
            .flatten_type
            .value_fields()
            .iter()
            .map(|f| {
                child
                    .and_then(|c| c.get(f))
                    .or_else(|| parent.and_then(|p| p.get(f)))
                    .cloned()
                    .unwrap_or(Value::Null)
            })
            .collect();
        let hkey = match (child, parent) {
            (Some(c), _) => c.hkey().clone(),
            (None, Some(p)) => p.hkey().clone(),
            (None, None) => unreachable!("flatten: joined row without parent or child"),
        };
        Row::with_hkey(&self.flatten_type, values, hkey)
    }
}

impl<'a> Operator for Flatten<'a> {
    fn name(&self) -> &'static str {
        "flatten"
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
            if self.input_done {
                if !self.flushed {
                    // end of input: the last parent must not be dropped
                    self.flushed = true;
                    self.close_out_parent();
                    self.current_child = None;
                    continue;
                }
                return Ok(None);
            }
            match self.input.next()? {
                Some(row) => self.absorb(row),
                None => self.input_done = true,
            }
        }
    }

    fn close(&mut self) {
        self.current_parent = None;
        self.current_child = None;
        self.childless_parent = false;
        self.pending.clear();
        self.input.close();
        self.state = OpState::Closed;
    }

    fn stats(&self) -> ExecStats {
        self.input.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flags_are_left_join() {
        assert_eq!(FlattenFlags::default(), FlattenFlags::LEFT_JOIN);
    }

    #[test]
    fn test_flag_union_and_containment() {
        let flags = FlattenFlags::KEEP_PARENT | FlattenFlags::RIGHT_JOIN;
        assert!(flags.contains(FlattenFlags::KEEP_PARENT));
        assert!(flags.contains(FlattenFlags::RIGHT_JOIN));
        assert!(!flags.contains(FlattenFlags::LEFT_JOIN));
        assert_eq!(FlattenFlags::FULL_JOIN.bits(), 0x18);
        assert_eq!(FlattenFlags::empty().bits(), 0);
    }
}
