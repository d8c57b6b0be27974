//! Execution counters, merged up the operator tree.

use serde::{Deserialize, Serialize};

/// Three counters, elementwise-summed across an operator and its inputs:
/// cursor/probe creations, rows pulled from cursors, and rows materialized
/// by sorts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecStats {
    pub random_access: u64,
    pub sequential_access: u64,
    pub sort_row_count: u64,
}

impl ExecStats {
    /// Elementwise sum with another counter set.
    pub fn merged(self, other: ExecStats) -> ExecStats {
        ExecStats {
            random_access: self.random_access + other.random_access,
            sequential_access: self.sequential_access + other.sequential_access,
            sort_row_count: self.sort_row_count + other.sort_row_count,
        }
    }
}
