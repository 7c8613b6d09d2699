#![forbid(unsafe_code)]

//! Operation counters.

use std::fmt;

/// Snapshot of a tree's counters.
///
/// `nodes` is the live node count. The other fields count events since
/// construction and survive [`clear`](crate::LazySumTree::clear).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeStats {
    /// Materialized nodes, root included.
    pub nodes: usize,
    /// Completed updates, including no-op empty ranges.
    pub updates: u64,
    /// Completed queries, including empty ranges.
    pub queries: u64,
    /// Push steps that moved a nonzero pending delta into children.
    pub pushes: u64,
    /// Operations refused with an error.
    pub rejected: u64,
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nodes={} updates={} queries={} pushes={} rejected={}",
            self.nodes, self.updates, self.queries, self.pushes, self.rejected
        )
    }
}
