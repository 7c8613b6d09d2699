#![forbid(unsafe_code)]

//! Dynamically allocated interval tree with deferred range-add propagation.
//!
//! Supports adding a delta to every position of a range and summing a range
//! over a fixed domain `[lo, hi]` of up to 2^64 positions. Nodes are created
//! only when a recursion has to descend into a sub-range, so `Q` operations
//! materialize `O(Q log N)` nodes regardless of the domain size `N`.
//!
//! # Layout
//!
//! Nodes live in a single `Vec<Node>` arena. The root sits at index 0 and is
//! never anybody's child, so a child handle of `None` means "not yet
//! materialized". Children are always created as a pair in adjacent slots:
//! a node stores the index of its left child and the right child is the slot
//! after it. A node's covered span is not stored; it is carried down the
//! recursion from the domain by repeated [`Span::split`].
//!
//! # Operations
//!
//! | Operation | Time | New nodes |
//! |-----------|------|-----------|
//! | `new(lo, hi)` | O(1) | 1 (root) |
//! | `update(lo, hi, delta)` | O(log N) | ≤ 4 per level |
//! | `query(lo, hi)` | O(log N) | ≤ 4 per level |
//! | `point(i)` | O(log N) | ≤ 2 per level |
//! | `total()` | O(1) | 0 |
//!
//! # Invariants
//!
//! 1. A node's `aggregate` is the sum over its whole span, counting its own
//!    `pending`.
//! 2. A node with children satisfies
//!    `aggregate == left.aggregate + right.aggregate + pending * len`.
//! 3. `pending` is pushed into the children, and reset to zero, before any
//!    recursion descends below the node.
//! 4. An absent child is equivalent to a child with `aggregate == 0` and
//!    `pending == 0`.
//!
//! # Bounds
//!
//! Ranges reaching outside the domain are clipped or rejected according to
//! [`BoundsPolicy`]. A range with `lo > hi` (before or after clipping) is
//! empty: updates do nothing and queries return 0, under either policy.
//!
//! # Arithmetic
//!
//! Aggregates and pending deltas are `i128`. Results are exact while the sum
//! of `|delta| * range length` over all updates fits in `i128`; a domain of
//! 10^9 positions with `|delta| <= i64::MAX` allows more than 10^10 updates.
//! Past that point sums wrap in two's complement.

use std::num::NonZeroU32;

use crate::config::{BoundsPolicy, TreeConfig};
use crate::error::TreeError;
use crate::span::Span;
use crate::stats::TreeStats;

const ROOT: usize = 0;

/// Largest arena length addressable by a `NonZeroU32` child handle.
const MAX_ARENA_LEN: usize = u32::MAX as usize;

#[derive(Debug, Clone, Default)]
struct Node {
    aggregate: i128,
    /// Applied to `aggregate`, not yet applied to the children.
    pending: i128,
    /// Index of the left child; the right child follows it.
    children: Option<NonZeroU32>,
}

impl Node {
    #[inline]
    fn apply(&mut self, delta: i128, len: i128) {
        self.aggregate = self.aggregate.wrapping_add(delta.wrapping_mul(len));
        self.pending = self.pending.wrapping_add(delta);
    }
}

/// Range-add / range-sum tree over a fixed integer domain.
///
/// ```
/// use lazyseg::LazySumTree;
///
/// let mut tree = LazySumTree::new(0, 999_999_999);
/// tree.update(10, 19, 3);
/// tree.update(15, 1_000, -1);
/// assert_eq!(tree.query(0, 14), 15);
/// assert_eq!(tree.query(15, 19), 10);
/// assert_eq!(tree.query(0, 999_999_999), 30 - 986);
/// ```
#[derive(Debug, Clone)]
pub struct LazySumTree {
    domain: Span,
    nodes: Vec<Node>,
    config: TreeConfig,
    updates: u64,
    queries: u64,
    pushes: u64,
    rejected: u64,
}

impl LazySumTree {
    /// Create a tree over `[domain_lo, domain_hi]` with the default config.
    ///
    /// # Panics
    /// Panics if `domain_lo > domain_hi`.
    #[must_use]
    pub fn new(domain_lo: i64, domain_hi: i64) -> Self {
        Self::with_config(domain_lo, domain_hi, TreeConfig::default())
    }

    /// Create a tree with an explicit config.
    ///
    /// # Panics
    /// Panics if `domain_lo > domain_hi` or the root cannot be allocated
    /// within the config's limits.
    #[must_use]
    pub fn with_config(domain_lo: i64, domain_hi: i64, config: TreeConfig) -> Self {
        match Self::try_with_config(domain_lo, domain_hi, config) {
            Ok(tree) => tree,
            Err(err) => panic!("lazyseg: {err}"),
        }
    }

    /// Fallible [`new`](Self::new).
    pub fn try_new(domain_lo: i64, domain_hi: i64) -> Result<Self, TreeError> {
        Self::try_with_config(domain_lo, domain_hi, TreeConfig::default())
    }

    /// Fallible [`with_config`](Self::with_config).
    pub fn try_with_config(
        domain_lo: i64,
        domain_hi: i64,
        config: TreeConfig,
    ) -> Result<Self, TreeError> {
        if domain_lo > domain_hi {
            return Err(TreeError::InvertedDomain {
                lo: domain_lo,
                hi: domain_hi,
            });
        }
        if config.max_nodes == Some(0) {
            return Err(TreeError::NodeLimitExceeded {
                limit: 0,
                live: 0,
                required: 1,
            });
        }

        let capacity = config.initial_capacity.clamp(1, MAX_ARENA_LEN);
        let mut nodes = Vec::new();
        nodes
            .try_reserve(capacity)
            .map_err(|_| TreeError::AllocationFailed {
                requested: capacity,
            })?;
        nodes.push(Node::default());

        let domain = Span::new(domain_lo, domain_hi);
        crate::debug!(
            domain_lo,
            domain_hi,
            bounds = config.bounds.as_str(),
            "lazyseg tree created"
        );

        Ok(Self {
            domain,
            nodes,
            config,
            updates: 0,
            queries: 0,
            pushes: 0,
            rejected: 0,
        })
    }

    /// The covered domain.
    #[inline]
    #[must_use]
    pub fn domain(&self) -> Span {
        self.domain
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Materialized nodes, root included.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Halvings from the domain down to a single position.
    #[inline]
    #[must_use]
    pub fn max_depth(&self) -> u32 {
        self.domain.depth()
    }

    /// Sum over the whole domain.
    #[inline]
    #[must_use]
    pub fn total(&self) -> i128 {
        self.nodes[ROOT].aggregate
    }

    #[must_use]
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            nodes: self.nodes.len(),
            updates: self.updates,
            queries: self.queries,
            pushes: self.pushes,
            rejected: self.rejected,
        }
    }

    /// Reset every position to zero, dropping all nodes but the root.
    ///
    /// Arena capacity is kept for reuse.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[ROOT] = Node::default();
        crate::debug!(domain = %self.domain, "lazyseg tree cleared");
    }

    /// Add `delta` to every position in `[lo, hi]`.
    ///
    /// # Panics
    /// Panics where [`try_update`](Self::try_update) would return an error.
    pub fn update(&mut self, lo: i64, hi: i64, delta: i64) {
        if let Err(err) = self.try_update(lo, hi, delta) {
            panic!("lazyseg update: {err}");
        }
    }

    /// Sum of the positions in `[lo, hi]`.
    ///
    /// Takes `&mut self` because resolving pending deltas can materialize
    /// nodes.
    ///
    /// # Panics
    /// Panics where [`try_query`](Self::try_query) would return an error.
    pub fn query(&mut self, lo: i64, hi: i64) -> i128 {
        match self.try_query(lo, hi) {
            Ok(sum) => sum,
            Err(err) => panic!("lazyseg query: {err}"),
        }
    }

    /// Value at a single position.
    ///
    /// # Panics
    /// Panics where [`try_point`](Self::try_point) would return an error.
    pub fn point(&mut self, at: i64) -> i128 {
        self.query(at, at)
    }

    /// Add `delta` to every position in `[lo, hi]`.
    ///
    /// Fails without modifying the tree if the range is rejected by the
    /// bounds policy or the operation cannot reserve its node headroom.
    pub fn try_update(&mut self, lo: i64, hi: i64, delta: i64) -> Result<(), TreeError> {
        let _span = crate::debug_span!("lazyseg_update", lo, hi, delta).entered();

        let range = self.resolve(Span::new(lo, hi))?;
        if !range.is_empty() {
            if range != self.domain {
                self.reserve_headroom()?;
            }
            self.update_rec(ROOT, self.domain, range, i128::from(delta));
        }
        self.updates += 1;
        Ok(())
    }

    /// Sum of the positions in `[lo, hi]`.
    ///
    /// Same failure rules as [`try_update`](Self::try_update). An empty
    /// range sums to 0.
    pub fn try_query(&mut self, lo: i64, hi: i64) -> Result<i128, TreeError> {
        let _span = crate::debug_span!("lazyseg_query", lo, hi).entered();

        let range = self.resolve(Span::new(lo, hi))?;
        let sum = if range.is_empty() {
            0
        } else if range == self.domain {
            self.total()
        } else {
            self.reserve_headroom()?;
            self.query_rec(ROOT, self.domain, range)
        };
        self.queries += 1;
        Ok(sum)
    }

    /// Value at a single position.
    ///
    /// Under [`BoundsPolicy::Clip`] a position outside the domain reads as 0.
    pub fn try_point(&mut self, at: i64) -> Result<i128, TreeError> {
        self.try_query(at, at)
    }

    /// Apply the bounds policy to a requested range.
    fn resolve(&mut self, requested: Span) -> Result<Span, TreeError> {
        if requested.is_empty() || self.domain.covers(requested) {
            return Ok(requested);
        }
        match self.config.bounds {
            BoundsPolicy::Clip => Ok(self.domain.intersection(requested)),
            BoundsPolicy::Reject => {
                self.rejected += 1;
                crate::warn!(
                    requested = %requested,
                    domain = %self.domain,
                    "lazyseg range rejected"
                );
                Err(TreeError::OutOfDomain {
                    requested,
                    domain: self.domain,
                })
            }
        }
    }

    /// Make sure the arena can take the worst-case growth of one operation
    /// without reallocating midway.
    ///
    /// At most two nodes per level partially overlap a range, and each push
    /// adds two children.
    fn reserve_headroom(&mut self) -> Result<(), TreeError> {
        let required = 4 * self.domain.depth() as usize + 4;
        let live = self.nodes.len();

        if let Some(limit) = self.config.max_nodes
            && live + required > limit
        {
            self.rejected += 1;
            crate::warn!(limit, live, required, "lazyseg node limit reached");
            return Err(TreeError::NodeLimitExceeded {
                limit,
                live,
                required,
            });
        }
        if live + required > MAX_ARENA_LEN {
            self.rejected += 1;
            return Err(TreeError::AllocationFailed { requested: required });
        }
        self.nodes.try_reserve(required).map_err(|_| {
            self.rejected += 1;
            TreeError::AllocationFailed { requested: required }
        })
    }

    /// Resolve the pending delta of `node` into its children, creating them
    /// if needed. Returns the children's arena indices.
    fn push(&mut self, node: usize, left_len: i128, right_len: i128) -> (usize, usize) {
        let left = match self.nodes[node].children {
            Some(left) => left.get() as usize,
            None => {
                let left = self.nodes.len();
                self.nodes.push(Node::default());
                self.nodes.push(Node::default());
                // `left >= 1` since the root occupies slot 0, and the arena
                // length is capped at `MAX_ARENA_LEN` by `reserve_headroom`.
                self.nodes[node].children = NonZeroU32::new(left as u32);
                crate::trace!(node, left, "lazyseg children materialized");
                left
            }
        };
        let right = left + 1;

        let pending = std::mem::take(&mut self.nodes[node].pending);
        if pending != 0 {
            self.nodes[left].apply(pending, left_len);
            self.nodes[right].apply(pending, right_len);
            self.pushes += 1;
        }
        (left, right)
    }

    /// `range` must lie within `span`.
    fn update_rec(&mut self, node: usize, span: Span, range: Span, delta: i128) {
        if range.is_empty() {
            return;
        }
        if range == span {
            self.nodes[node].apply(delta, span.len());
            return;
        }

        let (left_span, right_span) = span.split();
        let (left, right) = self.push(node, left_span.len(), right_span.len());
        self.update_rec(left, left_span, range.intersection(left_span), delta);
        self.update_rec(right, right_span, range.intersection(right_span), delta);
        self.nodes[node].aggregate = self.nodes[left]
            .aggregate
            .wrapping_add(self.nodes[right].aggregate);
    }

    /// `range` must lie within `span`.
    fn query_rec(&mut self, node: usize, span: Span, range: Span) -> i128 {
        if range.is_empty() {
            return 0;
        }
        if range == span {
            return self.nodes[node].aggregate;
        }

        let (left_span, right_span) = span.split();
        let (left, right) = self.push(node, left_span.len(), right_span.len());
        let left_sum = self.query_rec(left, left_span, range.intersection(left_span));
        let right_sum = self.query_rec(right, right_span, range.intersection(right_span));
        left_sum.wrapping_add(right_sum)
    }
}
