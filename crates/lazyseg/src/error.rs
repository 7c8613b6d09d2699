#![forbid(unsafe_code)]

//! Errors reported by the fallible tree operations.

use std::fmt;

use crate::span::Span;

/// Failure of a tree construction or operation.
///
/// Every operation checks for these before touching any node, so a returned
/// error always leaves the tree exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The domain passed at construction has `lo > hi`.
    InvertedDomain { lo: i64, hi: i64 },
    /// The range reaches outside the domain and the bounds policy rejects it.
    OutOfDomain { requested: Span, domain: Span },
    /// The operation could need more nodes than the configured cap.
    NodeLimitExceeded {
        limit: usize,
        live: usize,
        required: usize,
    },
    /// The node arena could not grow.
    AllocationFailed { requested: usize },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvertedDomain { lo, hi } => {
                write!(f, "inverted domain: lo {lo} > hi {hi}")
            }
            Self::OutOfDomain { requested, domain } => {
                write!(f, "range {requested} is outside domain {domain}")
            }
            Self::NodeLimitExceeded {
                limit,
                live,
                required,
            } => write!(
                f,
                "node limit {limit} exceeded: {live} live, operation may need {required} more"
            ),
            Self::AllocationFailed { requested } => {
                write!(f, "failed to reserve {requested} tree nodes")
            }
        }
    }
}

impl std::error::Error for TreeError {}

impl TreeError {
    /// Whether the error comes from running out of node storage rather than
    /// from the caller's arguments.
    #[must_use]
    pub const fn is_resource_exhaustion(&self) -> bool {
        matches!(
            self,
            Self::NodeLimitExceeded { .. } | Self::AllocationFailed { .. }
        )
    }
}
