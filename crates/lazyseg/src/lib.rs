#![forbid(unsafe_code)]

//! Sparse range-add / range-sum tree over huge integer domains.
//!
//! [`LazySumTree`] covers a fixed domain `[lo, hi]` and materializes nodes only
//! where updates and queries actually split the domain, so a domain of 10^9
//! positions costs memory proportional to the number of operations.
//!
//! Enable the `tracing` feature for structured logs of construction,
//! rejections and node materialization.

pub mod config;
pub mod error;
pub mod logging;
pub mod span;
pub mod stats;
pub mod tree;

pub use config::{BoundsPolicy, TreeConfig};
pub use error::TreeError;
pub use span::Span;
pub use stats::TreeStats;
pub use tree::LazySumTree;

// Re-export tracing macros at crate root so `crate::debug!` resolves the same
// way with and without the feature.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace, warn};
