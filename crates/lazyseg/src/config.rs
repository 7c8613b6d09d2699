#![forbid(unsafe_code)]

//! Tree configuration.
//!
//! # Environment
//!
//! [`TreeConfig::from_env`] reads:
//!
//! | Variable | Values | Default |
//! |----------|--------|---------|
//! | `LAZYSEG_BOUNDS` | `clip`, `reject` | `clip` |
//! | `LAZYSEG_MAX_NODES` | positive integer | unlimited |
//!
//! Unparseable values are ignored and the default is kept.

use std::fmt;
use std::str::FromStr;

/// Environment variable selecting the [`BoundsPolicy`].
pub const ENV_BOUNDS: &str = "LAZYSEG_BOUNDS";
/// Environment variable setting [`TreeConfig::max_nodes`].
pub const ENV_MAX_NODES: &str = "LAZYSEG_MAX_NODES";

/// What to do with an operation range that reaches outside the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BoundsPolicy {
    /// Intersect the range with the domain and carry on.
    #[default]
    Clip,
    /// Fail with [`TreeError::OutOfDomain`](crate::TreeError::OutOfDomain).
    Reject,
}

impl BoundsPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clip => "clip",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for BoundsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised [`BoundsPolicy`] name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBoundsPolicyError(String);

impl fmt::Display for ParseBoundsPolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown bounds policy {:?} (expected clip or reject)", self.0)
    }
}

impl std::error::Error for ParseBoundsPolicyError {}

impl FromStr for BoundsPolicy {
    type Err = ParseBoundsPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("clip") {
            Ok(Self::Clip)
        } else if trimmed.eq_ignore_ascii_case("reject") {
            Ok(Self::Reject)
        } else {
            Err(ParseBoundsPolicyError(s.to_string()))
        }
    }
}

/// Construction-time settings for a [`LazySumTree`](crate::LazySumTree).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeConfig {
    /// Out-of-domain handling.
    #[cfg_attr(feature = "serde", serde(default))]
    pub bounds: BoundsPolicy,
    /// Cap on live nodes, root included. `None` means unlimited.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_nodes: Option<usize>,
    /// Nodes to reserve up front.
    #[cfg_attr(feature = "serde", serde(default))]
    pub initial_capacity: usize,
}

impl TreeConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: BoundsPolicy) -> Self {
        self.bounds = bounds;
        self
    }

    #[must_use]
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    #[must_use]
    pub fn with_initial_capacity(mut self, nodes: usize) -> Self {
        self.initial_capacity = nodes;
        self
    }

    /// Build a config from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    ///
    /// Same rules as [`from_env`](Self::from_env); lets callers feed a map
    /// instead of the process environment.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let bounds = lookup(ENV_BOUNDS)
            .and_then(|value| value.parse::<BoundsPolicy>().ok())
            .unwrap_or_default();
        let max_nodes = lookup(ENV_MAX_NODES)
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|&n| n > 0);
        Self {
            bounds,
            max_nodes,
            initial_capacity: 0,
        }
    }
}
