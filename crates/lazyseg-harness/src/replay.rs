#![forbid(unsafe_code)]

//! Differential replay.
//!
//! Runs a [`Script`] against a [`LazySumTree`] and a [`DenseModel`] in
//! lockstep and stops at the first query where they disagree, or where the
//! tree disagrees with an expectation written in the script.
//!
//! Ranges the tree rejects under [`BoundsPolicy::Reject`] are skipped on both
//! sides and counted. Resource exhaustion aborts the replay with an error.
//!
//! [`BoundsPolicy::Reject`]: lazyseg::BoundsPolicy::Reject

use std::fmt;

use lazyseg::{LazySumTree, TreeConfig, TreeError, TreeStats};
use serde::Serialize;

use crate::reference::DenseModel;
use crate::script::{Op, Script};

/// Which oracle the tree disagreed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Oracle {
    Reference,
    Expectation,
}

/// First disagreement found during a replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Divergence {
    /// Index of the offending op in the script.
    pub index: usize,
    pub op: Op,
    pub oracle: Oracle,
    pub expected: i128,
    pub actual: i128,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "op #{} `{}`: expected {} ({:?}), tree returned {}",
            self.index, self.op, self.expected, self.oracle, self.actual
        )
    }
}

/// Outcome of a replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    /// Operations executed, including the divergent one.
    pub ops: usize,
    pub updates: usize,
    pub queries: usize,
    /// Operations the tree refused under the reject policy.
    pub rejected: usize,
    pub stats: TreeStats,
    pub divergence: Option<Divergence>,
}

impl ReplayReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.divergence.is_none()
    }

    /// Single-line JSON summary.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| format!(r#"{{"error":"{err}"}}"#))
    }
}

/// Why a replay could not run to a verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// The script's domain is too large for the dense reference.
    DomainTooLarge { len: i128 },
    /// Construction failed or an operation ran out of node storage.
    Tree { index: Option<usize>, error: TreeError },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DomainTooLarge { len } => {
                write!(f, "domain of {len} positions is too large for the dense reference")
            }
            Self::Tree {
                index: Some(index),
                error,
            } => write!(f, "op #{index}: {error}"),
            Self::Tree { index: None, error } => write!(f, "tree construction: {error}"),
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tree { error, .. } => Some(error),
            Self::DomainTooLarge { .. } => None,
        }
    }
}

/// Replay `script` with a tree built from `config`.
pub fn replay(script: &Script, config: TreeConfig) -> Result<ReplayReport, ReplayError> {
    let domain = script.domain;
    let mut model = DenseModel::new(domain).ok_or(ReplayError::DomainTooLarge { len: domain.len() })?;
    let mut tree = LazySumTree::try_with_config(domain.lo, domain.hi, config)
        .map_err(|error| ReplayError::Tree { index: None, error })?;

    tracing::info!(domain = %domain, ops = script.ops.len(), "replay started");

    let mut report = ReplayReport {
        ops: 0,
        updates: 0,
        queries: 0,
        rejected: 0,
        stats: TreeStats::default(),
        divergence: None,
    };

    for (index, op) in script.ops.iter().enumerate() {
        report.ops += 1;
        let outcome = match *op {
            Op::Update { lo, hi, delta } => {
                report.updates += 1;
                tree.try_update(lo, hi, delta).map(|()| {
                    model.update(lo, hi, delta);
                    None
                })
            }
            Op::Query { lo, hi, expect } => {
                report.queries += 1;
                tree.try_query(lo, hi).map(|actual| {
                    let reference = model.query(lo, hi);
                    if actual != reference {
                        Some((Oracle::Reference, reference, actual))
                    } else {
                        expect
                            .filter(|&expected| expected != actual)
                            .map(|expected| (Oracle::Expectation, expected, actual))
                    }
                })
            }
        };

        match outcome {
            Ok(None) => {}
            Ok(Some((oracle, expected, actual))) => {
                let divergence = Divergence {
                    index,
                    op: *op,
                    oracle,
                    expected,
                    actual,
                };
                tracing::warn!(%divergence, "replay diverged");
                report.divergence = Some(divergence);
                break;
            }
            Err(TreeError::OutOfDomain { .. }) => report.rejected += 1,
            Err(error) => {
                return Err(ReplayError::Tree {
                    index: Some(index),
                    error,
                });
            }
        }
    }

    report.stats = tree.stats();
    tracing::info!(
        ops = report.ops,
        nodes = report.stats.nodes,
        passed = report.passed(),
        "replay finished"
    );
    Ok(report)
}
