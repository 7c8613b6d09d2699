#![forbid(unsafe_code)]

//! Differential test harness for `lazyseg`.
//!
//! - **Reference model**: [`DenseModel`] keeps one value per position and
//!   answers by brute force.
//! - **Scripts**: a small line-based format for operation sequences, parsed
//!   by [`parse_script`] or generated deterministically by [`random_script`].
//! - **Replay**: [`replay`] drives the tree and the reference in lockstep and
//!   reports the first divergence.
//!
//! # Quick Start
//!
//! ```
//! use lazyseg::TreeConfig;
//! use lazyseg_harness::{parse_script, replay};
//!
//! let script = parse_script("domain 0 15\nupdate 0 15 5\nquery 0 2 = 15\n").unwrap();
//! let report = replay(&script, TreeConfig::default()).unwrap();
//! assert!(report.passed());
//! ```

pub mod reference;
pub mod replay;
pub mod script;

pub use reference::DenseModel;
pub use replay::{Divergence, Oracle, ReplayError, ReplayReport, replay};
pub use script::{Op, Script, ScriptError, ScriptErrorKind, parse_script, random_script};
