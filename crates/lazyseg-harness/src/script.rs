#![forbid(unsafe_code)]

//! Operation scripts.
//!
//! A script is plain text, one command per line:
//!
//! ```text
//! # comments and blank lines are ignored
//! domain 0 15
//! update 0 15 5
//! update 3 7 2
//! query 0 2 = 15
//! query 0 15
//! ```
//!
//! `domain LO HI` must appear exactly once, before any operation. A query may
//! carry an expected sum after `=`, which the replay checks in addition to
//! the dense reference.
//!
//! [`random_script`] produces deterministic scripts from a seed; the same seed
//! always yields the same script, and `Display` writes it back in the text
//! format above.

use std::fmt;

use lazyseg::Span;
use serde::Serialize;

// ============================================================================
// Operations
// ============================================================================

/// One scripted tree operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    Update {
        lo: i64,
        hi: i64,
        delta: i64,
    },
    Query {
        lo: i64,
        hi: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        expect: Option<i128>,
    },
}

impl Op {
    #[must_use]
    pub fn span(&self) -> Span {
        match *self {
            Self::Update { lo, hi, .. } | Self::Query { lo, hi, .. } => Span::new(lo, hi),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Update { lo, hi, delta } => write!(f, "update {lo} {hi} {delta}"),
            Self::Query {
                lo,
                hi,
                expect: None,
            } => write!(f, "query {lo} {hi}"),
            Self::Query {
                lo,
                hi,
                expect: Some(expect),
            } => write!(f, "query {lo} {hi} = {expect}"),
        }
    }
}

/// A domain plus the operations to run over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub domain: Span,
    pub ops: Vec<Op>,
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "domain {} {}", self.domain.lo, self.domain.hi)?;
        for op in &self.ops {
            writeln!(f, "{op}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// What went wrong on a script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptErrorKind {
    UnknownCommand(String),
    WrongArity {
        command: &'static str,
        found: usize,
    },
    BadNumber(String),
    MissingDomain,
    DuplicateDomain,
    InvertedDomain { lo: i64, hi: i64 },
}

/// Parse failure with its 1-based line number. Line 0 means end of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    pub line: usize,
    pub kind: ScriptErrorKind,
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "line {}: ", self.line)?;
        }
        match &self.kind {
            ScriptErrorKind::UnknownCommand(word) => write!(f, "unknown command {word:?}"),
            ScriptErrorKind::WrongArity { command, found } => {
                write!(f, "wrong number of arguments to {command} ({found})")
            }
            ScriptErrorKind::BadNumber(token) => write!(f, "not an integer: {token:?}"),
            ScriptErrorKind::MissingDomain => write!(f, "missing `domain LO HI` header"),
            ScriptErrorKind::DuplicateDomain => write!(f, "domain declared twice"),
            ScriptErrorKind::InvertedDomain { lo, hi } => {
                write!(f, "inverted domain: {lo} > {hi}")
            }
        }
    }
}

impl std::error::Error for ScriptError {}

fn number<T: std::str::FromStr>(token: &str, line: usize) -> Result<T, ScriptError> {
    token.parse::<T>().map_err(|_| ScriptError {
        line,
        kind: ScriptErrorKind::BadNumber(token.to_string()),
    })
}

/// Parse the text format described in the module docs.
pub fn parse_script(text: &str) -> Result<Script, ScriptError> {
    let mut domain: Option<Span> = None;
    let mut ops = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        let words: Vec<&str> = content.split_whitespace().collect();
        let arity = |command: &'static str| ScriptError {
            line,
            kind: ScriptErrorKind::WrongArity {
                command,
                found: words.len() - 1,
            },
        };

        match words[0] {
            "domain" => {
                if words.len() != 3 {
                    return Err(arity("domain"));
                }
                if domain.is_some() || !ops.is_empty() {
                    return Err(ScriptError {
                        line,
                        kind: ScriptErrorKind::DuplicateDomain,
                    });
                }
                let lo = number::<i64>(words[1], line)?;
                let hi = number::<i64>(words[2], line)?;
                if lo > hi {
                    return Err(ScriptError {
                        line,
                        kind: ScriptErrorKind::InvertedDomain { lo, hi },
                    });
                }
                domain = Some(Span::new(lo, hi));
            }
            "update" => {
                if words.len() != 4 {
                    return Err(arity("update"));
                }
                if domain.is_none() {
                    return Err(ScriptError {
                        line,
                        kind: ScriptErrorKind::MissingDomain,
                    });
                }
                ops.push(Op::Update {
                    lo: number(words[1], line)?,
                    hi: number(words[2], line)?,
                    delta: number(words[3], line)?,
                });
            }
            "query" => {
                let expect = match words.len() {
                    3 => None,
                    5 if words[3] == "=" => Some(number::<i128>(words[4], line)?),
                    _ => return Err(arity("query")),
                };
                if domain.is_none() {
                    return Err(ScriptError {
                        line,
                        kind: ScriptErrorKind::MissingDomain,
                    });
                }
                ops.push(Op::Query {
                    lo: number(words[1], line)?,
                    hi: number(words[2], line)?,
                    expect,
                });
            }
            other => {
                return Err(ScriptError {
                    line,
                    kind: ScriptErrorKind::UnknownCommand(other.to_string()),
                });
            }
        }
    }

    let Some(domain) = domain else {
        return Err(ScriptError {
            line: 0,
            kind: ScriptErrorKind::MissingDomain,
        });
    };
    Ok(Script { domain, ops })
}

// ============================================================================
// Seeded generation
// ============================================================================

/// Simple LCG PRNG for deterministic generation.
#[derive(Debug, Clone)]
struct SeededRng {
    state: u64,
}

impl SeededRng {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        // LCG parameters from Numerical Recipes
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state >> 11
    }

    /// Uniform-ish value in `[lo, hi]`.
    fn next_in(&mut self, lo: i64, hi: i64) -> i64 {
        let width = (hi as i128 - lo as i128 + 1) as u128;
        (lo as i128 + (self.next_u64() as u128 % width) as i128) as i64
    }

    fn chance(&mut self, percent: u64) -> bool {
        self.next_u64() % 100 < percent
    }
}

/// Generate `count` operations over `domain`.
///
/// About 10% of ranges stick out of the domain and 5% are inverted, so the
/// clipping and empty-range paths get exercised alongside ordinary ones.
#[must_use]
pub fn random_script(seed: u64, domain: Span, count: usize) -> Script {
    let mut rng = SeededRng::new(seed);
    let reach = (domain.len() / 4).clamp(1, i64::MAX as i128 / 4) as i64;
    let (outer_lo, outer_hi) = (
        domain.lo.saturating_sub(reach),
        domain.hi.saturating_add(reach),
    );

    let ops = (0..count)
        .map(|_| {
            let (mut lo, mut hi) = if rng.chance(10) {
                (
                    rng.next_in(outer_lo, outer_hi),
                    rng.next_in(outer_lo, outer_hi),
                )
            } else {
                (
                    rng.next_in(domain.lo, domain.hi),
                    rng.next_in(domain.lo, domain.hi),
                )
            };
            if lo > hi {
                std::mem::swap(&mut lo, &mut hi);
            }
            if rng.chance(5) {
                std::mem::swap(&mut lo, &mut hi);
            }

            if rng.chance(50) {
                Op::Update {
                    lo,
                    hi,
                    delta: rng.next_in(-1_000, 1_000),
                }
            } else {
                Op::Query {
                    lo,
                    hi,
                    expect: None,
                }
            }
        })
        .collect();

    Script { domain, ops }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ─── Parsing ──────────────────────────────────────────────────

    #[test]
    fn parses_commands_and_comments() {
        let script = parse_script(
            "# header\n\
             domain 0 15\n\
             \n\
             update 0 15 5   # everything\n\
             update 3 7 -2\n\
             query 0 2 = 15\n\
             query 3 7\n",
        )
        .unwrap();
        assert_eq!(script.domain, Span::new(0, 15));
        assert_eq!(
            script.ops,
            vec![
                Op::Update {
                    lo: 0,
                    hi: 15,
                    delta: 5
                },
                Op::Update {
                    lo: 3,
                    hi: 7,
                    delta: -2
                },
                Op::Query {
                    lo: 0,
                    hi: 2,
                    expect: Some(15)
                },
                Op::Query {
                    lo: 3,
                    hi: 7,
                    expect: None
                },
            ]
        );
    }

    #[test]
    fn reports_line_numbers() {
        let err = parse_script("domain 0 9\nupdate 1 2\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(
            err.kind,
            ScriptErrorKind::WrongArity {
                command: "update",
                found: 2
            }
        );

        let err = parse_script("domain 0 9\nquery a 2\n").unwrap_err();
        assert_eq!(err.kind, ScriptErrorKind::BadNumber("a".into()));
        assert_eq!(err.to_string(), "line 2: not an integer: \"a\"");

        let err = parse_script("domain 0 9\nscan 1 2\n").unwrap_err();
        assert_eq!(err.kind, ScriptErrorKind::UnknownCommand("scan".into()));
    }

    #[test]
    fn domain_rules() {
        assert_eq!(
            parse_script("update 0 1 1\n").unwrap_err().kind,
            ScriptErrorKind::MissingDomain
        );
        assert_eq!(parse_script("# nothing\n").unwrap_err().line, 0);
        assert_eq!(
            parse_script("domain 0 1\ndomain 0 2\n").unwrap_err().kind,
            ScriptErrorKind::DuplicateDomain
        );
        assert_eq!(
            parse_script("domain 5 1\n").unwrap_err().kind,
            ScriptErrorKind::InvertedDomain { lo: 5, hi: 1 }
        );
    }

    // ─── Display / generation ─────────────────────────────────────

    #[test]
    fn display_parses_back() {
        let script = random_script(7, Span::new(-50, 200), 64);
        let text = script.to_string();
        assert!(text.starts_with("domain -50 200\n"));
        assert_eq!(parse_script(&text).unwrap(), script);
    }

    #[test]
    fn random_script_is_deterministic() {
        let a = random_script(42, Span::new(0, 1023), 200);
        let b = random_script(42, Span::new(0, 1023), 200);
        let c = random_script(43, Span::new(0, 1023), 200);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.ops.len(), 200);
    }

    #[test]
    fn random_script_mixes_range_shapes() {
        let domain = Span::new(0, 255);
        let script = random_script(1, domain, 2_000);
        let outside = script
            .ops
            .iter()
            .filter(|op| !op.span().is_empty() && !domain.covers(op.span()))
            .count();
        let inverted = script.ops.iter().filter(|op| op.span().is_empty()).count();
        assert!(outside > 0);
        assert!(inverted > 0);
    }

    #[test]
    fn random_script_survives_extreme_domain() {
        let domain = Span::new(i64::MIN, i64::MAX);
        let script = random_script(9, domain, 100);
        assert!(script.ops.iter().all(|op| {
            let span = op.span();
            span.is_empty() || domain.covers(span)
        }));
    }
}
