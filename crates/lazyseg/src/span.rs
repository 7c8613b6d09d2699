#![forbid(unsafe_code)]

//! Closed integer intervals.
//!
//! A [`Span`] is the pair `[lo, hi]` with both ends included. Any span with
//! `lo > hi` is empty; empty spans compare by their raw bounds but behave
//! identically in every set operation.
//!
//! Lengths are reported as `i128` so that `[i64::MIN, i64::MAX]` (2^64
//! positions) is representable.

use std::fmt;

/// Closed interval `[lo, hi]` over `i64` coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub lo: i64,
    pub hi: i64,
}

impl Span {
    /// Canonical empty span.
    pub const EMPTY: Self = Self { lo: 0, hi: -1 };

    /// Create a span. `lo > hi` yields an empty span.
    #[must_use]
    pub const fn new(lo: i64, hi: i64) -> Self {
        Self { lo, hi }
    }

    /// Span covering exactly one position.
    #[must_use]
    pub const fn unit(at: i64) -> Self {
        Self { lo: at, hi: at }
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.lo > self.hi
    }

    /// Number of positions covered. Zero for empty spans.
    #[inline]
    #[must_use]
    pub const fn len(self) -> i128 {
        if self.is_empty() {
            0
        } else {
            self.hi as i128 - self.lo as i128 + 1
        }
    }

    #[inline]
    #[must_use]
    pub const fn contains(self, at: i64) -> bool {
        self.lo <= at && at <= self.hi
    }

    /// Whether every position of `inner` lies in `self`.
    ///
    /// The empty span is covered by everything.
    #[inline]
    #[must_use]
    pub const fn covers(self, inner: Span) -> bool {
        inner.is_empty() || (self.lo <= inner.lo && inner.hi <= self.hi)
    }

    /// Positions common to both spans. May be empty.
    #[must_use]
    pub fn intersection(self, other: Span) -> Span {
        let out = Span::new(self.lo.max(other.lo), self.hi.min(other.hi));
        if out.is_empty() { Span::EMPTY } else { out }
    }

    /// Last position of the left half, `lo + (hi - lo) / 2`.
    ///
    /// Computed in `i128`; the result always lies within `[lo, hi]`, so the
    /// narrowing cast is lossless.
    #[inline]
    #[must_use]
    pub const fn midpoint(self) -> i64 {
        (self.lo as i128 + (self.hi as i128 - self.lo as i128) / 2) as i64
    }

    /// Split into `[lo, mid]` and `[mid + 1, hi]`.
    ///
    /// Only meaningful for spans of two or more positions; a unit span
    /// yields itself and an empty right half.
    #[must_use]
    pub const fn split(self) -> (Span, Span) {
        let mid = self.midpoint();
        if mid == self.hi {
            return (self, Span::EMPTY);
        }
        (Span::new(self.lo, mid), Span::new(mid + 1, self.hi))
    }

    /// Number of halvings needed to reach a unit span, `ceil(log2(len))`.
    #[must_use]
    pub const fn depth(self) -> u32 {
        let len = self.len();
        if len <= 1 {
            return 0;
        }
        128 - ((len - 1) as u128).leading_zeros()
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "[]")
        } else {
            write!(f, "[{}, {}]", self.lo, self.hi)
        }
    }
}

impl From<(i64, i64)> for Span {
    fn from((lo, hi): (i64, i64)) -> Self {
        Self::new(lo, hi)
    }
}
