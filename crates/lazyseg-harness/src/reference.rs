#![forbid(unsafe_code)]

//! Dense reference model.
//!
//! One `i128` per position, updated and summed by brute force. Slow on
//! purpose: it is the oracle the tree is checked against.

use lazyseg::Span;

/// Largest domain the dense model will materialize.
pub const MAX_DENSE_LEN: i128 = 1 << 24;

/// Brute-force range-add / range-sum over a small domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseModel {
    domain: Span,
    values: Vec<i128>,
}

impl DenseModel {
    /// Zeroed model over `domain`, or `None` if the domain is empty or longer
    /// than [`MAX_DENSE_LEN`].
    #[must_use]
    pub fn new(domain: Span) -> Option<Self> {
        let len = domain.len();
        if len == 0 || len > MAX_DENSE_LEN {
            return None;
        }
        Some(Self {
            domain,
            values: vec![0; len as usize],
        })
    }

    #[must_use]
    pub fn domain(&self) -> Span {
        self.domain
    }

    /// Clip `[lo, hi]` to the domain and translate it to vector indices.
    fn indices(&self, lo: i64, hi: i64) -> Option<(usize, usize)> {
        let clipped = self.domain.intersection(Span::new(lo, hi));
        if clipped.is_empty() {
            return None;
        }
        let offset = |at: i64| (at as i128 - self.domain.lo as i128) as usize;
        Some((offset(clipped.lo), offset(clipped.hi)))
    }

    pub fn update(&mut self, lo: i64, hi: i64, delta: i64) {
        if let Some((start, end)) = self.indices(lo, hi) {
            for value in &mut self.values[start..=end] {
                *value = value.wrapping_add(i128::from(delta));
            }
        }
    }

    #[must_use]
    pub fn query(&self, lo: i64, hi: i64) -> i128 {
        match self.indices(lo, hi) {
            Some((start, end)) => self.values[start..=end]
                .iter()
                .fold(0i128, |acc, v| acc.wrapping_add(*v)),
            None => 0,
        }
    }

    #[must_use]
    pub fn total(&self) -> i128 {
        self.query(self.domain.lo, self.domain.hi)
    }
}
