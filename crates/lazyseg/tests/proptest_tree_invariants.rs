//! Property-based invariant tests for LazySumTree.
//!
//! Each property runs random operation sequences against the tree and, where
//! useful, against a dense `Vec<i128>` of the same domain:
//!
//! 1. Range sums agree with the dense array.
//! 2. A zero delta never changes any query.
//! 3. Two updates over one range equal a single update of the summed delta.
//! 4. Empty ranges read 0 and update nothing.
//! 5. A full-domain update reads back as `delta * len`.
//! 6. Clipping an out-of-domain range equals operating on the intersection.
//! 7. Node count stays within `1 + 4 * depth * ops`.

use lazyseg::{BoundsPolicy, LazySumTree, Span, TreeConfig};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

const N: i64 = 64;

#[derive(Debug, Clone, Copy)]
enum Op {
    Update { lo: i64, hi: i64, delta: i64 },
    Query { lo: i64, hi: i64 },
}

fn range_strategy(n: i64) -> impl Strategy<Value = (i64, i64)> {
    (0..n, 0..n).prop_map(|(a, b)| (a.min(b), a.max(b)))
}

fn op_strategy(n: i64) -> impl Strategy<Value = Op> {
    prop_oneof![
        (range_strategy(n), -1_000i64..=1_000)
            .prop_map(|((lo, hi), delta)| Op::Update { lo, hi, delta }),
        range_strategy(n).prop_map(|(lo, hi)| Op::Query { lo, hi }),
    ]
}

fn dense_sum(dense: &[i128], lo: i64, hi: i64) -> i128 {
    dense[lo as usize..=hi as usize].iter().sum()
}

fn replay(tree: &mut LazySumTree, ops: &[Op]) {
    for op in ops {
        match *op {
            Op::Update { lo, hi, delta } => tree.update(lo, hi, delta),
            Op::Query { lo, hi } => {
                let _ = tree.query(lo, hi);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Range sums agree with a dense array
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn matches_dense_reference(ops in prop::collection::vec(op_strategy(N), 1..120)) {
        let mut tree = LazySumTree::new(0, N - 1);
        let mut dense = vec![0i128; N as usize];

        for (step, op) in ops.iter().enumerate() {
            match *op {
                Op::Update { lo, hi, delta } => {
                    tree.update(lo, hi, delta);
                    for v in &mut dense[lo as usize..=hi as usize] {
                        *v += i128::from(delta);
                    }
                }
                Op::Query { lo, hi } => {
                    prop_assert_eq!(
                        tree.query(lo, hi),
                        dense_sum(&dense, lo, hi),
                        "query [{}, {}] diverged at step {}",
                        lo, hi, step
                    );
                }
            }
        }
        prop_assert_eq!(tree.total(), dense.iter().sum::<i128>());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Zero delta is a no-op
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn zero_delta_changes_nothing(
        ops in prop::collection::vec(op_strategy(N), 0..60),
        (lo, hi) in range_strategy(N),
        probes in prop::collection::vec(range_strategy(N), 1..20),
    ) {
        let mut tree = LazySumTree::new(0, N - 1);
        replay(&mut tree, &ops);
        let before: Vec<i128> = probes.iter().map(|&(a, b)| tree.query(a, b)).collect();

        tree.update(lo, hi, 0);

        let after: Vec<i128> = probes.iter().map(|&(a, b)| tree.query(a, b)).collect();
        prop_assert_eq!(before, after);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Additivity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn split_delta_equals_combined(
        ops in prop::collection::vec(op_strategy(N), 0..40),
        (lo, hi) in range_strategy(N),
        a in -10_000i64..=10_000,
        b in -10_000i64..=10_000,
        probes in prop::collection::vec(range_strategy(N), 1..20),
    ) {
        let mut twice = LazySumTree::new(0, N - 1);
        let mut once = LazySumTree::new(0, N - 1);
        replay(&mut twice, &ops);
        replay(&mut once, &ops);

        twice.update(lo, hi, a);
        twice.update(lo, hi, b);
        once.update(lo, hi, a + b);

        for &(pl, ph) in &probes {
            prop_assert_eq!(twice.query(pl, ph), once.query(pl, ph));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Empty ranges
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn inverted_ranges_are_identity(
        ops in prop::collection::vec(op_strategy(N), 0..40),
        (lo, hi) in range_strategy(N),
        delta in any::<i64>(),
    ) {
        prop_assume!(lo < hi);
        let mut tree = LazySumTree::new(0, N - 1);
        replay(&mut tree, &ops);
        let total = tree.total();
        let nodes = tree.node_count();

        prop_assert_eq!(tree.query(hi, lo), 0);
        tree.update(hi, lo, delta);
        prop_assert_eq!(tree.total(), total);
        prop_assert_eq!(tree.node_count(), nodes);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Full-domain probe
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn full_domain_update_reads_back(
        lo in -1_000_000_000_000i64..1_000_000_000_000,
        width in 0i64..1_000_000_000_000,
        delta in any::<i64>(),
    ) {
        let hi = lo + width;
        let mut tree = LazySumTree::new(lo, hi);
        tree.update(lo, hi, delta);
        let expected = i128::from(delta) * Span::new(lo, hi).len();
        prop_assert_eq!(tree.query(lo, hi), expected);
        prop_assert_eq!(tree.total(), expected);
        prop_assert_eq!(tree.node_count(), 1);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Clipping equals intersecting
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn clipping_matches_intersection(
        lo in -2 * N..2 * N,
        hi in -2 * N..2 * N,
        delta in -100i64..=100,
        probes in prop::collection::vec(range_strategy(N), 1..20),
    ) {
        let domain = Span::new(0, N - 1);
        let clipped = domain.intersection(Span::new(lo, hi));

        let mut loose = LazySumTree::with_config(
            0,
            N - 1,
            TreeConfig::new().with_bounds(BoundsPolicy::Clip),
        );
        let mut exact = LazySumTree::new(0, N - 1);
        loose.update(lo, hi, delta);
        exact.update(clipped.lo, clipped.hi, delta);

        prop_assert_eq!(loose.query(lo, hi), exact.query(clipped.lo, clipped.hi));
        for &(pl, ph) in &probes {
            prop_assert_eq!(loose.query(pl, ph), exact.query(pl, ph));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Memory stays logarithmic per operation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn node_count_is_bounded(
        ops in prop::collection::vec(
            (0i64..1_000_000_000, 0i64..1_000_000_000, -50i64..50, any::<bool>()),
            1..300,
        ),
    ) {
        let mut tree = LazySumTree::new(0, 999_999_999);
        for &(a, b, delta, is_update) in &ops {
            let (lo, hi) = (a.min(b), a.max(b));
            if is_update {
                tree.update(lo, hi, delta);
            } else {
                let _ = tree.query(lo, hi);
            }
        }
        let bound = 1 + ops.len() * 4 * tree.max_depth() as usize;
        prop_assert!(tree.node_count() <= bound, "{} > {}", tree.node_count(), bound);
    }
}
