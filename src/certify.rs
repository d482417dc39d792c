//! Exact certification of snapped candidates.
//!
//! The only arithmetic predicate outside the geometry: `N mod d == 0`,
//! applied to the snapped center and its two immediate neighbors. No
//! widening beyond those three integers, ever. When the neighborhood
//! misses, the sample is simply not a factor.

use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Test `{p₀, p₀−1, p₀+1}` against `N` and return the ordered factor pair
/// of the first divisor found.
///
/// Candidates at or below 1, or at or above `N`, are skipped. The ±1
/// neighbors absorb the rounding error inherent in snapping a logarithm
/// through an exponential.
pub fn certify_neighborhood(n: &BigUint, center: &BigUint) -> Option<(BigUint, BigUint)> {
    let one = BigUint::one();
    let mut candidates: Vec<BigUint> = Vec::with_capacity(3);
    candidates.push(center.clone());
    if *center >= one {
        candidates.push(center - 1u32);
    }
    candidates.push(center + 1u32);

    for d in candidates {
        if d <= one || d >= *n {
            continue;
        }
        if (n % &d).is_zero() {
            let q = n / &d;
            return Some(ordered(d, q));
        }
    }
    None
}

/// Collapse a divisor pair into canonical order, smallest first.
fn ordered(a: BigUint, b: BigUint) -> (BigUint, BigUint) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn certifies_center_hit() {
        // 8051 = 83 · 97
        let pair = certify_neighborhood(&big(8051), &big(83));
        assert_eq!(pair, Some((big(83), big(97))));
    }

    #[test]
    fn certifies_both_neighbors() {
        let n = big(8051);
        assert_eq!(certify_neighborhood(&n, &big(84)), Some((big(83), big(97))));
        assert_eq!(certify_neighborhood(&n, &big(82)), Some((big(83), big(97))));
        assert_eq!(certify_neighborhood(&n, &big(96)), Some((big(83), big(97))));
    }

    #[test]
    fn orders_pair_smallest_first() {
        // snapping near the larger factor still reports (p, q) with p ≤ q
        let pair = certify_neighborhood(&big(8051), &big(97)).unwrap();
        assert!(pair.0 <= pair.1);
        assert_eq!(pair, (big(83), big(97)));
    }

    #[test]
    fn misses_outside_neighborhood() {
        assert_eq!(certify_neighborhood(&big(8051), &big(80)), None);
        assert_eq!(certify_neighborhood(&big(8051), &big(100)), None);
    }

    #[test]
    fn skips_trivial_candidates() {
        // centers 0, 1, 2 never certify d ≤ 1; N and beyond never certify d ≥ N
        assert_eq!(certify_neighborhood(&big(8051), &big(0)), None);
        assert_eq!(certify_neighborhood(&big(15), &big(1)), None);
        assert_eq!(certify_neighborhood(&big(15), &big(15)), None);
        // center 2 may legitimately certify d = 3 for N = 15
        assert_eq!(certify_neighborhood(&big(15), &big(2)), Some((big(3), big(5))));
    }
}
