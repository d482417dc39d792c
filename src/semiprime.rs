//! Probable-primality and balanced-semiprime test targets.
//!
//! Reporting and test tooling only: the driver annotates certified factors
//! with a Miller–Rabin verdict, and the test suites generate balanced
//! semiprimes with known factors. The search engine itself never consults
//! this module; certification is exact divisibility and nothing else.

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::One;
use rand::Rng;

/// A balanced semiprime with known factors, for verification.
#[derive(Debug, Clone)]
pub struct SemiprimeTarget {
    pub n: BigUint,
    pub p: BigUint,
    pub q: BigUint,
}

impl SemiprimeTarget {
    /// Whether a reported pair matches this target.
    pub fn matches(&self, p: &BigUint, q: &BigUint) -> bool {
        (*p == self.p && *q == self.q) || (*p == self.q && *q == self.p)
    }
}

/// Miller–Rabin probable-prime test with `rounds` random witnesses.
pub fn is_probable_prime(n: &BigUint, rounds: u32) -> bool {
    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let three = BigUint::from(3u32);

    if *n < two {
        return false;
    }
    if *n == two || *n == three {
        return true;
    }
    if n.is_even() {
        return false;
    }

    // n − 1 = 2^r · d with d odd
    let n_minus_1 = n - &one;
    let mut d = n_minus_1.clone();
    let mut r = 0u32;
    while d.is_even() {
        d >>= 1u32;
        r += 1;
    }

    let mut rng = rand::thread_rng();
    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_1);
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_1 {
            continue 'witness;
        }
        for _ in 0..r.saturating_sub(1) {
            x = x.modpow(&two, n);
            if x == n_minus_1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Random probable prime with exactly `bits` bits.
pub fn random_prime(bits: u64, rng: &mut impl Rng) -> BigUint {
    assert!(bits >= 2, "a prime needs at least 2 bits");
    loop {
        let mut candidate = rng.gen_biguint(bits);
        candidate.set_bit(bits - 1, true);
        candidate.set_bit(0, true);
        if is_probable_prime(&candidate, 20) {
            return candidate;
        }
    }
}

/// Random balanced semiprime of roughly `bits` bits: two random primes of
/// `bits/2` bits each.
pub fn balanced_target(bits: u64, rng: &mut impl Rng) -> SemiprimeTarget {
    let half = (bits / 2).max(2);
    let mut p = random_prime(half, rng);
    let mut q = random_prime(half, rng);
    if p > q {
        std::mem::swap(&mut p, &mut q);
    }
    let n = &p * &q;
    SemiprimeTarget { n, p, q }
}
