//! Arbitrary-precision context and transcendental primitives.
//!
//! Every component of a factorization call shares a single [`Ctx`]. The
//! decimal digit count follows the adaptive rule
//! `max(configured, 4·bits(N) + 200)`: the snap computes
//! `p̂ = exp((ln N + Δφ)/2)`, so an error `ε` in `ln N` becomes an absolute
//! error of roughly `p̂·ε/2` in `p̂`, and sub-integer accuracy at 127 bits
//! (`p̂ ≈ 10^19`) needs `ε` well below `10^(−19)`. The linear rule leaves
//! generous headroom for the kernel's trigonometry on top of that.
//!
//! All primitives are correctly rounded by MPFR in round-to-nearest
//! (ties to even), so each carries a relative error bounded by one ulp at
//! the context precision.

use std::cmp::Ordering;

use num_bigint::BigUint;
use rug::float::Constant;
use rug::integer::Order;
use rug::{Float, Integer};
use thiserror::Error;

/// Extra mantissa bits on top of the decimal-digit request, absorbing the
/// digits→bits conversion round-off.
const GUARD_BITS: u32 = 16;

/// A transcendental primitive was handed an argument outside its domain.
///
/// These are local, recoverable degeneracies: the caller skips the affected
/// sample, never the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("logarithm of a non-positive value")]
    NonPositiveLog,
    #[error("square root of a negative value")]
    NegativeSqrt,
}

/// Effective decimal digit count for a given configuration floor and input
/// bit length: `max(configured, 4·bits + 200)`.
pub fn effective_digits(configured: u32, n_bits: u64) -> u32 {
    let adaptive = n_bits.saturating_mul(4).saturating_add(200);
    configured.max(adaptive.min(u64::from(u32::MAX)) as u32)
}

/// Immutable precision context for one factorization call.
///
/// Owns the digit policy and the cached `π`/`2π` constants that the kernel
/// consumes on every sample. The context never changes precision once
/// built.
#[derive(Debug, Clone)]
pub struct Ctx {
    digits: u32,
    prec: u32,
    pi: Float,
    two_pi: Float,
}

impl Ctx {
    /// Build a context for an input of `n_bits` bits with a configured
    /// digit floor.
    pub fn new(configured_digits: u32, n_bits: u64) -> Ctx {
        let digits = effective_digits(configured_digits, n_bits);
        let prec = ((f64::from(digits)) * std::f64::consts::LOG2_10).ceil() as u32 + GUARD_BITS;
        let pi = Float::with_val(prec, Constant::Pi);
        let two_pi = Float::with_val(prec, &pi * 2i32);
        Ctx {
            digits,
            prec,
            pi,
            two_pi,
        }
    }

    /// Decimal digit count of this context.
    pub fn digits(&self) -> u32 {
        self.digits
    }

    /// Mantissa precision in bits.
    pub fn prec(&self) -> u32 {
        self.prec
    }

    /// `π` at context precision.
    pub fn pi(&self) -> Float {
        self.pi.clone()
    }

    /// Borrow the cached `2π` (hot path).
    pub fn two_pi(&self) -> &Float {
        &self.two_pi
    }

    /// Lift an `f64` into the context.
    pub fn float(&self, value: f64) -> Float {
        Float::with_val(self.prec, value)
    }

    /// Exact conversion of a nonnegative big integer into the context.
    pub fn float_from_biguint(&self, n: &BigUint) -> Float {
        let int = Integer::from_digits(&n.to_bytes_be(), Order::Msf);
        Float::with_val(self.prec, &int)
    }

    /// Convert an integral, nonnegative float back to a big integer.
    ///
    /// Returns `None` for non-finite or negative values. The fractional
    /// part, if any, is rounded away by MPFR's nearest-integer conversion;
    /// callers are expected to have floored already.
    pub fn biguint_from_float(&self, x: &Float) -> Option<BigUint> {
        let int = x.to_integer()?;
        if int.cmp0() == Ordering::Less {
            return None;
        }
        Some(BigUint::from_bytes_be(&int.to_digits::<u8>(Order::Msf)))
    }

    /// Natural logarithm. Fails on non-positive arguments.
    pub fn ln(&self, x: &Float) -> Result<Float, MathError> {
        if x.cmp0() != Some(Ordering::Greater) {
            return Err(MathError::NonPositiveLog);
        }
        Ok(Float::with_val(self.prec, x.ln_ref()))
    }

    /// Exponential.
    pub fn exp(&self, x: &Float) -> Float {
        Float::with_val(self.prec, x.exp_ref())
    }

    /// Sine.
    pub fn sin(&self, x: &Float) -> Float {
        Float::with_val(self.prec, x.sin_ref())
    }

    /// Cosine.
    pub fn cos(&self, x: &Float) -> Float {
        Float::with_val(self.prec, x.cos_ref())
    }

    /// Square root. Fails on negative arguments.
    pub fn sqrt(&self, x: &Float) -> Result<Float, MathError> {
        if x.cmp0() == Some(Ordering::Less) {
            return Err(MathError::NegativeSqrt);
        }
        Ok(Float::with_val(self.prec, x.sqrt_ref()))
    }

    /// Euler's number at context precision.
    pub fn e(&self) -> Float {
        Float::with_val(self.prec, 1).exp()
    }

    /// The golden ratio `(√5 + 1)/2`.
    pub fn golden_ratio(&self) -> Float {
        let mut phi = Float::with_val(self.prec, 5).sqrt();
        phi += 1u32;
        phi /= 2u32;
        phi
    }

    /// The golden-ratio reciprocal `(√5 − 1)/2`, the additive-recurrence
    /// step of the sampler.
    pub fn phi_inv(&self) -> Float {
        let mut phi_inv = Float::with_val(self.prec, 5).sqrt();
        phi_inv -= 1u32;
        phi_inv /= 2u32;
        phi_inv
    }

    /// `10^exp` at context precision; negative exponents give the epsilon
    /// ladders used by the kernel guards and the Newton stop criterion.
    pub fn pow10(&self, exp: i32) -> Float {
        Float::with_val(self.prec, exp).exp10()
    }
}
