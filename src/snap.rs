//! Phase-corrected integer snap.
//!
//! Maps an accepted principal angle to an integer candidate:
//! `Δφ = principal·w`, `p̂ = exp((ln N + Δφ)/2)`, `p₀ = ⌊p̂ + ½⌋`. The
//! weight `w` is the kernel's snap weight (σ for Gaussian, `1/(2J+1)` for
//! Dirichlet). An optional short Newton iteration polishes `p̂` against the
//! logarithmic residual `ln p − target` before rounding.

use std::cmp::Ordering;

use num_bigint::BigUint;
use rug::Float;

use crate::precision::Ctx;

/// Snap settings frozen for one call.
pub struct SnapKernel {
    weight: Float,
    newton_iterations: u32,
    /// Newton stop criterion `10^(−P/2)` on the logarithmic residual.
    tol: Float,
}

impl SnapKernel {
    pub fn new(ctx: &Ctx, weight: Float, newton_iterations: u32) -> SnapKernel {
        let tol = ctx.pow10(-((ctx.digits() / 2) as i32));
        SnapKernel {
            weight,
            newton_iterations,
            tol,
        }
    }

    /// Integer candidate for an accepted sample, or `None` on a numerical
    /// degeneracy (non-finite `p̂`). Degeneracies skip the sample, not the
    /// call.
    pub fn candidate(&self, ctx: &Ctx, ln_n: &Float, principal: &Float) -> Option<BigUint> {
        let delta_phi = Float::with_val(ctx.prec(), principal * &self.weight);
        let mut target = Float::with_val(ctx.prec(), ln_n + &delta_phi);
        target /= 2u32;
        let mut p_hat = ctx.exp(&target);
        if self.newton_iterations > 0 {
            p_hat = self.refine(ctx, p_hat, &target);
        }
        round_half_up(ctx, &p_hat)
    }

    /// Newton iteration `p ← p − p·(ln p − target)` on `f(p) = ln p − target`.
    ///
    /// Stops once the residual drops under `tol`. Any iterate at or below 1,
    /// or a failed logarithm, reverts to the unrefined starting point.
    fn refine(&self, ctx: &Ctx, initial: Float, target: &Float) -> Float {
        let mut p = initial.clone();
        for _ in 0..self.newton_iterations {
            if p <= 1u32 {
                return initial;
            }
            let ln_p = match ctx.ln(&p) {
                Ok(v) => v,
                Err(_) => return initial,
            };
            let residual = Float::with_val(ctx.prec(), &ln_p - target);
            if residual.cmp_abs(&self.tol) != Some(Ordering::Greater) {
                break;
            }
            let step = Float::with_val(ctx.prec(), &p * &residual);
            p -= step;
            if p <= 1u32 {
                return initial;
            }
        }
        p
    }
}

/// Half-up rounding to a nonnegative integer: `⌊x + ½⌋`.
pub fn round_half_up(ctx: &Ctx, x: &Float) -> Option<BigUint> {
    if !x.is_finite() {
        return None;
    }
    let mut shifted = Float::with_val(ctx.prec(), x + 0.5f64);
    shifted.floor_mut();
    ctx.biguint_from_float(&shifted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> Ctx {
        Ctx::new(80, 10)
    }

    #[test]
    fn rounds_half_up() {
        let ctx = ctx();
        let cases = [
            (2.5, 3u32),
            (2.4999, 2),
            (2.5001, 3),
            (0.2, 0),
            (0.5, 1),
            (12345.0, 12345),
        ];
        for (input, expected) in cases {
            assert_eq!(
                round_half_up(&ctx, &ctx.float(input)),
                Some(BigUint::from(expected)),
                "round_half_up({})",
                input
            );
        }
        assert_eq!(round_half_up(&ctx, &ctx.float(f64::NAN)), None);
        assert_eq!(round_half_up(&ctx, &ctx.float(f64::INFINITY)), None);
    }

    #[test]
    fn zero_angle_snaps_to_integer_square_root() {
        // N = 10^14 = (10^7)²: with θ = 0 the snap must land exactly on 10^7
        let ctx = Ctx::new(0, 47);
        let n: BigUint = "100000000000000".parse().unwrap();
        let ln_n = ctx.ln(&ctx.float_from_biguint(&n)).unwrap();
        let snap = SnapKernel::new(&ctx, ctx.float(0.005), 2);
        let candidate = snap.candidate(&ctx, &ln_n, &ctx.float(0.0));
        assert_eq!(candidate, Some(BigUint::from(10_000_000u64)));
    }

    #[test]
    fn newton_refinement_converges_to_target() {
        let ctx = ctx();
        let snap = SnapKernel::new(&ctx, ctx.float(1.0), 3);
        let target = ctx.ln(&ctx.float(1000.0)).unwrap();
        // start half a unit off; two Newton steps land well within rounding
        let refined = snap.refine(&ctx, ctx.float(1000.5), &target);
        let mut err = Float::with_val(ctx.prec(), &refined - 1000u32);
        err.abs_mut();
        assert!(err < ctx.float(1e-6), "refined to {:?}", refined.to_f64());
    }

    #[test]
    fn newton_reverts_when_iterate_degenerates() {
        let ctx = ctx();
        let snap = SnapKernel::new(&ctx, ctx.float(1.0), 3);
        // a large residual drives the first step far below 1: must fall back
        let target = ctx.float(-5.0);
        let initial = ctx.float(1.5);
        let refined = snap.refine(&ctx, initial.clone(), &target);
        assert_eq!(refined, initial);

        // a starting point at or below 1 reverts immediately
        let refined = snap.refine(&ctx, ctx.float(0.9), &ctx.float(3.0));
        assert_eq!(refined, ctx.float(0.9));
    }

    #[test]
    fn weight_scales_the_phase_correction() {
        // exp((lnN + principal·w)/2) with N = e², principal = 2/w ⇒ exp(2) ≈ 7.39 → 7
        let ctx = ctx();
        let ln_n = ctx.float(2.0);
        let snap = SnapKernel::new(&ctx, ctx.float(0.5), 0);
        let candidate = snap.candidate(&ctx, &ln_n, &ctx.float(4.0));
        assert_eq!(candidate, Some(BigUint::from(7u32)));
    }
}
