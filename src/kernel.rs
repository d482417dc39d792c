//! Amplitude gates over the angular parameter.
//!
//! Two kernels share one contract: reduce `θ` to its principal angle, map
//! it to an amplitude in `[0, 1]`, and accept the sample when the amplitude
//! clears the configured threshold. The Gaussian variant is the default; it
//! has no singularities and a single width parameter. The normalized
//! Dirichlet variant is kept for compatibility with earlier tuning and
//! needs removable-singularity guards at multiples of `2π`.

use std::cmp::Ordering;

use rug::Float;

use crate::config::KernelVariant;
use crate::precision::Ctx;

/// Reduce `θ` to the principal angle `θ − 2π·⌊θ/(2π) + ½⌋` in `[−π, π)`.
pub fn principal_angle(ctx: &Ctx, theta: &Float) -> Float {
    let mut turns = Float::with_val(ctx.prec(), theta / ctx.two_pi());
    turns += 0.5f64;
    turns.floor_mut();
    let wrap = Float::with_val(ctx.prec(), &turns * ctx.two_pi());
    Float::with_val(ctx.prec(), theta - &wrap)
}

/// Gaussian amplitude `exp(−principal(θ)²/(2σ²))`, normalized to 1 at the
/// peak. Output is in `(0, 1]`.
pub fn gaussian_amplitude(ctx: &Ctx, theta: &Float, sigma: &Float) -> Float {
    let t = principal_angle(ctx, theta);
    let t2 = t.square();
    let mut denom = Float::with_val(ctx.prec(), sigma.square_ref());
    denom *= 2u32;
    let mut exponent = Float::with_val(ctx.prec(), &t2 / &denom);
    exponent = -exponent;
    ctx.exp(&exponent)
}

/// Normalized Dirichlet amplitude
/// `|sin((2J+1)θ/2) / ((2J+1)·sin(θ/2))|`, clamped to `[0, 1]`.
///
/// Evaluated as the sinc ratio `sinc((2J+1)θ/2) / sinc(θ/2)`, which removes
/// the `(2J+1)` normalization algebraically and stays finite across the
/// removable singularities at `θ ≡ 0 (mod 2π)`.
pub fn dirichlet_amplitude(ctx: &Ctx, theta: &Float, j: u32) -> Float {
    let t = principal_angle(ctx, theta);
    let half = Float::with_val(ctx.prec(), &t / 2u32);
    let order = 2 * j + 1;
    let wide = Float::with_val(ctx.prec(), &half * order);

    let eps = singularity_epsilon(ctx);

    // sin(θ/2) effectively zero: θ ≈ 2πn, where the normalized kernel tends to 1
    let mut sin_half = ctx.sin(&half);
    sin_half.abs_mut();
    if sin_half <= eps {
        return ctx.float(1.0);
    }

    let sinc_wide = stable_sinc(ctx, &wide, &eps);
    let sinc_half = stable_sinc(ctx, &half, &eps);

    // 0/0 straddling the removable singularity: defined as 1
    if sinc_half.cmp_abs(&eps) != Some(Ordering::Greater)
        && sinc_wide.cmp_abs(&eps) != Some(Ordering::Greater)
    {
        return ctx.float(1.0);
    }

    let mut amp = Float::with_val(ctx.prec(), &sinc_wide / &sinc_half);
    amp.abs_mut();
    if amp > 1u32 {
        return ctx.float(1.0);
    }
    amp
}

/// Guard threshold `10^(−max(12, P/2))` for the Dirichlet singularity
/// handling; scales with the context precision.
pub fn singularity_epsilon(ctx: &Ctx) -> Float {
    let scale = (ctx.digits() / 2).max(12) as i32;
    ctx.pow10(-scale)
}

/// `sin(x)/x` with a series fallback near zero.
fn stable_sinc(ctx: &Ctx, x: &Float, tol: &Float) -> Float {
    if x.cmp_abs(tol) != Some(Ordering::Greater) {
        // 1 − x²/6 + x⁴/120 − x⁶/5040
        let x2 = Float::with_val(ctx.prec(), x.square_ref());
        let x4 = Float::with_val(ctx.prec(), x2.square_ref());
        let x6 = Float::with_val(ctx.prec(), &x4 * &x2);
        let mut series = ctx.float(1.0);
        series -= Float::with_val(ctx.prec(), &x2 / 6u32);
        series += Float::with_val(ctx.prec(), &x4 / 120u32);
        series -= Float::with_val(ctx.prec(), &x6 / 5040u32);
        series
    } else {
        ctx.sin(x) / x
    }
}

/// Per-call acceptance test, built once from the frozen configuration.
///
/// For the Gaussian variant the threshold comparison is carried out in
/// principal-angle space: `A(θ) > threshold ⟺ |principal(θ)| < cutoff` with
/// `cutoff = σ·√(2·ln(1/threshold))`, because `exp` is strictly monotone.
/// The hot loop therefore never evaluates an MPFR exponential for a sample
/// it is going to reject.
pub enum AmplitudeGate {
    Gaussian {
        sigma: Float,
        cutoff: Float,
    },
    Dirichlet {
        j: u32,
        order: u32,
        threshold: Float,
    },
}

impl AmplitudeGate {
    pub fn new(ctx: &Ctx, variant: KernelVariant, sigma: f64, j: u32, threshold: f64) -> Self {
        match variant {
            KernelVariant::Gaussian => {
                let sigma = ctx.float(sigma);
                // σ·√(−2·ln threshold); threshold ∈ (0,1) keeps the radicand positive
                let mut cutoff = ctx
                    .ln(&ctx.float(threshold))
                    .expect("threshold validated in (0, 1)");
                cutoff *= -2i32;
                cutoff.sqrt_mut();
                cutoff *= &sigma;
                AmplitudeGate::Gaussian { sigma, cutoff }
            }
            KernelVariant::Dirichlet => AmplitudeGate::Dirichlet {
                j,
                order: 2 * j + 1,
                threshold: ctx.float(threshold),
            },
        }
    }

    /// Accept test for an already-reduced principal angle.
    pub fn accepts(&self, ctx: &Ctx, principal: &Float) -> bool {
        match self {
            AmplitudeGate::Gaussian { cutoff, .. } => {
                principal.cmp_abs(cutoff) == Some(Ordering::Less)
            }
            AmplitudeGate::Dirichlet { j, threshold, .. } => {
                dirichlet_amplitude(ctx, principal, *j) > *threshold
            }
        }
    }

    /// Full amplitude at `θ`, for artifacts and the stability probe.
    pub fn amplitude(&self, ctx: &Ctx, theta: &Float) -> Float {
        match self {
            AmplitudeGate::Gaussian { sigma, .. } => gaussian_amplitude(ctx, theta, sigma),
            AmplitudeGate::Dirichlet { j, .. } => dirichlet_amplitude(ctx, theta, *j),
        }
    }

    /// Kernel-specific snap weight: `σ` for Gaussian, the first-order
    /// correction `1/(2J+1)` for Dirichlet.
    pub fn snap_weight(&self, ctx: &Ctx) -> Float {
        match self {
            AmplitudeGate::Gaussian { sigma, .. } => sigma.clone(),
            AmplitudeGate::Dirichlet { order, .. } => {
                let mut w = ctx.float(1.0);
                w /= *order;
                w
            }
        }
    }
}
