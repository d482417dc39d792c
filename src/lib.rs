//! Geometric resonance factorization of balanced semiprimes.
//!
//! The engine samples an angular/scale parameter space with a golden-ratio
//! additive recurrence, gates each angle through a smooth kernel amplitude,
//! snaps a floating exponent back to an integer candidate, and certifies
//! candidates with the exact predicate `N mod d == 0` on a three-element
//! neighborhood. There is no classical fallback of any kind: when the
//! geometry exhausts its budget, the call reports a structured failure.
//!
//! Pipeline: precision context → kernel gate / snap → sampler & scheduler →
//! certification. The context and derived constants are created once per
//! call and shared immutably; only the [`FactorOutcome`] escapes.

pub mod artifact;
pub mod certify;
pub mod config;
pub mod kernel;
pub mod precision;
pub mod sampler;
pub mod search;
pub mod semiprime;
pub mod snap;

use std::fmt;
use std::time::{Duration, Instant};

use num_bigint::BigUint;
use num_traits::One;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::{Config, KernelVariant};
pub use precision::{Ctx, MathError};
pub use search::{NoopObserver, SearchObserver};

/// A caller contract violation, reported before any computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("N must be at least 10, got {0}")]
    TooSmall(BigUint),
    #[error("sigma must be positive, got {0}")]
    NonPositiveSigma(f64),
    #[error("threshold must lie strictly inside (0, 1), got {0}")]
    ThresholdOutOfRange(f64),
    #[error("k window must satisfy 0 < k_lo < k_hi, got [{lo}, {hi}]")]
    EmptyKWindow { lo: f64, hi: f64 },
    #[error("j must be at least 1 for the Dirichlet kernel")]
    ZeroDirichletWidth,
    #[error("newton_iterations must be at most 3, got {0}")]
    TooManyNewtonIterations(u32),
}

/// Why a search ended without a certified factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureReason {
    /// The sample budget ran out with no certified divisor.
    NoFactorFound,
    /// The wall-clock deadline expired first.
    Timeout,
    /// `N` is outside the operational window and not whitelisted.
    OutOfGate,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NoFactorFound => write!(f, "NO_FACTOR_FOUND"),
            FailureReason::Timeout => write!(f, "TIMEOUT"),
            FailureReason::OutOfGate => write!(f, "OUT_OF_GATE"),
        }
    }
}

/// A certified factorization: `p·q == N` with `1 < p ≤ q < N`.
#[derive(Debug, Clone)]
pub struct Factorization {
    pub p: BigUint,
    pub q: BigUint,
    /// Wall-clock time from call entry to certification.
    pub duration: Duration,
    /// Outer `k`-sample index at which the pair was certified.
    pub sample_index: u64,
    /// Frozen configuration snapshot for the call.
    pub config: Config,
}

/// Outcome of one factorization call.
#[derive(Debug, Clone)]
pub enum FactorOutcome {
    Success(Factorization),
    Failure(FailureReason),
}

impl FactorOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FactorOutcome::Success(_))
    }

    /// The certified pair, if any.
    pub fn factors(&self) -> Option<(&BigUint, &BigUint)> {
        match self {
            FactorOutcome::Success(f) => Some((&f.p, &f.q)),
            FactorOutcome::Failure(_) => None,
        }
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            FactorOutcome::Success(_) => None,
            FactorOutcome::Failure(reason) => Some(*reason),
        }
    }
}

/// The single 127-bit challenge admitted past the operational gate when
/// `allow_whitelisted_challenge` is set.
pub fn whitelisted_challenge() -> BigUint {
    "137524771864208156028430259349934309717"
        .parse()
        .expect("challenge literal parses")
}

/// Lower edge of the operational window: `10^14`.
fn gate_floor() -> BigUint {
    BigUint::from(10u32).pow(14)
}

/// Upper edge of the operational window: `2^60` (≈ 1.15·10^18). The
/// canonical 60-bit validation semiprime sits exactly at this bit width.
fn gate_ceiling() -> BigUint {
    BigUint::one() << 60usize
}

/// Whether `N` falls inside the operational window `[10^14, 2^60]`.
pub fn operational_gate_admits(n: &BigUint) -> bool {
    *n >= gate_floor() && *n <= gate_ceiling()
}

/// Factor a balanced semiprime by geometric resonance.
///
/// Returns `Err` for caller contract violations, otherwise a structured
/// [`FactorOutcome`]. Gate rejection happens before the precision context
/// is built, so an out-of-gate call performs no expensive work.
pub fn factor(n: &BigUint, cfg: &Config) -> Result<FactorOutcome, InputError> {
    factor_with_observer(n, cfg, &NoopObserver)
}

/// [`factor`] with progress hooks. The observer is invoked from the
/// sequential outer loop only, never from the parallel sweep.
pub fn factor_with_observer(
    n: &BigUint,
    cfg: &Config,
    observer: &dyn SearchObserver,
) -> Result<FactorOutcome, InputError> {
    if *n < BigUint::from(10u32) {
        return Err(InputError::TooSmall(n.clone()));
    }
    cfg.validate()?;

    if cfg.enforce_operational_gate
        && !operational_gate_admits(n)
        && !(cfg.allow_whitelisted_challenge && *n == whitelisted_challenge())
    {
        return Ok(FactorOutcome::Failure(FailureReason::OutOfGate));
    }

    let started = Instant::now();
    let Some(engine) = search::Engine::new(n.clone(), cfg.clone()) else {
        return Ok(FactorOutcome::Failure(FailureReason::NoFactorFound));
    };
    let outcome = engine.run(started, observer);

    if let FactorOutcome::Success(found) = &outcome {
        // Certification already proved divisibility; a mismatch here means
        // an arithmetic bug, not a missed factor. Abort loudly.
        assert!(
            &found.p * &found.q == *n && found.p > BigUint::one() && found.p <= found.q,
            "certification invariant violated: {} × {} ≠ {}",
            found.p,
            found.q,
            n
        );
    }

    Ok(outcome)
}
