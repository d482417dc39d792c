//! Frozen search configuration.
//!
//! A `Config` is validated once at call entry and snapshotted into every
//! success record; nothing mutates it afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::InputError;

/// Which amplitude kernel gates the snap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelVariant {
    /// `exp(−θ²/(2σ²))` at the principal angle. No singularities; bandwidth
    /// controlled by `sigma` alone. The default.
    Gaussian,
    /// Normalized Dirichlet `|sin((2J+1)θ/2)/((2J+1)·sin(θ/2))|`. Kept for
    /// compatibility with earlier tuning.
    Dirichlet,
}

impl fmt::Display for KernelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelVariant::Gaussian => write!(f, "gaussian"),
            KernelVariant::Dirichlet => write!(f, "dirichlet"),
        }
    }
}

impl FromStr for KernelVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gaussian" => Ok(KernelVariant::Gaussian),
            "dirichlet" => Ok(KernelVariant::Dirichlet),
            other => Err(format!("unknown kernel variant '{}'", other)),
        }
    }
}

/// Search configuration.
///
/// Defaults carry the tuning that factored the validation targets in the
/// operational window; the 127-bit challenge needs a longer budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Floor for the decimal digit count. The effective precision is
    /// `max(precision, 4·bits(N) + 200)`.
    pub precision: u32,
    /// Maximum outer-loop iterations over `k`.
    pub samples: u64,
    /// Inner sweep half-range: `m ∈ [−m_span, m_span]`.
    pub m_span: u32,
    /// Gaussian kernel width σ; doubles as the snap weight for the Gaussian
    /// variant.
    pub sigma: f64,
    /// Dirichlet kernel half-width `J` (Dirichlet variant only).
    pub j: u32,
    /// Minimum accepted amplitude, strictly inside `(0, 1)`.
    pub threshold: f64,
    /// Lower edge of the `k` sampling window.
    pub k_lo: f64,
    /// Upper edge of the `k` sampling window.
    pub k_hi: f64,
    /// Wall-clock budget in milliseconds; 0 disables the deadline.
    pub search_timeout_ms: u64,
    /// Admit the whitelisted 127-bit challenge past the operational gate.
    pub allow_whitelisted_challenge: bool,
    /// Enforce the operational gate. Disable only for sub-gate calibration
    /// semiprimes.
    pub enforce_operational_gate: bool,
    /// Kernel selection.
    pub kernel_variant: KernelVariant,
    /// Newton refinement iterations on `ln p`, in `[0, 3]`.
    pub newton_iterations: u32,
    /// Require `A(θ ± 10^(−P/4))` to stay above `0.9·threshold` before
    /// snapping an accepted sample.
    pub stability_check: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            precision: 120,
            samples: 100_000,
            m_span: 220,
            sigma: 0.005,
            j: 10,
            threshold: 0.9,
            k_lo: 0.19,
            k_hi: 0.47,
            search_timeout_ms: 120_000,
            allow_whitelisted_challenge: false,
            enforce_operational_gate: true,
            kernel_variant: KernelVariant::Gaussian,
            newton_iterations: 2,
            stability_check: false,
        }
    }
}

impl Config {
    /// Check the caller contract before any computation.
    pub fn validate(&self) -> Result<(), InputError> {
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(InputError::ThresholdOutOfRange(self.threshold));
        }
        if !(self.k_lo > 0.0 && self.k_lo < self.k_hi) {
            return Err(InputError::EmptyKWindow {
                lo: self.k_lo,
                hi: self.k_hi,
            });
        }
        match self.kernel_variant {
            KernelVariant::Gaussian => {
                if !(self.sigma > 0.0) {
                    return Err(InputError::NonPositiveSigma(self.sigma));
                }
            }
            KernelVariant::Dirichlet => {
                if self.j == 0 {
                    return Err(InputError::ZeroDirichletWidth);
                }
            }
        }
        if self.newton_iterations > 3 {
            return Err(InputError::TooManyNewtonIterations(self.newton_iterations));
        }
        Ok(())
    }
}
