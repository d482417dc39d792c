//! Deterministic traversal of the `(k, m)` space and the parallel m-scan.
//!
//! The outer `k` loop is sequential so the additive recurrence stays in
//! order and the progress log stays monotone. For each `k` the inner sweep
//! over `m ∈ [−m_span, m_span]` fans out across the rayon pool; work items
//! are pure, reading only the immutable per-call constants. The first
//! certified pair is installed in a write-once cell; later workers observe
//! it and abandon their sweep.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use num_bigint::BigUint;
use rayon::prelude::*;
use rug::Float;

use crate::certify;
use crate::config::Config;
use crate::kernel::{self, AmplitudeGate};
use crate::precision::Ctx;
use crate::sampler::GoldenSampler;
use crate::snap::SnapKernel;
use crate::{FactorOutcome, Factorization, FailureReason};

/// Observer hooks for search progress. Reporting only: never part of the
/// correctness contract, and never called from inside the parallel sweep.
pub trait SearchObserver {
    /// Called at fixed percentage boundaries of the outer loop.
    fn on_progress(&self, completed_samples: u64, total_samples: u64) {
        let _ = (completed_samples, total_samples);
    }

    /// Called once when a factor is certified, with the outer sample index.
    fn on_factor_found(&self, sample_index: u64) {
        let _ = sample_index;
    }
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// Immutable per-call search state: the precision context, the derived
/// constants, and the frozen configuration. Built at call entry, dropped at
/// call exit; nothing here mutates during the search.
pub(crate) struct Engine {
    n: BigUint,
    cfg: Config,
    ctx: Ctx,
    ln_n: Float,
    gate: AmplitudeGate,
    snap: SnapKernel,
    stability_eps: Float,
    stability_floor: f64,
}

impl Engine {
    /// `None` only if `ln N` is degenerate, which validated input rules out.
    pub(crate) fn new(n: BigUint, cfg: Config) -> Option<Engine> {
        let ctx = Ctx::new(cfg.precision, n.bits());
        let n_float = ctx.float_from_biguint(&n);
        let ln_n = ctx.ln(&n_float).ok()?;
        let gate = AmplitudeGate::new(&ctx, cfg.kernel_variant, cfg.sigma, cfg.j, cfg.threshold);
        let snap = SnapKernel::new(&ctx, gate.snap_weight(&ctx), cfg.newton_iterations);
        let stability_eps = ctx.pow10(-((ctx.digits() / 4) as i32));
        let stability_floor = 0.9 * cfg.threshold;
        Some(Engine {
            n,
            cfg,
            ctx,
            ln_n,
            gate,
            snap,
            stability_eps,
            stability_floor,
        })
    }

    /// Run the search to one of `Found`, `TimedOut`, or `Exhausted`.
    pub(crate) fn run(&self, started: Instant, observer: &dyn SearchObserver) -> FactorOutcome {
        let deadline = (self.cfg.search_timeout_ms > 0)
            .then(|| started + Duration::from_millis(self.cfg.search_timeout_ms));
        let mut sampler = GoldenSampler::new(&self.ctx, self.cfg.k_lo, self.cfg.k_hi);
        let progress_interval = (self.cfg.samples / 10).max(1);

        for sample_index in 0..self.cfg.samples {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return FactorOutcome::Failure(FailureReason::Timeout);
            }
            if sample_index > 0 && sample_index % progress_interval == 0 {
                observer.on_progress(sample_index, self.cfg.samples);
            }

            let k = sampler.next_k();
            if let Some((p, q)) = self.scan_m_range(&k, deadline) {
                observer.on_factor_found(sample_index);
                return FactorOutcome::Success(Factorization {
                    p,
                    q,
                    duration: started.elapsed(),
                    sample_index,
                    config: self.cfg.clone(),
                });
            }
        }

        FactorOutcome::Failure(FailureReason::NoFactorFound)
    }

    /// Fan the inner sweep over the worker pool. Workers observe the result
    /// cell before each `m` and abandon once it is set; they also poll the
    /// deadline at the same granularity.
    fn scan_m_range(&self, k: &Float, deadline: Option<Instant>) -> Option<(BigUint, BigUint)> {
        let cell: OnceLock<(BigUint, BigUint)> = OnceLock::new();
        let span = i64::from(self.cfg.m_span);
        (-span..=span).into_par_iter().for_each(|m| {
            if cell.get().is_some() {
                return;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return;
            }
            if let Some(pair) = self.scan_one(k, m) {
                let _ = cell.set(pair);
            }
        });
        cell.into_inner()
    }

    /// One pure work item: angle, gate, snap, certify.
    fn scan_one(&self, k: &Float, m: i64) -> Option<(BigUint, BigUint)> {
        let prec = self.ctx.prec();
        let mut theta = Float::with_val(prec, self.ctx.two_pi() * m);
        theta /= k;

        let principal = kernel::principal_angle(&self.ctx, &theta);
        if !self.gate.accepts(&self.ctx, &principal) {
            return None;
        }
        if self.cfg.stability_check && !self.is_stable(&principal) {
            return None;
        }

        let center = self.snap.candidate(&self.ctx, &self.ln_n, &principal)?;
        certify::certify_neighborhood(&self.n, &center)
    }

    /// Probe `A(θ ± ε_stab)`; an accepted amplitude that collapses under a
    /// perturbation of `10^(−P/4)` is a numerical artifact, not a peak.
    fn is_stable(&self, principal: &Float) -> bool {
        for sign in [1i32, -1] {
            let mut probe = Float::with_val(self.ctx.prec(), &self.stability_eps * sign);
            probe += principal;
            let amp = self.gate.amplitude(&self.ctx, &probe);
            if !(amp > self.stability_floor) {
                return false;
            }
        }
        true
    }
}
