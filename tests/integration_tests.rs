//! End-to-end factorization scenarios.
//!
//! The literal inputs come from the validation gates: a 30-bit calibration
//! semiprime, the canonical 60-bit target, an operational-range target, and
//! the 127-bit challenge. Twin-prime semiprimes (√N within one of a factor)
//! certify deterministically at the very first sample via m = 0, which
//! pins down the snap/certify path independently of the sampler.

use num_bigint::BigUint;

use resonance_factoring::{
    factor, operational_gate_admits, semiprime, whitelisted_challenge, Config, FactorOutcome,
    FailureReason, InputError, KernelVariant,
};

fn big(s: &str) -> BigUint {
    s.parse().expect("decimal literal")
}

fn assert_pair(outcome: &FactorOutcome, p: &str, q: &str) {
    match outcome {
        FactorOutcome::Success(found) => {
            assert_eq!(found.p, big(p), "wrong smaller factor");
            assert_eq!(found.q, big(q), "wrong larger factor");
        }
        FactorOutcome::Failure(reason) => panic!("expected {} × {}, got {}", p, q, reason),
    }
}

// ---------------------------------------------------------------------------
// Gate behavior
// ---------------------------------------------------------------------------

#[test]
fn just_below_gate_floor_is_rejected() {
    let outcome = factor(&big("99999999999999"), &Config::default()).unwrap();
    assert_eq!(outcome.failure_reason(), Some(FailureReason::OutOfGate));
}

#[test]
fn gate_boundaries_are_admitted() {
    // 10^14 and 10^18 pass the gate; with a zero-sample budget the call
    // exhausts immediately instead of being gated
    let cfg = Config {
        samples: 0,
        ..Config::default()
    };
    for n in ["100000000000000", "1000000000000000000"] {
        let outcome = factor(&big(n), &cfg).unwrap();
        assert_eq!(
            outcome.failure_reason(),
            Some(FailureReason::NoFactorFound),
            "N = {} should pass the gate",
            n
        );
    }
}

#[test]
fn challenge_needs_the_whitelist_flag() {
    let n = whitelisted_challenge();
    assert!(!operational_gate_admits(&n));

    let outcome = factor(&n, &Config::default()).unwrap();
    assert_eq!(outcome.failure_reason(), Some(FailureReason::OutOfGate));

    let cfg = Config {
        allow_whitelisted_challenge: true,
        samples: 0,
        ..Config::default()
    };
    let outcome = factor(&n, &cfg).unwrap();
    assert_eq!(outcome.failure_reason(), Some(FailureReason::NoFactorFound));
}

#[test]
fn whitelist_flag_admits_only_the_challenge() {
    // the flag is not a general gate bypass
    let cfg = Config {
        allow_whitelisted_challenge: true,
        samples: 0,
        ..Config::default()
    };
    let outcome = factor(&big("99999999999999"), &cfg).unwrap();
    assert_eq!(outcome.failure_reason(), Some(FailureReason::OutOfGate));
}

#[test]
fn tiny_n_is_an_input_error() {
    let err = factor(&BigUint::from(6u32), &Config::default()).unwrap_err();
    assert_eq!(err, InputError::TooSmall(BigUint::from(6u32)));
}

// ---------------------------------------------------------------------------
// Budget behavior
// ---------------------------------------------------------------------------

#[test]
fn zero_samples_exhaust_immediately() {
    let cfg = Config {
        samples: 0,
        ..Config::default()
    };
    let outcome = factor(&big("100000980001501"), &cfg).unwrap();
    assert_eq!(outcome.failure_reason(), Some(FailureReason::NoFactorFound));
}

#[test]
fn one_millisecond_deadline_times_out() {
    let cfg = Config {
        search_timeout_ms: 1,
        ..Config::default()
    };
    let outcome = factor(&big("1152921470247108503"), &cfg).unwrap();
    assert_eq!(outcome.failure_reason(), Some(FailureReason::Timeout));
}

#[test]
fn zero_timeout_disables_the_deadline() {
    // with the deadline off, a small sample budget exhausts normally
    let cfg = Config {
        search_timeout_ms: 0,
        samples: 2,
        m_span: 5,
        ..Config::default()
    };
    let outcome = factor(&big("100000000000003"), &cfg).unwrap();
    assert_eq!(outcome.failure_reason(), Some(FailureReason::NoFactorFound));
}

#[test]
fn m_span_zero_still_scans_m_zero() {
    // twin-prime semiprime: m = 0 alone certifies on the first sample
    let cfg = Config {
        m_span: 0,
        samples: 1,
        ..Config::default()
    };
    let outcome = factor(&big("100002800019599"), &cfg).unwrap();
    assert_pair(&outcome, "10000139", "10000141");
}

// ---------------------------------------------------------------------------
// Certified end-to-end searches
// ---------------------------------------------------------------------------

#[test]
fn thirty_bit_calibration_target_with_relaxed_gate() {
    // 1073217479 = 32749 · 32771 sits far below the gate; the relaxed gate
    // plus a wider kernel reaches its offset from √N within a couple of
    // samples
    let cfg = Config {
        enforce_operational_gate: false,
        sigma: 0.05,
        ..Config::default()
    };
    let outcome = factor(&big("1073217479"), &cfg).unwrap();
    assert_pair(&outcome, "32749", "32771");
}

#[test]
fn sixty_bit_target_with_default_config() {
    // 1152921470247108503 = 1073741789 · 1073741827, the canonical 60-bit
    // validation vector
    let outcome = factor(&big("1152921470247108503"), &Config::default()).unwrap();
    assert_pair(&outcome, "1073741789", "1073741827");
    if let FactorOutcome::Success(found) = &outcome {
        assert!(
            found.sample_index < 1_000,
            "resonance should certify within the first thousand k-samples, took {}",
            found.sample_index
        );
    }
}

#[test]
fn operational_range_target_with_default_config() {
    // 100000980001501 = 10000019 · 10000079
    let outcome = factor(&big("100000980001501"), &Config::default()).unwrap();
    assert_pair(&outcome, "10000019", "10000079");
}

#[test]
fn twin_prime_semiprime_certifies_on_first_sample() {
    let outcome = factor(&big("90000190800101123"), &Config::default()).unwrap();
    assert_pair(&outcome, "300000317", "300000319");
    if let FactorOutcome::Success(found) = &outcome {
        assert_eq!(found.sample_index, 0);
        assert_eq!(found.config, Config::default());
    }
}

#[test]
fn dirichlet_variant_certifies_the_twin_prime_target() {
    let cfg = Config {
        kernel_variant: KernelVariant::Dirichlet,
        samples: 1,
        ..Config::default()
    };
    let outcome = factor(&big("100002800019599"), &cfg).unwrap();
    assert_pair(&outcome, "10000139", "10000141");
}

#[test]
fn stability_check_keeps_genuine_peaks() {
    let cfg = Config {
        stability_check: true,
        samples: 1,
        ..Config::default()
    };
    let outcome = factor(&big("100002800019599"), &cfg).unwrap();
    assert_pair(&outcome, "10000139", "10000141");
}

#[test]
fn newton_refinement_off_still_certifies() {
    let cfg = Config {
        newton_iterations: 0,
        samples: 1,
        ..Config::default()
    };
    let outcome = factor(&big("100002800019599"), &cfg).unwrap();
    assert_pair(&outcome, "10000139", "10000141");
}

#[test]
fn repeated_calls_are_idempotent() {
    let n = big("90000190800101123");
    let cfg = Config::default();
    let first = factor(&n, &cfg).unwrap();
    let second = factor(&n, &cfg).unwrap();
    match (&first, &second) {
        (FactorOutcome::Success(a), FactorOutcome::Success(b)) => {
            assert_eq!(a.p, b.p);
            assert_eq!(a.q, b.q);
            assert_eq!(a.sample_index, b.sample_index);
        }
        _ => panic!("both calls should certify"),
    }
}

// ---------------------------------------------------------------------------
// The 127-bit challenge
// ---------------------------------------------------------------------------

#[test]
fn challenge_runs_the_geometric_search_when_whitelisted() {
    // accepted past the gate, searched briefly, and allowed to exhaust
    // without success at this scale
    let cfg = Config {
        allow_whitelisted_challenge: true,
        samples: 3,
        m_span: 40,
        search_timeout_ms: 0,
        ..Config::default()
    };
    let outcome = factor(&whitelisted_challenge(), &cfg).unwrap();
    match outcome {
        FactorOutcome::Success(found) => {
            // if resonance ever lands it, only the canonical pair is valid
            assert_eq!(found.p, big("10508623501177419659"));
            assert_eq!(found.q, big("13086849276577416863"));
        }
        FactorOutcome::Failure(reason) => {
            assert_eq!(reason, FailureReason::NoFactorFound);
        }
    }
}

// ---------------------------------------------------------------------------
// Observer hooks
// ---------------------------------------------------------------------------

#[test]
fn observer_sees_progress_and_certification() {
    use resonance_factoring::{factor_with_observer, SearchObserver};
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Default)]
    struct CountingObserver {
        progress_calls: AtomicU64,
        found_at: AtomicU64,
    }

    impl SearchObserver for CountingObserver {
        fn on_progress(&self, _completed: u64, _total: u64) {
            self.progress_calls.fetch_add(1, Ordering::Relaxed);
        }
        fn on_factor_found(&self, sample_index: u64) {
            self.found_at.store(sample_index + 1, Ordering::Relaxed);
        }
    }

    // an exhausting search reports progress at every tenth of the budget
    let observer = CountingObserver::default();
    let cfg = Config {
        samples: 20,
        m_span: 3,
        ..Config::default()
    };
    let outcome = factor_with_observer(&big("100000000000003"), &cfg, &observer).unwrap();
    assert_eq!(outcome.failure_reason(), Some(FailureReason::NoFactorFound));
    assert_eq!(observer.progress_calls.load(Ordering::Relaxed), 9);
    assert_eq!(observer.found_at.load(Ordering::Relaxed), 0);

    // a certifying search fires the factor hook with the sample index
    let observer = CountingObserver::default();
    let outcome = factor_with_observer(&big("90000190800101123"), &cfg, &observer).unwrap();
    assert!(outcome.is_success());
    assert_eq!(observer.found_at.load(Ordering::Relaxed), 1);
}

// ---------------------------------------------------------------------------
// Generated targets
// ---------------------------------------------------------------------------

#[test]
fn generated_balanced_targets_produce_wellformed_outcomes() {
    let mut rng = rand::thread_rng();
    for _ in 0..3 {
        let target = semiprime::balanced_target(52, &mut rng);
        let cfg = Config {
            samples: 20,
            search_timeout_ms: 10_000,
            enforce_operational_gate: false,
            ..Config::default()
        };
        let outcome = factor(&target.n, &cfg).unwrap();
        if let FactorOutcome::Success(found) = outcome {
            assert!(target.matches(&found.p, &found.q));
            assert_eq!(&found.p * &found.q, target.n);
        }
    }
}
