//! Structured run records.
//!
//! On request the driver serializes a complete account of a run (input,
//! effective precision, configuration snapshot, environment fingerprint,
//! outcome) as pretty JSON. The in-process [`FactorOutcome`] remains the
//! only required output of the core; artifacts are for experiment logs.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use num_bigint::BigUint;
use serde::Serialize;

use crate::precision;
use crate::semiprime;
use crate::{Config, FactorOutcome};

/// Where and how a run happened.
#[derive(Debug, Clone, Serialize)]
pub struct EnvFingerprint {
    pub os: &'static str,
    pub arch: &'static str,
    pub worker_threads: usize,
    pub crate_version: &'static str,
}

impl EnvFingerprint {
    pub fn capture() -> EnvFingerprint {
        EnvFingerprint {
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            worker_threads: rayon::current_num_threads(),
            crate_version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// One run, fully described.
#[derive(Debug, Clone, Serialize)]
pub struct RunArtifact {
    pub n: String,
    pub bits: u64,
    pub precision_digits: u32,
    /// `"SUCCESS"` or the failure reason string.
    pub outcome: String,
    pub p: Option<String>,
    pub q: Option<String>,
    pub p_probable_prime: Option<bool>,
    pub q_probable_prime: Option<bool>,
    pub sample_index: Option<u64>,
    pub elapsed_ms: u128,
    pub config: Config,
    pub environment: EnvFingerprint,
}

impl RunArtifact {
    pub fn new(n: &BigUint, cfg: &Config, outcome: &FactorOutcome, elapsed: Duration) -> RunArtifact {
        let (p, q, p_prime, q_prime, sample_index, outcome_tag) = match outcome {
            FactorOutcome::Success(f) => (
                Some(f.p.to_string()),
                Some(f.q.to_string()),
                Some(semiprime::is_probable_prime(&f.p, 20)),
                Some(semiprime::is_probable_prime(&f.q, 20)),
                Some(f.sample_index),
                "SUCCESS".to_string(),
            ),
            FactorOutcome::Failure(reason) => {
                (None, None, None, None, None, reason.to_string())
            }
        };
        RunArtifact {
            n: n.to_string(),
            bits: n.bits(),
            precision_digits: precision::effective_digits(cfg.precision, n.bits()),
            outcome: outcome_tag,
            p,
            q,
            p_probable_prime: p_prime,
            q_probable_prime: q_prime,
            sample_index,
            elapsed_ms: elapsed.as_millis(),
            config: cfg.clone(),
            environment: EnvFingerprint::capture(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")
    }
}
