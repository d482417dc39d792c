//! Geometric resonance factorization driver.
//!
//! Usage:
//!   resonance-factoring [N] [options]
//!
//! With no N the driver runs the whitelisted 127-bit challenge (and enables
//! the whitelist flag for it). Options:
//!   --samples=<n>        outer k-sample budget
//!   --m-span=<n>         inner sweep half-range
//!   --sigma=<x>          Gaussian kernel width
//!   --threshold=<x>      minimum accepted amplitude in (0, 1)
//!   --k-lo=<x> --k-hi=<x>  k sampling window
//!   --timeout-ms=<n>     wall-clock budget (0 disables)
//!   --precision=<n>      decimal digit floor
//!   --kernel=<gaussian|dirichlet>
//!   --j=<n>              Dirichlet half-width
//!   --newton=<n>         Newton refinement iterations (0-3)
//!   --stability-check    probe A(θ ± ε) before snapping
//!   --allow-challenge    admit the whitelisted 127-bit N
//!   --no-gate            disable the operational gate (calibration only)
//!   --config=<path>      load a JSON Config (flags still override)
//!   --artifact=<path>    write a JSON run record

use std::process::ExitCode;
use std::time::Instant;

use num_bigint::BigUint;

use resonance_factoring::artifact::RunArtifact;
use resonance_factoring::{
    factor_with_observer, semiprime, whitelisted_challenge, Config, FactorOutcome, KernelVariant,
    SearchObserver,
};

struct PrintObserver;

impl SearchObserver for PrintObserver {
    fn on_progress(&self, completed_samples: u64, total_samples: u64) {
        let percent = completed_samples * 100 / total_samples.max(1);
        println!(
            "Progress: {}% ({}/{})",
            percent, completed_samples, total_samples
        );
    }

    fn on_factor_found(&self, sample_index: u64) {
        println!("Factor certified at k-sample {}", sample_index + 1);
    }
}

struct CliArgs {
    n: BigUint,
    cfg: Config,
    artifact_path: Option<String>,
}

fn parse_args() -> Result<CliArgs, String> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        return Err(String::new());
    }

    fn value_of<'a>(arg: &'a str, key: &str) -> Option<&'a str> {
        arg.strip_prefix(key)?.strip_prefix('=')
    }

    // a config file seeds the defaults; explicit flags still override it
    let mut cfg = match args.iter().find_map(|a| value_of(a, "--config")) {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read config {}: {}", path, e))?;
            serde_json::from_str::<Config>(&text)
                .map_err(|e| format!("cannot parse config {}: {}", path, e))?
        }
        None => Config::default(),
    };
    let mut n: Option<BigUint> = None;
    let mut artifact_path = None;

    for arg in &args {
        if value_of(arg, "--config").is_some() {
            continue;
        }
        if let Some(v) = value_of(arg, "--samples") {
            cfg.samples = v.parse().map_err(|_| format!("bad --samples: {}", v))?;
        } else if let Some(v) = value_of(arg, "--m-span") {
            cfg.m_span = v.parse().map_err(|_| format!("bad --m-span: {}", v))?;
        } else if let Some(v) = value_of(arg, "--sigma") {
            cfg.sigma = v.parse().map_err(|_| format!("bad --sigma: {}", v))?;
        } else if let Some(v) = value_of(arg, "--threshold") {
            cfg.threshold = v.parse().map_err(|_| format!("bad --threshold: {}", v))?;
        } else if let Some(v) = value_of(arg, "--k-lo") {
            cfg.k_lo = v.parse().map_err(|_| format!("bad --k-lo: {}", v))?;
        } else if let Some(v) = value_of(arg, "--k-hi") {
            cfg.k_hi = v.parse().map_err(|_| format!("bad --k-hi: {}", v))?;
        } else if let Some(v) = value_of(arg, "--timeout-ms") {
            cfg.search_timeout_ms = v.parse().map_err(|_| format!("bad --timeout-ms: {}", v))?;
        } else if let Some(v) = value_of(arg, "--precision") {
            cfg.precision = v.parse().map_err(|_| format!("bad --precision: {}", v))?;
        } else if let Some(v) = value_of(arg, "--kernel") {
            cfg.kernel_variant = v.parse::<KernelVariant>()?;
        } else if let Some(v) = value_of(arg, "--j") {
            cfg.j = v.parse().map_err(|_| format!("bad --j: {}", v))?;
        } else if let Some(v) = value_of(arg, "--newton") {
            cfg.newton_iterations = v.parse().map_err(|_| format!("bad --newton: {}", v))?;
        } else if let Some(v) = value_of(arg, "--artifact") {
            artifact_path = Some(v.to_string());
        } else if arg == "--stability-check" {
            cfg.stability_check = true;
        } else if arg == "--allow-challenge" {
            cfg.allow_whitelisted_challenge = true;
        } else if arg == "--no-gate" {
            cfg.enforce_operational_gate = false;
        } else if arg.starts_with("--") {
            return Err(format!("unknown option: {}", arg));
        } else if n.is_none() {
            n = Some(
                arg.parse()
                    .map_err(|_| format!("N must be a decimal integer, got '{}'", arg))?,
            );
        } else {
            return Err(format!("unexpected argument: {}", arg));
        }
    }

    let n = n.unwrap_or_else(|| {
        // no N: run the challenge, which needs its whitelist flag
        cfg.allow_whitelisted_challenge = true;
        whitelisted_challenge()
    });

    Ok(CliArgs {
        n,
        cfg,
        artifact_path,
    })
}

fn main() -> ExitCode {
    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("error: {}", msg);
            }
            eprintln!("usage: resonance-factoring [N] [--samples=.. --m-span=.. --sigma=.. --threshold=.. --k-lo=.. --k-hi=.. --timeout-ms=.. --precision=.. --kernel=gaussian|dirichlet --j=.. --newton=.. --stability-check --allow-challenge --no-gate --config=path --artifact=path]");
            return ExitCode::from(2);
        }
    };

    println!("=== Geometric Resonance Factorization ===");
    println!("N = {} ({} bits)", cli.n, cli.n.bits());
    println!(
        "Configuration: kernel={}, samples={}, m-span={}, sigma={}, threshold={}, k=[{}, {}], newton={}",
        cli.cfg.kernel_variant,
        cli.cfg.samples,
        cli.cfg.m_span,
        cli.cfg.sigma,
        cli.cfg.threshold,
        cli.cfg.k_lo,
        cli.cfg.k_hi,
        cli.cfg.newton_iterations,
    );

    println!("Starting search...");
    let started = Instant::now();
    let outcome = match factor_with_observer(&cli.n, &cli.cfg, &PrintObserver) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::from(2);
        }
    };
    let elapsed = started.elapsed();
    println!("Search completed in {:.3} s", elapsed.as_secs_f64());

    let code = match &outcome {
        FactorOutcome::Success(found) => {
            println!("=== SUCCESS ===");
            println!("p = {}", found.p);
            println!("q = {}", found.q);
            println!(
                "Verification: p × q = N ({}), certified at k-sample {}",
                &found.p * &found.q == cli.n,
                found.sample_index + 1
            );
            println!(
                "p probable prime: {}, q probable prime: {}",
                semiprime::is_probable_prime(&found.p, 20),
                semiprime::is_probable_prime(&found.q, 20)
            );
            ExitCode::SUCCESS
        }
        FactorOutcome::Failure(reason) => {
            println!("=== {} ===", reason);
            println!("Consider: increase samples or m-span, or adjust sigma/threshold");
            ExitCode::FAILURE
        }
    };

    if let Some(path) = &cli.artifact_path {
        let artifact = RunArtifact::new(&cli.n, &cli.cfg, &outcome, elapsed);
        match artifact.write(std::path::Path::new(path)) {
            Ok(()) => println!("Run record written to {}", path),
            Err(err) => eprintln!("error: could not write artifact {}: {}", path, err),
        }
    }

    code
}
