#![forbid(unsafe_code)]

//! Replay a `lazyseg` operation script against the dense reference.
//!
//! # Running
//!
//! ```sh
//! cargo run -p lazyseg-harness -- path/to/script.txt
//! cat script.txt | cargo run -p lazyseg-harness
//! LAZYSEG_HARNESS_RANDOM_OPS=5000 LAZYSEG_HARNESS_SEED=7 cargo run -p lazyseg-harness
//! ```
//!
//! # Environment
//!
//! - `LAZYSEG_LOG`: tracing filter directives (default `info`).
//! - `LAZYSEG_BOUNDS`, `LAZYSEG_MAX_NODES`: tree configuration.
//! - `LAZYSEG_HARNESS_RANDOM_OPS`: replay a generated script of this many ops
//!   instead of reading one.
//! - `LAZYSEG_HARNESS_SEED`: seed for the generated script (default 0).
//! - `LAZYSEG_HARNESS_DOMAIN`: `LO:HI` domain for the generated script
//!   (default `0:1023`).
//! - `LAZYSEG_HARNESS_DUMP`: path to write the generated script to.
//!
//! Prints a JSON report on stdout. Exit status is 0 when the tree agrees
//! with the reference, 1 on divergence and 2 on usage, I/O or parse errors.

use std::io::Read;
use std::process::ExitCode;

use lazyseg::{Span, TreeConfig};
use lazyseg_harness::{Script, parse_script, random_script, replay};
use tracing_subscriber::EnvFilter;

const DEFAULT_DOMAIN: Span = Span::new(0, 1023);

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LAZYSEG_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_domain(value: &str) -> Option<Span> {
    let (lo, hi) = value.split_once(':')?;
    let span = Span::new(lo.trim().parse().ok()?, hi.trim().parse().ok()?);
    (!span.is_empty()).then_some(span)
}

fn generated_script() -> Option<Result<Script, String>> {
    let ops = std::env::var("LAZYSEG_HARNESS_RANDOM_OPS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())?;
    let seed = std::env::var("LAZYSEG_HARNESS_SEED")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(0);
    let domain = std::env::var("LAZYSEG_HARNESS_DOMAIN")
        .ok()
        .and_then(|value| parse_domain(&value))
        .unwrap_or(DEFAULT_DOMAIN);

    tracing::info!(ops, seed, domain = %domain, "generating script");
    let script = random_script(seed, domain, ops);

    if let Ok(path) = std::env::var("LAZYSEG_HARNESS_DUMP")
        && let Err(err) = std::fs::write(&path, script.to_string())
    {
        return Some(Err(format!("writing {path}: {err}")));
    }
    Some(Ok(script))
}

fn read_script(path: Option<String>) -> Result<Script, String> {
    let text = match path.as_deref() {
        Some("-") | None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|err| format!("reading stdin: {err}"))?;
            buf
        }
        Some(path) => {
            std::fs::read_to_string(path).map_err(|err| format!("reading {path}: {err}"))?
        }
    };
    parse_script(&text).map_err(|err| err.to_string())
}

fn main() -> ExitCode {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let path = args.next();
    if path.as_deref().is_some_and(|p| p == "-h" || p == "--help") || args.next().is_some() {
        eprintln!("usage: lazyseg-harness [SCRIPT | -]");
        return ExitCode::from(2);
    }

    let script = match generated_script().unwrap_or_else(|| read_script(path)) {
        Ok(script) => script,
        Err(err) => {
            eprintln!("lazyseg-harness: {err}");
            return ExitCode::from(2);
        }
    };

    let config = TreeConfig::from_env();
    match replay(&script, config) {
        Ok(report) => {
            println!("{}", report.to_json());
            if let Some(divergence) = &report.divergence {
                eprintln!("lazyseg-harness: {divergence}");
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            eprintln!("lazyseg-harness: {err}");
            ExitCode::from(2)
        }
    }
}
