//! kao - a per-identifier, filesystem-backed cache store
//!
//! kao provides:
//! - Identifier hashing into filesystem-safe directory names
//! - Timestamped generations with a current-pointer file per identifier
//! - Age-based pruning and full identifier teardown
//! - Unified output format (jsonl/json/raw)

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::core::error::CacheError;

mod cache;
mod cli;
mod core;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error[{}]: {:#}", error_code(&err), err);
            ExitCode::FAILURE
        }
    }
}

/// Stable code of the cache error behind `err`, if any
fn error_code(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<CacheError>()
        .map(CacheError::code)
        .unwrap_or("ERROR")
}

/// Log to stderr; RUST_LOG overrides the level picked from -v/-q
fn init_tracing(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
