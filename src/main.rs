//! Caudal CLI - memory bandwidth benchmark
//!
//! ```text
//! caudal [ELEMENTS] [--ntimes N] [--precision f32|f64] [--threads N] [--format text|json]
//! ```

use std::process::ExitCode;

use caudal::cli::{entrypoint, Cli};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins; otherwise `--verbose` selects `debug` and the default is
/// `warn` so stdout carries only the report.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match entrypoint(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[ERROR] {e}");
            ExitCode::FAILURE
        },
    }
}
