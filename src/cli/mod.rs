//! CLI command implementation
//!
//! Argument handling and output live here, extracted from main.rs for
//! testability. The core never reads the environment; `OMP_NUM_THREADS` is
//! honoured only as a fallback for `--threads` at this layer.

// CLI glue code - relaxed lint requirements
#![allow(clippy::missing_errors_doc)]

use std::num::NonZeroUsize;

use clap::Parser;
use tracing::debug;

use crate::bench::StreamBenchmark;
use crate::config::{parse_element_count, Precision, RunConfig, DEFAULT_ELEMENTS, DEFAULT_NTIMES};
use crate::error::{CaudalError, Result};
use crate::report::{render, OutputFormat};
use crate::topology::available_threads;

/// caudal - sustainable memory bandwidth benchmark
///
/// Runs the Copy, Scale, Add and Triad kernels on per-thread arrays and
/// reports the best bandwidth of each, excluding the first iteration.
#[derive(Debug, Parser)]
#[command(name = "caudal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Total number of elements per array, split evenly across threads
    ///
    /// Anything other than exactly one value selects the default count.
    #[arg(value_name = "ELEMENTS", num_args = 0..)]
    pub elements: Vec<String>,

    /// Number of times each kernel is executed (values below 2 use the default)
    #[arg(short = 't', long, default_value_t = DEFAULT_NTIMES)]
    pub ntimes: usize,

    /// Element type: f32 or f64
    #[arg(short, long, default_value = "f64")]
    pub precision: String,

    /// Worker threads (defaults to OMP_NUM_THREADS, then the CPU count)
    ///
    /// A nested OpenMP list such as `4,2` uses its outermost level.
    #[arg(short = 'j', long, env = "OMP_NUM_THREADS", value_parser = parse_thread_count)]
    pub threads: Option<usize>,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Verbose logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Build the run configuration from parsed arguments
    pub fn to_config(&self) -> Result<RunConfig> {
        let elements = match self.elements.as_slice() {
            [raw] => parse_element_count(raw)?,
            _ => DEFAULT_ELEMENTS,
        };
        let precision: Precision = self.precision.parse()?;
        let threads = resolve_threads(self.threads)?;

        let config = RunConfig::new()
            .with_elements(elements)
            .with_ntimes(self.ntimes)
            .with_precision(precision)
            .with_threads(threads);
        config.validate()?;
        Ok(config)
    }

    /// Requested output format
    pub fn output_format(&self) -> Result<OutputFormat> {
        self.format.parse()
    }
}

/// Pick the thread count: explicit value, else every available CPU
pub fn resolve_threads(requested: Option<usize>) -> Result<NonZeroUsize> {
    match requested {
        Some(n) => NonZeroUsize::new(n).ok_or_else(|| {
            CaudalError::InvalidConfiguration("thread count must be at least 1".to_string())
        }),
        None => Ok(available_threads()),
    }
}

/// Parse a thread count, keeping the first entry of a comma-separated list
pub fn parse_thread_count(raw: &str) -> std::result::Result<usize, String> {
    let first = raw.split(',').next().unwrap_or(raw).trim();
    first
        .parse()
        .map_err(|_| format!("'{raw}' is not a valid thread count"))
}

/// Main CLI entrypoint: configure, run, print
pub fn entrypoint(cli: &Cli) -> Result<()> {
    let config = cli.to_config()?;
    let format = cli.output_format()?;
    debug!(?config, "starting run");

    let report = StreamBenchmark::new(config).run()?;
    print!("{}", render(&report, format)?);
    if format == OutputFormat::Json {
        println!();
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests.rs"]
mod cli_tests;
