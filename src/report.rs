//! Human-readable and JSON rendering of a [`BenchmarkReport`]
//!
//! The text layout follows the classic STREAM output so results can be
//! compared side by side with historical runs. The bandwidth column is
//! labelled "MB/s" but holds `bytes / 2^20 / seconds`; see [`crate::stats`].

use std::fmt::Write as _;

use crate::bench::BenchmarkReport;
use crate::error::Result;
use crate::workspace::MemoryFootprint;

/// Horizontal rule between report sections
pub const HLINE: &str = "-------------------------------------------------------------";

/// Output format of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// STREAM-style text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = crate::error::CaudalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(crate::error::CaudalError::InvalidConfiguration(format!(
                "Unknown output format '{other}' (expected text or json)"
            ))),
        }
    }
}

/// Render in the requested format
///
/// # Errors
///
/// Returns `Serialization` if JSON rendering fails.
pub fn render(report: &BenchmarkReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => render_json(report),
    }
}

/// Render as pretty JSON
///
/// # Errors
///
/// Returns `Serialization` if serde fails.
pub fn render_json(report: &BenchmarkReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render the full text report
#[must_use]
pub fn render_text(report: &BenchmarkReport) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_text(&mut out, report);
    out
}

fn write_text(out: &mut String, report: &BenchmarkReport) -> std::fmt::Result {
    let config = &report.config;
    let units = config.units();

    writeln!(out, "{HLINE}")?;
    writeln!(out, "caudal {} memory bandwidth benchmark", crate::VERSION)?;
    writeln!(out, "{HLINE}")?;
    writeln!(
        out,
        "This system uses {} bytes per array element.",
        report.element_bytes
    )?;
    writeln!(out, "{HLINE}")?;
    writeln!(out, "Each kernel will be executed {} times.", config.ntimes)?;
    writeln!(
        out,
        "The *best* time for each kernel (excluding the first iteration)"
    )?;
    writeln!(out, "will be used to compute the reported bandwidth.")?;
    writeln!(out, "{HLINE}")?;
    writeln!(out, "Total number of CPU: {}", report.online_cpus)?;
    writeln!(out, "Number of Threads requested = {units}")?;
    writeln!(out, "{HLINE}")?;
    for p in &report.placement {
        match p.cpu {
            Some(cpu) => writeln!(out, "Threads ID {} pinned on CPU {cpu}", p.worker)?,
            None => writeln!(out, "Threads ID {} pinned on CPU unknown", p.worker)?,
        }
    }
    writeln!(out, "{HLINE}")?;
    write_memory(out, report)?;
    writeln!(out, "{HLINE}")?;
    write_calibration(out, report)?;
    writeln!(out, "{HLINE}")?;
    write_table(out, report)?;
    writeln!(out, "{HLINE}")?;
    Ok(())
}

fn write_memory(out: &mut String, report: &BenchmarkReport) -> std::fmt::Result {
    let fp = &report.footprint;
    writeln!(
        out,
        "Array size = {} elements per thread ({} requested in total).",
        report.partition_size, report.config.elements
    )?;
    if report.dropped_elements > 0 {
        writeln!(
            out,
            "{} trailing elements do not divide evenly and are not measured.",
            report.dropped_elements
        )?;
    }
    writeln!(
        out,
        "Memory per array (a,b,c) = {:.1} MiB ({:.1} GiB).",
        MemoryFootprint::mib(fp.per_array_bytes),
        MemoryFootprint::gib(fp.per_array_bytes)
    )?;
    writeln!(
        out,
        "Memory required per threads = {:.1} MiB ({:.1} GiB).",
        MemoryFootprint::mib(fp.per_unit_bytes),
        MemoryFootprint::gib(fp.per_unit_bytes)
    )?;
    writeln!(
        out,
        "Total memory required ({} threads) = {:.1} MiB ({:.1} GiB).",
        fp.units,
        MemoryFootprint::mib(fp.total_bytes),
        MemoryFootprint::gib(fp.total_bytes)
    )
}

fn write_calibration(out: &mut String, report: &BenchmarkReport) -> std::fmt::Result {
    let g = &report.granularity;
    if g.is_sub_microsecond() {
        writeln!(
            out,
            "Your clock granularity appears to be less than one microsecond."
        )?;
    } else {
        writeln!(
            out,
            "Your clock granularity/precision appears to be {} microseconds.",
            g.raw_us
        )?;
    }
    writeln!(out, "{HLINE}")?;
    writeln!(
        out,
        "Each test below will take on the order of {} microseconds.",
        report.warmup.estimate_us
    )?;
    writeln!(out, "   (= {} clock ticks)", report.warmup.ticks())?;
    writeln!(out, "Increase the size of the arrays if this shows that")?;
    writeln!(
        out,
        "you are not getting at least {} microseconds per test.",
        report.warmup.recommended_min_us()
    )?;
    writeln!(out, "{HLINE}")?;
    writeln!(out, "WARNING -- The above is only a rough guideline.")?;
    writeln!(out, "For best results, please be sure you know the")?;
    writeln!(out, "precision of your system timer.")
}

/// Write the bandwidth table (header plus one row per kernel)
fn write_table(out: &mut String, report: &BenchmarkReport) -> std::fmt::Result {
    writeln!(
        out,
        "Function  Bandwidth (MB/s)  Avg time (s)  Min time (s)  Max time (s)"
    )?;
    for row in &report.stats.kernels {
        let label = format!("{}:", row.kernel.name());
        writeln!(
            out,
            "{label:<11}{:8.0}  {:16.6}  {:13.6}  {:12.6}",
            row.bandwidth_mb_s, row.avg_time, row.min_time, row.max_time
        )?;
    }
    Ok(())
}

/// Only the bandwidth table, for compact output
#[must_use]
pub fn render_table(report: &BenchmarkReport) -> String {
    let mut out = String::new();
    let _ = write_table(&mut out, report);
    out
}
