//! End-to-end scenarios for the measurement pipeline
//!
//! Concrete sizes and values worked out by hand: the kernel chain on fresh
//! buffers, remainder truncation, bandwidth accounting, and full runs driven
//! by a deterministic clock.

use std::num::NonZeroUsize;

use caudal::bench::build_pool;
use caudal::calibrate::check_tick;
use caudal::clock::{MonotonicClock, SteppingClock};
use caudal::kernel::Kernel;
use caudal::report::{render_text, OutputFormat};
use caudal::runner::KernelRunner;
use caudal::stats::{bandwidth_mb_s, reduce, Traffic, TrialTimings};
use caudal::workspace::Workspace;
use caudal::{CaudalError, Precision, RunConfig, StreamBenchmark};

fn threads(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).expect("non-zero thread count")
}

// ============================================================================
// Kernel chain
// ============================================================================

#[test]
fn test_1200_elements_3_units_kernel_chain() {
    let pool = build_pool(3).unwrap();
    let clock = MonotonicClock::new();
    let mut ws = Workspace::<f64>::new(&pool, 1200, 3).unwrap();
    assert_eq!(ws.partition_size(), 400);

    let runner = KernelRunner::new(&pool, &clock, 2, 3.0);

    runner.time_kernel(&mut ws, Kernel::Copy);
    assert!(ws.units().iter().all(|u| u.c.iter().all(|&x| x == 1.0)));

    runner.time_kernel(&mut ws, Kernel::Scale);
    assert!(ws.units().iter().all(|u| u.b.iter().all(|&x| x == 3.0)));

    runner.time_kernel(&mut ws, Kernel::Add);
    assert!(ws.units().iter().all(|u| u.c.iter().all(|&x| x == 4.0)));

    runner.time_kernel(&mut ws, Kernel::Triad);
    assert!(ws.units().iter().all(|u| u.a.iter().all(|&x| x == 15.0)));
}

#[test]
fn test_single_precision_kernel_chain() {
    let pool = build_pool(2).unwrap();
    let clock = MonotonicClock::new();
    let mut ws = Workspace::<f32>::new(&pool, 64, 2).unwrap();
    let runner = KernelRunner::new(&pool, &clock, 2, 3.0);
    let mut timings = TrialTimings::new(2).unwrap();
    runner.run_trial(&mut ws, 0, &mut timings);
    for unit in ws.units() {
        assert!(unit.a.iter().all(|&x| x == 15.0f32));
        assert!(unit.b.iter().all(|&x| x == 3.0f32));
        assert!(unit.c.iter().all(|&x| x == 4.0f32));
    }
}

// ============================================================================
// Partitioning
// ============================================================================

#[test]
fn test_10_elements_4_units_drops_remainder() {
    let pool = build_pool(4).unwrap();
    let ws = Workspace::<f64>::new(&pool, 10, 4).unwrap();
    assert_eq!(ws.partition_size(), 2);
    assert_eq!(ws.dropped_elements(), 2);
    assert_eq!(ws.measured_elements(), 8);
    assert_eq!(ws.footprint().total_bytes, 3 * 8 * 2 * 4);
}

// ============================================================================
// Accounting
// ============================================================================

#[test]
fn test_copy_bandwidth_matches_formula() {
    let p = 500_000;
    let u = 4;
    let t = 0.002;
    let traffic = Traffic {
        element_bytes: 8,
        partition: p,
        units: u,
    };
    let row = vec![1.0, t, t * 2.0];
    let timings = TrialTimings::from_rows([row.clone(), row.clone(), row.clone(), row]).unwrap();
    let stats = reduce(&timings, &traffic);
    let copy = stats.get(Kernel::Copy).unwrap();
    let expected = (2 * 8 * p * u) as f64 / 1_048_576.0 / t;
    assert_eq!(copy.bandwidth_mb_s, expected);
    assert_eq!(bandwidth_mb_s(traffic.bytes(Kernel::Copy), t), expected);
}

// ============================================================================
// Full runs
// ============================================================================

#[test]
fn test_full_run_with_stepping_clock() {
    let step = 1.0 / 4096.0;
    let config = RunConfig::new()
        .with_elements(3000)
        .with_ntimes(5)
        .with_threads(threads(2));
    let report = StreamBenchmark::with_clock(config, SteppingClock::new(0.0, step))
        .run()
        .unwrap();

    assert_eq!(report.timings.ntimes(), 5);
    assert_eq!(report.partition_size, 1500);
    for row in &report.stats.kernels {
        assert_eq!(row.samples, 4);
        assert_eq!(row.min_time, step);
        let expected = row.bytes as f64 / 1_048_576.0 / step;
        assert_eq!(row.bandwidth_mb_s, expected);
    }
    let copy = report.stats.get(Kernel::Copy).unwrap();
    let add = report.stats.get(Kernel::Add).unwrap();
    assert_eq!(add.bytes * 2, copy.bytes * 3);
}

#[test]
fn test_full_run_real_clock_text_report() {
    let config = RunConfig::new()
        .with_elements(1 << 16)
        .with_ntimes(3)
        .with_precision(Precision::F32)
        .with_threads(threads(2));
    let report = StreamBenchmark::new(config).run().unwrap();
    for row in &report.stats.kernels {
        assert!(row.min_time <= row.max_time);
        assert!(row.min_time >= 0.0);
    }
    let text = render_text(&report);
    assert!(text.contains("This system uses 4 bytes per array element."));
    assert!(text.contains("Each kernel will be executed 3 times."));
    assert!(text.contains("Triad:"));
    assert!(caudal::report::render(&report, OutputFormat::Json).is_ok());
}

#[test]
fn test_invalid_configuration_aborts_before_allocation() {
    let config = RunConfig::new().with_elements(2).with_threads(threads(4));
    let err = StreamBenchmark::new(config).run().unwrap_err();
    assert!(matches!(err, CaudalError::InvalidConfiguration(_)));
}

#[test]
fn test_calibration_on_host_clock() {
    let g = check_tick(&MonotonicClock::new());
    assert!(g.effective_us >= 1);
    assert_eq!(g.effective_us, g.raw_us.max(1));
}
