use clap::Parser;

use super::*;

// -------------------------------------------------------------------------
// Argument Parsing Tests
// -------------------------------------------------------------------------

#[test]
fn test_defaults_without_arguments() {
    let cli = Cli::try_parse_from(["caudal", "--threads", "2"]).unwrap();
    let config = cli.to_config().unwrap();
    assert_eq!(config.elements, DEFAULT_ELEMENTS);
    assert_eq!(config.ntimes, DEFAULT_NTIMES);
    assert_eq!(config.precision, Precision::F64);
    assert_eq!(config.units(), 2);
}

#[test]
fn test_positional_element_count() {
    let cli = Cli::try_parse_from(["caudal", "1200", "-j", "3"]).unwrap();
    let config = cli.to_config().unwrap();
    assert_eq!(config.elements, 1200);
    assert_eq!(config.units(), 3);
}

#[test]
fn test_zero_element_count_is_rejected() {
    let cli = Cli::try_parse_from(["caudal", "0", "-j", "1"]).unwrap();
    let err = cli.to_config().unwrap_err();
    assert!(matches!(err, CaudalError::InvalidConfiguration(_)));
}

#[test]
fn test_malformed_element_count_is_rejected() {
    let cli = Cli::try_parse_from(["caudal", "12abc", "-j", "1"]).unwrap();
    assert!(cli.to_config().is_err());
}

#[test]
fn test_ntimes_of_one_is_normalized() {
    let cli = Cli::try_parse_from(["caudal", "100", "-t", "1", "-j", "1"]).unwrap();
    assert_eq!(cli.to_config().unwrap().ntimes, DEFAULT_NTIMES);
}

#[test]
fn test_precision_flag() {
    let cli = Cli::try_parse_from(["caudal", "-p", "f32", "-j", "1"]).unwrap();
    assert_eq!(cli.to_config().unwrap().precision, Precision::F32);

    let cli = Cli::try_parse_from(["caudal", "-p", "f128", "-j", "1"]).unwrap();
    assert!(cli.to_config().is_err());
}

#[test]
fn test_output_format_flag() {
    let cli = Cli::try_parse_from(["caudal", "--format", "json", "-j", "1"]).unwrap();
    assert_eq!(cli.output_format().unwrap(), OutputFormat::Json);
}

#[test]
fn test_extra_positional_falls_back_to_default_count() {
    let cli = Cli::try_parse_from(["caudal", "10", "20", "-j", "1"]).unwrap();
    assert_eq!(cli.to_config().unwrap().elements, DEFAULT_ELEMENTS);
}

// -------------------------------------------------------------------------
// Thread Count Parsing Tests
// -------------------------------------------------------------------------

#[test]
fn test_thread_list_uses_outermost_level() {
    let cli = Cli::try_parse_from(["caudal", "100", "-j", "4,2"]).unwrap();
    assert_eq!(cli.threads, Some(4));
    assert_eq!(cli.to_config().unwrap().units(), 4);
}

#[test]
fn test_parse_thread_count() {
    assert_eq!(parse_thread_count("8"), Ok(8));
    assert_eq!(parse_thread_count(" 3 ,1"), Ok(3));
    assert!(parse_thread_count("many").is_err());
    assert!(parse_thread_count(",2").is_err());
}

// -------------------------------------------------------------------------
// Thread Resolution Tests
// -------------------------------------------------------------------------

#[test]
fn test_resolve_threads_explicit() {
    assert_eq!(resolve_threads(Some(6)).unwrap().get(), 6);
}

#[test]
fn test_resolve_threads_zero_rejected() {
    assert!(resolve_threads(Some(0)).is_err());
}

#[test]
fn test_resolve_threads_default_is_positive() {
    assert!(resolve_threads(None).unwrap().get() >= 1);
}

#[test]
fn test_more_threads_than_elements_rejected() {
    let cli = Cli::try_parse_from(["caudal", "3", "-j", "4"]).unwrap();
    assert!(cli.to_config().is_err());
}

#[test]
fn test_entrypoint_small_run() {
    let cli = Cli::try_parse_from(["caudal", "4096", "-t", "2", "-j", "2", "-f", "json"]).unwrap();
    assert!(entrypoint(&cli).is_ok());
}
