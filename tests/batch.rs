//! Integration tests for the `batch` command.
use parcelsim::cli::{BatchOpts, handle_batch_command};
use parcelsim::settings::Settings;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

/// Get the path to the sample scenarios file.
fn get_scenarios_path() -> PathBuf {
    PathBuf::from("data/scenarios.csv")
}

/// An integration test for the `batch` command.
#[test]
fn test_handle_batch_command() {
    unsafe { std::env::set_var("PARCELSIM_LOG_LEVEL", "off") };

    let tempdir = tempdir().unwrap();
    let output_dir = tempdir.path().join("results");
    let opts = BatchOpts {
        output_dir: Some(output_dir.clone()),
        overwrite: false,
        parameters: Some(PathBuf::from("data/parameters.toml")),
    };
    handle_batch_command(&get_scenarios_path(), &opts, Some(Settings::default())).unwrap();

    let results = fs::read_to_string(output_dir.join("results.csv")).unwrap();
    let lines: Vec<_> = results.lines().collect();
    assert_eq!(lines.len(), 6); // header plus one row per scenario
    assert!(lines[4].starts_with("400,"));
    assert!(lines[4].ends_with(",6753.0,65.0,16"));

    assert!(output_dir.join("metadata.toml").is_file());
    assert!(output_dir.join("parcelsim_info.log").is_file());
    assert!(output_dir.join("parcelsim_error.log").is_file());

    // Second time will fail because the logging is already initialised
    let opts = BatchOpts {
        output_dir: Some(tempdir.path().join("results2")),
        ..Default::default()
    };
    assert_eq!(
        handle_batch_command(&get_scenarios_path(), &opts, Some(Settings::default()))
            .unwrap_err()
            .chain()
            .next()
            .unwrap()
            .to_string(),
        "Failed to initialise logging."
    );
}
