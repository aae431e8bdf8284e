//! Integration tests for the CLI application
//!
//! These spawn the compiled `digit-svc` binary and check its output.

use std::process::{Command, Output};

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_digit-svc"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI")
}

#[test]
fn test_cli_text_report() {
    let output = run_cli(&[]);
    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Loading digits dataset"));
    assert!(stdout.contains("898 training samples, 899 test samples"));
    assert!(stdout.contains("Accuracy: 0."));
    assert!(stdout.contains("weighted avg"));
    assert!(stdout.contains("Classification complete."));

    let sample_numbers: Vec<usize> = stdout
        .lines()
        .filter(|line| line.starts_with("Sample ") && line.contains("Predicted="))
        .map(|line| {
            line["Sample ".len()..]
                .split(':')
                .next()
                .and_then(|n| n.parse().ok())
                .expect("Sample line should be numbered")
        })
        .collect();
    assert_eq!(sample_numbers, (1..=10).collect::<Vec<_>>());
}

#[test]
fn test_cli_json_summary() {
    let output = run_cli(&["--json"]);
    assert!(output.status.success());

    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
    assert_eq!(summary["n_samples"], 1797);
    assert_eq!(summary["n_train"], 898);
    assert_eq!(summary["n_test"], 899);
    assert_eq!(summary["samples"].as_array().map(Vec::len), Some(10));
    assert!(summary["accuracy"].as_f64().unwrap() > 0.90);
    assert!(summary["generated_at"].is_string());
}

#[test]
fn test_cli_verbose_logs_to_stderr() {
    let output = run_cli(&["--verbose"]);
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Fitted SVC"));
}

#[test]
fn test_cli_rejects_unknown_flag() {
    let output = run_cli(&["--no-such-flag"]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_version() {
    let output = run_cli(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}
