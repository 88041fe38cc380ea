//! Integration test: run the demo binary

use std::path::PathBuf;
use std::process::Command;

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("cdrscroll-cli-{}-{}", std::process::id(), name))
}

fn binary() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cdrscroll"));
    // Keep the user's config file out of the run.
    cmd.env("CDRSCROLL_CONFIG", scratch_path("absent.toml"));
    cmd.env_remove("CDRSCROLL_ROW_HEIGHT");
    cmd.env_remove("CDRSCROLL_DEBUG");
    cmd
}

#[test]
fn binary_prints_version() {
    let output = binary()
        .arg("--version")
        .output()
        .expect("Failed to execute binary");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("0.1.0"),
        "Expected output to contain version '0.1.0', but got: {}",
        stdout
    );
}

#[test]
fn binary_prints_session_report() {
    let log_file = scratch_path("session.log");
    let output = binary()
        .args(["--rows", "500", "--steps", "3", "--step-px", "2000", "--log-file"])
        .arg(&log_file)
        .output()
        .expect("Failed to execute binary");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(report["initial"]["outcome"], "rendered");
    assert_eq!(report["steps"].as_array().map(Vec::len), Some(3));
    assert_eq!(report["status"]["dataCount"], 500);
    assert!(log_file.exists(), "log written to --log-file");

    let _ = std::fs::remove_file(log_file);
}

#[test]
fn binary_rejects_unreadable_input() {
    let output = binary()
        .arg("--input")
        .arg(scratch_path("missing.json"))
        .arg("--log-file")
        .arg(scratch_path("missing-input.log"))
        .output()
        .expect("Failed to execute binary");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot read"));
}
