//! Runs the `breakpoints` binary and checks its exit status.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::{self, Command, ExitStatus};

fn payload_file(label: &str, contents: &str) -> PathBuf {
    let path = env::temp_dir().join(format!(
        "breakpoints_cli_{label}_{}.json",
        process::id()
    ));
    fs::write(&path, contents).unwrap();
    path
}

fn run(args: &[&str]) -> ExitStatus {
    Command::new(env!("CARGO_BIN_EXE_breakpoints"))
        .args(args)
        .env("BREAKPOINTS_WIDTHS", "320,1300")
        .status()
        .unwrap()
}

#[test]
fn builtin_payload_succeeds() {
    assert!(run(&[]).success());
}

#[test]
fn valid_payload_file_succeeds() {
    let path = payload_file("valid", r#"{"sm":"(min-width: 0em)","md":"(min-width: 48em)"}"#);
    let status = run(&[path.to_str().unwrap()]);
    fs::remove_file(&path).unwrap();
    assert!(status.success());
}

#[test]
fn malformed_payload_fails() {
    let path = payload_file("array", "[1,2]");
    let status = run(&[path.to_str().unwrap()]);
    fs::remove_file(&path).unwrap();
    assert!(!status.success(), "a non-object payload must fail, got {status}");
}

#[test]
fn unreadable_payload_file_fails() {
    let missing = env::temp_dir().join("breakpoints_cli_missing_payload.json");
    let status = run(&[missing.to_str().unwrap()]);
    assert!(!status.success(), "a missing file must fail, got {status}");
}
