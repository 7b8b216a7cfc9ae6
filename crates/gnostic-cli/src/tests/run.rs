//! Tests for the top-level runtime: argument handling and exit codes.

use std::ffi::OsString;
use std::process::ExitCode;

use rstest::rstest;
use tempfile::TempDir;

use super::support::{MockExecutor, PETSTORE_V2, write_source};
use crate::{IoStreams, run_with_executor};

struct Captured {
    exit: ExitCode,
    stdout: String,
    stderr: String,
}

fn invoke(args: &[&str]) -> Captured {
    let argv: Vec<OsString> = std::iter::once("gnostic")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect();
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut io = IoStreams::new(&mut stdout, &mut stderr);
    let exit = run_with_executor(argv, &mut io, MockExecutor::new());
    Captured {
        exit,
        stdout: String::from_utf8(stdout).expect("utf-8 stdout"),
        stderr: String::from_utf8(stderr).expect("utf-8 stderr"),
    }
}

#[test]
fn help_goes_to_stdout_and_succeeds() {
    let captured = invoke(&["--help"]);
    assert_eq!(captured.exit, ExitCode::SUCCESS);
    assert!(captured.stdout.contains("Usage: gnostic"), "{}", captured.stdout);
    assert!(captured.stdout.contains("--PLUGIN-out"), "{}", captured.stdout);
    assert!(captured.stderr.is_empty());
}

#[rstest]
#[case::no_directive(&["petstore.yaml"], "Missing output directives.")]
#[case::no_source(&["--json-out=-"], "No input specified.")]
fn usage_errors_print_help_to_stderr(#[case] args: &[&str], #[case] message: &str) {
    let captured = invoke(args);
    assert_eq!(captured.exit, ExitCode::FAILURE);
    assert!(captured.stderr.starts_with(message), "{}", captured.stderr);
    assert!(captured.stderr.contains("Usage: gnostic"), "{}", captured.stderr);
    assert!(captured.stdout.is_empty());
}

#[test]
fn unknown_option_is_a_usage_error() {
    let captured = invoke(&["petstore.yaml", "--pb-out=!", "--frobnicate"]);
    assert_eq!(captured.exit, ExitCode::FAILURE);
    assert!(captured.stderr.contains("--frobnicate"), "{}", captured.stderr);
}

#[test]
fn invalid_log_filter_is_reported() {
    let captured = invoke(&["petstore.yaml", "--pb-out=!", "--log-filter=gnostic=verbose"]);
    assert_eq!(captured.exit, ExitCode::FAILURE);
    assert!(captured.stderr.contains("invalid log filter"), "{}", captured.stderr);
}

#[test]
fn successful_run_prints_json_to_stdout() {
    let scratch = TempDir::new().expect("temp dir");
    let source = write_source(scratch.path(), "petstore.yaml", PETSTORE_V2);
    let captured = invoke(&[&source, "--json-out=-"]);
    assert_eq!(captured.exit, ExitCode::SUCCESS, "{}", captured.stderr);
    let json: serde_json::Value =
        serde_json::from_str(captured.stdout.trim_end()).expect("stdout is json");
    assert_eq!(json["swagger"], "2.0");
    assert!(captured.stdout.ends_with('\n'));
}
