//! Crate-level tests running real plugin processes.
//!
//! Each test writes a small shell script named `gnostic-<name>` into a
//! scratch directory and points a [`ProcessExecutor`] at that directory.

#![cfg(unix)]

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Stdio};

use prost::Message;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::error::PluginError;
use crate::process::{ProcessExecutor, reap};
use crate::protocol::{File, Response, Wrapper};
use crate::runner::{PluginCall, PluginExecutor, PluginRunner};

#[fixture]
fn bin_dir() -> TempDir {
    TempDir::new().expect("temp dir")
}

fn install_script(dir: &Path, name: &str, body: &str) {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
}

/// Installs a plugin that drains stdin, prints `response`, and exits with
/// `status`.
fn install_plugin(dir: &Path, name: &str, response: &Response, status: i32) {
    let payload = dir.join(format!("{name}.response"));
    fs::write(&payload, response.encode_to_vec()).expect("write response");
    install_script(
        dir,
        name,
        &format!("cat > /dev/null\ncat '{}'\nexit {status}", payload.display()),
    );
}

fn executor_for(dir: &Path) -> ProcessExecutor {
    ProcessExecutor::with_search_path(dir.as_os_str())
}

#[rstest]
fn runner_writes_files_from_a_real_process(bin_dir: TempDir) {
    let response = Response::success(vec![File::new("hello.txt", "hello")]);
    install_plugin(bin_dir.path(), "gnostic-hello", &response, 0);
    let out = bin_dir.path().join("out");

    let runner = PluginRunner::new(executor_for(bin_dir.path()));
    let call = PluginCall::new("hello", out.display().to_string());
    let files = runner
        .perform(
            &call,
            &Wrapper::new("petstore.yaml", "v2", vec![1, 2, 3]),
            &mut io::sink(),
            &mut io::sink(),
        )
        .expect("plugin call");

    assert_eq!(files, 1);
    assert_eq!(
        fs::read_to_string(out.join("hello.txt")).expect("hello.txt"),
        "hello"
    );
}

#[rstest]
fn plugin_receives_the_encoded_request(bin_dir: TempDir) {
    let captured = bin_dir.path().join("captured.bin");
    install_script(
        bin_dir.path(),
        "gnostic-capture",
        &format!("cat > '{}'", captured.display()),
    );

    let request = [0x12, 0x01, b'-'];
    let output = executor_for(bin_dir.path())
        .execute("gnostic-capture", &request)
        .expect("execute");

    assert!(output.is_empty());
    assert_eq!(fs::read(captured).expect("captured"), request);
}

#[rstest]
fn silent_failure_is_a_non_zero_exit(bin_dir: TempDir) {
    install_script(bin_dir.path(), "gnostic-fail", "cat > /dev/null\nexit 3");
    let error = executor_for(bin_dir.path())
        .execute("gnostic-fail", &[])
        .expect_err("non-zero exit");
    assert!(
        matches!(error, PluginError::NonZeroExit { status: 3, ref executable } if executable == "gnostic-fail"),
        "unexpected error: {error}"
    );
}

#[rstest]
fn failing_plugin_output_is_still_returned(bin_dir: TempDir) {
    let response = Response::failure(vec!["partial".into()]);
    install_plugin(bin_dir.path(), "gnostic-partial", &response, 1);
    let output = executor_for(bin_dir.path())
        .execute("gnostic-partial", &[])
        .expect("output despite failure");
    assert_eq!(
        Response::from_bytes("gnostic-partial", &output).expect("decodes"),
        response
    );
}

#[rstest]
fn plugin_ignoring_stdin_does_not_fail_the_call(bin_dir: TempDir) {
    install_script(bin_dir.path(), "gnostic-deaf", "exit 0");
    let request = vec![0_u8; 1 << 20];
    let output = executor_for(bin_dir.path())
        .execute("gnostic-deaf", &request)
        .expect("broken pipe tolerated");
    assert!(output.is_empty());
}

#[rstest]
fn missing_executable_is_reported(bin_dir: TempDir) {
    let error = executor_for(bin_dir.path())
        .execute("gnostic-absent", &[])
        .expect_err("not found");
    assert!(matches!(
        error,
        PluginError::ExecutableNotFound { ref executable } if executable == "gnostic-absent"
    ));
}

#[rstest]
fn plugin_stderr_reaches_the_diagnostic_writer(bin_dir: TempDir) {
    let response = Response::success(vec![File::new("hello.txt", "hello")]);
    let payload = bin_dir.path().join("noisy.response");
    fs::write(&payload, response.encode_to_vec()).expect("write response");
    install_script(
        bin_dir.path(),
        "gnostic-noisy",
        &format!(
            "cat > /dev/null\necho 'warning: deprecated field' >&2\ncat '{}'",
            payload.display()
        ),
    );
    let out = bin_dir.path().join("out");
    let mut diagnostic = Vec::new();

    let runner = PluginRunner::new(executor_for(bin_dir.path()));
    let files = runner
        .perform(
            &PluginCall::new("noisy", out.display().to_string()),
            &Wrapper::new("petstore.yaml", "v2", vec![1]),
            &mut io::sink(),
            &mut diagnostic,
        )
        .expect("plugin call");

    assert_eq!(files, 1);
    assert_eq!(
        String::from_utf8(diagnostic).expect("utf-8"),
        "warning: deprecated field\n"
    );
}

#[rstest]
fn stderr_is_forwarded_when_the_plugin_fails(bin_dir: TempDir) {
    install_script(
        bin_dir.path(),
        "gnostic-broken",
        "cat > /dev/null\necho 'fatal: schema too large' >&2\nexit 3",
    );
    let mut diagnostic = Vec::new();

    let error = executor_for(bin_dir.path())
        .execute_forwarding("gnostic-broken", &[1, 2, 3], &mut diagnostic)
        .expect_err("non-zero exit");

    assert!(matches!(error, PluginError::NonZeroExit { status: 3, .. }), "{error}");
    assert_eq!(
        String::from_utf8(diagnostic).expect("utf-8"),
        "fatal: schema too large\n"
    );
}

#[rstest]
fn failed_exchange_still_reaps_the_child(bin_dir: TempDir) {
    install_script(bin_dir.path(), "gnostic-slow", "exec sleep 30");
    let mut child = Command::new(bin_dir.path().join("gnostic-slow"))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .spawn()
        .expect("spawn");
    let failure = Err(PluginError::SpawnFailed {
        executable: "gnostic-slow".into(),
        message: "failed to capture stdout".into(),
        source: None,
    });

    let error = reap("gnostic-slow", &mut child, failure).expect_err("exchange failure");

    assert!(matches!(error, PluginError::SpawnFailed { .. }));
    assert!(child.try_wait().expect("status").is_some());
}
