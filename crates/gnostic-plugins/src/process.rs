//! Process-based plugin execution.
//!
//! [`ProcessExecutor`] implements the [`PluginExecutor`] trait by locating
//! the plugin executable on the search path, spawning it with every standard
//! stream piped, writing the encoded request to stdin, and reading stdout and
//! stderr to end-of-stream. Whatever the plugin wrote to stderr is copied
//! unmodified to the caller's diagnostic writer once the streams close, on
//! success and failure alike.

use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

use crate::error::PluginError;
use crate::runner::PluginExecutor;

/// Tracing target for plugin process operations.
const PROCESS_TARGET: &str = "gnostic_plugins::process";

/// Executes plugins by spawning child processes.
///
/// By default the executable is looked up on `PATH`; a different search
/// path may be supplied with [`ProcessExecutor::with_search_path`].
///
/// # Example
///
/// ```rust,no_run
/// use gnostic_plugins::process::ProcessExecutor;
/// use gnostic_plugins::runner::PluginExecutor;
///
/// let executor = ProcessExecutor::new();
/// let response = executor.execute("gnostic-lint", &[]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    search_path: Option<OsString>,
}

impl ProcessExecutor {
    /// Creates an executor that searches `PATH`.
    #[must_use]
    pub const fn new() -> Self {
        Self { search_path: None }
    }

    /// Creates an executor that searches `search_path` instead of `PATH`.
    #[must_use]
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }

    fn locate(&self, executable: &str) -> Result<PathBuf, PluginError> {
        let found = match &self.search_path {
            Some(paths) => which::which_in(executable, Some(paths), Path::new(".")),
            None => which::which(executable),
        };
        found.map_err(|_| PluginError::ExecutableNotFound {
            executable: executable.to_owned(),
        })
    }
}

impl PluginExecutor for ProcessExecutor {
    fn execute(&self, executable: &str, request: &[u8]) -> Result<Vec<u8>, PluginError> {
        self.execute_forwarding(executable, request, &mut io::stderr())
    }

    fn execute_forwarding(
        &self,
        executable: &str,
        request: &[u8],
        diagnostic: &mut dyn Write,
    ) -> Result<Vec<u8>, PluginError> {
        let program = self.locate(executable)?;
        debug!(
            target: PROCESS_TARGET,
            plugin = executable,
            program = %program.display(),
            "spawning plugin process"
        );

        let mut child = Command::new(&program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| PluginError::SpawnFailed {
                executable: executable.to_owned(),
                message: err.to_string(),
                source: Some(Arc::new(err)),
            })?;

        let exchanged = exchange(executable, &mut child, request, diagnostic);
        let (output, status) = reap(executable, &mut child, exchanged)?;
        debug!(
            target: PROCESS_TARGET,
            plugin = executable,
            ?status,
            response_bytes = output.len(),
            "plugin process exited"
        );

        if !status.success() {
            let code = status.code().unwrap_or(-1);
            if output.is_empty() {
                return Err(PluginError::NonZeroExit {
                    executable: executable.to_owned(),
                    status: code,
                });
            }
            warn!(
                target: PROCESS_TARGET,
                plugin = executable,
                status = code,
                "plugin exited unsuccessfully but produced output; parsing it"
            );
        }
        Ok(output)
    }
}

/// Waits for `child`, killing it first when the exchange failed, so no
/// error path leaves an unreaped process behind.
pub(crate) fn reap(
    executable: &str,
    child: &mut Child,
    exchanged: Result<Vec<u8>, PluginError>,
) -> Result<(Vec<u8>, ExitStatus), PluginError> {
    if exchanged.is_err() {
        drop(child.kill());
    }
    let waited = child.wait();
    let output = exchanged?;
    let status = waited.map_err(|err| io_error(executable, err))?;
    Ok((output, status))
}

/// Writes `request` to the child's stdin while draining stdout and stderr.
///
/// The write and the stderr drain happen on scoped threads so a plugin that
/// fills one pipe before consuming its input cannot deadlock. Captured
/// stderr is forwarded to `diagnostic` before any error is returned.
fn exchange(
    executable: &str,
    child: &mut Child,
    request: &[u8],
    diagnostic: &mut dyn Write,
) -> Result<Vec<u8>, PluginError> {
    let stdin = child.stdin.take().ok_or_else(|| capture_failed(executable, "stdin"))?;
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| capture_failed(executable, "stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| capture_failed(executable, "stderr"))?;

    debug!(
        target: PROCESS_TARGET,
        plugin = executable,
        request_bytes = request.len(),
        "writing request to plugin stdin"
    );

    thread::scope(|scope| {
        let writer = scope.spawn(|| write_request(stdin, request));
        let drain = scope.spawn(|| read_diagnostics(stderr));
        let mut output = Vec::new();
        let read = stdout.read_to_end(&mut output);
        let written = writer
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("stdin writer thread panicked")));
        let diagnostics = drain
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("stderr reader thread panicked")));

        forward_diagnostics(executable, diagnostics, diagnostic);
        read.map_err(|err| io_error(executable, err))?;
        match written {
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                debug!(
                    target: PROCESS_TARGET,
                    plugin = executable,
                    "plugin closed stdin before reading the full request"
                );
            }
            other => other.map_err(|err| io_error(executable, err))?,
        }
        Ok(output)
    })
}

fn read_diagnostics(mut stderr: ChildStderr) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    stderr.read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Copies plugin stderr to `diagnostic`; failures here never fail the call.
fn forward_diagnostics(
    executable: &str,
    diagnostics: io::Result<Vec<u8>>,
    diagnostic: &mut dyn Write,
) {
    let forwarded = diagnostics.and_then(|bytes| {
        if bytes.is_empty() {
            return Ok(());
        }
        diagnostic.write_all(&bytes)?;
        diagnostic.flush()
    });
    if let Err(err) = forwarded {
        warn!(
            target: PROCESS_TARGET,
            plugin = executable,
            error = %err,
            "failed to forward plugin stderr"
        );
    }
}

fn capture_failed(executable: &str, stream: &str) -> PluginError {
    PluginError::SpawnFailed {
        executable: executable.to_owned(),
        message: format!("failed to capture {stream}"),
        source: None,
    }
}

/// Writes the request and closes the pipe by dropping it.
fn write_request(mut stdin: ChildStdin, request: &[u8]) -> io::Result<()> {
    stdin.write_all(request)?;
    stdin.flush()
}

fn io_error(executable: &str, err: io::Error) -> PluginError {
    PluginError::Io {
        executable: executable.to_owned(),
        source: Arc::new(err),
    }
}
