//! CLI entrypoint for the gnostic compiler.
//!
//! The binary delegates to [`gnostic_cli::run`], which parses the command
//! line, compiles the source description, writes the requested artefacts,
//! and runs the requested plugins.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    gnostic_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
