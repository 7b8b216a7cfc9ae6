//! Command-line runtime for the gnostic compiler.
//!
//! The module owns argument parsing, option validation, telemetry
//! bootstrapping, and the orchestration of one compilation run. The runtime
//! is exercised both from the binary entrypoint and from tests, where the IO
//! streams and the plugin executor can be substituted.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use gnostic_plugins::PluginExecutor;
use gnostic_plugins::process::ProcessExecutor;

mod cli;
mod config;
mod errors;
mod orchestrator;
mod output;
pub mod telemetry;

#[cfg(test)]
mod tests;

use cli::Cli;
use config::{RunConfig, split_dynamic_arguments};
use errors::AppError;
use orchestrator::Orchestrator;

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) const fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

/// Runs the compiler using the provided arguments and IO handles.
///
/// Plugins are spawned as child processes found on `PATH`.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    run_with_executor(args, &mut io, ProcessExecutor::new())
}

/// Runs the compiler with a custom plugin executor.
pub(crate) fn run_with_executor<I, W, E, X>(
    args: I,
    io: &mut IoStreams<'_, W, E>,
    executor: X,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    X: PluginExecutor,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_dynamic_arguments(&args);

    let result = Cli::try_parse_from(split.cli_arguments)
        .map_err(AppError::CliUsage)
        .and_then(|cli| {
            telemetry::initialise(&cli.log_filter, cli.log_format)?;
            RunConfig::from_parts(cli, split.plugin_calls, split.extension_handlers)
        });

    match result {
        Ok(config) => Orchestrator::new(&config, executor).run(io).into(),
        Err(error) => report_usage(&error, io),
    }
}

/// Writes a failure that stopped the run before compilation began.
///
/// Requests for help or version text are not failures and go to stdout.
fn report_usage<W: Write, E: Write>(error: &AppError, io: &mut IoStreams<'_, W, E>) -> ExitCode {
    let informational = matches!(
        error,
        AppError::CliUsage(clap_error)
            if matches!(clap_error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
    );
    if informational {
        drop(write!(io.stdout, "{error}"));
        return ExitCode::SUCCESS;
    }
    drop(writeln!(io.stderr, "{error}"));
    if error.wants_help() {
        drop(writeln!(io.stderr, "\n{}", Cli::command().render_help()));
    }
    ExitCode::FAILURE
}
