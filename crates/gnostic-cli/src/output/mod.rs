//! Output multiplexing for compiled documents and error reports.
//!
//! Every artefact location goes through [`Sink::for_artifact`]. Streams get
//! the bytes followed by a newline; an existing directory receives
//! `<source-stem>.<extension>`; any other path is created or truncated.

use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use gnostic_document::{CompiledDocument, Format};
use gnostic_plugins::Sink;
use tracing::{error, info};

use crate::IoStreams;
use crate::config::RunConfig;
use crate::errors::AppError;

/// Tracing target for output operations.
const OUTPUT_TARGET: &str = "gnostic_cli::output";

/// Extension used when the error sink names a directory.
const ERRORS_EXTENSION: &str = "errors";

/// Stem used when the source name has no usable file stem.
const FALLBACK_STEM: &str = "gnostic";

/// How a file sink treats existing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Truncate,
    Append,
}

/// Builds `<directory>/<source-stem>.<extension>`.
pub(crate) fn artifact_path(directory: &Path, source_name: &str, extension: &str) -> PathBuf {
    let stem = Path::new(source_name)
        .file_stem()
        .map_or_else(|| FALLBACK_STEM.into(), |stem| stem.to_string_lossy());
    directory.join(format!("{stem}.{extension}"))
}

fn write_artifact<W: Write, E: Write>(
    location: &str,
    source_name: &str,
    extension: &str,
    bytes: &[u8],
    mode: WriteMode,
    io: &mut IoStreams<'_, W, E>,
) -> Result<(), AppError> {
    let path = match Sink::for_artifact(location) {
        Sink::Discard => return Ok(()),
        Sink::PrimaryStream => return write_stream(&mut *io.stdout, bytes, "-"),
        Sink::DiagnosticStream => return write_stream(&mut *io.stderr, bytes, "="),
        Sink::Directory(directory) => artifact_path(&directory, source_name, extension),
        Sink::File(path) => path,
    };
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(mode == WriteMode::Append)
        .truncate(mode == WriteMode::Truncate)
        .open(&path)
        .map_err(|err| AppError::write_artifact(&path, err))?;
    file.write_all(bytes)
        .map_err(|err| AppError::write_artifact(&path, err))?;
    info!(
        target: OUTPUT_TARGET,
        path = %path.display(),
        bytes = bytes.len(),
        "wrote artefact"
    );
    Ok(())
}

fn write_stream(stream: &mut dyn Write, bytes: &[u8], label: &str) -> Result<(), AppError> {
    stream
        .write_all(bytes)
        .and_then(|()| stream.write_all(b"\n"))
        .and_then(|()| stream.flush())
        .map_err(|err| AppError::write_artifact(label, err))
}

/// Routes error messages to the configured error sink.
///
/// Messages read `Errors reading <source>` followed by the error. Within one
/// run the first message to a file truncates it and later ones append.
#[derive(Debug)]
pub(crate) struct ErrorReporter {
    location: String,
    source_name: String,
    reported: usize,
}

impl ErrorReporter {
    pub(crate) fn new(location: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            source_name: source_name.into(),
            reported: 0,
        }
    }

    /// Returns how many errors have been reported.
    pub(crate) const fn reported(&self) -> usize {
        self.reported
    }

    pub(crate) fn report<W: Write, E: Write>(
        &mut self,
        failure: &dyn Display,
        io: &mut IoStreams<'_, W, E>,
    ) {
        let message = format!("Errors reading {}\n{failure}", self.source_name);
        let mode = if self.reported == 0 {
            WriteMode::Truncate
        } else {
            WriteMode::Append
        };
        self.reported += 1;

        let mut bytes = message.into_bytes();
        if !Sink::for_artifact(&self.location).is_stream() {
            bytes.push(b'\n');
        }
        if let Err(write_failure) = write_artifact(
            &self.location,
            &self.source_name,
            ERRORS_EXTENSION,
            &bytes,
            mode,
            io,
        ) {
            error!(
                target: OUTPUT_TARGET,
                location = %self.location,
                error = %write_failure,
                "unable to write to the error sink"
            );
        }
    }
}

/// Writes every configured serialisation of `document`.
///
/// A failure in one format is reported and counted; the remaining formats
/// are still attempted. Returns the number of failures.
pub(crate) fn emit_artifacts<W: Write, E: Write>(
    document: &CompiledDocument,
    config: &RunConfig,
    reporter: &mut ErrorReporter,
    io: &mut IoStreams<'_, W, E>,
) -> usize {
    let mut failures = 0;
    for (format, location) in config.artifact_locations() {
        if let Err(failure) = emit(document, format, location, config.source(), io) {
            reporter.report(&failure, io);
            failures += 1;
        }
    }
    failures
}

fn emit<W: Write, E: Write>(
    document: &CompiledDocument,
    format: Format,
    location: &str,
    source_name: &str,
    io: &mut IoStreams<'_, W, E>,
) -> Result<(), AppError> {
    let bytes = document.serialise(format)?;
    write_artifact(
        location,
        source_name,
        format.extension(),
        &bytes,
        WriteMode::Truncate,
        io,
    )
}
