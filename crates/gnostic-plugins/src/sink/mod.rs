//! Resolution of output locations to concrete write behaviour.
//!
//! A location is either one of three sentinels or a filesystem path:
//!
//! | Location | Sink |
//! |----------|------|
//! | `!` | [`Sink::Discard`] |
//! | `-` | [`Sink::PrimaryStream`] (stdout) |
//! | `=` | [`Sink::DiagnosticStream`] (stderr) |
//! | existing directory | [`Sink::Directory`] |
//! | anything else | [`Sink::File`] for artefacts, [`Sink::Directory`] for plugins |
//!
//! Plugin locations that name an existing non-directory resolve to
//! [`Sink::File`], which refuses plugin output with
//! [`PluginError::OutputConflict`].

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::PluginError;
use crate::protocol::File;

/// Tracing target for sink operations.
const SINK_TARGET: &str = "gnostic_plugins::sink";

/// Separator written after each file name when plugin output goes to a
/// stream.
const STREAM_SEPARATOR: &str = " -------------------- ";

/// A resolved destination for produced bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    /// Drop the payload without writing anything.
    Discard,
    /// Write to standard output.
    PrimaryStream,
    /// Write to standard error.
    DiagnosticStream,
    /// Write named files inside this directory.
    Directory(PathBuf),
    /// Write to this file path.
    File(PathBuf),
}

impl Sink {
    /// Resolves the location of a fixed-format artefact.
    ///
    /// # Example
    ///
    /// ```
    /// use gnostic_plugins::Sink;
    /// use std::path::PathBuf;
    ///
    /// assert_eq!(Sink::for_artifact("!"), Sink::Discard);
    /// assert_eq!(Sink::for_artifact("-"), Sink::PrimaryStream);
    /// assert_eq!(Sink::for_artifact("out.pb"), Sink::File(PathBuf::from("out.pb")));
    /// ```
    #[must_use]
    pub fn for_artifact(location: &str) -> Self {
        sentinel(location).unwrap_or_else(|| {
            let path = PathBuf::from(location);
            if path.is_dir() {
                Self::Directory(path)
            } else {
                Self::File(path)
            }
        })
    }

    /// Resolves the output location of a plugin call.
    ///
    /// Paths that do not exist yet are directories to be created.
    #[must_use]
    pub fn for_plugin(location: &str) -> Self {
        sentinel(location).unwrap_or_else(|| {
            let path = PathBuf::from(location);
            if path.exists() && !path.is_dir() {
                Self::File(path)
            } else {
                Self::Directory(path)
            }
        })
    }

    /// Returns whether this sink is one of the two streams.
    #[must_use]
    pub const fn is_stream(&self) -> bool {
        matches!(self, Self::PrimaryStream | Self::DiagnosticStream)
    }

    /// Writes the files of a successful plugin response.
    ///
    /// Stream sinks receive each file as a blank line, the file name, a
    /// separator, and the raw bytes. Directory sinks create the directory
    /// (and any intermediate directories a file name implies) and write
    /// `<directory>/<name>` for every file.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::OutputConflict`] for a [`Sink::File`],
    /// [`PluginError::UnsafeFileName`] when a name would escape the
    /// directory, and [`PluginError::WriteOutput`] when a write fails.
    pub fn write_plugin_files(
        &self,
        executable: &str,
        files: &[File],
        primary: &mut dyn Write,
        diagnostic: &mut dyn Write,
    ) -> Result<(), PluginError> {
        match self {
            Self::Discard => Ok(()),
            Self::PrimaryStream => write_to_stream(files, primary, "-"),
            Self::DiagnosticStream => write_to_stream(files, diagnostic, "="),
            Self::File(path) => Err(PluginError::OutputConflict { path: path.clone() }),
            Self::Directory(directory) => write_to_directory(executable, files, directory),
        }
    }
}

fn sentinel(location: &str) -> Option<Sink> {
    match location {
        "!" => Some(Sink::Discard),
        "-" => Some(Sink::PrimaryStream),
        "=" => Some(Sink::DiagnosticStream),
        _ => None,
    }
}

fn write_to_stream(
    files: &[File],
    stream: &mut dyn Write,
    label: &str,
) -> Result<(), PluginError> {
    let result = files.iter().try_for_each(|file| {
        write!(stream, "\n\n{}{STREAM_SEPARATOR}\n", file.name)?;
        stream.write_all(&file.data)
    });
    result
        .and_then(|()| stream.flush())
        .map_err(|err| PluginError::WriteOutput {
            path: PathBuf::from(label),
            source: Arc::new(err),
        })
}

fn write_to_directory(
    executable: &str,
    files: &[File],
    directory: &Path,
) -> Result<(), PluginError> {
    create_directory(directory)?;
    for file in files {
        let relative = safe_relative_path(executable, &file.name)?;
        let target = directory.join(relative);
        if let Some(parent) = target.parent() {
            create_directory(parent)?;
        }
        fs::write(&target, &file.data).map_err(|err| write_error(&target, err))?;
        info!(
            target: SINK_TARGET,
            plugin = executable,
            path = %target.display(),
            bytes = file.data.len(),
            "wrote plugin file"
        );
    }
    Ok(())
}

fn create_directory(directory: &Path) -> Result<(), PluginError> {
    if directory.as_os_str().is_empty() {
        return Ok(());
    }
    if directory.exists() && !directory.is_dir() {
        return Err(PluginError::OutputConflict {
            path: directory.to_path_buf(),
        });
    }
    debug!(
        target: SINK_TARGET,
        path = %directory.display(),
        "ensuring output directory"
    );
    fs::create_dir_all(directory).map_err(|err| write_error(directory, err))
}

fn write_error(path: &Path, err: io::Error) -> PluginError {
    PluginError::WriteOutput {
        path: path.to_path_buf(),
        source: Arc::new(err),
    }
}

/// Rejects response file names that are empty, absolute, or traverse upward.
fn safe_relative_path<'a>(executable: &str, name: &'a str) -> Result<&'a Path, PluginError> {
    let path = Path::new(name);
    let unsafe_name = path.is_absolute()
        || path.components().all(|c| matches!(c, Component::CurDir))
        || path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_) | Component::RootDir));
    if unsafe_name {
        return Err(PluginError::UnsafeFileName {
            executable: executable.to_owned(),
            name: name.to_owned(),
        });
    }
    Ok(path)
}

#[cfg(test)]
mod tests;
