//! Domain errors raised by plugin operations.
//!
//! All errors use `thiserror`-derived enums with structured context so callers
//! can inspect the failure programmatically. I/O errors are wrapped in `Arc`
//! to satisfy the `result_large_err` Clippy lint.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors arising from plugin operations.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The invocation string does not match the invocation grammar.
    #[error("invalid invocation of {executable}: {invocation}")]
    InvalidInvocation {
        /// Executable the invocation was destined for.
        executable: String,
        /// The raw invocation string.
        invocation: String,
    },

    /// The plugin executable was not found on the search path.
    #[error("plugin executable '{executable}' not found on the search path")]
    ExecutableNotFound {
        /// Executable name that was looked up.
        executable: String,
    },

    /// The plugin process could not be spawned.
    #[error("plugin '{executable}' failed to start: {message}")]
    SpawnFailed {
        /// Executable name.
        executable: String,
        /// Human-readable failure description.
        message: String,
        /// Optional underlying I/O error.
        #[source]
        source: Option<Arc<std::io::Error>>,
    },

    /// The plugin terminated unsuccessfully without writing a response.
    #[error("plugin '{executable}' exited with status {status} and produced no output")]
    NonZeroExit {
        /// Executable name.
        executable: String,
        /// Process exit status, or `-1` when terminated by a signal.
        status: i32,
    },

    /// An I/O error occurred while communicating with the plugin process.
    #[error("I/O error communicating with plugin '{executable}': {source}")]
    Io {
        /// Executable name.
        executable: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The plugin response could not be decoded.
    #[error("failed to decode response from plugin '{executable}': {message}")]
    DeserializeResponse {
        /// Executable name.
        executable: String,
        /// Decoder diagnostic.
        message: String,
    },

    /// The plugin answered with a non-empty error list.
    #[error("plugin '{executable}' reported errors: {}", .errors.join("; "))]
    Reported {
        /// Executable name.
        executable: String,
        /// Messages from the response, in order.
        errors: Vec<String>,
    },

    /// The output location names an existing file where a directory is
    /// required.
    #[error("unable to overwrite '{}'", path.display())]
    OutputConflict {
        /// The conflicting path.
        path: PathBuf,
    },

    /// A response file name would escape the output directory.
    #[error("plugin '{executable}' returned unsafe file name '{name}'")]
    UnsafeFileName {
        /// Executable name.
        executable: String,
        /// File name from the response.
        name: String,
    },

    /// Writing a response file or stream failed.
    #[error("failed to write '{}': {source}", path.display())]
    WriteOutput {
        /// Destination that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}
