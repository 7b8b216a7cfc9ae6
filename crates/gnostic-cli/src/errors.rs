//! Error types for the CLI runtime.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use gnostic_document::DocumentError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    /// The arguments parsed but do not describe a runnable compilation.
    #[error("{message}")]
    Usage { message: String },
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("failed to write '{}': {source}", path.display())]
    WriteArtifact {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },
}

impl AppError {
    pub(crate) fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    pub(crate) fn write_artifact(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::WriteArtifact {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Returns whether help text should follow the message.
    pub(crate) const fn wants_help(&self) -> bool {
        matches!(self, Self::Usage { .. })
    }
}
