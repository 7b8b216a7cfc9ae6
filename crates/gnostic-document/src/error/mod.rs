//! Domain errors raised while acquiring, decoding, resolving, and
//! serialising API descriptions.
//!
//! All variants carry structured context so the orchestrator can decide
//! whether a failure is fatal. I/O errors are wrapped in `Arc` to keep the
//! enum cheap to clone into reports and `Send + Sync`.

use std::sync::Arc;

use thiserror::Error;

use crate::version::OpenApiVersion;

/// Errors arising from document operations.
#[derive(Debug, Clone, Error)]
pub enum DocumentError {
    /// The source could not be read from the filesystem.
    #[error("failed to read '{name}': {source}")]
    SourceRead {
        /// Source name as given on the command line.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The source URL could not be fetched.
    #[error("failed to fetch '{url}': {message}")]
    Fetch {
        /// URL that was requested.
        url: String,
        /// Description of the transport or status failure.
        message: String,
    },

    /// The source extension does not select a decoder.
    #[error("unknown file extension for '{name}'; 'json', 'yaml', and 'pb' are accepted")]
    UnsupportedExtension {
        /// Source name as given on the command line.
        name: String,
    },

    /// The decoded tree declares neither a supported `swagger` nor `openapi`
    /// version.
    #[error("unable to identify the OpenAPI version")]
    UnknownVersion,

    /// The text source is not well-formed JSON or YAML.
    #[error("failed to parse source text: {message}")]
    Syntax {
        /// Parser diagnostic.
        message: String,
    },

    /// The binary source is not a serialised document.
    #[error("failed to decode binary document: {message}")]
    BinaryDecode {
        /// Decoder diagnostic.
        message: String,
    },

    /// A mapping key could not be represented as a string.
    #[error("unsupported mapping key: {message}")]
    UnsupportedKey {
        /// Description of the offending key.
        message: String,
    },

    /// The tree does not satisfy the structure required by its version.
    #[error("invalid {version} document:\n{}", .messages.join("\n"))]
    Invalid {
        /// Version the document declared.
        version: OpenApiVersion,
        /// One line per violation, in document order.
        messages: Vec<String>,
    },

    /// An internal reference points at nothing.
    #[error("unresolved reference '{reference}'")]
    UnresolvedReference {
        /// The `$ref` value.
        reference: String,
    },

    /// An internal reference eventually points back at itself.
    #[error("circular reference '{reference}'")]
    CircularReference {
        /// The `$ref` value that closed the cycle.
        reference: String,
    },

    /// Inlining references would copy too many nodes or nest too deeply.
    #[error("resolving '{reference}' exceeds the limit of {limit} {unit}")]
    ResolutionLimit {
        /// The `$ref` value being inlined when the limit was reached.
        reference: String,
        /// The limit that was exceeded.
        limit: usize,
        /// What the limit counts.
        unit: &'static str,
    },

    /// A number cannot be represented in the JSON serialisation.
    #[error("cannot serialise non-finite number at '{pointer}' as JSON")]
    NonFiniteNumber {
        /// JSON pointer to the offending value.
        pointer: String,
    },

    /// A serialiser failed for another reason.
    #[error("failed to serialise document: {message}")]
    Serialise {
        /// Serialiser diagnostic.
        message: String,
    },
}

#[cfg(test)]
mod tests;
