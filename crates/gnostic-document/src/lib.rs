//! Compiled API description model for the gnostic toolchain.
//!
//! The crate turns the raw bytes of an API description into a
//! [`CompiledDocument`]: a version-tagged, immutable tree that every output
//! sink and plugin call reads. It owns the collaborators the orchestrator
//! consumes through narrow entry points:
//!
//! - [`read_source`] acquires bytes from a path or URL.
//! - [`SourceEncoding`] picks the decoder from the source extension.
//! - [`detect_version`] identifies the description version of a decoded tree.
//! - [`decode`] builds the compiled document.
//! - [`CompiledDocument::resolve_references`] inlines internal `$ref`s.
//! - [`CompiledDocument::serialise`] renders the binary, JSON, and text forms.
//!
//! # Example
//!
//! ```
//! use gnostic_document::{decode, Format, OpenApiVersion, SourceEncoding};
//!
//! let source = b"swagger: '2.0'\ninfo: {title: Petstore, version: '1.0'}\npaths: {}\n";
//! let document = decode(source, SourceEncoding::Text, &[])?;
//! assert_eq!(document.version(), OpenApiVersion::V2);
//!
//! let binary = document.serialise(Format::Binary)?;
//! assert!(!binary.is_empty());
//! # Ok::<(), gnostic_document::DocumentError>(())
//! ```

pub mod decode;
mod document;
pub mod error;
mod extension;
pub mod node;
pub mod resolve;
pub mod serialise;
mod source;
mod version;
mod wire;

pub use self::decode::decode;
pub use self::document::{CompiledDocument, OpenApiDocument, SwaggerDocument};
pub use self::error::DocumentError;
pub use self::extension::{EXTENSION_PREFIX, ExtensionHandler};
pub use self::node::Node;
pub use self::serialise::Format;
pub use self::source::{SourceEncoding, read_source};
pub use self::version::{OpenApiVersion, detect_version};
