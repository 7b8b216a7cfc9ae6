//! The version-tagged compiled document shared by every sink and plugin.

use tracing::debug;

use crate::error::DocumentError;
use crate::node::Node;
use crate::resolve;
use crate::serialise::{self, Format};
use crate::version::OpenApiVersion;

/// Tracing target for document operations.
const DOCUMENT_TARGET: &str = "gnostic_document::document";

/// A decoded Swagger 2.0 description.
#[derive(Debug, Clone, PartialEq)]
pub struct SwaggerDocument {
    root: Node,
}

/// A decoded OpenAPI 3.0 description.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenApiDocument {
    root: Node,
}

impl SwaggerDocument {
    pub(crate) const fn new(root: Node) -> Self {
        Self { root }
    }

    /// Returns the underlying tree.
    #[must_use]
    pub const fn root(&self) -> &Node {
        &self.root
    }
}

impl OpenApiDocument {
    pub(crate) const fn new(root: Node) -> Self {
        Self { root }
    }

    /// Returns the underlying tree.
    #[must_use]
    pub const fn root(&self) -> &Node {
        &self.root
    }
}

/// The compiled document: one of the supported description versions.
///
/// Both variants expose the same capability set; callers serialise and
/// resolve without matching on the version.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledDocument {
    /// A Swagger 2.0 description.
    V2(SwaggerDocument),
    /// An OpenAPI 3.0 description.
    V3(OpenApiDocument),
}

impl CompiledDocument {
    /// Returns the declared version.
    #[must_use]
    pub const fn version(&self) -> OpenApiVersion {
        match self {
            Self::V2(_) => OpenApiVersion::V2,
            Self::V3(_) => OpenApiVersion::V3,
        }
    }

    /// Returns the underlying tree.
    #[must_use]
    pub const fn root(&self) -> &Node {
        match self {
            Self::V2(document) => document.root(),
            Self::V3(document) => document.root(),
        }
    }

    /// Returns `info.title` when present.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.root().get("info")?.get("title")?.as_str()
    }

    /// Returns the number of entries under `paths`.
    #[must_use]
    pub fn path_count(&self) -> usize {
        self.root()
            .get("paths")
            .and_then(Node::as_mapping)
            .map_or(0, <[(String, Node)]>::len)
    }

    /// Serialises the document in the requested format.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NonFiniteNumber`] when the JSON form cannot
    /// represent a value, or [`DocumentError::Serialise`] when the encoder
    /// fails.
    pub fn serialise(&self, format: Format) -> Result<Vec<u8>, DocumentError> {
        serialise::serialise(self.root(), format)
    }

    /// Replaces internal `$ref` mappings with copies of their targets.
    ///
    /// Returns the number of references replaced. The document should be
    /// treated as immutable afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnresolvedReference`],
    /// [`DocumentError::CircularReference`] or
    /// [`DocumentError::ResolutionLimit`]; the document is left unchanged on
    /// failure.
    pub fn resolve_references(&mut self, source_name: &str) -> Result<usize, DocumentError> {
        let root = match self {
            Self::V2(document) => &mut document.root,
            Self::V3(document) => &mut document.root,
        };
        let resolved = resolve::resolve_references(root)?;
        debug!(
            target: DOCUMENT_TARGET,
            source = source_name,
            resolved,
            "resolved internal references"
        );
        Ok(resolved)
    }
}
