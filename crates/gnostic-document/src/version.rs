//! Identification of the API description version declared by a tree.

use std::fmt;

use crate::node::Node;

/// Description versions the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenApiVersion {
    /// Swagger 2.0.
    V2,
    /// OpenAPI 3.0.
    V3,
    /// Anything else.
    Unknown,
}

impl OpenApiVersion {
    /// Returns the tag carried in plugin request wrappers.
    ///
    /// # Example
    ///
    /// ```
    /// use gnostic_document::OpenApiVersion;
    ///
    /// assert_eq!(OpenApiVersion::V3.tag(), "v3");
    /// assert_eq!(OpenApiVersion::Unknown.tag(), "unknown");
    /// ```
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::V2 => "v2",
            Self::V3 => "v3",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OpenApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V2 => f.write_str("Swagger 2.0"),
            Self::V3 => f.write_str("OpenAPI 3.0"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Determines the version a decoded information tree declares.
///
/// `swagger: "2.0"` wins over `openapi: "3.0"` when both are present. Absent
/// fields, non-string values, and non-mapping roots all yield
/// [`OpenApiVersion::Unknown`]; the function never fails.
///
/// # Example
///
/// ```
/// use gnostic_document::{detect_version, Node, OpenApiVersion};
///
/// let tree = Node::Mapping(vec![("openapi".into(), Node::String("3.0".into()))]);
/// assert_eq!(detect_version(&tree), OpenApiVersion::V3);
/// assert_eq!(detect_version(&Node::Null), OpenApiVersion::Unknown);
/// ```
#[must_use]
pub fn detect_version(info: &Node) -> OpenApiVersion {
    if info.get("swagger").and_then(Node::as_str) == Some("2.0") {
        return OpenApiVersion::V2;
    }
    if info.get("openapi").and_then(Node::as_str) == Some("3.0") {
        return OpenApiVersion::V3;
    }
    OpenApiVersion::Unknown
}
