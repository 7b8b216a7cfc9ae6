//! Decoding of raw source bytes into a [`CompiledDocument`].
//!
//! Text sources are parsed as YAML (which accepts JSON), binary sources as
//! the serialisation written by the `pb` sink. The version is detected from
//! the resulting tree in both cases, then the tree is checked against the
//! structure its version requires.

use tracing::debug;

use crate::document::{CompiledDocument, OpenApiDocument, SwaggerDocument};
use crate::error::DocumentError;
use crate::extension::ExtensionHandler;
use crate::node::Node;
use crate::serialise;
use crate::source::SourceEncoding;
use crate::version::{OpenApiVersion, detect_version};

/// Tracing target for decoding.
const DECODE_TARGET: &str = "gnostic_document::decode";

/// Decodes `bytes` into a compiled document.
///
/// Extension handlers are registered with the decoder before any value is
/// read; vendor extensions (`x-` keys) stay in the tree verbatim.
///
/// # Errors
///
/// Returns [`DocumentError::Syntax`] or [`DocumentError::BinaryDecode`] when
/// the bytes cannot be parsed, [`DocumentError::UnknownVersion`] when the
/// tree declares no supported version, and [`DocumentError::Invalid`] when
/// required fields are missing.
pub fn decode(
    bytes: &[u8],
    encoding: SourceEncoding,
    extension_handlers: &[ExtensionHandler],
) -> Result<CompiledDocument, DocumentError> {
    for handler in extension_handlers {
        debug!(
            target: DECODE_TARGET,
            handler = handler.name(),
            "registered extension handler"
        );
    }

    let info = match encoding {
        SourceEncoding::Text => parse_text(bytes)?,
        SourceEncoding::Binary => serialise::from_binary(bytes)?,
    };

    let version = detect_version(&info);
    debug!(target: DECODE_TARGET, %version, "detected description version");
    match version {
        OpenApiVersion::V2 => {
            validate(&info, version, "swagger")?;
            Ok(CompiledDocument::V2(SwaggerDocument::new(info)))
        }
        OpenApiVersion::V3 => {
            validate(&info, version, "openapi")?;
            Ok(CompiledDocument::V3(OpenApiDocument::new(info)))
        }
        OpenApiVersion::Unknown => Err(DocumentError::UnknownVersion),
    }
}

fn parse_text(bytes: &[u8]) -> Result<Node, DocumentError> {
    let value: serde_yaml::Value =
        serde_yaml::from_slice(bytes).map_err(|err| DocumentError::Syntax {
            message: err.to_string(),
        })?;
    Node::from_yaml(value)
}

/// Checks the fields every description of `version` must carry.
fn validate(root: &Node, version: OpenApiVersion, version_field: &str) -> Result<(), DocumentError> {
    let mut messages = Vec::new();

    for field in [version_field, "info", "paths"] {
        if root.get(field).is_none() {
            messages.push(format!("missing required field '{field}' at $root"));
        }
    }

    if let Some(info) = root.get("info") {
        if info.is_mapping() {
            for field in ["title", "version"] {
                if info.get(field).is_none() {
                    messages.push(format!("missing required field '{field}' at $root.info"));
                }
            }
        } else {
            messages.push(String::from("$root.info must be a mapping"));
        }
    }

    if root.get("paths").is_some_and(|paths| !paths.is_mapping()) {
        messages.push(String::from("$root.paths must be a mapping"));
    }

    if messages.is_empty() {
        Ok(())
    } else {
        Err(DocumentError::Invalid { version, messages })
    }
}

#[cfg(test)]
mod tests;
