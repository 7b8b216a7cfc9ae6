//! Binary, JSON, and human-readable text serialisations of a document tree.
//!
//! Every serialiser walks mapping entries in source order, so serialising an
//! unchanged tree twice yields identical bytes.

use crate::error::DocumentError;
use crate::node::Node;
use crate::wire;

/// Output formats of the compiled document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Protobuf wire encoding (`.pb`).
    Binary,
    /// Compact JSON (`.json`).
    Json,
    /// Indented human-readable text (`.text`).
    Text,
}

impl Format {
    /// Returns the file extension used when a sink names a directory.
    ///
    /// # Example
    ///
    /// ```
    /// use gnostic_document::Format;
    ///
    /// assert_eq!(Format::Binary.extension(), "pb");
    /// ```
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Binary => "pb",
            Self::Json => "json",
            Self::Text => "text",
        }
    }
}

/// Serialises `root` in the requested format.
///
/// # Errors
///
/// Returns [`DocumentError::NonFiniteNumber`] when JSON cannot represent a
/// float and [`DocumentError::Serialise`] when the JSON encoder fails or the
/// tree nests containers more than 1024 levels deep for the binary form.
pub fn serialise(root: &Node, format: Format) -> Result<Vec<u8>, DocumentError> {
    match format {
        Format::Binary => wire::encode(root),
        Format::Json => to_json(root),
        Format::Text => Ok(to_text(root).into_bytes()),
    }
}

/// Decodes the binary serialisation back into a tree.
///
/// # Errors
///
/// Returns [`DocumentError::BinaryDecode`] when `bytes` are not a valid
/// encoding, including token streams nested more than 1024 levels deep.
pub fn from_binary(bytes: &[u8]) -> Result<Node, DocumentError> {
    wire::decode(bytes)
}

fn to_json(root: &Node) -> Result<Vec<u8>, DocumentError> {
    let value = json_value(root, &mut String::new())?;
    serde_json::to_vec(&value).map_err(|err| DocumentError::Serialise {
        message: err.to_string(),
    })
}

fn json_value(node: &Node, pointer: &mut String) -> Result<serde_json::Value, DocumentError> {
    Ok(match node {
        Node::Null => serde_json::Value::Null,
        Node::Bool(flag) => serde_json::Value::Bool(*flag),
        Node::Integer(value) => serde_json::Value::from(*value),
        Node::Float(value) => serde_json::Number::from_f64(*value)
            .map(serde_json::Value::Number)
            .ok_or_else(|| DocumentError::NonFiniteNumber {
                pointer: pointer.clone(),
            })?,
        Node::String(text) => serde_json::Value::String(text.clone()),
        Node::Sequence(items) => {
            let mut values = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                values.push(descend(pointer, &index.to_string(), |p| json_value(item, p))?);
            }
            serde_json::Value::Array(values)
        }
        Node::Mapping(entries) => {
            let mut map = serde_json::Map::with_capacity(entries.len());
            for (key, item) in entries {
                let escaped = key.replace('~', "~0").replace('/', "~1");
                let value = descend(pointer, &escaped, |p| json_value(item, p))?;
                map.insert(key.clone(), value);
            }
            serde_json::Value::Object(map)
        }
    })
}

fn descend<T>(
    pointer: &mut String,
    segment: &str,
    visit: impl FnOnce(&mut String) -> Result<T, DocumentError>,
) -> Result<T, DocumentError> {
    let restore = pointer.len();
    pointer.push('/');
    pointer.push_str(segment);
    let result = visit(pointer);
    pointer.truncate(restore);
    result
}

/// Renders the indented text form.
///
/// Mappings open with `key {` and sequences with `key [`; scalars print as
/// `key: value` with strings quoted.
fn to_text(root: &Node) -> String {
    let mut out = String::new();
    match root {
        Node::Mapping(entries) => {
            for (key, value) in entries {
                text_entry(&mut out, 0, key, value);
            }
        }
        other => text_item(&mut out, 0, other),
    }
    out
}

fn text_entry(out: &mut String, depth: usize, key: &str, node: &Node) {
    let key = text_key(key);
    match node {
        Node::Mapping(entries) => {
            line(out, depth, &format!("{key} {{"));
            for (child_key, child) in entries {
                text_entry(out, depth + 1, child_key, child);
            }
            line(out, depth, "}");
        }
        Node::Sequence(items) => {
            line(out, depth, &format!("{key} ["));
            for item in items {
                text_item(out, depth + 1, item);
            }
            line(out, depth, "]");
        }
        scalar => line(out, depth, &format!("{key}: {}", text_scalar(scalar))),
    }
}

fn text_item(out: &mut String, depth: usize, node: &Node) {
    match node {
        Node::Mapping(entries) => {
            line(out, depth, "{");
            for (key, value) in entries {
                text_entry(out, depth + 1, key, value);
            }
            line(out, depth, "}");
        }
        Node::Sequence(items) => {
            line(out, depth, "[");
            for item in items {
                text_item(out, depth + 1, item);
            }
            line(out, depth, "]");
        }
        scalar => line(out, depth, &text_scalar(scalar)),
    }
}

fn line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str(text);
    out.push('\n');
}

fn text_key(key: &str) -> String {
    let mut chars = key.chars();
    let bare = chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if bare {
        key.to_owned()
    } else {
        format!("{key:?}")
    }
}

fn text_scalar(node: &Node) -> String {
    match node {
        Node::Null => String::from("null"),
        Node::Bool(flag) => flag.to_string(),
        Node::Integer(value) => value.to_string(),
        Node::Float(value) => value.to_string(),
        Node::String(text) => format!("{text:?}"),
        Node::Sequence(_) | Node::Mapping(_) => String::new(),
    }
}
