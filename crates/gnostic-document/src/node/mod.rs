//! Generic information tree underlying every compiled document.
//!
//! A [`Node`] is the decoded form of a JSON, YAML, or binary source before
//! any version-specific interpretation. Mapping entries keep their source
//! order so every serialisation of an unchanged tree is byte-for-byte
//! reproducible.

use crate::error::DocumentError;

/// A value in the decoded information tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An explicit or implicit null.
    Null,
    /// A boolean scalar.
    Bool(bool),
    /// An integer scalar that fits in 64 signed bits.
    Integer(i64),
    /// Any other number, including non-finite YAML values such as `.inf`.
    Float(f64),
    /// A string scalar.
    String(String),
    /// An ordered sequence of values.
    Sequence(Vec<Node>),
    /// An ordered list of key/value entries.
    Mapping(Vec<(String, Node)>),
}

impl Node {
    /// Looks up `key` when this node is a mapping.
    ///
    /// # Example
    ///
    /// ```
    /// use gnostic_document::Node;
    ///
    /// let node = Node::Mapping(vec![("swagger".into(), Node::String("2.0".into()))]);
    /// assert_eq!(node.get("swagger").and_then(Node::as_str), Some("2.0"));
    /// assert!(node.get("openapi").is_none());
    /// ```
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_mapping()?
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value)
    }

    /// Returns the string value of a string scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Returns the entries of a mapping.
    #[must_use]
    pub fn as_mapping(&self) -> Option<&[(String, Self)]> {
        match self {
            Self::Mapping(entries) => Some(entries.as_slice()),
            _ => None,
        }
    }

    /// Returns `true` for mappings.
    #[must_use]
    pub const fn is_mapping(&self) -> bool {
        matches!(self, Self::Mapping(_))
    }

    /// Resolves a JSON pointer fragment such as `#/definitions/Pet`.
    ///
    /// The leading `#` is optional. Segments are unescaped (`~1` becomes `/`,
    /// `~0` becomes `~`) and index sequences when they parse as integers.
    #[must_use]
    pub fn pointer(&self, fragment: &str) -> Option<&Self> {
        let pointer = fragment.strip_prefix('#').unwrap_or(fragment);
        if pointer.is_empty() {
            return Some(self);
        }
        let segments = pointer.strip_prefix('/')?;
        segments.split('/').try_fold(self, |node, raw_segment| {
            let segment = unescape_segment(raw_segment);
            match node {
                Self::Mapping(_) => node.get(&segment),
                Self::Sequence(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get(index)),
                _ => None,
            }
        })
    }

    /// Converts a parsed YAML value, stringifying scalar mapping keys.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnsupportedKey`] when a mapping key is itself
    /// a sequence or mapping.
    pub fn from_yaml(value: serde_yaml::Value) -> Result<Self, DocumentError> {
        Ok(match value {
            serde_yaml::Value::Null => Self::Null,
            serde_yaml::Value::Bool(flag) => Self::Bool(flag),
            serde_yaml::Value::Number(number) => number
                .as_i64()
                .map_or_else(|| Self::Float(number.as_f64().unwrap_or(f64::NAN)), Self::Integer),
            serde_yaml::Value::String(text) => Self::String(text),
            serde_yaml::Value::Sequence(items) => Self::Sequence(
                items
                    .into_iter()
                    .map(Self::from_yaml)
                    .collect::<Result<_, _>>()?,
            ),
            serde_yaml::Value::Mapping(mapping) => Self::Mapping(
                mapping
                    .into_iter()
                    .map(|(key, item)| Ok((yaml_key(key)?, Self::from_yaml(item)?)))
                    .collect::<Result<_, DocumentError>>()?,
            ),
            serde_yaml::Value::Tagged(tagged) => Self::from_yaml(tagged.value)?,
        })
    }
}

fn yaml_key(key: serde_yaml::Value) -> Result<String, DocumentError> {
    match key {
        serde_yaml::Value::String(text) => Ok(text),
        serde_yaml::Value::Number(number) => Ok(number.to_string()),
        serde_yaml::Value::Bool(flag) => Ok(flag.to_string()),
        serde_yaml::Value::Null => Ok(String::from("null")),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => {
            Err(DocumentError::UnsupportedKey {
                message: String::from("mapping keys must be scalars"),
            })
        }
    }
}

fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
