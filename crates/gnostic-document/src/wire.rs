//! Protobuf messages for the binary document serialisation.
//!
//! The tree is flattened into a pre-order stream of tokens, so decoding costs
//! one message level however deeply the document nests:
//!
//! ```text
//! message Document { repeated Token tokens = 1; }
//! message Token    { oneof kind { bool boolean = 1; sint64 integer = 2; double float = 3;
//!                                 string text = 4; uint64 sequence = 5; uint64 mapping = 6;
//!                                 string key = 7; } }
//! ```
//!
//! `sequence` and `mapping` carry the number of children that follow. Each
//! mapping child is a `key` token followed by the tokens of its value. A
//! token without `kind` encodes null. Containers nested deeper than
//! `MAX_DEPTH` are refused by the encoder and the decoder alike, so every
//! document this crate writes can be read back.

use prost::Message;

use self::token_message::Kind;
use crate::error::DocumentError;
use crate::node::Node;

/// Deepest container nesting the binary form supports.
pub(crate) const MAX_DEPTH: usize = 1024;

#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct DocumentMessage {
    #[prost(message, repeated, tag = "1")]
    pub(crate) tokens: Vec<TokenMessage>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub(crate) struct TokenMessage {
    #[prost(oneof = "token_message::Kind", tags = "1, 2, 3, 4, 5, 6, 7")]
    pub(crate) kind: Option<token_message::Kind>,
}

pub(crate) mod token_message {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub(crate) enum Kind {
        #[prost(bool, tag = "1")]
        Boolean(bool),
        #[prost(sint64, tag = "2")]
        Integer(i64),
        #[prost(double, tag = "3")]
        Float(f64),
        #[prost(string, tag = "4")]
        Text(String),
        #[prost(uint64, tag = "5")]
        Sequence(u64),
        #[prost(uint64, tag = "6")]
        Mapping(u64),
        #[prost(string, tag = "7")]
        Key(String),
    }
}

/// Encodes `root` as a token stream.
pub(crate) fn encode(root: &Node) -> Result<Vec<u8>, DocumentError> {
    let mut tokens = Vec::new();
    push_tokens(root, 0, &mut tokens)?;
    Ok(DocumentMessage { tokens }.encode_to_vec())
}

fn push_tokens(
    node: &Node,
    depth: usize,
    tokens: &mut Vec<TokenMessage>,
) -> Result<(), DocumentError> {
    let kind = match node {
        Node::Null => None,
        Node::Bool(flag) => Some(Kind::Boolean(*flag)),
        Node::Integer(value) => Some(Kind::Integer(*value)),
        Node::Float(value) => Some(Kind::Float(*value)),
        Node::String(text) => Some(Kind::Text(text.clone())),
        Node::Sequence(items) => {
            check_depth(depth, || DocumentError::Serialise {
                message: too_deep(),
            })?;
            tokens.push(token(Kind::Sequence(wire_count(items.len())?)));
            for item in items {
                push_tokens(item, depth + 1, tokens)?;
            }
            return Ok(());
        }
        Node::Mapping(entries) => {
            check_depth(depth, || DocumentError::Serialise {
                message: too_deep(),
            })?;
            tokens.push(token(Kind::Mapping(wire_count(entries.len())?)));
            for (key, value) in entries {
                tokens.push(token(Kind::Key(key.clone())));
                push_tokens(value, depth + 1, tokens)?;
            }
            return Ok(());
        }
    };
    tokens.push(TokenMessage { kind });
    Ok(())
}

const fn token(kind: Kind) -> TokenMessage {
    TokenMessage { kind: Some(kind) }
}

fn wire_count(len: usize) -> Result<u64, DocumentError> {
    u64::try_from(len).map_err(|err| DocumentError::Serialise {
        message: err.to_string(),
    })
}

fn check_depth(
    depth: usize,
    error: impl FnOnce() -> DocumentError,
) -> Result<(), DocumentError> {
    if depth < MAX_DEPTH { Ok(()) } else { Err(error()) }
}

fn too_deep() -> String {
    format!("document nests deeper than {MAX_DEPTH} levels")
}

fn malformed(message: impl Into<String>) -> DocumentError {
    DocumentError::BinaryDecode {
        message: message.into(),
    }
}

/// Decodes a token stream back into a tree.
pub(crate) fn decode(bytes: &[u8]) -> Result<Node, DocumentError> {
    let message = DocumentMessage::decode(bytes).map_err(|err| malformed(err.to_string()))?;
    let mut builder = TreeBuilder::default();
    for token in message.tokens {
        builder.push(token)?;
    }
    builder.finish()
}

/// A container whose children are still arriving.
enum Frame {
    Sequence {
        remaining: usize,
        items: Vec<Node>,
    },
    Mapping {
        remaining: usize,
        key: Option<String>,
        entries: Vec<(String, Node)>,
    },
}

impl Frame {
    fn accept(&mut self, node: Node) -> Result<(), DocumentError> {
        match self {
            Self::Sequence { remaining, items } => {
                items.push(node);
                *remaining = remaining.saturating_sub(1);
            }
            Self::Mapping {
                remaining,
                key,
                entries,
            } => {
                let name = key
                    .take()
                    .ok_or_else(|| malformed("mapping value without a key"))?;
                entries.push((name, node));
                *remaining = remaining.saturating_sub(1);
            }
        }
        Ok(())
    }

    const fn is_complete(&self) -> bool {
        match self {
            Self::Sequence { remaining, .. } | Self::Mapping { remaining, .. } => *remaining == 0,
        }
    }

    fn into_node(self) -> Node {
        match self {
            Self::Sequence { items, .. } => Node::Sequence(items),
            Self::Mapping { entries, .. } => Node::Mapping(entries),
        }
    }
}

/// Rebuilds the tree with an explicit stack of open containers.
#[derive(Default)]
struct TreeBuilder {
    open: Vec<Frame>,
    root: Option<Node>,
}

impl TreeBuilder {
    fn push(&mut self, token: TokenMessage) -> Result<(), DocumentError> {
        let node = match token.kind {
            None => Node::Null,
            Some(Kind::Boolean(flag)) => Node::Bool(flag),
            Some(Kind::Integer(value)) => Node::Integer(value),
            Some(Kind::Float(value)) => Node::Float(value),
            Some(Kind::Text(text)) => Node::String(text),
            Some(Kind::Key(key)) => return self.key(key),
            Some(Kind::Sequence(count)) => {
                return self.open_container(Frame::Sequence {
                    remaining: node_count(count)?,
                    items: Vec::new(),
                });
            }
            Some(Kind::Mapping(count)) => {
                return self.open_container(Frame::Mapping {
                    remaining: node_count(count)?,
                    key: None,
                    entries: Vec::new(),
                });
            }
        };
        self.close(node)
    }

    fn key(&mut self, key: String) -> Result<(), DocumentError> {
        match self.open.last_mut() {
            Some(Frame::Mapping { key: slot @ None, .. }) => {
                *slot = Some(key);
                Ok(())
            }
            _ => Err(malformed(format!("unexpected key '{key}'"))),
        }
    }

    fn open_container(&mut self, frame: Frame) -> Result<(), DocumentError> {
        check_depth(self.open.len(), || malformed(too_deep()))?;
        if frame.is_complete() {
            return self.close(frame.into_node());
        }
        self.open.push(frame);
        Ok(())
    }

    /// Hands a finished node to its parent, closing every parent it fills.
    fn close(&mut self, mut node: Node) -> Result<(), DocumentError> {
        while let Some(frame) = self.open.last_mut() {
            frame.accept(node)?;
            if !frame.is_complete() {
                return Ok(());
            }
            let Some(done) = self.open.pop() else {
                return Ok(());
            };
            node = done.into_node();
        }
        if self.root.is_some() {
            return Err(malformed("tokens follow the root node"));
        }
        self.root = Some(node);
        Ok(())
    }

    fn finish(self) -> Result<Node, DocumentError> {
        if !self.open.is_empty() {
            return Err(malformed("document ends inside a container"));
        }
        self.root.ok_or_else(|| malformed("document holds no nodes"))
    }
}

fn node_count(count: u64) -> Result<usize, DocumentError> {
    usize::try_from(count).map_err(|err| malformed(err.to_string()))
}
