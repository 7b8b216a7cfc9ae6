//! IPC protocol types for compiler-plugin communication.
//!
//! The compiler writes one protobuf-encoded [`Request`] to the plugin's stdin
//! and closes it. The plugin writes one protobuf-encoded [`Response`] to
//! stdout and exits. Plugin stderr is passed through to the compiler's own
//! stderr and is not part of the protocol.
//!
//! Field numbers are fixed so third-party plugins built from the published
//! schema interoperate:
//!
//! ```text
//! message Version   { int32 major = 1; int32 minor = 2; int32 patch = 3; string suffix = 4; }
//! message Parameter { string name = 1; string value = 2; }
//! message Wrapper   { string name = 1; string version = 2; bytes value = 3; }
//! message Request   { Wrapper wrapper = 1; string output_path = 2;
//!                     repeated Parameter parameters = 3; Version compiler_version = 4; }
//! message File      { string name = 1; bytes data = 2; }
//! message Response  { repeated string errors = 1; repeated File files = 2; }
//! ```

use prost::Message;

use crate::error::PluginError;
use crate::invocation::Invocation;

/// Compiler version reported to every plugin.
pub const COMPILER_VERSION: Version = Version {
    major: 0,
    minor: 1,
    patch: 0,
    suffix: String::new(),
};

/// Semantic version of the compiler.
#[derive(Clone, PartialEq, Eq, Message)]
pub struct Version {
    /// Major version.
    #[prost(int32, tag = "1")]
    pub major: i32,
    /// Minor version.
    #[prost(int32, tag = "2")]
    pub minor: i32,
    /// Patch version.
    #[prost(int32, tag = "3")]
    pub patch: i32,
    /// Pre-release suffix, empty for releases.
    #[prost(string, tag = "4")]
    pub suffix: String,
}

/// A `name=value` pair from the invocation string.
#[derive(Clone, PartialEq, Eq, Message)]
pub struct Parameter {
    /// Parameter key.
    #[prost(string, tag = "1")]
    pub name: String,
    /// Parameter value.
    #[prost(string, tag = "2")]
    pub value: String,
}

/// The serialised compiled document with the metadata a plugin needs to
/// decode it.
#[derive(Clone, PartialEq, Eq, Message)]
pub struct Wrapper {
    /// Source name as given on the command line.
    #[prost(string, tag = "1")]
    pub name: String,
    /// `v2`, `v3`, or `unknown`.
    #[prost(string, tag = "2")]
    pub version: String,
    /// Binary serialisation of the compiled document.
    #[prost(bytes = "vec", tag = "3")]
    pub value: Vec<u8>,
}

impl Wrapper {
    /// Creates a wrapper around serialised document bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use gnostic_plugins::protocol::Wrapper;
    ///
    /// let wrapper = Wrapper::new("petstore.yaml", "v2", vec![1, 2, 3]);
    /// assert_eq!(wrapper.version, "v2");
    /// ```
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            value,
        }
    }
}

/// Request sent from the compiler to a plugin on stdin.
#[derive(Clone, PartialEq, Eq, Message)]
pub struct Request {
    /// The document to process.
    #[prost(message, optional, tag = "1")]
    pub wrapper: Option<Wrapper>,
    /// Output location from the invocation string.
    #[prost(string, tag = "2")]
    pub output_path: String,
    /// Parameters from the invocation string, in order.
    #[prost(message, repeated, tag = "3")]
    pub parameters: Vec<Parameter>,
    /// Version of the invoking compiler.
    #[prost(message, optional, tag = "4")]
    pub compiler_version: Option<Version>,
}

impl Request {
    /// Builds the request for one plugin call.
    ///
    /// Parameters keep their invocation order, duplicates included.
    #[must_use]
    pub fn new(invocation: &Invocation, wrapper: Wrapper) -> Self {
        Self {
            wrapper: Some(wrapper),
            output_path: invocation.output_location().to_owned(),
            parameters: invocation
                .parameters()
                .iter()
                .map(|(name, value)| Parameter {
                    name: name.clone(),
                    value: value.clone(),
                })
                .collect(),
            compiler_version: Some(COMPILER_VERSION),
        }
    }

    /// Encodes the request for the plugin's stdin.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode_to_vec()
    }
}

/// A file produced by a plugin.
#[derive(Clone, PartialEq, Eq, Message)]
pub struct File {
    /// Name relative to the output directory.
    #[prost(string, tag = "1")]
    pub name: String,
    /// File contents.
    #[prost(bytes = "vec", tag = "2")]
    pub data: Vec<u8>,
}

impl File {
    /// Creates a response file.
    #[must_use]
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Response sent from a plugin to the compiler on stdout.
#[derive(Clone, PartialEq, Eq, Message)]
pub struct Response {
    /// Application-level errors; any entry means no file is written.
    #[prost(string, repeated, tag = "1")]
    pub errors: Vec<String>,
    /// Files to dispatch to the output location.
    #[prost(message, repeated, tag = "2")]
    pub files: Vec<File>,
}

impl Response {
    /// Creates a successful response carrying `files`.
    #[must_use]
    pub const fn success(files: Vec<File>) -> Self {
        Self {
            errors: Vec::new(),
            files,
        }
    }

    /// Creates a failed response carrying `errors`.
    #[must_use]
    pub const fn failure(errors: Vec<String>) -> Self {
        Self {
            errors,
            files: Vec::new(),
        }
    }

    /// Decodes the captured stdout of `executable`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::DeserializeResponse`] when `bytes` are not a
    /// valid encoding.
    pub fn from_bytes(executable: &str, bytes: &[u8]) -> Result<Self, PluginError> {
        Self::decode(bytes).map_err(|err| PluginError::DeserializeResponse {
            executable: executable.to_owned(),
            message: err.to_string(),
        })
    }

    /// Returns whether the plugin reported no errors.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
