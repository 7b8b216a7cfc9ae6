//! Byte-level acquisition of API description sources.
//!
//! Sources are local paths, `file://` URLs, or `http(s)://` URLs. The source
//! extension decides which decoder runs.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::error::DocumentError;

/// Tracing target for source acquisition.
const SOURCE_TARGET: &str = "gnostic_document::source";

/// Wire encoding of a source, chosen from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    /// JSON or YAML text (`.json`, `.yaml`).
    Text,
    /// The binary serialisation written by the `pb` sink (`.pb`).
    Binary,
}

impl SourceEncoding {
    /// Selects the encoding from the extension of `source_name`.
    ///
    /// Extensions compare case-insensitively. URLs are examined by their
    /// path.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnsupportedExtension`] for any other or a
    /// missing extension.
    ///
    /// # Example
    ///
    /// ```
    /// use gnostic_document::SourceEncoding;
    ///
    /// assert_eq!(SourceEncoding::from_source_name("petstore.YAML")?, SourceEncoding::Text);
    /// assert_eq!(SourceEncoding::from_source_name("petstore.pb")?, SourceEncoding::Binary);
    /// assert!(SourceEncoding::from_source_name("petstore.yml").is_err());
    /// # Ok::<(), gnostic_document::DocumentError>(())
    /// ```
    pub fn from_source_name(source_name: &str) -> Result<Self, DocumentError> {
        let extension = Path::new(source_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json" | "yaml") => Ok(Self::Text),
            Some("pb") => Ok(Self::Binary),
            _ => Err(DocumentError::UnsupportedExtension {
                name: source_name.to_owned(),
            }),
        }
    }
}

/// Reads the raw bytes of a source.
///
/// # Errors
///
/// Returns [`DocumentError::SourceRead`] when a file cannot be read and
/// [`DocumentError::Fetch`] when a URL cannot be retrieved or answers with a
/// non-success status.
pub fn read_source(source_name: &str) -> Result<Vec<u8>, DocumentError> {
    match Url::parse(source_name) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => fetch(&url),
        Ok(url) if url.scheme() == "file" => {
            let path = url.to_file_path().map_err(|()| DocumentError::Fetch {
                url: source_name.to_owned(),
                message: String::from("not a local file URL"),
            })?;
            read_file(source_name, &path)
        }
        _ => read_file(source_name, Path::new(source_name)),
    }
}

fn read_file(source_name: &str, path: &Path) -> Result<Vec<u8>, DocumentError> {
    let bytes = std::fs::read(path).map_err(|err| DocumentError::SourceRead {
        name: source_name.to_owned(),
        source: Arc::new(err),
    })?;
    debug!(
        target: SOURCE_TARGET,
        path = %path.display(),
        bytes = bytes.len(),
        "read source file"
    );
    Ok(bytes)
}

fn fetch(url: &Url) -> Result<Vec<u8>, DocumentError> {
    let failure = |err: reqwest::Error| DocumentError::Fetch {
        url: url.to_string(),
        message: err.to_string(),
    };
    let response = reqwest::blocking::get(url.as_str())
        .and_then(reqwest::blocking::Response::error_for_status)
        .map_err(failure)?;
    let bytes = response.bytes().map_err(failure)?;
    debug!(
        target: SOURCE_TARGET,
        url = %url,
        bytes = bytes.len(),
        "fetched source"
    );
    Ok(bytes.to_vec())
}
