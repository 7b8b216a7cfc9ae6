//! Parsing of plugin invocation strings.
//!
//! An invocation is the text after `=` in `--NAME-out=...`:
//!
//! ```text
//! invocation := [params ":"] path
//! params     := pair ("," pair)*
//! pair       := key "=" value
//! ```
//!
//! Keys and values are non-empty runs of ASCII alphanumerics, `-`, `_`, `.`,
//! and `/`. The path is any non-empty text free of `,`, `:`, and `=`, which
//! admits the `!` and `-` sink sentinels.

use crate::error::PluginError;

/// Parameters and output location parsed from an invocation string.
///
/// # Example
///
/// ```
/// use gnostic_plugins::Invocation;
///
/// let invocation = Invocation::parse("gnostic-go", "package=main,flat=yes:generated")?;
/// assert_eq!(invocation.output_location(), "generated");
/// assert_eq!(invocation.parameters()[0], ("package".to_owned(), "main".to_owned()));
/// # Ok::<(), gnostic_plugins::PluginError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    parameters: Vec<(String, String)>,
    output_location: String,
}

impl Invocation {
    /// Parses `raw`, the invocation destined for `executable`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidInvocation`] when `raw` does not match
    /// the grammar in full.
    pub fn parse(executable: &str, raw: &str) -> Result<Self, PluginError> {
        if !matches_grammar(raw) {
            return Err(PluginError::InvalidInvocation {
                executable: executable.to_owned(),
                invocation: raw.to_owned(),
            });
        }
        Ok(split(raw))
    }

    /// Returns the `(key, value)` pairs in invocation order.
    #[must_use]
    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    /// Returns the output location.
    #[must_use]
    pub const fn output_location(&self) -> &str {
        self.output_location.as_str()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/')
}

fn is_word(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_word_char)
}

fn is_path(text: &str) -> bool {
    !text.is_empty() && !text.contains([',', ':', '='])
}

fn is_pair(text: &str) -> bool {
    text.split_once('=')
        .is_some_and(|(key, value)| is_word(key) && is_word(value))
}

/// Recognises the full grammar; no prefix or suffix may be left over.
fn matches_grammar(raw: &str) -> bool {
    match raw.split_once(':') {
        None => is_path(raw),
        Some((params, path)) => params.split(',').all(is_pair) && is_path(path),
    }
}

/// Splits a recognised invocation into parameters and output location.
///
/// Exactly one `:`-separated segment is the path. Two segments are the
/// parameter list and the path; pairs without exactly one `=` are dropped.
/// With more segments only the last is kept, as the path.
fn split(raw: &str) -> Invocation {
    let segments: Vec<&str> = raw.split(':').collect();
    match segments.as_slice() {
        [path] => Invocation {
            parameters: Vec::new(),
            output_location: (*path).to_owned(),
        },
        [params, path] => Invocation {
            parameters: params
                .split(',')
                .filter_map(|pair| {
                    let mut parts = pair.split('=');
                    match (parts.next(), parts.next(), parts.next()) {
                        (Some(key), Some(value), None) => Some((key.to_owned(), value.to_owned())),
                        _ => None,
                    }
                })
                .collect(),
            output_location: (*path).to_owned(),
        },
        [.., last] => Invocation {
            parameters: Vec::new(),
            output_location: (*last).to_owned(),
        },
        [] => Invocation {
            parameters: Vec::new(),
            output_location: String::new(),
        },
    }
}
