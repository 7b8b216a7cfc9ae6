//! Registration tokens for vendor-extension handlers.

/// Prefix applied to extension names to form handler executable names.
pub const EXTENSION_PREFIX: &str = "gnostic-x-";

/// A handler registered through `--x-NAME` before decoding.
///
/// The decoder receives the registered handlers as a pass-through list; the
/// tokens carry no behaviour after decoding completes.
///
/// # Example
///
/// ```
/// use gnostic_document::ExtensionHandler;
///
/// let handler = ExtensionHandler::for_extension("sample");
/// assert_eq!(handler.name(), "gnostic-x-sample");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtensionHandler {
    name: String,
}

impl ExtensionHandler {
    /// Creates the handler token for an extension name given on the command
    /// line.
    #[must_use]
    pub fn for_extension(extension: &str) -> Self {
        Self {
            name: format!("{EXTENSION_PREFIX}{extension}"),
        }
    }

    /// Returns the handler executable name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }
}
