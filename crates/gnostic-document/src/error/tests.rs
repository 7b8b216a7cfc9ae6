//! Unit tests for document error types.

use std::sync::Arc;

use rstest::rstest;

use super::*;

#[test]
fn source_read_error_names_the_source() {
    let error = DocumentError::SourceRead {
        name: "petstore.yaml".into(),
        source: Arc::new(std::io::Error::from(std::io::ErrorKind::NotFound)),
    };
    let message = error.to_string();
    assert!(
        message.contains("petstore.yaml"),
        "expected source name in message: {message}"
    );
}

#[test]
fn unsupported_extension_lists_accepted_formats() {
    let error = DocumentError::UnsupportedExtension {
        name: "api.txt".into(),
    };
    let message = error.to_string();
    for accepted in ["'json'", "'yaml'", "'pb'"] {
        assert!(
            message.contains(accepted),
            "expected {accepted} in message: {message}"
        );
    }
}

#[test]
fn invalid_document_lists_every_violation() {
    let error = DocumentError::Invalid {
        version: OpenApiVersion::V2,
        messages: vec![
            "missing required field 'info' at $root".into(),
            "missing required field 'paths' at $root".into(),
        ],
    };
    let message = error.to_string();
    assert!(message.contains("Swagger 2.0"), "version missing: {message}");
    assert!(message.contains("'info'"), "first violation missing: {message}");
    assert!(message.contains("'paths'"), "second violation missing: {message}");
}

#[rstest]
#[case::unresolved(
    DocumentError::UnresolvedReference { reference: "#/definitions/Pet".into() },
    "#/definitions/Pet"
)]
#[case::circular(
    DocumentError::CircularReference { reference: "#/definitions/Node".into() },
    "#/definitions/Node"
)]
#[case::resolution_limit(
    DocumentError::ResolutionLimit {
        reference: "#/definitions/Huge".into(),
        limit: 256,
        unit: "nested references",
    },
    "#/definitions/Huge"
)]
#[case::non_finite(
    DocumentError::NonFiniteNumber { pointer: "/x-limit".into() },
    "/x-limit"
)]
fn error_message_includes_location(#[case] error: DocumentError, #[case] expected: &str) {
    let message = error.to_string();
    assert!(
        message.contains(expected),
        "expected {expected} in message: {message}"
    );
}

#[test]
fn document_error_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DocumentError>();
}
