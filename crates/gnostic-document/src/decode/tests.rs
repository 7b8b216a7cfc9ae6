//! Unit tests for source decoding.

use rstest::rstest;

use super::*;
use crate::serialise::Format;

const PETSTORE_V2: &str = "swagger: '2.0'\ninfo:\n  title: Swagger Petstore\n  version: 1.0.0\npaths:\n  /pets: {}\n  /pets/{petId}: {}\n";

const PETSTORE_V3: &str = r#"{"openapi": "3.0", "info": {"title": "Petstore", "version": "1.0.0"}, "paths": {}}"#;

#[test]
fn decodes_swagger_yaml() {
    let document = decode(PETSTORE_V2.as_bytes(), SourceEncoding::Text, &[]).expect("decodes");
    assert_eq!(document.version(), OpenApiVersion::V2);
    assert_eq!(document.title(), Some("Swagger Petstore"));
    assert_eq!(document.path_count(), 2);
}

#[test]
fn decodes_openapi_json() {
    let document = decode(PETSTORE_V3.as_bytes(), SourceEncoding::Text, &[]).expect("decodes");
    assert_eq!(document.version(), OpenApiVersion::V3);
    assert!(matches!(document, CompiledDocument::V3(_)));
}

#[test]
fn binary_sources_round_trip_through_the_pb_sink() {
    let original = decode(PETSTORE_V2.as_bytes(), SourceEncoding::Text, &[]).expect("decodes");
    let bytes = original.serialise(Format::Binary).expect("serialises");
    let reread = decode(&bytes, SourceEncoding::Binary, &[]).expect("decodes binary");
    assert_eq!(reread, original);
}

#[test]
fn extension_handlers_do_not_change_the_tree() {
    let handlers = [ExtensionHandler::for_extension("sample")];
    let with = decode(PETSTORE_V2.as_bytes(), SourceEncoding::Text, &handlers).expect("decodes");
    let without = decode(PETSTORE_V2.as_bytes(), SourceEncoding::Text, &[]).expect("decodes");
    assert_eq!(with, without);
}

#[rstest]
#[case::empty("")]
#[case::no_version("info: {title: t, version: v}\npaths: {}\n")]
#[case::old_swagger("swagger: '1.2'\n")]
#[case::unquoted_version("swagger: 2.0\ninfo: {title: t, version: v}\npaths: {}\n")]
fn unidentified_versions_fail(#[case] source: &str) {
    let error = decode(source.as_bytes(), SourceEncoding::Text, &[]).expect_err("unknown");
    assert!(
        matches!(error, DocumentError::UnknownVersion),
        "unexpected error: {error}"
    );
}

#[test]
fn malformed_text_is_a_syntax_error() {
    let error =
        decode(b"swagger: '2.0'\ninfo: [unterminated\n", SourceEncoding::Text, &[]).expect_err("bad yaml");
    assert!(matches!(error, DocumentError::Syntax { .. }));
}

#[test]
fn missing_fields_are_collected() {
    let error = decode(b"openapi: '3.0'\ninfo:\n  title: t\n", SourceEncoding::Text, &[])
        .expect_err("invalid");
    match error {
        DocumentError::Invalid { version, messages } => {
            assert_eq!(version, OpenApiVersion::V3);
            assert_eq!(
                messages,
                [
                    "missing required field 'paths' at $root",
                    "missing required field 'version' at $root.info",
                ]
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn non_mapping_sections_are_rejected() {
    let error = decode(b"swagger: '2.0'\ninfo: text\npaths: []\n", SourceEncoding::Text, &[])
        .expect_err("invalid");
    assert!(
        matches!(&error, DocumentError::Invalid { messages, .. } if messages.len() == 2),
        "unexpected error: {error}"
    );
}
