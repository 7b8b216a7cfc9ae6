//! Shared fixtures for CLI unit tests.

use std::ffi::OsString;
use std::fs;
use std::path::Path;

use clap::Parser;
use gnostic_document::{CompiledDocument, SourceEncoding, decode};
use gnostic_plugins::{PluginError, PluginExecutor};
use mockall::mock;

use crate::cli::Cli;
use crate::config::{RunConfig, split_dynamic_arguments};

/// A minimal valid Swagger 2.0 description.
pub(crate) const PETSTORE_V2: &str = "\
swagger: '2.0'
info:
  title: Swagger Petstore
  version: 1.0.0
paths:
  /pets:
    get:
      operationId: listPets
";

/// A valid description holding a value JSON cannot represent.
pub(crate) const PETSTORE_INFINITE: &str = "\
swagger: '2.0'
info:
  title: Swagger Petstore
  version: 1.0.0
paths: {}
x-limit: .inf
";

mock! {
    pub Executor {}
    impl PluginExecutor for Executor {
        fn execute(&self, executable: &str, request: &[u8]) -> Result<Vec<u8>, PluginError>;
    }
}

/// Parses `args` (without the program name) into a validated configuration.
pub(crate) fn run_config(args: &[&str]) -> RunConfig {
    let argv: Vec<OsString> = std::iter::once("gnostic")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect();
    let split = split_dynamic_arguments(&argv);
    let cli = Cli::try_parse_from(split.cli_arguments).expect("arguments parse");
    RunConfig::from_parts(cli, split.plugin_calls, split.extension_handlers)
        .expect("configuration is valid")
}

/// Decodes YAML text into a compiled document.
pub(crate) fn compile(text: &str) -> CompiledDocument {
    decode(text.as_bytes(), SourceEncoding::Text, &[]).expect("document decodes")
}

/// Writes `text` to `dir/name` and returns the path as a string.
pub(crate) fn write_source(dir: &Path, name: &str, text: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, text).expect("write source");
    path.to_str().expect("utf-8 path").to_owned()
}

/// Returns `path` as a command-line location.
pub(crate) fn location(path: &Path) -> String {
    path.to_str().expect("utf-8 path").to_owned()
}
