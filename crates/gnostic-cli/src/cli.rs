//! CLI argument definitions for the gnostic compiler.
//!
//! Only the fixed flags are described here. Plugin calls
//! (`--NAME-out=INVOCATION`) and extension handlers (`--x-NAME`) have
//! open-ended names and are split out by [`crate::config`] before clap sees
//! the arguments.

use clap::Parser;

use crate::telemetry::LogFormat;

/// Help text appended after the generated flag list.
const DYNAMIC_FLAGS_HELP: &str = "\
Dynamic options:
  --PLUGIN-out=INVOCATION  Run the plugin named gnostic-PLUGIN. INVOCATION is
                           [key=value,...:]PATH; results are written to PATH.
  --x-EXTENSION            Use the extension named gnostic-x-EXTENSION to
                           process specification extensions.

Locations: '!' discards, '-' writes to stdout, '=' writes to stderr, and an
existing directory receives <source-name>.<extension>.";

/// Command-line interface for the gnostic compiler.
#[derive(Parser, Debug)]
#[command(
    name = "gnostic",
    version,
    about = "Compiles OpenAPI descriptions and runs gnostic plugins.",
    after_help = DYNAMIC_FLAGS_HELP
)]
pub(crate) struct Cli {
    /// Filename or URL of the OpenAPI description to read.
    #[arg(value_name = "SOURCE")]
    pub(crate) source: Option<String>,
    /// Writes the binary serialisation to the given location.
    #[arg(long = "pb-out", visible_alias = "pb_out", value_name = "PATH")]
    pub(crate) pb_out: Option<String>,
    /// Writes the JSON serialisation to the given location.
    #[arg(long = "json-out", visible_alias = "json_out", value_name = "PATH")]
    pub(crate) json_out: Option<String>,
    /// Writes the text serialisation to the given location.
    #[arg(long = "text-out", visible_alias = "text_out", value_name = "PATH")]
    pub(crate) text_out: Option<String>,
    /// Writes compilation errors to the given location (default: stderr).
    #[arg(long = "errors-out", visible_alias = "errors_out", value_name = "PATH")]
    pub(crate) errors_out: Option<String>,
    /// Resolves internal `$ref` references before writing anything.
    #[arg(long = "resolve-refs")]
    pub(crate) resolve_refs: bool,
    /// Tracing filter expression for diagnostic logging.
    #[arg(long, value_name = "FILTER", env = "GNOSTIC_LOG", default_value = "warn")]
    pub(crate) log_filter: String,
    /// Diagnostic log format.
    #[arg(
        long,
        value_name = "FORMAT",
        env = "GNOSTIC_LOG_FORMAT",
        default_value_t = LogFormat::Compact
    )]
    pub(crate) log_format: LogFormat,
}
