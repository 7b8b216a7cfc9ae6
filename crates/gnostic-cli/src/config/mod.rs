//! Run configuration assembled from the command line.
//!
//! Plugin calls and extension handlers use flag names that cannot be
//! declared up front, so [`split_dynamic_arguments`] removes them from the
//! argument list before clap parses the fixed flags. [`RunConfig`] then
//! combines both halves and enforces the cross-flag rules.

use std::ffi::OsString;

use gnostic_document::{ExtensionHandler, Format};
use gnostic_plugins::PluginCall;

use crate::cli::Cli;
use crate::errors::AppError;

/// Flag names handled by clap even though they match the plugin pattern.
const FIXED_SINKS: &[&str] = &["pb", "json", "text", "errors"];

/// Location used for the error sink when `--errors-out` is absent.
const DEFAULT_ERROR_LOCATION: &str = "=";

/// A flag recognised ahead of clap.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DynamicFlag {
    Plugin(PluginCall),
    Extension(ExtensionHandler),
}

/// Arguments split into the clap-facing list and the dynamic flags.
#[derive(Debug, Default)]
pub(crate) struct ArgumentSplit {
    pub(crate) cli_arguments: Vec<OsString>,
    pub(crate) plugin_calls: Vec<PluginCall>,
    pub(crate) extension_handlers: Vec<ExtensionHandler>,
}

/// Removes `--NAME-out=INVOCATION` and `--x-NAME` flags from `args`.
///
/// The program name and every other argument are kept, in order, for clap.
/// Dynamic flags keep their command-line order.
pub(crate) fn split_dynamic_arguments(args: &[OsString]) -> ArgumentSplit {
    let mut split = ArgumentSplit::default();
    let mut arguments = args.iter();
    if let Some(program) = arguments.next() {
        split.cli_arguments.push(program.clone());
    }
    for argument in arguments {
        match argument.to_str().and_then(classify) {
            Some(DynamicFlag::Plugin(call)) => split.plugin_calls.push(call),
            Some(DynamicFlag::Extension(handler)) => split.extension_handlers.push(handler),
            None => split.cli_arguments.push(argument.clone()),
        }
    }
    split
}

fn classify(argument: &str) -> Option<DynamicFlag> {
    let flag = argument.strip_prefix("--")?;
    plugin_call(flag).map(DynamicFlag::Plugin).or_else(|| {
        flag.strip_prefix("x-")
            .filter(|name| !name.is_empty())
            .map(|name| DynamicFlag::Extension(ExtensionHandler::for_extension(name)))
    })
}

/// Matches `NAME-out=INVOCATION` or `NAME_out=INVOCATION`, split at the
/// first `=`.
fn plugin_call(flag: &str) -> Option<PluginCall> {
    let (head, invocation) = flag.split_once('=')?;
    let name = head
        .strip_suffix("-out")
        .or_else(|| head.strip_suffix("_out"))?;
    let plugin = !name.is_empty() && !invocation.is_empty() && !FIXED_SINKS.contains(&name);
    plugin.then(|| PluginCall::new(name, invocation))
}

/// Everything one compilation run needs, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunConfig {
    source: String,
    pb_out: Option<String>,
    json_out: Option<String>,
    text_out: Option<String>,
    errors_out: String,
    resolve_refs: bool,
    plugin_calls: Vec<PluginCall>,
    extension_handlers: Vec<ExtensionHandler>,
}

impl RunConfig {
    /// Combines parsed fixed flags with the dynamic flags.
    ///
    /// Empty locations count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Usage`] when no output directive is present or
    /// when no source is named.
    pub(crate) fn from_parts(
        cli: Cli,
        plugin_calls: Vec<PluginCall>,
        extension_handlers: Vec<ExtensionHandler>,
    ) -> Result<Self, AppError> {
        let present = |location: Option<String>| location.filter(|value| !value.is_empty());
        let pb_out = present(cli.pb_out);
        let json_out = present(cli.json_out);
        let text_out = present(cli.text_out);
        let errors_out = present(cli.errors_out);

        let has_directive = pb_out.is_some()
            || json_out.is_some()
            || text_out.is_some()
            || errors_out.is_some()
            || !plugin_calls.is_empty();
        if !has_directive {
            return Err(AppError::usage("Missing output directives."));
        }
        let source = present(cli.source).ok_or_else(|| AppError::usage("No input specified."))?;

        Ok(Self {
            source,
            pb_out,
            json_out,
            text_out,
            errors_out: errors_out.unwrap_or_else(|| String::from(DEFAULT_ERROR_LOCATION)),
            resolve_refs: cli.resolve_refs,
            plugin_calls,
            extension_handlers,
        })
    }

    pub(crate) const fn source(&self) -> &str {
        self.source.as_str()
    }

    /// Returns the configured artefact sinks in emission order.
    pub(crate) fn artifact_locations(&self) -> impl Iterator<Item = (Format, &str)> {
        [
            (Format::Binary, self.pb_out.as_deref()),
            (Format::Json, self.json_out.as_deref()),
            (Format::Text, self.text_out.as_deref()),
        ]
        .into_iter()
        .filter_map(|(format, location)| location.map(|value| (format, value)))
    }

    pub(crate) const fn errors_out(&self) -> &str {
        self.errors_out.as_str()
    }

    pub(crate) const fn resolve_refs(&self) -> bool {
        self.resolve_refs
    }

    pub(crate) fn plugin_calls(&self) -> &[PluginCall] {
        &self.plugin_calls
    }

    pub(crate) fn extension_handlers(&self) -> &[ExtensionHandler] {
        &self.extension_handlers
    }
}
