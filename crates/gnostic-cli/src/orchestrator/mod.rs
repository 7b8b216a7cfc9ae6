//! Sequencing of one compilation run.
//!
//! A run moves through `LoadSource → DetectFormatAndDecode →
//! [ResolveReferences] → EmitSinks → InvokePlugins`. Any failure before
//! `EmitSinks` is fatal: it is reported and the run stops. From `EmitSinks`
//! on, each artefact and each plugin call fails independently; failures are
//! reported and counted, and the remaining work still runs.

use std::io::Write;
use std::process::ExitCode;

use gnostic_document::{
    CompiledDocument, DocumentError, Format, SourceEncoding, decode, read_source,
};
use gnostic_plugins::protocol::Wrapper;
use gnostic_plugins::{PluginExecutor, PluginRunner};
use strum::Display;
use tracing::{debug, info};

use crate::IoStreams;
use crate::config::RunConfig;
use crate::output::{ErrorReporter, emit_artifacts};

/// Tracing target for orchestration.
const ORCHESTRATOR_TARGET: &str = "gnostic_cli::orchestrator";

/// States a run passes through after option validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum Stage {
    LoadSource,
    DetectFormatAndDecode,
    ResolveReferences,
    EmitSinks,
    InvokePlugins,
}

/// Aggregate result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    const fn from_failures(failures: usize) -> Self {
        if failures == 0 {
            Self::Success
        } else {
            Self::Failure
        }
    }
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => Self::SUCCESS,
            Outcome::Failure => Self::FAILURE,
        }
    }
}

/// Drives one run over a validated configuration.
pub(crate) struct Orchestrator<'c, X> {
    config: &'c RunConfig,
    runner: PluginRunner<X>,
}

impl<'c, X: PluginExecutor> Orchestrator<'c, X> {
    pub(crate) const fn new(config: &'c RunConfig, executor: X) -> Self {
        Self {
            config,
            runner: PluginRunner::new(executor),
        }
    }

    pub(crate) fn run<W: Write, E: Write>(&self, io: &mut IoStreams<'_, W, E>) -> Outcome {
        let mut reporter = ErrorReporter::new(self.config.errors_out(), self.config.source());
        let document = match self.compile() {
            Ok(document) => document,
            Err(error) => {
                reporter.report(&error, io);
                return Outcome::Failure;
            }
        };
        info!(
            target: ORCHESTRATOR_TARGET,
            source = self.config.source(),
            version = %document.version(),
            title = document.title().unwrap_or_default(),
            paths = document.path_count(),
            "compiled source"
        );

        enter(Stage::EmitSinks);
        let mut failures = emit_artifacts(&document, self.config, &mut reporter, io);
        enter(Stage::InvokePlugins);
        failures += self.invoke_plugins(&document, &mut reporter, io);

        debug!(
            target: ORCHESTRATOR_TARGET,
            failures,
            reported = reporter.reported(),
            "run finished"
        );
        Outcome::from_failures(failures)
    }

    fn compile(&self) -> Result<CompiledDocument, DocumentError> {
        let source = self.config.source();
        enter(Stage::LoadSource);
        let bytes = read_source(source)?;

        enter(Stage::DetectFormatAndDecode);
        let encoding = SourceEncoding::from_source_name(source)?;
        let mut document = decode(&bytes, encoding, self.config.extension_handlers())?;

        if self.config.resolve_refs() {
            enter(Stage::ResolveReferences);
            document.resolve_references(source)?;
        }
        Ok(document)
    }

    /// Performs every plugin call in order and returns the failure count.
    ///
    /// The wrapper is built once and shared by all calls. When the document
    /// cannot be serialised for plugins, every call counts as failed.
    fn invoke_plugins<W: Write, E: Write>(
        &self,
        document: &CompiledDocument,
        reporter: &mut ErrorReporter,
        io: &mut IoStreams<'_, W, E>,
    ) -> usize {
        let calls = self.config.plugin_calls();
        if calls.is_empty() {
            return 0;
        }
        let wrapper = match document.serialise(Format::Binary) {
            Ok(bytes) => Wrapper::new(self.config.source(), document.version().tag(), bytes),
            Err(error) => {
                reporter.report(&error, io);
                return calls.len();
            }
        };

        let mut failures = 0;
        for call in calls {
            let result = self
                .runner
                .perform(call, &wrapper, &mut *io.stdout, &mut *io.stderr);
            if let Err(error) = result {
                reporter.report(&error, io);
                failures += 1;
            }
        }
        failures
    }
}

fn enter(stage: Stage) {
    debug!(target: ORCHESTRATOR_TARGET, %stage, "entering stage");
}
