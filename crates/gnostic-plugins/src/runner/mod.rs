//! Plugin runner performing one complete plugin call.
//!
//! A [`PluginCall`] names a plugin and carries its raw invocation string. The
//! [`PluginRunner`] parses the invocation, builds the [`Request`], hands the
//! encoded bytes to a [`PluginExecutor`], decodes the [`Response`], and
//! dispatches the returned files through the resolved [`Sink`].
//!
//! The executor abstraction enables test doubles that return pre-encoded
//! responses without spawning real processes.

use std::io::Write;

use tracing::{debug, info};

use crate::error::PluginError;
use crate::invocation::Invocation;
use crate::protocol::{Request, Response, Wrapper};
use crate::sink::Sink;

/// Tracing target for plugin runner operations.
const RUNNER_TARGET: &str = "gnostic_plugins::runner";

/// Prefix joined to a plugin name to form its executable name.
pub const PLUGIN_PREFIX: &str = "gnostic-";

/// A plugin requested on the command line with `--NAME-out=INVOCATION`.
///
/// # Example
///
/// ```
/// use gnostic_plugins::PluginCall;
///
/// let call = PluginCall::new("go", "package=main:generated");
/// assert_eq!(call.executable(), "gnostic-go");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginCall {
    name: String,
    invocation: String,
}

impl PluginCall {
    /// Creates a call to plugin `name` with the raw `invocation` string.
    #[must_use]
    pub fn new(name: impl Into<String>, invocation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            invocation: invocation.into(),
        }
    }

    /// Returns the plugin name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the raw invocation string.
    #[must_use]
    pub const fn invocation(&self) -> &str {
        self.invocation.as_str()
    }

    /// Returns the executable name, `gnostic-<name>`.
    #[must_use]
    pub fn executable(&self) -> String {
        format!("{PLUGIN_PREFIX}{}", self.name)
    }
}

/// Trait abstracting plugin process execution for testability.
///
/// The production implementation is
/// [`ProcessExecutor`](crate::process::ProcessExecutor), which spawns a
/// child process. Test code can implement this trait to return
/// pre-encoded responses.
///
/// # Example
///
/// ```
/// use gnostic_plugins::runner::PluginExecutor;
/// use gnostic_plugins::PluginError;
///
/// struct SilentExecutor;
///
/// impl PluginExecutor for SilentExecutor {
///     fn execute(&self, _executable: &str, _request: &[u8]) -> Result<Vec<u8>, PluginError> {
///         Ok(Vec::new())
///     }
/// }
/// ```
pub trait PluginExecutor {
    /// Runs `executable` with the encoded `request` on stdin and returns
    /// everything it wrote to stdout.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginError`] if the executable cannot be found or
    /// spawned, communication fails, or it exits unsuccessfully without
    /// output.
    fn execute(&self, executable: &str, request: &[u8]) -> Result<Vec<u8>, PluginError>;

    /// Runs `executable` like [`PluginExecutor::execute`], copying anything
    /// it writes to stderr into `diagnostic`.
    ///
    /// The default implementation produces no diagnostics.
    ///
    /// # Errors
    ///
    /// As for [`PluginExecutor::execute`].
    fn execute_forwarding(
        &self,
        executable: &str,
        request: &[u8],
        _diagnostic: &mut dyn Write,
    ) -> Result<Vec<u8>, PluginError> {
        self.execute(executable, request)
    }
}

/// Performs plugin calls through an executor.
#[derive(Debug)]
pub struct PluginRunner<E> {
    executor: E,
}

impl<E> PluginRunner<E> {
    /// Creates a runner with the given executor.
    #[must_use]
    pub const fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Returns a reference to the executor.
    #[must_use]
    pub const fn executor(&self) -> &E {
        &self.executor
    }
}

impl<E: PluginExecutor> PluginRunner<E> {
    /// Performs one plugin call and returns the number of files produced.
    ///
    /// No process is spawned when the invocation is malformed, and no file
    /// is written when the plugin reports errors.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidInvocation`], any executor error,
    /// [`PluginError::DeserializeResponse`], [`PluginError::Reported`], or a
    /// sink error from writing the response files.
    pub fn perform(
        &self,
        call: &PluginCall,
        wrapper: &Wrapper,
        primary: &mut dyn Write,
        diagnostic: &mut dyn Write,
    ) -> Result<usize, PluginError> {
        let executable = call.executable();
        let invocation = Invocation::parse(&executable, call.invocation())?;
        let request = Request::new(&invocation, wrapper.clone());

        debug!(
            target: RUNNER_TARGET,
            plugin = %executable,
            output = invocation.output_location(),
            parameters = invocation.parameters().len(),
            "invoking plugin"
        );
        let output = self
            .executor
            .execute_forwarding(&executable, &request.to_bytes(), diagnostic)?;
        let response = Response::from_bytes(&executable, &output)?;
        if !response.is_success() {
            return Err(PluginError::Reported {
                executable,
                errors: response.errors,
            });
        }

        let sink = Sink::for_plugin(invocation.output_location());
        sink.write_plugin_files(&executable, &response.files, primary, diagnostic)?;
        info!(
            target: RUNNER_TARGET,
            plugin = %executable,
            files = response.files.len(),
            "plugin call completed"
        );
        Ok(response.files.len())
    }
}
