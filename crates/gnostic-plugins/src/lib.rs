//! Plugin invocation and output dispatch for the gnostic compiler.
//!
//! The `gnostic-plugins` crate implements the protocol between the compiler
//! and independently executed plugin processes. A plugin is any executable
//! named `gnostic-<name>` on the search path. The compiler writes one
//! protobuf-encoded [`Request`] to its stdin, reads one [`Response`] from its
//! stdout, and writes the returned files wherever the invocation string
//! points.
//!
//! # Architecture
//!
//! - [`invocation`] parses `[key=value,...:]path` invocation strings.
//! - [`protocol`] holds the wire envelopes.
//! - [`sink`] maps a location token (`!`, `-`, `=`, or a path) to write
//!   behaviour; the compiler's own artefacts share these rules.
//! - [`runner`] performs one call through a [`PluginExecutor`], and
//!   [`process`] provides the executor that spawns real processes.
//!
//! # Example
//!
//! ```rust,no_run
//! use gnostic_plugins::process::ProcessExecutor;
//! use gnostic_plugins::protocol::Wrapper;
//! use gnostic_plugins::{PluginCall, PluginRunner};
//!
//! let runner = PluginRunner::new(ProcessExecutor::new());
//! let call = PluginCall::new("go", "package=main:generated");
//! let wrapper = Wrapper::new("petstore.yaml", "v2", Vec::new());
//! let files = runner.perform(
//!     &call,
//!     &wrapper,
//!     &mut std::io::stdout(),
//!     &mut std::io::stderr(),
//! )?;
//! # Ok::<(), gnostic_plugins::PluginError>(())
//! ```

pub mod error;
pub mod invocation;
pub mod process;
pub mod protocol;
pub mod runner;
pub mod sink;

#[cfg(test)]
mod tests;

pub use self::error::PluginError;
pub use self::invocation::Invocation;
pub use self::protocol::{File, Request, Response, Wrapper};
pub use self::runner::{PLUGIN_PREFIX, PluginCall, PluginExecutor, PluginRunner};
pub use self::sink::Sink;
