//! Crate-level unit tests for the CLI runtime.

pub(crate) mod support;

mod run;
