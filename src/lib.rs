// Library surface shared by the `minicpp` binary and the integration tests.
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;

pub use crate::core::compiler::{Compiler, RunOutcome};
pub use crate::core::error::{CoreError, Diagnostic, ErrorKind};
