//! R+ CLI library.
//!
//! Provides the argument surface, the `Runtime` orchestrator, and the
//! interactive mode behind the `rpc` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod repl;
pub mod runtime;

pub use cli::{Cli, Command, DEFAULT_OUTPUT};
pub use error::{CliError, CliResult};
pub use runtime::Runtime;
