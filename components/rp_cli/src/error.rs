//! Error types for the CLI.

use core_types::RpError;
use std::fmt;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Lex, parse, compile, or runtime failure from the toolchain
    Rp(RpError),

    /// File I/O error
    Io(std::io::Error),

    /// Interactive session error
    Repl(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Rp(e) => write!(f, "{}: {}", e.kind, e.message),
            CliError::Io(e) => write!(f, "File error: {}", e),
            CliError::Repl(s) => write!(f, "REPL error: {}", s),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Rp(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::Repl(_) => None,
        }
    }
}

impl From<RpError> for CliError {
    fn from(err: RpError) -> Self {
        CliError::Rp(err)
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err)
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
