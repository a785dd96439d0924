//! R+ error types shared by the whole toolchain.
//!
//! One error struct flows through every stage: the lexer never fails (it
//! emits error tokens instead), the parser and compiler abort on the first
//! error, and the virtual machines raise runtime errors that record the
//! program counter of the faulting instruction.

use crate::{SourcePosition, StackFrame};
use std::fmt;

/// The taxonomic level an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed source the parser could not accept
    SyntaxError,
    /// Reference to an undefined variable or function
    ReferenceError,
    /// Operation applied to operands of the wrong type
    TypeError,
    /// Lowering failure (unresolved label, register overflow, ...)
    CompileError,
    /// Failure raised while executing bytecode
    RuntimeError,
    /// Invariant violation inside the toolchain itself
    InternalError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::SyntaxError => "syntax error",
            ErrorKind::ReferenceError => "reference error",
            ErrorKind::TypeError => "type error",
            ErrorKind::CompileError => "compile error",
            ErrorKind::RuntimeError => "runtime error",
            ErrorKind::InternalError => "internal error",
        };
        write!(f, "{}", name)
    }
}

/// An R+ error with its message, optional source position, and the call
/// stack captured at the point it was raised.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, RpError};
///
/// let err = RpError::syntax("Expected ')' after expression at line 3");
/// assert_eq!(err.kind, ErrorKind::SyntaxError);
/// assert!(err.to_string().contains("line 3"));
/// ```
#[derive(Debug, Clone)]
pub struct RpError {
    /// The taxonomic level of the error
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
    /// Call stack at the time of the error (innermost frame first)
    pub stack: Vec<StackFrame>,
    /// Source position, when one is known
    pub source_position: Option<SourcePosition>,
}

impl RpError {
    /// Create a new error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stack: Vec::new(),
            source_position: None,
        }
    }

    /// Shorthand for a syntax error.
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SyntaxError, message)
    }

    /// Shorthand for a reference error.
    pub fn reference(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ReferenceError, message)
    }

    /// Shorthand for a type error.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    /// Shorthand for a compile error.
    pub fn compile(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CompileError, message)
    }

    /// Shorthand for a runtime error.
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RuntimeError, message)
    }

    /// Attach a source position to this error.
    pub fn with_position(mut self, position: SourcePosition) -> Self {
        self.source_position = Some(position);
        self
    }

    /// Push a stack frame onto this error's captured call stack.
    pub fn push_frame(&mut self, frame: StackFrame) {
        self.stack.push(frame);
    }
}

impl fmt::Display for RpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RpError {}
