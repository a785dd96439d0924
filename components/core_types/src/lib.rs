//! Core types shared across the R+ toolchain.
//!
//! This crate holds the pieces every other component depends on: the
//! runtime [`Value`] representation, source positions, and the shared
//! [`RpError`] type.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod source;
mod value;

pub use error::{ErrorKind, RpError};
pub use source::{SourcePosition, StackFrame};
pub use value::Value;
