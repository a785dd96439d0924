//! R+ bytecode system.
//!
//! Defines the instruction set and the compiled-module container shared by
//! the compiler and both virtual machine flavors.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod instruction;
mod module;
mod opcode;
mod optimizer;

pub use instruction::Instruction;
pub use module::{BytecodeModule, Function};
pub use opcode::Opcode;
pub use optimizer::Optimizer;
