//! R+ virtual machines.
//!
//! Two conforming execution engines share the bytecode instruction set:
//! [`VirtualMachine`] is the stack-based interpreter wired to the compiler
//! pipeline, and [`RegisterMachine`] is the machine-level register engine
//! with its own heap and stack discipline.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod call_frame;
mod machine;
mod vm;

pub use call_frame::CallFrame;
pub use machine::{MachineState, RegisterMachine, FLAGS_REGISTER, NUM_REGISTERS};
pub use vm::{VirtualMachine, FRAMES_MAX, STACK_MAX};
