//! Shared helpers for the end-to-end pipeline tests.

use core_types::{RpError, Value};
use interpreter::VirtualMachine;
use parser::{Compiler, Lexer, Parser};

/// Run source text through the full pipeline on a fresh VM.
pub fn run_program(source: &str) -> Result<Value, RpError> {
    let tokens = Lexer::new(source).tokenize();
    let program = Parser::new(tokens).parse()?;
    let module = Compiler::new().compile(&program)?;
    VirtualMachine::new().execute(&module)
}

/// Compile source text into a finalized module.
pub fn compile_program(source: &str) -> Result<bytecode_system::BytecodeModule, RpError> {
    let tokens = Lexer::new(source).tokenize();
    let program = Parser::new(tokens).parse()?;
    Compiler::new().compile(&program)
}
