//! Runtime orchestration for the R+ toolchain.
//!
//! The `Runtime` struct drives the pipeline end to end: lexing, parsing,
//! bytecode generation, native rendering for file output, and stack-VM
//! execution for evaluation.

use crate::error::{CliError, CliResult};
use bytecode_system::BytecodeModule;
use core_types::Value;
use interpreter::VirtualMachine;
use parser::{Compiler, Lexer, NativeEmitter, Parser};

/// Coordinates the compiler components behind the CLI.
pub struct Runtime {
    optimization_level: u8,
    print_ast: bool,
    print_bytecode: bool,
    vm: VirtualMachine,
}

impl Runtime {
    /// Create a runtime with the default optimization level.
    pub fn new() -> Self {
        Self {
            optimization_level: 2,
            print_ast: false,
            print_bytecode: false,
            vm: VirtualMachine::new(),
        }
    }

    /// Enable AST printing during compilation.
    pub fn with_print_ast(mut self, enabled: bool) -> Self {
        self.print_ast = enabled;
        self
    }

    /// Enable bytecode printing during compilation.
    pub fn with_print_bytecode(mut self, enabled: bool) -> Self {
        self.print_bytecode = enabled;
        self
    }

    /// Set the optimization level (0-3).
    pub fn set_optimization_level(&mut self, level: u8) {
        self.optimization_level = level.min(3);
    }

    /// The configured optimization level.
    pub fn optimization_level(&self) -> u8 {
        self.optimization_level
    }

    /// Compile source text into a finalized bytecode module.
    pub fn compile_source(&self, source: &str) -> CliResult<BytecodeModule> {
        let tokens = Lexer::new(source).tokenize();
        let program = Parser::new(tokens).parse()?;

        if self.print_ast {
            println!("AST: {}", program);
        }

        let mut compiler = Compiler::new();
        compiler.set_optimization_level(self.optimization_level);
        let module = compiler.compile(&program)?;

        if self.print_bytecode {
            println!("Bytecode: {:#?}", module);
        }

        Ok(module)
    }

    /// Compile and execute source text, returning the result value.
    pub fn execute_string(&mut self, source: &str) -> CliResult<Value> {
        let module = self.compile_source(source)?;
        let result = self.vm.execute(&module)?;
        Ok(result)
    }

    /// Compile `input` and write its native rendering to `output`,
    /// printing the progress log to stdout.
    pub fn compile_file(&self, input: &str, output: &str) -> CliResult<()> {
        println!("[1/5] Reading source file...");
        let source = std::fs::read_to_string(input).map_err(CliError::Io)?;
        println!("  OK - {} bytes", source.len());

        println!("[2/5] Lexical analysis...");
        let tokens = Lexer::new(&source).tokenize();
        println!("  OK - {} tokens", tokens.len());

        println!("[3/5] Syntax analysis (parsing)...");
        let program = Parser::new(tokens).parse()?;
        println!("  OK - AST generated");
        if self.print_ast {
            println!("AST: {}", program);
        }

        println!("[4/5] Code generation...");
        let mut compiler = Compiler::new();
        compiler.set_optimization_level(self.optimization_level);
        let module = compiler.compile(&program)?;
        let code = NativeEmitter::new().emit(&module);
        println!("  OK - Code generated");
        if self.print_bytecode {
            println!("Bytecode: {:#?}", module);
        }

        println!("[5/5] Writing output file...");
        std::fs::write(output, &code).map_err(CliError::Io)?;
        println!("  OK - {} bytes written to {}", code.len(), output);

        Ok(())
    }

    /// Access the persistent VM (globals survive between evaluations).
    pub fn vm(&mut self) -> &mut VirtualMachine {
        &mut self.vm
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
