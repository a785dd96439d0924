//! R+ compiler CLI.
//!
//! Entry point for the `rpc` binary: parses arguments and delegates to the
//! Runtime for compilation, execution, or the interactive mode.

use clap::Parser as ClapParser;
use rp_cli::{Cli, Command, Runtime};

fn main() {
    let cli = Cli::parse();

    match cli.command() {
        Command::Version => {
            print_version();
        }
        Command::Interactive => {
            let mut runtime = Runtime::new();
            if let Err(e) = rp_cli::repl::run_repl(&mut runtime) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Command::Compile { input, output } => {
            println!("Compiling: {}", input);
            println!("Output: {}", output);

            let runtime = Runtime::new();
            if let Err(e) = runtime.compile_file(&input, &output) {
                eprintln!("Error: {}", e);
                eprintln!("Compilation failed!");
                std::process::exit(1);
            }
            println!("Compilation successful!");
        }
        Command::Usage => {
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Usage: rpc [command] [options]");
    println!();
    println!("Commands:");
    println!("  compile <file.rp> [output]  Compile R+ source file");
    println!("  interactive                 Run interactive interpreter");
    println!("  -v, --version               Show version information");
    println!("  -h, --help                  Show this help message");
    println!();
    println!("Examples:");
    println!("  rpc compile hello.rp");
    println!("  rpc hello.rp output.rpx");
    println!("  rpc interactive");
}

fn print_version() {
    println!("R+ Programming Language Compiler");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!("Build: {}", env!("RPLUS_BUILD_DATE"));
    println!();
    println!("Supports:");
    println!("  - Bytecode compilation");
    println!("  - Native code generation");
    println!("  - Interactive interpreter");
}
