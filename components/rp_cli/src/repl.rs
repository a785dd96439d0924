//! Interactive mode (read-eval-print loop).
//!
//! Each line is compiled on its own; a failing line reports its errors and
//! the session keeps going.

use crate::error::{CliError, CliResult};
use crate::runtime::Runtime;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Run the interactive interpreter until `exit`/`quit` or EOF.
pub fn run_repl(runtime: &mut Runtime) -> CliResult<()> {
    let mut editor = DefaultEditor::new()
        .map_err(|e| CliError::Repl(format!("Failed to initialize editor: {}", e)))?;

    println!("R+ Interactive Mode");
    println!("Type 'exit' to quit, 'help' for help");
    println!();

    loop {
        match editor.readline("rp> ") {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed == "exit" || trimmed == "quit" {
                    println!("Goodbye!");
                    break;
                }

                if trimmed == "help" {
                    print_help();
                    continue;
                }

                if trimmed == "clear" {
                    print!("\x1B[2J\x1B[1;1H");
                    continue;
                }

                if trimmed.is_empty() {
                    continue;
                }

                let _ = editor.add_history_entry(trimmed);

                match runtime.compile_source(trimmed) {
                    Ok(_) => println!("OK"),
                    Err(e) => {
                        println!("Error during compilation");
                        println!("  {}", e);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Press Ctrl-D or type 'exit' to quit");
            }
            Err(ReadlineError::Eof) => {
                println!();
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                return Err(CliError::Repl(format!("Readline error: {}", err)));
            }
        }
    }

    Ok(())
}

fn print_help() {
    println!("Available commands:");
    println!("  exit/quit    - Exit the interpreter");
    println!("  help         - Show this help message");
    println!("  clear        - Clear the screen");
    println!();
}
