//! Full pipeline scenarios: source text in, value or typed error out.

use bytecode_system::Opcode;
use core_types::Value;
use integration::{compile_program, run_program};
use parser::{Lexer, TokenKind};

#[test]
fn scenario_function_call_with_precedence() {
    assert_eq!(
        run_program("function f() { return 1 + 2 * 3; } f();").unwrap(),
        Value::Number(7.0)
    );
}

#[test]
fn scenario_for_loop() {
    assert_eq!(
        run_program("var x = 0; for (x = 0; x < 5; x = x + 1) {} x;").unwrap(),
        Value::Number(5.0)
    );
}

#[test]
fn scenario_recursive_factorial() {
    let source = "function fact(n) { if (n <= 1) return 1; return n * fact(n - 1); } fact(5);";
    assert_eq!(run_program(source).unwrap(), Value::Number(120.0));
}

#[test]
fn scenario_array_indexing() {
    assert_eq!(
        run_program("var a = [10, 20, 30]; a[1];").unwrap(),
        Value::Number(20.0)
    );
}

#[test]
fn scenario_string_concatenation() {
    assert_eq!(
        run_program("\"ab\\n\" + \"c\";").unwrap(),
        Value::String("ab\nc".to_string())
    );
}

#[test]
fn scenario_division_by_zero() {
    let err = run_program("1 / 0;").unwrap_err();
    assert_eq!(err.message, "Division by zero");
}

// Structural invariants over compiled modules.

#[test]
fn every_jump_target_is_a_valid_instruction_index() {
    let module = compile_program(
        "function f(n) { if (n < 2) { return n; } while (n > 0) { n = n - 1; } return 0; } f(5);",
    )
    .unwrap();

    for function in &module.functions {
        let len = function.code.len();
        for instruction in &function.code {
            match instruction.opcode {
                Opcode::Jump(t) | Opcode::JumpIfFalse(_, t) | Opcode::JumpIfTrue(_, t) => {
                    assert!((t as usize) < len);
                }
                _ => {}
            }
        }
    }
}

#[test]
fn every_function_ends_with_return_and_entry_with_exit() {
    let module =
        compile_program("function f() { return 1; } function g() { } f(); g();").unwrap();
    let entry = module.entry().unwrap();

    for (idx, function) in module.functions.iter().enumerate() {
        let last = &function.code.last().unwrap().opcode;
        if idx == entry {
            assert!(matches!(last, Opcode::Exit));
        } else {
            assert!(matches!(last, Opcode::Return(_)));
        }
    }
}

#[test]
fn every_constant_and_call_index_is_defined() {
    let module = compile_program(
        "function add(a, b) { return a + b; } add(1, 2.5) + add(0x10, 3);",
    )
    .unwrap();

    for function in &module.functions {
        for instruction in &function.code {
            match instruction.opcode {
                Opcode::LoadConst(k) => assert!(k < module.constants.len()),
                Opcode::Call(f, _) => assert!((f as usize) < module.functions.len()),
                _ => {}
            }
        }
    }
}

// Lexical round trips.

#[test]
fn stripping_comments_preserves_the_token_stream() {
    let commented = "var x = 1; // set x\n/* adjust */ x = x + 2; /* done */";
    let stripped = "var x = 1; \n x = x + 2; ";

    let a: Vec<(TokenKind, String)> = Lexer::new(commented)
        .tokenize()
        .into_iter()
        .map(|t| (t.kind, t.lexeme))
        .collect();
    let b: Vec<(TokenKind, String)> = Lexer::new(stripped)
        .tokenize()
        .into_iter()
        .map(|t| (t.kind, t.lexeme))
        .collect();
    assert_eq!(a, b);
}

#[test]
fn pretty_printed_programs_reparse_identically() {
    let sources = [
        "function fact(n) { if (n <= 1) return 1; return n * fact(n - 1); } fact(5);",
        "var a = [1, 2, 3]; a[0] + a[2];",
        "var done = false; while (!done) { done = true; }",
    ];
    for source in sources {
        let tokens = parser::Lexer::new(source).tokenize();
        let first = parser::Parser::new(tokens).parse().unwrap();
        let printed = first.to_string();
        let tokens = parser::Lexer::new(&printed).tokenize();
        let second = parser::Parser::new(tokens).parse().unwrap();
        assert_eq!(printed, second.to_string(), "source: {}", source);
    }
}

// CLI-level pipeline.

#[test]
fn compile_then_inspect_native_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("prog.rp");
    let output = dir.path().join("prog.rpx");

    std::fs::write(&input, "var x = 3; if (x > 1) { x = x * 2; } x;").unwrap();

    rp_cli::Runtime::new()
        .compile_file(input.to_str().unwrap(), output.to_str().unwrap())
        .unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("function <main>() {"));
    assert!(text.contains("goto label_"));
    assert!(text.contains("exit();"));
}

#[test]
fn executing_a_terminating_program_leaves_no_residue() {
    let tokens = parser::Lexer::new("function f(x) { return x + 1; } f(1) + f(2);").tokenize();
    let program = parser::Parser::new(tokens).parse().unwrap();
    let module = parser::Compiler::new().compile(&program).unwrap();

    let mut vm = interpreter::VirtualMachine::new();
    assert_eq!(vm.execute(&module).unwrap(), Value::Number(5.0));
    assert_eq!(vm.stack_size(), 0);
    assert_eq!(vm.call_stack_depth(), 0);
    assert!(!vm.has_error());
}
