//! End-to-end execution tests: source text through the front end into the
//! stack virtual machine.

use core_types::Value;
use interpreter::VirtualMachine;
use parser::{Compiler, Lexer, Parser};

fn run(source: &str) -> Result<Value, core_types::RpError> {
    let tokens = Lexer::new(source).tokenize();
    let program = Parser::new(tokens).parse()?;
    let module = Compiler::new().compile(&program)?;
    VirtualMachine::new().execute(&module)
}

#[test]
fn arithmetic_precedence() {
    assert_eq!(
        run("function f() { return 1 + 2 * 3; } f();").unwrap(),
        Value::Number(7.0)
    );
}

#[test]
fn for_loop_counts_to_five() {
    assert_eq!(
        run("var x = 0; for (x = 0; x < 5; x = x + 1) {} x;").unwrap(),
        Value::Number(5.0)
    );
}

#[test]
fn recursive_factorial() {
    let source = "function fact(n) { if (n <= 1) return 1; return n * fact(n - 1); } fact(5);";
    assert_eq!(run(source).unwrap(), Value::Number(120.0));
}

#[test]
fn recursion_unwinds_the_call_stack() {
    let tokens = Lexer::new(
        "function fact(n) { if (n <= 1) return 1; return n * fact(n - 1); } fact(5);",
    )
    .tokenize();
    let program = Parser::new(tokens).parse().unwrap();
    let module = Compiler::new().compile(&program).unwrap();

    let mut vm = VirtualMachine::new();
    assert_eq!(vm.execute(&module).unwrap(), Value::Number(120.0));
    assert_eq!(vm.call_stack_depth(), 0);
    assert_eq!(vm.stack_size(), 0);
}

#[test]
fn array_literal_indexing() {
    assert_eq!(
        run("var a = [10, 20, 30]; a[1];").unwrap(),
        Value::Number(20.0)
    );
}

#[test]
fn string_concatenation() {
    assert_eq!(
        run("\"ab\\n\" + \"c\";").unwrap(),
        Value::String("ab\nc".to_string())
    );
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let err = run("1 / 0;").unwrap_err();
    assert_eq!(err.message, "Division by zero");
    assert_eq!(err.kind, core_types::ErrorKind::RuntimeError);
}

#[test]
fn while_loop_accumulates() {
    let source = "var sum = 0; var i = 1; while (i <= 4) { sum = sum + i; i = i + 1; } sum;";
    assert_eq!(run(source).unwrap(), Value::Number(10.0));
}

#[test]
fn if_else_selects_branch() {
    assert_eq!(
        run("var x = 3; var y = 0; if (x > 2) { y = 1; } else { y = 2; } y;").unwrap(),
        Value::Number(1.0)
    );
}

#[test]
fn logical_operators_yield_bools() {
    assert_eq!(run("true && false;").unwrap(), Value::Bool(false));
    assert_eq!(run("true || false;").unwrap(), Value::Bool(true));
    assert_eq!(run("!0;").unwrap(), Value::Bool(true));
}

#[test]
fn function_arguments_bind_in_order() {
    assert_eq!(
        run("function sub(a, b) { return a - b; } sub(10, 4);").unwrap(),
        Value::Number(6.0)
    );
}

#[test]
fn nested_calls_compose() {
    let source = "function double(x) { return x * 2; } function inc(x) { return x + 1; } double(inc(4));";
    assert_eq!(run(source).unwrap(), Value::Number(10.0));
}

#[test]
fn function_without_return_yields_nil() {
    assert_eq!(run("function f() { 1; } f();").unwrap(), Value::Nil);
}

#[test]
fn comparisons_mix_with_arithmetic() {
    assert_eq!(run("1 + 2 == 3;").unwrap(), Value::Bool(true));
    assert_eq!(run("2 * 3 != 6;").unwrap(), Value::Bool(false));
}

#[test]
fn float_literals_evaluate() {
    assert_eq!(run("0.5 + 0.25;").unwrap(), Value::Number(0.75));
    assert_eq!(run("1.5e2;").unwrap(), Value::Number(150.0));
}

#[test]
fn hex_literals_evaluate() {
    assert_eq!(run("0xFF;").unwrap(), Value::Number(255.0));
}

#[test]
fn empty_program_yields_nil() {
    assert_eq!(run("").unwrap(), Value::Nil);
}

#[test]
fn char_literal_behaves_as_string() {
    assert_eq!(run("'a' + \"b\";").unwrap(), Value::String("ab".to_string()));
}
