//! Textual native-code rendering of a bytecode module.
//!
//! This is the `.rpx` export format: one `function` block per compiled
//! function, each instruction annotated with its index and mnemonic and
//! lowered into C-style pseudo-code. It is a human-readable export, not a
//! stable wire format.

use bytecode_system::{BytecodeModule, Function, Opcode};
use std::fmt::Write;

/// Renders a module into its textual native form.
#[derive(Debug, Default)]
pub struct NativeEmitter;

impl NativeEmitter {
    /// Create a new emitter.
    pub fn new() -> Self {
        Self
    }

    /// Render the whole module, one function block per function.
    pub fn emit(&self, module: &BytecodeModule) -> String {
        let mut out = String::new();
        for function in &module.functions {
            out.push_str(&self.emit_function(function));
        }
        out
    }

    fn emit_function(&self, function: &Function) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "function {}() {{", function.name);
        let _ = writeln!(out, "  var locals[{}] = {{}};", function.arity);

        for (index, instruction) in function.code.iter().enumerate() {
            let _ = writeln!(out, "  // {}: {}", index, instruction.opcode.mnemonic());
            let _ = writeln!(out, "  {}", lower_opcode(&instruction.opcode, index));
        }

        out.push_str("}\n");
        out
    }
}

fn lower_opcode(opcode: &Opcode, index: usize) -> String {
    match opcode {
        Opcode::LoadConst(k) => format!("r0 = constants[{}];", k),
        Opcode::LoadVar(v) => format!("r0 = locals[{}];", v),
        Opcode::StoreVar(v, r) => format!("locals[{}] = r{};", v, r),
        Opcode::DefineGlobal(name) | Opcode::SetGlobal(name) => {
            format!("globals[\"{}\"] = r0;", name)
        }
        Opcode::GetGlobal(name) => format!("r0 = globals[\"{}\"];", name),
        Opcode::GetLocal(slot) => format!("r0 = locals[{}];", slot),
        Opcode::SetLocal(slot) => format!("locals[{}] = r0;", slot),

        Opcode::Add(a, b) => format!("r0 = r{} + r{};", a, b),
        Opcode::Sub(a, b) => format!("r0 = r{} - r{};", a, b),
        Opcode::Mul(a, b) => format!("r0 = r{} * r{};", a, b),
        Opcode::Div(a, b) => format!("r0 = r{} / r{};", a, b),
        Opcode::Mod(a, b) => format!("r0 = r{} % r{};", a, b),
        Opcode::Neg(r) => format!("r0 = -r{};", r),

        Opcode::Equal(a, b) => format!("r0 = r{} == r{};", a, b),
        Opcode::NotEqual(a, b) => format!("r0 = r{} != r{};", a, b),
        Opcode::Less(a, b) => format!("r0 = r{} < r{};", a, b),
        Opcode::LessEqual(a, b) => format!("r0 = r{} <= r{};", a, b),
        Opcode::Greater(a, b) => format!("r0 = r{} > r{};", a, b),
        Opcode::GreaterEqual(a, b) => format!("r0 = r{} >= r{};", a, b),

        Opcode::And(a, b) => format!("r0 = r{} && r{};", a, b),
        Opcode::Or(a, b) => format!("r0 = r{} || r{};", a, b),
        Opcode::Not(r) => format!("r0 = !r{};", r),

        Opcode::Jump(target) => format!("goto label_{};", target),
        Opcode::JumpIfFalse(r, target) => format!("if (!r{}) goto label_{};", r, target),
        Opcode::JumpIfTrue(r, target) => format!("if (r{}) goto label_{};", r, target),
        Opcode::Loop(offset) => format!("goto label_{};", index.saturating_sub(*offset as usize)),

        Opcode::Call(f, argc) => format!("r0 = call_function({}, {});", f, argc),
        Opcode::Return(Some(r)) => format!("return r{};", r),
        Opcode::Return(None) => "return r0;".to_string(),

        Opcode::Pop => "pop();".to_string(),
        Opcode::Dup => "dup();".to_string(),

        Opcode::NewArray(n) => format!("r0 = new_array({});", n),
        Opcode::IndexLoad(a, i) => format!("r0 = r{}[r{}];", a, i),
        Opcode::IndexStore(a, i, v) => format!("r{}[r{}] = r{};", a, i, v),

        Opcode::Exit => "exit();".to_string(),
    }
}
