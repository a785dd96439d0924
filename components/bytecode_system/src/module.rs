//! Compiled bytecode module: functions plus a shared constant pool.

use crate::instruction::Instruction;
use crate::opcode::Opcode;
use core_types::{RpError, Value};
use std::collections::HashMap;

/// A single compiled function.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Function name (`<main>` for the top level)
    pub name: String,
    /// Number of declared parameters
    pub arity: usize,
    /// Parameter names, in declaration order
    pub params: Vec<String>,
    /// Flat instruction vector
    pub code: Vec<Instruction>,
}

impl Function {
    /// Create an empty function with the given name and parameters.
    pub fn new(name: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            name: name.into(),
            arity: params.len(),
            params,
            code: Vec::new(),
        }
    }

    /// Number of instructions in this function.
    pub fn instruction_count(&self) -> usize {
        self.code.len()
    }
}

/// A compiled bytecode module.
///
/// The module owns an ordered list of functions, a shared constant pool,
/// and a name → index map for call resolution. Constant slot 0 is always
/// nil so that `LoadConst 0` means "load nil".
///
/// # Examples
///
/// ```
/// use bytecode_system::{BytecodeModule, Function, Instruction, Opcode};
/// use core_types::Value;
///
/// let mut module = BytecodeModule::new();
/// let k = module.add_constant(Value::Number(42.0));
///
/// let mut main = Function::new("<main>", vec![]);
/// main.code.push(Instruction::new(Opcode::LoadConst(k)));
/// main.code.push(Instruction::new(Opcode::Exit));
/// let entry = module.register_function(main);
/// module.set_entry(entry);
///
/// assert!(module.finalize().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BytecodeModule {
    /// Compiled functions, in registration order
    pub functions: Vec<Function>,
    /// Shared constant pool (slot 0 is nil)
    pub constants: Vec<Value>,
    function_index: HashMap<String, usize>,
    entry: Option<usize>,
}

impl BytecodeModule {
    /// Create an empty module with the nil constant pre-registered.
    pub fn new() -> Self {
        Self {
            functions: Vec::new(),
            constants: vec![Value::Nil],
            function_index: HashMap::new(),
            entry: None,
        }
    }

    /// Add a constant to the pool and return its index.
    ///
    /// Identical constants are pooled so repeated literals share a slot.
    pub fn add_constant(&mut self, value: Value) -> usize {
        if let Some(idx) = self.constants.iter().position(|c| *c == value) {
            return idx;
        }
        let idx = self.constants.len();
        self.constants.push(value);
        idx
    }

    /// Register a function and return its index.
    ///
    /// Re-registering a name rebinds it to the new function body.
    pub fn register_function(&mut self, function: Function) -> usize {
        let idx = self.functions.len();
        self.function_index.insert(function.name.clone(), idx);
        self.functions.push(function);
        idx
    }

    /// Look up a function index by name.
    pub fn lookup_function(&self, name: &str) -> Option<usize> {
        self.function_index.get(name).copied()
    }

    /// Mark the module's entry function (the compiled top level).
    pub fn set_entry(&mut self, index: usize) {
        self.entry = Some(index);
    }

    /// The module's entry function index, if one was set.
    pub fn entry(&self) -> Option<usize> {
        self.entry
    }

    /// Number of functions in the module.
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Number of constants in the pool.
    pub fn constant_count(&self) -> usize {
        self.constants.len()
    }

    /// Verify module invariants before handing the module to a VM.
    ///
    /// Checks that every jump lands inside its function, every constant and
    /// function index is defined, and every function ends on a `Return`
    /// (`Exit` for the entry function).
    pub fn finalize(&self) -> Result<(), RpError> {
        for (func_idx, function) in self.functions.iter().enumerate() {
            let len = function.code.len();
            let is_entry = self.entry == Some(func_idx);

            match function.code.last().map(|i| &i.opcode) {
                Some(Opcode::Return(_)) => {}
                Some(Opcode::Exit) if is_entry => {}
                _ => {
                    return Err(RpError::compile(format!(
                        "Function '{}' does not end with a return",
                        function.name
                    )));
                }
            }

            for (idx, instruction) in function.code.iter().enumerate() {
                match &instruction.opcode {
                    Opcode::Jump(target)
                    | Opcode::JumpIfFalse(_, target)
                    | Opcode::JumpIfTrue(_, target) => {
                        if *target as usize >= len {
                            return Err(RpError::compile(format!(
                                "Jump target {} out of bounds in '{}'",
                                target, function.name
                            )));
                        }
                    }
                    Opcode::Loop(offset) => {
                        if *offset as usize > idx {
                            return Err(RpError::compile(format!(
                                "Loop offset {} out of bounds in '{}'",
                                offset, function.name
                            )));
                        }
                    }
                    Opcode::LoadConst(k) => {
                        if *k >= self.constants.len() {
                            return Err(RpError::compile(format!(
                                "Constant index {} out of bounds in '{}'",
                                k, function.name
                            )));
                        }
                    }
                    Opcode::Call(f, _) => {
                        if *f as usize >= self.functions.len() {
                            return Err(RpError::compile(format!(
                                "Call target {} out of bounds in '{}'",
                                f, function.name
                            )));
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

impl Default for BytecodeModule {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with(code: Vec<Opcode>) -> BytecodeModule {
        let mut module = BytecodeModule::new();
        let mut main = Function::new("<main>", vec![]);
        main.code = code.into_iter().map(Instruction::new).collect();
        let entry = module.register_function(main);
        module.set_entry(entry);
        module
    }

    #[test]
    fn test_constant_slot_zero_is_nil() {
        let module = BytecodeModule::new();
        assert_eq!(module.constants[0], Value::Nil);
    }

    #[test]
    fn test_add_constant_pools_duplicates() {
        let mut module = BytecodeModule::new();
        let a = module.add_constant(Value::Number(1.0));
        let b = module.add_constant(Value::Number(1.0));
        let c = module.add_constant(Value::Number(2.0));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(module.add_constant(Value::Nil), 0);
    }

    #[test]
    fn test_register_and_lookup_function() {
        let mut module = BytecodeModule::new();
        let idx = module.register_function(Function::new("f", vec!["a".to_string()]));
        assert_eq!(module.lookup_function("f"), Some(idx));
        assert_eq!(module.lookup_function("missing"), None);
        assert_eq!(module.functions[idx].arity, 1);
    }

    #[test]
    fn test_finalize_accepts_valid_module() {
        let module = entry_with(vec![Opcode::LoadConst(0), Opcode::Exit]);
        assert!(module.finalize().is_ok());
    }

    #[test]
    fn test_finalize_rejects_missing_return() {
        let module = entry_with(vec![Opcode::LoadConst(0)]);
        let err = module.finalize().unwrap_err();
        assert!(err.message.contains("does not end with a return"));
    }

    #[test]
    fn test_finalize_rejects_out_of_bounds_jump() {
        let module = entry_with(vec![Opcode::Jump(9), Opcode::Exit]);
        let err = module.finalize().unwrap_err();
        assert!(err.message.contains("Jump target"));
    }

    #[test]
    fn test_finalize_rejects_bad_constant_index() {
        let module = entry_with(vec![Opcode::LoadConst(5), Opcode::Exit]);
        let err = module.finalize().unwrap_err();
        assert!(err.message.contains("Constant index"));
    }

    #[test]
    fn test_finalize_rejects_bad_call_target() {
        let module = entry_with(vec![Opcode::Call(3, 0), Opcode::Exit]);
        let err = module.finalize().unwrap_err();
        assert!(err.message.contains("Call target"));
    }

    #[test]
    fn test_finalize_rejects_loop_past_function_start() {
        let module = entry_with(vec![Opcode::Loop(4), Opcode::Exit]);
        let err = module.finalize().unwrap_err();
        assert!(err.message.contains("Loop offset"));
    }

    #[test]
    fn test_non_entry_function_must_end_with_return() {
        let mut module = BytecodeModule::new();
        let mut f = Function::new("f", vec![]);
        f.code.push(Instruction::new(Opcode::Exit));
        module.register_function(f);
        let mut main = Function::new("<main>", vec![]);
        main.code.push(Instruction::new(Opcode::Exit));
        let entry = module.register_function(main);
        module.set_entry(entry);

        let err = module.finalize().unwrap_err();
        assert!(err.message.contains("does not end with a return"));
    }
}
