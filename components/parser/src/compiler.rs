//! Bytecode generation from the R+ AST.
//!
//! The compiler walks the tree post-order, emitting into the current
//! function's instruction buffer. It maintains a stack of lexical scopes
//! for variable resolution, a monotonic virtual-register counter, and a
//! label table whose forward references are patched when a function is
//! sealed. Compilation is fail-fast: the first error aborts.

use crate::ast::*;
use bytecode_system::{BytecodeModule, Function, Instruction, Opcode, Optimizer};
use core_types::{RpError, Value};
use std::collections::HashMap;

/// Upper bound on virtual result registers per function.
pub const MAX_REGISTERS: u32 = 256;

/// One lexical scope: an ordered name → slot map.
///
/// Function scopes are resolution boundaries; loop scopes inherit their
/// enclosing function's lookup via a linear scan up the stack.
#[derive(Debug, Clone)]
struct FunctionScope {
    is_function: bool,
    variables: Vec<(String, u32)>,
}

impl FunctionScope {
    fn new(is_function: bool) -> Self {
        Self {
            is_function,
            variables: Vec::new(),
        }
    }

    fn lookup(&self, name: &str) -> Option<u32> {
        self.variables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, slot)| *slot)
    }

    fn insert(&mut self, name: &str, slot: u32) {
        self.variables.push((name.to_string(), slot));
    }
}

/// AST-to-bytecode compiler.
///
/// # Examples
///
/// ```
/// use parser::{Compiler, Lexer, Parser};
///
/// let tokens = Lexer::new("var x = 1 + 2;").tokenize();
/// let program = Parser::new(tokens).parse().unwrap();
/// let module = Compiler::new().compile(&program).unwrap();
/// assert_eq!(module.function_count(), 1);
/// ```
pub struct Compiler {
    module: BytecodeModule,
    scopes: Vec<FunctionScope>,
    code: Vec<Instruction>,
    next_register: u32,
    next_slot: u32,
    next_label: u32,
    label_positions: HashMap<u32, usize>,
    pending_jumps: Vec<(usize, u32)>,
    line: u32,
    optimization_level: u8,
}

impl Compiler {
    /// Create a compiler with optimization disabled.
    pub fn new() -> Self {
        Self {
            module: BytecodeModule::new(),
            scopes: Vec::new(),
            code: Vec::new(),
            next_register: 0,
            next_slot: 0,
            next_label: 0,
            label_positions: HashMap::new(),
            pending_jumps: Vec::new(),
            line: 0,
            optimization_level: 0,
        }
    }

    /// Set the optimization level (0-3).
    pub fn set_optimization_level(&mut self, level: u8) {
        self.optimization_level = level.min(3);
    }

    /// The configured optimization level.
    pub fn optimization_level(&self) -> u8 {
        self.optimization_level
    }

    /// Compile a program into a finalized bytecode module.
    ///
    /// The top level is lowered into an implicit `<main>` function ending
    /// with `Exit`; the value of its final expression statement is the
    /// module's result.
    pub fn compile(mut self, program: &Program) -> Result<BytecodeModule, RpError> {
        self.scopes.push(FunctionScope::new(true));

        let last = program.body.len().checked_sub(1);
        for (i, statement) in program.body.iter().enumerate() {
            let keep_value = last == Some(i);
            self.lower_statement(statement, keep_value)?;
        }

        self.emit(Opcode::Exit);
        let code = self.seal_function()?;

        let mut main = Function::new("<main>", vec![]);
        main.code = code;
        let entry = self.module.register_function(main);
        self.module.set_entry(entry);

        self.scopes.pop();
        debug_assert!(self.scopes.is_empty());

        let mut module = self.module;
        Optimizer::new(self.optimization_level).optimize(&mut module);
        module.finalize()?;
        Ok(module)
    }

    // Statement lowering. `keep_value` leaves an expression statement's
    // result on the stack for the module result; everything else pops it.
    fn lower_statement(&mut self, statement: &Statement, keep_value: bool) -> Result<(), RpError> {
        self.line = statement.position().line;

        match statement {
            Statement::ExpressionStatement { expression, .. } => {
                self.lower_expression(expression)?;
                if !keep_value {
                    self.emit(Opcode::Pop);
                }
                Ok(())
            }

            Statement::Block { body, .. } => {
                for statement in body {
                    self.lower_statement(statement, false)?;
                }
                Ok(())
            }

            Statement::VariableDeclaration { declarations, .. } => {
                for declarator in declarations {
                    match &declarator.init {
                        Some(init) => self.lower_expression(init)?,
                        None => {
                            self.emit(Opcode::LoadConst(0));
                            self.allocate_register()?;
                        }
                    }
                    let value_reg = self.next_register.saturating_sub(1);
                    let slot = match self.lookup_variable(&declarator.name) {
                        Some(slot) => slot,
                        None => self.allocate_variable(&declarator.name)?,
                    };
                    self.emit(Opcode::StoreVar(slot, value_reg));
                    self.emit(Opcode::Pop);
                }
                Ok(())
            }

            Statement::If {
                condition,
                consequent,
                alternate,
                ..
            } => {
                self.lower_expression(condition)?;
                let cond_reg = self.next_register.saturating_sub(1);

                let false_label = self.gen_label();
                self.emit_jump(Opcode::JumpIfFalse(cond_reg, 0), false_label);

                self.lower_statement(consequent, false)?;

                let end_label = self.gen_label();
                self.emit_jump(Opcode::Jump(0), end_label);

                self.mark_label(false_label);
                if let Some(alternate) = alternate {
                    self.lower_statement(alternate, false)?;
                }
                self.mark_label(end_label);
                Ok(())
            }

            Statement::While { condition, body, .. } => {
                let loop_label = self.gen_label();
                self.mark_label(loop_label);

                self.lower_expression(condition)?;
                let cond_reg = self.next_register.saturating_sub(1);

                let exit_label = self.gen_label();
                self.emit_jump(Opcode::JumpIfFalse(cond_reg, 0), exit_label);

                self.lower_statement(body, false)?;
                self.emit_jump(Opcode::Jump(0), loop_label);
                self.mark_label(exit_label);
                Ok(())
            }

            Statement::For {
                init,
                condition,
                update,
                body,
                ..
            } => {
                self.scopes.push(FunctionScope::new(false));

                match init {
                    Some(ForInit::Declaration(declaration)) => {
                        self.lower_statement(declaration, false)?;
                    }
                    Some(ForInit::Expression(expression)) => {
                        self.lower_expression(expression)?;
                        self.emit(Opcode::Pop);
                    }
                    None => {}
                }

                let loop_label = self.gen_label();
                self.mark_label(loop_label);

                // A missing condition is constant true: fall through to the
                // body with no conditional exit.
                let exit_label = self.gen_label();
                if let Some(condition) = condition {
                    self.lower_expression(condition)?;
                    let cond_reg = self.next_register.saturating_sub(1);
                    self.emit_jump(Opcode::JumpIfFalse(cond_reg, 0), exit_label);
                }

                self.lower_statement(body, false)?;

                if let Some(update) = update {
                    self.lower_expression(update)?;
                    self.emit(Opcode::Pop);
                }

                self.emit_jump(Opcode::Jump(0), loop_label);
                self.mark_label(exit_label);

                self.scopes.pop();
                Ok(())
            }

            Statement::FunctionDeclaration {
                name, params, body, ..
            } => self.lower_function(name, params, body),

            Statement::Return { argument, .. } => {
                match argument {
                    Some(argument) => {
                        self.lower_expression(argument)?;
                        let value_reg = self.next_register.saturating_sub(1);
                        self.emit(Opcode::Return(Some(value_reg)));
                    }
                    None => {
                        self.emit(Opcode::LoadConst(0));
                        self.emit(Opcode::Return(None));
                    }
                }
                Ok(())
            }

            Statement::Empty { .. } => Ok(()),

            other => Err(self.error_at(format!(
                "Unknown AST node type at line {}",
                other.position().line
            ))),
        }
    }

    fn lower_function(
        &mut self,
        name: &str,
        params: &[String],
        body: &[Statement],
    ) -> Result<(), RpError> {
        // Save the enclosing function's state; nested functions compile
        // into a fresh buffer and restore it afterwards.
        let saved_code = std::mem::take(&mut self.code);
        let saved_register = std::mem::replace(&mut self.next_register, 0);
        let saved_slot = std::mem::replace(&mut self.next_slot, 0);
        let saved_positions = std::mem::take(&mut self.label_positions);
        let saved_pending = std::mem::take(&mut self.pending_jumps);

        let mut scope = FunctionScope::new(true);
        for param in params {
            let slot = self.next_slot;
            self.next_slot += 1;
            scope.insert(param, slot);
        }
        self.scopes.push(scope);

        // Register ahead of the body so recursive calls resolve.
        let func_index = self
            .module
            .register_function(Function::new(name, params.to_vec()));

        let result = (|| -> Result<(), RpError> {
            for statement in body {
                self.lower_statement(statement, false)?;
            }

            let ends_with_return = matches!(
                self.code.last().map(|i| &i.opcode),
                Some(Opcode::Return(_))
            );
            // A branch label marked after the final return (e.g. an
            // if/else where both arms return) must still land on a real
            // instruction, so the implicit return also covers that case.
            let dangling_label = self.pending_jumps.iter().any(|(_, label)| {
                self.label_positions.get(label) == Some(&self.code.len())
            });
            if !ends_with_return || dangling_label {
                self.emit(Opcode::LoadConst(0));
                self.emit(Opcode::Return(None));
            }
            Ok(())
        })();

        let sealed = result.and_then(|_| self.seal_function());

        self.scopes.pop();
        self.code = saved_code;
        self.next_register = saved_register;
        self.next_slot = saved_slot;
        self.label_positions = saved_positions;
        self.pending_jumps = saved_pending;

        self.module.functions[func_index].code = sealed?;
        Ok(())
    }

    // Expression lowering. Every expression leaves exactly one value on
    // the stack-machine stack and advances the register counter for each
    // value-producing operation.
    fn lower_expression(&mut self, expression: &Expression) -> Result<(), RpError> {
        self.line = expression.position().line;

        match expression {
            Expression::Literal { kind, text, .. } => {
                let value = self.literal_value(*kind, text)?;
                let index = self.module.add_constant(value);
                self.emit(Opcode::LoadConst(index));
                self.allocate_register()
            }

            Expression::Identifier { name, position } => {
                match self.lookup_variable(name) {
                    Some(slot) => {
                        self.emit(Opcode::LoadVar(slot));
                        self.allocate_register()
                    }
                    None => Err(RpError::reference(format!("Undefined variable: {}", name))
                        .with_position(*position)),
                }
            }

            Expression::Binary { op, left, right, .. } => {
                self.lower_expression(left)?;
                let left_reg = self.next_register.saturating_sub(1);
                self.lower_expression(right)?;
                let right_reg = self.next_register.saturating_sub(1);

                let opcode = self.binary_opcode(*op, left_reg, right_reg)?;
                self.emit(opcode);
                Ok(())
            }

            Expression::Unary { op, operand, .. } => {
                self.lower_expression(operand)?;
                let reg = self.next_register.saturating_sub(1);

                let opcode = match op {
                    UnaryOp::Neg => Opcode::Neg(reg),
                    UnaryOp::Not => Opcode::Not(reg),
                    other => {
                        return Err(self.error_at(format!(
                            "Unknown unary operator: {}",
                            other.symbol()
                        )))
                    }
                };
                self.emit(opcode);
                Ok(())
            }

            Expression::Assign { target, value, .. } => {
                self.lower_expression(value)?;
                let value_reg = self.next_register.saturating_sub(1);

                let name = match target.as_ref() {
                    Expression::Identifier { name, .. } => name.clone(),
                    _ => return Err(self.error_at("Invalid assignment target".to_string())),
                };
                let slot = match self.lookup_variable(&name) {
                    Some(slot) => slot,
                    None => self.allocate_variable(&name)?,
                };
                self.emit(Opcode::StoreVar(slot, value_reg));
                Ok(())
            }

            Expression::Call { callee, args, position } => {
                for arg in args {
                    self.lower_expression(arg)?;
                }

                let name = match callee.as_ref() {
                    Expression::Identifier { name, .. } => name.clone(),
                    other => {
                        return Err(self.error_at(format!(
                            "Unknown AST node type at line {}",
                            other.position().line
                        )))
                    }
                };
                let func_index = self
                    .module
                    .lookup_function(&name)
                    .ok_or_else(|| {
                        RpError::reference(format!("Undefined function: {}", name))
                            .with_position(*position)
                    })?;

                self.emit(Opcode::Call(func_index as u32, args.len() as u32));
                self.allocate_register()
            }

            Expression::ArrayLiteral { elements, .. } => {
                for element in elements {
                    self.lower_expression(element)?;
                }
                self.emit(Opcode::NewArray(elements.len() as u32));
                self.allocate_register()
            }

            Expression::Index { array, index, .. } => {
                self.lower_expression(array)?;
                let array_reg = self.next_register.saturating_sub(1);
                self.lower_expression(index)?;
                let index_reg = self.next_register.saturating_sub(1);
                self.emit(Opcode::IndexLoad(array_reg, index_reg));
                Ok(())
            }

            other => Err(self.error_at(format!(
                "Unknown AST node type at line {}",
                other.position().line
            ))),
        }
    }

    fn literal_value(&self, kind: LiteralKind, text: &str) -> Result<Value, RpError> {
        let value = match kind {
            LiteralKind::Number => {
                let number = if let Some(hex) = text
                    .strip_prefix("0x")
                    .or_else(|| text.strip_prefix("0X"))
                {
                    // Bare "0x" is a degenerate literal with value zero.
                    u64::from_str_radix(hex, 16).unwrap_or(0) as f64
                } else {
                    text.parse::<f64>().map_err(|_| {
                        self.error_at(format!("Invalid number literal: {}", text))
                    })?
                };
                Value::Number(number)
            }
            LiteralKind::Float => Value::Number(text.parse::<f64>().map_err(|_| {
                self.error_at(format!("Invalid number literal: {}", text))
            })?),
            LiteralKind::String => Value::String(text.to_string()),
            LiteralKind::Bool => Value::Bool(text == "true"),
            LiteralKind::Null => Value::Nil,
        };
        Ok(value)
    }

    fn binary_opcode(&self, op: BinaryOp, r1: u32, r2: u32) -> Result<Opcode, RpError> {
        let opcode = match op {
            BinaryOp::Add => Opcode::Add(r1, r2),
            BinaryOp::Sub => Opcode::Sub(r1, r2),
            BinaryOp::Mul => Opcode::Mul(r1, r2),
            BinaryOp::Div => Opcode::Div(r1, r2),
            BinaryOp::Mod => Opcode::Mod(r1, r2),
            BinaryOp::Equal => Opcode::Equal(r1, r2),
            BinaryOp::NotEqual => Opcode::NotEqual(r1, r2),
            BinaryOp::Less => Opcode::Less(r1, r2),
            BinaryOp::LessEqual => Opcode::LessEqual(r1, r2),
            BinaryOp::Greater => Opcode::Greater(r1, r2),
            BinaryOp::GreaterEqual => Opcode::GreaterEqual(r1, r2),
            BinaryOp::And => Opcode::And(r1, r2),
            BinaryOp::Or => Opcode::Or(r1, r2),
            other => {
                return Err(self.error_at(format!(
                    "Unknown binary operator: {}",
                    other.symbol()
                )))
            }
        };
        Ok(opcode)
    }

    // Emission and bookkeeping.

    fn emit(&mut self, opcode: Opcode) -> usize {
        let index = self.code.len();
        self.code.push(Instruction::with_line(opcode, self.line));
        index
    }

    fn emit_jump(&mut self, opcode: Opcode, label: u32) {
        let index = self.emit(opcode);
        self.pending_jumps.push((index, label));
    }

    fn gen_label(&mut self) -> u32 {
        let label = self.next_label;
        self.next_label += 1;
        label
    }

    fn mark_label(&mut self, label: u32) {
        self.label_positions.insert(label, self.code.len());
    }

    /// Patch this function's forward jumps and take its code buffer.
    fn seal_function(&mut self) -> Result<Vec<Instruction>, RpError> {
        let pending = std::mem::take(&mut self.pending_jumps);
        for (index, label) in pending {
            let target = *self
                .label_positions
                .get(&label)
                .ok_or_else(|| RpError::compile("Unresolved label"))?
                as u32;

            match &mut self.code[index].opcode {
                Opcode::Jump(t)
                | Opcode::JumpIfFalse(_, t)
                | Opcode::JumpIfTrue(_, t) => *t = target,
                other => {
                    return Err(RpError::new(
                        core_types::ErrorKind::InternalError,
                        format!("Jump fixup on non-jump opcode {}", other.mnemonic()),
                    ))
                }
            }
        }
        self.label_positions.clear();
        Ok(std::mem::take(&mut self.code))
    }

    fn allocate_register(&mut self) -> Result<(), RpError> {
        if self.next_register >= MAX_REGISTERS {
            return Err(self.error_at("Register overflow: too many temporary values".to_string()));
        }
        self.next_register += 1;
        Ok(())
    }

    fn lookup_variable(&self, name: &str) -> Option<u32> {
        for scope in self.scopes.iter().rev() {
            if let Some(slot) = scope.lookup(name) {
                return Some(slot);
            }
            // Function scopes are resolution boundaries; there are no
            // closures over enclosing functions.
            if scope.is_function {
                break;
            }
        }
        None
    }

    fn allocate_variable(&mut self, name: &str) -> Result<u32, RpError> {
        let slot = self.next_slot;
        match self.scopes.last_mut() {
            Some(scope) => {
                scope.insert(name, slot);
                self.next_slot += 1;
                Ok(slot)
            }
            None => Err(RpError::compile("No active scope for variable allocation")),
        }
    }

    fn error_at(&self, message: String) -> RpError {
        RpError::compile(message)
            .with_position(core_types::SourcePosition::new(self.line, 1))
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
