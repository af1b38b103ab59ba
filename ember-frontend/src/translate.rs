//! Translation of the typed AST into IR
//!
//! The translator walks a `Program` once, keeping the symbol table stack
//! in step with the lexical structure and driving an `IrEmitter`:
//!
//! 1. globals are declared in the outermost scope and in the module
//! 2. for each function, locals are collected in traversal order and
//!    given stack slots before the preamble
//! 3. statements are lowered in order, one scope per block
//!
//! Operands narrower than the node type are widened before arithmetic and
//! comparisons. Errors carry the location of the innermost node that has one.

use crate::ast::{Expression, ExpressionKind, Function, GlobalDecl, Program, Statement, StatementKind};
use ember_codegen::{EmitterConfig, FunctionBuilder, IrEmitter};
use ember_common::{
    CompilerError, LabelId, NumberType, SlotIndex, SourceLocation, StorageKind, SymbolEntry,
    SymbolTableStack,
};
use ember_ir::{CompareOp, IrValue, Module};
use log::{debug, info, trace, warn};

/// Convert an error and attach `location` if it has none yet
fn located<T, E: Into<CompilerError>>(
    result: Result<T, E>,
    location: Option<&SourceLocation>,
) -> Result<T, CompilerError> {
    result.map_err(|err| {
        let err = err.into();
        match location {
            Some(location) => err.at(location),
            None => err,
        }
    })
}

/// Type both sides of a comparison are brought to
fn common_type(a: NumberType, b: NumberType) -> NumberType {
    if a == b {
        a
    } else if a.bit_width() != b.bit_width() {
        if a.bit_width() > b.bit_width() {
            a
        } else {
            b
        }
    } else if a.is_unsigned() {
        a
    } else {
        b
    }
}

/// Locals of a function body in the order they will be declared
fn collect_locals<'a>(body: &'a [Statement], locals: &mut Vec<(&'a str, NumberType)>) {
    for stmt in body {
        if let StatementKind::Declare { name, ty, .. } = &stmt.kind {
            locals.push((name.as_str(), *ty));
        }
        for child in stmt.children() {
            collect_locals(child, locals);
        }
    }
}

pub struct Translator {
    emitter: IrEmitter,
    symbols: SymbolTableStack,
    /// Slot of the next local declared in the open function
    next_slot: SlotIndex,
}

impl Translator {
    pub fn new(config: EmitterConfig) -> Self {
        Self {
            emitter: IrEmitter::new(config),
            symbols: SymbolTableStack::with_global_scope(),
            next_slot: 0,
        }
    }

    /// Translate a whole program into a module
    pub fn translate(mut self, program: &Program) -> Result<Module, CompilerError> {
        for global in &program.globals {
            self.declare_global(global)?;
        }
        for function in &program.functions {
            self.translate_function(function)?;
        }

        let module = self.emitter.finish()?;
        info!(
            "translated {} globals and {} functions",
            program.globals.len(),
            program.functions.len()
        );
        Ok(module)
    }

    fn declare_global(&mut self, global: &GlobalDecl) -> Result<(), CompilerError> {
        located(self.define_global(global), global.location.as_ref())
    }

    fn define_global(&mut self, global: &GlobalDecl) -> Result<(), CompilerError> {
        if let Some(init) = global.init {
            if !global.ty.fits(init) {
                return Err(CompilerError::type_error(
                    format!(
                        "initializer {} of global '{}' does not fit in {}",
                        init, global.name, global.ty
                    ),
                    SourceLocation::unknown(),
                ));
            }
        }

        let mut entry = SymbolEntry::new(
            global.name.clone(),
            global.ty,
            StorageKind::Global,
            global.ty.size_in_bytes(),
        );
        entry.assigned = true;
        self.symbols.declare_entry(entry)?;
        self.emitter.declare_global(&global.name, global.ty, global.init)?;
        Ok(())
    }

    fn translate_function(&mut self, function: &Function) -> Result<(), CompilerError> {
        located(self.lower_function(function), function.location.as_ref())
    }

    fn lower_function(&mut self, function: &Function) -> Result<(), CompilerError> {
        debug!("translating function '{}'", function.name);

        let mut locals = Vec::new();
        collect_locals(&function.body, &mut locals);

        let builder = self.emitter.begin_function(&function.name)?;
        for (name, ty) in locals {
            builder.request_slot(name, ty)?;
        }
        builder.preamble()?;

        self.next_slot = 0;
        self.symbols.push_scope();
        self.translate_statements(&function.body)?;
        self.symbols.pop_scope()?;

        Ok(self.emitter.end_function()?)
    }

    fn builder(&mut self) -> Result<&mut FunctionBuilder, CompilerError> {
        Ok(self.emitter.function()?)
    }

    fn translate_statements(&mut self, body: &[Statement]) -> Result<(), CompilerError> {
        body.iter().try_for_each(|stmt| self.translate_statement(stmt))
    }

    /// Translate `body` in a scope of its own
    fn translate_block(&mut self, body: &[Statement]) -> Result<(), CompilerError> {
        self.symbols.push_scope();
        self.translate_statements(body)?;
        self.symbols.pop_scope()?;
        Ok(())
    }

    fn translate_statement(&mut self, stmt: &Statement) -> Result<(), CompilerError> {
        trace!("statement at {:?}", stmt.location);
        located(self.lower_statement(stmt), stmt.location.as_ref())
    }

    fn lower_statement(&mut self, stmt: &Statement) -> Result<(), CompilerError> {
        match &stmt.kind {
            StatementKind::Declare { name, ty, init } => {
                // The initializer sees the enclosing scopes only
                let value = match init {
                    Some(init) => Some(self.expression_as(init, *ty)?),
                    None => None,
                };

                let slot = self.next_slot;
                self.next_slot += 1;
                let mut entry =
                    SymbolEntry::new(name.clone(), *ty, StorageKind::StackLocal, ty.size_in_bytes())
                        .with_slot(slot);
                entry.assigned = value.is_some();
                self.symbols.declare_entry(entry)?;

                if let Some(value) = value {
                    self.store_local(slot, &value)?;
                }
            }

            StatementKind::Assign { name, value } => {
                let (ty, is_global, slot) = {
                    let entry = self.symbols.resolve(name)?;
                    (entry.ty, entry.is_global(), entry.slot)
                };
                let value = self.expression_as(value, ty)?;

                if is_global {
                    self.emitter.store_global(name, &value)?;
                } else {
                    self.store_local(Self::local_slot(name, slot)?, &value)?;
                }
                self.symbols.resolve_mut(name)?.assigned = true;
            }

            StatementKind::Print { value } => {
                let value = self.expression(value)?;
                self.builder()?.print(&value)?;
            }

            StatementKind::If {
                condition,
                then_body,
                else_body,
            } => {
                let false_label = self.builder()?.new_label();
                self.condition(condition, false_label)?;
                self.translate_block(then_body)?;

                match else_body {
                    Some(else_body) => {
                        let end_label = self.builder()?.new_label();
                        self.jump_unless_terminated(end_label)?;
                        self.builder()?.label(false_label)?;
                        self.translate_block(else_body)?;
                        self.builder()?.label(end_label)?;
                    }
                    None => self.builder()?.label(false_label)?,
                }
            }

            StatementKind::While {
                condition,
                body,
                step,
                else_body,
            } => {
                let condition_label = self.builder()?.new_label();
                let exit_label = self.builder()?.new_label();

                self.builder()?.label(condition_label)?;
                self.condition(condition, exit_label)?;
                self.translate_block(body)?;
                if let Some(step) = step {
                    self.translate_block(step)?;
                }
                self.jump_unless_terminated(condition_label)?;
                self.builder()?.label(exit_label)?;

                if let Some(else_body) = else_body {
                    self.translate_block(else_body)?;
                }
            }

            StatementKind::Block { body } => self.translate_block(body)?,

            StatementKind::Return { value } => {
                let value = match value {
                    Some(value) => self.expression_as(value, NumberType::I32)?,
                    None => IrValue::constant(0, NumberType::I32),
                };
                self.builder()?.ret(&value)?;
            }
        }
        Ok(())
    }

    fn local_slot(name: &str, slot: Option<SlotIndex>) -> Result<SlotIndex, CompilerError> {
        slot.ok_or_else(|| CompilerError::InternalError {
            message: format!("local '{}' has no stack slot", name),
        })
    }

    fn store_local(&mut self, slot: SlotIndex, value: &IrValue) -> Result<(), CompilerError> {
        let builder = self.builder()?;
        let ptr = builder.slot(slot)?;
        Ok(builder.store(value, &ptr)?)
    }

    fn jump_unless_terminated(&mut self, label: LabelId) -> Result<(), CompilerError> {
        let builder = self.builder()?;
        if !builder.is_terminated() {
            builder.jump(label)?;
        }
        Ok(())
    }

    /// Continue when `condition` holds, otherwise jump to `false_label`
    ///
    /// Comparisons branch on their own result. Any other integer is true
    /// when non-zero.
    fn condition(&mut self, condition: &Expression, false_label: LabelId) -> Result<(), CompilerError> {
        located(self.lower_condition(condition, false_label), condition.location.as_ref())
    }

    fn lower_condition(&mut self, condition: &Expression, false_label: LabelId) -> Result<(), CompilerError> {
        trace!("condition, L{} when false", false_label);

        let (op, lhs, rhs) = match &condition.kind {
            ExpressionKind::Compare { op, lhs, rhs } => {
                let (lhs, rhs) = self.compare_operands(lhs, rhs)?;
                (*op, lhs, rhs)
            }
            _ if condition.ty != NumberType::Bool => {
                let value = self.expression(condition)?;
                (CompareOp::Ne, value, IrValue::constant(0, condition.ty))
            }
            _ => {
                let value = self.expression(condition)?;
                let builder = self.builder()?;
                let true_label = builder.new_label();
                builder.conditional_jump(&value, true_label, false_label)?;
                return Ok(builder.label(true_label)?);
            }
        };

        self.builder()?.compare_jump(op, &lhs, &rhs, false_label)?;
        Ok(())
    }

    fn compare_operands(
        &mut self,
        lhs: &Expression,
        rhs: &Expression,
    ) -> Result<(IrValue, IrValue), CompilerError> {
        let ty = common_type(lhs.ty, rhs.ty);
        let lhs = self.expression_as(lhs, ty)?;
        let rhs = self.expression_as(rhs, ty)?;
        Ok((lhs, rhs))
    }

    /// Evaluate `expr` and convert the result to `ty`
    fn expression_as(&mut self, expr: &Expression, ty: NumberType) -> Result<IrValue, CompilerError> {
        let value = self.expression(expr)?;
        located(self.coerce(value, ty), expr.location.as_ref())
    }

    fn coerce(&mut self, value: IrValue, ty: NumberType) -> Result<IrValue, CompilerError> {
        if value.number_type() == Some(ty) {
            return Ok(value);
        }
        Ok(self.builder()?.cast(&value, ty)?)
    }

    fn expression(&mut self, expr: &Expression) -> Result<IrValue, CompilerError> {
        located(self.lower_expression(expr), expr.location.as_ref())
    }

    fn lower_expression(&mut self, expr: &Expression) -> Result<IrValue, CompilerError> {
        match &expr.kind {
            ExpressionKind::Literal { value } => {
                if !expr.ty.fits(*value) {
                    return Err(CompilerError::type_error(
                        format!("literal {} does not fit in {}", value, expr.ty),
                        SourceLocation::unknown(),
                    ));
                }
                Ok(IrValue::constant(*value, expr.ty))
            }

            ExpressionKind::Identifier { name } => {
                let value = self.load_variable(name)?;
                self.coerce(value, expr.ty)
            }

            ExpressionKind::Binary { op, lhs, rhs } => {
                let lhs = self.expression_as(lhs, expr.ty)?;
                let rhs = self.expression_as(rhs, expr.ty)?;
                Ok(self.builder()?.binary(*op, &lhs, &rhs)?)
            }

            ExpressionKind::Compare { op, lhs, rhs } => {
                let (lhs, rhs) = self.compare_operands(lhs, rhs)?;
                Ok(self.builder()?.compare(*op, &lhs, &rhs)?)
            }

            ExpressionKind::Logical { op, lhs, rhs } => {
                let lhs = self.expression_as(lhs, NumberType::Bool)?;
                let rhs = self.expression_as(rhs, NumberType::Bool)?;
                Ok(self.builder()?.logical(*op, &lhs, &rhs)?)
            }

            ExpressionKind::Cast { value } => {
                let value = self.expression(value)?;
                self.coerce(value, expr.ty)
            }
        }
    }

    /// Read a variable into a register
    fn load_variable(&mut self, name: &str) -> Result<IrValue, CompilerError> {
        let (is_global, slot) = {
            let entry = self.symbols.resolve(name)?;
            if !entry.assigned {
                warn!("'{}' is read before it is assigned", name);
            }
            (entry.is_global(), entry.slot)
        };

        if is_global {
            return Ok(self.emitter.load_global(name)?);
        }
        let slot = Self::local_slot(name, slot)?;
        let builder = self.builder()?;
        let ptr = builder.slot(slot)?;
        Ok(builder.load(&ptr)?)
    }
}

/// Translate `program` into a module configured by `config`
pub fn translate_program(program: &Program, config: EmitterConfig) -> Result<Module, CompilerError> {
    Translator::new(config).translate(program)
}
