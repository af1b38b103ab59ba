//! High-level API for building one function
//!
//! The builder owns the function's register pool and label generator and
//! enforces the emission order:
//! - stack slots can only be requested before the preamble
//! - nothing can be emitted before the preamble or after the postamble
//! - the preamble and postamble are each emitted once
//!
//! Misuse is reported as `CodegenError::InvalidState`.

use crate::error::CodegenError;
use crate::frame::{compute_frame_layout, FrameLayout, StackEntry};
use crate::globals::GlobalManager;
use crate::instr::{self, Lowered};
use crate::regpool::RegisterPool;
use ember_common::{LabelGenerator, LabelId, NumberType, SlotIndex};
use ember_ir::{ArithmeticOp, CompareOp, FunctionBlock, Instruction, IrValue, LogicalOp};
use log::{debug, trace};

pub struct FunctionBuilder {
    name: String,

    pool: RegisterPool,

    labels: LabelGenerator,

    /// Slots requested before the preamble, in request order
    stack_entries: Vec<StackEntry>,

    /// Slot pointers, filled in by the preamble
    slots: Vec<IrValue>,

    layout: Option<FrameLayout>,

    instructions: Vec<Instruction>,

    preamble_emitted: bool,

    postamble_emitted: bool,

    /// The last emitted instruction ended a basic block
    terminated: bool,
}

impl FunctionBuilder {
    pub fn new(name: &str) -> Self {
        debug!("Creating FunctionBuilder for '{}'", name);
        Self {
            name: name.to_string(),
            pool: RegisterPool::new(),
            labels: LabelGenerator::new(),
            stack_entries: Vec::new(),
            slots: Vec::new(),
            layout: None,
            instructions: Vec::new(),
            preamble_emitted: false,
            postamble_emitted: false,
            terminated: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pool(&self) -> &RegisterPool {
        &self.pool
    }

    pub fn stack_entries(&self) -> &[StackEntry] {
        &self.stack_entries
    }

    /// Frame layout, once the preamble has been emitted
    pub fn layout(&self) -> Option<&FrameLayout> {
        self.layout.as_ref()
    }

    /// Check if the current block already ended with a branch or return
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Request a stack slot; must happen before the preamble
    pub fn request_slot(&mut self, name: &str, ty: NumberType) -> Result<SlotIndex, CodegenError> {
        if self.preamble_emitted {
            return Err(CodegenError::invalid_state(format!(
                "stack slot '{}' requested after the preamble of '{}'",
                name, self.name
            )));
        }
        let index = self.stack_entries.len();
        self.stack_entries.push(StackEntry::new(name, ty));
        trace!("{}: slot {} = {} {}", self.name, index, ty, name);
        Ok(index)
    }

    /// Lay out the frame and emit one `alloca` per requested slot
    pub fn preamble(&mut self) -> Result<&FrameLayout, CodegenError> {
        if self.preamble_emitted {
            return Err(CodegenError::invalid_state(format!(
                "preamble of '{}' already emitted",
                self.name
            )));
        }

        let layout = compute_frame_layout(&self.stack_entries)?;
        debug!("{}: preamble with {} slots, {} bytes", self.name, layout.slots.len(), layout.size);

        if !layout.slots.is_empty() {
            self.instructions.push(Instruction::Comment(layout.to_string()));
        }
        for slot in &layout.slots {
            let id = self.pool.allocate_slot(slot.ty);
            self.instructions.push(Instruction::Alloca {
                result: id,
                ty: slot.ty,
                align: slot.align,
            });
            self.slots.push(IrValue::RegisterPointer { id, ty: slot.ty });
        }

        self.preamble_emitted = true;
        Ok(self.layout.insert(layout))
    }

    /// Pointer to a slot laid out by the preamble
    pub fn slot(&self, index: SlotIndex) -> Result<IrValue, CodegenError> {
        self.slots.get(index).cloned().ok_or_else(|| {
            CodegenError::invalid_state(format!(
                "no stack slot {} in '{}' (preamble emitted: {})",
                index, self.name, self.preamble_emitted
            ))
        })
    }

    pub fn new_label(&mut self) -> LabelId {
        self.labels.next_label()
    }

    fn check_body(&self, operation: &str) -> Result<(), CodegenError> {
        if !self.preamble_emitted {
            return Err(CodegenError::invalid_state(format!(
                "{} in '{}' before its preamble",
                operation, self.name
            )));
        }
        if self.postamble_emitted {
            return Err(CodegenError::invalid_state(format!(
                "{} in '{}' after its postamble",
                operation, self.name
            )));
        }
        Ok(())
    }

    /// Start a fresh (unreachable) block if the current one already ended
    fn open_block(&mut self) {
        if self.terminated {
            let label = self.labels.next_label();
            trace!("{}: opening unreachable block L{}", self.name, label);
            let insts = instr::lower_label(&mut self.pool, label);
            self.emit(insts);
        }
    }

    fn begin(&mut self, operation: &str) -> Result<(), CodegenError> {
        self.check_body(operation)?;
        self.open_block();
        Ok(())
    }

    fn emit(&mut self, insts: Vec<Instruction>) {
        for inst in insts {
            self.terminated = inst.is_terminator();
            self.instructions.push(inst);
        }
    }

    fn emit_lowered(&mut self, lowered: Lowered) -> IrValue {
        self.emit(lowered.instructions);
        lowered.value
    }

    pub fn binary(&mut self, op: ArithmeticOp, lhs: &IrValue, rhs: &IrValue) -> Result<IrValue, CodegenError> {
        self.begin("arithmetic")?;
        let lowered = instr::lower_binary(&mut self.pool, op, lhs, rhs)?;
        Ok(self.emit_lowered(lowered))
    }

    pub fn compare(&mut self, op: CompareOp, lhs: &IrValue, rhs: &IrValue) -> Result<IrValue, CodegenError> {
        self.begin("compare")?;
        let lowered = instr::lower_compare(&mut self.pool, op, lhs, rhs)?;
        Ok(self.emit_lowered(lowered))
    }

    pub fn logical(&mut self, op: LogicalOp, lhs: &IrValue, rhs: &IrValue) -> Result<IrValue, CodegenError> {
        self.begin("logical compare")?;
        let lowered = instr::lower_logical(&mut self.pool, op, lhs, rhs)?;
        Ok(self.emit_lowered(lowered))
    }

    /// Continue when `lhs op rhs` holds, otherwise jump to `false_label`
    pub fn compare_jump(
        &mut self,
        op: CompareOp,
        lhs: &IrValue,
        rhs: &IrValue,
        false_label: LabelId,
    ) -> Result<IrValue, CodegenError> {
        self.begin("compare-and-jump")?;
        let lowered =
            instr::lower_compare_jump(&mut self.pool, &mut self.labels, op, lhs, rhs, false_label)?;
        Ok(self.emit_lowered(lowered))
    }

    pub fn sign_extend(&mut self, value: &IrValue, source: NumberType, target: NumberType) -> Result<IrValue, CodegenError> {
        self.begin("sign-extend")?;
        let lowered = instr::lower_sign_extend(&mut self.pool, value, source, target)?;
        Ok(self.emit_lowered(lowered))
    }

    pub fn truncate(&mut self, value: &IrValue, source: NumberType, target: NumberType) -> Result<IrValue, CodegenError> {
        self.begin("truncate")?;
        let lowered = instr::lower_truncate(&mut self.pool, value, source, target)?;
        Ok(self.emit_lowered(lowered))
    }

    pub fn cast(&mut self, value: &IrValue, target: NumberType) -> Result<IrValue, CodegenError> {
        self.begin("cast")?;
        let lowered = instr::lower_cast(&mut self.pool, value, target)?;
        Ok(self.emit_lowered(lowered))
    }

    /// Read a slot or global into a register
    pub fn load(&mut self, ptr: &IrValue) -> Result<IrValue, CodegenError> {
        self.begin("load")?;
        let lowered = instr::lower_load(&mut self.pool, ptr)?;
        Ok(self.emit_lowered(lowered))
    }

    pub fn load_global(&mut self, globals: &GlobalManager, name: &str) -> Result<IrValue, CodegenError> {
        self.begin("load")?;
        let lowered = instr::lower_load_global(&mut self.pool, globals, name)?;
        Ok(self.emit_lowered(lowered))
    }

    pub fn store(&mut self, value: &IrValue, ptr: &IrValue) -> Result<(), CodegenError> {
        self.begin("store")?;
        let lowered = instr::lower_store(&mut self.pool, value, ptr)?;
        self.emit_lowered(lowered);
        Ok(())
    }

    pub fn store_constant(&mut self, value: i64, ty: NumberType, ptr: &IrValue) -> Result<(), CodegenError> {
        self.begin("store")?;
        let lowered = instr::lower_store_constant(&mut self.pool, value, ty, ptr)?;
        self.emit_lowered(lowered);
        Ok(())
    }

    pub fn print(&mut self, value: &IrValue) -> Result<(), CodegenError> {
        self.begin("print")?;
        let lowered = instr::lower_print(&mut self.pool, value)?;
        self.emit_lowered(lowered);
        Ok(())
    }

    pub fn jump(&mut self, label: LabelId) -> Result<(), CodegenError> {
        self.begin("jump")?;
        let insts = instr::lower_jump(&mut self.pool, label);
        self.emit(insts);
        Ok(())
    }

    pub fn conditional_jump(
        &mut self,
        condition: &IrValue,
        true_label: LabelId,
        false_label: LabelId,
    ) -> Result<(), CodegenError> {
        self.begin("conditional jump")?;
        let lowered = instr::lower_conditional_jump(&mut self.pool, condition, true_label, false_label)?;
        self.emit_lowered(lowered);
        Ok(())
    }

    /// Start block `label`, falling through into it from an open block
    pub fn label(&mut self, label: LabelId) -> Result<(), CodegenError> {
        self.check_body("label")?;
        if !self.terminated {
            trace!("{}: explicit fall-through into L{}", self.name, label);
            let insts = instr::lower_jump(&mut self.pool, label);
            self.emit(insts);
        }
        let insts = instr::lower_label(&mut self.pool, label);
        self.emit(insts);
        Ok(())
    }

    pub fn ret(&mut self, value: &IrValue) -> Result<(), CodegenError> {
        self.begin("return")?;
        let lowered = instr::lower_return(&mut self.pool, value)?;
        self.emit_lowered(lowered);
        Ok(())
    }

    /// Close the function and hand back its finished block
    ///
    /// Falls off the end with `ret i32 0` unless the current block already
    /// ended. The register pool is reset afterwards.
    pub fn postamble(&mut self) -> Result<FunctionBlock, CodegenError> {
        self.check_body("postamble")?;
        if !self.terminated {
            self.ret(&IrValue::constant(0, NumberType::I32))?;
        }
        self.postamble_emitted = true;

        let instructions = std::mem::take(&mut self.instructions);
        debug!(
            "{}: postamble, {} instructions, {} registers",
            self.name,
            instructions.len(),
            self.pool.issued()
        );
        self.pool.reset();
        Ok(FunctionBlock::new(&self.name, instructions))
    }
}
