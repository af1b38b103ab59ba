//! Virtual Register Pool
//!
//! Hands out per-function register ids and tracks which stack slots have a
//! live loaded copy. Loads needed to materialise a slot are queued in the
//! pool and drained by the caller with `take_instructions`, before the
//! instruction that consumes them.

use crate::error::CodegenError;
use ember_common::{NumberType, RegisterId, RegisterIdGenerator};
use ember_ir::{Instruction, IrValue};
use log::trace;

/// What a virtual register holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterKind {
    /// An immutable SSA value
    Value,
    /// The address of a stack slot
    Slot,
}

#[derive(Debug, Clone)]
struct VirtualRegister {
    ty: NumberType,
    kind: RegisterKind,
    /// For slots: the register holding the current loaded copy
    loaded: Option<RegisterId>,
}

/// Per-function register allocator with a materialisation cache
#[derive(Debug, Clone, Default)]
pub struct RegisterPool {
    ids: RegisterIdGenerator,
    /// Indexed by `id - RegisterIdGenerator::FIRST`
    registers: Vec<VirtualRegister>,
    /// Loads queued by `ensure_loaded`
    instructions: Vec<Instruction>,
}

impl RegisterPool {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh(&mut self, ty: NumberType, kind: RegisterKind) -> RegisterId {
        let id = self.ids.next_register();
        self.registers.push(VirtualRegister {
            ty,
            kind,
            loaded: None,
        });
        id
    }

    /// Allocate a register for a freshly computed value
    pub fn allocate(&mut self, ty: NumberType) -> RegisterId {
        let id = self.fresh(ty, RegisterKind::Value);
        trace!("regpool: %{} = new {} value", id, ty);
        id
    }

    /// Allocate a register naming a stack slot; its contents start unloaded
    pub fn allocate_slot(&mut self, ty: NumberType) -> RegisterId {
        let id = self.fresh(ty, RegisterKind::Slot);
        trace!("regpool: %{} = new {} slot", id, ty);
        id
    }

    fn get(&self, id: RegisterId) -> Result<&VirtualRegister, CodegenError> {
        id.checked_sub(RegisterIdGenerator::FIRST)
            .and_then(|index| self.registers.get(index as usize))
            .ok_or(CodegenError::UnknownRegister { id })
    }

    fn get_mut(&mut self, id: RegisterId) -> Result<&mut VirtualRegister, CodegenError> {
        id.checked_sub(RegisterIdGenerator::FIRST)
            .and_then(|index| self.registers.get_mut(index as usize))
            .ok_or(CodegenError::UnknownRegister { id })
    }

    /// Declared type of a register
    pub fn register_type(&self, id: RegisterId) -> Result<NumberType, CodegenError> {
        Ok(self.get(id)?.ty)
    }

    pub fn kind(&self, id: RegisterId) -> Result<RegisterKind, CodegenError> {
        Ok(self.get(id)?.kind)
    }

    /// Check if a register can be used as an operand without a load
    pub fn is_loaded(&self, id: RegisterId) -> Result<bool, CodegenError> {
        let reg = self.get(id)?;
        Ok(match reg.kind {
            RegisterKind::Value => true,
            RegisterKind::Slot => reg.loaded.is_some(),
        })
    }

    /// Make every register in `ids` usable as a `ty` operand
    ///
    /// Value registers are returned unchanged. A slot without a loaded copy
    /// gets `%new = load ty, ty* %slot` queued and `%new` cached; a slot with
    /// a cached copy returns it without emitting anything. Registers of the
    /// same width but different signedness are accepted since IR types carry
    /// no sign.
    pub fn ensure_loaded(
        &mut self,
        ids: &[RegisterId],
        ty: NumberType,
    ) -> Result<Vec<RegisterId>, CodegenError> {
        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            let reg = self.get(id)?;
            if reg.ty.ir_repr() != ty.ir_repr() {
                return Err(CodegenError::expected_type("register use", reg.ty, ty));
            }
            match (reg.kind, reg.loaded) {
                (RegisterKind::Value, _) => out.push(id),
                (RegisterKind::Slot, Some(cached)) => out.push(cached),
                (RegisterKind::Slot, None) => {
                    let loaded = self.allocate(ty);
                    self.instructions.push(Instruction::Load {
                        result: loaded,
                        ty,
                        ptr: IrValue::RegisterPointer { id, ty },
                    });
                    self.get_mut(id)?.loaded = Some(loaded);
                    trace!("regpool: materialised slot %{} into %{}", id, loaded);
                    out.push(loaded);
                }
            }
        }
        Ok(out)
    }

    /// Drop the cached copy of one slot
    pub fn invalidate(&mut self, id: RegisterId) -> Result<(), CodegenError> {
        let reg = self.get_mut(id)?;
        if reg.loaded.take().is_some() {
            trace!("regpool: invalidated slot %{}", id);
        }
        Ok(())
    }

    /// Drop every cached slot copy
    ///
    /// Value registers are SSA definitions and stay usable.
    pub fn invalidate_all(&mut self) {
        for reg in &mut self.registers {
            reg.loaded = None;
        }
        trace!("regpool: invalidated all slots");
    }

    /// Drain the queued load instructions
    pub fn take_instructions(&mut self) -> Vec<Instruction> {
        std::mem::take(&mut self.instructions)
    }

    /// Number of registers handed out in this function
    pub fn issued(&self) -> u32 {
        self.ids.issued()
    }

    /// Forget everything; numbering restarts at 1
    pub fn reset(&mut self) {
        self.ids.reset();
        self.registers.clear();
        self.instructions.clear();
    }
}
