//! Instruction lowering
//!
//! Each lowering function takes the register pool explicitly, checks its
//! operands, and returns the instructions to append together with the value
//! the operation produces. Loads queued by the pool while materialising
//! operands are placed ahead of the instruction that uses them.

pub mod arithmetic;
pub mod compare;
pub mod control_flow;
pub mod convert;
pub mod memory;
pub mod print;

pub use arithmetic::{lower_add, lower_binary, lower_div, lower_mul, lower_sub};
pub use compare::{lower_compare, lower_compare_jump, lower_logical};
pub use control_flow::{lower_conditional_jump, lower_jump, lower_label, lower_return};
pub use convert::{lower_cast, lower_sign_extend, lower_truncate};
pub use memory::{lower_load, lower_load_global, lower_store, lower_store_constant};
pub use print::lower_print;

use crate::error::CodegenError;
use crate::regpool::RegisterPool;
use ember_common::{NumberType, RegisterId};
use ember_ir::{Instruction, IrValue};

#[cfg(test)]
mod tests;

/// Result of lowering one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lowered {
    pub instructions: Vec<Instruction>,
    /// `IrValue::None` for operations that produce nothing
    pub value: IrValue,
}

impl Lowered {
    pub fn new(instructions: Vec<Instruction>, value: IrValue) -> Self {
        Self { instructions, value }
    }

    pub fn statement(instructions: Vec<Instruction>) -> Self {
        Self::new(instructions, IrValue::None)
    }
}

/// Type of an operand, rejecting `None` and labels
pub fn operand_type(value: &IrValue, operation: &'static str) -> Result<NumberType, CodegenError> {
    value.number_type().ok_or(CodegenError::InvalidOperand {
        operation,
        operand: value.kind_name(),
    })
}

fn load_register(
    pool: &mut RegisterPool,
    id: RegisterId,
    ty: NumberType,
    insts: &mut Vec<Instruction>,
) -> Result<RegisterId, CodegenError> {
    let loaded = pool
        .ensure_loaded(&[id], ty)?
        .pop()
        .ok_or(CodegenError::UnknownRegister { id })?;
    insts.extend(pool.take_instructions());
    Ok(loaded)
}

/// Turn an operand into a value an instruction can consume directly
///
/// Slots go through the pool's cache, globals are loaded every time,
/// registers and constants pass through.
pub fn materialize(
    pool: &mut RegisterPool,
    value: &IrValue,
    operation: &'static str,
    insts: &mut Vec<Instruction>,
) -> Result<IrValue, CodegenError> {
    match value {
        IrValue::Register { id, ty } | IrValue::RegisterPointer { id, ty } => {
            let loaded = load_register(pool, *id, *ty, insts)?;
            Ok(IrValue::register(loaded, *ty))
        }
        IrValue::Constant { .. } => Ok(value.clone()),
        IrValue::GlobalPointer { ty, .. } => {
            let result = pool.allocate(*ty);
            insts.push(Instruction::Load {
                result,
                ty: *ty,
                ptr: value.clone(),
            });
            Ok(IrValue::register(result, *ty))
        }
        IrValue::None | IrValue::Label(_) => Err(CodegenError::InvalidOperand {
            operation,
            operand: value.kind_name(),
        }),
    }
}

/// Require two operands of one type and return it
pub(crate) fn matching_types(
    lhs: &IrValue,
    rhs: &IrValue,
    operation: &'static str,
) -> Result<NumberType, CodegenError> {
    let lt = operand_type(lhs, operation)?;
    let rt = operand_type(rhs, operation)?;
    if lt != rt {
        return Err(CodegenError::operand_mismatch(operation, lt, rt));
    }
    Ok(lt)
}
