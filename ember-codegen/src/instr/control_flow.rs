//! Control flow: labels, branches and returns
//!
//! Every label and branch ends the straight-line region the register pool's
//! cache is valid for, so all of them invalidate it.

use super::{materialize, operand_type, Lowered};
use crate::error::CodegenError;
use crate::regpool::RegisterPool;
use ember_common::{LabelId, NumberType};
use ember_ir::{Instruction, IrValue};
use log::trace;

/// Unconditional jump
pub fn lower_jump(pool: &mut RegisterPool, label: LabelId) -> Vec<Instruction> {
    pool.invalidate_all();
    trace!("lower_jump: L{}", label);
    vec![Instruction::Branch(label)]
}

/// Branch on a bool condition
pub fn lower_conditional_jump(
    pool: &mut RegisterPool,
    condition: &IrValue,
    true_label: LabelId,
    false_label: LabelId,
) -> Result<Lowered, CodegenError> {
    let ty = operand_type(condition, "conditional jump")?;
    if ty != NumberType::Bool {
        return Err(CodegenError::expected_type("conditional jump", NumberType::Bool, ty));
    }

    let mut insts = Vec::new();
    let condition = materialize(pool, condition, "conditional jump", &mut insts)?;
    insts.push(Instruction::BranchCond {
        condition,
        true_label,
        false_label,
    });
    pool.invalidate_all();

    Ok(Lowered::statement(insts))
}

/// Define a label
pub fn lower_label(pool: &mut RegisterPool, label: LabelId) -> Vec<Instruction> {
    pool.invalidate_all();
    vec![Instruction::Label(label)]
}

/// Return an `i32` from the function
pub fn lower_return(pool: &mut RegisterPool, value: &IrValue) -> Result<Lowered, CodegenError> {
    let ty = operand_type(value, "return")?;
    if ty != NumberType::I32 {
        return Err(CodegenError::expected_type("return", NumberType::I32, ty));
    }

    let mut insts = Vec::new();
    let value = materialize(pool, value, "return", &mut insts)?;
    insts.push(Instruction::Return { ty, value });

    Ok(Lowered::statement(insts))
}
