//! Comparisons and compare-and-branch

use super::{materialize, matching_types, operand_type, Lowered};
use crate::error::CodegenError;
use crate::regpool::RegisterPool;
use ember_common::{LabelGenerator, LabelId, NumberType};
use ember_ir::{CompareOp, Instruction, IrValue, LogicalOp};
use log::trace;

/// Lower `lhs op rhs` into a fresh `i1` register
pub fn lower_compare(
    pool: &mut RegisterPool,
    op: CompareOp,
    lhs: &IrValue,
    rhs: &IrValue,
) -> Result<Lowered, CodegenError> {
    let ty = matching_types(lhs, rhs, "compare")?;

    let mut insts = Vec::new();
    let lhs = materialize(pool, lhs, "compare", &mut insts)?;
    let rhs = materialize(pool, rhs, "compare", &mut insts)?;
    let result = pool.allocate(NumberType::Bool);
    insts.push(Instruction::Compare {
        result,
        op,
        ty,
        lhs,
        rhs,
    });
    trace!("lower_compare: {} {} -> %{}", op.predicate(ty), ty, result);

    Ok(Lowered::new(insts, IrValue::register(result, NumberType::Bool)))
}

/// Lower a logical `and`/`or` over two bool operands
pub fn lower_logical(
    pool: &mut RegisterPool,
    op: LogicalOp,
    lhs: &IrValue,
    rhs: &IrValue,
) -> Result<Lowered, CodegenError> {
    let operation = match op {
        LogicalOp::And => "logical and",
        LogicalOp::Or => "logical or",
    };
    for operand in [lhs, rhs] {
        let ty = operand_type(operand, operation)?;
        if ty != NumberType::Bool {
            return Err(CodegenError::expected_type(operation, NumberType::Bool, ty));
        }
    }

    let mut insts = Vec::new();
    let lhs = materialize(pool, lhs, operation, &mut insts)?;
    let rhs = materialize(pool, rhs, operation, &mut insts)?;
    let result = pool.allocate(NumberType::Bool);
    insts.push(Instruction::Logical { result, op, lhs, rhs });

    Ok(Lowered::new(insts, IrValue::register(result, NumberType::Bool)))
}

/// Compare, then fall through to a fresh label when the comparison holds
/// and jump to `false_label` otherwise
///
/// Produces no value.
pub fn lower_compare_jump(
    pool: &mut RegisterPool,
    labels: &mut LabelGenerator,
    op: CompareOp,
    lhs: &IrValue,
    rhs: &IrValue,
    false_label: LabelId,
) -> Result<Lowered, CodegenError> {
    let Lowered { mut instructions, value } = lower_compare(pool, op, lhs, rhs)?;
    let true_label = labels.next_label();

    instructions.push(Instruction::BranchCond {
        condition: value,
        true_label,
        false_label,
    });
    instructions.push(Instruction::Label(true_label));
    pool.invalidate_all();
    trace!("lower_compare_jump: L{} / L{}", true_label, false_label);

    Ok(Lowered::statement(instructions))
}
