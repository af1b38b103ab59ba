//! Integer arithmetic

use super::{materialize, matching_types, Lowered};
use crate::error::CodegenError;
use crate::regpool::RegisterPool;
use ember_ir::{ArithmeticOp, Instruction, IrValue};
use log::trace;

fn operation_name(op: ArithmeticOp) -> &'static str {
    match op {
        ArithmeticOp::Add => "add",
        ArithmeticOp::Sub => "sub",
        ArithmeticOp::Mul => "mul",
        ArithmeticOp::Div => "div",
    }
}

/// Lower `lhs op rhs`; both operands must share one non-bool type
///
/// Division by zero is left to the target at run time.
pub fn lower_binary(
    pool: &mut RegisterPool,
    op: ArithmeticOp,
    lhs: &IrValue,
    rhs: &IrValue,
) -> Result<Lowered, CodegenError> {
    let operation = operation_name(op);
    let ty = matching_types(lhs, rhs, operation)?;
    if ty.is_bool() {
        return Err(CodegenError::TypeMismatch {
            operation,
            message: "arithmetic is not defined on bool".to_string(),
        });
    }

    let mut insts = Vec::new();
    let lhs = materialize(pool, lhs, operation, &mut insts)?;
    let rhs = materialize(pool, rhs, operation, &mut insts)?;
    let result = pool.allocate(ty);
    insts.push(Instruction::Binary {
        result,
        op,
        ty,
        lhs,
        rhs,
    });
    trace!("lower_binary: {} {} -> %{}", op, ty, result);

    Ok(Lowered::new(insts, IrValue::register(result, ty)))
}

pub fn lower_add(pool: &mut RegisterPool, lhs: &IrValue, rhs: &IrValue) -> Result<Lowered, CodegenError> {
    lower_binary(pool, ArithmeticOp::Add, lhs, rhs)
}

pub fn lower_sub(pool: &mut RegisterPool, lhs: &IrValue, rhs: &IrValue) -> Result<Lowered, CodegenError> {
    lower_binary(pool, ArithmeticOp::Sub, lhs, rhs)
}

pub fn lower_mul(pool: &mut RegisterPool, lhs: &IrValue, rhs: &IrValue) -> Result<Lowered, CodegenError> {
    lower_binary(pool, ArithmeticOp::Mul, lhs, rhs)
}

pub fn lower_div(pool: &mut RegisterPool, lhs: &IrValue, rhs: &IrValue) -> Result<Lowered, CodegenError> {
    lower_binary(pool, ArithmeticOp::Div, lhs, rhs)
}
