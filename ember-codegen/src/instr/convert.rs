//! Width conversions between number types
//!
//! Same-width conversions only change the signedness tag and emit nothing.
//! Constants are folded into a constant of the target type.

use super::{materialize, operand_type, Lowered};
use crate::error::CodegenError;
use crate::regpool::RegisterPool;
use ember_common::NumberType;
use ember_ir::{ConversionOp, Instruction, IrValue};
use log::trace;

fn check_source(
    value: &IrValue,
    source: NumberType,
    operation: &'static str,
) -> Result<(), CodegenError> {
    let found = operand_type(value, operation)?;
    if found != source {
        return Err(CodegenError::expected_type(operation, source, found));
    }
    Ok(())
}

/// Retag a value of equal width as `target`
fn reinterpret(
    pool: &mut RegisterPool,
    value: &IrValue,
    target: NumberType,
    operation: &'static str,
) -> Result<Lowered, CodegenError> {
    if let IrValue::Constant { value, .. } = value {
        return Ok(Lowered::new(Vec::new(), IrValue::constant(*value, target)));
    }
    let mut insts = Vec::new();
    let converted = match materialize(pool, value, operation, &mut insts)? {
        IrValue::Register { id, .. } => IrValue::register(id, target),
        other => other,
    };
    Ok(Lowered::new(insts, converted))
}

fn convert(
    pool: &mut RegisterPool,
    value: &IrValue,
    op: ConversionOp,
    source: NumberType,
    target: NumberType,
    operation: &'static str,
) -> Result<Lowered, CodegenError> {
    if let IrValue::Constant { value, .. } = value {
        return Ok(Lowered::new(Vec::new(), IrValue::constant(*value, target)));
    }
    let mut insts = Vec::new();
    let operand = materialize(pool, value, operation, &mut insts)?;
    let result = pool.allocate(target);
    insts.push(Instruction::Convert {
        result,
        op,
        from: source,
        value: operand,
        to: target,
    });
    trace!("{}: {} {} -> {} %{}", operation, op, source, target, result);
    Ok(Lowered::new(insts, IrValue::register(result, target)))
}

/// Widen `value` from `source` to `target`
///
/// Signed sources are sign-extended; unsigned and bool sources are
/// zero-extended. A narrower target is an invalid conversion.
pub fn lower_sign_extend(
    pool: &mut RegisterPool,
    value: &IrValue,
    source: NumberType,
    target: NumberType,
) -> Result<Lowered, CodegenError> {
    let operation = "sign-extend";
    check_source(value, source, operation)?;

    match source.bit_width().cmp(&target.bit_width()) {
        std::cmp::Ordering::Greater => Err(CodegenError::InvalidConversion {
            operation,
            from: source,
            to: target,
        }),
        std::cmp::Ordering::Equal => reinterpret(pool, value, target, operation),
        std::cmp::Ordering::Less => {
            let op = if source.is_signed() {
                ConversionOp::SignExtend
            } else {
                ConversionOp::ZeroExtend
            };
            convert(pool, value, op, source, target, operation)
        }
    }
}

/// Narrow `value` from `source` to `target`, keeping the low bits
///
/// Truncating to bool is rejected; booleans come from comparisons.
pub fn lower_truncate(
    pool: &mut RegisterPool,
    value: &IrValue,
    source: NumberType,
    target: NumberType,
) -> Result<Lowered, CodegenError> {
    let operation = "truncate";
    check_source(value, source, operation)?;

    if target.is_bool() && !source.is_bool() {
        return Err(CodegenError::InvalidConversion {
            operation,
            from: source,
            to: target,
        });
    }

    match source.bit_width().cmp(&target.bit_width()) {
        std::cmp::Ordering::Less => Err(CodegenError::InvalidConversion {
            operation,
            from: source,
            to: target,
        }),
        std::cmp::Ordering::Equal => reinterpret(pool, value, target, operation),
        std::cmp::Ordering::Greater => {
            convert(pool, value, ConversionOp::Truncate, source, target, operation)
        }
    }
}

/// Convert `value` to `target`, extending or truncating as the widths need
pub fn lower_cast(
    pool: &mut RegisterPool,
    value: &IrValue,
    target: NumberType,
) -> Result<Lowered, CodegenError> {
    let source = operand_type(value, "cast")?;
    if target.bit_width() < source.bit_width() {
        lower_truncate(pool, value, source, target)
    } else {
        lower_sign_extend(pool, value, source, target)
    }
}
