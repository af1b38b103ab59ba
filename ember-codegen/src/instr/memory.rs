//! Loads and stores

use super::{materialize, operand_type, Lowered};
use crate::error::CodegenError;
use crate::globals::GlobalManager;
use crate::regpool::RegisterPool;
use ember_common::NumberType;
use ember_ir::{Instruction, IrValue};
use log::trace;

/// Load a global into a fresh register
///
/// Globals are never cached: every call emits its own load.
pub fn lower_load_global(
    pool: &mut RegisterPool,
    globals: &GlobalManager,
    name: &str,
) -> Result<Lowered, CodegenError> {
    let ptr = globals.pointer(name)?;
    lower_load(pool, &ptr)
}

/// Read through a pointer operand
///
/// Stack slots reuse a cached load when one is live.
pub fn lower_load(pool: &mut RegisterPool, ptr: &IrValue) -> Result<Lowered, CodegenError> {
    if !ptr.is_pointer() {
        return Err(CodegenError::InvalidOperand {
            operation: "load",
            operand: ptr.kind_name(),
        });
    }
    let mut insts = Vec::new();
    let value = materialize(pool, ptr, "load", &mut insts)?;
    Ok(Lowered::new(insts, value))
}

/// Store `value` through `ptr`; the types must match
///
/// A store into a stack slot drops that slot's cached load.
pub fn lower_store(
    pool: &mut RegisterPool,
    value: &IrValue,
    ptr: &IrValue,
) -> Result<Lowered, CodegenError> {
    if !ptr.is_pointer() {
        return Err(CodegenError::InvalidOperand {
            operation: "store",
            operand: ptr.kind_name(),
        });
    }
    let ty = operand_type(ptr, "store")?;
    let value_ty = operand_type(value, "store")?;
    if ty != value_ty {
        return Err(CodegenError::expected_type("store", ty, value_ty));
    }

    let mut insts = Vec::new();
    let value = materialize(pool, value, "store", &mut insts)?;
    insts.push(Instruction::Store {
        ty,
        value,
        ptr: ptr.clone(),
    });

    if let IrValue::RegisterPointer { id, .. } = ptr {
        pool.invalidate(*id)?;
    }
    trace!("lower_store: {} through {}", ty, ptr);

    Ok(Lowered::statement(insts))
}

/// Store an immediate through `ptr`
pub fn lower_store_constant(
    pool: &mut RegisterPool,
    value: i64,
    ty: NumberType,
    ptr: &IrValue,
) -> Result<Lowered, CodegenError> {
    lower_store(pool, &IrValue::constant(value, ty), ptr)
}
