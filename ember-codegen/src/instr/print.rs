//! Printing through `printf`

use super::{convert::lower_sign_extend, materialize, operand_type, Lowered};
use crate::error::CodegenError;
use crate::regpool::RegisterPool;
use ember_common::NumberType;
use ember_ir::{FormatString, Instruction, IrValue, PrintArg};
use log::trace;

/// Print a value followed by a newline
///
/// Integers are widened to 64 bits by signedness and printed with `%lld` or
/// `%llu`; booleans print as `true` or `false`. The call clobbers the
/// register pool's cache.
pub fn lower_print(pool: &mut RegisterPool, value: &IrValue) -> Result<Lowered, CodegenError> {
    let ty = operand_type(value, "print")?;
    let mut insts = Vec::new();

    let call = if ty.is_bool() {
        let condition = materialize(pool, value, "print", &mut insts)?;
        // Holds an i8*; only its id is ever used
        let text = pool.allocate(NumberType::U8);
        insts.push(Instruction::SelectString {
            result: text,
            condition,
            if_true: FormatString::True,
            if_false: FormatString::False,
        });
        let result = pool.allocate(NumberType::I32);
        Instruction::Printf {
            result,
            format: FormatString::Text,
            arg: PrintArg::Text(text),
        }
    } else {
        let wide_ty = ty.widest();
        let widened = lower_sign_extend(pool, value, ty, wide_ty)?;
        insts.extend(widened.instructions);
        let wide = materialize(pool, &widened.value, "print", &mut insts)?;
        let format = if ty.is_signed() {
            FormatString::Signed
        } else {
            FormatString::Unsigned
        };
        let result = pool.allocate(NumberType::I32);
        Instruction::Printf {
            result,
            format,
            arg: PrintArg::Number { ty: wide_ty, value: wide },
        }
    };

    trace!("lower_print: {}", ty);
    insts.push(call);
    pool.invalidate_all();
    Ok(Lowered::statement(insts))
}
