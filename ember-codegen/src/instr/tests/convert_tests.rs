//! Tests for width conversions

use super::lines;
use crate::error::CodegenError;
use crate::instr::{lower_cast, lower_sign_extend, lower_truncate};
use crate::regpool::RegisterPool;
use ember_common::NumberType;
use ember_ir::IrValue;
use pretty_assertions::assert_eq;

#[test]
fn test_i8_round_trip_for_every_value() {
    let mut pool = RegisterPool::new();
    for v in i8::MIN as i64..=i8::MAX as i64 {
        let narrow = IrValue::constant(v, NumberType::I8);
        let wide = lower_sign_extend(&mut pool, &narrow, NumberType::I8, NumberType::I32).unwrap();
        assert_eq!(wide.value, IrValue::Constant { value: v, ty: NumberType::I32 });

        let back = lower_truncate(&mut pool, &wide.value, NumberType::I32, NumberType::I8).unwrap();
        assert_eq!(back.value, narrow, "round trip of {}", v);
    }
    assert_eq!(pool.issued(), 0);
}

#[test]
fn test_register_round_trip_forms() {
    let mut pool = RegisterPool::new();
    let v = IrValue::register(pool.allocate(NumberType::I8), NumberType::I8);

    let wide = lower_sign_extend(&mut pool, &v, NumberType::I8, NumberType::I32).unwrap();
    let back = lower_truncate(&mut pool, &wide.value, NumberType::I32, NumberType::I8).unwrap();

    assert_eq!(lines(&wide.instructions), vec!["%2 = sext i8 %1 to i32"]);
    assert_eq!(lines(&back.instructions), vec!["%3 = trunc i32 %2 to i8"]);
    assert_eq!(back.value, IrValue::register(3, NumberType::I8));
}

#[test]
fn test_unsigned_and_bool_sources_zero_extend() {
    let mut pool = RegisterPool::new();
    let u = IrValue::register(pool.allocate(NumberType::U16), NumberType::U16);
    let b = IrValue::register(pool.allocate(NumberType::Bool), NumberType::Bool);

    let from_u = lower_sign_extend(&mut pool, &u, NumberType::U16, NumberType::U64).unwrap();
    let from_b = lower_sign_extend(&mut pool, &b, NumberType::Bool, NumberType::I32).unwrap();

    assert_eq!(lines(&from_u.instructions), vec!["%3 = zext i16 %1 to i64"]);
    assert_eq!(lines(&from_b.instructions), vec!["%4 = zext i1 %2 to i32"]);
}

#[test]
fn test_constant_zero_extension_keeps_bits() {
    let mut pool = RegisterPool::new();
    let c = IrValue::constant(255, NumberType::U8);

    let wide = lower_sign_extend(&mut pool, &c, NumberType::U8, NumberType::I32).unwrap();
    assert_eq!(wide.value, IrValue::Constant { value: 255, ty: NumberType::I32 });
}

#[test]
fn test_wrong_direction_is_invalid() {
    let mut pool = RegisterPool::new();
    let wide = IrValue::register(pool.allocate(NumberType::I64), NumberType::I64);
    let narrow = IrValue::register(pool.allocate(NumberType::I8), NumberType::I8);

    assert_eq!(
        lower_sign_extend(&mut pool, &wide, NumberType::I64, NumberType::I32),
        Err(CodegenError::InvalidConversion {
            operation: "sign-extend",
            from: NumberType::I64,
            to: NumberType::I32,
        })
    );
    assert_eq!(
        lower_truncate(&mut pool, &narrow, NumberType::I8, NumberType::I16),
        Err(CodegenError::InvalidConversion {
            operation: "truncate",
            from: NumberType::I8,
            to: NumberType::I16,
        })
    );
}

#[test]
fn test_truncate_to_bool_is_invalid() {
    let mut pool = RegisterPool::new();
    let v = IrValue::register(pool.allocate(NumberType::I32), NumberType::I32);

    assert!(matches!(
        lower_truncate(&mut pool, &v, NumberType::I32, NumberType::Bool),
        Err(CodegenError::InvalidConversion { .. })
    ));
}

#[test]
fn test_source_type_must_match() {
    let mut pool = RegisterPool::new();
    let v = IrValue::register(pool.allocate(NumberType::I16), NumberType::I16);

    assert!(matches!(
        lower_sign_extend(&mut pool, &v, NumberType::I8, NumberType::I32),
        Err(CodegenError::TypeMismatch { .. })
    ));
}

#[test]
fn test_same_width_is_reinterpretation() {
    let mut pool = RegisterPool::new();
    let v = IrValue::register(pool.allocate(NumberType::I32), NumberType::I32);

    let as_unsigned = lower_sign_extend(&mut pool, &v, NumberType::I32, NumberType::U32).unwrap();
    assert!(as_unsigned.instructions.is_empty());
    assert_eq!(as_unsigned.value, IrValue::register(1, NumberType::U32));

    let minus_one = IrValue::constant(-1, NumberType::I16);
    let folded = lower_truncate(&mut pool, &minus_one, NumberType::I16, NumberType::U16).unwrap();
    assert_eq!(folded.value, IrValue::Constant { value: 65535, ty: NumberType::U16 });
}

#[test]
fn test_cast_picks_direction() {
    let mut pool = RegisterPool::new();
    let v = IrValue::register(pool.allocate(NumberType::U32), NumberType::U32);

    let narrowed = lower_cast(&mut pool, &v, NumberType::U8).unwrap();
    let widened = lower_cast(&mut pool, &narrowed.value, NumberType::I64).unwrap();

    assert_eq!(lines(&narrowed.instructions), vec!["%2 = trunc i32 %1 to i8"]);
    assert_eq!(lines(&widened.instructions), vec!["%3 = zext i8 %2 to i64"]);
}
