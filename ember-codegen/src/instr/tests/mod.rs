//! Tests for instruction lowering
//!
//! Unit tests for individual operations, plus the global read-modify-write
//! scenario in `memory_tests`.

mod convert_tests;

use ember_ir::Instruction;

/// Render instructions the way they appear in a function body
pub(super) fn lines(insts: &[Instruction]) -> Vec<String> {
    insts.iter().map(|inst| inst.to_string()).collect()
}
