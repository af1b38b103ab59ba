//! Ember IR backend - Intermediate Representation
//!
//! This crate defines the textual virtual-register IR produced by the
//! emission engine: operands, instructions, and the module container that
//! renders them.

pub mod ir;
pub mod module;

pub use ir::{
    ArithmeticOp, CompareOp, ConversionOp, FormatString, Instruction, IrValue, LogicalOp,
    PrintArg,
};
pub use module::{FunctionBlock, GlobalVariable, Module};
