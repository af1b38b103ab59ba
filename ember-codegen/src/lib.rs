//! Ember IR backend - IR Emission Engine
//!
//! This crate turns typed operations into textual virtual-register IR. It
//! includes:
//!
//! - The virtual register pool and its load cache
//! - Stack frame layout
//! - Instruction lowering for arithmetic, comparisons, conversions,
//!   memory access, control flow and printing
//! - `FunctionBuilder` and `IrEmitter`, the ordered APIs over all of the above

pub mod emitter;
pub mod error;
pub mod frame;
pub mod function;
pub mod globals;
pub mod instr;
pub mod regpool;

pub use emitter::{EmitterConfig, IrEmitter};
pub use error::CodegenError;
pub use frame::{compute_frame_layout, FrameLayout, SlotLayout, StackEntry};
pub use function::FunctionBuilder;
pub use globals::GlobalManager;
pub use instr::Lowered;
pub use regpool::{RegisterKind, RegisterPool};
