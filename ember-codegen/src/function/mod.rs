//! Function generation
//!
//! `FunctionBuilder` is the safe, ordered API over the instruction lowering
//! functions: frame slots are requested first, then the preamble, then the
//! body, then exactly one postamble.

mod builder;

pub use builder::FunctionBuilder;
