//! Ember IR backend - Common Types and Utilities
//!
//! This crate contains the numeric type model, error definitions and the
//! scoped symbol tables shared by every part of the Ember backend.

pub mod error;
pub mod source_loc;
pub mod symbol_table;
pub mod types;

pub use error::{CompilerError, Diagnostic, ErrorReporter, Severity};
pub use source_loc::SourceLocation;
pub use symbol_table::{SymbolEntry, SymbolError, SymbolTable, SymbolTableStack};
pub use types::*;
