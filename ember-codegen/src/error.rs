//! Code generation errors

use ember_common::{CompilerError, NumberType, RegisterId, SourceLocation, SymbolError};
use thiserror::Error;

/// Errors raised while emitting IR
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    #[error("redeclaration of '{name}'")]
    Redeclaration { name: String },

    #[error("use of undeclared identifier '{name}'")]
    UndeclaredIdentifier { name: String },

    #[error("unknown global symbol '{name}'")]
    UnknownSymbol { name: String },

    #[error("type mismatch in {operation}: {message}")]
    TypeMismatch {
        operation: &'static str,
        message: String,
    },

    #[error("invalid conversion: cannot {operation} {from} to {to}")]
    InvalidConversion {
        operation: &'static str,
        from: NumberType,
        to: NumberType,
    },

    #[error("frame layout error: {message}")]
    FrameLayoutError { message: String },

    #[error("scope stack underflow")]
    StackUnderflow,

    #[error("invalid operand for {operation}: {operand}")]
    InvalidOperand {
        operation: &'static str,
        operand: &'static str,
    },

    #[error("unknown virtual register %{id}")]
    UnknownRegister { id: RegisterId },

    #[error("invalid emitter state: {message}")]
    InvalidState { message: String },
}

impl CodegenError {
    /// Mismatch between two operand types
    pub fn operand_mismatch(operation: &'static str, lhs: NumberType, rhs: NumberType) -> Self {
        CodegenError::TypeMismatch {
            operation,
            message: format!("{} vs {}", lhs, rhs),
        }
    }

    /// Operand of the wrong type where a specific type is required
    pub fn expected_type(operation: &'static str, expected: NumberType, found: NumberType) -> Self {
        CodegenError::TypeMismatch {
            operation,
            message: format!("expected {}, found {}", expected, found),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        CodegenError::InvalidState {
            message: message.into(),
        }
    }
}

impl From<SymbolError> for CodegenError {
    fn from(err: SymbolError) -> Self {
        match err {
            SymbolError::Redeclaration { name } => CodegenError::Redeclaration { name },
            SymbolError::UndeclaredIdentifier { name } => {
                CodegenError::UndeclaredIdentifier { name }
            }
            SymbolError::StackUnderflow { .. } => CodegenError::StackUnderflow,
        }
    }
}

impl From<CodegenError> for CompilerError {
    fn from(err: CodegenError) -> Self {
        let location = SourceLocation::unknown();
        match err {
            CodegenError::Redeclaration { .. }
            | CodegenError::UndeclaredIdentifier { .. }
            | CodegenError::UnknownSymbol { .. } => {
                CompilerError::scope_error(err.to_string(), location)
            }
            CodegenError::TypeMismatch { .. } | CodegenError::InvalidConversion { .. } => {
                CompilerError::type_error(err.to_string(), location)
            }
            _ => CompilerError::codegen_error(err.to_string(), location),
        }
    }
}
