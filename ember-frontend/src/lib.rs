//! Ember IR backend - Frontend
//!
//! This crate provides the input side of the backend:
//! - AST: the typed, serde-readable program tree
//! - Translator: walks the tree and drives the IR emitter

pub mod ast;
pub mod translate;

pub use ast::{
    Expression, ExpressionKind, Function, GlobalDecl, Program, Statement, StatementKind,
};
pub use translate::{translate_program, Translator};

use ember_codegen::EmitterConfig;
use ember_common::CompilerError;
use ember_ir::Module;
use log::debug;

/// High-level frontend interface
pub struct Frontend;

impl Frontend {
    /// Read a typed program from its JSON form
    pub fn parse_json(source: &str) -> Result<Program, CompilerError> {
        let program: Program = serde_json::from_str(source).map_err(|e| CompilerError::InputError {
            message: format!("malformed program at line {}, column {}: {}", e.line(), e.column(), e),
        })?;
        debug!(
            "parsed program with {} globals and {} functions",
            program.globals.len(),
            program.functions.len()
        );
        Ok(program)
    }

    /// Translate a program into an IR module
    pub fn compile(program: &Program, config: EmitterConfig) -> Result<Module, CompilerError> {
        translate_program(program, config)
    }

    /// Parse and translate JSON source, returning the IR text
    pub fn compile_json(source: &str, config: EmitterConfig) -> Result<String, CompilerError> {
        let program = Self::parse_json(source)?;
        Ok(Self::compile(&program, config)?.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_reports_input_error() {
        let err = Frontend::parse_json("{ \"functions\": [ { \"name\": 1 } ] }").unwrap_err();
        assert!(matches!(err, CompilerError::InputError { .. }));
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_compile_json_minimal() {
        let text = Frontend::compile_json(
            r#"{ "functions": [ { "name": "main", "body": [] } ] }"#,
            EmitterConfig::default(),
        )
        .unwrap();

        assert!(text.starts_with("; ModuleID = 'ember'\n"));
        assert!(text.contains("define dso_local i32 @main() #0 {\n  ret i32 0\n}\n"));
        assert!(!text.contains("@printf"));
    }
}
