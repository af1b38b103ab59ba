//! Error handling for the Ember backend
//!
//! This module defines the compilation-unit level error type every phase
//! converts into, and the diagnostic reporter the driver prints with.

use crate::source_loc::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main compiler error type that encompasses all phases of translation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompilerError {
    #[error("Scope error at {location}: {message}")]
    ScopeError {
        location: SourceLocation,
        message: String,
    },

    #[error("Type error at {location}: {message}")]
    TypeError {
        location: SourceLocation,
        message: String,
    },

    #[error("Code generation error at {location}: {message}")]
    CodegenError {
        location: SourceLocation,
        message: String,
    },

    #[error("Invalid input: {message}")]
    InputError { message: String },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Internal compiler error: {message}")]
    InternalError { message: String },
}

impl CompilerError {
    /// Create a scope (name resolution) error
    pub fn scope_error(message: String, location: SourceLocation) -> Self {
        CompilerError::ScopeError { location, message }
    }

    /// Create a type error
    pub fn type_error(message: String, location: SourceLocation) -> Self {
        CompilerError::TypeError { location, message }
    }

    /// Create a codegen error
    pub fn codegen_error(message: String, location: SourceLocation) -> Self {
        CompilerError::CodegenError { location, message }
    }

    /// Replace a placeholder location with a known one
    ///
    /// The core reports errors without positions; the driver attaches the
    /// location of the node it was translating.
    pub fn at(self, location: &SourceLocation) -> Self {
        match self {
            CompilerError::ScopeError { location: old, message } if old.is_unknown() => {
                CompilerError::ScopeError { location: location.clone(), message }
            }
            CompilerError::TypeError { location: old, message } if old.is_unknown() => {
                CompilerError::TypeError { location: location.clone(), message }
            }
            CompilerError::CodegenError { location: old, message } if old.is_unknown() => {
                CompilerError::CodegenError { location: location.clone(), message }
            }
            other => other,
        }
    }

    /// Location of the error, if it has a known one
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            CompilerError::ScopeError { location, .. }
            | CompilerError::TypeError { location, .. }
            | CompilerError::CodegenError { location, .. } if !location.is_unknown() => {
                Some(location)
            }
            _ => None,
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for CompilerError {
    fn from(err: std::io::Error) -> Self {
        CompilerError::IoError {
            message: err.to_string(),
        }
    }
}

/// Convert from String (for simple error cases)
impl From<String> for CompilerError {
    fn from(message: String) -> Self {
        CompilerError::InternalError { message }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message with optional location and severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: Option<SourceLocation>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: String, location: Option<SourceLocation>) -> Self {
        Self {
            severity: Severity::Error,
            message,
            location,
            notes: Vec::new(),
        }
    }

    pub fn note(message: String, location: Option<SourceLocation>) -> Self {
        Self {
            severity: Severity::Note,
            message,
            location,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }
}

impl From<&CompilerError> for Diagnostic {
    fn from(err: &CompilerError) -> Self {
        Diagnostic::error(err.to_string(), err.location().cloned())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;

        for note in &self.notes {
            write!(f, "\n  note: {}", note)?;
        }

        Ok(())
    }
}

/// Error reporter for collecting and displaying diagnostics
pub struct ErrorReporter {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
            error_count: 0,
        }
    }

    /// Report a compiler error
    pub fn report(&mut self, err: &CompilerError) -> &mut Diagnostic {
        self.push(Diagnostic::from(err))
    }

    /// Report a note diagnostic
    pub fn note(&mut self, message: String) -> &mut Diagnostic {
        self.push(Diagnostic::note(message, None))
    }

    fn push(&mut self, diagnostic: Diagnostic) -> &mut Diagnostic {
        if diagnostic.severity == Severity::Error {
            self.error_count += 1;
        }
        self.diagnostics.push(diagnostic);
        let last = self.diagnostics.len() - 1;
        &mut self.diagnostics[last]
    }

    /// Check if any errors have been reported
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Get the number of errors
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Get all diagnostics
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Print all diagnostics to stderr
    pub fn print_diagnostics(&self) {
        for diagnostic in &self.diagnostics {
            eprintln!("{}", diagnostic);
        }
    }

    /// Create a summary string
    pub fn summary(&self) -> String {
        match self.error_count {
            0 => "No errors".to_string(),
            e => format!("{} error{}", e, if e == 1 { "" } else { "s" }),
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
