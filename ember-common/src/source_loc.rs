//! Source location tracking for error reporting
//!
//! The backend never sees source text; locations arrive on typed AST nodes
//! and are attached to errors by the translation driver.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A location in a source file (line and column are 1-based)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub filename: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    /// Create a location with filename
    pub fn new(filename: &str, line: u32, column: u32) -> Self {
        Self {
            filename: filename.to_string(),
            line,
            column,
        }
    }

    /// Placeholder for errors raised where no position is known
    pub fn unknown() -> Self {
        Self::new("<unknown>", 0, 0)
    }

    pub fn is_unknown(&self) -> bool {
        self.line == 0
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            write!(f, "{}", self.filename)
        } else {
            write!(f, "{}:{}:{}", self.filename, self.line, self.column)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location() {
        let loc = SourceLocation::new("test.json", 42, 10);
        assert_eq!(loc.filename, "test.json");
        assert_eq!(loc.line, 42);
        assert_eq!(loc.column, 10);
        assert_eq!(format!("{}", loc), "test.json:42:10");
        assert!(!loc.is_unknown());
    }

    #[test]
    fn test_unknown_location() {
        let loc = SourceLocation::default();
        assert!(loc.is_unknown());
        assert_eq!(format!("{}", loc), "<unknown>");
    }
}
