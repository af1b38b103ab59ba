//! Scoped symbol tables
//!
//! A stack of per-scope tables mapping identifiers to their storage. The
//! innermost scope is the last table; lookups walk from innermost to
//! outermost so inner declarations shadow outer ones.

use crate::error::CompilerError;
use crate::source_loc::SourceLocation;
use crate::types::{NumberType, SlotIndex, StorageKind};
use log::{debug, trace};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by symbol table operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("redeclaration of '{name}' in the same scope")]
    Redeclaration { name: String },

    #[error("use of undeclared identifier '{name}'")]
    UndeclaredIdentifier { name: String },

    #[error("scope stack underflow: no scope to {operation}")]
    StackUnderflow { operation: &'static str },
}

impl From<SymbolError> for CompilerError {
    fn from(err: SymbolError) -> Self {
        match err {
            SymbolError::StackUnderflow { .. } => CompilerError::InternalError {
                message: err.to_string(),
            },
            _ => CompilerError::scope_error(err.to_string(), SourceLocation::unknown()),
        }
    }
}

/// A declared identifier and where its value lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub name: String,
    pub ty: NumberType,
    /// Storage length in bytes
    pub length: u32,
    pub storage: StorageKind,
    /// Frame slot for stack locals
    pub slot: Option<SlotIndex>,
    /// Set once the symbol has been stored to
    pub assigned: bool,
}

impl SymbolEntry {
    pub fn new(name: String, ty: NumberType, storage: StorageKind, length: u32) -> Self {
        Self {
            name,
            ty,
            length,
            storage,
            slot: None,
            assigned: false,
        }
    }

    pub fn with_slot(mut self, slot: SlotIndex) -> Self {
        self.slot = Some(slot);
        self
    }

    pub fn is_global(&self) -> bool {
        self.storage == StorageKind::Global
    }
}

/// One lexical scope, keeping declaration order
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
    index: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&SymbolEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SymbolEntry> {
        match self.index.get(name) {
            Some(&i) => self.entries.get_mut(i),
            None => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn insert(&mut self, entry: SymbolEntry) -> Result<&SymbolEntry, SymbolError> {
        if self.contains(&entry.name) {
            return Err(SymbolError::Redeclaration { name: entry.name });
        }
        let position = self.entries.len();
        self.index.insert(entry.name.clone(), position);
        self.entries.push(entry);
        Ok(&self.entries[position])
    }

    /// Entries in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stack of scopes, innermost last
#[derive(Debug, Clone, Default)]
pub struct SymbolTableStack {
    scopes: Vec<SymbolTable>,
}

impl SymbolTableStack {
    /// Create an empty stack with no scopes
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stack holding one (global) scope
    pub fn with_global_scope() -> Self {
        let mut stack = Self::new();
        stack.push_scope();
        stack
    }

    /// Enter a new scope
    pub fn push_scope(&mut self) {
        self.scopes.push(SymbolTable::new());
        trace!("push_scope: depth {}", self.scopes.len());
    }

    /// Leave the innermost scope, discarding its entries
    pub fn pop_scope(&mut self) -> Result<SymbolTable, SymbolError> {
        let table = self.scopes.pop().ok_or(SymbolError::StackUnderflow {
            operation: "pop",
        })?;
        trace!("pop_scope: depth {}, dropped {} symbols", self.scopes.len(), table.len());
        Ok(table)
    }

    /// Declare a name in the innermost scope
    pub fn declare(
        &mut self,
        name: &str,
        ty: NumberType,
        storage: StorageKind,
        length: u32,
    ) -> Result<&SymbolEntry, SymbolError> {
        self.declare_entry(SymbolEntry::new(name.to_string(), ty, storage, length))
    }

    /// Declare a prepared entry in the innermost scope
    pub fn declare_entry(&mut self, entry: SymbolEntry) -> Result<&SymbolEntry, SymbolError> {
        let depth = self.scopes.len();
        let table = self.scopes.last_mut().ok_or(SymbolError::StackUnderflow {
            operation: "declare into",
        })?;
        debug!(
            "declare '{}': {} {} ({} bytes) at depth {}",
            entry.name, entry.storage, entry.ty, entry.length, depth
        );
        table.insert(entry)
    }

    /// Look a name up, innermost scope first
    pub fn resolve(&self, name: &str) -> Result<&SymbolEntry, SymbolError> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .ok_or_else(|| SymbolError::UndeclaredIdentifier {
                name: name.to_string(),
            })
    }

    pub fn resolve_mut(&mut self, name: &str) -> Result<&mut SymbolEntry, SymbolError> {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(entry) = scope.get_mut(name) {
                return Ok(entry);
            }
        }
        Err(SymbolError::UndeclaredIdentifier {
            name: name.to_string(),
        })
    }

    /// Check if a name exists in the innermost scope only
    pub fn contains_in_current(&self, name: &str) -> bool {
        self.scopes
            .last()
            .map(|scope| scope.contains(name))
            .unwrap_or(false)
    }

    /// Number of active scopes
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_global_scope(&self) -> bool {
        self.scopes.len() == 1
    }
}
