//! Common types used throughout the backend
//!
//! This module defines the numeric type classes carried by every value,
//! register and symbol, plus the identifier types and generators shared by
//! the emitter and the translation driver.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Virtual register identifier
pub type RegisterId = u32;

/// Label identifier for branch targets
pub type LabelId = u32;

/// Index of a stack slot in a function's frame
pub type SlotIndex = usize;

/// Numeric width/signedness classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberType {
    /// 1-bit boolean
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
}

impl NumberType {
    /// Every number type, narrowest first
    pub const ALL: [NumberType; 9] = [
        NumberType::Bool,
        NumberType::I8,
        NumberType::U8,
        NumberType::I16,
        NumberType::U16,
        NumberType::I32,
        NumberType::U32,
        NumberType::I64,
        NumberType::U64,
    ];

    /// Width of the value in bits
    pub fn bit_width(&self) -> u32 {
        match self {
            NumberType::Bool => 1,
            NumberType::I8 | NumberType::U8 => 8,
            NumberType::I16 | NumberType::U16 => 16,
            NumberType::I32 | NumberType::U32 => 32,
            NumberType::I64 | NumberType::U64 => 64,
        }
    }

    /// Storage size in bytes (booleans occupy a full byte)
    pub fn size_in_bytes(&self) -> u32 {
        match self {
            NumberType::Bool | NumberType::I8 | NumberType::U8 => 1,
            NumberType::I16 | NumberType::U16 => 2,
            NumberType::I32 | NumberType::U32 => 4,
            NumberType::I64 | NumberType::U64 => 8,
        }
    }

    /// Natural alignment in bytes
    pub fn alignment(&self) -> u32 {
        self.size_in_bytes()
    }

    /// Check if this type is signed
    pub fn is_signed(&self) -> bool {
        matches!(self, NumberType::I8 | NumberType::I16 | NumberType::I32 | NumberType::I64)
    }

    /// Check if this type is unsigned (booleans count as unsigned)
    pub fn is_unsigned(&self) -> bool {
        !self.is_signed()
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, NumberType::Bool)
    }

    /// IR spelling of the type (`i1`, `i8`, ...)
    pub fn ir_repr(&self) -> &'static str {
        match self {
            NumberType::Bool => "i1",
            NumberType::I8 | NumberType::U8 => "i8",
            NumberType::I16 | NumberType::U16 => "i16",
            NumberType::I32 | NumberType::U32 => "i32",
            NumberType::I64 | NumberType::U64 => "i64",
        }
    }

    /// The 64-bit type with the same signedness
    pub fn widest(&self) -> NumberType {
        if self.is_signed() {
            NumberType::I64
        } else {
            NumberType::U64
        }
    }

    /// Reduce `value` to this type's bit pattern, interpreted with this
    /// type's signedness.
    pub fn wrap(&self, value: i64) -> i64 {
        match self {
            NumberType::Bool => value & 1,
            NumberType::I8 => value as i8 as i64,
            NumberType::U8 => value as u8 as i64,
            NumberType::I16 => value as i16 as i64,
            NumberType::U16 => value as u16 as i64,
            NumberType::I32 => value as i32 as i64,
            NumberType::U32 => value as u32 as i64,
            NumberType::I64 | NumberType::U64 => value,
        }
    }

    /// Check whether `value` is representable without wrapping
    pub fn fits(&self, value: i64) -> bool {
        match self {
            NumberType::U64 => value >= 0,
            _ => self.wrap(value) == value,
        }
    }
}

impl fmt::Display for NumberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberType::Bool => write!(f, "bool"),
            NumberType::I8 => write!(f, "i8"),
            NumberType::U8 => write!(f, "u8"),
            NumberType::I16 => write!(f, "i16"),
            NumberType::U16 => write!(f, "u16"),
            NumberType::I32 => write!(f, "i32"),
            NumberType::U32 => write!(f, "u32"),
            NumberType::I64 => write!(f, "i64"),
            NumberType::U64 => write!(f, "u64"),
        }
    }
}

/// Where a symbol's storage lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageKind {
    Global,
    StackLocal,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Global => write!(f, "global"),
            StorageKind::StackLocal => write!(f, "stack-local"),
        }
    }
}

/// Label generator for branch targets
#[derive(Debug, Clone, Default)]
pub struct LabelGenerator {
    next_id: LabelId,
}

impl LabelGenerator {
    pub fn new() -> Self {
        Self { next_id: 0 }
    }

    /// Generate a new unique label id
    pub fn next_label(&mut self) -> LabelId {
        let label = self.next_id;
        self.next_id += 1;
        label
    }
}

/// Virtual register id generator
///
/// Numbering starts at 1: the unnamed entry block of a function takes `%0`.
#[derive(Debug, Clone)]
pub struct RegisterIdGenerator {
    next_id: RegisterId,
}

impl RegisterIdGenerator {
    pub const FIRST: RegisterId = 1;

    pub fn new() -> Self {
        Self { next_id: Self::FIRST }
    }

    /// Generate a new virtual register id
    pub fn next_register(&mut self) -> RegisterId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u32 {
        self.next_id - Self::FIRST
    }

    pub fn reset(&mut self) {
        self.next_id = Self::FIRST;
    }
}

impl Default for RegisterIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
