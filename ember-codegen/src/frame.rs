//! Stack frame layout
//!
//! Slots are placed in declaration order. Each offset is rounded up to the
//! slot's alignment and the frame size to the largest alignment present.

use crate::error::CodegenError;
use ember_common::NumberType;
use log::debug;
use std::fmt;

/// Largest alignment any slot receives
pub const MAX_ALIGNMENT: u32 = 8;

/// One requested stack slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEntry {
    pub name: String,
    pub ty: NumberType,
    /// Size in bytes
    pub size: i64,
}

impl StackEntry {
    pub fn new(name: &str, ty: NumberType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            size: ty.size_in_bytes() as i64,
        }
    }

    pub fn with_size(name: &str, ty: NumberType, size: i64) -> Self {
        Self {
            name: name.to_string(),
            ty,
            size,
        }
    }

    pub fn alignment(&self) -> u32 {
        self.ty.alignment().min(MAX_ALIGNMENT)
    }
}

/// Placement of one slot in the frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotLayout {
    pub name: String,
    pub ty: NumberType,
    pub offset: u32,
    pub size: u32,
    pub align: u32,
}

/// Complete frame for one function
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameLayout {
    pub slots: Vec<SlotLayout>,
    /// Total size in bytes, a multiple of `align`
    pub size: u32,
    pub align: u32,
}

impl FrameLayout {
    pub fn offsets(&self) -> Vec<u32> {
        self.slots.iter().map(|slot| slot.offset).collect()
    }
}

impl fmt::Display for FrameLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame: {} bytes, align {}", self.size, self.align)?;
        for slot in &self.slots {
            write!(f, ", {} {}@{}", slot.ty, slot.name, slot.offset)?;
        }
        Ok(())
    }
}

fn align_up(value: i64, align: u32) -> i64 {
    let align = align as i64;
    (value + align - 1) / align * align
}

/// Lay out `entries` in order
pub fn compute_frame_layout(entries: &[StackEntry]) -> Result<FrameLayout, CodegenError> {
    let limit = i32::MAX as i64;
    let mut slots = Vec::with_capacity(entries.len());
    let mut cursor: i64 = 0;
    let mut frame_align = 1;

    for entry in entries {
        if entry.size <= 0 {
            return Err(CodegenError::FrameLayoutError {
                message: format!("slot '{}' has non-positive size {}", entry.name, entry.size),
            });
        }
        let align = entry.alignment();
        let offset = align_up(cursor, align);
        let end = offset
            .checked_add(entry.size)
            .filter(|end| *end <= limit)
            .ok_or_else(|| CodegenError::FrameLayoutError {
                message: format!("frame exceeds {} bytes at slot '{}'", limit, entry.name),
            })?;

        slots.push(SlotLayout {
            name: entry.name.clone(),
            ty: entry.ty,
            offset: offset as u32,
            size: entry.size as u32,
            align,
        });
        frame_align = frame_align.max(align);
        cursor = end;
    }

    let size = if slots.is_empty() { 0 } else { align_up(cursor, frame_align) };
    if size > limit {
        return Err(CodegenError::FrameLayoutError {
            message: format!("frame of {} bytes exceeds {} bytes", size, limit),
        });
    }

    let layout = FrameLayout {
        slots,
        size: size as u32,
        align: frame_align,
    };
    debug!("{}", layout);
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mixed_sizes_are_aligned() {
        let entries = vec![
            StackEntry::new("a", NumberType::I8),
            StackEntry::new("b", NumberType::I32),
            StackEntry::new("c", NumberType::I64),
        ];

        let layout = compute_frame_layout(&entries).unwrap();
        assert_eq!(layout.offsets(), vec![0, 4, 8]);
        assert_eq!(layout.size, 16);
        assert_eq!(layout.align, 8);
    }

    #[test]
    fn test_empty_frame() {
        let layout = compute_frame_layout(&[]).unwrap();
        assert_eq!(layout.size, 0);
        assert!(layout.slots.is_empty());
    }

    #[test]
    fn test_small_slots_pack() {
        let entries = vec![
            StackEntry::new("flag", NumberType::Bool),
            StackEntry::new("c", NumberType::U8),
            StackEntry::new("s", NumberType::I16),
        ];

        let layout = compute_frame_layout(&entries).unwrap();
        assert_eq!(layout.offsets(), vec![0, 1, 2]);
        assert_eq!(layout.size, 4);
    }

    #[test]
    fn test_frame_rounded_to_largest_alignment() {
        let entries = vec![
            StackEntry::new("wide", NumberType::U64),
            StackEntry::new("narrow", NumberType::I8),
        ];

        let layout = compute_frame_layout(&entries).unwrap();
        assert_eq!(layout.offsets(), vec![0, 8]);
        assert_eq!(layout.size, 16);
    }

    #[test]
    fn test_non_positive_size_rejected() {
        let entries = vec![StackEntry::with_size("bad", NumberType::I32, 0)];
        assert!(matches!(
            compute_frame_layout(&entries),
            Err(CodegenError::FrameLayoutError { .. })
        ));
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let entries = vec![
            StackEntry::with_size("big", NumberType::I8, i32::MAX as i64),
            StackEntry::new("one_more", NumberType::I8),
        ];
        assert!(matches!(
            compute_frame_layout(&entries),
            Err(CodegenError::FrameLayoutError { .. })
        ));
    }

    #[test]
    fn test_layout_display() {
        let entries = vec![StackEntry::new("x", NumberType::I32)];
        let layout = compute_frame_layout(&entries).unwrap();
        assert_eq!(layout.to_string(), "frame: 4 bytes, align 4, i32 x@0");
    }
}
