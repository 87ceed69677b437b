//! Decoders for the `StackMapTable` attribute and the older CLDC `StackMap`
//! attribute.
//!
//! https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.7.4

use crate::{ByteCursor, ClassFileError, Result};

const ITEM_TOP: u8 = 0;
const ITEM_INTEGER: u8 = 1;
const ITEM_FLOAT: u8 = 2;
const ITEM_DOUBLE: u8 = 3;
const ITEM_LONG: u8 = 4;
const ITEM_NULL: u8 = 5;
const ITEM_UNINITIALIZED_THIS: u8 = 6;
const ITEM_OBJECT: u8 = 7;
const ITEM_NEW_OBJECT: u8 = 8;

const SAME_LOCALS_1_STACK_ITEM_EXTENDED: u8 = 247;
const SAME_FRAME_EXTENDED: u8 = 251;
const FULL_FRAME: u8 = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationType {
    Top,
    Integer,
    Float,
    Double,
    Long,
    Null,
    UninitializedThis,
    /// Constant pool index of a `Class` entry.
    Object(u16),
    /// Offset of the `new` instruction that created the object.
    Uninitialized(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackMapFrame {
    SameFrame {
        offset_delta: u16,
    },
    SameLocals1StackItem {
        offset_delta: u16,
        stack: VerificationType,
    },
    ChopFrame {
        offset_delta: u16,
        chop_count: u8,
    },
    AppendFrame {
        offset_delta: u16,
        locals: Vec<VerificationType>,
    },
    FullFrame {
        offset_delta: u16,
        locals: Vec<VerificationType>,
        stack: Vec<VerificationType>,
    },
}

impl StackMapFrame {
    pub fn offset_delta(&self) -> u16 {
        match self {
            StackMapFrame::SameFrame { offset_delta }
            | StackMapFrame::SameLocals1StackItem { offset_delta, .. }
            | StackMapFrame::ChopFrame { offset_delta, .. }
            | StackMapFrame::AppendFrame { offset_delta, .. }
            | StackMapFrame::FullFrame { offset_delta, .. } => *offset_delta,
        }
    }

    /// The compact frame type byte this frame can be written with, if any.
    /// Small deltas use the compact encodings.
    pub fn frame_type(&self) -> Option<u8> {
        match self {
            StackMapFrame::SameFrame { offset_delta } if *offset_delta < 64 => {
                Some(*offset_delta as u8)
            }
            StackMapFrame::SameFrame { .. } => Some(SAME_FRAME_EXTENDED),
            StackMapFrame::SameLocals1StackItem { offset_delta, .. } if *offset_delta < 64 => {
                Some(64 + *offset_delta as u8)
            }
            StackMapFrame::SameLocals1StackItem { .. } => Some(SAME_LOCALS_1_STACK_ITEM_EXTENDED),
            StackMapFrame::ChopFrame { chop_count, .. } if (1..=3).contains(chop_count) => {
                Some(SAME_FRAME_EXTENDED - chop_count)
            }
            StackMapFrame::AppendFrame { locals, .. } if (1..=3).contains(&locals.len()) => {
                Some(SAME_FRAME_EXTENDED + locals.len() as u8)
            }
            StackMapFrame::ChopFrame { .. } | StackMapFrame::AppendFrame { .. } => None,
            StackMapFrame::FullFrame { .. } => Some(FULL_FRAME),
        }
    }
}

/// A `StackMapTable` frame together with the frame type byte it was read
/// with. The same frame may be written with a compact or an extended type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackMapTableEntry {
    pub frame_type: u8,
    pub frame: StackMapFrame,
}

impl StackMapTableEntry {
    pub fn kind_name(&self) -> &'static str {
        match self.frame_type {
            0..=63 => "same",
            64..=127 => "same_locals_1_stack_item",
            SAME_LOCALS_1_STACK_ITEM_EXTENDED => "same_locals_1_stack_item_frame_extended",
            248..=250 => "chop",
            SAME_FRAME_EXTENDED => "same_frame_extended",
            252..=254 => "append",
            _ => "full_frame",
        }
    }
}

/// One entry of the CLDC `StackMap` attribute. Unlike `StackMapTable`
/// frames, the offset is absolute and locals and stack are always given in
/// full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackMapEntry {
    pub offset: u16,
    pub locals: Vec<VerificationType>,
    pub stack: Vec<VerificationType>,
}

pub fn read_stack_map_table(r: &mut ByteCursor) -> Result<Vec<StackMapTableEntry>> {
    let number_of_entries = r.read_u16()?;
    (0..number_of_entries)
        .map(|_| read_stack_map_frame(r))
        .collect()
}

pub fn read_stack_map_frame(r: &mut ByteCursor) -> Result<StackMapTableEntry> {
    let frame_type = r.read_u8()?;
    let frame = match frame_type {
        0..=63 => StackMapFrame::SameFrame {
            offset_delta: frame_type as u16,
        },
        64..=127 => StackMapFrame::SameLocals1StackItem {
            offset_delta: frame_type as u16 - 64,
            stack: read_verification_type(r)?,
        },
        SAME_LOCALS_1_STACK_ITEM_EXTENDED => StackMapFrame::SameLocals1StackItem {
            offset_delta: r.read_u16()?,
            stack: read_verification_type(r)?,
        },
        248..=250 => StackMapFrame::ChopFrame {
            offset_delta: r.read_u16()?,
            chop_count: SAME_FRAME_EXTENDED - frame_type,
        },
        SAME_FRAME_EXTENDED => StackMapFrame::SameFrame {
            offset_delta: r.read_u16()?,
        },
        252..=254 => StackMapFrame::AppendFrame {
            offset_delta: r.read_u16()?,
            locals: read_verification_types(r, (frame_type - SAME_FRAME_EXTENDED) as u16)?,
        },
        FULL_FRAME => {
            let offset_delta = r.read_u16()?;
            let number_of_locals = r.read_u16()?;
            let locals = read_verification_types(r, number_of_locals)?;
            let number_of_stack_items = r.read_u16()?;
            let stack = read_verification_types(r, number_of_stack_items)?;
            StackMapFrame::FullFrame {
                offset_delta,
                locals,
                stack,
            }
        }
        // 128 to 246 are reserved.
        _ => return Err(ClassFileError::MalformedStackMapFrame(frame_type)),
    };

    Ok(StackMapTableEntry { frame_type, frame })
}

pub fn read_stack_map(r: &mut ByteCursor) -> Result<Vec<StackMapEntry>> {
    let number_of_entries = r.read_u16()?;
    (0..number_of_entries)
        .map(|_| -> Result<_> {
            let offset = r.read_u16()?;
            let number_of_locals = r.read_u16()?;
            let locals = read_verification_types(r, number_of_locals)?;
            let number_of_stack_items = r.read_u16()?;
            let stack = read_verification_types(r, number_of_stack_items)?;
            Ok(StackMapEntry {
                offset,
                locals,
                stack,
            })
        })
        .collect()
}

pub fn read_verification_types(r: &mut ByteCursor, n: u16) -> Result<Vec<VerificationType>> {
    (0..n).map(|_| read_verification_type(r)).collect()
}

fn read_verification_type(r: &mut ByteCursor) -> Result<VerificationType> {
    let tag = r.read_u8()?;
    Ok(match tag {
        ITEM_TOP => VerificationType::Top,
        ITEM_INTEGER => VerificationType::Integer,
        ITEM_FLOAT => VerificationType::Float,
        ITEM_DOUBLE => VerificationType::Double,
        ITEM_LONG => VerificationType::Long,
        ITEM_NULL => VerificationType::Null,
        ITEM_UNINITIALIZED_THIS => VerificationType::UninitializedThis,
        ITEM_OBJECT => VerificationType::Object(r.read_u16()?),
        ITEM_NEW_OBJECT => VerificationType::Uninitialized(r.read_u16()?),
        _ => return Err(ClassFileError::InvalidVerificationType(tag)),
    })
}
