use std::fmt;

use crate::{
    stack_map::{StackMapEntry, StackMapTableEntry},
    AccessFlags, ConstantPool,
};

/// An attribute of a class, field, method or `Code` attribute.
///
/// Attributes whose name is not understood in the place they appear are kept
/// as [`Attribute::Unknown`] with their raw bytes.
#[derive(Debug)]
pub enum Attribute {
    ConstantValue { constantvalue_index: u16 },
    Code(CodeAttribute),
    Exceptions { exception_index_table: Vec<u16> },
    SourceFile { sourcefile_index: u16 },
    Signature { signature_index: u16 },
    InnerClasses { classes: Vec<InnerClass> },
    EnclosingMethod { class_index: u16, method_index: u16 },
    LineNumberTable { line_number_table: Vec<LineNumberEntry> },
    LocalVariableTable { local_variable_table: Vec<LocalVariableEntry> },
    LocalVariableTypeTable { local_variable_type_table: Vec<LocalVariableEntry> },
    StackMapTable { entries: Vec<StackMapTableEntry> },
    StackMap { entries: Vec<StackMapEntry> },
    Synthetic,
    Deprecated,
    Unknown(UnknownAttribute),
}

pub struct UnknownAttribute {
    pub attribute_name_index: u16,
    pub info: Vec<u8>,
}
impl fmt::Debug for UnknownAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnknownAttribute")
            .field("attribute_name_index", &self.attribute_name_index)
            .field("info", &format!("({} bytes)", self.info.len()))
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Finds an attribute that was kept opaque, by name.
    pub fn find_by_name(
        &self,
        name: &str,
        constant_pool: &ConstantPool,
    ) -> Option<&UnknownAttribute> {
        self.unknown()
            .find(|a| constant_pool.resolve_utf8(a.attribute_name_index).ok() == Some(name))
    }

    pub fn unknown(&self) -> impl Iterator<Item = &UnknownAttribute> {
        self.0.iter().filter_map(|a| match a {
            Attribute::Unknown(unknown) => Some(unknown),
            _ => None,
        })
    }

    pub fn code(&self) -> Option<&CodeAttribute> {
        self.0.iter().find_map(|a| match a {
            Attribute::Code(code) => Some(code),
            _ => None,
        })
    }

    pub fn constant_value(&self) -> Option<u16> {
        self.0.iter().find_map(|a| match a {
            Attribute::ConstantValue {
                constantvalue_index,
            } => Some(*constantvalue_index),
            _ => None,
        })
    }

    pub fn exceptions(&self) -> Option<&[u16]> {
        self.0.iter().find_map(|a| match a {
            Attribute::Exceptions {
                exception_index_table,
            } => Some(exception_index_table.as_slice()),
            _ => None,
        })
    }

    pub fn source_file(&self) -> Option<u16> {
        self.0.iter().find_map(|a| match a {
            Attribute::SourceFile { sourcefile_index } => Some(*sourcefile_index),
            _ => None,
        })
    }

    pub fn signature(&self) -> Option<u16> {
        self.0.iter().find_map(|a| match a {
            Attribute::Signature { signature_index } => Some(*signature_index),
            _ => None,
        })
    }

    pub fn inner_classes(&self) -> Option<&[InnerClass]> {
        self.0.iter().find_map(|a| match a {
            Attribute::InnerClasses { classes } => Some(classes.as_slice()),
            _ => None,
        })
    }

    /// Line numbers of every `LineNumberTable`, in file order.
    pub fn line_numbers(&self) -> impl Iterator<Item = &LineNumberEntry> {
        self.0.iter().flat_map(|a| match a {
            Attribute::LineNumberTable { line_number_table } => line_number_table.as_slice(),
            _ => &[],
        })
    }

    /// Local variables of every `LocalVariableTable`, in file order.
    pub fn local_variables(&self) -> impl Iterator<Item = &LocalVariableEntry> {
        self.0.iter().flat_map(|a| match a {
            Attribute::LocalVariableTable {
                local_variable_table,
            } => local_variable_table.as_slice(),
            _ => &[],
        })
    }

    pub fn is_synthetic(&self) -> bool {
        self.0.iter().any(|a| matches!(a, Attribute::Synthetic))
    }

    pub fn is_deprecated(&self) -> bool {
        self.0.iter().any(|a| matches!(a, Attribute::Deprecated))
    }
}
impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// Zero catches everything.
    pub catch_type: u16,
}

#[derive(Debug)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineNumberEntry {
    pub start_pc: u16,
    pub line_number: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariableEntry {
    pub start_pc: u16,
    pub length: u16,
    pub name_index: u16,
    /// A field descriptor, or a field signature in `LocalVariableTypeTable`.
    pub descriptor_index: u16,
    pub index: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClass {
    pub inner_class_info_index: u16,
    pub outer_class_info_index: u16,
    pub inner_name_index: u16,
    pub inner_class_access_flags: AccessFlags,
}
