use log::{debug, trace};

use crate::{
    attributes::{
        Attribute, Attributes, CodeAttribute, ExceptionTableEntry, InnerClass, LineNumberEntry,
        LocalVariableEntry, UnknownAttribute,
    },
    class_file::{FieldInfo, MethodInfo},
    stack_map, AccessFlags, ByteCursor, ClassFile, ClassFileError, ConstantPool, Result,
};

const MAGIC_IDENTIFIER: u32 = 0xCAFEBABE;

/// Where an attribute appears. Attribute names are only interpreted in the
/// places the class file format defines them for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Class,
    Field,
    Method,
    Code,
}

pub struct Parser<'a> {
    r: ByteCursor<'a>,
}
impl<'a> Parser<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::from_cursor(ByteCursor::new(bytes))
    }

    pub fn from_cursor(r: ByteCursor<'a>) -> Self {
        Self { r }
    }

    pub fn parse(mut self) -> Result<ClassFile> {
        self.parse_magic_identifier()?;
        let (major_version, minor_version) = self.parse_version()?;

        let constant_pool_count = self.r.read_u16()?;
        let constant_pool = ConstantPool::parse(&mut self.r, constant_pool_count)?;
        let access_flags = AccessFlags::from_bits_truncate(self.r.read_u16()?);
        let this_class = self.r.read_u16()?;
        let super_class = self.r.read_u16()?;

        let interfaces_count = self.r.read_u16()?;
        let interfaces = (0..interfaces_count)
            .map(|_| self.r.read_u16())
            .collect::<Result<Vec<_>>>()?;

        let fields_count = self.r.read_u16()?;
        let fields = (0..fields_count)
            .map(|_| self.parse_field_info(&constant_pool))
            .collect::<Result<Vec<_>>>()?;

        let methods_count = self.r.read_u16()?;
        let methods = (0..methods_count)
            .map(|_| self.parse_method_info(&constant_pool))
            .collect::<Result<Vec<_>>>()?;

        let attributes = self.parse_attributes(&constant_pool, Context::Class)?;

        debug!(
            "parsed class file version {}.{}: {} fields, {} methods",
            major_version,
            minor_version,
            fields.len(),
            methods.len()
        );

        Ok(ClassFile {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    fn parse_field_info(&mut self, cp: &ConstantPool) -> Result<FieldInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.r.read_u16()?);
        let name_index = self.r.read_u16()?;
        let descriptor_index = self.r.read_u16()?;
        let attributes = self.parse_attributes(cp, Context::Field)?;

        Ok(FieldInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_method_info(&mut self, cp: &ConstantPool) -> Result<MethodInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.r.read_u16()?);
        let name_index = self.r.read_u16()?;
        let descriptor_index = self.r.read_u16()?;
        let attributes = self.parse_attributes(cp, Context::Method)?;

        Ok(MethodInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match self.r.read_u32()? {
            MAGIC_IDENTIFIER => Ok(()),
            magic_identifier => Err(ClassFileError::InvalidMagicIdentifier(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = self.r.read_u16()?;
        let major = self.r.read_u16()?;
        Ok((major, minor))
    }

    fn parse_attributes(&mut self, cp: &ConstantPool, context: Context) -> Result<Attributes> {
        let attributes_count = self.r.read_u16()?;
        (0..attributes_count)
            .map(|_| self.parse_attribute(cp, context))
            .collect::<Result<Vec<_>>>()
            .map(Attributes)
    }

    fn parse_attribute(&mut self, cp: &ConstantPool, context: Context) -> Result<Attribute> {
        let attribute_name_index = self.r.read_u16()?;
        let attribute_length = self.r.read_u32()?;
        let start = self.r.position();
        let info = self.r.read_bytes(attribute_length as usize)?;
        let name = cp.resolve_utf8(attribute_name_index)?;

        let mut p = Parser::from_cursor(ByteCursor::with_base(info, start));
        let attribute = match (context, name) {
            (Context::Field, "ConstantValue") => {
                expect_length(name, 2, attribute_length)?;
                Attribute::ConstantValue {
                    constantvalue_index: p.r.read_u16()?,
                }
            }
            (Context::Class, "SourceFile") => {
                expect_length(name, 2, attribute_length)?;
                Attribute::SourceFile {
                    sourcefile_index: p.r.read_u16()?,
                }
            }
            (_, "Signature") if context != Context::Code => {
                expect_length(name, 2, attribute_length)?;
                Attribute::Signature {
                    signature_index: p.r.read_u16()?,
                }
            }
            (Context::Class, "EnclosingMethod") => {
                expect_length(name, 4, attribute_length)?;
                Attribute::EnclosingMethod {
                    class_index: p.r.read_u16()?,
                    method_index: p.r.read_u16()?,
                }
            }
            (_, "Synthetic") if context != Context::Code => {
                expect_length(name, 0, attribute_length)?;
                Attribute::Synthetic
            }
            (_, "Deprecated") if context != Context::Code => {
                expect_length(name, 0, attribute_length)?;
                Attribute::Deprecated
            }
            (Context::Class, "InnerClasses") => Attribute::InnerClasses {
                classes: p.parse_inner_classes()?,
            },
            (Context::Method, "Code") => Attribute::Code(p.parse_code_attribute(cp)?),
            (Context::Method, "Exceptions") => Attribute::Exceptions {
                exception_index_table: p.parse_u16_table()?,
            },
            (Context::Code, "LineNumberTable") => Attribute::LineNumberTable {
                line_number_table: p.parse_line_number_table()?,
            },
            (Context::Code, "LocalVariableTable") => Attribute::LocalVariableTable {
                local_variable_table: p.parse_local_variable_table()?,
            },
            (Context::Code, "LocalVariableTypeTable") => Attribute::LocalVariableTypeTable {
                local_variable_type_table: p.parse_local_variable_table()?,
            },
            (Context::Code, "StackMapTable") => Attribute::StackMapTable {
                entries: stack_map::read_stack_map_table(&mut p.r)?,
            },
            (Context::Code, "StackMap") => Attribute::StackMap {
                entries: stack_map::read_stack_map(&mut p.r)?,
            },
            _ => {
                trace!(
                    "keeping {:?} attribute {} opaque ({} bytes)",
                    context,
                    name,
                    attribute_length
                );
                return Ok(Attribute::Unknown(UnknownAttribute {
                    attribute_name_index,
                    info: info.to_vec(),
                }));
            }
        };

        if !p.r.is_empty() {
            return Err(ClassFileError::InvalidAttributeLength {
                name: name.to_owned(),
                expected: attribute_length - p.r.remaining() as u32,
                actual: attribute_length,
            });
        }

        Ok(attribute)
    }

    pub fn parse_code_attribute(&mut self, cp: &ConstantPool) -> Result<CodeAttribute> {
        let max_stack = self.r.read_u16()?;
        let max_locals = self.r.read_u16()?;
        let code_length = self.r.read_u32()?;
        let code = self.r.read_bytes(code_length as usize)?.to_vec();
        let exception_table_length = self.r.read_u16()?;
        let exception_table = (0..exception_table_length)
            .map(|_| self.parse_exception_table_entry(code.len()))
            .collect::<Result<Vec<_>>>()?;
        let attributes = self.parse_attributes(cp, Context::Code)?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    /// Reads one handler, checking that it covers and jumps into `code_length` bytes of code.
    fn parse_exception_table_entry(&mut self, code_length: usize) -> Result<ExceptionTableEntry> {
        let start_pc = self.r.read_u16()?;
        let end_pc = self.r.read_u16()?;
        let handler_pc = self.r.read_u16()?;
        let catch_type = self.r.read_u16()?;

        if start_pc > end_pc
            || end_pc as usize > code_length
            || handler_pc as usize >= code_length
        {
            return Err(ClassFileError::InvalidExceptionHandler {
                start_pc,
                end_pc,
                handler_pc,
                code_length,
            });
        }

        Ok(ExceptionTableEntry {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        })
    }

    fn parse_u16_table(&mut self) -> Result<Vec<u16>> {
        let length = self.r.read_u16()?;
        (0..length).map(|_| self.r.read_u16()).collect()
    }

    fn parse_line_number_table(&mut self) -> Result<Vec<LineNumberEntry>> {
        let length = self.r.read_u16()?;
        (0..length)
            .map(|_| -> Result<_> {
                Ok(LineNumberEntry {
                    start_pc: self.r.read_u16()?,
                    line_number: self.r.read_u16()?,
                })
            })
            .collect()
    }

    fn parse_local_variable_table(&mut self) -> Result<Vec<LocalVariableEntry>> {
        let length = self.r.read_u16()?;
        (0..length)
            .map(|_| -> Result<_> {
                Ok(LocalVariableEntry {
                    start_pc: self.r.read_u16()?,
                    length: self.r.read_u16()?,
                    name_index: self.r.read_u16()?,
                    descriptor_index: self.r.read_u16()?,
                    index: self.r.read_u16()?,
                })
            })
            .collect()
    }

    fn parse_inner_classes(&mut self) -> Result<Vec<InnerClass>> {
        let number_of_classes = self.r.read_u16()?;
        (0..number_of_classes)
            .map(|_| -> Result<_> {
                Ok(InnerClass {
                    inner_class_info_index: self.r.read_u16()?,
                    outer_class_info_index: self.r.read_u16()?,
                    inner_name_index: self.r.read_u16()?,
                    inner_class_access_flags: AccessFlags::from_bits_truncate(
                        self.r.read_u16()?,
                    ),
                })
            })
            .collect()
    }
}

/// Fixed-shape attributes have exactly one legal length.
fn expect_length(name: &str, expected: u32, actual: u32) -> Result<()> {
    if expected != actual {
        return Err(ClassFileError::InvalidAttributeLength {
            name: name.to_owned(),
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod parse_magic_identifier_tests {
    use super::*;

    #[test]
    fn it_should_be_able_to_parse_the_correct_identifier() {
        assert!(Parser::new(&[0xca, 0xfe, 0xba, 0xbe])
            .parse_magic_identifier()
            .is_ok());
    }

    #[test]
    fn it_should_fail_if_there_is_not_enough_data() {
        assert!(matches!(
            Parser::new(&[0xca, 0xfe, 0xba]).parse_magic_identifier(),
            Err(ClassFileError::TruncatedInput { offset: 0, .. })
        ));
    }

    #[test]
    fn it_should_fail_if_the_magic_identifier_is_incorrect() {
        assert!(matches!(
            Parser::new(&[0xca, 0xfe, 0xba, 0xbf]).parse_magic_identifier(),
            Err(ClassFileError::InvalidMagicIdentifier(0xCAFEBABF))
        ));
    }
}
