use crate::{
    attributes::{Attributes, CodeAttribute},
    constant_pool::ClassInfo,
    matches_cp_info,
    parser::Parser,
    AccessFlags, ConstantPool, Result,
};

#[derive(Debug)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: AccessFlags,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub attributes: Attributes,
}
impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<ClassFile> {
        Parser::new(bytes).parse()
    }

    pub fn super_class(&self) -> Result<Option<&str>> {
        // If the value of the super_class item is zero, then this class file must represent the class Object,
        // the only class or interface without a direct superclass.
        if self.super_class == 0 {
            return Ok(None);
        }

        Ok(Some(self.constant_pool.class_name(self.super_class)?))
    }

    pub fn class_name(&self) -> Result<&str> {
        // The value of the this_class item must be a valid index into the constant_pool table.
        // The constant_pool entry at that index must be a CONSTANT_Class_info structure
        // representing the class or interface defined by this class file.

        let ClassInfo { name_index } =
            matches_cp_info!(self.constant_pool, self.this_class, Class)?;

        self.constant_pool.resolve_utf8(*name_index)
    }

    pub fn interface_names(&self) -> Result<Vec<&str>> {
        self.interfaces
            .iter()
            .map(|i| self.constant_pool.class_name(*i))
            .collect()
    }

    pub fn source_file(&self) -> Result<Option<&str>> {
        self.attributes
            .source_file()
            .map(|i| self.constant_pool.resolve_utf8(i))
            .transpose()
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags.contains(AccessFlags::INTERFACE)
    }

    pub fn field_name(&self, field: &FieldInfo) -> Result<&str> {
        self.constant_pool.resolve_utf8(field.name_index)
    }

    pub fn field_descriptor(&self, field: &FieldInfo) -> Result<&str> {
        self.constant_pool.resolve_utf8(field.descriptor_index)
    }

    pub fn method_name(&self, method: &MethodInfo) -> Result<&str> {
        self.constant_pool.resolve_utf8(method.name_index)
    }

    pub fn method_descriptor(&self, method: &MethodInfo) -> Result<&str> {
        self.constant_pool.resolve_utf8(method.descriptor_index)
    }
}

#[derive(Debug)]
pub struct FieldInfo {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}
impl FieldInfo {
    pub fn is_synthetic(&self) -> bool {
        self.access_flags.contains(AccessFlags::SYNTHETIC) || self.attributes.is_synthetic()
    }

    pub fn is_deprecated(&self) -> bool {
        self.attributes.is_deprecated()
    }
}

#[derive(Debug)]
pub struct MethodInfo {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}
impl MethodInfo {
    pub fn code(&self) -> Option<&CodeAttribute> {
        self.attributes.code()
    }

    pub fn is_synthetic(&self) -> bool {
        self.access_flags.contains(AccessFlags::SYNTHETIC) || self.attributes.is_synthetic()
    }

    pub fn is_deprecated(&self) -> bool {
        self.attributes.is_deprecated()
    }
}
