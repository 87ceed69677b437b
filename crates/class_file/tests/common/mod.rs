//! Builds class files in memory for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;

pub struct ClassBuilder {
    minor_version: u16,
    major_version: u16,
    pool: Vec<u8>,
    pool_count: u16,
    utf8s: HashMap<String, u16>,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    attributes: Vec<Vec<u8>>,
}

impl Default for ClassBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassBuilder {
    pub fn new() -> Self {
        Self {
            minor_version: 0,
            major_version: 50,
            pool: vec![],
            pool_count: 1,
            utf8s: HashMap::new(),
            access_flags: ACC_PUBLIC | ACC_SUPER,
            this_class: 0,
            super_class: 0,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            attributes: vec![],
        }
    }

    fn entry(&mut self, bytes: &[u8], slots: u16) -> u16 {
        let index = self.pool_count;
        self.pool.extend_from_slice(bytes);
        self.pool_count += slots;
        index
    }

    /// The index the next pool entry will get.
    pub fn next_index(&self) -> u16 {
        self.pool_count
    }

    /// Adds a pool entry from its encoded bytes, tag included.
    pub fn raw_entry(&mut self, bytes: &[u8]) -> u16 {
        self.entry(bytes, 1)
    }

    pub fn utf8(&mut self, s: &str) -> u16 {
        if let Some(index) = self.utf8s.get(s) {
            return *index;
        }
        let mut bytes = vec![1];
        bytes.extend((s.len() as u16).to_be_bytes());
        bytes.extend(s.as_bytes());
        let index = self.entry(&bytes, 1);
        self.utf8s.insert(s.to_owned(), index);
        index
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        let mut bytes = vec![3];
        bytes.extend(value.to_be_bytes());
        self.entry(&bytes, 1)
    }

    pub fn float(&mut self, value: f32) -> u16 {
        let mut bytes = vec![4];
        bytes.extend(value.to_bits().to_be_bytes());
        self.entry(&bytes, 1)
    }

    pub fn long(&mut self, value: i64) -> u16 {
        let mut bytes = vec![5];
        bytes.extend(value.to_be_bytes());
        self.entry(&bytes, 2)
    }

    pub fn double(&mut self, value: f64) -> u16 {
        let mut bytes = vec![6];
        bytes.extend(value.to_bits().to_be_bytes());
        self.entry(&bytes, 2)
    }

    pub fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        let mut bytes = vec![7];
        bytes.extend(name_index.to_be_bytes());
        self.entry(&bytes, 1)
    }

    pub fn string(&mut self, s: &str) -> u16 {
        let string_index = self.utf8(s);
        let mut bytes = vec![8];
        bytes.extend(string_index.to_be_bytes());
        self.entry(&bytes, 1)
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let mut bytes = vec![12];
        bytes.extend(name_index.to_be_bytes());
        bytes.extend(descriptor_index.to_be_bytes());
        self.entry(&bytes, 1)
    }

    fn member_ref(&mut self, tag: u8, class_index: u16, name: &str, descriptor: &str) -> u16 {
        let name_and_type_index = self.name_and_type(name, descriptor);
        let mut bytes = vec![tag];
        bytes.extend(class_index.to_be_bytes());
        bytes.extend(name_and_type_index.to_be_bytes());
        self.entry(&bytes, 1)
    }

    pub fn field_ref(&mut self, class_index: u16, name: &str, descriptor: &str) -> u16 {
        self.member_ref(9, class_index, name, descriptor)
    }

    pub fn method_ref(&mut self, class_index: u16, name: &str, descriptor: &str) -> u16 {
        self.member_ref(10, class_index, name, descriptor)
    }

    pub fn interface_method_ref(
        &mut self,
        class_index: u16,
        name: &str,
        descriptor: &str,
    ) -> u16 {
        self.member_ref(11, class_index, name, descriptor)
    }

    pub fn version(&mut self, major_version: u16, minor_version: u16) -> &mut Self {
        self.major_version = major_version;
        self.minor_version = minor_version;
        self
    }

    pub fn access_flags(&mut self, access_flags: u16) -> &mut Self {
        self.access_flags = access_flags;
        self
    }

    /// Sets `this_class`, returning its pool index.
    pub fn this_class(&mut self, name: &str) -> u16 {
        self.this_class = self.class(name);
        self.this_class
    }

    pub fn super_class(&mut self, name: &str) -> u16 {
        self.super_class = self.class(name);
        self.super_class
    }

    pub fn interface(&mut self, name: &str) -> u16 {
        let index = self.class(name);
        self.interfaces.push(index);
        index
    }

    /// Encodes an attribute with the given raw body.
    pub fn attribute(&mut self, name: &str, info: &[u8]) -> Vec<u8> {
        let name_index = self.utf8(name);
        let mut bytes = vec![];
        bytes.extend(name_index.to_be_bytes());
        bytes.extend((info.len() as u32).to_be_bytes());
        bytes.extend(info);
        bytes
    }

    pub fn u16_attribute(&mut self, name: &str, value: u16) -> Vec<u8> {
        self.attribute(name, &value.to_be_bytes())
    }

    /// Encodes a `Code` attribute. Exception table rows are
    /// `(start_pc, end_pc, handler_pc, catch_type)`.
    pub fn code(
        &mut self,
        max_stack: u16,
        max_locals: u16,
        code: &[u8],
        exception_table: &[(u16, u16, u16, u16)],
        attributes: Vec<Vec<u8>>,
    ) -> Vec<u8> {
        let mut info = vec![];
        info.extend(max_stack.to_be_bytes());
        info.extend(max_locals.to_be_bytes());
        info.extend((code.len() as u32).to_be_bytes());
        info.extend(code);
        info.extend((exception_table.len() as u16).to_be_bytes());
        for (start_pc, end_pc, handler_pc, catch_type) in exception_table {
            info.extend(start_pc.to_be_bytes());
            info.extend(end_pc.to_be_bytes());
            info.extend(handler_pc.to_be_bytes());
            info.extend(catch_type.to_be_bytes());
        }
        push_attributes(&mut info, &attributes);
        self.attribute("Code", &info)
    }

    pub fn line_number_table(&mut self, lines: &[(u16, u16)]) -> Vec<u8> {
        let mut info = vec![];
        info.extend((lines.len() as u16).to_be_bytes());
        for (start_pc, line_number) in lines {
            info.extend(start_pc.to_be_bytes());
            info.extend(line_number.to_be_bytes());
        }
        self.attribute("LineNumberTable", &info)
    }

    /// Rows are `(start_pc, length, name, descriptor, slot)`.
    pub fn local_variable_table(&mut self, locals: &[(u16, u16, &str, &str, u16)]) -> Vec<u8> {
        self.local_variables("LocalVariableTable", locals)
    }

    /// Rows are `(start_pc, length, name, signature, slot)`.
    pub fn local_variable_type_table(
        &mut self,
        locals: &[(u16, u16, &str, &str, u16)],
    ) -> Vec<u8> {
        self.local_variables("LocalVariableTypeTable", locals)
    }

    fn local_variables(
        &mut self,
        attribute_name: &str,
        locals: &[(u16, u16, &str, &str, u16)],
    ) -> Vec<u8> {
        let mut info = vec![];
        info.extend((locals.len() as u16).to_be_bytes());
        for (start_pc, length, name, descriptor, slot) in locals {
            let name_index = self.utf8(name);
            let descriptor_index = self.utf8(descriptor);
            info.extend(start_pc.to_be_bytes());
            info.extend(length.to_be_bytes());
            info.extend(name_index.to_be_bytes());
            info.extend(descriptor_index.to_be_bytes());
            info.extend(slot.to_be_bytes());
        }
        self.attribute(attribute_name, &info)
    }

    /// Rows are `(inner_class, outer_class, inner_name, access_flags)` pool indices.
    pub fn inner_classes(&mut self, classes: &[(u16, u16, u16, u16)]) -> Vec<u8> {
        let mut info = vec![];
        info.extend((classes.len() as u16).to_be_bytes());
        for (inner_class, outer_class, inner_name, access_flags) in classes {
            info.extend(inner_class.to_be_bytes());
            info.extend(outer_class.to_be_bytes());
            info.extend(inner_name.to_be_bytes());
            info.extend(access_flags.to_be_bytes());
        }
        self.attribute("InnerClasses", &info)
    }

    pub fn enclosing_method(&mut self, class_index: u16, method_index: u16) -> Vec<u8> {
        let mut info = vec![];
        info.extend(class_index.to_be_bytes());
        info.extend(method_index.to_be_bytes());
        self.attribute("EnclosingMethod", &info)
    }

    pub fn exceptions(&mut self, classes: &[&str]) -> Vec<u8> {
        let mut info = vec![];
        info.extend((classes.len() as u16).to_be_bytes());
        for class in classes {
            let index = self.class(class);
            info.extend(index.to_be_bytes());
        }
        self.attribute("Exceptions", &info)
    }

    pub fn field(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attributes: Vec<Vec<u8>>,
    ) {
        let member = self.member(access_flags, name, descriptor, &attributes);
        self.fields.push(member);
    }

    pub fn method(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attributes: Vec<Vec<u8>>,
    ) {
        let member = self.member(access_flags, name, descriptor, &attributes);
        self.methods.push(member);
    }

    fn member(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attributes: &[Vec<u8>],
    ) -> Vec<u8> {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let mut bytes = vec![];
        bytes.extend(access_flags.to_be_bytes());
        bytes.extend(name_index.to_be_bytes());
        bytes.extend(descriptor_index.to_be_bytes());
        push_attributes(&mut bytes, attributes);
        bytes
    }

    pub fn class_attribute(&mut self, attribute: Vec<u8>) -> &mut Self {
        self.attributes.push(attribute);
        self
    }

    pub fn source_file(&mut self, name: &str) -> &mut Self {
        let index = self.utf8(name);
        let attribute = self.u16_attribute("SourceFile", index);
        self.class_attribute(attribute)
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bytes = vec![0xCA, 0xFE, 0xBA, 0xBE];
        bytes.extend(self.minor_version.to_be_bytes());
        bytes.extend(self.major_version.to_be_bytes());
        bytes.extend(self.pool_count.to_be_bytes());
        bytes.extend(&self.pool);
        bytes.extend(self.access_flags.to_be_bytes());
        bytes.extend(self.this_class.to_be_bytes());
        bytes.extend(self.super_class.to_be_bytes());
        bytes.extend((self.interfaces.len() as u16).to_be_bytes());
        for interface in &self.interfaces {
            bytes.extend(interface.to_be_bytes());
        }
        push_members(&mut bytes, &self.fields);
        push_members(&mut bytes, &self.methods);
        push_attributes(&mut bytes, &self.attributes);
        bytes
    }
}

fn push_members(bytes: &mut Vec<u8>, members: &[Vec<u8>]) {
    bytes.extend((members.len() as u16).to_be_bytes());
    members.iter().for_each(|m| bytes.extend(m));
}

fn push_attributes(bytes: &mut Vec<u8>, attributes: &[Vec<u8>]) {
    push_members(bytes, attributes)
}

/// `my/MyClass`: a private final int field with a constant value, a
/// constructor calling `Object.<init>` and `public float add(int)`.
pub fn my_class() -> Vec<u8> {
    let mut b = ClassBuilder::new();
    let this = b.this_class("my/MyClass");
    let object = b.super_class("java/lang/Object");
    b.source_file("MyClass.java");

    let object_init = b.method_ref(object, "<init>", "()V");
    let my_field = b.field_ref(this, "myField", "I");
    let five = b.integer(5);

    let constant_value = b.u16_attribute("ConstantValue", five);
    b.field(ACC_PRIVATE | ACC_FINAL, "myField", "I", vec![constant_value]);

    let lines = b.line_number_table(&[(0, 3)]);
    let locals = b.local_variable_table(&[(0, 5, "this", "Lmy/MyClass;", 0)]);
    let [hi, lo] = object_init.to_be_bytes();
    let code = b.code(1, 1, &[0x2a, 0xb7, hi, lo, 0xb1], &[], vec![lines, locals]);
    b.method(ACC_PUBLIC, "<init>", "()V", vec![code]);

    // aload_0; getfield myField; iload_1; iadd; i2f; freturn
    let [hi, lo] = my_field.to_be_bytes();
    let code = b.code(2, 2, &[0x2a, 0xb4, hi, lo, 0x1b, 0x60, 0x86, 0xae], &[], vec![]);
    b.method(ACC_PUBLIC, "add", "(I)F", vec![code]);

    b.build()
}
