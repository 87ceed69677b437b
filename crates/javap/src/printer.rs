use std::fmt::{self, Write};

use jdis_class_file::{
    attributes::{Attribute, Attributes, InnerClass, UnknownAttribute},
    descriptor, ClassFile, ConstantPool, FieldInfo, MethodInfo, Result,
};
use log::{debug, warn};

use crate::Options;

pub(crate) struct Printer<'a, W> {
    pub(crate) out: W,
    pub(crate) class: &'a ClassFile,
    pub(crate) pool: &'a ConstantPool,
    pub(crate) options: &'a Options,
}

impl<'a, W: Write> Printer<'a, W> {
    pub(crate) fn new(out: W, class: &'a ClassFile, options: &'a Options) -> Self {
        Self {
            out,
            class,
            pool: &class.constant_pool,
            options,
        }
    }

    pub(crate) fn print(&mut self) -> fmt::Result {
        self.print_header()?;

        let class = self.class;
        for field in &class.fields {
            if self.options.access_level.allows(field.access_flags) {
                self.print_field(field)?;
            }
        }
        for method in &class.methods {
            if self.options.access_level.allows(method.access_flags) {
                self.print_method(method)?;
            }
        }

        writeln!(self.out, "}}")
    }

    fn print_header(&mut self) -> fmt::Result {
        if let Some(index) = self.class.attributes.source_file() {
            writeln!(self.out, "Compiled from \"{}\"", self.utf8(index))?;
        }

        let is_interface = self.class.is_interface();
        let mut line = String::new();
        for modifier in self.class.access_flags.class_modifiers() {
            if !(is_interface && modifier == "abstract") {
                line.push_str(modifier);
                line.push(' ');
            }
        }
        line.push_str(if is_interface { "interface " } else { "class " });
        line.push_str(&self.java_class_name(self.class.this_class));

        let interfaces = self
            .class
            .interfaces
            .iter()
            .map(|i| self.java_class_name(*i))
            .collect::<Vec<_>>()
            .join(",");
        if is_interface {
            if !interfaces.is_empty() {
                write!(line, " extends {}", interfaces)?;
            }
        } else {
            if self.class.super_class != 0 {
                write!(line, " extends {}", self.java_class_name(self.class.super_class))?;
            }
            if !interfaces.is_empty() {
                write!(line, " implements {}", interfaces)?;
            }
        }

        if !self.options.show_verbose {
            return writeln!(self.out, "{}{{", line);
        }

        writeln!(self.out, "{}", line)?;
        self.print_class_attributes()?;
        writeln!(self.out, "  minor version: {}", self.class.minor_version)?;
        writeln!(self.out, "  major version: {}", self.class.major_version)?;
        self.print_constant_pool()?;
        writeln!(self.out)?;
        writeln!(self.out, "{{")
    }

    fn print_class_attributes(&mut self) -> fmt::Result {
        let class = self.class;
        let attributes = &class.attributes;
        for attribute in attributes {
            match attribute {
                Attribute::SourceFile { sourcefile_index } => {
                    writeln!(self.out, "  SourceFile: \"{}\"", self.utf8(*sourcefile_index))?
                }
                Attribute::Signature { signature_index } => {
                    writeln!(self.out, "  Signature: {}", self.utf8(*signature_index))?
                }
                Attribute::EnclosingMethod {
                    class_index,
                    method_index,
                } => self.print_enclosing_method(*class_index, *method_index)?,
                Attribute::InnerClasses { classes } => self.print_inner_classes(classes)?,
                Attribute::Synthetic => writeln!(self.out, "  Synthetic: true")?,
                Attribute::Deprecated => writeln!(self.out, "  Deprecated: true")?,
                _ => {}
            }
        }
        self.print_unknown_attributes(attributes)
    }

    fn print_enclosing_method(&mut self, class_index: u16, method_index: u16) -> fmt::Result {
        let class = self.internal_class_name(class_index);
        if method_index == 0 {
            return writeln!(self.out, "  EnclosingMethod: #{}.#0; //{}", class_index, class);
        }
        let method = self.display(method_index);
        writeln!(
            self.out,
            "  EnclosingMethod: #{}.#{}; //{}.{}",
            class_index, method_index, class, method
        )
    }

    fn print_inner_classes(&mut self, classes: &[InnerClass]) -> fmt::Result {
        writeln!(self.out, "  InnerClasses:")?;
        for inner in classes {
            let mut line = String::from("   ");
            for modifier in inner.inner_class_access_flags.inner_class_modifiers() {
                line.push_str(modifier);
                line.push(' ');
            }
            let mut comment = String::new();
            if inner.inner_name_index != 0 {
                write!(line, "#{}= ", inner.inner_name_index)?;
                write!(comment, "{}=", self.utf8(inner.inner_name_index))?;
            }
            write!(line, "#{}", inner.inner_class_info_index)?;
            write!(comment, "class {}", self.internal_class_name(inner.inner_class_info_index))?;
            if inner.outer_class_info_index != 0 {
                write!(line, " of #{}", inner.outer_class_info_index)?;
                write!(
                    comment,
                    " of class {}",
                    self.internal_class_name(inner.outer_class_info_index)
                )?;
            }
            writeln!(self.out, "{}; //{}", line, comment)?;
        }
        writeln!(self.out)
    }

    fn print_field(&mut self, field: &FieldInfo) -> fmt::Result {
        let name = self.utf8(field.name_index);
        let descriptor = self.utf8(field.descriptor_index);
        let ty = descriptor::field_type(&descriptor).unwrap_or_else(|_| descriptor.clone());
        writeln!(
            self.out,
            "{}{} {};",
            modifiers(field.access_flags.field_modifiers()),
            ty,
            name
        )?;

        if self.options.shows_internal_sigs() {
            writeln!(self.out, "  Signature: {}", descriptor)?;
        }
        if self.options.show_verbose {
            if let Some(signature) = field.attributes.signature() {
                writeln!(self.out, "  Signature: {}", self.utf8(signature))?;
            }
            if let Some(index) = field.attributes.constant_value() {
                writeln!(self.out, "  Constant value: {}", self.describe(index))?;
            }
            self.print_markers(field.is_synthetic(), field.is_deprecated())?;
        }
        self.print_unknown_attributes(&field.attributes)?;

        writeln!(self.out)
    }

    fn print_method(&mut self, method: &MethodInfo) -> fmt::Result {
        let name = self.utf8(method.name_index);
        let descriptor = self.utf8(method.descriptor_index);
        let exceptions = method
            .attributes
            .exceptions()
            .map(|e| e.iter().map(|i| self.java_class_name(*i)).collect::<Vec<_>>())
            .unwrap_or_default();
        debug!("printing method {}{}", name, descriptor);

        let mut line = modifiers(method.access_flags.method_modifiers());
        match (name.as_str(), descriptor::method_type(&descriptor)) {
            ("<clinit>", _) => line = String::from("static {}"),
            ("<init>", Ok((parameters, _))) => write!(
                line,
                "{}({})",
                self.java_class_name(self.class.this_class),
                parameters.join(", ")
            )?,
            (_, Ok((parameters, return_type))) => {
                write!(line, "{} {}({})", return_type, name, parameters.join(", "))?
            }
            (_, Err(err)) => {
                warn!("method {}: {}", name, err);
                write!(line, "{}{}", name, descriptor)?
            }
        }
        if !exceptions.is_empty() {
            write!(line, "   throws {}", exceptions.join(", "))?;
        }
        writeln!(self.out, "{};", line)?;

        if self.options.shows_internal_sigs() {
            writeln!(self.out, "  Signature: {}", descriptor)?;
        }
        if self.options.show_verbose {
            if let Some(signature) = method.attributes.signature() {
                writeln!(self.out, "  Signature: {}", self.utf8(signature))?;
            }
        }
        if self.options.shows_code() {
            if let Some(code) = method.code() {
                self.print_code(method, &descriptor, code)?;
            }
        }
        if self.options.show_verbose {
            if !exceptions.is_empty() {
                writeln!(self.out, "  Exceptions:")?;
                writeln!(self.out, "   throws {}", exceptions.join(", "))?;
            }
            self.print_markers(method.is_synthetic(), method.is_deprecated())?;
        }
        self.print_unknown_attributes(&method.attributes)?;

        writeln!(self.out)
    }

    fn print_markers(&mut self, synthetic: bool, deprecated: bool) -> fmt::Result {
        if synthetic {
            writeln!(self.out, "  Synthetic: true")?;
        }
        if deprecated {
            writeln!(self.out, "  Deprecated: true")?;
        }
        Ok(())
    }

    /// Hex dumps attributes that were kept opaque, when asked for all attributes.
    pub(crate) fn print_unknown_attributes(&mut self, attributes: &Attributes) -> fmt::Result {
        if !self.options.show_all_attributes {
            return Ok(());
        }
        for attribute in attributes.unknown() {
            self.print_unknown_attribute(attribute)?;
        }
        Ok(())
    }

    fn print_unknown_attribute(&mut self, attribute: &UnknownAttribute) -> fmt::Result {
        let name = self.utf8(attribute.attribute_name_index);
        writeln!(self.out, "  {}: length = 0x{:X}", name, attribute.info.len())?;
        for chunk in attribute.info.chunks(16) {
            let bytes = chunk
                .iter()
                .map(|b| format!("{:02X}", b))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(self.out, "   {}", bytes)?;
        }
        writeln!(self.out)
    }

    pub(crate) fn utf8(&self, index: u16) -> String {
        self.resolved(index, self.pool.resolve_utf8(index))
    }

    /// `java/lang/Object` as `java.lang.Object`.
    pub(crate) fn java_class_name(&self, index: u16) -> String {
        self.resolved(index, self.pool.class_name(index).map(|n| n.replace('/', ".")))
    }

    pub(crate) fn internal_class_name(&self, index: u16) -> String {
        self.resolved(index, self.pool.class_name(index))
    }

    pub(crate) fn display(&self, index: u16) -> String {
        self.resolved(index, self.pool.display_string(index))
    }

    pub(crate) fn describe(&self, index: u16) -> String {
        self.resolved(index, self.pool.describe(index, 0))
    }

    /// The resolved value, or an inline marker when `index` does not resolve.
    pub(crate) fn resolved<T: ToString>(&self, index: u16, result: Result<T>) -> String {
        match result {
            Ok(value) => value.to_string(),
            Err(err) => incorrect_index(index, &err),
        }
    }
}

pub(crate) fn incorrect_index(index: u16, err: &dyn std::error::Error) -> String {
    warn!("constant pool index {}: {}", index, err);
    format!("<Incorrect CP index:{}>", index)
}

/// Modifiers followed by a space, or nothing.
fn modifiers(modifiers: Vec<&str>) -> String {
    modifiers.iter().map(|m| format!("{} ", m)).collect()
}
