//! Renders parsed class files as `javap` style text.

mod code;
mod constant_pool;
mod options;
mod printer;

use std::fmt;

use jdis_class_file::ClassFile;

pub use options::{AccessLevel, Options};
use printer::Printer;

/// A class file paired with the options it is rendered with.
///
/// Rendering never fails on bad constant pool references or undecodable
/// code; those are shown inline as `<Incorrect CP index:N>` and `Error:`
/// markers.
pub struct Disassembly<'a> {
    class: &'a ClassFile,
    options: &'a Options,
}
impl<'a> Disassembly<'a> {
    pub fn new(class: &'a ClassFile, options: &'a Options) -> Self {
        Self { class, options }
    }
}
impl fmt::Display for Disassembly<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Printer::new(f, self.class, self.options).print()
    }
}

pub fn disassemble(class: &ClassFile, options: &Options) -> String {
    Disassembly::new(class, options).to_string()
}
