// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html

mod access_flags;
pub mod attributes;
mod byte_cursor;
mod class_file;
#[macro_use]
pub mod constant_pool;
pub mod descriptor;
mod error;
pub mod instruction;
mod mutf8;
pub mod opcodes;
mod parser;
pub mod stack_map;

pub use self::class_file::{ClassFile, FieldInfo, MethodInfo};
pub use access_flags::AccessFlags;
pub use attributes::{Attribute, Attributes, CodeAttribute};
pub use byte_cursor::ByteCursor;
pub use constant_pool::{ConstantPool, CpInfo};
pub use error::ClassFileError;
pub use instruction::{decode_one, Instruction, Instructions, Operand};
pub use parser::Parser;

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;
