use thiserror::Error;

use crate::constant_pool;

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Truncated input: needed {needed} more bytes at offset {offset}")]
    TruncatedInput { offset: usize, needed: usize },
    #[error("Invalid magic identifier: 0x{0:X}")]
    InvalidMagicIdentifier(u32),
    #[error("Invalid cp info tag {tag} at constant pool index {index}")]
    InvalidCpInfoTag { tag: u8, index: u16 },
    #[error("Invalid length for {name} attribute: expected {expected} bytes, found {actual}")]
    InvalidAttributeLength {
        name: String,
        expected: u32,
        actual: u32,
    },
    #[error("Invalid exception handler {start_pc}..{end_pc} -> {handler_pc} for {code_length} bytes of code")]
    InvalidExceptionHandler {
        start_pc: u16,
        end_pc: u16,
        handler_pc: u16,
        code_length: usize,
    },
    #[error("Constant pool index out of range: {0}")]
    IndexOutOfRange(u16),
    #[error("Constant pool index {0} is the unusable second slot of a long or double")]
    UnusableConstantPoolEntry(u16),
    #[error("Expected {0}, found {1:?}")]
    UnexpectedConstantPoolEntry(&'static str, constant_pool::CpInfo),
    #[error("Malformed stack map frame type: {0}")]
    MalformedStackMapFrame(u8),
    #[error("Invalid verification type tag: {0}")]
    InvalidVerificationType(u8),
    #[error("Truncated instruction at pc {pc}")]
    TruncatedInstruction { pc: usize },
    #[error("Malformed switch at pc {pc}")]
    MalformedSwitch { pc: usize },
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),
}
