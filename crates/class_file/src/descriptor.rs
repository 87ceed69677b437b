//! Translation of field and method descriptors into Java source syntax.
//!
//! https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.3

use crate::{ClassFileError, Result};

const MAX_ARRAY_DIMENSIONS: usize = 255;

/// `Ljava/lang/String;` becomes `java.lang.String`, `[[I` becomes `int[][]`.
pub fn field_type(descriptor: &str) -> Result<String> {
    let mut pos = 0;
    let (ty, _) = next_type(descriptor, &mut pos)
        .filter(|_| pos == descriptor.len())
        .ok_or_else(|| invalid(descriptor))?;
    Ok(ty)
}

/// Parameter types and return type of a method descriptor.
pub fn method_type(descriptor: &str) -> Result<(Vec<String>, String)> {
    let (parameters, return_type, _) = parse_method(descriptor)?;
    Ok((parameters, return_type))
}

/// Number of local variable slots taken by the arguments, including `this`
/// for instance methods.
pub fn args_size(descriptor: &str, is_static: bool) -> Result<usize> {
    let (_, _, slots) = parse_method(descriptor)?;
    Ok(slots + if is_static { 0 } else { 1 })
}

fn parse_method(descriptor: &str) -> Result<(Vec<String>, String, usize)> {
    let params = descriptor
        .strip_prefix('(')
        .and_then(|rest| rest.find(')').map(|end| &rest[..end]))
        .ok_or_else(|| invalid(descriptor))?;

    let mut parameters = Vec::new();
    let mut slots = 0;
    let mut pos = 0;
    while pos < params.len() {
        let (ty, size) = next_type(params, &mut pos).ok_or_else(|| invalid(descriptor))?;
        parameters.push(ty);
        slots += size;
    }

    let ret = &descriptor[params.len() + 2..];
    let mut pos = 0;
    let (return_type, _) = next_type(ret, &mut pos)
        .filter(|_| pos == ret.len())
        .ok_or_else(|| invalid(descriptor))?;

    Ok((parameters, return_type, slots))
}

/// Reads one type starting at `pos`, returning it with its slot size.
fn next_type(s: &str, pos: &mut usize) -> Option<(String, usize)> {
    let dimensions = s.as_bytes().get(*pos..)?.iter().take_while(|c| **c == b'[').count();
    if dimensions > MAX_ARRAY_DIMENSIONS {
        return None;
    }
    *pos += dimensions;

    let c = *s.as_bytes().get(*pos)?;
    *pos += 1;
    let (ty, slots) = match c {
        b'L' => {
            let end = *pos + s[*pos..].find(';')?;
            let name = &s[*pos..end];
            *pos = end + 1;
            if name.is_empty() {
                return None;
            }
            (name.replace('/', "."), 1)
        }
        b'J' | b'D' => (primitive(c)?.to_owned(), 2),
        _ => (primitive(c)?.to_owned(), 1),
    };

    match dimensions {
        0 => Some((ty, slots)),
        _ => Some((ty + &"[]".repeat(dimensions), 1)),
    }
}

fn primitive(c: u8) -> Option<&'static str> {
    Some(match c {
        b'B' => "byte",
        b'C' => "char",
        b'D' => "double",
        b'F' => "float",
        b'I' => "int",
        b'J' => "long",
        b'S' => "short",
        b'Z' => "boolean",
        b'V' => "void",
        _ => return None,
    })
}

fn invalid(descriptor: &str) -> ClassFileError {
    ClassFileError::InvalidDescriptor(descriptor.to_owned())
}
