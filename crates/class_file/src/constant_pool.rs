use log::trace;

use crate::{mutf8, ByteCursor, ClassFileError, Result};

#[macro_export]
macro_rules! matches_cp_info {
    ($cp:expr, $index:expr, $i:ident) => {
        match $cp.get($index)? {
            $crate::CpInfo::$i(n) => Ok(n),
            c => Err($crate::ClassFileError::UnexpectedConstantPoolEntry(
                stringify!($i),
                c.clone(),
            )),
        }
    };
}

/// The constant pool of a class file.
///
/// Indices are 1-based, as in the class file itself. The slot following a
/// `Long` or `Double` entry is stored as [`CpInfo::Unusable`].
#[derive(Debug, Default)]
pub struct ConstantPool {
    cp_infos: Vec<CpInfo>,
}
impl ConstantPool {
    pub fn new(cp_infos: Vec<CpInfo>) -> Self {
        Self { cp_infos }
    }

    /// Reads `constant_pool_count - 1` slots worth of entries.
    pub fn parse(r: &mut ByteCursor, constant_pool_count: u16) -> Result<Self> {
        let count = constant_pool_count.saturating_sub(1) as usize;
        let mut res = Vec::with_capacity(count);
        while res.len() < count {
            let index = res.len() as u16 + 1;
            let (cp_info, slot_size) = parse_cp_info(r, index)?;
            res.push(cp_info);
            (1..slot_size).for_each(|_| res.push(CpInfo::Unusable));
        }
        res.truncate(count);
        trace!("parsed {} constant pool slots", res.len());

        Ok(Self::new(res))
    }

    /// The `constant_pool_count` value this pool was read with.
    pub fn count(&self) -> u16 {
        self.cp_infos.len() as u16 + 1
    }

    pub fn is_empty(&self) -> bool {
        self.cp_infos.is_empty()
    }

    pub fn get(&self, index: u16) -> Result<&CpInfo> {
        match index
            .checked_sub(1)
            .and_then(|i| self.cp_infos.get(i as usize))
        {
            Some(CpInfo::Unusable) => Err(ClassFileError::UnusableConstantPoolEntry(index)),
            Some(cp_info) => Ok(cp_info),
            None => Err(ClassFileError::IndexOutOfRange(index)),
        }
    }

    /// Iterates over `(index, entry)` pairs, skipping the unusable slots.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &CpInfo)> {
        self.cp_infos
            .iter()
            .enumerate()
            .filter(|(_, cp_info)| !matches!(cp_info, CpInfo::Unusable))
            .map(|(i, cp_info)| (i as u16 + 1, cp_info))
    }

    pub fn resolve_utf8(&self, index: u16) -> Result<&str> {
        matches_cp_info!(self, index, Utf8).map(String::as_str)
    }

    /// The internal form of the class name at `index`, e.g. `java/lang/Object`.
    pub fn class_name(&self, index: u16) -> Result<&str> {
        let ClassInfo { name_index } = matches_cp_info!(self, index, Class)?;
        self.resolve_utf8(*name_index)
    }

    pub fn tag_name(&self, index: u16) -> Result<&'static str> {
        Ok(self.get(index)?.tag_name())
    }

    /// Renders the entry at `index` in its fully qualified form.
    pub fn display_string(&self, index: u16) -> Result<String> {
        Ok(match self.get(index)? {
            CpInfo::Utf8(s) => escape(s),
            CpInfo::Integer(i) => i.to_string(),
            CpInfo::Float(f) => float_literal(*f),
            CpInfo::Long(l) => format!("{}l", l),
            CpInfo::Double(d) => double_literal(*d),
            CpInfo::Class(ClassInfo { name_index }) => {
                self.resolve_utf8(*name_index)?.replace('/', ".")
            }
            CpInfo::String { string_index } => escape(self.resolve_utf8(*string_index)?),
            CpInfo::FieldRef(ref_info)
            | CpInfo::MethodRef(ref_info)
            | CpInfo::InterfaceMethodRef(ref_info) => self.member_ref(ref_info)?,
            CpInfo::NameAndType(name_and_type) => self.name_and_type(name_and_type)?,
            CpInfo::MethodHandle(MethodHandleInfo {
                reference_kind,
                reference_index,
            }) => {
                let ref_info = match self.get(*reference_index)? {
                    CpInfo::FieldRef(ref_info)
                    | CpInfo::MethodRef(ref_info)
                    | CpInfo::InterfaceMethodRef(ref_info) => ref_info,
                    c => {
                        return Err(ClassFileError::UnexpectedConstantPoolEntry(
                            "member reference",
                            c.clone(),
                        ))
                    }
                };
                format!(
                    "{} {}",
                    reference_kind_name(*reference_kind),
                    self.member_ref(ref_info)?
                )
            }
            CpInfo::MethodType(MethodTypeInfo { descriptor_index }) => {
                self.resolve_utf8(*descriptor_index)?.to_owned()
            }
            CpInfo::InvokeDynamic(InvokeDynamicInfo {
                bootstrap_method_attr_index,
                name_and_type_index,
            }) => format!(
                "#{}:{}",
                bootstrap_method_attr_index,
                self.name_and_type_at(*name_and_type_index)?
            ),
            CpInfo::Unusable => return Err(ClassFileError::UnusableConstantPoolEntry(index)),
        })
    }

    /// Like [`display_string`](Self::display_string), but member references
    /// owned by `this_class` drop their class-name prefix.
    pub fn short_display_string(&self, index: u16, this_class: u16) -> Result<String> {
        match self.get(index)? {
            CpInfo::FieldRef(ref_info)
            | CpInfo::MethodRef(ref_info)
            | CpInfo::InterfaceMethodRef(ref_info)
                if ref_info.class_index == this_class =>
            {
                self.name_and_type_at(ref_info.name_and_type_index)
            }
            _ => self.display_string(index),
        }
    }

    // Resolves exactly one level down: a Class and a NameAndType.
    fn member_ref(&self, ref_info: &RefInfo) -> Result<String> {
        Ok(format!(
            "{}.{}",
            java_name(self.class_name(ref_info.class_index)?),
            self.name_and_type_at(ref_info.name_and_type_index)?
        ))
    }

    fn name_and_type_at(&self, index: u16) -> Result<String> {
        self.name_and_type(matches_cp_info!(self, index, NameAndType)?)
    }

    fn name_and_type(&self, name_and_type: &NameAndTypeInfo) -> Result<String> {
        Ok(format!(
            "{}:{}",
            java_name(self.resolve_utf8(name_and_type.name_index)?),
            self.resolve_utf8(name_and_type.descriptor_index)?
        ))
    }

    /// The annotation printed next to an instruction operand, e.g.
    /// `Field java/lang/System.out:Ljava/io/PrintStream;`.
    pub fn describe(&self, index: u16, this_class: u16) -> Result<String> {
        Ok(format!(
            "{} {}",
            self.tag_name(index)?,
            self.short_display_string(index, this_class)?
        ))
    }
}
impl<'a> IntoIterator for &'a ConstantPool {
    type Item = &'a CpInfo;
    type IntoIter = std::slice::Iter<'a, CpInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.cp_infos.iter()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum CpInfo {
    MethodRef(RefInfo),
    FieldRef(RefInfo),
    Float(f32),
    InterfaceMethodRef(RefInfo),
    Class(ClassInfo),
    NameAndType(NameAndTypeInfo),
    Utf8(String),
    String { string_index: u16 },
    InvokeDynamic(InvokeDynamicInfo),
    Integer(i32),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    Long(i64),
    Double(f64),
    Unusable,
}
impl CpInfo {
    pub fn tag_name(&self) -> &'static str {
        match self {
            CpInfo::MethodRef(_) => "Method",
            CpInfo::FieldRef(_) => "Field",
            CpInfo::Float(_) => "float",
            CpInfo::InterfaceMethodRef(_) => "InterfaceMethod",
            CpInfo::Class(_) => "class",
            CpInfo::NameAndType(_) => "NameAndType",
            CpInfo::Utf8(_) => "Asciz",
            CpInfo::String { .. } => "String",
            CpInfo::InvokeDynamic(_) => "InvokeDynamic",
            CpInfo::Integer(_) => "int",
            CpInfo::MethodHandle(_) => "MethodHandle",
            CpInfo::MethodType(_) => "MethodType",
            CpInfo::Long(_) => "long",
            CpInfo::Double(_) => "double",
            CpInfo::Unusable => "unusable",
        }
    }

    /// Number of pool slots the entry occupies.
    pub fn slot_size(&self) -> u16 {
        match self {
            CpInfo::Long(_) | CpInfo::Double(_) => 2,
            _ => 1,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ClassInfo {
    // The value of the name_index item must be a valid index into the constant_pool table.
    // The constant_pool entry at that index must be a CONSTANT_Utf8_info structure
    // representing a valid binary class or interface name encoded in internal form.
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct InvokeDynamicInfo {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodHandleInfo {
    pub reference_kind: u8,
    pub reference_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}

fn parse_cp_info(r: &mut ByteCursor, index: u16) -> Result<(CpInfo, usize)> {
    let tag = r.read_u8()?;
    let cp_info = match tag {
        1 => parse_utf8(r)?,
        3 => CpInfo::Integer(r.read_i32()?),
        4 => CpInfo::Float(r.read_f32()?),
        5 => CpInfo::Long(r.read_i64()?),
        6 => CpInfo::Double(r.read_f64()?),
        7 => CpInfo::Class(ClassInfo {
            name_index: r.read_u16()?,
        }),
        8 => CpInfo::String {
            string_index: r.read_u16()?,
        },
        9 => CpInfo::FieldRef(parse_ref_info(r)?),
        10 => CpInfo::MethodRef(parse_ref_info(r)?),
        11 => CpInfo::InterfaceMethodRef(parse_ref_info(r)?),
        12 => CpInfo::NameAndType(NameAndTypeInfo {
            name_index: r.read_u16()?,
            descriptor_index: r.read_u16()?,
        }),
        15 => CpInfo::MethodHandle(MethodHandleInfo {
            reference_kind: r.read_u8()?,
            reference_index: r.read_u16()?,
        }),
        16 => CpInfo::MethodType(MethodTypeInfo {
            descriptor_index: r.read_u16()?,
        }),
        18 => CpInfo::InvokeDynamic(InvokeDynamicInfo {
            bootstrap_method_attr_index: r.read_u16()?,
            name_and_type_index: r.read_u16()?,
        }),
        _ => return Err(ClassFileError::InvalidCpInfoTag { tag, index }),
    };

    let slot_size = cp_info.slot_size() as usize;
    Ok((cp_info, slot_size))
}

fn parse_utf8(r: &mut ByteCursor) -> Result<CpInfo> {
    let length = r.read_u16()?;
    let bytes = r.read_bytes(length as usize)?;

    Ok(CpInfo::Utf8(mutf8::decode(bytes)))
}

fn parse_ref_info(r: &mut ByteCursor) -> Result<RefInfo> {
    let class_index = r.read_u16()?;
    let name_and_type_index = r.read_u16()?;

    Ok(RefInfo {
        class_index,
        name_and_type_index,
    })
}

fn reference_kind_name(kind: u8) -> &'static str {
    match kind {
        1 => "REF_getField",
        2 => "REF_getStatic",
        3 => "REF_putField",
        4 => "REF_putStatic",
        5 => "REF_invokeVirtual",
        6 => "REF_invokeStatic",
        7 => "REF_invokeSpecial",
        8 => "REF_newInvokeSpecial",
        9 => "REF_invokeInterface",
        _ => "REF_unknown",
    }
}

/// Quotes names that are not a `/`-separated sequence of Java identifiers,
/// such as `<init>`.
fn java_name(name: &str) -> String {
    let is_identifier = |part: &str| {
        let mut chars = part.chars();
        chars
            .next()
            .map_or(false, |c| c.is_alphabetic() || c == '_' || c == '$')
            && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
    };

    if name.split('/').all(is_identifier) {
        name.to_owned()
    } else {
        format!("\"{}\"", name)
    }
}

fn escape(s: &str) -> String {
    let mut res = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\t' => res.push_str("\\t"),
            '\n' => res.push_str("\\n"),
            '\r' => res.push_str("\\r"),
            '\u{8}' => res.push_str("\\b"),
            '\u{c}' => res.push_str("\\f"),
            '"' => res.push_str("\\\""),
            '\'' => res.push_str("\\'"),
            '\\' => res.push_str("\\\\"),
            c if c.is_control() => res.push_str(&format!("\\u{:04x}", c as u32)),
            c => res.push(c),
        }
    }
    res
}

fn float_literal(f: f32) -> String {
    if f.is_nan() {
        "0.0f/0.0f".to_owned()
    } else if f.is_infinite() {
        format!("{}1.0f/0.0f", if f < 0.0 { "-" } else { "" })
    } else {
        format!("{:?}f", f)
    }
}

fn double_literal(d: f64) -> String {
    if d.is_nan() {
        "0.0d/0.0d".to_owned()
    } else if d.is_infinite() {
        format!("{}1.0d/0.0d", if d < 0.0 { "-" } else { "" })
    } else {
        format!("{:?}d", d)
    }
}
