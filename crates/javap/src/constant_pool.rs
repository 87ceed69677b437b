use std::fmt::{self, Write};

use jdis_class_file::{
    constant_pool::{
        ClassInfo, InvokeDynamicInfo, MethodHandleInfo, MethodTypeInfo, NameAndTypeInfo,
    },
    CpInfo,
};

use crate::printer::Printer;

impl<W: Write> Printer<'_, W> {
    /// One `const #N = <tag>\t<value>;` line per entry. The unusable slot after
    /// a long or double is skipped.
    pub(crate) fn print_constant_pool(&mut self) -> fmt::Result {
        writeln!(self.out, "  Constant pool:")?;
        let pool = self.pool;
        for (index, cp_info) in pool.iter() {
            let operands = match cp_info {
                CpInfo::Utf8(_)
                | CpInfo::Integer(_)
                | CpInfo::Float(_)
                | CpInfo::Long(_)
                | CpInfo::Double(_)
                | CpInfo::Unusable => None,
                CpInfo::Class(ClassInfo { name_index }) => Some(format!("#{}", name_index)),
                CpInfo::String { string_index } => Some(format!("#{}", string_index)),
                CpInfo::FieldRef(r) | CpInfo::MethodRef(r) | CpInfo::InterfaceMethodRef(r) => {
                    Some(format!("#{}.#{}", r.class_index, r.name_and_type_index))
                }
                CpInfo::NameAndType(NameAndTypeInfo {
                    name_index,
                    descriptor_index,
                }) => Some(format!("#{}:#{}", name_index, descriptor_index)),
                CpInfo::MethodHandle(MethodHandleInfo {
                    reference_kind,
                    reference_index,
                }) => Some(format!("{}:#{}", reference_kind, reference_index)),
                CpInfo::MethodType(MethodTypeInfo { descriptor_index }) => {
                    Some(format!("#{}", descriptor_index))
                }
                CpInfo::InvokeDynamic(InvokeDynamicInfo {
                    bootstrap_method_attr_index,
                    name_and_type_index,
                }) => Some(format!(
                    "#{}:#{}",
                    bootstrap_method_attr_index, name_and_type_index
                )),
            };

            let value = self.display(index);
            match operands {
                Some(operands) => writeln!(
                    self.out,
                    "const #{} = {}\t{};\t//  {}",
                    index,
                    cp_info.tag_name(),
                    operands,
                    value
                )?,
                None => writeln!(
                    self.out,
                    "const #{} = {}\t{};",
                    index,
                    cp_info.tag_name(),
                    value
                )?,
            }
        }
        Ok(())
    }
}
