use std::fmt::{self, Write};

use jdis_class_file::{
    attributes::{Attribute, ExceptionTableEntry, LineNumberEntry, LocalVariableEntry},
    descriptor, opcodes,
    stack_map::{StackMapEntry, StackMapFrame, StackMapTableEntry, VerificationType},
    AccessFlags, CodeAttribute, Instruction, Instructions, MethodInfo, Operand,
};
use log::warn;

use crate::printer::{incorrect_index, Printer};

impl<W: Write> Printer<'_, W> {
    pub(crate) fn print_code(
        &mut self,
        method: &MethodInfo,
        descriptor: &str,
        code: &CodeAttribute,
    ) -> fmt::Result {
        writeln!(self.out, "  Code:")?;
        if self.options.show_verbose {
            let is_static = method.access_flags.contains(AccessFlags::STATIC);
            let args_size = match descriptor::args_size(descriptor, is_static) {
                Ok(args_size) => args_size.to_string(),
                Err(err) => {
                    warn!("{}", err);
                    String::from("?")
                }
            };
            writeln!(
                self.out,
                "   Stack={}, Locals={}, Args_size={}",
                code.max_stack, code.max_locals, args_size
            )?;
        }

        let (pool, this_class) = (self.pool, self.class.this_class);
        for instruction in Instructions::new(&code.code, pool, this_class) {
            match instruction {
                Ok(instruction) => {
                    let text = instruction_text(&instruction);
                    writeln!(self.out, "   {}:\t{}", instruction.pc, text)?
                }
                Err(err) => {
                    warn!("{}", err);
                    writeln!(self.out, "   Error: {}", err)?
                }
            }
        }

        if !code.exception_table.is_empty() {
            self.print_exception_table(&code.exception_table)?;
        }
        writeln!(self.out)?;

        for attribute in &code.attributes {
            match attribute {
                Attribute::LineNumberTable { line_number_table }
                    if self.options.shows_line_and_local() =>
                {
                    self.print_line_number_table(line_number_table)?
                }
                Attribute::LocalVariableTable {
                    local_variable_table,
                } if self.options.shows_line_and_local() => {
                    self.print_local_variable_table("LocalVariableTable", local_variable_table)?
                }
                Attribute::LocalVariableTypeTable {
                    local_variable_type_table,
                } if self.options.show_verbose => self.print_local_variable_table(
                    "LocalVariableTypeTable",
                    local_variable_type_table,
                )?,
                Attribute::StackMapTable { entries } if self.options.show_verbose => {
                    self.print_stack_map_table(entries)?
                }
                Attribute::StackMap { entries } if self.options.show_verbose => {
                    self.print_stack_map(entries)?
                }
                _ => {}
            }
        }
        self.print_unknown_attributes(&code.attributes)
    }

    fn print_exception_table(&mut self, exception_table: &[ExceptionTableEntry]) -> fmt::Result {
        writeln!(self.out, "  Exception table:")?;
        writeln!(self.out, "   from   to  target type")?;
        for entry in exception_table {
            let catch_type = match entry.catch_type {
                0 => String::from("any"),
                index => format!("Class {}", self.internal_class_name(index)),
            };
            writeln!(
                self.out,
                "  {:>5} {:>5} {:>5}   {}",
                entry.start_pc, entry.end_pc, entry.handler_pc, catch_type
            )?;
        }
        Ok(())
    }

    fn print_line_number_table(&mut self, line_number_table: &[LineNumberEntry]) -> fmt::Result {
        writeln!(self.out, "  LineNumberTable:")?;
        for entry in line_number_table {
            writeln!(self.out, "   line {}: {}", entry.line_number, entry.start_pc)?;
        }
        writeln!(self.out)
    }

    fn print_local_variable_table(
        &mut self,
        title: &str,
        local_variable_table: &[LocalVariableEntry],
    ) -> fmt::Result {
        writeln!(self.out, "  {}:", title)?;
        writeln!(self.out, "   Start  Length  Slot  Name   Signature")?;
        for entry in local_variable_table {
            writeln!(
                self.out,
                "   {}      {}      {}    {}       {}",
                entry.start_pc,
                entry.length,
                entry.index,
                self.utf8(entry.name_index),
                self.utf8(entry.descriptor_index)
            )?;
        }
        writeln!(self.out)
    }

    fn print_stack_map_table(&mut self, entries: &[StackMapTableEntry]) -> fmt::Result {
        writeln!(self.out, "  StackMapTable: number_of_entries = {}", entries.len())?;
        for entry in entries {
            let frame_type = entry.frame_type;
            writeln!(
                self.out,
                "   frame_type = {} /* {} */",
                frame_type,
                entry.kind_name()
            )?;
            match &entry.frame {
                StackMapFrame::SameFrame { offset_delta } if frame_type > 63 => {
                    writeln!(self.out, "     offset_delta = {}", offset_delta)?
                }
                StackMapFrame::SameFrame { .. } => {}
                StackMapFrame::SameLocals1StackItem {
                    offset_delta,
                    stack,
                } => {
                    if frame_type > 127 {
                        writeln!(self.out, "     offset_delta = {}", offset_delta)?;
                    }
                    let stack = self.verification_types(std::slice::from_ref(stack));
                    writeln!(self.out, "     stack = {}", stack)?
                }
                StackMapFrame::ChopFrame { offset_delta, .. } => {
                    writeln!(self.out, "     offset_delta = {}", offset_delta)?
                }
                StackMapFrame::AppendFrame {
                    offset_delta,
                    locals,
                } => {
                    writeln!(self.out, "     offset_delta = {}", offset_delta)?;
                    let locals = self.verification_types(locals);
                    writeln!(self.out, "     locals = {}", locals)?
                }
                StackMapFrame::FullFrame {
                    offset_delta,
                    locals,
                    stack,
                } => {
                    writeln!(self.out, "     offset_delta = {}", offset_delta)?;
                    let locals = self.verification_types(locals);
                    writeln!(self.out, "     locals = {}", locals)?;
                    let stack = self.verification_types(stack);
                    writeln!(self.out, "     stack = {}", stack)?
                }
            }
        }
        writeln!(self.out)
    }

    fn print_stack_map(&mut self, entries: &[StackMapEntry]) -> fmt::Result {
        writeln!(self.out, "  StackMap: number_of_entries = {}", entries.len())?;
        for entry in entries {
            writeln!(self.out, "   frame_type = 255 /* full_frame */")?;
            writeln!(self.out, "     offset = {}", entry.offset)?;
            let locals = self.verification_types(&entry.locals);
            writeln!(self.out, "     locals = {}", locals)?;
            let stack = self.verification_types(&entry.stack);
            writeln!(self.out, "     stack = {}", stack)?;
        }
        writeln!(self.out)
    }

    /// `[ int, class java/lang/String ]`
    fn verification_types(&self, types: &[VerificationType]) -> String {
        if types.is_empty() {
            return String::from("[ ]");
        }
        let types = types
            .iter()
            .map(|t| match t {
                VerificationType::Top => String::from("top"),
                VerificationType::Integer => String::from("int"),
                VerificationType::Float => String::from("float"),
                VerificationType::Double => String::from("double"),
                VerificationType::Long => String::from("long"),
                VerificationType::Null => String::from("null"),
                VerificationType::UninitializedThis => String::from("this"),
                VerificationType::Object(index) => {
                    format!("class {}", self.internal_class_name(*index))
                }
                VerificationType::Uninitialized(offset) => format!("uninitialized {}", offset),
            })
            .collect::<Vec<_>>();
        format!("[ {} ]", types.join(", "))
    }
}

/// The mnemonic and operands of one instruction line, without the pc.
fn instruction_text(instruction: &Instruction) -> String {
    let name = instruction.name();
    match &instruction.operands[..] {
        [] => name.into_owned(),
        [Operand::TableSwitch {
            default,
            low,
            high,
            targets,
        }] => {
            let mut text = format!("{}{{ //{} to {}\n", name, low, high);
            for (value, target) in (*low as i64..).zip(targets) {
                text += &format!("\t\t{}: {};\n", value, target);
            }
            text + &format!("\t\tdefault: {} }}", default)
        }
        [Operand::LookupSwitch { default, pairs }] => {
            let mut text = format!("{}{{ //{}\n", name, pairs.len());
            for (value, target) in pairs {
                text += &format!("\t\t{}: {};\n", value, target);
            }
            text + &format!("\t\tdefault: {} }}", default)
        }
        [Operand::Constant { index, annotation }, rest @ ..] => {
            let extra = match rest {
                [Operand::Count(n)] | [Operand::Dimensions(n)] => format!(",  {}", n),
                _ => String::new(),
            };
            let annotation = match annotation {
                Ok(annotation) => annotation.clone(),
                Err(err) => incorrect_index(*index, err),
            };
            format!("{}\t#{}{}; //{}", name, index, extra, annotation)
        }
        [Operand::Local(local), Operand::Increment(increment)] => {
            format!("{}\t{}, {}", name, local, increment)
        }
        operands => {
            let operands = operands
                .iter()
                .map(operand_text)
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}\t{}", name, operands)
        }
    }
}

fn operand_text(operand: &Operand) -> String {
    match operand {
        Operand::Local(n) => n.to_string(),
        Operand::Increment(n) => n.to_string(),
        Operand::Immediate(n) => n.to_string(),
        Operand::Count(n) | Operand::Dimensions(n) => n.to_string(),
        Operand::Constant { index, .. } => format!("#{}", index),
        Operand::ArrayType(atype) => match opcodes::array_type_name(*atype) {
            Some(name) => name.to_owned(),
            None => format!("BOGUS TYPE:{}", atype),
        },
        Operand::Branch { target, .. } => target.to_string(),
        Operand::TableSwitch { default, .. } | Operand::LookupSwitch { default, .. } => {
            default.to_string()
        }
    }
}
