//! Decoding of single bytecode instructions from a method's code array.

use std::borrow::Cow;

use crate::{
    opcodes::{self, InstructionLength},
    ByteCursor, ClassFileError, ConstantPool, Result,
};

#[derive(Debug)]
pub struct Instruction {
    pub pc: usize,
    /// The opcode byte, or `(0xC4 << 8) | opcode` for `wide` forms.
    pub opcode: u16,
    /// `None` for bytes that are not a known opcode.
    pub mnemonic: Option<&'static str>,
    pub operands: Vec<Operand>,
    /// Total length in bytes, including opcode, prefix and padding.
    pub length: usize,
}
impl Instruction {
    /// The mnemonic, or `bytecode N` for unknown opcodes.
    pub fn name(&self) -> Cow<'static, str> {
        match self.mnemonic {
            Some(mnemonic) => Cow::Borrowed(mnemonic),
            None => Cow::Owned(format!("bytecode {}", self.opcode)),
        }
    }

    pub fn next_pc(&self) -> usize {
        self.pc + self.length
    }
}

#[derive(Debug)]
pub enum Operand {
    /// Local variable slot.
    Local(u16),
    /// Signed `iinc` increment.
    Increment(i16),
    /// `bipush`/`sipush` value.
    Immediate(i32),
    /// Constant pool operand, with its annotation resolved against the pool.
    Constant {
        index: u16,
        annotation: Result<String>,
    },
    /// `invokeinterface` argument count.
    Count(u8),
    /// `multianewarray` dimensions.
    Dimensions(u8),
    /// `newarray` element type code.
    ArrayType(u8),
    Branch {
        offset: i32,
        target: i64,
    },
    TableSwitch {
        default: i64,
        low: i32,
        high: i32,
        targets: Vec<i64>,
    },
    LookupSwitch {
        default: i64,
        pairs: Vec<(i32, i64)>,
    },
}

/// Decodes the instruction at `pc`.
///
/// Unknown opcodes decode to a one byte instruction without a mnemonic; only
/// an instruction running past the end of `code` is an error.
pub fn decode_one(
    code: &[u8],
    pc: usize,
    pool: &ConstantPool,
    this_class: u16,
) -> Result<Instruction> {
    let mut r = CodeReader::new(code, pc);
    let opcode = r.u8()?;

    let info = match opcodes::opcode_info(opcode) {
        Some(info) => info,
        None => return Ok(unknown(pc, opcode)),
    };

    let length = match info.length {
        InstructionLength::Fixed(length) => length as usize,
        InstructionLength::Computed => {
            return match opcode {
                opcodes::TABLESWITCH => r.table_switch(),
                opcodes::LOOKUPSWITCH => r.lookup_switch(),
                _ => r.wide(),
            }
        }
    };
    if pc + length > code.len() {
        return Err(ClassFileError::TruncatedInstruction { pc });
    }

    let constant = |index: u16| Operand::Constant {
        index,
        annotation: pool.describe(index, this_class),
    };

    let operands = match opcode {
        opcodes::BIPUSH => vec![Operand::Immediate(r.i8()? as i32)],
        opcodes::SIPUSH => vec![Operand::Immediate(r.i16()? as i32)],
        opcodes::LDC => {
            let index = r.u8()? as u16;
            vec![constant(index)]
        }
        opcodes::ILOAD..=opcodes::ALOAD | opcodes::ISTORE..=opcodes::ASTORE | opcodes::RET => {
            vec![Operand::Local(r.u8()? as u16)]
        }
        opcodes::IINC => vec![
            Operand::Local(r.u8()? as u16),
            Operand::Increment(r.i8()? as i16),
        ],
        opcodes::IFEQ..=opcodes::JSR | opcodes::IFNULL | opcodes::IFNONNULL => {
            let offset = r.i16()? as i32;
            vec![r.branch(offset)]
        }
        opcodes::GOTO_W | opcodes::JSR_W => {
            let offset = r.i32()?;
            vec![r.branch(offset)]
        }
        opcodes::LDC_W
        | opcodes::LDC2_W
        | opcodes::GETSTATIC..=opcodes::INVOKESTATIC
        | opcodes::NEW
        | opcodes::ANEWARRAY
        | opcodes::CHECKCAST
        | opcodes::INSTANCEOF => {
            let index = r.u16()?;
            vec![constant(index)]
        }
        opcodes::INVOKEINTERFACE => {
            let index = r.u16()?;
            let count = r.u8()?;
            // Always zero.
            r.u8()?;
            vec![constant(index), Operand::Count(count)]
        }
        opcodes::INVOKEDYNAMIC => {
            let index = r.u16()?;
            // Always zero.
            r.u16()?;
            vec![constant(index)]
        }
        opcodes::MULTIANEWARRAY => {
            let index = r.u16()?;
            let dimensions = r.u8()?;
            vec![constant(index), Operand::Dimensions(dimensions)]
        }
        opcodes::NEWARRAY => vec![Operand::ArrayType(r.u8()?)],
        _ => vec![],
    };

    Ok(Instruction {
        pc,
        opcode: opcode as u16,
        mnemonic: Some(info.mnemonic),
        operands,
        length,
    })
}

fn unknown(pc: usize, opcode: u8) -> Instruction {
    Instruction {
        pc,
        opcode: opcode as u16,
        mnemonic: None,
        operands: vec![],
        length: 1,
    }
}

/// Reads operands of the instruction starting at `pc`, turning any read past
/// the end of the code array into [`ClassFileError::TruncatedInstruction`].
struct CodeReader<'a> {
    r: ByteCursor<'a>,
    pc: usize,
}
impl<'a> CodeReader<'a> {
    fn new(code: &'a [u8], pc: usize) -> Self {
        let mut r = ByteCursor::new(code);
        r.seek(pc);
        Self { r, pc }
    }

    fn truncated(&self) -> ClassFileError {
        ClassFileError::TruncatedInstruction { pc: self.pc }
    }

    fn u8(&mut self) -> Result<u8> {
        self.r.read_u8().map_err(|_| self.truncated())
    }

    fn i8(&mut self) -> Result<i8> {
        self.r.read_i8().map_err(|_| self.truncated())
    }

    fn u16(&mut self) -> Result<u16> {
        self.r.read_u16().map_err(|_| self.truncated())
    }

    fn i16(&mut self) -> Result<i16> {
        self.r.read_i16().map_err(|_| self.truncated())
    }

    fn i32(&mut self) -> Result<i32> {
        self.r.read_i32().map_err(|_| self.truncated())
    }

    fn branch(&self, offset: i32) -> Operand {
        Operand::Branch {
            offset,
            target: self.target(offset),
        }
    }

    fn target(&self, offset: i32) -> i64 {
        self.pc as i64 + offset as i64
    }

    /// Skips the padding that aligns switch operands to a multiple of four
    /// bytes from the start of the code array.
    fn align(&mut self) -> Result<usize> {
        let table_start = (self.pc + 4) & !3;
        if table_start > self.r.position() + self.r.remaining() {
            return Err(self.truncated());
        }
        self.r.seek(table_start);
        Ok(table_start)
    }

    /// Fails before allocating when the table cannot fit in the code array.
    fn ensure_table(&self, bytes: i64) -> Result<()> {
        if bytes > self.r.remaining() as i64 {
            return Err(self.truncated());
        }
        Ok(())
    }

    fn table_switch(&mut self) -> Result<Instruction> {
        let table_start = self.align()?;
        let default = self.i32()?;
        let low = self.i32()?;
        let high = self.i32()?;
        if high < low {
            return Err(ClassFileError::MalformedSwitch { pc: self.pc });
        }

        let count = high as i64 - low as i64 + 1;
        self.ensure_table(count * 4)?;
        let targets = (0..count)
            .map(|_| self.i32().map(|offset| self.target(offset)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Instruction {
            pc: self.pc,
            opcode: opcodes::TABLESWITCH as u16,
            mnemonic: Some("tableswitch"),
            operands: vec![Operand::TableSwitch {
                default: self.target(default),
                low,
                high,
                targets,
            }],
            length: table_start - self.pc + 12 + 4 * count as usize,
        })
    }

    fn lookup_switch(&mut self) -> Result<Instruction> {
        let table_start = self.align()?;
        let default = self.i32()?;
        let npairs = self.i32()?;
        if npairs < 0 {
            return Err(ClassFileError::MalformedSwitch { pc: self.pc });
        }

        self.ensure_table(npairs as i64 * 8)?;
        let pairs = (0..npairs)
            .map(|_| -> Result<_> {
                let value = self.i32()?;
                let offset = self.i32()?;
                Ok((value, self.target(offset)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Instruction {
            pc: self.pc,
            opcode: opcodes::LOOKUPSWITCH as u16,
            mnemonic: Some("lookupswitch"),
            operands: vec![Operand::LookupSwitch {
                default: self.target(default),
                pairs,
            }],
            length: table_start - self.pc + 8 + 8 * npairs as usize,
        })
    }

    fn wide(&mut self) -> Result<Instruction> {
        let opcode = self.u8()?;
        let mnemonic = match opcodes::wide_opcode_name(opcode) {
            Some(mnemonic) => mnemonic,
            None => return Ok(unknown(self.pc, opcodes::WIDE)),
        };

        let local = Operand::Local(self.u16()?);
        let (operands, length) = if opcode == opcodes::IINC {
            (vec![local, Operand::Increment(self.i16()?)], 6)
        } else {
            (vec![local], 4)
        };

        Ok(Instruction {
            pc: self.pc,
            opcode: opcodes::wide(opcode),
            mnemonic: Some(mnemonic),
            operands,
            length,
        })
    }
}

/// Iterates over the instructions of a code array, stopping after the first
/// error.
pub struct Instructions<'a> {
    code: &'a [u8],
    pool: &'a ConstantPool,
    this_class: u16,
    pc: usize,
    failed: bool,
}
impl<'a> Instructions<'a> {
    pub fn new(code: &'a [u8], pool: &'a ConstantPool, this_class: u16) -> Self {
        Self {
            code,
            pool,
            this_class,
            pc: 0,
            failed: false,
        }
    }
}
impl Iterator for Instructions<'_> {
    type Item = Result<Instruction>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pc >= self.code.len() {
            return None;
        }

        let result = decode_one(self.code, self.pc, self.pool, self.this_class);
        match &result {
            Ok(instruction) => self.pc = instruction.next_pc(),
            Err(_) => self.failed = true,
        }
        Some(result)
    }
}

#[cfg(test)]
mod decode_one_tests {
    use super::*;
    use crate::constant_pool::{ClassInfo, CpInfo, NameAndTypeInfo, RefInfo};

    fn empty_pool() -> ConstantPool {
        ConstantPool::default()
    }

    fn decode(code: &[u8], pc: usize) -> Result<Instruction> {
        decode_one(code, pc, &empty_pool(), 0)
    }

    #[test]
    fn it_should_decode_a_single_return() {
        let instruction = decode(&[0xb1], 0).unwrap();
        assert_eq!(instruction.pc, 0);
        assert_eq!(instruction.mnemonic, Some("return"));
        assert_eq!(instruction.length, 1);
        assert!(instruction.operands.is_empty());
    }

    #[test]
    fn it_should_decode_a_table_switch() {
        let code = [
            0x00, 0xaa, 0x00, 0x00, // nop, tableswitch, padding
            0x00, 0x00, 0x00, 0x05, // default
            0x00, 0x00, 0x00, 0x02, // low
            0x00, 0x00, 0x00, 0x04, // high
            0x00, 0x00, 0x00, 0x10, //
            0x00, 0x00, 0x00, 0x20, //
            0x00, 0x00, 0x00, 0x30, //
        ];
        let instruction = decode(&code, 1).unwrap();

        assert_eq!(instruction.mnemonic, Some("tableswitch"));
        assert_eq!(instruction.length, 4 - 1 + 16 + 4 * 2);
        assert_eq!(instruction.next_pc(), code.len());
        match &instruction.operands[..] {
            [Operand::TableSwitch {
                default,
                low,
                high,
                targets,
            }] => {
                assert_eq!(*default, 6);
                assert_eq!((*low, *high), (2, 4));
                assert_eq!(targets, &vec![17, 33, 49]);
            }
            other => panic!("unexpected operands: {:?}", other),
        }
    }

    #[test]
    fn it_should_align_switch_tables_to_four_bytes() {
        for pc in 0..8usize {
            let mut code = vec![0u8; pc];
            code.push(0xab); // lookupswitch
            code.extend(std::iter::repeat(0).take(3 - pc % 4));
            let default_address = code.len();
            assert_eq!(default_address % 4, 0);
            code.extend([0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 7, 0, 0, 0, 9]);

            let instruction = decode(&code, pc).unwrap();
            assert_eq!(instruction.next_pc(), code.len());
            match &instruction.operands[..] {
                [Operand::LookupSwitch { default, pairs }] => {
                    assert_eq!(*default, pc as i64 + 1);
                    assert_eq!(pairs, &vec![(7, pc as i64 + 9)]);
                }
                other => panic!("unexpected operands: {:?}", other),
            }
        }
    }

    #[test]
    fn it_should_reject_a_switch_with_inverted_bounds() {
        let code = [0xaa, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 5, 0, 0, 0, 4];
        assert!(matches!(
            decode(&code, 0),
            Err(ClassFileError::MalformedSwitch { pc: 0 })
        ));
    }

    #[test]
    fn it_should_not_allocate_for_a_table_that_cannot_fit() {
        let code = [0xaa, 0, 0, 0, 0, 0, 0, 0, 0x80, 0, 0, 0, 0x7f, 0xff, 0xff, 0xff];
        assert!(matches!(
            decode(&code, 0),
            Err(ClassFileError::TruncatedInstruction { pc: 0 })
        ));
    }

    #[test]
    fn it_should_decode_wide_instructions() {
        let iinc = decode(&[0xc4, 0x84, 0x01, 0x00, 0xff, 0xfe], 0).unwrap();
        assert_eq!(iinc.mnemonic, Some("iinc_w"));
        assert_eq!(iinc.opcode, 0xc484);
        assert_eq!(iinc.length, 6);
        assert!(matches!(
            iinc.operands[..],
            [Operand::Local(256), Operand::Increment(-2)]
        ));

        let aload = decode(&[0xc4, 0x19, 0x01, 0x02], 0).unwrap();
        assert_eq!(aload.mnemonic, Some("aload_w"));
        assert_eq!(aload.length, 4);
        assert!(matches!(aload.operands[..], [Operand::Local(0x0102)]));
    }

    #[test]
    fn it_should_decode_branch_targets() {
        let code = [0x00, 0x00, 0x00, 0xa7, 0xff, 0xfd, 0xc8, 0, 0, 0, 10];
        let goto = decode(&code, 3).unwrap();
        assert!(matches!(
            goto.operands[..],
            [Operand::Branch {
                offset: -3,
                target: 0
            }]
        ));
        let goto_w = decode(&code, 6).unwrap();
        assert_eq!(goto_w.length, 5);
        assert!(matches!(
            goto_w.operands[..],
            [Operand::Branch { target: 16, .. }]
        ));
    }

    #[test]
    fn it_should_render_unknown_opcodes_as_single_bytes() {
        let instruction = decode(&[0xcb, 0xb1], 0).unwrap();
        assert_eq!(instruction.mnemonic, None);
        assert_eq!(instruction.length, 1);
        assert_eq!(instruction.name(), "bytecode 203");

        let wide = decode(&[0xc4, 0x00], 0).unwrap();
        assert_eq!(wide.length, 1);
        assert_eq!(wide.name(), "bytecode 196");
    }

    #[test]
    fn it_should_fail_on_truncated_instructions() {
        for code in [&[0x11, 0x00][..], &[0xb6, 0x00], &[0xc4, 0x84, 0, 1], &[0xaa, 0, 0]] {
            assert!(matches!(
                decode(code, 0),
                Err(ClassFileError::TruncatedInstruction { pc: 0 })
            ));
        }
    }

    #[test]
    fn it_should_decode_immediates_and_array_types() {
        assert!(matches!(
            decode(&[0x10, 0xff], 0).unwrap().operands[..],
            [Operand::Immediate(-1)]
        ));
        assert!(matches!(
            decode(&[0x11, 0x01, 0x00], 0).unwrap().operands[..],
            [Operand::Immediate(256)]
        ));
        assert!(matches!(
            decode(&[0xbc, 0x0a], 0).unwrap().operands[..],
            [Operand::ArrayType(10)]
        ));
    }

    fn pool() -> ConstantPool {
        ConstantPool::new(vec![
            CpInfo::Utf8("Main".to_owned()),
            CpInfo::Class(ClassInfo { name_index: 1 }),
            CpInfo::Utf8("run".to_owned()),
            CpInfo::Utf8("()V".to_owned()),
            CpInfo::NameAndType(NameAndTypeInfo {
                name_index: 3,
                descriptor_index: 4,
            }),
            CpInfo::InterfaceMethodRef(RefInfo {
                class_index: 2,
                name_and_type_index: 5,
            }),
        ])
    }

    #[test]
    fn it_should_resolve_constant_operands() {
        let code = [0xb9, 0x00, 0x06, 0x01, 0x00];
        let instruction = decode_one(&code, 0, &pool(), 0).unwrap();
        assert_eq!(instruction.length, 5);
        match &instruction.operands[..] {
            [Operand::Constant {
                index: 6,
                annotation: Ok(annotation),
            }, Operand::Count(1)] => {
                assert_eq!(annotation, "InterfaceMethod Main.run:()V");
            }
            other => panic!("unexpected operands: {:?}", other),
        }

        let instruction = decode_one(&code, 0, &pool(), 2).unwrap();
        assert!(matches!(
            &instruction.operands[0],
            Operand::Constant { annotation: Ok(a), .. } if a == "InterfaceMethod run:()V"
        ));
    }

    #[test]
    fn it_should_keep_bad_constant_indices_as_errors() {
        let instruction = decode(&[0xbb, 0x00, 0x09], 0).unwrap();
        assert!(matches!(
            &instruction.operands[..],
            [Operand::Constant {
                index: 9,
                annotation: Err(ClassFileError::IndexOutOfRange(9)),
            }]
        ));
    }

    #[test]
    fn it_should_cover_the_whole_code_array() {
        // iconst_0, istore_1, iload_1, bipush, if_icmpge, iinc, goto, wide iload, lookupswitch, return
        let code = [
            0x03, 0x3c, 0x1b, 0x10, 0x0a, 0xa2, 0x00, 0x09, 0x84, 0x01, 0x01, 0xa7, 0xff, 0xf7,
            0xc4, 0x15, 0x00, 0x01, 0xab, 0x00, 0x00, 0x00, 0x00, 0x1a, 0x00, 0x00, 0x00, 0x00,
            0xb1,
        ];
        let instructions = Instructions::new(&code, &empty_pool(), 0)
            .collect::<Result<Vec<_>>>()
            .unwrap();

        assert_eq!(instructions.iter().map(|i| i.length).sum::<usize>(), code.len());
        for pair in instructions.windows(2) {
            assert_eq!(pair[0].next_pc(), pair[1].pc);
        }
        assert_eq!(instructions.last().unwrap().mnemonic, Some("return"));
    }

    #[test]
    fn it_should_stop_iterating_after_an_error() {
        let pool = empty_pool();
        let mut instructions = Instructions::new(&[0x00, 0x11, 0x00], &pool, 0);
        assert!(instructions.next().unwrap().is_ok());
        assert!(instructions.next().unwrap().is_err());
        assert!(instructions.next().is_none());
    }
}
