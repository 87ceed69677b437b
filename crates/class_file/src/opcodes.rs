//! Static opcode tables: mnemonic and total instruction length per opcode.
//!
//! https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-6.html

use self::InstructionLength::{Computed, Fixed};

pub const BIPUSH: u8 = 16;
pub const SIPUSH: u8 = 17;
pub const LDC: u8 = 18;
pub const LDC_W: u8 = 19;
pub const LDC2_W: u8 = 20;
pub const ILOAD: u8 = 21;
pub const ALOAD: u8 = 25;
pub const ISTORE: u8 = 54;
pub const ASTORE: u8 = 58;
pub const IINC: u8 = 132;
pub const IFEQ: u8 = 153;
pub const JSR: u8 = 168;
pub const RET: u8 = 169;
pub const TABLESWITCH: u8 = 170;
pub const LOOKUPSWITCH: u8 = 171;
pub const GETSTATIC: u8 = 178;
pub const INVOKESTATIC: u8 = 184;
pub const INVOKEINTERFACE: u8 = 185;
pub const INVOKEDYNAMIC: u8 = 186;
pub const NEW: u8 = 187;
pub const NEWARRAY: u8 = 188;
pub const ANEWARRAY: u8 = 189;
pub const CHECKCAST: u8 = 192;
pub const INSTANCEOF: u8 = 193;
pub const WIDE: u8 = 196;
pub const MULTIANEWARRAY: u8 = 197;
pub const IFNULL: u8 = 198;
pub const IFNONNULL: u8 = 199;
pub const GOTO_W: u8 = 200;
pub const JSR_W: u8 = 201;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionLength {
    /// Total length in bytes, opcode included.
    Fixed(u8),
    /// Depends on the operands: `tableswitch`, `lookupswitch` and `wide`.
    Computed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub mnemonic: &'static str,
    pub length: InstructionLength,
}

const OPCODES: &[(u8, &str, InstructionLength)] = &[
    (0, "nop", Fixed(1)),
    (1, "aconst_null", Fixed(1)),
    (2, "iconst_m1", Fixed(1)),
    (3, "iconst_0", Fixed(1)),
    (4, "iconst_1", Fixed(1)),
    (5, "iconst_2", Fixed(1)),
    (6, "iconst_3", Fixed(1)),
    (7, "iconst_4", Fixed(1)),
    (8, "iconst_5", Fixed(1)),
    (9, "lconst_0", Fixed(1)),
    (10, "lconst_1", Fixed(1)),
    (11, "fconst_0", Fixed(1)),
    (12, "fconst_1", Fixed(1)),
    (13, "fconst_2", Fixed(1)),
    (14, "dconst_0", Fixed(1)),
    (15, "dconst_1", Fixed(1)),
    (16, "bipush", Fixed(2)),
    (17, "sipush", Fixed(3)),
    (18, "ldc", Fixed(2)),
    (19, "ldc_w", Fixed(3)),
    (20, "ldc2_w", Fixed(3)),
    (21, "iload", Fixed(2)),
    (22, "lload", Fixed(2)),
    (23, "fload", Fixed(2)),
    (24, "dload", Fixed(2)),
    (25, "aload", Fixed(2)),
    (26, "iload_0", Fixed(1)),
    (27, "iload_1", Fixed(1)),
    (28, "iload_2", Fixed(1)),
    (29, "iload_3", Fixed(1)),
    (30, "lload_0", Fixed(1)),
    (31, "lload_1", Fixed(1)),
    (32, "lload_2", Fixed(1)),
    (33, "lload_3", Fixed(1)),
    (34, "fload_0", Fixed(1)),
    (35, "fload_1", Fixed(1)),
    (36, "fload_2", Fixed(1)),
    (37, "fload_3", Fixed(1)),
    (38, "dload_0", Fixed(1)),
    (39, "dload_1", Fixed(1)),
    (40, "dload_2", Fixed(1)),
    (41, "dload_3", Fixed(1)),
    (42, "aload_0", Fixed(1)),
    (43, "aload_1", Fixed(1)),
    (44, "aload_2", Fixed(1)),
    (45, "aload_3", Fixed(1)),
    (46, "iaload", Fixed(1)),
    (47, "laload", Fixed(1)),
    (48, "faload", Fixed(1)),
    (49, "daload", Fixed(1)),
    (50, "aaload", Fixed(1)),
    (51, "baload", Fixed(1)),
    (52, "caload", Fixed(1)),
    (53, "saload", Fixed(1)),
    (54, "istore", Fixed(2)),
    (55, "lstore", Fixed(2)),
    (56, "fstore", Fixed(2)),
    (57, "dstore", Fixed(2)),
    (58, "astore", Fixed(2)),
    (59, "istore_0", Fixed(1)),
    (60, "istore_1", Fixed(1)),
    (61, "istore_2", Fixed(1)),
    (62, "istore_3", Fixed(1)),
    (63, "lstore_0", Fixed(1)),
    (64, "lstore_1", Fixed(1)),
    (65, "lstore_2", Fixed(1)),
    (66, "lstore_3", Fixed(1)),
    (67, "fstore_0", Fixed(1)),
    (68, "fstore_1", Fixed(1)),
    (69, "fstore_2", Fixed(1)),
    (70, "fstore_3", Fixed(1)),
    (71, "dstore_0", Fixed(1)),
    (72, "dstore_1", Fixed(1)),
    (73, "dstore_2", Fixed(1)),
    (74, "dstore_3", Fixed(1)),
    (75, "astore_0", Fixed(1)),
    (76, "astore_1", Fixed(1)),
    (77, "astore_2", Fixed(1)),
    (78, "astore_3", Fixed(1)),
    (79, "iastore", Fixed(1)),
    (80, "lastore", Fixed(1)),
    (81, "fastore", Fixed(1)),
    (82, "dastore", Fixed(1)),
    (83, "aastore", Fixed(1)),
    (84, "bastore", Fixed(1)),
    (85, "castore", Fixed(1)),
    (86, "sastore", Fixed(1)),
    (87, "pop", Fixed(1)),
    (88, "pop2", Fixed(1)),
    (89, "dup", Fixed(1)),
    (90, "dup_x1", Fixed(1)),
    (91, "dup_x2", Fixed(1)),
    (92, "dup2", Fixed(1)),
    (93, "dup2_x1", Fixed(1)),
    (94, "dup2_x2", Fixed(1)),
    (95, "swap", Fixed(1)),
    (96, "iadd", Fixed(1)),
    (97, "ladd", Fixed(1)),
    (98, "fadd", Fixed(1)),
    (99, "dadd", Fixed(1)),
    (100, "isub", Fixed(1)),
    (101, "lsub", Fixed(1)),
    (102, "fsub", Fixed(1)),
    (103, "dsub", Fixed(1)),
    (104, "imul", Fixed(1)),
    (105, "lmul", Fixed(1)),
    (106, "fmul", Fixed(1)),
    (107, "dmul", Fixed(1)),
    (108, "idiv", Fixed(1)),
    (109, "ldiv", Fixed(1)),
    (110, "fdiv", Fixed(1)),
    (111, "ddiv", Fixed(1)),
    (112, "irem", Fixed(1)),
    (113, "lrem", Fixed(1)),
    (114, "frem", Fixed(1)),
    (115, "drem", Fixed(1)),
    (116, "ineg", Fixed(1)),
    (117, "lneg", Fixed(1)),
    (118, "fneg", Fixed(1)),
    (119, "dneg", Fixed(1)),
    (120, "ishl", Fixed(1)),
    (121, "lshl", Fixed(1)),
    (122, "ishr", Fixed(1)),
    (123, "lshr", Fixed(1)),
    (124, "iushr", Fixed(1)),
    (125, "lushr", Fixed(1)),
    (126, "iand", Fixed(1)),
    (127, "land", Fixed(1)),
    (128, "ior", Fixed(1)),
    (129, "lor", Fixed(1)),
    (130, "ixor", Fixed(1)),
    (131, "lxor", Fixed(1)),
    (132, "iinc", Fixed(3)),
    (133, "i2l", Fixed(1)),
    (134, "i2f", Fixed(1)),
    (135, "i2d", Fixed(1)),
    (136, "l2i", Fixed(1)),
    (137, "l2f", Fixed(1)),
    (138, "l2d", Fixed(1)),
    (139, "f2i", Fixed(1)),
    (140, "f2l", Fixed(1)),
    (141, "f2d", Fixed(1)),
    (142, "d2i", Fixed(1)),
    (143, "d2l", Fixed(1)),
    (144, "d2f", Fixed(1)),
    (145, "i2b", Fixed(1)),
    (146, "i2c", Fixed(1)),
    (147, "i2s", Fixed(1)),
    (148, "lcmp", Fixed(1)),
    (149, "fcmpl", Fixed(1)),
    (150, "fcmpg", Fixed(1)),
    (151, "dcmpl", Fixed(1)),
    (152, "dcmpg", Fixed(1)),
    (153, "ifeq", Fixed(3)),
    (154, "ifne", Fixed(3)),
    (155, "iflt", Fixed(3)),
    (156, "ifge", Fixed(3)),
    (157, "ifgt", Fixed(3)),
    (158, "ifle", Fixed(3)),
    (159, "if_icmpeq", Fixed(3)),
    (160, "if_icmpne", Fixed(3)),
    (161, "if_icmplt", Fixed(3)),
    (162, "if_icmpge", Fixed(3)),
    (163, "if_icmpgt", Fixed(3)),
    (164, "if_icmple", Fixed(3)),
    (165, "if_acmpeq", Fixed(3)),
    (166, "if_acmpne", Fixed(3)),
    (167, "goto", Fixed(3)),
    (168, "jsr", Fixed(3)),
    (169, "ret", Fixed(2)),
    (170, "tableswitch", Computed),
    (171, "lookupswitch", Computed),
    (172, "ireturn", Fixed(1)),
    (173, "lreturn", Fixed(1)),
    (174, "freturn", Fixed(1)),
    (175, "dreturn", Fixed(1)),
    (176, "areturn", Fixed(1)),
    (177, "return", Fixed(1)),
    (178, "getstatic", Fixed(3)),
    (179, "putstatic", Fixed(3)),
    (180, "getfield", Fixed(3)),
    (181, "putfield", Fixed(3)),
    (182, "invokevirtual", Fixed(3)),
    (183, "invokespecial", Fixed(3)),
    (184, "invokestatic", Fixed(3)),
    (185, "invokeinterface", Fixed(5)),
    (186, "invokedynamic", Fixed(5)),
    (187, "new", Fixed(3)),
    (188, "newarray", Fixed(2)),
    (189, "anewarray", Fixed(3)),
    (190, "arraylength", Fixed(1)),
    (191, "athrow", Fixed(1)),
    (192, "checkcast", Fixed(3)),
    (193, "instanceof", Fixed(3)),
    (194, "monitorenter", Fixed(1)),
    (195, "monitorexit", Fixed(1)),
    (196, "wide", Computed),
    (197, "multianewarray", Fixed(4)),
    (198, "ifnull", Fixed(3)),
    (199, "ifnonnull", Fixed(3)),
    (200, "goto_w", Fixed(5)),
    (201, "jsr_w", Fixed(5)),
    (202, "breakpoint", Fixed(1)),
    (254, "impdep1", Fixed(1)),
    (255, "impdep2", Fixed(1)),
];

/// Opcodes that may follow `wide`, with the mnemonic of the widened form.
const WIDE_OPCODES: &[(u8, &str)] = &[
    (21, "iload_w"),
    (22, "lload_w"),
    (23, "fload_w"),
    (24, "dload_w"),
    (25, "aload_w"),
    (54, "istore_w"),
    (55, "lstore_w"),
    (56, "fstore_w"),
    (57, "dstore_w"),
    (58, "astore_w"),
    (132, "iinc_w"),
    (169, "ret_w"),
];

static TABLE: [Option<OpcodeInfo>; 256] = build_table();

const fn build_table() -> [Option<OpcodeInfo>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < OPCODES.len() {
        let (opcode, mnemonic, length) = OPCODES[i];
        table[opcode as usize] = Some(OpcodeInfo { mnemonic, length });
        i += 1;
    }
    table
}

pub fn opcode_info(opcode: u8) -> Option<OpcodeInfo> {
    TABLE[opcode as usize]
}

/// Combined code of a `wide`-prefixed instruction: `(0xC4 << 8) | opcode`.
pub const fn wide(opcode: u8) -> u16 {
    (WIDE as u16) << 8 | opcode as u16
}

/// Mnemonic for a single-byte opcode or a combined `wide` code.
pub fn opcode_name(opcode: u16) -> Option<&'static str> {
    match opcode.to_be_bytes() {
        [0, opcode] => opcode_info(opcode).map(|info| info.mnemonic),
        [WIDE, opcode] => wide_opcode_name(opcode),
        _ => None,
    }
}

pub fn wide_opcode_name(opcode: u8) -> Option<&'static str> {
    WIDE_OPCODES
        .iter()
        .find(|(o, _)| *o == opcode)
        .map(|(_, name)| *name)
}

/// Reverse lookup, including the `wide` forms.
pub fn opcode_by_name(mnemonic: &str) -> Option<u16> {
    OPCODES
        .iter()
        .find(|(_, name, _)| *name == mnemonic)
        .map(|(opcode, _, _)| *opcode as u16)
        .or_else(|| {
            WIDE_OPCODES
                .iter()
                .find(|(_, name)| *name == mnemonic)
                .map(|(opcode, _)| wide(*opcode))
        })
}

/// Name of a `newarray` element type code.
///
/// Code 2 (`class`) is not a valid `newarray` operand; it is kept so that
/// such input still renders.
pub fn array_type_name(atype: u8) -> Option<&'static str> {
    Some(match atype {
        2 => "class",
        4 => "boolean",
        5 => "char",
        6 => "float",
        7 => "double",
        8 => "byte",
        9 => "short",
        10 => "int",
        11 => "long",
        _ => return None,
    })
}
