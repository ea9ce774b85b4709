//! Instruction encoding tables, named bit fields and the reference encoder.
//!
//! Every recognised word matches exactly one entry of
//! [`INSTRUCTION_PATTERN_TABLE`]; everything not in the table is unrecognised.

#![allow(missing_docs)]

use crate::state::{ConditionMask, OperandBank, Register};

/// The canonical no-op word, `MOV R0,R0`.
pub const NOP_WORD: u16 = 0x4C00;

/// Operation kinds, one per instruction mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Opcode {
    Ldr,
    Str,
    Bl,
    Beq,
    Bne,
    Bc,
    Bnc,
    Bn,
    Bge,
    Blt,
    Bra,
    Add,
    Addc,
    Sub,
    Subc,
    Dadd,
    Cmp,
    Xor,
    And,
    Or,
    Bit,
    Bic,
    Bis,
    Mov,
    Swap,
    Sra,
    Rrc,
    Swpb,
    Sxt,
    Setcc,
    Clrcc,
    Ld,
    St,
    Movl,
    Movlz,
    Movls,
    Movh,
}

/// Operand-field layout shared by a group of opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// 13-bit branch-with-link offset.
    LinkOffset,
    /// 10-bit conditional branch offset.
    BranchOffset,
    /// `R/C`, `W/B`, source, destination.
    TwoOperand,
    /// `W/B`, source register, destination.
    Move,
    /// Source register, destination.
    RegisterPair,
    /// `W/B`, destination.
    Shift,
    /// Destination only.
    Single,
    /// 5-bit condition mask.
    Conditions,
    /// Pre/post, decrement, increment, `W/B`, source, destination.
    Indirect,
    /// 8-bit data byte, destination.
    Immediate,
    /// 7-bit relative offset, `W/B`, source, destination.
    Relative,
}

/// One row of the decode table: `word & mask == value` selects `opcode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstructionPattern {
    pub mask: u16,
    pub value: u16,
    pub opcode: Opcode,
}

const fn pattern(mask: u16, value: u16, opcode: Opcode) -> InstructionPattern {
    InstructionPattern {
        mask,
        value,
        opcode,
    }
}

/// Single source-of-truth decode table, ordered by instruction family.
pub const INSTRUCTION_PATTERN_TABLE: &[InstructionPattern] = &[
    // bits 15..14 take precedence over the 3-bit family
    pattern(0xC000, 0x8000, Opcode::Ldr),
    pattern(0xC000, 0xC000, Opcode::Str),
    // family 000
    pattern(0xE000, 0x0000, Opcode::Bl),
    // family 001, condition in bits 12..10
    pattern(0xFC00, 0x2000, Opcode::Beq),
    pattern(0xFC00, 0x2400, Opcode::Bne),
    pattern(0xFC00, 0x2800, Opcode::Bc),
    pattern(0xFC00, 0x2C00, Opcode::Bnc),
    pattern(0xFC00, 0x3000, Opcode::Bn),
    pattern(0xFC00, 0x3400, Opcode::Bge),
    pattern(0xFC00, 0x3800, Opcode::Blt),
    pattern(0xFC00, 0x3C00, Opcode::Bra),
    // family 010, bits 15..12 = 0100, two-operand ops in bits 11..8
    pattern(0xFF00, 0x4000, Opcode::Add),
    pattern(0xFF00, 0x4100, Opcode::Addc),
    pattern(0xFF00, 0x4200, Opcode::Sub),
    pattern(0xFF00, 0x4300, Opcode::Subc),
    pattern(0xFF00, 0x4400, Opcode::Dadd),
    pattern(0xFF00, 0x4500, Opcode::Cmp),
    pattern(0xFF00, 0x4600, Opcode::Xor),
    pattern(0xFF00, 0x4700, Opcode::And),
    pattern(0xFF00, 0x4800, Opcode::Or),
    pattern(0xFF00, 0x4900, Opcode::Bit),
    pattern(0xFF00, 0x4A00, Opcode::Bic),
    pattern(0xFF00, 0x4B00, Opcode::Bis),
    // sub-opcodes in bits 11..7
    pattern(0xFF80, 0x4C00, Opcode::Mov),
    pattern(0xFFC0, 0x4C80, Opcode::Swap),
    pattern(0xFFB8, 0x4D00, Opcode::Sra),
    pattern(0xFFB8, 0x4D08, Opcode::Rrc),
    pattern(0xFFF8, 0x4D18, Opcode::Swpb),
    pattern(0xFFF8, 0x4D20, Opcode::Sxt),
    pattern(0xFFE0, 0x4DA0, Opcode::Setcc),
    pattern(0xFFE0, 0x4DC0, Opcode::Clrcc),
    // family 010, bits 15..12 = 0101
    pattern(0xFC00, 0x5800, Opcode::Ld),
    pattern(0xFC00, 0x5C00, Opcode::St),
    // family 011, bits 12..11
    pattern(0xF800, 0x6000, Opcode::Movl),
    pattern(0xF800, 0x6800, Opcode::Movlz),
    pattern(0xF800, 0x7000, Opcode::Movls),
    pattern(0xF800, 0x7800, Opcode::Movh),
];

impl Opcode {
    /// Every operation kind, in decode-table order.
    pub const ALL: [Self; 37] = [
        Self::Ldr,
        Self::Str,
        Self::Bl,
        Self::Beq,
        Self::Bne,
        Self::Bc,
        Self::Bnc,
        Self::Bn,
        Self::Bge,
        Self::Blt,
        Self::Bra,
        Self::Add,
        Self::Addc,
        Self::Sub,
        Self::Subc,
        Self::Dadd,
        Self::Cmp,
        Self::Xor,
        Self::And,
        Self::Or,
        Self::Bit,
        Self::Bic,
        Self::Bis,
        Self::Mov,
        Self::Swap,
        Self::Sra,
        Self::Rrc,
        Self::Swpb,
        Self::Sxt,
        Self::Setcc,
        Self::Clrcc,
        Self::Ld,
        Self::St,
        Self::Movl,
        Self::Movlz,
        Self::Movls,
        Self::Movh,
    ];

    /// Operand layout for this opcode.
    #[must_use]
    pub const fn layout(self) -> Layout {
        match self {
            Self::Bl => Layout::LinkOffset,
            Self::Beq
            | Self::Bne
            | Self::Bc
            | Self::Bnc
            | Self::Bn
            | Self::Bge
            | Self::Blt
            | Self::Bra => Layout::BranchOffset,
            Self::Add
            | Self::Addc
            | Self::Sub
            | Self::Subc
            | Self::Dadd
            | Self::Cmp
            | Self::Xor
            | Self::And
            | Self::Or
            | Self::Bit
            | Self::Bic
            | Self::Bis => Layout::TwoOperand,
            Self::Mov => Layout::Move,
            Self::Swap => Layout::RegisterPair,
            Self::Sra | Self::Rrc => Layout::Shift,
            Self::Swpb | Self::Sxt => Layout::Single,
            Self::Setcc | Self::Clrcc => Layout::Conditions,
            Self::Ld | Self::St => Layout::Indirect,
            Self::Movl | Self::Movlz | Self::Movls | Self::Movh => Layout::Immediate,
            Self::Ldr | Self::Str => Layout::Relative,
        }
    }

    /// Returns `true` for loads and stores, whose bus transfer runs one tick
    /// after address computation.
    #[must_use]
    pub const fn is_two_phase(self) -> bool {
        matches!(self, Self::Ld | Self::St | Self::Ldr | Self::Str)
    }

    /// Returns `true` for branch and call instructions.
    #[must_use]
    pub const fn is_branch(self) -> bool {
        matches!(
            self.layout(),
            Layout::LinkOffset | Layout::BranchOffset
        )
    }

    /// Assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Bl => "BL",
            Self::Beq => "BEQ",
            Self::Bne => "BNE",
            Self::Bc => "BC",
            Self::Bnc => "BNC",
            Self::Bn => "BN",
            Self::Bge => "BGE",
            Self::Blt => "BLT",
            Self::Bra => "BRA",
            Self::Add => "ADD",
            Self::Addc => "ADDC",
            Self::Sub => "SUB",
            Self::Subc => "SUBC",
            Self::Dadd => "DADD",
            Self::Cmp => "CMP",
            Self::Xor => "XOR",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Bit => "BIT",
            Self::Bic => "BIC",
            Self::Bis => "BIS",
            Self::Mov => "MOV",
            Self::Swap => "SWAP",
            Self::Sra => "SRA",
            Self::Rrc => "RRC",
            Self::Swpb => "SWPB",
            Self::Sxt => "SXT",
            Self::Setcc => "SETCC",
            Self::Clrcc => "CLRCC",
            Self::Ld => "LD",
            Self::St => "ST",
            Self::Movl => "MOVL",
            Self::Movlz => "MOVLZ",
            Self::Movls => "MOVLS",
            Self::Movh => "MOVH",
            Self::Ldr => "LDR",
            Self::Str => "STR",
        }
    }

    /// Decode-table row for this opcode.
    #[must_use]
    pub const fn pattern(self) -> InstructionPattern {
        INSTRUCTION_PATTERN_TABLE[self as usize]
    }
}

/// Returns the opcode a word encodes, or `None` for an unrecognised word.
#[must_use]
pub fn classify(word: u16) -> Option<Opcode> {
    INSTRUCTION_PATTERN_TABLE
        .iter()
        .find_map(|entry| (word & entry.mask == entry.value).then_some(entry.opcode))
}

/// Operand width selected by the `W/B` bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Width {
    #[default]
    Word,
    Byte,
}

impl Width {
    /// Decodes the `W/B` bit.
    #[must_use]
    pub const fn from_bit(bit: bool) -> Self {
        if bit {
            Self::Byte
        } else {
            Self::Word
        }
    }

    /// Encodes back to the `W/B` bit.
    #[must_use]
    pub const fn bit(self) -> bool {
        matches!(self, Self::Byte)
    }

    /// Value mask: `0xFFFF` or `0x00FF`.
    #[must_use]
    pub const fn mask(self) -> u16 {
        match self {
            Self::Word => 0xFFFF,
            Self::Byte => 0x00FF,
        }
    }

    /// Most-significant bit position: 15 or 7.
    #[must_use]
    pub const fn msb(self) -> u32 {
        match self {
            Self::Word => 15,
            Self::Byte => 7,
        }
    }

    /// Number of 4-bit digits: 4 or 2.
    #[must_use]
    pub const fn nibbles(self) -> u32 {
        match self {
            Self::Word => 4,
            Self::Byte => 2,
        }
    }
}

/// Register-indirect addressing-mode bits of `LD`/`ST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct AddressMode {
    /// Adjust before the transfer (`PRPO = 1`) rather than after.
    pub pre: bool,
    pub decrement: bool,
    pub increment: bool,
}

impl AddressMode {
    /// Register adjustment applied around the transfer.
    ///
    /// Indexed `[dec][inc][byte]`; setting both or neither direction bit
    /// leaves the register unchanged.
    #[must_use]
    pub const fn step(self, width: Width) -> i16 {
        const STEP_TABLE: [[[i16; 2]; 2]; 2] = [[[0, 0], [2, 1]], [[-2, -1], [0, 0]]];
        STEP_TABLE[self.decrement as usize][self.increment as usize][width.bit() as usize]
    }
}

/// Operand fields carried by a decoded instruction.
///
/// Fields not used by an opcode's [`Layout`] stay at their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct OperandFields {
    pub bank: OperandBank,
    pub width: Width,
    pub source: Register,
    pub destination: Register,
    /// Immediate data byte of the `MOVL` family.
    pub data: u8,
    pub mode: AddressMode,
    /// Branch displacement in bytes (the encoded field doubled).
    pub branch_offset: i16,
    /// Signed 7-bit `LDR`/`STR` offset.
    pub relative_offset: i8,
    /// `SETCC`/`CLRCC` flag selection.
    pub conditions: ConditionMask,
}

impl OperandFields {
    /// Extracts the fields `opcode`'s layout defines from `word`.
    #[must_use]
    pub const fn extract(opcode: Opcode, word: u16) -> Self {
        let mut fields = Self {
            bank: OperandBank::Register,
            width: Width::Word,
            source: Register::R0,
            destination: Register::R0,
            data: 0,
            mode: AddressMode {
                pre: false,
                decrement: false,
                increment: false,
            },
            branch_offset: 0,
            relative_offset: 0,
            conditions: ConditionMask::from_bits(0),
        };
        match opcode.layout() {
            Layout::LinkOffset => fields.branch_offset = link_displacement(word),
            Layout::BranchOffset => fields.branch_offset = branch_displacement(word),
            Layout::TwoOperand => {
                fields.bank = OperandBank::from_bit(bit(word, 7));
                fields.width = Width::from_bit(bit(word, 6));
                fields.source = source_field(word);
                fields.destination = destination_field(word);
            }
            Layout::Move => {
                fields.width = Width::from_bit(bit(word, 6));
                fields.source = source_field(word);
                fields.destination = destination_field(word);
            }
            Layout::RegisterPair => {
                fields.source = source_field(word);
                fields.destination = destination_field(word);
            }
            Layout::Shift => {
                fields.width = Width::from_bit(bit(word, 6));
                fields.destination = destination_field(word);
            }
            Layout::Single => fields.destination = destination_field(word),
            Layout::Conditions => fields.conditions = condition_field(word),
            Layout::Indirect => {
                fields.mode = AddressMode {
                    pre: bit(word, 9),
                    decrement: bit(word, 8),
                    increment: bit(word, 7),
                };
                fields.width = Width::from_bit(bit(word, 6));
                fields.source = source_field(word);
                fields.destination = destination_field(word);
            }
            Layout::Immediate => {
                fields.data = data_field(word);
                fields.destination = destination_field(word);
            }
            Layout::Relative => {
                fields.relative_offset = relative_offset(word);
                fields.width = Width::from_bit(bit(word, 6));
                fields.source = source_field(word);
                fields.destination = destination_field(word);
            }
        }
        fields
    }

    /// Copy with every field outside `opcode`'s layout reset and offsets
    /// clamped to their encodable range.
    #[must_use]
    pub fn masked_for(self, opcode: Opcode) -> Self {
        Self::extract(opcode, encode(opcode, &self))
    }
}

/// Reference encoder: places `fields` into `opcode`'s pattern.
///
/// Offsets are truncated to their field width; odd branch displacements
/// lose their low bit.
#[must_use]
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub fn encode(opcode: Opcode, fields: &OperandFields) -> u16 {
    let base = opcode.pattern().value;
    let src = (fields.source.index() as u16) << 3;
    let dst = fields.destination.index() as u16;
    let wb = u16::from(fields.width.bit()) << 6;
    match opcode.layout() {
        Layout::LinkOffset => base | ((fields.branch_offset >> 1) as u16 & 0x1FFF),
        Layout::BranchOffset => base | ((fields.branch_offset >> 1) as u16 & 0x03FF),
        Layout::TwoOperand => base | (u16::from(fields.bank.bit()) << 7) | wb | src | dst,
        Layout::Move => base | wb | src | dst,
        Layout::RegisterPair => base | src | dst,
        Layout::Shift => base | wb | dst,
        Layout::Single => base | dst,
        Layout::Conditions => base | u16::from(fields.conditions.bits()),
        Layout::Indirect => {
            base | (u16::from(fields.mode.pre) << 9)
                | (u16::from(fields.mode.decrement) << 8)
                | (u16::from(fields.mode.increment) << 7)
                | wb
                | src
                | dst
        }
        Layout::Immediate => base | (u16::from(fields.data) << 3) | dst,
        Layout::Relative => base | ((fields.relative_offset as u16 & 0x7F) << 7) | wb | src | dst,
    }
}

/// Single bit `n` of `word`.
#[must_use]
pub const fn bit(word: u16, n: u32) -> bool {
    (word >> n) & 1 != 0
}

/// Destination register, bits 2..0.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn destination_field(word: u16) -> Register {
    Register::from_u3((word & 0x7) as u8)
}

/// Source register or constant index, bits 5..3.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn source_field(word: u16) -> Register {
    Register::from_u3(((word >> 3) & 0x7) as u8)
}

/// Immediate data byte, bits 10..3.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn data_field(word: u16) -> u8 {
    ((word >> 3) & 0xFF) as u8
}

/// `SETCC`/`CLRCC` mask, bits 4..0.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn condition_field(word: u16) -> ConditionMask {
    ConditionMask::from_bits((word & 0x1F) as u8)
}

/// Sign-extends the low `bits` bits of `field`.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub const fn sign_extend(field: u16, bits: u32) -> i16 {
    let shift = 16 - bits;
    ((field << shift) as i16) >> shift
}

/// `BL` displacement: 13-bit field (sign bit 12) doubled.
#[must_use]
pub const fn link_displacement(word: u16) -> i16 {
    sign_extend(word & 0x1FFF, 13) << 1
}

/// Conditional-branch displacement: 10-bit field (sign bit 9) doubled.
#[must_use]
pub const fn branch_displacement(word: u16) -> i16 {
    sign_extend(word & 0x03FF, 10) << 1
}

/// `LDR`/`STR` offset: 7-bit field in bits 13..7 (sign bit 6).
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn relative_offset(word: u16) -> i8 {
    sign_extend((word >> 7) & 0x7F, 7) as i8
}
