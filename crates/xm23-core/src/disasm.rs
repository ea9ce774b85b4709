//! Instruction disassembly.
//!
//! Converts instruction words into assembly text for hosts that display code
//! around the program counter. Every instruction is one word, so a window is
//! a plain stride over the instruction space.

use crate::encoding::{classify, AddressMode, Layout, Opcode, OperandFields, Width};
use crate::memory::MemorySpace;
use crate::state::{ConditionMask, OperandBank, Register, CONSTANT_BANK};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single disassembled instruction row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisassemblyRow {
    /// Address the word was read from.
    pub address: u16,
    /// Raw instruction word.
    pub word: u16,
    /// Mnemonic with any `.B` suffix (e.g. `"ADD.B"`, `"MOVLZ"`).
    pub mnemonic: String,
    /// Formatted operands (e.g. `"#4,R2"`).
    pub operands: String,
    /// Whether the word has no decode-table entry.
    pub is_unrecognized: bool,
}

impl std::fmt::Display for DisassemblyRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.operands.is_empty() {
            f.write_str(&self.mnemonic)
        } else {
            write!(f, "{} {}", self.mnemonic, self.operands)
        }
    }
}

/// Disassembles one word.
///
/// The text reflects the word as encoded: an `ADD` to `PC` still renders as
/// `ADD`, even though decode turns it into a no-op.
#[must_use]
pub fn disassemble_word(address: u16, word: u16) -> DisassemblyRow {
    let Some(opcode) = classify(word) else {
        return DisassemblyRow {
            address,
            word,
            mnemonic: ".word".to_string(),
            operands: format!("{word:#06X} ; UNRECOGNIZED"),
            is_unrecognized: true,
        };
    };
    let fields = OperandFields::extract(opcode, word);
    DisassemblyRow {
        address,
        word,
        mnemonic: format_mnemonic(opcode.mnemonic(), opcode.layout(), fields.width),
        operands: format_operands(opcode, &fields),
        is_unrecognized: false,
    }
}

/// Disassembles the instructions around `center_pc`.
///
/// Returns `before` rows ahead of the center, the center row and `after`
/// rows following it, in address order. Addresses wrap at the ends of the
/// space.
#[must_use]
pub fn disassemble_window(
    memory: &MemorySpace,
    center_pc: u16,
    before: u16,
    after: u16,
) -> Vec<DisassemblyRow> {
    let start = center_pc.wrapping_sub(before.wrapping_mul(2));
    let count = usize::from(before) + 1 + usize::from(after);
    let mut address = start;
    let mut rows = Vec::with_capacity(count);
    for _ in 0..count {
        rows.push(disassemble_word(address, memory.read_word(address)));
        address = address.wrapping_add(2);
    }
    rows
}

fn format_mnemonic(mnemonic: &str, layout: Layout, width: Width) -> String {
    let sized = matches!(
        layout,
        Layout::TwoOperand | Layout::Move | Layout::Shift | Layout::Indirect | Layout::Relative
    );
    if sized && width == Width::Byte {
        format!("{mnemonic}.B")
    } else {
        mnemonic.to_string()
    }
}

fn format_operands(opcode: Opcode, fields: &OperandFields) -> String {
    let src = fields.source.name();
    let dst = fields.destination.name();
    match opcode.layout() {
        Layout::LinkOffset | Layout::BranchOffset => format!("${:+}", fields.branch_offset),
        Layout::TwoOperand => format!("{},{dst}", format_source(fields.bank, fields.source)),
        Layout::Move | Layout::RegisterPair => format!("{src},{dst}"),
        Layout::Shift | Layout::Single => dst.to_string(),
        Layout::Conditions => format_conditions(fields.conditions),
        // LD addresses through the source, ST through the destination.
        Layout::Indirect if opcode == Opcode::St => {
            format!("{src},{}", format_indirect(fields.destination, fields.mode))
        }
        Layout::Indirect => format!("{},{dst}", format_indirect(fields.source, fields.mode)),
        Layout::Immediate => format!("#{:#04X},{dst}", fields.data),
        Layout::Relative => format!("{src},${:+},{dst}", fields.relative_offset),
    }
}

fn format_source(bank: OperandBank, reg: Register) -> String {
    match bank {
        OperandBank::Register => reg.name().to_string(),
        OperandBank::Constant => {
            #[allow(clippy::cast_possible_wrap)]
            let value = CONSTANT_BANK[reg.index()] as i16;
            format!("#{value}")
        }
    }
}

fn format_indirect(reg: Register, mode: AddressMode) -> String {
    let name = reg.name();
    let sign = match (mode.decrement, mode.increment) {
        (true, false) => "-",
        (false, true) => "+",
        _ => "",
    };
    if mode.pre {
        format!("{sign}{name}")
    } else {
        format!("{name}{sign}")
    }
}

fn format_conditions(mask: ConditionMask) -> String {
    [
        (ConditionMask::V, 'V'),
        (ConditionMask::SLP, 'S'),
        (ConditionMask::N, 'N'),
        (ConditionMask::Z, 'Z'),
        (ConditionMask::C, 'C'),
    ]
    .into_iter()
    .filter(|(flag, _)| mask.contains(*flag))
    .map(|(_, letter)| letter)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::{disassemble_window, disassemble_word};
    use crate::memory::{MemorySpace, Space};

    fn text(word: u16) -> String {
        disassemble_word(0, word).to_string()
    }

    #[test]
    fn alu_with_constant_source_and_byte_mode() {
        // ADD.B #4,R2: R/C=1, W/B=1, CON=3, DST=2
        assert_eq!(text(0x40DA), "ADD.B #4,R2");
        assert_eq!(text(0x4053), "ADD.B R2,R3");
        // SUB #-1,R0
        assert_eq!(text(0x42B8), "SUB #-1,R0");
    }

    #[test]
    fn branches_show_byte_displacement() {
        assert_eq!(text(0x0006), "BL $+12");
        assert_eq!(text(0x3FFF), "BRA $-2");
        assert_eq!(text(0x23FE), "BEQ $-4");
    }

    #[test]
    fn memory_forms() {
        assert_eq!(text(0x5808), "LD R1,R0");
        assert_eq!(text(0x5B08), "LD -R1,R0");
        assert_eq!(text(0x58C8), "LD.B R1+,R0");
        assert_eq!(text(0x5C8A), "ST R1,R2+");
        // LDR R1,$-4,R0
        assert_eq!(text(0xBE08), "LDR R1,$-4,R0");
        assert_eq!(text(0xC30B), "STR R1,$+6,R3");
    }

    #[test]
    fn immediates_and_conditions() {
        assert_eq!(text(0x6AD2), "MOVLZ #0x5A,R2");
        assert_eq!(text(0x4DB6), "SETCC VNZ");
        assert_eq!(text(0x4DC8), "CLRCC S");
        assert_eq!(text(0x4C00), "MOV R0,R0");
        assert_eq!(text(0x4D1F), "SWPB PC");
    }

    #[test]
    fn unrecognized_words_render_as_data() {
        let row = disassemble_word(0x0010, 0x4E00);
        assert!(row.is_unrecognized);
        assert_eq!(row.to_string(), ".word 0x4E00 ; UNRECOGNIZED");
    }

    #[test]
    fn window_surrounds_the_center() {
        let mut memory = MemorySpace::new(Space::Instruction);
        memory.write_word(0x0100, 0x6808);
        memory.write_word(0x0102, 0x6811);
        memory.write_word(0x0104, 0x3FFF);
        let rows = disassemble_window(&memory, 0x0102, 1, 1);
        let addresses: Vec<u16> = rows.iter().map(|r| r.address).collect();
        assert_eq!(addresses, vec![0x0100, 0x0102, 0x0104]);
        assert_eq!(rows[0].mnemonic, "MOVLZ");
        assert_eq!(rows[2].to_string(), "BRA $-2");
    }

    #[test]
    fn window_wraps_at_the_bottom_of_the_space() {
        let memory = MemorySpace::new(Space::Instruction);
        let rows = disassemble_window(&memory, 0x0000, 1, 0);
        assert_eq!(rows[0].address, 0xFFFE);
        assert_eq!(rows[1].address, 0x0000);
    }
}
