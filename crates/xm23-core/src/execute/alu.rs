//! Arithmetic, logic and bit-manipulation units.
//!
//! Every unit reads a source from the bank selected by `R/C` and a
//! destination from the register bank. In byte mode only the low byte of the
//! destination is written.

use super::flags::FlagsUpdate;
use crate::encoding::{OperandFields, Width};
use crate::state::{ArchitecturalState, Register};

struct Operands {
    source: u16,
    destination: u16,
    width: Width,
}

impl Operands {
    fn read(state: &ArchitecturalState, fields: &OperandFields) -> Self {
        let mask = fields.width.mask();
        Self {
            source: state.registers.operand(fields.bank, fields.source) & mask,
            destination: state.registers.get(fields.destination) & mask,
            width: fields.width,
        }
    }

    fn add(&self, addend: u16) -> (u16, FlagsUpdate) {
        let addend = addend & self.width.mask();
        let result = self.destination.wrapping_add(addend);
        (
            result,
            FlagsUpdate::Arithmetic {
                source: addend,
                destination: self.destination,
                result,
                width: self.width,
            },
        )
    }

    fn logical(&self, result: u16) -> (u16, FlagsUpdate) {
        (
            result,
            FlagsUpdate::Logical {
                result,
                width: self.width,
            },
        )
    }

    /// Single-bit mask chosen by the source value, bit number masked to the width.
    fn selected_bit(&self) -> u16 {
        let bit = u32::from(self.source) & self.width.msb();
        1 << bit
    }
}

/// Writes `value` to `reg`, replacing only the low byte in byte mode.
#[allow(clippy::cast_possible_truncation)]
pub(super) fn write_back(state: &mut ArchitecturalState, reg: Register, value: u16, width: Width) {
    match width {
        Width::Word => state.registers.set(reg, value),
        Width::Byte => state.registers.set_low_byte(reg, value as u8),
    }
}

fn commit(
    state: &mut ArchitecturalState,
    fields: &OperandFields,
    (result, flags): (u16, FlagsUpdate),
) {
    flags.apply(&mut state.status);
    write_back(state, fields.destination, result, fields.width);
}

/// `ADD`: destination + source.
pub fn add(state: &mut ArchitecturalState, fields: &OperandFields) {
    let operands = Operands::read(state, fields);
    commit(state, fields, operands.add(operands.source));
}

/// `ADDC`: destination + source + carry.
pub fn add_with_carry(state: &mut ArchitecturalState, fields: &OperandFields) {
    let operands = Operands::read(state, fields);
    let carry = u16::from(state.status.carry);
    commit(state, fields, operands.add(operands.source.wrapping_add(carry)));
}

/// `SUB`: destination + two's complement of source.
pub fn subtract(state: &mut ArchitecturalState, fields: &OperandFields) {
    let operands = Operands::read(state, fields);
    commit(state, fields, operands.add((!operands.source).wrapping_add(1)));
}

/// `SUBC`: destination + one's complement of source + carry.
pub fn subtract_with_carry(state: &mut ArchitecturalState, fields: &OperandFields) {
    let operands = Operands::read(state, fields);
    let carry = u16::from(state.status.carry);
    commit(state, fields, operands.add((!operands.source).wrapping_add(carry)));
}

/// `CMP`: `SUB` without write-back.
pub fn compare(state: &mut ArchitecturalState, fields: &OperandFields) {
    let operands = Operands::read(state, fields);
    let (_, flags) = operands.add((!operands.source).wrapping_add(1));
    flags.apply(&mut state.status);
}

/// `DADD`: packed-BCD addition, nibble carries chained from the carry flag.
pub fn decimal_add(state: &mut ArchitecturalState, fields: &OperandFields) {
    let operands = Operands::read(state, fields);
    let result = bcd_sum(
        operands.destination,
        operands.source,
        state.status.carry,
        operands.width,
    );
    let flags = FlagsUpdate::Arithmetic {
        source: operands.source,
        destination: operands.destination,
        result,
        width: operands.width,
    };
    commit(state, fields, (result, flags));
}

/// Nibble-wise decimal sum of the low `width.nibbles()` digits.
///
/// A digit sum of ten or more has ten subtracted and carries one into the
/// next digit. Digits above the width are taken from `destination`.
#[must_use]
pub fn bcd_sum(destination: u16, source: u16, carry_in: bool, width: Width) -> u16 {
    let mut carry = u16::from(carry_in);
    let mut result = destination;
    for nibble in 0..width.nibbles() {
        let shift = nibble * 4;
        let mut digit = ((destination >> shift) & 0xF) + ((source >> shift) & 0xF) + carry;
        if digit >= 10 {
            digit -= 10;
            carry = 1;
        } else {
            carry = 0;
        }
        result = (result & !(0xF << shift)) | ((digit & 0xF) << shift);
    }
    result
}

/// `XOR`.
pub fn exclusive_or(state: &mut ArchitecturalState, fields: &OperandFields) {
    let operands = Operands::read(state, fields);
    commit(
        state,
        fields,
        operands.logical(operands.destination ^ operands.source),
    );
}

/// `AND`.
pub fn and(state: &mut ArchitecturalState, fields: &OperandFields) {
    let operands = Operands::read(state, fields);
    commit(
        state,
        fields,
        operands.logical(operands.destination & operands.source),
    );
}

/// `OR`.
pub fn or(state: &mut ArchitecturalState, fields: &OperandFields) {
    let operands = Operands::read(state, fields);
    commit(
        state,
        fields,
        operands.logical(operands.destination | operands.source),
    );
}

/// `BIT`: zero flag set when the selected destination bit is clear.
pub fn bit_test(state: &mut ArchitecturalState, fields: &OperandFields) {
    let operands = Operands::read(state, fields);
    FlagsUpdate::Zero(operands.destination & operands.selected_bit() == 0)
        .apply(&mut state.status);
}

/// `BIC`: clears the selected destination bit.
pub fn bit_clear(state: &mut ArchitecturalState, fields: &OperandFields) {
    let operands = Operands::read(state, fields);
    commit(
        state,
        fields,
        operands.logical(operands.destination & !operands.selected_bit()),
    );
}

/// `BIS`: sets the selected destination bit.
pub fn bit_set(state: &mut ArchitecturalState, fields: &OperandFields) {
    let operands = Operands::read(state, fields);
    commit(
        state,
        fields,
        operands.logical(operands.destination | operands.selected_bit()),
    );
}

#[cfg(test)]
mod tests {
    use super::{add, add_with_carry, and, bcd_sum, bit_clear, bit_set, bit_test, compare};
    use super::{decimal_add, exclusive_or, subtract, subtract_with_carry};
    use crate::encoding::{OperandFields, Width};
    use crate::state::{ArchitecturalState, OperandBank, Register};

    fn fields(width: Width) -> OperandFields {
        OperandFields {
            width,
            source: Register::R1,
            destination: Register::R0,
            ..OperandFields::default()
        }
    }

    fn setup(destination: u16, source: u16) -> ArchitecturalState {
        let mut state = ArchitecturalState::default();
        state.registers.set(Register::R0, destination);
        state.registers.set(Register::R1, source);
        state
    }

    #[test]
    fn add_sets_overflow_on_sign_change() {
        let mut state = setup(0x7FFF, 0x0001);
        add(&mut state, &fields(Width::Word));
        assert_eq!(state.registers.get(Register::R0), 0x8000);
        assert!(state.status.overflow && state.status.negative);
        assert!(!state.status.carry && !state.status.zero);
    }

    #[test]
    fn byte_add_preserves_the_high_byte() {
        let mut state = setup(0x12FF, 0x0001);
        add(&mut state, &fields(Width::Byte));
        assert_eq!(state.registers.get(Register::R0), 0x1200);
        assert!(state.status.carry && state.status.zero);
    }

    #[test]
    fn constant_bank_source() {
        let mut state = setup(0x0010, 0x9999);
        let mut fields = fields(Width::Word);
        fields.bank = OperandBank::Constant;
        fields.source = Register::R6;
        add(&mut state, &fields);
        assert_eq!(state.registers.get(Register::R0), 0x0030);
    }

    #[test]
    fn add_with_carry_folds_carry_into_source() {
        let mut state = setup(0x0001, 0x0001);
        state.status.carry = true;
        add_with_carry(&mut state, &fields(Width::Word));
        assert_eq!(state.registers.get(Register::R0), 0x0003);
    }

    #[test]
    fn subtract_sets_carry_when_no_borrow() {
        let mut state = setup(0x0005, 0x0003);
        subtract(&mut state, &fields(Width::Word));
        assert_eq!(state.registers.get(Register::R0), 0x0002);
        assert!(state.status.carry);

        let mut state = setup(0x0001, 0x0003);
        subtract(&mut state, &fields(Width::Word));
        assert_eq!(state.registers.get(Register::R0), 0xFFFE);
        assert!(!state.status.carry && state.status.negative);
    }

    #[test]
    fn subtract_with_carry_uses_ones_complement_plus_carry() {
        let mut state = setup(0x0005, 0x0003);
        state.status.carry = false;
        subtract_with_carry(&mut state, &fields(Width::Word));
        assert_eq!(state.registers.get(Register::R0), 0x0001);
    }

    #[test]
    fn compare_only_touches_flags() {
        let mut state = setup(0x0004, 0x0004);
        compare(&mut state, &fields(Width::Word));
        assert_eq!(state.registers.get(Register::R0), 0x0004);
        assert!(state.status.zero && state.status.carry);
    }

    #[test]
    fn bcd_sum_carries_digit_by_digit() {
        assert_eq!(bcd_sum(0x0099, 0x0001, false, Width::Word), 0x0100);
        assert_eq!(bcd_sum(0x0099, 0x0001, false, Width::Byte), 0x0000);
        assert_eq!(bcd_sum(0x1234, 0x0000, true, Width::Word), 0x1235);
        assert_eq!(bcd_sum(0x0009, 0x0001, false, Width::Word), 0x0010);
    }

    #[test]
    fn decimal_add_word_and_byte_modes() {
        let mut word = setup(0x0099, 0x0001);
        decimal_add(&mut word, &fields(Width::Word));
        assert_eq!(word.registers.get(Register::R0), 0x0100);
        assert!(!word.status.carry);

        let mut byte = setup(0x4599, 0x0001);
        decimal_add(&mut byte, &fields(Width::Byte));
        assert_eq!(byte.registers.get(Register::R0), 0x4500);
        assert!(byte.status.carry);
    }

    #[test]
    fn byte_xor_writes_back_low_byte() {
        let mut state = setup(0xAB0F, 0xFFFF);
        exclusive_or(&mut state, &fields(Width::Byte));
        assert_eq!(state.registers.get(Register::R0), 0xABF0);
        assert!(state.status.negative);
        assert!(!state.status.zero);
    }

    #[test]
    fn and_with_a_positive_result_sets_zero() {
        let mut state = setup(0x0001, 0x0001);
        and(&mut state, &fields(Width::Word));
        assert_eq!(state.registers.get(Register::R0), 0x0001);
        assert!(state.status.zero);
        assert!(!state.status.negative);
    }

    #[test]
    fn bit_operations_select_by_source_value() {
        let mut state = setup(0x0004, 2);
        bit_test(&mut state, &fields(Width::Word));
        assert!(!state.status.zero);

        bit_clear(&mut state, &fields(Width::Word));
        assert_eq!(state.registers.get(Register::R0), 0x0000);
        assert!(state.status.zero);

        state.registers.set(Register::R1, 15);
        bit_set(&mut state, &fields(Width::Word));
        assert_eq!(state.registers.get(Register::R0), 0x8000);
        assert!(state.status.negative);
    }

    #[test]
    fn out_of_width_bit_numbers_wrap() {
        let mut state = setup(0x0000, 17);
        bit_set(&mut state, &fields(Width::Word));
        assert_eq!(state.registers.get(Register::R0), 0x0002);

        let mut state = setup(0xFF00, 8);
        bit_set(&mut state, &fields(Width::Byte));
        assert_eq!(state.registers.get(Register::R0), 0xFF01);
    }
}
