//! Data-movement, shift and immediate-byte units. None of these update the
//! status word except `RRC`, which shifts through carry.

use super::alu::write_back;
use super::flags::FlagsUpdate;
use crate::encoding::{OperandFields, Width};
use crate::state::ArchitecturalState;

/// `MOV`: copies the source register into the destination.
pub fn move_register(state: &mut ArchitecturalState, fields: &OperandFields) {
    let value = state.registers.get(fields.source);
    write_back(state, fields.destination, value, fields.width);
}

/// `SWAP`: exchanges two registers.
pub fn swap(state: &mut ArchitecturalState, fields: &OperandFields) {
    let source = state.registers.get(fields.source);
    let destination = state.registers.get(fields.destination);
    state.registers.set(fields.source, destination);
    state.registers.set(fields.destination, source);
}

/// `SRA`: shifts right by one, replicating the sign bit.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub fn shift_right_arithmetic(state: &mut ArchitecturalState, fields: &OperandFields) {
    let value = state.registers.get(fields.destination);
    let shifted = match fields.width {
        Width::Word => ((value as i16) >> 1) as u16,
        Width::Byte => u16::from((((value as u8) as i8) >> 1) as u8),
    };
    write_back(state, fields.destination, shifted, fields.width);
}

/// `RRC`: rotates right by one through carry.
pub fn rotate_right_through_carry(state: &mut ArchitecturalState, fields: &OperandFields) {
    let value = state.registers.get(fields.destination) & fields.width.mask();
    let carry_in = u16::from(state.status.carry);
    let rotated = (value >> 1) | (carry_in << fields.width.msb());
    FlagsUpdate::Carry(value & 1 != 0).apply(&mut state.status);
    write_back(state, fields.destination, rotated, fields.width);
}

/// `SWPB`: exchanges the two bytes of the destination.
pub fn swap_bytes(state: &mut ArchitecturalState, fields: &OperandFields) {
    let value = state.registers.get(fields.destination);
    state.registers.set(fields.destination, value.swap_bytes());
}

/// `SXT`: sign-extends the low byte through the high byte.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub fn sign_extend(state: &mut ArchitecturalState, fields: &OperandFields) {
    let value = state.registers.get(fields.destination);
    let extended = i16::from(value as u8 as i8) as u16;
    state.registers.set(fields.destination, extended);
}

/// `MOVL`: low byte from the immediate, high byte kept.
pub fn move_low(state: &mut ArchitecturalState, fields: &OperandFields) {
    state.registers.set_low_byte(fields.destination, fields.data);
}

/// `MOVLZ`: low byte from the immediate, high byte cleared.
pub fn move_low_zero(state: &mut ArchitecturalState, fields: &OperandFields) {
    state
        .registers
        .set(fields.destination, u16::from(fields.data));
}

/// `MOVLS`: low byte from the immediate, high byte set.
pub fn move_low_set(state: &mut ArchitecturalState, fields: &OperandFields) {
    state
        .registers
        .set(fields.destination, 0xFF00 | u16::from(fields.data));
}

/// `MOVH`: high byte from the immediate, low byte kept.
pub fn move_high(state: &mut ArchitecturalState, fields: &OperandFields) {
    state.registers.set_high_byte(fields.destination, fields.data);
}
