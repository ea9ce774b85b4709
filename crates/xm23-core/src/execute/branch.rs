//! Branch and call unit.
//!
//! By the time a branch executes, fetch has already advanced `PC` one word
//! past the instruction that follows it, so the target is corrected by one
//! fetch increment.

use crate::encoding::{Opcode, OperandFields};
use crate::state::{ArchitecturalState, Register, StatusWord};

/// Bytes `PC` advances per fetch.
pub const PC_INCREMENT: u16 = 2;

/// Returns `true` when `opcode`'s condition holds for `status`.
///
/// Non-branch opcodes never hold.
#[must_use]
pub const fn condition_holds(opcode: Opcode, status: &StatusWord) -> bool {
    match opcode {
        Opcode::Bl | Opcode::Bra => true,
        Opcode::Beq => status.zero,
        Opcode::Bne => !status.zero,
        Opcode::Bc => status.carry,
        Opcode::Bnc => !status.carry,
        Opcode::Bn => status.negative,
        Opcode::Bge => status.negative == status.overflow,
        Opcode::Blt => status.negative != status.overflow,
        _ => false,
    }
}

/// Executes a branch. Returns the new `PC` when the branch is taken.
///
/// `BL` also saves the return address, the instruction after the call, in
/// the link register.
#[allow(clippy::cast_sign_loss)]
pub fn execute(
    opcode: Opcode,
    fields: &OperandFields,
    state: &mut ArchitecturalState,
) -> Option<u16> {
    if !condition_holds(opcode, &state.status) {
        return None;
    }
    let pc = state.registers.pc();
    if opcode == Opcode::Bl {
        state
            .registers
            .set(Register::LR, pc.wrapping_sub(PC_INCREMENT));
    }
    let target = pc
        .wrapping_add(fields.branch_offset as u16)
        .wrapping_sub(PC_INCREMENT);
    state.registers.set_pc(target);
    Some(target)
}
