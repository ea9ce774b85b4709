//! Execution units and the per-phase dispatcher.
//!
//! Execute is split in two phases. Phase one runs every decoded slot on an
//! odd tick: ALU, movement, status and branch operations finish there, and
//! the memory-access unit latches an effective address. Phase two runs on the
//! following even tick and only ever completes a memory transfer.

mod alu;
mod branch;
mod flags;
mod memory_access;
mod movement;

pub use alu::bcd_sum;
pub use branch::{condition_holds, PC_INCREMENT};
pub use flags::FlagsUpdate;
pub use memory_access::{DataLatches, PendingTransfer, RegisterAdjust};

use crate::decoder::{Decoded, DecodedInstruction};
use crate::encoding::Opcode;
use crate::memory::MemorySpace;
use crate::state::ArchitecturalState;

/// Result of execute phase one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteOutcome {
    /// The instruction finished in this phase.
    Completed,
    /// A branch or call was taken; the pipeline must flush one slot.
    BranchTaken {
        /// New program counter.
        target: u16,
    },
    /// A load or store needs phase two on the next tick.
    PhaseTwo(PendingTransfer),
    /// Unrecognized word; nothing changed.
    Inert,
}

/// Runs execute phase one for a decoded slot.
pub fn execute_phase_one(
    decoded: &Decoded,
    state: &mut ArchitecturalState,
    latches: &mut DataLatches,
) -> ExecuteOutcome {
    match decoded {
        Decoded::Instruction(instruction) => dispatch(instruction, state, latches),
        Decoded::Unrecognized(word) => {
            tracing::warn!("Unrecognized word {:#06x} retired without effect", word);
            ExecuteOutcome::Inert
        }
    }
}

/// Runs execute phase two: the bus transfer of a load or store.
pub fn execute_phase_two(
    pending: &PendingTransfer,
    state: &mut ArchitecturalState,
    data: &mut MemorySpace,
    latches: &mut DataLatches,
) {
    memory_access::complete(pending, state, data, latches);
}

fn dispatch(
    instruction: &DecodedInstruction,
    state: &mut ArchitecturalState,
    latches: &mut DataLatches,
) -> ExecuteOutcome {
    let fields = &instruction.fields;
    match instruction.opcode {
        Opcode::Bl
        | Opcode::Beq
        | Opcode::Bne
        | Opcode::Bc
        | Opcode::Bnc
        | Opcode::Bn
        | Opcode::Bge
        | Opcode::Blt
        | Opcode::Bra => {
            return branch::execute(instruction.opcode, fields, state)
                .map_or(ExecuteOutcome::Completed, |target| {
                    ExecuteOutcome::BranchTaken { target }
                });
        }
        Opcode::Ld | Opcode::St | Opcode::Ldr | Opcode::Str => {
            return memory_access::begin(
                instruction.opcode,
                instruction.word,
                fields,
                state,
                latches,
            )
            .map_or(ExecuteOutcome::Completed, ExecuteOutcome::PhaseTwo);
        }
        Opcode::Add => alu::add(state, fields),
        Opcode::Addc => alu::add_with_carry(state, fields),
        Opcode::Sub => alu::subtract(state, fields),
        Opcode::Subc => alu::subtract_with_carry(state, fields),
        Opcode::Dadd => alu::decimal_add(state, fields),
        Opcode::Cmp => alu::compare(state, fields),
        Opcode::Xor => alu::exclusive_or(state, fields),
        Opcode::And => alu::and(state, fields),
        Opcode::Or => alu::or(state, fields),
        Opcode::Bit => alu::bit_test(state, fields),
        Opcode::Bic => alu::bit_clear(state, fields),
        Opcode::Bis => alu::bit_set(state, fields),
        Opcode::Mov => movement::move_register(state, fields),
        Opcode::Swap => movement::swap(state, fields),
        Opcode::Sra => movement::shift_right_arithmetic(state, fields),
        Opcode::Rrc => movement::rotate_right_through_carry(state, fields),
        Opcode::Swpb => movement::swap_bytes(state, fields),
        Opcode::Sxt => movement::sign_extend(state, fields),
        Opcode::Setcc => state.status.set_conditions(fields.conditions),
        Opcode::Clrcc => state.status.clear_conditions(fields.conditions),
        Opcode::Movl => movement::move_low(state, fields),
        Opcode::Movlz => movement::move_low_zero(state, fields),
        Opcode::Movls => movement::move_low_set(state, fields),
        Opcode::Movh => movement::move_high(state, fields),
    }
    ExecuteOutcome::Completed
}

#[cfg(test)]
mod tests {
    use super::{execute_phase_one, execute_phase_two, DataLatches, ExecuteOutcome};
    use crate::decoder::{Decoded, Decoder};
    use crate::memory::{MemorySpace, Space};
    use crate::state::{ArchitecturalState, Register, StatusWord};

    fn run(word: u16, state: &mut ArchitecturalState) -> ExecuteOutcome {
        let mut latches = DataLatches::default();
        execute_phase_one(&Decoder::decode(word), state, &mut latches)
    }

    #[test]
    fn alu_word_completes_in_phase_one() {
        let mut state = ArchitecturalState::default();
        state.registers.set(Register::R3, 5);
        state.registers.set(Register::R2, 7);
        // ADD R2,R3
        assert_eq!(run(0x4013, &mut state), ExecuteOutcome::Completed);
        assert_eq!(state.registers.get(Register::R3), 12);
    }

    #[test]
    fn taken_branch_reports_its_target() {
        let mut state = ArchitecturalState::default();
        state.registers.set_pc(0x0104);
        state.status.zero = true;
        // BEQ $+8
        assert_eq!(
            run(0x2004, &mut state),
            ExecuteOutcome::BranchTaken { target: 0x010A }
        );

        state.status.zero = false;
        assert_eq!(run(0x2004, &mut state), ExecuteOutcome::Completed);
    }

    #[test]
    fn load_defers_its_transfer() {
        let mut state = ArchitecturalState::default();
        let mut data = MemorySpace::new(Space::Data);
        data.write_word(0x0800, 0x1234);
        state.registers.set(Register::R1, 0x0800);

        let mut latches = DataLatches::default();
        // LD R1,R0
        let outcome = execute_phase_one(&Decoder::decode(0x5808), &mut state, &mut latches);
        let ExecuteOutcome::PhaseTwo(pending) = outcome else {
            panic!("expected a phase-two transfer, got {outcome:?}");
        };
        assert_eq!(state.registers.get(Register::R0), 0);

        execute_phase_two(&pending, &mut state, &mut data, &mut latches);
        assert_eq!(state.registers.get(Register::R0), 0x1234);
        assert_eq!(latches.buffer, 0x1234);
    }

    #[test]
    fn status_ops_use_the_encoded_mask() {
        let mut state = ArchitecturalState::default();
        // SETCC C,Z,V
        run(0x4DB3, &mut state);
        assert_eq!(
            state.status,
            StatusWord {
                carry: true,
                zero: true,
                overflow: true,
                ..StatusWord::default()
            }
        );
        // CLRCC Z
        run(0x4DC2, &mut state);
        assert!(!state.status.zero);
        assert!(state.status.carry && state.status.overflow);
    }

    #[test]
    fn unrecognized_words_are_inert() {
        let mut state = ArchitecturalState::default();
        state.registers.set(Register::R0, 0xAAAA);
        let before = state.clone();
        let mut latches = DataLatches::default();
        let outcome = execute_phase_one(&Decoded::Unrecognized(0x4E00), &mut state, &mut latches);
        assert_eq!(outcome, ExecuteOutcome::Inert);
        assert_eq!(state, before);
        assert_eq!(latches, DataLatches::default());
    }
}
