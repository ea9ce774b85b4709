//! Execution-unit semantics driven through decode and execute phase one.
//!
//! ALU cases use `R1` as the source and `R0` as the destination.

use proptest as _;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;
use tracing_subscriber as _;
use xm23_core::state::status::{PSW_C, PSW_N, PSW_SLP, PSW_V, PSW_Z};
use xm23_core::{
    execute_phase_one, ArchitecturalState, DataLatches, Decoder, ExecuteOutcome, Register,
    StatusWord,
};

fn execute(word: u16, state: &mut ArchitecturalState) -> ExecuteOutcome {
    let mut latches = DataLatches::default();
    execute_phase_one(&Decoder::decode(word), state, &mut latches)
}

fn alu(word: u16, destination: u16, source: u16, psw: u16) -> (u16, u16) {
    let mut state = ArchitecturalState::default();
    state.registers.set(Register::R0, destination);
    state.registers.set(Register::R1, source);
    state.status = StatusWord::from_u16(psw);
    assert_eq!(execute(word, &mut state), ExecuteOutcome::Completed);
    assert_eq!(state.registers.get(Register::R1), source, "source untouched");
    (state.registers.get(Register::R0), state.status.to_u16())
}

#[rstest]
#[case::add_signed_overflow(0x4008, 0x7FFF, 0x0001, 0, 0x8000, PSW_V | PSW_N)]
#[case::add_carry_out(0x4008, 0xFFFF, 0x0001, 0, 0x0000, PSW_C | PSW_Z)]
#[case::add_byte_keeps_high(0x4048, 0x12FF, 0x0001, 0, 0x1200, PSW_C | PSW_Z)]
#[case::add_constant_bank(0x4088, 0x0010, 0x9999, 0, 0x0011, 0)]
#[case::addc_folds_carry(0x4108, 0x0001, 0x0001, PSW_C, 0x0003, 0)]
#[case::sub_no_borrow(0x4208, 0x0005, 0x0003, 0, 0x0002, PSW_C)]
#[case::sub_borrow(0x4208, 0x0003, 0x0005, 0, 0xFFFE, PSW_N)]
#[case::subc_without_carry(0x4308, 0x0005, 0x0003, 0, 0x0001, PSW_C)]
#[case::subc_with_carry(0x4308, 0x0005, 0x0003, PSW_C, 0x0002, PSW_C)]
#[case::dadd_word(0x4408, 0x0099, 0x0001, 0, 0x0100, 0)]
#[case::dadd_byte(0x4448, 0x0099, 0x0001, 0, 0x0000, PSW_C | PSW_Z)]
#[case::dadd_carry_in(0x4408, 0x1234, 0x0000, PSW_C, 0x1235, 0)]
#[case::cmp_equal(0x4508, 0x0004, 0x0004, 0, 0x0004, PSW_C | PSW_Z)]
#[case::xor_byte(0x4648, 0xAB0F, 0xFFFF, 0, 0xABF0, PSW_N)]
#[case::xor_keeps_c_and_v(0x4608, 0x0001, 0x0002, PSW_C | PSW_V, 0x0003, PSW_C | PSW_V | PSW_Z)]
#[case::and_to_zero(0x4708, 0xF0F0, 0x0F0F, 0, 0x0000, PSW_Z)]
#[case::and_positive_sets_zero(0x4708, 0x0001, 0x0001, 0, 0x0001, PSW_Z)]
#[case::and_byte(0x4748, 0xFF81, 0x0080, 0, 0xFF80, PSW_N)]
#[case::or_word(0x4808, 0x8000, 0x0001, 0, 0x8001, PSW_N)]
#[case::or_byte(0x4848, 0x1200, 0x0034, 0, 0x1234, PSW_Z)]
#[case::bit_set_is_nonzero(0x4908, 0x0004, 0x0002, PSW_Z, 0x0004, 0)]
#[case::bit_clear_is_zero(0x4908, 0x0000, 0x0002, 0, 0x0000, PSW_Z)]
#[case::bic(0x4A08, 0x0004, 0x0002, 0, 0x0000, PSW_Z)]
#[case::bis_top_bit(0x4B08, 0x0000, 0x000F, 0, 0x8000, PSW_N)]
#[case::bis_byte_masks_bit_number(0x4B48, 0xFF00, 0x0008, 0, 0xFF01, PSW_Z)]
fn alu_results_and_flags(
    #[case] word: u16,
    #[case] destination: u16,
    #[case] source: u16,
    #[case] psw_in: u16,
    #[case] result: u16,
    #[case] psw_out: u16,
) {
    assert_eq!(alu(word, destination, source, psw_in), (result, psw_out));
}

#[rstest]
#[case::mov_byte(0x4C48, 0x1111, 0xABCD, 0x11CD)]
#[case::sra_word(0x4D00, 0x8004, 0, 0xC002)]
#[case::sra_byte(0x4D40, 0x1280, 0, 0x12C0)]
#[case::swpb(0x4D18, 0x1280, 0, 0x8012)]
#[case::sxt_negative(0x4D20, 0x0080, 0, 0xFF80)]
#[case::sxt_positive(0x4D20, 0xFF7F, 0, 0x007F)]
#[case::movl(0x62D0, 0x1234, 0, 0x125A)]
#[case::movlz(0x6AD0, 0x1234, 0, 0x005A)]
#[case::movls(0x72D0, 0x1234, 0, 0xFF5A)]
#[case::movh(0x7AD0, 0x1234, 0, 0x5A34)]
fn movement_leaves_flags_alone(
    #[case] word: u16,
    #[case] destination: u16,
    #[case] source: u16,
    #[case] result: u16,
) {
    let psw = PSW_C | PSW_Z | PSW_N | PSW_V;
    assert_eq!(alu(word, destination, source, psw), (result, psw));
}

#[test]
fn swap_exchanges_registers() {
    let mut state = ArchitecturalState::default();
    state.registers.set(Register::R0, 0x1111);
    state.registers.set(Register::R1, 0x2222);
    // SWAP R1,R0
    execute(0x4C88, &mut state);
    assert_eq!(state.registers.get(Register::R0), 0x2222);
    assert_eq!(state.registers.get(Register::R1), 0x1111);
}

#[rstest]
#[case::word_carry_in(0x4D08, 0x0001, PSW_C, 0x8000, PSW_C)]
#[case::word_no_carry(0x4D08, 0x0002, 0, 0x0001, 0)]
#[case::byte_carry_in(0x4D48, 0xFF02, PSW_C, 0xFF81, 0)]
#[case::keeps_other_flags(0x4D08, 0x0003, PSW_Z | PSW_V, 0x0001, PSW_Z | PSW_V | PSW_C)]
fn rotate_through_carry(
    #[case] word: u16,
    #[case] destination: u16,
    #[case] psw_in: u16,
    #[case] result: u16,
    #[case] psw_out: u16,
) {
    assert_eq!(alu(word, destination, 0, psw_in), (result, psw_out));
}

#[rstest]
#[case::setcc_all_but_sleep(0x4DB7, 0, PSW_V | PSW_N | PSW_Z | PSW_C)]
#[case::clrcc_carry(0x4DC1, PSW_C | PSW_Z, PSW_Z)]
#[case::sleep_below_max_priority(0x4DA8, 3 << 5, (3 << 5) | PSW_SLP)]
#[case::sleep_forced_clear_at_max_priority(0x4DA8, (7 << 5) | PSW_SLP, 7 << 5)]
#[case::clrcc_keeps_priorities(0x4DDF, 0xE0FF, 0xE0E0)]
fn condition_code_instructions(#[case] word: u16, #[case] psw_in: u16, #[case] psw_out: u16) {
    let mut state = ArchitecturalState::default();
    state.status = StatusWord::from_u16(psw_in);
    execute(word, &mut state);
    assert_eq!(state.status.to_u16(), psw_out);
}

#[rstest]
#[case::beq_taken(0x2004, PSW_Z, true)]
#[case::beq_not_taken(0x2004, 0, false)]
#[case::bne(0x2404, 0, true)]
#[case::bc(0x2804, PSW_C, true)]
#[case::bnc(0x2C04, PSW_C, false)]
#[case::bn(0x3004, PSW_N, true)]
#[case::bge_equal_signs(0x3404, PSW_N | PSW_V, true)]
#[case::bge_differing_signs(0x3404, PSW_N, false)]
#[case::blt(0x3804, PSW_V, true)]
#[case::bra(0x3C04, 0, true)]
fn branch_conditions(#[case] word: u16, #[case] psw: u16, #[case] taken: bool) {
    let mut state = ArchitecturalState::default();
    state.registers.set_pc(0x0204);
    state.status = StatusWord::from_u16(psw);
    let outcome = execute(word, &mut state);
    if taken {
        assert_eq!(outcome, ExecuteOutcome::BranchTaken { target: 0x020A });
        assert_eq!(state.registers.pc(), 0x020A);
    } else {
        assert_eq!(outcome, ExecuteOutcome::Completed);
        assert_eq!(state.registers.pc(), 0x0204);
    }
}

#[test]
fn call_saves_the_following_address() {
    let mut state = ArchitecturalState::default();
    state.registers.set_pc(0x0204);
    // BL $-0x200
    let outcome = execute(0x1F00, &mut state);
    assert_eq!(outcome, ExecuteOutcome::BranchTaken { target: 0x0002 });
    assert_eq!(state.registers.lr(), 0x0202);
}
