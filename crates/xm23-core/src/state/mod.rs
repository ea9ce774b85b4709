//! Architectural CPU state model primitives.

/// Register banks and register identifiers.
pub mod registers;
/// Host-observable run state.
pub mod run_state;
/// Program status word.
pub mod status;

pub use registers::{OperandBank, Register, RegisterFile, CONSTANT_BANK, REGISTER_COUNT};
pub use run_state::{HaltReason, RunState};
pub use status::{ConditionMask, StatusWord, MAX_PRIORITY};

/// Registers and status word mutated by the execution units.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ArchitecturalState {
    /// Mutable register bank.
    pub registers: RegisterFile,
    /// Program status word.
    pub status: StatusWord,
}
