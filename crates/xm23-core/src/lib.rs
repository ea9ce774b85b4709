//! Cycle-level simulator core for the XM-23 16-bit instruction set.

/// Memory spaces and the single-access bus.
pub mod memory;
pub use memory::{transfer, BusControl, MemorySpace, Space, ADDRESS_SPACE_BYTES};

/// Host-facing machine API and configuration.
pub mod api;
pub use api::{Machine, MachineConfig, RunOutcome, StopReason};

/// Architectural register and status-word state.
pub mod state;
pub use state::{
    ArchitecturalState, ConditionMask, HaltReason, OperandBank, Register, RegisterFile, RunState,
    StatusWord, CONSTANT_BANK, REGISTER_COUNT,
};

/// Instruction encoding table, operand fields and reference encoder.
pub mod encoding;
pub use encoding::{
    classify, encode, AddressMode, Layout, Opcode, OperandFields, Width,
    INSTRUCTION_PATTERN_TABLE, NOP_WORD,
};

/// Instruction decoder.
pub mod decoder;
pub use decoder::{Decoded, DecodedInstruction, Decoder};

/// Accessor faults.
pub mod fault;
pub use fault::AccessFault;

/// Execution units.
pub mod execute;
pub use execute::{
    execute_phase_one, execute_phase_two, DataLatches, ExecuteOutcome, FlagsUpdate,
    PendingTransfer,
};

/// Half-cycle pipeline scheduler.
pub mod pipeline;
pub use pipeline::{InstructionLatches, IssueSlot, Pipeline, TickOutcome, TickPhase};

/// Diagnostic trace.
pub mod trace;
pub use trace::{DiagnosticTrace, Stage, StageTag, TraceConfig, TraceRecord};

/// Disassembler.
pub mod disasm;
pub use disasm::{disassemble_window, disassemble_word, DisassemblyRow};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
#[cfg(test)]
use tracing_subscriber as _;
