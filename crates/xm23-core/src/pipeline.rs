//! Half-cycle pipeline scheduler.
//!
//! Each call to [`Pipeline::tick`] performs one half-cycle. Even clock values
//! run fetch phase one, any deferred memory transfer and decode; odd values
//! run fetch phase two and execute phase one. A taken branch raises both a
//! decode and an execute bubble, which absorbs exactly one stale fetch as a
//! no-op. Bubble ticks do not advance the clock, so the suppressed phase runs
//! on the next call instead.

use crate::decoder::{Decoded, DecodedInstruction, Decoder};
use crate::encoding::NOP_WORD;
use crate::execute::{
    execute_phase_one, execute_phase_two, DataLatches, ExecuteOutcome, PendingTransfer,
    PC_INCREMENT,
};
use crate::memory::MemorySpace;
use crate::state::{ArchitecturalState, HaltReason, RunState};
use crate::trace::{DiagnosticTrace, Stage, StageTag, TraceRecord};

/// Instruction-side pipeline latches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct InstructionLatches {
    /// Instruction memory address register: address of the fetch in flight.
    pub address: u16,
    /// Instruction memory buffer register: last word read.
    pub buffer: u16,
    /// Instruction register: word waiting to be decoded.
    pub register: u16,
    /// Address `register` was fetched from; `None` for an injected no-op.
    pub register_address: Option<u16>,
}

impl Default for InstructionLatches {
    fn default() -> Self {
        Self {
            address: 0,
            buffer: 0,
            register: NOP_WORD,
            register_address: None,
        }
    }
}

/// Decoded instruction waiting for execute, tagged with its fetch address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct IssueSlot {
    /// Decode outcome.
    pub decoded: Decoded,
    /// Fetch address; `None` for an injected no-op.
    pub address: Option<u16>,
}

impl IssueSlot {
    /// Injected no-op with no fetch address.
    pub const INJECTED: Self = Self {
        decoded: Decoded::Instruction(DecodedInstruction::NOP),
        address: None,
    };
}

impl Default for IssueSlot {
    fn default() -> Self {
        Self::INJECTED
    }
}

/// Work selected by the clock's parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickPhase {
    /// Fetch phase one, execute phase two, decode.
    FetchDecode,
    /// Fetch phase two, execute phase one.
    FetchExecute,
}

impl TickPhase {
    /// Phase for a clock value.
    #[must_use]
    pub const fn for_clock(clock: u64) -> Self {
        if clock % 2 == 0 {
            Self::FetchDecode
        } else {
            Self::FetchExecute
        }
    }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A bubble was consumed; the clock did not advance.
    Bubble,
    /// Fetch and decode ran.
    Decoded,
    /// Execute phase one ran on the slot fetched from `address`.
    Retired {
        /// Fetch address of the executed slot; `None` for injected no-ops.
        address: Option<u16>,
    },
    /// The machine is halted and nothing ran.
    Halted(HaltReason),
}

/// Pipeline scheduler state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Pipeline {
    clock: u64,
    ticks: u64,
    decode_bubble: bool,
    execute_bubble: bool,
    pending: Option<PendingTransfer>,
    slot: IssueSlot,
    instruction_latches: InstructionLatches,
    data_latches: DataLatches,
    last_retired: Option<u16>,
    run_state: RunState,
}

/// Everything a tick reads or mutates outside the scheduler itself.
pub struct TickContext<'a> {
    /// Registers and status word.
    pub state: &'a mut ArchitecturalState,
    /// Instruction space, read by fetch.
    pub instructions: &'a MemorySpace,
    /// Data space, accessed by execute phase two.
    pub data: &'a mut MemorySpace,
    /// Address that halts the machine when an instruction fetched from it retires.
    pub breakpoint: Option<u16>,
    /// Trace sink.
    pub trace: &'a mut DiagnosticTrace,
}

impl Pipeline {
    /// Clock value; advances only on ticks that did work.
    #[must_use]
    pub const fn clock(&self) -> u64 {
        self.clock
    }

    /// Number of `tick` calls, bubbles included.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Phase the next working tick will run.
    #[must_use]
    pub const fn phase(&self) -> TickPhase {
        TickPhase::for_clock(self.clock)
    }

    /// Returns `true` while a load or store awaits its transfer.
    #[must_use]
    pub const fn has_pending_transfer(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns `true` while either bubble is pending.
    #[must_use]
    pub const fn bubble_pending(&self) -> bool {
        self.decode_bubble || self.execute_bubble
    }

    /// Slot that the next execute phase will run.
    #[must_use]
    pub const fn slot(&self) -> &IssueSlot {
        &self.slot
    }

    /// Instruction-side latches.
    #[must_use]
    pub const fn instruction_latches(&self) -> &InstructionLatches {
        &self.instruction_latches
    }

    /// Data-side latches.
    #[must_use]
    pub const fn data_latches(&self) -> &DataLatches {
        &self.data_latches
    }

    /// Fetch address of the most recently retired instruction.
    #[must_use]
    pub const fn last_retired(&self) -> Option<u16> {
        self.last_retired
    }

    /// Current run state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Clears a halt so ticking can continue.
    pub const fn resume(&mut self) {
        self.run_state = RunState::Running;
    }

    /// Discards all in-flight work and restarts the clock at zero.
    ///
    /// A transfer started by phase one but not yet completed is dropped.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Performs one half-cycle.
    pub fn tick(&mut self, cx: &mut TickContext<'_>) -> TickOutcome {
        if let RunState::Halted(reason) = self.run_state {
            return TickOutcome::Halted(reason);
        }
        self.ticks += 1;
        let clock = self.clock;
        let phase = self.phase();
        tracing::trace!("Tick clock={} phase={:?}", clock, phase);

        let mut record = TraceRecord {
            clock,
            pc: 0,
            instruction: 0,
            fetch: None,
            decode: None,
            execute: None,
        };
        let outcome = match phase {
            TickPhase::FetchDecode => self.fetch_decode(cx, &mut record),
            TickPhase::FetchExecute => self.fetch_execute(cx, &mut record),
        };
        record.pc = cx.state.registers.pc();
        record.instruction = self.instruction_latches.register;
        cx.trace.push(record);
        outcome
    }

    fn fetch_decode(&mut self, cx: &mut TickContext<'_>, record: &mut TraceRecord) -> TickOutcome {
        if self.decode_bubble {
            tracing::debug!("Decode bubble at clock {}: injecting NOP", self.clock);
            self.instruction_latches.register = NOP_WORD;
            self.instruction_latches.register_address = None;
            self.decode_bubble = false;
            return TickOutcome::Bubble;
        }

        let pc = cx.state.registers.pc();
        self.instruction_latches.address = pc;
        cx.state.registers.set_pc(pc.wrapping_add(PC_INCREMENT));
        record.fetch = Some(StageTag {
            stage: Stage::F0,
            word: pc,
        });

        if let Some(pending) = self.pending.take() {
            execute_phase_two(&pending, cx.state, cx.data, &mut self.data_latches);
            record.execute = Some(StageTag {
                stage: Stage::E1,
                word: pending.word,
            });
        }

        let word = self.instruction_latches.register;
        self.slot = IssueSlot {
            decoded: Decoder::decode(word),
            address: self.instruction_latches.register_address,
        };
        record.decode = Some(StageTag {
            stage: Stage::D0,
            word,
        });

        self.clock += 1;
        TickOutcome::Decoded
    }

    fn fetch_execute(
        &mut self,
        cx: &mut TickContext<'_>,
        record: &mut TraceRecord,
    ) -> TickOutcome {
        if self.execute_bubble {
            tracing::debug!("Execute bubble at clock {}", self.clock);
            self.execute_bubble = false;
            return TickOutcome::Bubble;
        }

        let address = self.instruction_latches.address;
        let word = cx.instructions.read_word(address);
        self.instruction_latches.buffer = word;
        self.instruction_latches.register = word;
        self.instruction_latches.register_address = Some(address);
        record.fetch = Some(StageTag {
            stage: Stage::F1,
            word,
        });

        let slot = self.slot;
        record.execute = Some(StageTag {
            stage: Stage::E0,
            word: slot.decoded.word(),
        });
        match execute_phase_one(&slot.decoded, cx.state, &mut self.data_latches) {
            ExecuteOutcome::BranchTaken { target } => {
                tracing::debug!(
                    "Branch at {:?} taken to {:#06x}; flushing one slot",
                    slot.address,
                    target
                );
                self.decode_bubble = true;
                self.execute_bubble = true;
            }
            ExecuteOutcome::PhaseTwo(pending) => self.pending = Some(pending),
            ExecuteOutcome::Completed | ExecuteOutcome::Inert => {}
        }
        self.clock += 1;

        if let Some(retired) = slot.address {
            self.last_retired = Some(retired);
            if cx.breakpoint == Some(retired) {
                tracing::debug!("Breakpoint hit at {:#06x}", retired);
                self.run_state = RunState::Halted(HaltReason::Breakpoint { address: retired });
            }
        }
        TickOutcome::Retired {
            address: slot.address,
        }
    }
}
