//! Host-facing machine API.
//!
//! A [`Machine`] owns the register file, both memory spaces, the pipeline
//! scheduler and the diagnostic trace. Hosts load images and inspect state
//! through the accessors here and drive the clock with [`Machine::advance`]
//! or [`Machine::run`]. A machine is exclusively owned; share it across
//! threads only behind the host's own synchronisation.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::memory::{MemorySpace, Space};
use crate::pipeline::{Pipeline, TickContext, TickOutcome};
use crate::state::{ArchitecturalState, Register, RunState, StatusWord, CONSTANT_BANK};
use crate::trace::{DiagnosticTrace, TraceConfig};
use crate::AccessFault;

/// Top-level configuration for a machine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MachineConfig {
    /// Initial breakpoint address.
    pub breakpoint: Option<u16>,
    /// Diagnostic trace settings.
    pub trace: TraceConfig,
}

/// Why [`Machine::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum StopReason {
    /// The instruction at the breakpoint retired.
    Breakpoint,
    /// The cancellation flag was observed.
    Cancelled,
    /// The tick limit was reached.
    TickLimit,
}

/// Result of a [`Machine::run`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RunOutcome {
    /// Ticks performed by this call, bubbles included.
    pub ticks: u64,
    /// Stop condition.
    pub stop: StopReason,
}

/// Simulated machine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Machine {
    /// Registers and status word.
    pub state: ArchitecturalState,
    /// Instruction space.
    pub instruction_memory: MemorySpace,
    /// Data space.
    pub data_memory: MemorySpace,
    pipeline: Pipeline,
    breakpoint: Option<u16>,
    trace: DiagnosticTrace,
}

impl Default for Machine {
    fn default() -> Self {
        Self::with_config(&MachineConfig::default())
    }
}

impl Machine {
    /// Creates a machine with zeroed state and memory.
    #[must_use]
    pub fn with_config(config: &MachineConfig) -> Self {
        Self {
            state: ArchitecturalState::default(),
            instruction_memory: MemorySpace::new(Space::Instruction),
            data_memory: MemorySpace::new(Space::Data),
            pipeline: Pipeline::default(),
            breakpoint: config.breakpoint,
            trace: DiagnosticTrace::new(config.trace),
        }
    }

    /// Performs one half-cycle.
    pub fn advance(&mut self) -> TickOutcome {
        let mut cx = TickContext {
            state: &mut self.state,
            instructions: &self.instruction_memory,
            data: &mut self.data_memory,
            breakpoint: self.breakpoint,
            trace: &mut self.trace,
        };
        self.pipeline.tick(&mut cx)
    }

    /// Advances until a breakpoint, cancellation or `max_ticks` calls.
    ///
    /// Cancellation is checked only at instruction boundaries: after a
    /// retirement with no memory transfer outstanding. A set `cancel` flag is
    /// consumed. A breakpoint stops the run as soon as the instruction
    /// retires; a transfer it started completes after [`Machine::resume`].
    /// A machine that is already halted is resumed first.
    pub fn run(&mut self, cancel: &AtomicBool, max_ticks: u64) -> RunOutcome {
        self.pipeline.resume();
        let mut ticks = 0;
        while ticks < max_ticks {
            let outcome = self.advance();
            ticks += 1;
            if self.pipeline.run_state().is_halted() {
                return RunOutcome {
                    ticks,
                    stop: StopReason::Breakpoint,
                };
            }
            if self.pipeline.has_pending_transfer()
                || !matches!(outcome, TickOutcome::Retired { .. })
            {
                continue;
            }
            if cancel.swap(false, Ordering::Relaxed) {
                tracing::debug!("Run cancelled after {} ticks", ticks);
                return RunOutcome {
                    ticks,
                    stop: StopReason::Cancelled,
                };
            }
        }
        RunOutcome {
            ticks,
            stop: StopReason::TickLimit,
        }
    }

    /// Reads a register from the mutable bank.
    ///
    /// # Errors
    ///
    /// Returns [`AccessFault::RegisterOutOfRange`] for an index above 7.
    pub fn register(&self, index: u8) -> Result<u16, AccessFault> {
        Ok(self.state.registers.get(Register::from_index(index)?))
    }

    /// Writes a register in the mutable bank.
    ///
    /// # Errors
    ///
    /// Returns [`AccessFault::RegisterOutOfRange`] for an index above 7.
    pub fn set_register(&mut self, index: u8, value: u16) -> Result<(), AccessFault> {
        let reg = Register::from_index(index)?;
        self.state.registers.set(reg, value);
        Ok(())
    }

    /// Reads an entry of the constant bank.
    ///
    /// # Errors
    ///
    /// Returns [`AccessFault::RegisterOutOfRange`] for an index above 7.
    pub const fn constant(index: u8) -> Result<u16, AccessFault> {
        match Register::from_index(index) {
            Ok(reg) => Ok(CONSTANT_BANK[reg.index()]),
            Err(fault) => Err(fault),
        }
    }

    /// Selects a memory space.
    #[must_use]
    pub const fn memory(&self, space: Space) -> &MemorySpace {
        match space {
            Space::Instruction => &self.instruction_memory,
            Space::Data => &self.data_memory,
        }
    }

    /// Selects a memory space for writing.
    pub const fn memory_mut(&mut self, space: Space) -> &mut MemorySpace {
        match space {
            Space::Instruction => &mut self.instruction_memory,
            Space::Data => &mut self.data_memory,
        }
    }

    /// Status word.
    #[must_use]
    pub const fn status(&self) -> StatusWord {
        self.state.status
    }

    /// Replaces the status word.
    pub const fn set_status(&mut self, status: StatusWord) {
        self.state.status = status;
    }

    /// Sets the breakpoint address.
    pub const fn set_breakpoint(&mut self, address: u16) {
        self.breakpoint = Some(address);
    }

    /// Removes the breakpoint.
    pub const fn clear_breakpoint(&mut self) {
        self.breakpoint = None;
    }

    /// Current breakpoint address.
    #[must_use]
    pub const fn breakpoint(&self) -> Option<u16> {
        self.breakpoint
    }

    /// Fetch address of the most recently retired instruction.
    ///
    /// Injected no-ops do not count; `None` until a fetched instruction retires.
    #[must_use]
    pub const fn last_retired_address(&self) -> Option<u16> {
        self.pipeline.last_retired()
    }

    /// Pipeline clock.
    #[must_use]
    pub const fn clock(&self) -> u64 {
        self.pipeline.clock()
    }

    /// Current run state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.pipeline.run_state()
    }

    /// Clears a breakpoint halt.
    pub const fn resume(&mut self) {
        self.pipeline.resume();
    }

    /// Scheduler state, for inspection.
    #[must_use]
    pub const fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Discards in-flight pipeline work. Registers, memory and the trace are kept.
    ///
    /// Hosts call this after loading a new image and setting `PC`.
    pub fn reset_pipeline(&mut self) {
        self.pipeline.reset();
    }

    /// Diagnostic trace.
    #[must_use]
    pub const fn trace(&self) -> &DiagnosticTrace {
        &self.trace
    }

    /// Diagnostic trace, for clearing or toggling.
    pub const fn trace_mut(&mut self) -> &mut DiagnosticTrace {
        &mut self.trace
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::{Machine, MachineConfig, StopReason};
    use crate::fault::AccessFault;
    use crate::memory::Space;
    use crate::state::{HaltReason, RunState};
    use crate::trace::TraceConfig;

    fn with_program(program: &[u16]) -> Machine {
        let mut machine = Machine::default();
        let image: Vec<u8> = program.iter().flat_map(|w| w.to_le_bytes()).collect();
        machine
            .memory_mut(Space::Instruction)
            .load(0, &image)
            .unwrap();
        machine
    }

    #[test]
    fn register_accessors_reject_out_of_range_indices() {
        let mut machine = Machine::default();
        machine.set_register(7, 0x1000).unwrap();
        assert_eq!(machine.register(7), Ok(0x1000));
        assert_eq!(machine.state.registers.pc(), 0x1000);
        assert_eq!(
            machine.register(8),
            Err(AccessFault::RegisterOutOfRange { index: 8 })
        );
        assert!(machine.set_register(9, 1).is_err());
        assert_eq!(Machine::constant(7), Ok(0xFFFF));
        assert_eq!(Machine::constant(5), Ok(16));
        assert!(Machine::constant(8).is_err());
    }

    #[test]
    fn config_seeds_breakpoint_and_trace() {
        let machine = Machine::with_config(&MachineConfig {
            breakpoint: Some(0x0040),
            trace: TraceConfig {
                enabled: false,
                capacity: 16,
            },
        });
        assert_eq!(machine.breakpoint(), Some(0x0040));
        assert!(!machine.trace().enabled());
    }

    #[test]
    fn run_stops_at_breakpoint_and_resumes() {
        // MOVLZ #1,R0; MOVLZ #2,R1; MOVLZ #3,R2
        let mut machine = with_program(&[0x6808, 0x6811, 0x681A]);
        machine.set_breakpoint(2);
        let cancel = AtomicBool::new(false);

        let outcome = machine.run(&cancel, 100);
        assert_eq!(outcome.stop, StopReason::Breakpoint);
        assert_eq!(outcome.ticks, 6);
        assert_eq!(
            machine.run_state(),
            RunState::Halted(HaltReason::Breakpoint { address: 2 })
        );
        assert_eq!(machine.register(1), Ok(2));
        assert_eq!(machine.register(2), Ok(0));

        machine.clear_breakpoint();
        let outcome = machine.run(&cancel, 2);
        assert_eq!(outcome.stop, StopReason::TickLimit);
        assert_eq!(machine.register(2), Ok(3));
        assert_eq!(machine.last_retired_address(), Some(4));
    }

    #[test]
    fn cancellation_is_consumed_at_an_instruction_boundary() {
        let mut machine = with_program(&[0x6808, 0x6811]);
        let cancel = AtomicBool::new(true);
        let outcome = machine.run(&cancel, 100);
        assert_eq!(outcome.stop, StopReason::Cancelled);
        assert_eq!(outcome.ticks, 2);
        assert!(!cancel.load(Ordering::Relaxed));
    }

    #[test]
    fn reset_pipeline_keeps_architectural_state() {
        let mut machine = with_program(&[0x6808]);
        for _ in 0..4 {
            machine.advance();
        }
        machine.reset_pipeline();
        assert_eq!(machine.clock(), 0);
        assert_eq!(machine.last_retired_address(), None);
        assert_eq!(machine.register(0), Ok(1));
        assert!(!machine.trace().is_empty());
    }
}
