//! Addressing-mode and memory-access unit.
//!
//! Loads and stores run in two phases. Phase one computes the effective
//! address, applies any pre-adjustment and latches the bus control code.
//! Phase two, one clock tick later, performs the bus transfer and any
//! post-adjustment.

use crate::encoding::{Opcode, OperandFields, Width};
use crate::memory::{transfer, BusControl, MemorySpace};
use crate::state::{ArchitecturalState, Register};

/// Data-side pipeline latches: effective address, data buffer and control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DataLatches {
    /// Effective address of the pending or last transfer.
    pub address: u16,
    /// Data moved by the last transfer.
    pub buffer: u16,
    /// Control code of the pending or last transfer.
    pub control: BusControl,
}

/// Register adjustment deferred until after the transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterAdjust {
    /// Register to adjust.
    pub register: Register,
    /// Signed byte step.
    pub step: i16,
}

impl RegisterAdjust {
    #[allow(clippy::cast_sign_loss)]
    fn apply(self, state: &mut ArchitecturalState) {
        let value = state.registers.get(self.register);
        state
            .registers
            .set(self.register, value.wrapping_add(self.step as u16));
    }
}

/// Phase-two work recorded by phase one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PendingTransfer {
    /// Word of the instruction that started the transfer.
    pub word: u16,
    /// Register loaded into, or stored from.
    pub data_register: Register,
    /// Post-mode adjustment of the address register.
    pub post_adjust: Option<RegisterAdjust>,
}

/// Phase one of `LD`, `ST`, `LDR` and `STR`.
///
/// `LD` addresses through the source register and loads the destination;
/// `ST` addresses through the destination and stores the source. The
/// relative forms add the signed offset to the same address register
/// without modifying it. Returns `None` for any other opcode.
#[allow(clippy::cast_sign_loss)]
pub fn begin(
    opcode: Opcode,
    word: u16,
    fields: &OperandFields,
    state: &mut ArchitecturalState,
    latches: &mut DataLatches,
) -> Option<PendingTransfer> {
    let (write, address_register, data_register) = match opcode {
        Opcode::Ld | Opcode::Ldr => (false, fields.source, fields.destination),
        Opcode::St | Opcode::Str => (true, fields.destination, fields.source),
        _ => return None,
    };

    let base = state.registers.get(address_register);
    let mut post_adjust = None;
    let address = if matches!(opcode, Opcode::Ld | Opcode::St) {
        let adjust = RegisterAdjust {
            register: address_register,
            step: fields.mode.step(fields.width),
        };
        if fields.mode.pre {
            adjust.apply(state);
            state.registers.get(address_register)
        } else {
            if adjust.step != 0 {
                post_adjust = Some(adjust);
            }
            base
        }
    } else {
        base.wrapping_add(i16::from(fields.relative_offset) as u16)
    };

    latches.address = address;
    latches.control = BusControl::new(write, fields.width == Width::Byte);
    Some(PendingTransfer {
        word,
        data_register,
        post_adjust,
    })
}

/// Phase two: drives the bus and applies any post-adjustment.
///
/// Byte loads zero-extend into the data register.
pub fn complete(
    pending: &PendingTransfer,
    state: &mut ArchitecturalState,
    data: &mut MemorySpace,
    latches: &mut DataLatches,
) {
    let control = latches.control;
    if control.is_write() {
        latches.buffer = state.registers.get(pending.data_register);
    }
    transfer(data, latches.address, control, &mut latches.buffer);
    if !control.is_write() {
        state.registers.set(pending.data_register, latches.buffer);
    }
    if let Some(adjust) = pending.post_adjust {
        adjust.apply(state);
    }
}
