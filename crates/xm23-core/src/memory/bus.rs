//! Memory bus.
//!
//! The bus performs exactly one access per call and knows nothing about
//! addressing modes; effective-address logic lives in the execute stage.

use super::MemorySpace;

/// Bus control code. Bit 0 selects byte access, bit 1 selects write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum BusControl {
    /// Read a word into the buffer.
    #[default]
    ReadWord = 0,
    /// Read a byte into the low half of the buffer.
    ReadByte = 1,
    /// Write the buffer as a word.
    WriteWord = 2,
    /// Write the low byte of the buffer.
    WriteByte = 3,
}

impl BusControl {
    const BYTE_BIT: u8 = 1 << 0;
    const WRITE_BIT: u8 = 1 << 1;

    /// Builds a control code from its direction and width bits.
    #[must_use]
    pub const fn new(write: bool, byte: bool) -> Self {
        match (write, byte) {
            (false, false) => Self::ReadWord,
            (false, true) => Self::ReadByte,
            (true, false) => Self::WriteWord,
            (true, true) => Self::WriteByte,
        }
    }

    /// Decodes a raw 2-bit control code.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self::new(bits & Self::WRITE_BIT != 0, bits & Self::BYTE_BIT != 0)
    }

    /// Raw 2-bit control code.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Returns `true` for byte-wide accesses.
    #[must_use]
    pub const fn is_byte(self) -> bool {
        self.bits() & Self::BYTE_BIT != 0
    }

    /// Returns `true` for writes.
    #[must_use]
    pub const fn is_write(self) -> bool {
        self.bits() & Self::WRITE_BIT != 0
    }
}

/// Performs one bus access against `space`.
///
/// Reads replace `buffer` (byte reads zero the high half); writes take their
/// data from `buffer`.
pub fn transfer(space: &mut MemorySpace, address: u16, control: BusControl, buffer: &mut u16) {
    match control {
        BusControl::ReadWord => *buffer = space.read_word(address),
        BusControl::ReadByte => *buffer = u16::from(space.read_byte(address)),
        BusControl::WriteWord => space.write_word(address, *buffer),
        BusControl::WriteByte => space.write_byte(address, buffer.to_le_bytes()[0]),
    }
}
