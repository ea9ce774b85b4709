use core::fmt;

use super::{new_address_space, ADDRESS_SPACE_BYTES};
use crate::AccessFault;

/// Which of the two independent memory spaces an access targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Space {
    /// Instruction memory, read by fetch.
    Instruction,
    /// Data memory, read and written by load/store.
    Data,
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instruction => f.write_str("instruction"),
            Self::Data => f.write_str("data"),
        }
    }
}

/// One 64 KiB memory space.
///
/// Word accesses use the word index `address >> 1`, so an odd address
/// selects the word that contains it. Words are stored little-endian.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MemorySpace {
    kind: Space,
    bytes: Box<[u8]>,
}

impl fmt::Debug for MemorySpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySpace")
            .field("kind", &self.kind)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl MemorySpace {
    /// Allocates a zeroed space.
    #[must_use]
    pub fn new(kind: Space) -> Self {
        Self {
            kind,
            bytes: new_address_space(),
        }
    }

    /// Which space this is.
    #[must_use]
    pub const fn kind(&self) -> Space {
        self.kind
    }

    /// Reads one byte.
    #[must_use]
    pub fn read_byte(&self, address: u16) -> u8 {
        self.bytes[usize::from(address)]
    }

    /// Writes one byte.
    pub fn write_byte(&mut self, address: u16, value: u8) {
        self.bytes[usize::from(address)] = value;
    }

    /// Reads the word containing `address`.
    #[must_use]
    pub fn read_word(&self, address: u16) -> u16 {
        let base = usize::from(address & !1);
        u16::from_le_bytes([self.bytes[base], self.bytes[base + 1]])
    }

    /// Writes the word containing `address`.
    pub fn write_word(&mut self, address: u16, value: u16) {
        let base = usize::from(address & !1);
        let [low, high] = value.to_le_bytes();
        self.bytes[base] = low;
        self.bytes[base + 1] = high;
    }

    /// Copies `image` into the space starting at `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessFault::AddressOutOfRange`] when the image would run
    /// past the end of the space. Nothing is written in that case.
    pub fn load(&mut self, origin: u16, image: &[u8]) -> Result<(), AccessFault> {
        let range = self.span(origin, image.len())?;
        self.bytes[range].copy_from_slice(image);
        Ok(())
    }

    /// Borrows `len` bytes starting at `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessFault::AddressOutOfRange`] when the span would run
    /// past the end of the space.
    pub fn slice(&self, origin: u16, len: usize) -> Result<&[u8], AccessFault> {
        let range = self.span(origin, len)?;
        Ok(&self.bytes[range])
    }

    /// Zeroes every byte.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    fn span(&self, origin: u16, len: usize) -> Result<core::ops::Range<usize>, AccessFault> {
        let start = usize::from(origin);
        match start.checked_add(len) {
            Some(end) if end <= ADDRESS_SPACE_BYTES => Ok(start..end),
            _ => Err(AccessFault::AddressOutOfRange {
                space: self.kind,
                address: origin,
                len,
            }),
        }
    }
}
