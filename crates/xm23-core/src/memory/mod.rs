//! Memory spaces and the bus that moves data between them and the core.

/// Single-access memory bus driven by control codes.
pub mod bus;
/// 64 KiB byte/word-addressable memory space.
pub mod space;

pub use bus::{transfer, BusControl};
pub use space::{MemorySpace, Space};

/// Size in bytes of one architectural address space (64 KiB).
pub const ADDRESS_SPACE_BYTES: usize = u16::MAX as usize + 1;

/// Allocates a zeroed 64 KiB backing store.
#[must_use]
pub fn new_address_space() -> Box<[u8]> {
    vec![0; ADDRESS_SPACE_BYTES].into_boxed_slice()
}
