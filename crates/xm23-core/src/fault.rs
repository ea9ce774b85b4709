use thiserror::Error;

use crate::memory::Space;

/// Failures raised at the register/memory boundary.
///
/// Execution units are total over their typed inputs; only host-facing
/// accessors that take untyped indices or spans can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AccessFault {
    /// Register index outside `0..=7`.
    #[error("register index {index} is outside R0..R7")]
    RegisterOutOfRange {
        /// Index that was requested.
        index: u8,
    },
    /// Multi-byte access that would run past the end of a 64 KiB space.
    #[error("{space} memory access at {address:#06x} of {len} bytes runs past the end of the space")]
    AddressOutOfRange {
        /// Memory space that was targeted.
        space: Space,
        /// First byte address of the access.
        address: u16,
        /// Length of the access in bytes.
        len: usize,
    },
}
