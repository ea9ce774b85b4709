//! Program status word.
//!
//! Flags are held as plain booleans; [`StatusWord::to_u16`] and
//! [`StatusWord::from_u16`] convert to and from the packed register image.

/// Packed image bit for carry.
pub const PSW_C: u16 = 1 << 0;
/// Packed image bit for zero.
pub const PSW_Z: u16 = 1 << 1;
/// Packed image bit for negative.
pub const PSW_N: u16 = 1 << 2;
/// Packed image bit for sleep.
pub const PSW_SLP: u16 = 1 << 3;
/// Packed image bit for overflow.
pub const PSW_V: u16 = 1 << 4;
/// Packed image bit for the fault flag.
pub const PSW_FAULT: u16 = 1 << 8;
const CURRENT_PRIORITY_SHIFT: u16 = 5;
const PREVIOUS_PRIORITY_SHIFT: u16 = 13;
const PRIORITY_MASK: u16 = 0x7;

/// Highest priority level; `SETCC` cannot raise sleep at this level.
pub const MAX_PRIORITY: u8 = 7;

/// Condition-flag subset named by a `SETCC`/`CLRCC` mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ConditionMask(u8);

impl ConditionMask {
    /// Carry.
    pub const C: Self = Self(1 << 0);
    /// Zero.
    pub const Z: Self = Self(1 << 1);
    /// Negative.
    pub const N: Self = Self(1 << 2);
    /// Sleep.
    pub const SLP: Self = Self(1 << 3);
    /// Overflow.
    pub const V: Self = Self(1 << 4);

    /// Builds a mask from the 5-bit instruction field.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x1F)
    }

    /// Raw 5-bit field value.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` when every flag in `other` is named by this mask.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of two masks.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `true` for the empty mask.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Condition flags, sleep bit, priorities and fault bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct StatusWord {
    /// Carry.
    pub carry: bool,
    /// Zero.
    pub zero: bool,
    /// Negative.
    pub negative: bool,
    /// Sleep.
    pub sleep: bool,
    /// Signed overflow.
    pub overflow: bool,
    /// Fault in progress.
    pub fault: bool,
    pub(crate) current_priority: u8,
    pub(crate) previous_priority: u8,
}

impl StatusWord {
    /// Current priority (`0..=7`).
    #[must_use]
    pub const fn current_priority(&self) -> u8 {
        self.current_priority
    }

    /// Sets the current priority; values are truncated to three bits.
    pub const fn set_current_priority(&mut self, priority: u8) {
        self.current_priority = priority & MAX_PRIORITY;
    }

    /// Previous priority (`0..=7`).
    #[must_use]
    pub const fn previous_priority(&self) -> u8 {
        self.previous_priority
    }

    /// Sets the previous priority; values are truncated to three bits.
    pub const fn set_previous_priority(&mut self, priority: u8) {
        self.previous_priority = priority & MAX_PRIORITY;
    }

    /// Packs into the 16-bit register image.
    #[must_use]
    pub const fn to_u16(&self) -> u16 {
        let mut image = 0;
        if self.carry {
            image |= PSW_C;
        }
        if self.zero {
            image |= PSW_Z;
        }
        if self.negative {
            image |= PSW_N;
        }
        if self.sleep {
            image |= PSW_SLP;
        }
        if self.overflow {
            image |= PSW_V;
        }
        if self.fault {
            image |= PSW_FAULT;
        }
        image
            | ((self.current_priority as u16) << CURRENT_PRIORITY_SHIFT)
            | ((self.previous_priority as u16) << PREVIOUS_PRIORITY_SHIFT)
    }

    /// Unpacks a 16-bit register image. Reserved bits 9..=12 are dropped.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_u16(image: u16) -> Self {
        Self {
            carry: image & PSW_C != 0,
            zero: image & PSW_Z != 0,
            negative: image & PSW_N != 0,
            sleep: image & PSW_SLP != 0,
            overflow: image & PSW_V != 0,
            fault: image & PSW_FAULT != 0,
            current_priority: ((image >> CURRENT_PRIORITY_SHIFT) & PRIORITY_MASK) as u8,
            previous_priority: ((image >> PREVIOUS_PRIORITY_SHIFT) & PRIORITY_MASK) as u8,
        }
    }

    /// Applies `SETCC`.
    ///
    /// Sleep is forced clear when requested while the current priority is at
    /// its maximum.
    pub const fn set_conditions(&mut self, mask: ConditionMask) {
        if mask.contains(ConditionMask::C) {
            self.carry = true;
        }
        if mask.contains(ConditionMask::Z) {
            self.zero = true;
        }
        if mask.contains(ConditionMask::N) {
            self.negative = true;
        }
        if mask.contains(ConditionMask::V) {
            self.overflow = true;
        }
        if mask.contains(ConditionMask::SLP) {
            self.sleep = self.current_priority != MAX_PRIORITY;
        }
    }

    /// Applies `CLRCC`.
    pub const fn clear_conditions(&mut self, mask: ConditionMask) {
        if mask.contains(ConditionMask::C) {
            self.carry = false;
        }
        if mask.contains(ConditionMask::Z) {
            self.zero = false;
        }
        if mask.contains(ConditionMask::N) {
            self.negative = false;
        }
        if mask.contains(ConditionMask::V) {
            self.overflow = false;
        }
        if mask.contains(ConditionMask::SLP) {
            self.sleep = false;
        }
    }
}
