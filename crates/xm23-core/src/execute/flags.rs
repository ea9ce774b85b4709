//! Status-word update rules for the different instruction classes.

use crate::encoding::Width;
use crate::state::StatusWord;

/// Carry out, indexed `[source msb][destination msb][result msb]`.
const CARRY_TABLE: [[[bool; 2]; 2]; 2] =
    [[[false, false], [true, false]], [[true, false], [true, true]]];
/// Signed overflow, indexed like [`CARRY_TABLE`].
const OVERFLOW_TABLE: [[[bool; 2]; 2]; 2] =
    [[[false, true], [false, false]], [[false, false], [true, false]]];

/// Describes how the status word changes after an instruction executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagsUpdate {
    /// No change.
    #[default]
    None,
    /// Arithmetic rule: all four condition flags from the operands and result.
    Arithmetic {
        /// Operand actually added to the destination.
        source: u16,
        /// Destination before the operation.
        destination: u16,
        /// Unmasked result.
        result: u16,
        /// Operand width.
        width: Width,
    },
    /// Logical rule: negative and zero both follow the result's sign bit
    /// (`Z = !N`); carry and overflow kept.
    Logical {
        /// Unmasked result.
        result: u16,
        /// Operand width.
        width: Width,
    },
    /// Only the zero flag changes.
    Zero(bool),
    /// Only the carry flag changes.
    Carry(bool),
}

impl FlagsUpdate {
    /// Applies this update to `status`.
    pub fn apply(self, status: &mut StatusWord) {
        match self {
            Self::None => {}
            Self::Arithmetic {
                source,
                destination,
                result,
                width,
            } => {
                let mss = msb(source, width);
                let msd = msb(destination, width);
                let msr = msb(result, width);
                status.carry = CARRY_TABLE[mss][msd][msr];
                status.overflow = OVERFLOW_TABLE[mss][msd][msr];
                status.zero = result & width.mask() == 0;
                status.negative = msr == 1;
            }
            Self::Logical { result, width } => {
                let negative = msb(result, width) == 1;
                status.negative = negative;
                status.zero = !negative;
            }
            Self::Zero(zero) => status.zero = zero,
            Self::Carry(carry) => status.carry = carry,
        }
    }
}

fn msb(value: u16, width: Width) -> usize {
    usize::from((value >> width.msb()) & 1 != 0)
}

#[cfg(test)]
mod tests {
    use super::FlagsUpdate;
    use crate::encoding::Width;
    use crate::state::StatusWord;

    fn arithmetic(source: u16, destination: u16, result: u16, width: Width) -> StatusWord {
        let mut status = StatusWord::default();
        FlagsUpdate::Arithmetic {
            source,
            destination,
            result,
            width,
        }
        .apply(&mut status);
        status
    }

    #[test]
    fn signed_overflow_into_the_sign_bit() {
        let status = arithmetic(0x0001, 0x7FFF, 0x8000, Width::Word);
        assert!(status.overflow);
        assert!(!status.carry);
        assert!(status.negative);
        assert!(!status.zero);
    }

    #[test]
    fn unsigned_carry_out_of_the_top_bit() {
        let status = arithmetic(0xFFFF, 0x0001, 0x0000, Width::Word);
        assert!(status.carry);
        assert!(status.zero);
        assert!(!status.overflow);
        assert!(!status.negative);
    }

    #[test]
    fn byte_mode_keys_on_bit_seven_and_masks_zero() {
        let status = arithmetic(0x0080, 0x0080, 0x0100, Width::Byte);
        assert!(status.carry);
        assert!(status.overflow);
        assert!(status.zero);
    }

    #[test]
    fn logical_rule_leaves_carry_and_overflow() {
        let mut status = StatusWord {
            carry: true,
            overflow: true,
            ..StatusWord::default()
        };
        FlagsUpdate::Logical {
            result: 0x0080,
            width: Width::Byte,
        }
        .apply(&mut status);
        assert!(status.negative);
        assert!(!status.zero);
        assert!(status.carry && status.overflow);

        FlagsUpdate::Logical {
            result: 0xFF00,
            width: Width::Byte,
        }
        .apply(&mut status);
        assert!(status.zero);
        assert!(!status.negative);
    }

    #[test]
    fn logical_zero_tracks_the_sign_bit_not_the_value() {
        let mut status = StatusWord::default();
        FlagsUpdate::Logical {
            result: 0x0001,
            width: Width::Word,
        }
        .apply(&mut status);
        assert!(status.zero);
        assert!(!status.negative);

        FlagsUpdate::Logical {
            result: 0x8000,
            width: Width::Word,
        }
        .apply(&mut status);
        assert!(!status.zero);
        assert!(status.negative);
    }

    #[test]
    fn none_changes_nothing() {
        let mut status = StatusWord::from_u16(0x001F);
        FlagsUpdate::None.apply(&mut status);
        assert_eq!(status.to_u16(), 0x001F);
    }
}
