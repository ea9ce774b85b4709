use crate::AccessFault;

/// Number of registers in each bank (`R0..R7`).
pub const REGISTER_COUNT: usize = 8;

/// Read-only values selected when an instruction's `R/C` bit picks the constant bank.
pub const CONSTANT_BANK: [u16; REGISTER_COUNT] = [0, 1, 2, 4, 8, 16, 32, 0xFFFF];

/// Register identifier shared by both banks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Register {
    #[default]
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
}

impl Register {
    /// Base pointer alias.
    pub const BP: Self = Self::R4;
    /// Link register alias.
    pub const LR: Self = Self::R5;
    /// Stack pointer alias.
    pub const SP: Self = Self::R6;
    /// Program counter alias.
    pub const PC: Self = Self::R7;

    /// Ordered list of all register identifiers.
    pub const ALL: [Self; REGISTER_COUNT] = [
        Self::R0,
        Self::R1,
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
        Self::R6,
        Self::R7,
    ];

    /// Returns the array index for this register (`0..=7`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Decodes a 3-bit instruction field; only the low three bits are used.
    #[must_use]
    pub const fn from_u3(bits: u8) -> Self {
        Self::ALL[(bits & 0x7) as usize]
    }

    /// Converts a host-supplied register index.
    ///
    /// # Errors
    ///
    /// Returns [`AccessFault::RegisterOutOfRange`] for indices above 7.
    pub const fn from_index(index: u8) -> Result<Self, AccessFault> {
        if index as usize >= REGISTER_COUNT {
            return Err(AccessFault::RegisterOutOfRange { index });
        }
        Ok(Self::ALL[index as usize])
    }

    /// Assembly name, using the alias for `R4..R7`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::R0 => "R0",
            Self::R1 => "R1",
            Self::R2 => "R2",
            Self::R3 => "R3",
            Self::R4 => "BP",
            Self::R5 => "LR",
            Self::R6 => "SP",
            Self::R7 => "PC",
        }
    }
}

/// Source-operand bank selected by the `R/C` bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum OperandBank {
    /// Mutable register bank.
    #[default]
    Register,
    /// Fixed constant bank.
    Constant,
}

impl OperandBank {
    /// Decodes the `R/C` bit.
    #[must_use]
    pub const fn from_bit(bit: bool) -> Self {
        if bit {
            Self::Constant
        } else {
            Self::Register
        }
    }

    /// Encodes back to the `R/C` bit.
    #[must_use]
    pub const fn bit(self) -> bool {
        matches!(self, Self::Constant)
    }
}

/// Mutable register bank. The constant bank is not stored; it is [`CONSTANT_BANK`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterFile {
    values: [u16; REGISTER_COUNT],
}

impl RegisterFile {
    /// Reads a register from the mutable bank.
    #[must_use]
    pub const fn get(&self, reg: Register) -> u16 {
        self.values[reg.index()]
    }

    /// Writes a register in the mutable bank.
    pub const fn set(&mut self, reg: Register, value: u16) {
        self.values[reg.index()] = value;
    }

    /// Replaces only the low byte of a register.
    pub const fn set_low_byte(&mut self, reg: Register, byte: u8) {
        let current = self.values[reg.index()];
        self.values[reg.index()] = (current & 0xFF00) | byte as u16;
    }

    /// Replaces only the high byte of a register.
    pub const fn set_high_byte(&mut self, reg: Register, byte: u8) {
        let current = self.values[reg.index()];
        self.values[reg.index()] = (current & 0x00FF) | ((byte as u16) << 8);
    }

    /// Reads a source operand from the bank named by `bank`.
    #[must_use]
    pub const fn operand(&self, bank: OperandBank, reg: Register) -> u16 {
        match bank {
            OperandBank::Register => self.values[reg.index()],
            OperandBank::Constant => CONSTANT_BANK[reg.index()],
        }
    }

    /// Program counter (`R7`).
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.get(Register::PC)
    }

    /// Writes the program counter (`R7`).
    pub const fn set_pc(&mut self, value: u16) {
        self.set(Register::PC, value);
    }

    /// Link register (`R5`).
    #[must_use]
    pub const fn lr(&self) -> u16 {
        self.get(Register::LR)
    }

    /// Snapshot of all eight mutable registers.
    #[must_use]
    pub const fn values(&self) -> [u16; REGISTER_COUNT] {
        self.values
    }
}
