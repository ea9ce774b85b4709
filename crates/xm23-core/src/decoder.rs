//! Instruction decoder.
//!
//! Turns a raw 16-bit word into a [`Decoded`] outcome. Classification is a
//! lookup in the encoding table; this module adds the one hardware
//! short-circuit that rewrites an instruction before it reaches execute.

use crate::encoding::{classify, encode, Opcode, OperandFields, NOP_WORD};
use crate::state::Register;

/// Decoded instruction ready for execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DecodedInstruction {
    /// Operation kind.
    pub opcode: Opcode,
    /// Word the operation was decoded from.
    pub word: u16,
    /// Operand fields for `opcode`'s layout.
    pub fields: OperandFields,
}

impl DecodedInstruction {
    /// The canonical no-op, `MOV R0,R0`.
    pub const NOP: Self = Self {
        opcode: Opcode::Mov,
        word: NOP_WORD,
        fields: OperandFields::extract(Opcode::Mov, NOP_WORD),
    };

    /// Builds an instruction from an opcode and fields via the reference encoder.
    #[must_use]
    pub fn new(opcode: Opcode, fields: OperandFields) -> Self {
        let word = encode(opcode, &fields);
        Self {
            opcode,
            word,
            fields: OperandFields::extract(opcode, word),
        }
    }

    /// Returns `true` for the canonical no-op word.
    #[must_use]
    pub const fn is_nop(&self) -> bool {
        self.word == NOP_WORD
    }
}

/// Outcome of decoding one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Decoded {
    /// Recognised instruction.
    Instruction(DecodedInstruction),
    /// Word with no leaf in the decode table; executes as nothing.
    Unrecognized(u16),
}

impl Decoded {
    /// Returns the decoded instruction if present.
    #[must_use]
    pub const fn instruction(self) -> Option<DecodedInstruction> {
        match self {
            Self::Instruction(instruction) => Some(instruction),
            Self::Unrecognized(_) => None,
        }
    }

    /// Word this outcome was produced from (after any short-circuit rewrite).
    #[must_use]
    pub const fn word(self) -> u16 {
        match self {
            Self::Instruction(instruction) => instruction.word,
            Self::Unrecognized(word) => word,
        }
    }

    /// Returns `true` for an unrecognised word.
    #[must_use]
    pub const fn is_unrecognized(self) -> bool {
        matches!(self, Self::Unrecognized(_))
    }
}

/// Instruction decoder.
pub struct Decoder;

impl Decoder {
    /// Decodes a 16-bit instruction word.
    ///
    /// `ADD` with `PC` as its destination is replaced by the no-op; no other
    /// instruction targeting `PC` is affected.
    #[must_use]
    pub fn decode(word: u16) -> Decoded {
        let Some(opcode) = classify(word) else {
            tracing::warn!("Unrecognized instruction word {:#06x}", word);
            return Decoded::Unrecognized(word);
        };

        let fields = OperandFields::extract(opcode, word);
        if opcode == Opcode::Add && fields.destination == Register::PC {
            tracing::debug!("ADD to PC ({:#06x}) short-circuited to NOP", word);
            return Decoded::Instruction(DecodedInstruction::NOP);
        }

        Decoded::Instruction(DecodedInstruction {
            opcode,
            word,
            fields,
        })
    }
}
