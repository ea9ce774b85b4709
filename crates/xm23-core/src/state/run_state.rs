/// Host-observable execution state of a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Clock ticks make progress.
    #[default]
    Running,
    /// Stopped until [`crate::Machine::resume`] is called.
    Halted(HaltReason),
}

/// Why a machine stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum HaltReason {
    /// The instruction at the configured breakpoint address retired.
    Breakpoint {
        /// Address of the retired instruction.
        address: u16,
    },
}

impl RunState {
    /// Returns `true` when ticks make no progress.
    #[must_use]
    pub const fn is_halted(self) -> bool {
        matches!(self, Self::Halted(_))
    }

    /// Returns the halt reason, if halted.
    #[must_use]
    pub const fn halt_reason(self) -> Option<HaltReason> {
        match self {
            Self::Halted(reason) => Some(reason),
            Self::Running => None,
        }
    }
}
