//! Per-tick diagnostic trace.
//!
//! The trace is observational only: the scheduler appends one record per
//! half-cycle and nothing in the execution path reads it back.

use std::collections::VecDeque;
use std::fmt;

/// Default number of records kept before the oldest are dropped.
pub const DEFAULT_TRACE_CAPACITY: usize = 500_000;

/// Pipeline stage that was active during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Stage {
    /// Fetch phase one: `PC` latched into the instruction address register.
    F0,
    /// Fetch phase two: instruction word read into the instruction register.
    F1,
    /// Decode.
    D0,
    /// Execute phase one.
    E0,
    /// Execute phase two (memory transfer).
    E1,
}

impl Stage {
    /// Short tag used in rendered trace lines.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::F0 => "F0",
            Self::F1 => "F1",
            Self::D0 => "D0",
            Self::E0 => "E0",
            Self::E1 => "E1",
        }
    }
}

/// A stage together with the word it handled.
///
/// For `F0` the word is the fetch address; for every other stage it is an
/// instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct StageTag {
    /// Active stage.
    pub stage: Stage,
    /// Address or instruction word.
    pub word: u16,
}

impl fmt::Display for StageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:04X}", self.stage.tag(), self.word)
    }
}

/// One half-cycle of pipeline activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TraceRecord {
    /// Clock value at the start of the tick.
    pub clock: u64,
    /// Program counter at the end of the tick.
    pub pc: u16,
    /// Instruction register at the end of the tick.
    pub instruction: u16,
    /// Fetch stage, if it ran.
    pub fetch: Option<StageTag>,
    /// Decode stage, if it ran.
    pub decode: Option<StageTag>,
    /// Execute stage, if it ran.
    pub execute: Option<StageTag>,
}

impl TraceRecord {
    /// Iterates the active stages in pipeline order.
    pub fn stages(&self) -> impl Iterator<Item = StageTag> + '_ {
        [self.fetch, self.decode, self.execute].into_iter().flatten()
    }
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>8}  PC:{:04X}  IR:{:04X}",
            self.clock, self.pc, self.instruction
        )?;
        for tag in self.stages() {
            write!(f, "  {tag}")?;
        }
        Ok(())
    }
}

/// Trace switch and bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TraceConfig {
    /// Records ticks when `true`.
    pub enabled: bool,
    /// Maximum number of records retained.
    pub capacity: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: DEFAULT_TRACE_CAPACITY,
        }
    }
}

/// Bounded, ordered log of [`TraceRecord`]s.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DiagnosticTrace {
    config: TraceConfig,
    records: VecDeque<TraceRecord>,
}

impl DiagnosticTrace {
    /// Creates an empty trace.
    #[must_use]
    pub const fn new(config: TraceConfig) -> Self {
        Self {
            config,
            records: VecDeque::new(),
        }
    }

    /// Returns `true` when ticks are being recorded.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.config.enabled && self.config.capacity > 0
    }

    /// Enables or disables recording. Existing records are kept.
    pub const fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    /// Appends a record, dropping the oldest one when full.
    pub(crate) fn push(&mut self, record: TraceRecord) {
        if !self.enabled() {
            return;
        }
        if self.records.len() == self.config.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Iterates records oldest first. Each call starts from the beginning.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TraceRecord> + Clone + '_ {
        self.records.iter()
    }

    /// Most recent record.
    #[must_use]
    pub fn last(&self) -> Option<&TraceRecord> {
        self.records.back()
    }

    /// Number of retained records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when no records are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl<'a> IntoIterator for &'a DiagnosticTrace {
    type Item = &'a TraceRecord;
    type IntoIter = std::collections::vec_deque::Iter<'a, TraceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
