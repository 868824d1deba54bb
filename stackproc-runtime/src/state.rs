//! Interpreter state

use serde::{Deserialize, Serialize};

/// Why the interpreter stopped fetching instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HaltReason {
    /// END opcode or end of the instruction stream; success.
    End,
    /// ABORT opcode; deliberate abnormal termination.
    Abort,
    /// Configured step limit exhausted.
    StepLimit,
}

impl HaltReason {
    /// True only for a normal END halt.
    pub const fn is_success(self) -> bool {
        matches!(self, HaltReason::End)
    }
}

/// Mutable execution state: a byte cursor into the instruction stream,
/// a step counter, and the halt latch.
#[derive(Debug, Clone)]
pub struct VmState {
    /// Byte offset of the next opcode within the code section.
    pub cursor: usize,

    /// Instructions executed so far.
    pub steps: u64,

    /// Set once; terminal.
    pub halt_reason: Option<HaltReason>,
}

impl VmState {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            steps: 0,
            halt_reason: None,
        }
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halt_reason.is_some()
    }

    /// Latch a halt reason; the first one wins.
    pub fn halt(&mut self, reason: HaltReason) {
        if self.halt_reason.is_none() {
            self.halt_reason = Some(reason);
        }
    }
}

impl Default for VmState {
    fn default() -> Self {
        Self::new()
    }
}
