//! Runtime error types

use crate::stack::StackStatus;
use stackproc_spec::SpecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The binary header was rejected before execution started.
    #[error("invalid program header: {0}")]
    Header(#[source] SpecError),

    /// The instruction stream could not be decoded at `offset`.
    #[error("decode failure at offset {offset:#06x}: {source}")]
    Decode {
        offset: usize,
        #[source]
        source: SpecError,
    },

    /// An opcode byte outside the instruction set.
    #[error("illegal opcode {opcode:#04x} at offset {offset:#06x}")]
    IllegalOpcode { opcode: u8, offset: usize },

    /// An instruction needed more operands than the stack held.
    #[error("stack underflow executing {opcode} at offset {offset:#06x}")]
    StackUnderflow {
        opcode: stackproc_spec::Opcode,
        offset: usize,
    },

    /// The stack failed its integrity check between instructions.
    #[error("stack corruption detected at offset {offset:#06x}: {status}")]
    CorruptState { status: StackStatus, offset: usize },

    /// DIV with a zero divisor.
    #[error("division by zero at offset {offset:#06x}")]
    DivisionByZero { offset: usize },

    /// The stack buffer could not be allocated.
    #[error("failed to allocate stack buffer for {capacity} cells")]
    Allocation { capacity: usize },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
