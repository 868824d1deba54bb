//! # Error Types for the Shared Specification

use crate::opcode::Opcode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecError {
    // Program format errors
    #[error("invalid program magic: expected \"KITy\", got {found:?}")]
    InvalidMagic { found: [u8; 4] },

    #[error("unsupported program version {found}: this build supports up to {supported}")]
    UnsupportedVersion { found: i32, supported: i32 },

    #[error("truncated header: expected {expected} bytes, found {found}")]
    TruncatedHeader { expected: usize, found: usize },

    // Instruction stream errors
    #[error("unexpected end of instruction stream")]
    UnexpectedEof,

    #[error("illegal opcode byte {0:#04x}")]
    IllegalOpcode(u8),

    #[error("truncated operand for {opcode}: needed {needed} bytes, {available} available")]
    TruncatedOperand {
        opcode: Opcode,
        needed: usize,
        available: usize,
    },
}
