//! Assembler errors
//!
//! Every variant is recoverable at the file level: the offending line is
//! skipped with a warning and assembly continues.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssemblerError {
    #[error("line {line}: unknown mnemonic \"{mnemonic}\"")]
    UnknownMnemonic { line: usize, mnemonic: String },

    #[error("line {line}: {mnemonic} requires an integer operand")]
    MissingOperand { line: usize, mnemonic: &'static str },

    #[error("line {line}: expected integer operand, found \"{found}\"")]
    InvalidOperand { line: usize, found: String },

    #[error("line {line}: operand {value} does not fit a 32-bit signed integer")]
    OperandOutOfRange { line: usize, value: i64 },

    #[error("line {line}: syntax error: {message}")]
    SyntaxError { line: usize, message: String },
}

impl AssemblerError {
    /// Source line (1-based) the error refers to.
    pub fn line(&self) -> usize {
        match self {
            AssemblerError::UnknownMnemonic { line, .. }
            | AssemblerError::MissingOperand { line, .. }
            | AssemblerError::InvalidOperand { line, .. }
            | AssemblerError::OperandOutOfRange { line, .. }
            | AssemblerError::SyntaxError { line, .. } => *line,
        }
    }
}

pub type Result<T> = std::result::Result<T, AssemblerError>;
