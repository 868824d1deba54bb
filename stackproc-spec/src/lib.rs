//! # Stack Processor Specification
//!
//! The contract shared by the assembler and the runtime: the opcode table,
//! the mnemonic catalog, instruction encoding, and the binary program format.
//!
//! The wire format is fixed: a 16-byte header (`"KITy"` magic, little-endian
//! version word, zero padding) followed by a flat instruction stream of one
//! opcode byte optionally followed by a 4-byte little-endian signed operand.
//!
//! ## Example
//!
//! ```rust
//! use stackproc_spec::{Instruction, Program};
//!
//! let mut program = Program::new();
//! Instruction::Push(7).encode_into(&mut program.code);
//! Instruction::End.encode_into(&mut program.code);
//!
//! let bytes = program.to_bytes();
//! let restored = Program::from_bytes(&bytes).unwrap();
//! assert_eq!(restored.code, program.code);
//! ```

pub mod catalog;
pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;

pub use catalog::Catalog;
pub use error::SpecError;
pub use instruction::Instruction;
pub use opcode::Opcode;
pub use program::{Program, ProgramHeader, HEADER_SIZE, MAGIC, VERSION};

/// Result alias for spec-level failures.
pub type Result<T> = std::result::Result<T, SpecError>;
