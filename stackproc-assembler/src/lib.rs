//! # Stack Processor Assembler
//!
//! Translate mnemonic source into a binary program, one instruction per
//! line. Lines that fail to parse are skipped with a logged warning; the
//! rest of the file still assembles.
//!
//! ## Example
//!
//! ```rust
//! use stackproc_assembler::assemble;
//!
//! let assembly = assemble("PUSH 3\nPUSH 4\nADD\nOUT\nEND\n");
//! assert!(assembly.is_clean());
//! let bytes = assembly.program.to_bytes();
//! ```

pub mod assembler;
pub mod error;
pub mod lexer;
pub mod listing;
pub mod parser;

pub use assembler::{assemble, Assembly};
pub use error::{AssemblerError, Result};
pub use listing::{Listing, ListingEntry};
pub use parser::parse_line;
