//! # Stack Processor Runtime
//!
//! Execute stack processor binaries on an integrity-checked stack.
//!
//! The interpreter fetches one opcode at a time from the raw instruction
//! stream and applies it to a growable stack that validates itself before
//! every mutation. Guard cells, poisoned free slots, and a rolling
//! checksum turn silent memory tampering into a typed
//! [`RuntimeError::CorruptState`].
//!
//! ## Example
//!
//! ```rust
//! use stackproc_runtime::{Vm, VmConfig};
//! use stackproc_spec::{Instruction, Program};
//!
//! let mut program = Program::new();
//! for instruction in [
//!     Instruction::Push(3),
//!     Instruction::Push(4),
//!     Instruction::Add,
//!     Instruction::Out,
//!     Instruction::End,
//! ] {
//!     instruction.encode_into(&mut program.code);
//! }
//!
//! let result = Vm::new(program, VmConfig::default()).unwrap().run().unwrap();
//! assert_eq!(result.outputs, vec![7]);
//! ```

pub mod error;
pub mod execute;
pub mod io;
pub mod stack;
pub mod state;
pub mod vm;

pub use error::{Result, RuntimeError};
pub use io::IoHandler;
pub use stack::{Cell, Stack, StackDump, StackError, StackStatus, GROWTH_FACTOR, GUARD, POISON};
pub use state::{HaltReason, VmState};
pub use vm::{run, ExecutionResult, Vm, VmConfig};
