//! Interpreter loop
//!
//! A [`Vm`] moves through four states: loading (header validation),
//! executing (the fetch/check/decode/apply loop), halted (END, stream
//! end, or the step limit) and failed (any [`RuntimeError`]). `run`
//! consumes the machine, so a terminal state cannot be resumed.

use crate::error::{Result, RuntimeError};
use crate::execute::execute;
use crate::io::IoHandler;
use crate::stack::{Cell, Stack, StackError};
use crate::state::{HaltReason, VmState};
use serde::{Deserialize, Serialize};
use stackproc_spec::{Instruction, Program, SpecError};
use tracing::{debug, error};

/// Tunable execution limits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VmConfig {
    /// Upper bound on executed instructions; a program still running at
    /// the limit halts with [`HaltReason::StepLimit`].
    pub max_steps: u64,

    /// Cells pre-allocated for the execution stack.
    pub initial_stack_capacity: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_steps: 1_000_000,
            initial_stack_capacity: 1024,
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Instructions executed.
    pub steps: u64,
    /// Values emitted by OUT, in program order.
    pub outputs: Vec<Cell>,
    /// Why execution stopped.
    pub halt_reason: HaltReason,
}

impl ExecutionResult {
    /// True for a normal END halt; ABORT and the step limit are
    /// completed-but-unsuccessful runs.
    pub fn is_success(&self) -> bool {
        self.halt_reason.is_success()
    }
}

/// The stack processor interpreter.
#[derive(Debug)]
pub struct Vm {
    program: Program,
    stack: Stack,
    io: IoHandler,
    state: VmState,
    config: VmConfig,
}

impl Vm {
    /// Build a machine around an already-parsed program.
    pub fn new(program: Program, config: VmConfig) -> Result<Self> {
        let stack = Stack::new(config.initial_stack_capacity).map_err(|e| match e {
            StackError::Allocation { capacity } => RuntimeError::Allocation { capacity },
            StackError::Empty | StackError::Corrupt(_) => {
                RuntimeError::Allocation {
                    capacity: config.initial_stack_capacity,
                }
            }
        })?;

        Ok(Self {
            program,
            stack,
            io: IoHandler::new(),
            state: VmState::new(),
            config,
        })
    }

    /// Parse and validate a binary image, then build the machine.
    ///
    /// The header is checked in full before any instruction byte is
    /// looked at; a bad magic or a too-new version never starts a run.
    pub fn load(bytes: &[u8], config: VmConfig) -> Result<Self> {
        let program = Program::from_bytes(bytes).map_err(RuntimeError::Header)?;
        debug!(
            version = program.header.version,
            code_len = program.code.len(),
            "program loaded"
        );
        Self::new(program, config)
    }

    /// Run to completion, consuming the machine.
    pub fn run(mut self) -> Result<ExecutionResult> {
        while !self.state.is_halted() {
            if self.state.steps >= self.config.max_steps {
                debug!(steps = self.state.steps, "step limit reached");
                self.state.halt(HaltReason::StepLimit);
                break;
            }

            let offset = self.state.cursor;
            let Some(window) = self.program.code.get(offset..) else {
                self.state.halt(HaltReason::End);
                break;
            };
            if window.is_empty() {
                // Running off the end of the stream is a normal halt.
                self.state.halt(HaltReason::End);
                break;
            }

            let status = self.stack.status();
            if !status.is_clean() {
                error!(%status, offset, "halting on corrupt stack\n{}", self.stack.dump());
                return Err(RuntimeError::CorruptState { status, offset });
            }

            let (instruction, len) = Instruction::decode(window).map_err(|e| match e {
                SpecError::IllegalOpcode(opcode) => RuntimeError::IllegalOpcode { opcode, offset },
                source => RuntimeError::Decode { offset, source },
            })?;

            self.state.steps += 1;
            if let Err(err) = execute(
                &instruction,
                offset,
                &mut self.stack,
                &mut self.io,
                &mut self.state,
            ) {
                if let RuntimeError::CorruptState { .. } = err {
                    error!(offset, "stack corrupted mid-instruction\n{}", self.stack.dump());
                }
                return Err(err);
            }
            self.state.cursor = offset + len;
        }

        let halt_reason = self.state.halt_reason.unwrap_or(HaltReason::End);
        debug!(
            steps = self.state.steps,
            outputs = self.io.outputs().len(),
            ?halt_reason,
            "run finished"
        );

        Ok(ExecutionResult {
            steps: self.state.steps,
            outputs: self.io.into_outputs(),
            halt_reason,
        })
    }
}

/// Load and run a binary image in one call with default limits.
pub fn run(bytes: &[u8]) -> Result<ExecutionResult> {
    Vm::load(bytes, VmConfig::default())?.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(instructions: &[Instruction]) -> Program {
        let mut program = Program::new();
        for instruction in instructions {
            instruction.encode_into(&mut program.code);
        }
        program
    }

    fn run_instructions(instructions: &[Instruction]) -> Result<ExecutionResult> {
        Vm::new(program(instructions), VmConfig::default())?.run()
    }

    #[test]
    fn test_push_add_out_end() {
        let result = run_instructions(&[
            Instruction::Push(3),
            Instruction::Push(4),
            Instruction::Add,
            Instruction::Out,
            Instruction::End,
        ])
        .unwrap();

        assert!(result.is_success());
        assert_eq!(result.outputs, vec![7]);
        assert_eq!(result.steps, 5);
        assert_eq!(result.halt_reason, HaltReason::End);
    }

    #[test]
    fn test_end_of_stream_halts_successfully() {
        let result = run_instructions(&[Instruction::Push(1), Instruction::Pop]).unwrap();
        assert!(result.is_success());
        assert_eq!(result.halt_reason, HaltReason::End);
        assert_eq!(result.steps, 2);
    }

    #[test]
    fn test_empty_program_is_success() {
        let result = run_instructions(&[]).unwrap();
        assert!(result.is_success());
        assert_eq!(result.steps, 0);
        assert!(result.outputs.is_empty());
    }

    #[test]
    fn test_abort_is_completed_but_unsuccessful() {
        let result =
            run_instructions(&[Instruction::Push(1), Instruction::Abort, Instruction::Out])
                .unwrap();

        assert!(!result.is_success());
        assert_eq!(result.halt_reason, HaltReason::Abort);
        // Nothing after ABORT executes.
        assert!(result.outputs.is_empty());
    }

    #[test]
    fn test_nothing_executes_after_end() {
        let result = run_instructions(&[
            Instruction::Push(1),
            Instruction::End,
            Instruction::Out,
            Instruction::Out,
        ])
        .unwrap();

        assert!(result.outputs.is_empty());
        assert_eq!(result.steps, 2);
    }

    #[test]
    fn test_illegal_opcode_fails_with_offset() {
        let mut program = Program::new();
        program.code = Instruction::Push(1).encode();
        program.code.push(0xff);

        let err = Vm::new(program, VmConfig::default())
            .unwrap()
            .run()
            .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::IllegalOpcode {
                opcode: 0xff,
                offset: 5,
            }
        ));
    }

    #[test]
    fn test_truncated_operand_fails_decode() {
        // PUSH opcode followed by only two of its four operand bytes.
        let mut program = Program::new();
        program.code = vec![0x01, 0xaa, 0xbb];

        let err = Vm::new(program, VmConfig::default())
            .unwrap()
            .run()
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Decode { offset: 0, .. }));
    }

    #[test]
    fn test_step_limit_halts_runaway_program() {
        // PUSH/POP forever, no terminator.
        let mut instructions = Vec::new();
        for _ in 0..100 {
            instructions.push(Instruction::Push(1));
            instructions.push(Instruction::Pop);
        }

        let config = VmConfig {
            max_steps: 17,
            ..VmConfig::default()
        };
        let result = Vm::new(program(&instructions), config).unwrap().run().unwrap();

        assert_eq!(result.halt_reason, HaltReason::StepLimit);
        assert!(!result.is_success());
        assert_eq!(result.steps, 17);
    }

    #[test]
    fn test_load_rejects_bad_magic_before_decoding() {
        let mut bytes = program(&[Instruction::End]).to_bytes();
        bytes[0] = b'X';

        let err = Vm::load(&bytes, VmConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Header(SpecError::InvalidMagic { .. })
        ));
    }

    #[test]
    fn test_load_rejects_newer_version() {
        let mut bytes = program(&[Instruction::End]).to_bytes();
        bytes[4..8].copy_from_slice(&2i32.to_le_bytes());

        let err = Vm::load(&bytes, VmConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Header(SpecError::UnsupportedVersion { found: 2, .. })
        ));
    }

    #[test]
    fn test_load_then_run_roundtrip() {
        let bytes = program(&[
            Instruction::Push(21),
            Instruction::Dup,
            Instruction::Add,
            Instruction::Out,
            Instruction::End,
        ])
        .to_bytes();

        let result = run(&bytes).unwrap();
        assert_eq!(result.outputs, vec![42]);
    }

    #[test]
    fn test_stack_growth_during_run() {
        let mut instructions = Vec::new();
        for i in 0..64 {
            instructions.push(Instruction::Push(i));
        }
        instructions.push(Instruction::Out);
        instructions.push(Instruction::End);

        let config = VmConfig {
            initial_stack_capacity: 1,
            ..VmConfig::default()
        };
        let result = Vm::new(program(&instructions), config).unwrap().run().unwrap();
        assert_eq!(result.outputs, vec![63]);
    }
}
