//! Per-instruction stack effects
//!
//! Arithmetic is wrapping two's-complement. Underflow is detected before
//! any operand is popped, so a failing instruction leaves the stack
//! exactly as it found it.

use crate::error::{Result, RuntimeError};
use crate::io::IoHandler;
use crate::stack::{Cell, Stack, StackError};
use crate::state::{HaltReason, VmState};
use stackproc_spec::{Instruction, Opcode};
use tracing::trace;

/// Apply one instruction at byte `offset` to the machine.
pub fn execute(
    instruction: &Instruction,
    offset: usize,
    stack: &mut Stack,
    io: &mut IoHandler,
    state: &mut VmState,
) -> Result<()> {
    let opcode = instruction.opcode();
    trace!(offset, %instruction, depth = stack.len(), "step");

    match *instruction {
        Instruction::End => {
            state.halt(HaltReason::End);
        }
        Instruction::Abort => {
            state.halt(HaltReason::Abort);
        }
        Instruction::Push(operand) => {
            stack
                .push(Cell::from(operand))
                .map_err(|e| lift(e, opcode, offset))?;
        }
        Instruction::Pop => {
            require_depth(stack, 1, opcode, offset)?;
            stack.pop().map_err(|e| lift(e, opcode, offset))?;
        }
        Instruction::Out => {
            require_depth(stack, 1, opcode, offset)?;
            let top = stack.peek().map_err(|e| lift(e, opcode, offset))?;
            io.emit(top);
        }
        Instruction::Dup => {
            require_depth(stack, 1, opcode, offset)?;
            let top = stack.peek().map_err(|e| lift(e, opcode, offset))?;
            stack.push(top).map_err(|e| lift(e, opcode, offset))?;
        }
        Instruction::Add | Instruction::Sub | Instruction::Mul | Instruction::Div => {
            require_depth(stack, 2, opcode, offset)?;
            let b = stack.pop().map_err(|e| lift(e, opcode, offset))?;
            let a = stack.pop().map_err(|e| lift(e, opcode, offset))?;
            let result = apply_arithmetic(opcode, a, b, offset)?;
            stack.push(result).map_err(|e| lift(e, opcode, offset))?;
        }
    }

    Ok(())
}

fn apply_arithmetic(opcode: Opcode, a: Cell, b: Cell, offset: usize) -> Result<Cell> {
    let result = match opcode {
        Opcode::Add => a.wrapping_add(b),
        Opcode::Sub => a.wrapping_sub(b),
        Opcode::Mul => a.wrapping_mul(b),
        Opcode::Div => {
            if b == 0 {
                return Err(RuntimeError::DivisionByZero { offset });
            }
            a.wrapping_div(b)
        }
        // Callers only reach this with an arithmetic opcode.
        _ => unreachable!("non-arithmetic opcode {opcode} routed to arithmetic"),
    };
    Ok(result)
}

fn require_depth(stack: &Stack, needed: usize, opcode: Opcode, offset: usize) -> Result<()> {
    if stack.len() < needed {
        Err(RuntimeError::StackUnderflow { opcode, offset })
    } else {
        Ok(())
    }
}

fn lift(err: StackError, opcode: Opcode, offset: usize) -> RuntimeError {
    match err {
        StackError::Empty => RuntimeError::StackUnderflow { opcode, offset },
        StackError::Corrupt(status) => RuntimeError::CorruptState { status, offset },
        StackError::Allocation { capacity } => RuntimeError::Allocation { capacity },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> (Stack, IoHandler, VmState) {
        (Stack::new(8).unwrap(), IoHandler::new(), VmState::new())
    }

    fn run_one(instruction: Instruction, stack: &mut Stack) -> Result<()> {
        let mut io = IoHandler::new();
        let mut state = VmState::new();
        execute(&instruction, 0, stack, &mut io, &mut state)
    }

    #[test]
    fn test_push_and_pop() {
        let (mut stack, mut io, mut state) = machine();
        execute(&Instruction::Push(5), 0, &mut stack, &mut io, &mut state).unwrap();
        execute(&Instruction::Push(-3), 5, &mut stack, &mut io, &mut state).unwrap();
        assert_eq!(stack.len(), 2);

        execute(&Instruction::Pop, 10, &mut stack, &mut io, &mut state).unwrap();
        assert_eq!(stack.peek().unwrap(), 5);
    }

    #[test]
    fn test_push_sign_extends() {
        let mut stack = Stack::new(4).unwrap();
        run_one(Instruction::Push(-1), &mut stack).unwrap();
        assert_eq!(stack.peek().unwrap(), -1i64);
    }

    #[test]
    fn test_out_does_not_pop() {
        let (mut stack, mut io, mut state) = machine();
        execute(&Instruction::Push(7), 0, &mut stack, &mut io, &mut state).unwrap();
        execute(&Instruction::Out, 5, &mut stack, &mut io, &mut state).unwrap();
        execute(&Instruction::Out, 6, &mut stack, &mut io, &mut state).unwrap();

        assert_eq!(io.outputs(), &[7, 7]);
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_dup_duplicates_top() {
        let (mut stack, mut io, mut state) = machine();
        execute(&Instruction::Push(9), 0, &mut stack, &mut io, &mut state).unwrap();
        execute(&Instruction::Dup, 5, &mut stack, &mut io, &mut state).unwrap();

        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop().unwrap(), 9);
        assert_eq!(stack.pop().unwrap(), 9);
    }

    #[test]
    fn test_arithmetic_operand_order() {
        // SUB and DIV read the deeper cell as the left operand.
        let mut stack = Stack::new(8).unwrap();
        run_one(Instruction::Push(10), &mut stack).unwrap();
        run_one(Instruction::Push(4), &mut stack).unwrap();
        run_one(Instruction::Sub, &mut stack).unwrap();
        assert_eq!(stack.peek().unwrap(), 6);

        run_one(Instruction::Push(2), &mut stack).unwrap();
        run_one(Instruction::Div, &mut stack).unwrap();
        assert_eq!(stack.peek().unwrap(), 3);
    }

    #[test]
    fn test_arithmetic_wraps() {
        let mut stack = Stack::new(8).unwrap();
        stack.push(i64::MAX).unwrap();
        run_one(Instruction::Push(1), &mut stack).unwrap();
        run_one(Instruction::Add, &mut stack).unwrap();
        assert_eq!(stack.peek().unwrap(), i64::MIN);

        let mut stack = Stack::new(8).unwrap();
        stack.push(i64::MIN).unwrap();
        run_one(Instruction::Push(-1), &mut stack).unwrap();
        run_one(Instruction::Div, &mut stack).unwrap();
        assert_eq!(stack.peek().unwrap(), i64::MIN);
    }

    #[test]
    fn test_division_by_zero_is_trapped() {
        let mut stack = Stack::new(8).unwrap();
        run_one(Instruction::Push(1), &mut stack).unwrap();
        run_one(Instruction::Push(0), &mut stack).unwrap();

        let err = run_one(Instruction::Div, &mut stack).unwrap_err();
        assert!(matches!(err, RuntimeError::DivisionByZero { offset: 0 }));
    }

    #[test]
    fn test_underflow_leaves_stack_untouched() {
        let mut stack = Stack::new(8).unwrap();
        run_one(Instruction::Push(1), &mut stack).unwrap();

        // ADD needs two cells but only one is live; nothing may be popped.
        let err = run_one(Instruction::Add, &mut stack).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::StackUnderflow {
                opcode: Opcode::Add,
                ..
            }
        ));
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.peek().unwrap(), 1);
    }

    #[test]
    fn test_underflow_on_empty_stack() {
        for instruction in [
            Instruction::Pop,
            Instruction::Out,
            Instruction::Dup,
            Instruction::Add,
            Instruction::Sub,
            Instruction::Mul,
            Instruction::Div,
        ] {
            let mut stack = Stack::new(4).unwrap();
            let err = run_one(instruction, &mut stack).unwrap_err();
            assert!(
                matches!(err, RuntimeError::StackUnderflow { .. }),
                "{instruction} on empty stack: {err:?}"
            );
            assert!(stack.is_empty());
        }
    }

    #[test]
    fn test_end_and_abort_latch_halt() {
        let (mut stack, mut io, mut state) = machine();
        execute(&Instruction::End, 0, &mut stack, &mut io, &mut state).unwrap();
        assert_eq!(state.halt_reason, Some(HaltReason::End));

        let mut state = VmState::new();
        execute(&Instruction::Abort, 0, &mut stack, &mut io, &mut state).unwrap();
        assert_eq!(state.halt_reason, Some(HaltReason::Abort));
    }
}
